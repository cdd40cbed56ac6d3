use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier shared by the wire format, the filter and the simulation.
pub type NodeId = String;

/// What a node stands for in the law graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
	/// A biology law extracted from papers.
	Law,
	/// A paper supporting or contradicting laws.
	Paper,
	/// A concept a law refers to.
	Concept,
}

impl NodeKind {
	/// Default fill color for nodes of this kind.
	pub fn color(self) -> &'static str {
		match self {
			Self::Law => "#4f46e5",
			Self::Paper => "#0891b2",
			Self::Concept => "#a855f7",
		}
	}

	/// Default size value, fed through [`Node::radius`].
	pub fn size(self) -> f64 {
		match self {
			Self::Law => 5.0,
			Self::Paper => 3.0,
			Self::Concept => 2.0,
		}
	}

	/// Human readable name.
	pub fn label(self) -> &'static str {
		match self {
			Self::Law => "Law",
			Self::Paper => "Paper",
			Self::Concept => "Concept",
		}
	}
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// Relationship type carried by an edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
	/// Source provides evidence for the target.
	Supports,
	/// Source provides evidence against the target.
	Contradicts,
	/// Generic association.
	#[default]
	Relates,
}

impl EdgeKind {
	/// Stroke color used when drawing the edge.
	pub fn color(self) -> &'static str {
		match self {
			Self::Supports => "#10b981",
			Self::Contradicts => "#ef4444",
			Self::Relates => "#6b7280",
		}
	}

	/// Lowercase name as it appears on the wire.
	pub fn label(self) -> &'static str {
		match self {
			Self::Supports => "supports",
			Self::Contradicts => "contradicts",
			Self::Relates => "relates",
		}
	}
}

/// Pixels of radius per unit of square-rooted node size.
pub const RADIUS_PER_SIZE: f64 = 4.0;

/// A graph vertex.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: NodeId,
	pub name: String,
	pub kind: NodeKind,
	/// Evidentiary strength in `[0, 1]`, absent for nodes that carry no score.
	pub confidence: Option<f64>,
	pub category: Option<String>,
	pub size_hint: Option<f64>,
	pub color_hint: Option<String>,
	/// Starting coordinates, when the data source supplied them.
	pub position: Option<(f64, f64)>,
}

impl Node {
	/// Bare node of the given kind.
	pub fn new(id: impl Into<NodeId>, name: impl Into<String>, kind: NodeKind) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			kind,
			confidence: None,
			category: None,
			size_hint: None,
			color_hint: None,
			position: None,
		}
	}

	/// Sets the confidence score.
	#[cfg(test)]
	pub fn with_confidence(mut self, confidence: f64) -> Self {
		self.confidence = Some(confidence);
		self
	}

	/// Sets the category.
	#[cfg(test)]
	pub fn with_category(mut self, category: impl Into<String>) -> Self {
		self.category = Some(category.into());
		self
	}

	/// Visual radius in graph units.
	pub fn radius(&self) -> f64 {
		let size = self
			.size_hint
			.filter(|s| s.is_finite() && *s > 0.0)
			.unwrap_or_else(|| self.kind.size());
		RADIUS_PER_SIZE * size.sqrt()
	}

	/// Fill color, honoring the color hint.
	pub fn color(&self) -> &str {
		self.color_hint.as_deref().unwrap_or(self.kind.color())
	}
}

/// A typed, weighted relationship between two nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	pub source: NodeId,
	pub target: NodeId,
	pub kind: EdgeKind,
	/// Always strictly positive once past the loader.
	pub strength: f64,
	pub label: Option<String>,
}

impl Edge {
	/// Edge with strength 1.
	pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, kind: EdgeKind) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			kind,
			strength: 1.0,
			label: None,
		}
	}

	/// Sets the strength.
	#[cfg(test)]
	pub fn with_strength(mut self, strength: f64) -> Self {
		self.strength = strength;
		self
	}

	/// True when both endpoints are the same node.
	pub fn is_self_loop(&self) -> bool {
		self.source == self.target
	}
}

/// Immutable snapshot produced by one load.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
}

impl Graph {
	/// Builds a graph from its parts.
	pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
		Self { nodes, edges }
	}

	/// True when there is nothing to lay out.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Looks a node up by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}
}

/// Filter toggles plus selection, owned by the interaction layer.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
	pub show_papers: bool,
	pub show_concepts: bool,
	pub confidence_threshold: f64,
	pub selected_node_id: Option<NodeId>,
	pub center_target_id: Option<NodeId>,
}

impl Default for ViewState {
	fn default() -> Self {
		Self {
			show_papers: true,
			show_concepts: true,
			confidence_threshold: 0.5,
			selected_node_id: None,
			center_target_id: None,
		}
	}
}

impl ViewState {
	/// Whether the type toggles let a node of this kind through.
	pub fn shows_kind(&self, kind: NodeKind) -> bool {
		match kind {
			NodeKind::Law => true,
			NodeKind::Paper => self.show_papers,
			NodeKind::Concept => self.show_concepts,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn radius_uses_kind_default_unless_hinted() {
		let law = Node::new("a", "A", NodeKind::Law);
		assert!((law.radius() - 4.0 * 5f64.sqrt()).abs() < 1e-9);

		let mut hinted = Node::new("b", "B", NodeKind::Concept);
		hinted.size_hint = Some(4.0);
		assert!((hinted.radius() - 8.0).abs() < 1e-9);

		hinted.size_hint = Some(-1.0);
		assert!((hinted.radius() - 4.0 * 2f64.sqrt()).abs() < 1e-9);
	}

	#[test]
	fn color_hint_overrides_kind() {
		let mut node = Node::new("p", "P", NodeKind::Paper);
		assert_eq!(node.color(), "#0891b2");
		node.color_hint = Some("#000000".into());
		assert_eq!(node.color(), "#000000");
	}

	#[test]
	fn laws_are_never_hidden_by_toggles() {
		let view = ViewState {
			show_papers: false,
			show_concepts: false,
			..ViewState::default()
		};
		assert!(view.shows_kind(NodeKind::Law));
		assert!(!view.shows_kind(NodeKind::Paper));
		assert!(!view.shows_kind(NodeKind::Concept));
	}
}
