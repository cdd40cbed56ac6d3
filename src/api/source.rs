use std::collections::HashSet;
use std::fmt;

use log::{debug, error};
use serde::Deserialize;

use super::error::{LoadError, Result};
use super::session::ApiSession;
use crate::components::force_graph::{Edge, EdgeKind, Graph, Node, NodeId, NodeKind};

const NEIGHBORHOOD_PATH: &str = "/law-extraction/getLawGraph";
const GLOBAL_PATH: &str = "/law-extraction/getGlobalGraph";

/// Which graph to fetch.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphQuery {
	/// The neighborhood of one entity.
	Neighborhood(NodeId),
	/// Everything at or above a confidence floor.
	Global { min_confidence: f64 },
}

impl fmt::Display for GraphQuery {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Neighborhood(id) => write!(f, "neighborhood of {id}"),
			Self::Global { min_confidence } => write!(f, "global graph >= {min_confidence}"),
		}
	}
}

/// Something that can resolve a [`GraphQuery`] into a snapshot.
///
/// One call is one attempt; retrying is up to the caller.
#[allow(async_fn_in_trait)]
pub trait GraphSource {
	/// Fetches and validates one snapshot.
	async fn load(&self, query: &GraphQuery) -> Result<Graph>;
}

/// [`GraphSource`] backed by the REST API.
#[derive(Clone, Debug)]
pub struct HttpGraphSource {
	session: ApiSession,
	client: reqwest::Client,
}

impl HttpGraphSource {
	/// Source issuing requests within `session`.
	pub fn new(session: ApiSession) -> Self {
		Self {
			session,
			client: reqwest::Client::new(),
		}
	}
}

impl GraphSource for HttpGraphSource {
	async fn load(&self, query: &GraphQuery) -> Result<Graph> {
		let token = self.session.authorization()?;
		let request = match query {
			GraphQuery::Neighborhood(id) => self
				.client
				.get(self.session.endpoint(NEIGHBORHOOD_PATH))
				.query(&[("lawId", id.as_str())]),
			GraphQuery::Global { min_confidence } => self
				.client
				.get(self.session.endpoint(GLOBAL_PATH))
				.query(&[("minConfidence", min_confidence.to_string())]),
		};
		let request = match token {
			Some(token) => request.bearer_auth(token),
			None => request,
		};

		let response = request.send().await.inspect_err(|e| {
			error!("loading {query} failed: {e}");
		})?;
		let status = response.status();
		if !status.is_success() {
			error!("loading {query} failed with status {status}");
			return Err(LoadError::Status(status.as_u16()));
		}
		let body = response.text().await?;
		let graph = parse_graph(&body).inspect_err(|e| error!("loading {query}: {e}"))?;
		debug!(
			"loaded {query}: {} nodes, {} edges",
			graph.nodes.len(),
			graph.edges.len()
		);
		Ok(graph)
	}
}

#[derive(Debug, Deserialize)]
struct WireGraph {
	#[serde(default)]
	nodes: Vec<WireNode>,
	#[serde(default)]
	links: Vec<WireLink>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireNode {
	id: String,
	name: String,
	#[serde(rename = "type")]
	kind: NodeKind,
	confidence_score: Option<f64>,
	category: Option<String>,
	x: Option<f64>,
	y: Option<f64>,
	val: Option<f64>,
	color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireLink {
	source: String,
	target: String,
	value: Option<f64>,
	#[serde(rename = "type")]
	kind: Option<EdgeKind>,
	label: Option<String>,
}

impl TryFrom<WireNode> for Node {
	type Error = LoadError;

	fn try_from(wire: WireNode) -> Result<Self> {
		if wire.id.is_empty() {
			return Err(LoadError::Malformed("node with empty id".into()));
		}
		if let Some(score) = wire.confidence_score {
			if !(0.0..=1.0).contains(&score) {
				return Err(LoadError::Malformed(format!(
					"node {} has confidence {score} outside [0, 1]",
					wire.id
				)));
			}
		}
		let position = match (wire.x, wire.y) {
			(Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((x, y)),
			_ => None,
		};
		Ok(Node {
			id: wire.id,
			name: wire.name,
			kind: wire.kind,
			confidence: wire.confidence_score,
			category: wire.category,
			size_hint: wire.val,
			color_hint: wire.color,
			position,
		})
	}
}

impl TryFrom<WireLink> for Edge {
	type Error = LoadError;

	fn try_from(wire: WireLink) -> Result<Self> {
		let strength = wire.value.unwrap_or(1.0);
		if !(strength.is_finite() && strength > 0.0) {
			return Err(LoadError::Malformed(format!(
				"link {} -> {} has non-positive strength {strength}",
				wire.source, wire.target
			)));
		}
		Ok(Edge {
			source: wire.source,
			target: wire.target,
			kind: wire.kind.unwrap_or_default(),
			strength,
			label: wire.label,
		})
	}
}

/// Parses and validates a `{ nodes, links }` payload.
///
/// Links pointing at unknown nodes are kept; the filter drops them.
pub fn parse_graph(body: &str) -> Result<Graph> {
	let wire: WireGraph = serde_json::from_str(body)?;

	let mut seen = HashSet::with_capacity(wire.nodes.len());
	let mut nodes = Vec::with_capacity(wire.nodes.len());
	for wire_node in wire.nodes {
		let node = Node::try_from(wire_node)?;
		if !seen.insert(node.id.clone()) {
			return Err(LoadError::Malformed(format!("duplicate node id {}", node.id)));
		}
		nodes.push(node);
	}

	let edges = wire
		.links
		.into_iter()
		.map(Edge::try_from)
		.collect::<Result<Vec<_>>>()?;

	Ok(Graph { nodes, edges })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_full_payload() {
		let body = r##"{
			"nodes": [
				{"id": "l1", "name": "Mendel's law", "type": "law", "confidenceScore": 0.95,
				 "category": "Genetics", "val": 6, "color": "#123456"},
				{"id": "p1", "name": "Paper", "type": "paper", "x": 10, "y": 20},
				{"id": "c1", "name": "Allele", "type": "concept"}
			],
			"links": [
				{"source": "p1", "target": "l1", "value": 0.8, "type": "supports", "label": "cites"},
				{"source": "l1", "target": "c1"},
				{"source": "l1", "target": "missing", "type": "contradicts"}
			]
		}"##;
		let graph = parse_graph(body).unwrap();

		assert_eq!(graph.nodes.len(), 3);
		let law = graph.node("l1").unwrap();
		assert_eq!(law.kind, NodeKind::Law);
		assert_eq!(law.confidence, Some(0.95));
		assert_eq!(law.category.as_deref(), Some("Genetics"));
		assert_eq!(law.size_hint, Some(6.0));
		assert_eq!(law.color(), "#123456");
		assert_eq!(graph.node("p1").unwrap().position, Some((10.0, 20.0)));
		assert_eq!(graph.node("c1").unwrap().confidence, None);

		assert_eq!(graph.edges.len(), 3);
		assert_eq!(graph.edges[0].kind, EdgeKind::Supports);
		assert_eq!(graph.edges[0].strength, 0.8);
		assert_eq!(graph.edges[0].label.as_deref(), Some("cites"));
		assert_eq!(graph.edges[1].kind, EdgeKind::Relates);
		assert_eq!(graph.edges[1].strength, 1.0);
	}

	#[test]
	fn empty_object_is_an_empty_graph() {
		assert!(parse_graph("{}").unwrap().is_empty());
	}

	#[test]
	fn rejects_unknown_node_kind() {
		let body = r#"{"nodes": [{"id": "x", "name": "X", "type": "gene"}]}"#;
		assert!(matches!(parse_graph(body), Err(LoadError::Json(_))));
	}

	#[test]
	fn rejects_invalid_json() {
		assert!(matches!(parse_graph("<html>"), Err(LoadError::Json(_))));
	}

	#[test]
	fn rejects_duplicate_ids() {
		let body = r#"{"nodes": [
			{"id": "x", "name": "X", "type": "law"},
			{"id": "x", "name": "Again", "type": "paper"}
		]}"#;
		assert!(matches!(parse_graph(body), Err(LoadError::Malformed(_))));
	}

	#[test]
	fn rejects_out_of_range_confidence() {
		let body = r#"{"nodes": [{"id": "x", "name": "X", "type": "law", "confidenceScore": 1.2}]}"#;
		assert!(matches!(parse_graph(body), Err(LoadError::Malformed(_))));
	}

	#[test]
	fn rejects_non_positive_strength() {
		let body = r#"{
			"nodes": [{"id": "a", "name": "A", "type": "law"}],
			"links": [{"source": "a", "target": "a", "value": 0}]
		}"#;
		assert!(matches!(parse_graph(body), Err(LoadError::Malformed(_))));
	}

	#[test]
	fn query_describes_itself() {
		assert_eq!(
			GraphQuery::Neighborhood("l1".into()).to_string(),
			"neighborhood of l1"
		);
		assert_eq!(
			GraphQuery::Global { min_confidence: 0.5 }.to_string(),
			"global graph >= 0.5"
		);
	}
}
