use std::collections::HashSet;

use log::warn;

use super::types::{Graph, Node, ViewState};

/// Whether a node survives the type toggles and the confidence floor.
///
/// A node without a confidence score is never removed by the threshold,
/// only by the type toggles.
pub fn keeps_node(node: &Node, view: &ViewState) -> bool {
	view.shows_kind(node.kind)
		&& node
			.confidence
			.is_none_or(|score| score >= view.confidence_threshold)
}

/// Derives the displayed subgraph from `graph`.
///
/// Edges survive only when both endpoints do; edges pointing at ids that are
/// not in the graph at all are dropped with a warning.
pub fn filter(graph: &Graph, view: &ViewState) -> Graph {
	let all_ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();

	let nodes: Vec<Node> = graph
		.nodes
		.iter()
		.filter(|n| keeps_node(n, view))
		.cloned()
		.collect();
	let kept: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

	let edges = graph
		.edges
		.iter()
		.filter(|e| {
			if !all_ids.contains(e.source.as_str()) || !all_ids.contains(e.target.as_str()) {
				warn!("dropping edge {} -> {}: unknown endpoint", e.source, e.target);
				return false;
			}
			kept.contains(e.source.as_str()) && kept.contains(e.target.as_str())
		})
		.cloned()
		.collect();

	Graph { nodes, edges }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{Edge, EdgeKind, NodeKind};

	fn sample() -> Graph {
		Graph::new(
			vec![
				Node::new("law", "Mendel", NodeKind::Law).with_confidence(0.9),
				Node::new("weak", "Weak law", NodeKind::Law).with_confidence(0.2),
				Node::new("paper", "Paper", NodeKind::Paper).with_confidence(0.7),
				Node::new("concept", "Allele", NodeKind::Concept),
				Node::new("unscored", "Unscored", NodeKind::Law),
			],
			vec![
				Edge::new("paper", "law", EdgeKind::Supports),
				Edge::new("law", "concept", EdgeKind::Relates),
				Edge::new("weak", "law", EdgeKind::Contradicts),
				Edge::new("law", "ghost", EdgeKind::Relates),
				Edge::new("unscored", "concept", EdgeKind::Relates),
			],
		)
	}

	fn ids(graph: &Graph) -> Vec<&str> {
		graph.nodes.iter().map(|n| n.id.as_str()).collect()
	}

	fn views() -> Vec<ViewState> {
		let mut out = Vec::new();
		for show_papers in [true, false] {
			for show_concepts in [true, false] {
				for threshold in [0.0, 0.3, 0.5, 0.8, 1.0] {
					out.push(ViewState {
						show_papers,
						show_concepts,
						confidence_threshold: threshold,
						..ViewState::default()
					});
				}
			}
		}
		out
	}

	#[test]
	fn low_confidence_paper_and_its_edge_are_dropped() {
		let graph = Graph::new(
			vec![
				Node::new("A", "A", NodeKind::Law),
				Node::new("B", "B", NodeKind::Paper).with_confidence(0.4),
			],
			vec![Edge::new("A", "B", EdgeKind::Supports).with_strength(1.0)],
		);
		let view = ViewState {
			confidence_threshold: 0.5,
			..ViewState::default()
		};

		let out = filter(&graph, &view);
		assert_eq!(ids(&out), vec!["A"]);
		assert!(out.edges.is_empty());
	}

	#[test]
	fn threshold_is_inclusive() {
		let graph = Graph::new(
			vec![Node::new("p", "P", NodeKind::Paper).with_confidence(0.5)],
			vec![],
		);
		let out = filter(&graph, &ViewState::default());
		assert_eq!(ids(&out), vec!["p"]);
	}

	#[test]
	fn type_toggles_remove_nodes_and_incident_edges() {
		let view = ViewState {
			show_papers: false,
			show_concepts: false,
			confidence_threshold: 0.0,
			..ViewState::default()
		};
		let out = filter(&sample(), &view);
		assert_eq!(ids(&out), vec!["law", "weak", "unscored"]);
		assert_eq!(out.edges.len(), 1);
		assert_eq!(out.edges[0].source, "weak");
	}

	#[test]
	fn unknown_endpoints_never_survive() {
		let view = ViewState {
			confidence_threshold: 0.0,
			..ViewState::default()
		};
		let out = filter(&sample(), &view);
		assert!(out.edges.iter().all(|e| e.target != "ghost"));
		assert_eq!(out.edges.len(), 4);
	}

	#[test]
	fn edge_endpoints_are_subset_of_nodes() {
		let graph = sample();
		for view in views() {
			let out = filter(&graph, &view);
			for edge in &out.edges {
				assert!(out.node(&edge.source).is_some(), "{view:?}");
				assert!(out.node(&edge.target).is_some(), "{view:?}");
			}
		}
	}

	#[test]
	fn unscored_nodes_survive_every_threshold() {
		let graph = sample();
		for view in views() {
			let out = filter(&graph, &view);
			assert!(out.node("unscored").is_some());
			assert_eq!(out.node("concept").is_some(), view.show_concepts);
		}
	}

	#[test]
	fn filtering_is_idempotent() {
		let graph = sample();
		for view in views() {
			let once = filter(&graph, &view);
			assert_eq!(filter(&once, &view), once);
		}
	}
}
