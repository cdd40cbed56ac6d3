use leptos::prelude::*;

use crate::components::force_graph::{
	Direction, Graph, NodeId, NodeKind, NodeSummary, relationships,
};

/// Link to the neighborhood view of one node.
pub fn neighborhood_href(id: &str) -> String {
	format!(
		"/knowledge-graph?law={}",
		String::from(js_sys::encode_uri_component(id))
	)
}

/// One relationship row, resolved against the graph for display.
#[derive(Clone, Debug, PartialEq)]
struct RelationshipRow {
	other_id: NodeId,
	other_name: String,
	direction: Direction,
	kind_label: &'static str,
	color: &'static str,
}

fn rows(graph: &Graph, id: &str) -> Vec<RelationshipRow> {
	relationships(graph, id)
		.into_iter()
		.map(|rel| RelationshipRow {
			other_id: rel.other.to_owned(),
			other_name: graph
				.node(rel.other)
				.map(|n| n.name.clone())
				.unwrap_or_else(|| rel.other.to_owned()),
			direction: rel.direction,
			kind_label: rel.edge.kind.label(),
			color: rel.edge.kind.color(),
		})
		.collect()
}

/// Details of the selected node and everything it is connected to.
#[component]
pub fn NodePanel(
	#[prop(into)] graph: Signal<Graph>,
	#[prop(into)] selected: Signal<Option<NodeId>>,
	on_focus: Callback<NodeId>,
	on_close: Callback<()>,
) -> impl IntoView {
	let summary = Memo::new(move |_| {
		let id = selected.get()?;
		graph.with(|g| g.node(&id).map(NodeSummary::of))
	});

	move || {
		summary.get().map(|node| {
			let related = graph.with(|g| rows(g, &node.id));
			let href = (node.kind == NodeKind::Law).then(|| neighborhood_href(&node.id));
			view! {
				<aside class="node-panel">
					<header>
						<h3>{node.name.clone()}</h3>
						<button class="close" on:click=move |_| on_close.run(())>
							"×"
						</button>
					</header>
					<dl>
						<dt>"Type"</dt>
						<dd>{node.kind.label()}</dd>
						{node
							.category
							.clone()
							.map(|c| view! {
								<dt>"Category"</dt>
								<dd>{c}</dd>
							})}
						{node
							.confidence_percent()
							.map(|p| view! {
								<dt>"Confidence"</dt>
								<dd>{p}</dd>
							})}
					</dl>
					{href.map(|href| view! { <a class="neighborhood-link" href=href>"View law graph"</a> })}
					<h4>{format!("Relationships ({})", related.len())}</h4>
					<ul class="relationships">
						{related
							.into_iter()
							.map(|row| {
								let target = row.other_id.clone();
								let arrow = match row.direction {
									Direction::Outgoing => "To",
									Direction::Incoming => "From",
								};
								view! {
									<li on:click=move |_| on_focus.run(target.clone())>
										<span class="swatch dot" style=format!("background: {}", row.color)></span>
										<span class="direction">{arrow}</span>
										<span class="name">{row.other_name}</span>
										<span class="kind">{row.kind_label}</span>
									</li>
								}
							})
							.collect_view()}
					</ul>
				</aside>
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::{Edge, EdgeKind, Node};

	#[test]
	fn rows_resolve_names_and_direction() {
		let graph = Graph::new(
			vec![
				Node::new("l1", "Mendel", NodeKind::Law),
				Node::new("p1", "Paper", NodeKind::Paper),
			],
			vec![
				Edge::new("p1", "l1", EdgeKind::Supports),
				Edge::new("l1", "gone", EdgeKind::Contradicts),
			],
		);
		let rows = rows(&graph, "l1");
		assert_eq!(rows.len(), 2);
		assert_eq!(rows[0].other_name, "Paper");
		assert_eq!(rows[0].direction, Direction::Incoming);
		assert_eq!(rows[0].color, "#10b981");
		assert_eq!(rows[1].other_name, "gone");
		assert_eq!(rows[1].direction, Direction::Outgoing);
		assert_eq!(rows[1].kind_label, "contradicts");
	}
}
