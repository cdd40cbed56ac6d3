use leptos::prelude::*;

use crate::components::force_graph::{EdgeKind, Graph, NodeKind};

const NODE_KINDS: [NodeKind; 3] = [NodeKind::Law, NodeKind::Paper, NodeKind::Concept];
const EDGE_KINDS: [EdgeKind; 3] = [EdgeKind::Supports, EdgeKind::Contradicts, EdgeKind::Relates];

/// Node and edge colors, with how many of each kind are on screen.
#[component]
pub fn Legend(#[prop(into)] graph: Signal<Graph>) -> impl IntoView {
	let count = move |kind: NodeKind| graph.with(|g| g.nodes.iter().filter(|n| n.kind == kind).count());

	view! {
		<div class="graph-legend">
			<h3>"Legend"</h3>
			<ul>
				{NODE_KINDS
					.into_iter()
					.map(|kind| {
						view! {
							<li>
								<span class="swatch dot" style=format!("background: {}", kind.color())></span>
								{kind.label()}
								<span class="count">{move || format!("({})", count(kind))}</span>
							</li>
						}
					})
					.collect_view()}
			</ul>
			<ul>
				{EDGE_KINDS
					.into_iter()
					.map(|kind| {
						view! {
							<li>
								<span class="swatch line" style=format!("background: {}", kind.color())></span>
								{kind.label()}
							</li>
						}
					})
					.collect_view()}
			</ul>
		</div>
	}
}

/// Counts of what survived filtering.
#[component]
pub fn GraphStats(#[prop(into)] graph: Signal<Graph>) -> impl IntoView {
	view! {
		<div class="graph-stats">
			<span>{move || graph.with(|g| format!("{} nodes", g.nodes.len()))}</span>
			<span>{move || graph.with(|g| format!("{} relationships", g.edges.len()))}</span>
		</div>
	}
}
