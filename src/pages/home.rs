use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_query_map;
use log::{debug, warn};

use crate::api::{ApiSession, GraphQuery, GraphSource, HttpGraphSource, LoadState, RequestTracker};
use crate::components::controls::FilterControls;
use crate::components::force_graph::{
	ForceGraphCanvas, Graph, InteractionEvent, NodeId, NodeSummary, ViewState, filter,
};
use crate::components::legend::{GraphStats, Legend};
use crate::components::node_panel::NodePanel;
use crate::config::AppConfig;

/// Graph to keep on screen for a load state; a pending reload keeps the previous one.
fn displayed_graph(state: &LoadState, previous: Option<&Graph>) -> Graph {
	match state {
		LoadState::Ready(graph) => graph.clone(),
		LoadState::Idle | LoadState::Loading => previous.cloned().unwrap_or_default(),
		LoadState::Empty | LoadState::Failed(_) => Graph::default(),
	}
}

/// Whether the canvas may draw its own "no data" text. Only a loaded graph
/// that the filters emptied has no page overlay covering it.
fn canvas_shows_empty_message(state: &LoadState) -> bool {
	matches!(state, LoadState::Ready(_))
}

/// Which graph the page asks for: a law's neighborhood when `?law=` is set,
/// otherwise the global graph at the current threshold.
fn query_for(law: Option<NodeId>, threshold: f64) -> GraphQuery {
	match law {
		Some(id) => GraphQuery::Neighborhood(id),
		None => GraphQuery::Global {
			min_confidence: threshold,
		},
	}
}

/// Knowledge graph explorer.
#[component]
pub fn Home() -> impl IntoView {
	let config = use_context::<AppConfig>().unwrap_or_default();
	let session = use_context::<ApiSession>();
	let query = use_query_map();
	let law_id = Memo::new(move |_| query.with(|q| q.get("law")).filter(|id| !id.is_empty()));

	let initial = config.graph.view_state();
	let show_papers = RwSignal::new(initial.show_papers);
	let show_concepts = RwSignal::new(initial.show_concepts);
	let confidence_threshold = RwSignal::new(initial.confidence_threshold);
	let selected = RwSignal::new(None::<NodeId>);
	let hovered = RwSignal::new(None::<NodeSummary>);
	let focus = RwSignal::new(None::<NodeId>);

	let load_state = RwSignal::new(LoadState::Idle);
	let retry = RwSignal::new(0u32);
	let tracker = RequestTracker::new();

	Effect::new(move |_| focus.set(law_id.get()));

	Effect::new(move |_| {
		retry.track();
		// The threshold only shapes global loads; neighborhoods filter it client side.
		let law = law_id.get();
		let threshold = match law {
			Some(_) => confidence_threshold.get_untracked(),
			None => confidence_threshold.get(),
		};
		let query = query_for(law, threshold);
		let Some(session) = session.clone().filter(ApiSession::is_open) else {
			warn!("no open API session");
			load_state.set(LoadState::Failed("No open API session".into()));
			return;
		};
		let token = tracker.issue();
		load_state.set(LoadState::Loading);
		let tracker = tracker.clone();
		spawn_local(async move {
			let result = HttpGraphSource::new(session).load(&query).await;
			load_state.update(|state| {
				state.resolve(&tracker, token, result);
			});
		});
	});

	let full_graph =
		Memo::new(move |previous: Option<&Graph>| load_state.with(|s| displayed_graph(s, previous)));

	let visible = Memo::new(move |_| {
		let view = ViewState {
			show_papers: show_papers.get(),
			show_concepts: show_concepts.get(),
			confidence_threshold: confidence_threshold.get(),
			..ViewState::default()
		};
		full_graph.with(|g| filter(g, &view))
	});

	let on_select = Callback::new(move |id: Option<NodeId>| selected.set(id));
	let on_hover = Callback::new(move |summary: Option<NodeSummary>| hovered.set(summary));
	let on_drag = Callback::new(move |event: InteractionEvent| {
		if let InteractionEvent::DragStart { node, .. } = &event {
			debug!("dragging {node}");
		} else if event == InteractionEvent::DragEnd {
			debug!("drag released");
		}
	});
	let on_focus = Callback::new(move |id: NodeId| focus.set(Some(id)));
	let on_close = Callback::new(move |_: ()| {
		selected.set(None);
		focus.set(None);
	});

	let title = move || match law_id.get() {
		Some(id) => format!("Law neighborhood: {id}"),
		None => "Biology laws knowledge graph".to_string(),
	};
	let params = config.graph.layout_params();
	let fallback_size = (config.graph.viewport_width, config.graph.viewport_height);

	view! {
		<div class="explorer">
			<header class="explorer-header">
				<h1>{title}</h1>
				<GraphStats graph=visible />
				<span class="hover-status">
					{move || hovered.get().map(|h| format!("{} ({})", h.name, h.details()))}
				</span>
			</header>
			<div class="explorer-body">
				<div class="sidebar">
					<FilterControls
						show_papers=show_papers
						show_concepts=show_concepts
						confidence_threshold=confidence_threshold
					/>
					<Legend graph=visible />
				</div>
				<div class="graph-area">
					<ForceGraphCanvas
						data=visible
						focus=focus
						params=params
						fallback_size=fallback_size
						on_select=on_select
						on_hover=on_hover
						on_drag=on_drag
						show_empty_message=Signal::derive(move || {
							load_state.with(canvas_shows_empty_message)
						})
					/>
					<Show when=move || load_state.with(LoadState::is_loading)>
						<div class="overlay loading">"Loading graph..."</div>
					</Show>
					{move || {
						load_state
							.with(|s| match s {
								LoadState::Failed(message) => Some(message.clone()),
								_ => None,
							})
							.map(|message| {
								view! {
									<div class="overlay error">
										<p>{format!("Failed to load graph: {message}")}</p>
										<button on:click=move |_| retry.update(|n| *n += 1)>"Retry"</button>
									</div>
								}
							})
					}}
					<Show when=move || load_state.with(|s| matches!(s, LoadState::Empty))>
						<div class="overlay empty">"No graph data available"</div>
					</Show>
				</div>
				<NodePanel graph=visible selected=selected on_focus=on_focus on_close=on_close />
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::{Node, NodeKind};

	fn graph() -> Graph {
		Graph::new(vec![Node::new("l1", "Law", NodeKind::Law)], vec![])
	}

	#[test]
	fn reload_keeps_previous_graph_until_it_resolves() {
		let previous = graph();
		assert_eq!(displayed_graph(&LoadState::Loading, Some(&previous)), previous);
		assert_eq!(displayed_graph(&LoadState::Loading, None), Graph::default());
		assert!(displayed_graph(&LoadState::Failed("boom".into()), Some(&previous)).is_empty());
		assert!(displayed_graph(&LoadState::Empty, Some(&previous)).is_empty());
	}

	#[test]
	fn canvas_empty_text_only_when_no_overlay_covers_it() {
		assert!(canvas_shows_empty_message(&LoadState::Ready(graph())));
		assert!(!canvas_shows_empty_message(&LoadState::Idle));
		assert!(!canvas_shows_empty_message(&LoadState::Loading));
		assert!(!canvas_shows_empty_message(&LoadState::Empty));
		assert!(!canvas_shows_empty_message(&LoadState::Failed("boom".into())));
	}

	#[test]
	fn law_parameter_selects_neighborhood_mode() {
		assert_eq!(
			query_for(Some("l1".into()), 0.5),
			GraphQuery::Neighborhood("l1".into())
		);
		assert_eq!(
			query_for(None, 0.25),
			GraphQuery::Global {
				min_confidence: 0.25
			}
		);
	}
}
