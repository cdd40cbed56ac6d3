use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::interaction::{InteractionEvent, NodeSummary};
use super::layout::LayoutParams;
use super::render;
use super::state::ForceGraphState;
use super::types::{Graph, NodeId};

const FRAME_SECONDS: f64 = 0.016;

/// What the host has last been told about.
#[derive(Default)]
struct Reported {
	selected: Option<NodeId>,
	hovered: Option<NodeId>,
}

/// Changes since the last report, to be emitted once the state borrow is released.
struct Changes {
	selected: Option<Option<NodeId>>,
	hovered: Option<Option<NodeSummary>>,
	drags: Vec<InteractionEvent>,
}

impl Reported {
	fn diff(&mut self, s: &mut ForceGraphState) -> Changes {
		let selected = s.view().selected_node_id.clone();
		let hovered = s.controller.hovered().map(str::to_owned);
		Changes {
			selected: (selected != self.selected).then(|| {
				self.selected = selected.clone();
				selected
			}),
			hovered: (hovered != self.hovered).then(|| {
				self.hovered = hovered;
				s.hovered_summary()
			}),
			drags: s.take_drag_events(),
		}
	}
}

fn measure(
	window: &Window,
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	fallback: (f64, f64),
) -> (f64, f64) {
	if fullscreen {
		let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64());
		return (
			dim(window.inner_width()).unwrap_or(fallback.0),
			dim(window.inner_height()).unwrap_or(fallback.1),
		);
	}
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or(fallback)
}

/// Interactive force-directed view of a [`Graph`].
///
/// The layout keeps running across data changes: nodes present in both the
/// old and the new snapshot stay where they were.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<Graph>,
	/// Node to select and center on, e.g. from a `?law=` link. Going back
	/// to `None` clears the selection.
	#[prop(into, optional)]
	focus: Signal<Option<NodeId>>,
	#[prop(optional)] params: LayoutParams,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	/// Size used when the container cannot be measured.
	#[prop(default = (800.0, 600.0))]
	fallback_size: (f64, f64),
	#[prop(optional)] on_select: Option<Callback<Option<NodeId>>>,
	#[prop(optional)] on_hover: Option<Callback<Option<NodeSummary>>>,
	/// Receives `DragStart`, `DragMove` and `DragEnd` for presses that move a node.
	#[prop(optional)]
	on_drag: Option<Callback<InteractionEvent>>,
	/// Draw the "no data" text when the graph is empty. Hosts showing their
	/// own loading or error message over the canvas turn this off.
	#[prop(into, default = Signal::stored(true))]
	show_empty_message: Signal<bool>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<ForceGraphState>>> = Rc::new(RefCell::new(None));
	let reported = Rc::new(RefCell::new(Reported::default()));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let alive = Arc::new(AtomicBool::new(true));
	let tooltip = RwSignal::new(None::<(NodeSummary, f64, f64)>);

	let alive_cleanup = alive.clone();
	on_cleanup(move || alive_cleanup.store(false, Ordering::Relaxed));

	let emit = move |changes: Changes| {
		if let (Some(cb), Some(selected)) = (on_select, changes.selected) {
			cb.run(selected);
		}
		if let Some(cb) = on_drag {
			for event in changes.drags {
				cb.run(event);
			}
		}
		if let Some(hovered) = changes.hovered {
			if hovered.is_none() {
				tooltip.set(None);
			}
			if let Some(cb) = on_hover {
				cb.run(hovered);
			}
		}
	};

	// Runs `f` against the live state, then reports what changed.
	let with_state = {
		let (state, reported) = (state.clone(), reported.clone());
		move |f: &dyn Fn(&mut ForceGraphState)| {
			let changes = {
				let mut guard = state.borrow_mut();
				let Some(s) = guard.as_mut() else {
					return;
				};
				f(s);
				reported.borrow_mut().diff(s)
			};
			emit(changes);
		}
	};

	let (state_init, animate_init, resize_cb_init, alive_init) =
		(state.clone(), animate.clone(), resize_cb.clone(), alive.clone());
	let params_init = params.clone();
	let with_state_init = with_state.clone();
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if state_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (mw, mh) = measure(&window, &canvas, fullscreen, fallback_size);
		let (w, h) = (width.unwrap_or(mw), height.unwrap_or(mh));
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx = match canvas.get_context("2d") {
			Ok(Some(ctx)) => ctx.dyn_into::<CanvasRenderingContext2d>(),
			_ => {
				warn!("canvas has no 2d context");
				return;
			}
		};
		let Ok(ctx) = ctx else {
			warn!("canvas 2d context has an unexpected type");
			return;
		};

		let graph = data.get_untracked();
		debug!(
			"force graph mounted at {w}x{h} with {} nodes",
			graph.nodes.len()
		);
		let mut initial = ForceGraphState::new(graph, params_init.clone(), w, h);
		initial.show_empty_message = show_empty_message.get_untracked();
		*state_init.borrow_mut() = Some(initial);
		if let Some(id) = focus.get_untracked() {
			with_state_init(&|s: &mut ForceGraphState| s.focus(&id));
		}

		if width.is_none() || height.is_none() {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (mw, mh) = measure(&win, &canvas_resize, fullscreen, fallback_size);
				let (nw, nh) = (width.unwrap_or(mw), height.unwrap_or(mh));
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner, alive_anim) =
			(state_init.clone(), animate_init.clone(), alive_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !alive_anim.load(Ordering::Relaxed) {
				return;
			}
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(FRAME_SECONDS);
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// New snapshots keep the running layout instead of rebuilding the canvas.
	let with_state_data = with_state.clone();
	Effect::new(move |_| {
		let graph = data.get();
		let focus_id = focus.get_untracked();
		with_state_data(&|s: &mut ForceGraphState| {
			if s.graph == graph {
				return;
			}
			s.set_graph(graph.clone());
			if let Some(id) = &focus_id {
				if s.view().selected_node_id.is_none() {
					s.focus(id);
				}
			}
		});
	});

	let with_state_empty = with_state.clone();
	Effect::new(move |_| {
		let show = show_empty_message.get();
		with_state_empty(&|s: &mut ForceGraphState| s.show_empty_message = show);
	});

	let with_state_focus = with_state.clone();
	Effect::new(move |_| match focus.get() {
		Some(id) => with_state_focus(&|s: &mut ForceGraphState| s.focus(&id)),
		None => with_state_focus(&|s: &mut ForceGraphState| s.clear_selection()),
	});

	let local_point = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let with_state_md = with_state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = local_point(&ev) {
			with_state_md(&|s: &mut ForceGraphState| s.pointer_down(x, y));
		}
	};

	let with_state_mm = with_state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(&ev) else {
			return;
		};
		with_state_mm(&|s: &mut ForceGraphState| {
			s.pointer_move(x, y);
			match s.hovered_summary() {
				Some(summary) if s.controller.dragging().is_none() => {
					tooltip.set(Some((summary, x, y)))
				}
				_ => tooltip.set(None),
			}
		});
	};

	let with_state_mu = with_state.clone();
	let on_mouseup = move |_: MouseEvent| with_state_mu(&|s: &mut ForceGraphState| s.pointer_up());

	let with_state_ml = with_state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		tooltip.set(None);
		with_state_ml(&|s: &mut ForceGraphState| s.pointer_leave());
	};

	let with_state_wh = with_state;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some((x, y)) = local_point(&ev) {
			let delta = ev.delta_y();
			with_state_wh(&|s: &mut ForceGraphState| s.wheel(x, y, delta));
		}
	};

	view! {
		<div class="force-graph">
			<canvas
				node_ref=canvas_ref
				class="force-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			{move || {
				tooltip
					.get()
					.map(|(summary, x, y)| {
						let style = format!("left: {}px; top: {}px;", x + 12.0, y + 12.0);
						view! {
							<div class="graph-tooltip" style=style>
								<strong>{summary.name.clone()}</strong>
								<span class="tooltip-details">{summary.details()}</span>
							</div>
						}
					})
			}}
		</div>
	}
}
