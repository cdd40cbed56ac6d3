use std::collections::HashSet;

use super::interaction::{Command, InteractionController, InteractionEvent, NodeSummary};
use super::layout::{LayoutParams, Simulation};
use super::types::{Graph, NodeId, ViewState};

/// Extra pick radius around a node circle, in screen pixels.
pub const HIT_SLOP: f64 = 4.0;
/// Pointer travel, in screen pixels, below which a press counts as a click.
pub const CLICK_TOLERANCE: f64 = 3.0;

pub fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct PressState {
	pub active: bool,
	pub on_node: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub grab_dx: f64,
	pub grab_dy: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<usize>,
	pub neighbors: HashSet<usize>,
	pub highlight_t: f64,
	pub prev_node: Option<usize>,
	pub prev_neighbors: HashSet<usize>,
	delay_t: f64,
}

/// Eased pan/zoom toward a target transform.
#[derive(Clone, Debug)]
pub struct CameraAnimation {
	from: ViewTransform,
	to: ViewTransform,
	elapsed: f64,
	duration: f64,
}

impl CameraAnimation {
	fn step(&mut self, dt: f64) -> (ViewTransform, bool) {
		self.elapsed += dt;
		let t = if self.duration <= 0.0 {
			1.0
		} else {
			(self.elapsed / self.duration).min(1.0)
		};
		let e = ease_out_cubic(t);
		let lerp = |a: f64, b: f64| a + (b - a) * e;
		(
			ViewTransform {
				x: lerp(self.from.x, self.to.x),
				y: lerp(self.from.y, self.to.y),
				k: lerp(self.from.k, self.to.k),
			},
			t >= 1.0,
		)
	}
}

/// Everything the canvas needs between frames: the current snapshot, its
/// simulation, the interaction state and the camera.
pub struct ForceGraphState {
	pub graph: Graph,
	pub simulation: Simulation,
	pub controller: InteractionController,
	pub transform: ViewTransform,
	pub press: PressState,
	pub pan: PanState,
	pub hover: HoverState,
	pub camera: Option<CameraAnimation>,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
	/// Whether an empty graph draws the "no data" text.
	pub show_empty_message: bool,
	params: LayoutParams,
	/// Drag start held back until the pointer actually moves.
	pending_drag_start: Option<InteractionEvent>,
	drag_events: Vec<InteractionEvent>,
}

impl ForceGraphState {
	pub fn new(graph: Graph, params: LayoutParams, width: f64, height: f64) -> Self {
		let simulation = Simulation::new(&graph, params.clone(), width, height);
		Self {
			graph,
			simulation,
			controller: InteractionController::default(),
			transform: ViewTransform::default(),
			press: PressState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			camera: None,
			width,
			height,
			flow_time: 0.0,
			show_empty_message: true,
			params,
			pending_drag_start: None,
			drag_events: Vec::new(),
		}
	}

	/// Swaps in a new snapshot, keeping the positions of nodes that survive.
	///
	/// A drag on a surviving node carries over: the node stays pinned where
	/// it was and the release still reaches the controller.
	pub fn set_graph(&mut self, graph: Graph) {
		let known = self.simulation.positions();
		self.simulation = Simulation::seeded(
			&graph,
			self.params.clone(),
			self.width,
			self.height,
			&known,
			&mut rand::rng(),
		);
		self.controller.retain(&graph);
		self.graph = graph;
		self.hover = HoverState::default();

		match self.controller.dragging().map(str::to_owned) {
			Some(id) => {
				if let Some(&(x, y)) = known.get(&id) {
					self.simulation.pin(&id, x, y);
				}
			}
			None => {
				if self.press.on_node {
					// Close a drag the host has already seen start.
					if self.pending_drag_start.take().is_none() {
						self.drag_events.push(InteractionEvent::DragEnd);
					}
					self.press = PressState::default();
				}
			}
		}

		let hovered = self.controller.hovered().map(str::to_owned);
		if let Some(id) = hovered {
			self.highlight(self.simulation.index_of(&id));
		}
	}

	pub fn view(&self) -> &ViewState {
		self.controller.view()
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.simulation.node_at(gx, gy, HIT_SLOP / self.transform.k)
	}

	fn node_id(&self, idx: usize) -> Option<NodeId> {
		self.graph.nodes.get(idx).map(|n| n.id.clone())
	}

	/// Summary of the node under the pointer.
	pub fn hovered_summary(&self) -> Option<NodeSummary> {
		let id = self.controller.hovered()?;
		self.graph.node(id).map(NodeSummary::of)
	}

	/// Feeds one event through the controller and applies the resulting commands.
	pub fn dispatch(&mut self, event: InteractionEvent) {
		let commands = self.controller.handle(event.clone());
		if !commands.is_empty() {
			self.record_drag(event);
		}
		for command in commands {
			self.apply(command);
		}
	}

	/// Queues accepted drag events for the host. A press released without
	/// moving is a click and reports no drag at all.
	fn record_drag(&mut self, event: InteractionEvent) {
		match event {
			InteractionEvent::DragStart { .. } => self.pending_drag_start = Some(event),
			InteractionEvent::DragMove { .. } => {
				self.drag_events.extend(self.pending_drag_start.take());
				self.drag_events.push(event);
			}
			InteractionEvent::DragEnd => {
				if self.pending_drag_start.take().is_none() {
					self.drag_events.push(event);
				}
			}
			_ => {}
		}
	}

	/// Drag events accepted since the last call.
	pub fn take_drag_events(&mut self) -> Vec<InteractionEvent> {
		std::mem::take(&mut self.drag_events)
	}

	fn apply(&mut self, command: Command) {
		match command {
			Command::Pin { node, x, y } => {
				self.simulation.pin(&node, x, y);
			}
			Command::Unpin { node } => {
				self.simulation.unpin(&node);
			}
			Command::Reheat => self.simulation.reheat(),
			Command::CenterOn {
				node,
				zoom,
				duration_ms,
			} => {
				if let Some((gx, gy)) = self.simulation.position(&node) {
					let to = ViewTransform {
						x: self.width / 2.0 - gx * zoom,
						y: self.height / 2.0 - gy * zoom,
						k: zoom,
					};
					self.camera = Some(CameraAnimation {
						from: self.transform,
						to,
						elapsed: 0.0,
						duration: duration_ms / 1000.0,
					});
				}
			}
		}
	}

	/// Selects and centers on a node by id, as if it had been clicked.
	pub fn focus(&mut self, id: &str) {
		if self.graph.node(id).is_some() {
			self.dispatch(InteractionEvent::Click { node: id.to_owned() });
		}
	}

	/// Drops the selection, e.g. when the details panel is closed.
	pub fn clear_selection(&mut self) {
		self.controller.clear_selection();
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		match self.node_at_position(sx, sy) {
			Some(idx) => {
				let (Some(id), Some((nx, ny))) = (self.node_id(idx), self.simulation.position_at(idx))
				else {
					return;
				};
				let (gx, gy) = self.screen_to_graph(sx, sy);
				self.press = PressState {
					active: true,
					on_node: true,
					start_x: sx,
					start_y: sy,
					grab_dx: nx - gx,
					grab_dy: ny - gy,
				};
				self.dispatch(InteractionEvent::DragStart {
					node: id,
					x: nx,
					y: ny,
				});
			}
			None => {
				self.camera = None;
				self.press = PressState {
					active: true,
					on_node: false,
					start_x: sx,
					start_y: sy,
					..PressState::default()
				};
				self.pan = PanState {
					active: true,
					start_x: sx,
					start_y: sy,
					transform_start_x: self.transform.x,
					transform_start_y: self.transform.y,
				};
			}
		}
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if self.controller.dragging().is_none() {
			let hovered = self.node_at_position(sx, sy);
			self.set_hover(hovered);
		}

		if self.press.active && self.press.on_node {
			let travel = (sx - self.press.start_x).hypot(sy - self.press.start_y);
			if travel < CLICK_TOLERANCE && !self.controller.drag_moved() {
				return;
			}
			let (gx, gy) = self.screen_to_graph(sx, sy);
			self.dispatch(InteractionEvent::DragMove {
				x: gx + self.press.grab_dx,
				y: gy + self.press.grab_dy,
			});
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}
	}

	pub fn pointer_up(&mut self) {
		if self.press.active && self.press.on_node {
			let clicked = !self.controller.drag_moved();
			let node = self.controller.dragging().map(str::to_owned);
			self.dispatch(InteractionEvent::DragEnd);
			if let (true, Some(node)) = (clicked, node) {
				self.dispatch(InteractionEvent::Click { node });
			}
		}
		self.press = PressState::default();
		self.pan.active = false;
	}

	pub fn pointer_leave(&mut self) {
		if self.controller.dragging().is_some() {
			self.dispatch(InteractionEvent::DragEnd);
		}
		self.press = PressState::default();
		self.pan.active = false;
		self.set_hover(None);
	}

	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		self.camera = None;
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn set_hover(&mut self, node: Option<usize>) {
		if self.hover.node == node {
			return;
		}
		match node.and_then(|idx| self.node_id(idx)) {
			Some(id) => self.dispatch(InteractionEvent::HoverStart { node: id }),
			None => self.dispatch(InteractionEvent::HoverEnd),
		}
		self.highlight(node);
	}

	fn highlight(&mut self, node: Option<usize>) {
		let was_hovering = self.hover.node.is_some();

		// Save previous state for fade-out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		let Some(idx) = node else {
			return;
		};
		if !was_hovering {
			self.hover.delay_t = 0.0;
		}
		let Some(id) = self.node_id(idx) else {
			return;
		};
		for edge in &self.graph.edges {
			let other = if edge.source == id {
				&edge.target
			} else if edge.target == id {
				&edge.source
			} else {
				continue;
			};
			if let Some(n) = self.simulation.index_of(other) {
				self.hover.neighbors.insert(n);
			}
		}
	}

	pub fn is_highlighted(&self, idx: usize) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: usize) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn is_selected(&self, idx: usize) -> bool {
		let selected = self.view().selected_node_id.as_deref();
		selected.is_some() && self.graph.nodes.get(idx).map(|n| n.id.as_str()) == selected
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	/// Advances one animation frame of `dt` seconds.
	pub fn tick(&mut self, dt: f64) {
		self.simulation.tick();
		self.flow_time += dt;

		if let Some(camera) = self.camera.as_mut() {
			let (transform, done) = camera.step(dt);
			self.transform = transform;
			if done {
				self.camera = None;
			}
		}

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.simulation.resize(width, height);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{Edge, EdgeKind, Node, NodeKind};

	fn state() -> ForceGraphState {
		let graph = Graph::new(
			vec![
				Node::new("a", "A", NodeKind::Law),
				Node::new("b", "B", NodeKind::Paper),
				Node::new("c", "C", NodeKind::Concept),
			],
			vec![
				Edge::new("b", "a", EdgeKind::Supports),
				Edge::new("a", "c", EdgeKind::Relates),
			],
		);
		let mut s = ForceGraphState::new(graph, LayoutParams::default(), 800.0, 600.0);
		s.simulation.run();
		s
	}

	fn screen_pos(s: &ForceGraphState, id: &str) -> (f64, f64) {
		let (x, y) = s.simulation.position(id).unwrap();
		(x * s.transform.k + s.transform.x, y * s.transform.k + s.transform.y)
	}

	#[test]
	fn drag_pins_then_release_lets_node_move() {
		let mut s = state();
		let (sx, sy) = screen_pos(&s, "a");

		s.pointer_down(sx, sy);
		s.pointer_move(sx + 200.0, sy + 150.0);
		assert!(s.simulation.is_pinned("a"));
		let dropped = s.simulation.position("a").unwrap();
		s.tick(0.016);
		assert_eq!(s.simulation.position("a"), Some(dropped));

		s.pointer_up();
		assert!(!s.simulation.is_pinned("a"));
		assert!(!s.simulation.is_cooled());
		assert_eq!(s.view().selected_node_id, None);

		s.tick(0.016);
		assert_ne!(s.simulation.position("a"), Some(dropped));
	}

	#[test]
	fn press_without_travel_is_a_click() {
		let mut s = state();
		let (sx, sy) = screen_pos(&s, "b");
		s.pointer_down(sx, sy);
		s.pointer_move(sx + 1.0, sy);
		s.pointer_up();

		assert_eq!(s.view().selected_node_id.as_deref(), Some("b"));
		assert!(!s.simulation.is_pinned("b"));
		assert!(s.camera.is_some());
		assert!(s.simulation.is_cooled());
		assert!(s.take_drag_events().is_empty());
	}

	#[test]
	fn drag_reports_start_move_and_end() {
		let mut s = state();
		let (sx, sy) = screen_pos(&s, "a");
		s.pointer_down(sx, sy);
		assert!(s.take_drag_events().is_empty());

		s.pointer_move(sx + 40.0, sy);
		let events = s.take_drag_events();
		assert!(matches!(
			events.as_slice(),
			[
				InteractionEvent::DragStart { node, .. },
				InteractionEvent::DragMove { .. }
			] if node == "a"
		));

		s.pointer_up();
		assert_eq!(s.take_drag_events(), vec![InteractionEvent::DragEnd]);
	}

	#[test]
	fn drag_survives_a_snapshot_swap() {
		let mut s = state();
		let (sx, sy) = screen_pos(&s, "a");
		s.pointer_down(sx, sy);
		s.pointer_move(-400.0, -400.0);
		let held = s.simulation.position("a").unwrap();

		let mut graph = s.graph.clone();
		graph.nodes.push(Node {
			position: Some((-2000.0, -2000.0)),
			..Node::new("d", "D", NodeKind::Concept)
		});
		s.set_graph(graph);
		assert!(s.simulation.is_pinned("a"));
		assert_eq!(s.simulation.position("a"), Some(held));

		s.pointer_up();
		assert_eq!(s.controller.dragging(), None);
		assert!(!s.simulation.is_pinned("a"));
		assert!(!s.simulation.is_cooled());

		let (bx, by) = screen_pos(&s, "b");
		s.pointer_move(bx, by);
		assert_eq!(s.controller.hovered(), Some("b"));
	}

	#[test]
	fn swap_dropping_the_dragged_node_ends_the_press() {
		let mut s = state();
		let (sx, sy) = screen_pos(&s, "a");
		s.pointer_down(sx, sy);
		s.pointer_move(-400.0, -400.0);

		let mut graph = s.graph.clone();
		graph.nodes.retain(|n| n.id != "a");
		graph.edges.clear();
		s.set_graph(graph);
		assert_eq!(s.controller.dragging(), None);
		assert!(!s.press.active);
		assert_eq!(s.take_drag_events().last(), Some(&InteractionEvent::DragEnd));

		let (bx, by) = screen_pos(&s, "b");
		s.pointer_move(bx, by);
		assert_eq!(s.controller.hovered(), Some("b"));
	}

	#[test]
	fn camera_settles_on_clicked_node() {
		let mut s = state();
		s.focus("c");
		let target = s.simulation.position("c").unwrap();
		for _ in 0..120 {
			s.tick(0.016);
		}
		assert!(s.camera.is_none());
		assert_eq!(s.transform.k, 2.0);
		assert!((s.transform.x - (400.0 - target.0 * 2.0)).abs() < 1e-6);
		assert!((s.transform.y - (300.0 - target.1 * 2.0)).abs() < 1e-6);
	}

	#[test]
	fn hover_highlights_neighbors_and_clears_on_leave() {
		let mut s = state();
		let (sx, sy) = screen_pos(&s, "a");
		s.pointer_move(sx, sy);
		assert_eq!(s.controller.hovered(), Some("a"));
		assert_eq!(s.hovered_summary().map(|h| h.name), Some("A".to_string()));
		assert!(s.is_highlighted(1) && s.is_highlighted(2));

		s.pointer_leave();
		assert_eq!(s.controller.hovered(), None);
		assert_eq!(s.view().selected_node_id, None);
	}

	#[test]
	fn closing_the_panel_clears_selection() {
		let mut s = state();
		s.focus("a");
		assert!(s.is_selected(0));
		s.clear_selection();
		assert!(!s.is_selected(0));
		assert_eq!(s.view().center_target_id, None);
	}

	#[test]
	fn background_drag_pans() {
		let mut s = state();
		s.pointer_down(-500.0, -500.0);
		s.pointer_move(-450.0, -480.0);
		s.pointer_up();
		assert_eq!((s.transform.x, s.transform.y), (50.0, 20.0));
	}

	#[test]
	fn swapping_graph_keeps_surviving_positions() {
		let mut s = state();
		s.focus("b");
		let kept = s.simulation.position("a").unwrap();
		let mut graph = s.graph.clone();
		graph.nodes.retain(|n| n.id != "b");
		graph.edges.retain(|e| e.source != "b" && e.target != "b");
		s.set_graph(graph);

		assert_eq!(s.simulation.position("a"), Some(kept));
		assert_eq!(s.simulation.position("b"), None);
		assert_eq!(s.view().selected_node_id, None);
	}
}
