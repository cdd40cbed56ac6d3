use super::types::{Edge, Graph, Node, NodeId, NodeKind, ViewState};

/// How long a recentering pan takes.
pub const CENTER_DURATION_MS: f64 = 1000.0;
/// Zoom level the camera settles on after a click.
pub const CENTER_ZOOM: f64 = 2.0;

/// Pointer events the canvas feeds into the controller.
#[derive(Clone, Debug, PartialEq)]
pub enum InteractionEvent {
	/// A node was clicked without being dragged.
	Click { node: NodeId },
	/// The pointer entered a node.
	HoverStart { node: NodeId },
	/// The pointer left whatever node it was over.
	HoverEnd,
	/// A press landed on a node, at graph coordinates.
	DragStart { node: NodeId, x: f64, y: f64 },
	/// The pressed pointer moved, at graph coordinates.
	DragMove { x: f64, y: f64 },
	/// The press was released.
	DragEnd,
}

/// Side effects the host must apply to the simulation or the camera.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
	/// Pan and zoom the camera onto a node's current position.
	CenterOn {
		node: NodeId,
		zoom: f64,
		duration_ms: f64,
	},
	/// Fix a node at graph coordinates.
	Pin { node: NodeId, x: f64, y: f64 },
	/// Hand a node back to the forces.
	Unpin { node: NodeId },
	/// Restart the cooling cycle.
	Reheat,
}

#[derive(Clone, Debug, PartialEq)]
struct Drag {
	node: NodeId,
	moved: bool,
}

/// Selection, hover and drag state for one graph view.
#[derive(Clone, Debug, Default)]
pub struct InteractionController {
	view: ViewState,
	hovered: Option<NodeId>,
	drag: Option<Drag>,
}

impl InteractionController {
	/// Controller starting from the given view state.
	pub fn new(view: ViewState) -> Self {
		Self {
			view,
			hovered: None,
			drag: None,
		}
	}

	/// Current view state.
	pub fn view(&self) -> &ViewState {
		&self.view
	}

	/// Node under the pointer, if any.
	pub fn hovered(&self) -> Option<&str> {
		self.hovered.as_deref()
	}

	/// Node being dragged, if any.
	pub fn dragging(&self) -> Option<&str> {
		self.drag.as_ref().map(|d| d.node.as_str())
	}

	/// Whether the active drag has moved since it started.
	pub fn drag_moved(&self) -> bool {
		self.drag.as_ref().is_some_and(|d| d.moved)
	}

	/// Applies one event and returns what the host has to do about it.
	pub fn handle(&mut self, event: InteractionEvent) -> Vec<Command> {
		match event {
			InteractionEvent::Click { node } => {
				self.view.selected_node_id = Some(node.clone());
				self.view.center_target_id = Some(node.clone());
				vec![Command::CenterOn {
					node,
					zoom: CENTER_ZOOM,
					duration_ms: CENTER_DURATION_MS,
				}]
			}
			InteractionEvent::HoverStart { node } => {
				self.hovered = Some(node);
				vec![]
			}
			InteractionEvent::HoverEnd => {
				self.hovered = None;
				vec![]
			}
			InteractionEvent::DragStart { node, x, y } => {
				let mut commands = Vec::new();
				if let Some(previous) = self.drag.take() {
					commands.push(Command::Unpin {
						node: previous.node,
					});
				}
				self.drag = Some(Drag {
					node: node.clone(),
					moved: false,
				});
				commands.push(Command::Pin { node, x, y });
				commands
			}
			InteractionEvent::DragMove { x, y } => match self.drag.as_mut() {
				Some(drag) => {
					drag.moved = true;
					vec![Command::Pin {
						node: drag.node.clone(),
						x,
						y,
					}]
				}
				None => vec![],
			},
			// A press that never moved is a click; the layout has nothing to settle.
			InteractionEvent::DragEnd => match self.drag.take() {
				Some(Drag { node, moved: true }) => vec![Command::Unpin { node }, Command::Reheat],
				Some(Drag { node, moved: false }) => vec![Command::Unpin { node }],
				None => vec![],
			},
		}
	}

	/// Clears the selection and camera target.
	pub fn clear_selection(&mut self) {
		self.view.selected_node_id = None;
		self.view.center_target_id = None;
	}

	/// Forgets ids that are not part of a freshly swapped-in graph.
	pub fn retain(&mut self, graph: &Graph) {
		let present = |id: &Option<NodeId>| id.as_deref().is_some_and(|id| graph.node(id).is_some());
		if !present(&self.view.selected_node_id) {
			self.view.selected_node_id = None;
		}
		if !present(&self.view.center_target_id) {
			self.view.center_target_id = None;
		}
		if !present(&self.hovered) {
			self.hovered = None;
		}
		if self
			.drag
			.as_ref()
			.is_some_and(|d| graph.node(&d.node).is_none())
		{
			self.drag = None;
		}
	}
}

/// Which way an edge points relative to the node it was looked up for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
	Incoming,
	Outgoing,
}

/// An edge seen from one of its endpoints.
#[derive(Clone, Debug, PartialEq)]
pub struct Relationship<'a> {
	pub edge: &'a Edge,
	pub direction: Direction,
	/// Id at the far end; the node itself for self-loops.
	pub other: &'a str,
}

/// Every edge touching `id`, in graph order.
pub fn relationships<'a>(graph: &'a Graph, id: &str) -> Vec<Relationship<'a>> {
	graph
		.edges
		.iter()
		.filter_map(|edge| {
			if edge.source == id {
				Some(Relationship {
					edge,
					direction: Direction::Outgoing,
					other: &edge.target,
				})
			} else if edge.target == id {
				Some(Relationship {
					edge,
					direction: Direction::Incoming,
					other: &edge.source,
				})
			} else {
				None
			}
		})
		.collect()
}

/// Fields shown in the hover tooltip and the selection panel.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSummary {
	pub id: NodeId,
	pub name: String,
	pub kind: NodeKind,
	pub category: Option<String>,
	pub confidence: Option<f64>,
}

impl NodeSummary {
	/// Summary of a node.
	pub fn of(node: &Node) -> Self {
		Self {
			id: node.id.clone(),
			name: node.name.clone(),
			kind: node.kind,
			category: node.category.clone(),
			confidence: node.confidence,
		}
	}

	/// Kind, category and confidence on one line, e.g. `"Law · Genetics · 95%"`.
	pub fn details(&self) -> String {
		let mut parts = vec![self.kind.label().to_owned()];
		parts.extend(self.category.clone());
		parts.extend(self.confidence_percent());
		parts.join(" · ")
	}

	/// Confidence as a whole percentage, e.g. `"95%"`.
	pub fn confidence_percent(&self) -> Option<String> {
		self.confidence.map(|c| format!("{:.0}%", c * 100.0))
	}
}
