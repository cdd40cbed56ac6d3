mod component;
mod filter;
mod interaction;
mod layout;
mod render;
mod state;
mod types;

pub use component::ForceGraphCanvas;
pub use filter::filter;
pub use interaction::{Direction, InteractionEvent, NodeSummary, relationships};
pub use layout::LayoutParams;
pub use types::{Edge, EdgeKind, Graph, Node, NodeId, NodeKind, ViewState};
