//! Loading graph snapshots from the law extraction API.

mod error;
mod request;
mod session;
mod source;

pub use error::LoadError;
pub use request::{LoadState, RequestToken, RequestTracker};
pub use session::ApiSession;
pub use source::{GraphQuery, GraphSource, HttpGraphSource, parse_graph};
