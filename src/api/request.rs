use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;

use super::error::Result;
use crate::components::force_graph::Graph;

/// Identity of one issued load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Hands out increasing tokens so only the newest load may land.
#[derive(Clone, Debug, Default)]
pub struct RequestTracker {
	latest: Arc<AtomicU64>,
}

impl RequestTracker {
	/// Tracker with nothing issued yet.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a new load, superseding every earlier one.
	pub fn issue(&self) -> RequestToken {
		RequestToken(self.latest.fetch_add(1, Ordering::Relaxed) + 1)
	}

	/// True when no newer load has been issued since `token`.
	pub fn is_current(&self, token: RequestToken) -> bool {
		self.latest.load(Ordering::Relaxed) == token.0
	}
}

/// What the graph area should show.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum LoadState {
	#[default]
	Idle,
	Loading,
	Ready(Graph),
	/// Loaded fine but there is nothing to draw.
	Empty,
	/// Load failed; the message is shown next to a retry button.
	Failed(String),
}

impl LoadState {
	/// Maps a finished load onto a display state.
	pub fn from_result(result: Result<Graph>) -> Self {
		match result {
			Ok(graph) if graph.is_empty() => Self::Empty,
			Ok(graph) => Self::Ready(graph),
			Err(e) => Self::Failed(e.to_string()),
		}
	}

	/// Applies a finished load unless a newer one has been issued since.
	/// Returns whether the result was applied.
	pub fn resolve(
		&mut self,
		tracker: &RequestTracker,
		token: RequestToken,
		result: Result<Graph>,
	) -> bool {
		if !tracker.is_current(token) {
			debug!("discarding stale load result {token:?}");
			return false;
		}
		*self = Self::from_result(result);
		true
	}

	/// The loaded graph, when there is one.
	pub fn graph(&self) -> Option<&Graph> {
		match self {
			Self::Ready(graph) => Some(graph),
			_ => None,
		}
	}

	/// Whether a load is outstanding.
	pub fn is_loading(&self) -> bool {
		matches!(self, Self::Loading)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::LoadError;
	use crate::components::force_graph::{Node, NodeKind};

	fn graph_for(threshold: f64) -> Graph {
		Graph::new(
			vec![Node::new(format!("t{threshold}"), "n", NodeKind::Law).with_confidence(threshold)],
			vec![],
		)
	}

	#[test]
	fn tokens_increase() {
		let tracker = RequestTracker::new();
		let (a, b) = (tracker.issue(), tracker.issue());
		assert!(a < b);
		assert!(!tracker.is_current(a));
		assert!(tracker.is_current(b));
	}

	#[test]
	fn last_request_wins_when_responses_arrive_out_of_order() {
		let tracker = RequestTracker::new();
		let mut state = LoadState::Loading;

		let issued: Vec<_> = [0.1, 0.9, 0.3].iter().map(|&t| (t, tracker.issue())).collect();

		// 0.3 lands first, then the older requests straggle in.
		let order = [2, 0, 1];
		let applied: Vec<bool> = order
			.iter()
			.map(|&i| {
				let (threshold, token) = issued[i];
				state.resolve(&tracker, token, Ok(graph_for(threshold)))
			})
			.collect();

		assert_eq!(applied, vec![true, false, false]);
		assert_eq!(state, LoadState::Ready(graph_for(0.3)));
	}

	#[test]
	fn stale_failure_does_not_clobber_newer_result() {
		let tracker = RequestTracker::new();
		let mut state = LoadState::Loading;
		let old = tracker.issue();
		let new = tracker.issue();
		assert!(state.resolve(&tracker, new, Ok(graph_for(0.5))));
		assert!(!state.resolve(&tracker, old, Err(LoadError::Status(500))));
		assert!(state.graph().is_some());
	}

	#[test]
	fn empty_graph_and_errors_map_to_explicit_states() {
		assert_eq!(LoadState::from_result(Ok(Graph::default())), LoadState::Empty);
		assert_eq!(
			LoadState::from_result(Err(LoadError::Status(503))),
			LoadState::Failed("data source answered with status 503".into())
		);
		assert!(LoadState::Loading.is_loading());
	}

	#[test]
	fn clones_share_the_counter() {
		let tracker = RequestTracker::new();
		let clone = tracker.clone();
		let first = tracker.issue();
		clone.issue();
		assert!(!tracker.is_current(first));
	}
}
