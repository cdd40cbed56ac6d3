use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::info;

use super::error::{LoadError, Result};

#[derive(Debug)]
enum SessionState {
	Open { token: Option<String> },
	Closed,
}

/// Connection context handed to the data loader.
///
/// Opened once when the app starts and closed on teardown. Clones share
/// the same state, so closing any clone closes them all.
#[derive(Clone, Debug)]
pub struct ApiSession {
	base_url: Arc<str>,
	state: Arc<RwLock<SessionState>>,
}

impl ApiSession {
	/// Opens a session against `base_url`, optionally authenticated.
	pub fn open(base_url: &str, token: Option<String>) -> Self {
		let base_url = base_url.trim_end_matches('/');
		info!("API session opened for {base_url}");
		Self {
			base_url: base_url.into(),
			state: Arc::new(RwLock::new(SessionState::Open { token })),
		}
	}

	/// Tears the session down. Later loads fail with [`LoadError::SessionClosed`].
	pub fn close(&self) {
		let mut state = self.write();
		if matches!(*state, SessionState::Open { .. }) {
			info!("API session closed");
		}
		*state = SessionState::Closed;
	}

	/// Whether [`close`](Self::close) has not been called yet.
	pub fn is_open(&self) -> bool {
		matches!(*self.read(), SessionState::Open { .. })
	}

	/// Bearer token to send, or an error once closed.
	pub fn authorization(&self) -> Result<Option<String>> {
		match &*self.read() {
			SessionState::Open { token } => Ok(token.clone()),
			SessionState::Closed => Err(LoadError::SessionClosed),
		}
	}

	fn read(&self) -> RwLockReadGuard<'_, SessionState> {
		self.state.read().unwrap_or_else(PoisonError::into_inner)
	}

	fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
		self.state.write().unwrap_or_else(PoisonError::into_inner)
	}

	/// Absolute URL of an API path.
	pub fn endpoint(&self, path: &str) -> String {
		format!("{}/{}", self.base_url, path.trim_start_matches('/'))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn endpoint_joins_without_double_slashes() {
		let session = ApiSession::open("http://localhost:4000/", None);
		assert_eq!(
			session.endpoint("/law-extraction/getGlobalGraph"),
			"http://localhost:4000/law-extraction/getGlobalGraph"
		);
	}

	#[test]
	fn token_is_sent_while_open() {
		let anonymous = ApiSession::open("http://api", None);
		assert_eq!(anonymous.authorization().unwrap(), None);
		let session = ApiSession::open("http://api", Some("abc".into()));
		assert!(session.is_open());
		assert_eq!(session.authorization().unwrap().as_deref(), Some("abc"));
	}

	#[test]
	fn closing_any_clone_closes_all() {
		let session = ApiSession::open("http://api", Some("t".into()));
		let shared = session.clone();
		shared.close();
		assert!(!session.is_open());
		assert!(matches!(session.authorization(), Err(LoadError::SessionClosed)));
		session.close();
		assert!(!shared.is_open());
	}
}
