use thiserror::Error;

/// Why a graph could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
	#[error("data source unreachable: {0}")]
	Http(#[from] reqwest::Error),

	#[error("data source answered with status {0}")]
	Status(u16),

	#[error("malformed graph payload: {0}")]
	Json(#[from] serde_json::Error),

	#[error("malformed graph payload: {0}")]
	Malformed(String),

	#[error("API session has been closed")]
	SessionClosed,
}

/// Result alias for loads.
pub type Result<T> = std::result::Result<T, LoadError>;
