//! Build-time configuration.
//!
//! A CSR bundle has no process environment, so values are baked in from
//! `LAWGRAPH_*` variables when the crate is compiled.

use thiserror::Error;

use crate::components::force_graph::{LayoutParams, ViewState};

/// API used when `LAWGRAPH_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:4000";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
	#[error("{key} must be a whole number, got {value:?}")]
	InvalidNumber { key: &'static str, value: String },

	#[error("{key} must be a number in [0, 1], got {value:?}")]
	InvalidFraction { key: &'static str, value: String },
}

/// Inputs shaping one graph view.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphConfig {
	pub show_papers: bool,
	pub show_concepts: bool,
	pub confidence_threshold: f64,
	pub max_ticks: u32,
	pub viewport_width: f64,
	pub viewport_height: f64,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			show_papers: true,
			show_concepts: true,
			confidence_threshold: 0.5,
			max_ticks: LayoutParams::default().max_ticks,
			viewport_width: 800.0,
			viewport_height: 600.0,
		}
	}
}

impl GraphConfig {
	/// Initial view state: filters from the config, nothing selected.
	pub fn view_state(&self) -> ViewState {
		ViewState {
			show_papers: self.show_papers,
			show_concepts: self.show_concepts,
			confidence_threshold: self.confidence_threshold,
			..ViewState::default()
		}
	}

	/// Solver parameters with this config's tick budget.
	pub fn layout_params(&self) -> LayoutParams {
		LayoutParams {
			max_ticks: self.max_ticks,
			..LayoutParams::default()
		}
	}
}

/// Application-wide settings.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
	pub api_url: String,
	pub api_token: Option<String>,
	pub graph: GraphConfig,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			api_url: DEFAULT_API_URL.to_owned(),
			api_token: None,
			graph: GraphConfig::default(),
		}
	}
}

impl AppConfig {
	/// Settings baked in at compile time.
	pub fn from_build_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| match key {
			"LAWGRAPH_API_URL" => option_env!("LAWGRAPH_API_URL"),
			"LAWGRAPH_API_TOKEN" => option_env!("LAWGRAPH_API_TOKEN"),
			"LAWGRAPH_MAX_TICKS" => option_env!("LAWGRAPH_MAX_TICKS"),
			"LAWGRAPH_CONFIDENCE_THRESHOLD" => option_env!("LAWGRAPH_CONFIDENCE_THRESHOLD"),
			_ => None,
		})
	}

	/// Builds settings from a key lookup; unset or blank keys keep their defaults.
	pub fn from_lookup<'a>(lookup: impl Fn(&str) -> Option<&'a str>) -> Result<Self, ConfigError> {
		let get = |key: &str| lookup(key).map(str::trim).filter(|v| !v.is_empty());
		let mut config = Self::default();

		if let Some(url) = get("LAWGRAPH_API_URL") {
			config.api_url = url.to_owned();
		}
		config.api_token = get("LAWGRAPH_API_TOKEN").map(str::to_owned);

		if let Some(raw) = get("LAWGRAPH_MAX_TICKS") {
			config.graph.max_ticks = raw.parse().map_err(|_| ConfigError::InvalidNumber {
				key: "LAWGRAPH_MAX_TICKS",
				value: raw.to_owned(),
			})?;
		}
		if let Some(raw) = get("LAWGRAPH_CONFIDENCE_THRESHOLD") {
			config.graph.confidence_threshold = raw
				.parse::<f64>()
				.ok()
				.filter(|t| (0.0..=1.0).contains(t))
				.ok_or_else(|| ConfigError::InvalidFraction {
					key: "LAWGRAPH_CONFIDENCE_THRESHOLD",
					value: raw.to_owned(),
				})?;
		}
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;

	fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<&'a str> {
		let map: HashMap<&str, &str> = pairs.iter().copied().collect();
		move |key: &str| map.get(key).copied()
	}

	#[test]
	fn defaults_when_nothing_is_set() {
		let config = AppConfig::from_lookup(|_| None).unwrap();
		assert_eq!(config, AppConfig::default());
		assert_eq!(config.graph.max_ticks, 100);
		assert_eq!(config.api_url, DEFAULT_API_URL);
	}

	#[test]
	fn reads_overrides() {
		let pairs = [
			("LAWGRAPH_API_URL", "https://laws.example.org"),
			("LAWGRAPH_API_TOKEN", " secret "),
			("LAWGRAPH_MAX_TICKS", "250"),
			("LAWGRAPH_CONFIDENCE_THRESHOLD", "0.25"),
		];
		let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
		assert_eq!(config.api_url, "https://laws.example.org");
		assert_eq!(config.api_token.as_deref(), Some("secret"));
		assert_eq!(config.graph.layout_params().max_ticks, 250);
		assert_eq!(config.graph.view_state().confidence_threshold, 0.25);
	}

	#[test]
	fn blank_token_means_anonymous() {
		let pairs = [("LAWGRAPH_API_TOKEN", "  ")];
		let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
		assert_eq!(config.api_token, None);
	}

	#[test]
	fn rejects_bad_numbers() {
		let pairs = [("LAWGRAPH_MAX_TICKS", "lots")];
		assert_eq!(
			AppConfig::from_lookup(lookup(&pairs)),
			Err(ConfigError::InvalidNumber {
				key: "LAWGRAPH_MAX_TICKS",
				value: "lots".into()
			})
		);
		let pairs = [("LAWGRAPH_CONFIDENCE_THRESHOLD", "2")];
		assert!(matches!(
			AppConfig::from_lookup(lookup(&pairs)),
			Err(ConfigError::InvalidFraction { .. })
		));
	}
}
