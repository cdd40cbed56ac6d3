//! Leptos client-side explorer for the biology laws knowledge graph.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, error, info};

// Only reached through rand; pulled in to enable its browser backend.
#[cfg(target_arch = "wasm32")]
use getrandom as _;

// Modules
mod api;
mod components;
mod config;
mod pages;

use crate::api::ApiSession;
use crate::config::AppConfig;

// Top-Level pages
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the graph explorer and handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	let config = AppConfig::from_build_env().unwrap_or_else(|e| {
		error!("invalid build configuration, using defaults: {e}");
		AppConfig::default()
	});
	let session = ApiSession::open(&config.api_url, config.api_token.clone());
	let session_cleanup = session.clone();
	on_cleanup(move || session_cleanup.close());
	provide_context(config);
	provide_context(session);

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />

		// sets the document title
		<Title text="Biology Laws Knowledge Graph" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
				<Route path=path!("/knowledge-graph") view=Home />
			</Routes>
		</Router>
	}
}
