//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Stitches the health probe, the compiled WASM/CSS bundle under `/pkg`, and
//! Leptos SSR rendering of the site under a single Axum router.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use std::path::PathBuf;

use axum::routing::get;
use axum::{Json, Router};
use client::config::PublicConfig;
use leptos::prelude::*;
use leptos_axum::{LeptosRoutes, generate_route_list};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

/// Routes that do not depend on the Leptos build output.
pub fn base_routes(public: &PublicConfig) -> Router {
    let site_name = public.site_name.clone();
    Router::new().route("/healthz", get(move || healthz(site_name.clone())))
}

/// Full site: health probe, static bundle, and SSR pages.
///
/// # Errors
///
/// Returns an error if the Leptos configuration cannot be loaded (missing or
/// malformed `[[workspace.metadata.leptos]]` section or `LEPTOS_*` variables).
pub fn app(config: &ServerConfig) -> Result<Router, String> {
    let conf = get_configuration(None).map_err(|e| format!("leptos configuration: {e}"))?;
    let leptos_options = conf.leptos_options;
    let routes = generate_route_list(client::app::App);
    let public = config.public.clone();

    let leptos_router = Router::new()
        .leptos_routes_with_context(
            &leptos_options,
            routes,
            {
                let public = public.clone();
                move || provide_context(public.clone())
            },
            {
                let opts = leptos_options.clone();
                let public = public.clone();
                move || client::app::shell(opts.clone(), public.clone())
            },
        )
        .with_state(leptos_options.clone());

    let site_root_path = PathBuf::from(leptos_options.site_root.as_ref());

    Ok(base_routes(&public)
        .merge(leptos_router)
        .nest_service("/pkg", ServeDir::new(site_root_path.join(leptos_options.site_pkg_dir.as_ref())))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http()))
}

async fn healthz(site_name: String) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "site": site_name }))
}
