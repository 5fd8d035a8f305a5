//! # client
//!
//! Leptos frontend for the academy website: marketing pages, the team
//! listing, sign-in, and the role-aware portal.
//!
//! The crate is compiled twice: with `ssr` into the Axum server for
//! server-side rendering, and with `hydrate` into WASM for the browser. All
//! BaaS traffic happens in the browser; the SSR build renders loading states.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: install logging and hydrate the server-rendered body.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed.
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::hydrate_body(app::App);
}
