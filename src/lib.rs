//! # landing-gate
//!
//! Leptos + WASM landing route for the photo library web client. Decides, on
//! every cold load, whether to send the visitor to the login view or render
//! the welcome view, and listens for a cross-window auto-login handshake.
//!
//! The decision logic (`bootstrap`, `state`, `net`, `util`) is plain Rust
//! behind small collaborator traits; the `csr` feature adds the browser
//! implementations and the `App` entry point.

pub mod app;
pub mod bootstrap;
pub mod config;
pub mod logging;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

#[cfg(test)]
mod test_support;

/// WASM entry point: set up logging and mount the app.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    logging::init();
    log::debug!("mounting landing-gate");
    leptos::mount::mount_to_body(app::App);
}
