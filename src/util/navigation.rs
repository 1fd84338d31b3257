//! Navigation collaborator and redirect-target helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Both the bootstrap orchestrator and the auto-login channel end in the same
//! kind of side effect: "send the browser to this path". They share the
//! `Redirect` value and the `Navigator` seam defined here.

#[cfg(test)]
#[path = "navigation_test.rs"]
mod navigation_test;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

/// HTTP 302 Found: a temporary redirect, not an error.
pub const FOUND: u16 = 302;

/// Query parameter the login view reads to know where to return afterwards.
pub const CONTINUE_PARAM: &str = "continue";

/// Characters left untouched by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A control transfer away from the current load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
    pub status: u16,
    pub location: String,
}

impl Redirect {
    /// A 302 to `location`.
    pub fn found(location: impl Into<String>) -> Self {
        Self { status: FOUND, location: location.into() }
    }
}

/// Performs a redirect. The browser build backs this with the router or
/// `window.location`; tests record the calls.
pub trait Navigator {
    fn redirect(&self, status: u16, location: &str);

    fn follow(&self, redirect: &Redirect) {
        self.redirect(redirect.status, &redirect.location);
    }
}

impl<F> Navigator for F
where
    F: Fn(u16, &str),
{
    fn redirect(&self, status: u16, location: &str) {
        self(status, location);
    }
}

/// How a redirect target is reached from inside the app.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationTarget {
    /// A path the app's own router renders: navigate client-side.
    Router,
    /// Anything else (login view, content app, external sign-in): full page load.
    Location,
}

/// Route `location` through the router only if its path is one of
/// `routed_paths`. Query and fragment are ignored for the match.
pub fn navigation_target(location: &str, routed_paths: &[&str]) -> NavigationTarget {
    if !location.starts_with('/') || location.starts_with("//") {
        return NavigationTarget::Location;
    }
    let path = location.split(['?', '#']).next().unwrap_or_default();
    if routed_paths.contains(&path) { NavigationTarget::Router } else { NavigationTarget::Location }
}

/// Percent-encode `raw` the way `encodeURIComponent` does.
pub fn encode_uri_component(raw: &str) -> String {
    utf8_percent_encode(raw, URI_COMPONENT).to_string()
}

/// Path plus query of `url`, e.g. `/album/42?x=1`. An empty query is dropped.
pub fn path_and_search(url: &Url) -> String {
    match url.query() {
        Some(query) if !query.is_empty() => format!("{}?{query}", url.path()),
        _ => url.path().to_owned(),
    }
}

/// Login path carrying a `continue` parameter that points back at `destination`.
pub fn login_continue_target(login_path: &str, destination: &Url) -> String {
    let encoded = encode_uri_component(&path_and_search(destination));
    format!("{login_path}?{CONTINUE_PARAM}={encoded}")
}

/// Browser navigation via `window.location`, for callers outside the router.
#[cfg(feature = "csr")]
#[derive(Clone, Copy, Debug, Default)]
pub struct LocationNavigator;

#[cfg(feature = "csr")]
impl Navigator for LocationNavigator {
    fn redirect(&self, status: u16, location: &str) {
        log::info!("navigating ({status}) to {location}");
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().set_href(location) {
                log::warn!("navigation to {location} failed: {e:?}");
            }
        }
    }
}
