//! Root application component and the shared bootstrap context.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::config::BootstrapConfig;
use crate::net::api::CurrentUserLoader;
use crate::net::server_config::ServerConfigLoader;
use crate::pages::landing::LandingPage;
use crate::state::session::SessionState;
use crate::util::auto_login::LoginHandoff;

/// Everything the landing route needs, created once per page.
///
/// The session's two writer handles go straight into their loaders, so
/// nothing else in the app can mutate the session.
#[derive(Clone, Debug)]
pub struct AppContext {
    pub config: Arc<BootstrapConfig>,
    pub session: SessionState,
    pub server_config: Arc<ServerConfigLoader>,
    pub users: Arc<CurrentUserLoader>,
    pub handoff: LoginHandoff,
}

impl AppContext {
    pub fn new(config: BootstrapConfig) -> Self {
        let (session, config_writer, user_writer) = SessionState::new();
        let server_config = ServerConfigLoader::new(config_writer, config.server_config_endpoint.as_str());
        let users = CurrentUserLoader::new(
            user_writer,
            config.current_user_endpoint.as_str(),
            config.logout_endpoint.as_str(),
        );
        Self {
            config: Arc::new(config),
            session,
            server_config: Arc::new(server_config),
            users: Arc::new(users),
            handoff: LoginHandoff::default(),
        }
    }

    /// Context built from build-time settings, falling back to defaults.
    pub fn from_build_env() -> Self {
        let config = BootstrapConfig::from_build_env().unwrap_or_else(|e| {
            log::warn!("ignoring build-time bootstrap settings: {e}");
            BootstrapConfig::default()
        });
        Self::new(config)
    }
}

/// Paths rendered by this app's router. Every other redirect target is left
/// to the browser.
pub const ROUTED_PATHS: &[&str] = &["/"];

/// Root application component.
///
/// Provides the bootstrap context (and the login handoff for the login view)
/// and sets up client-side routing.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let ctx = AppContext::from_build_env();
    provide_context(ctx.clone());
    provide_context(ctx.handoff.clone());

    // Auth subsystem: learn who is logged in so the auto-login handshake has
    // something to compare against. Runs concurrently with the landing
    // bootstrap; readers treat a missing user as unknown.
    #[cfg(feature = "csr")]
    {
        let users = Arc::clone(&ctx.users);
        let timeout_ms = ctx.config.fetch_timeout_ms;
        leptos::task::spawn_local(async move {
            let fetcher = crate::net::fetch::GlooFetcher::new(timeout_ms);
            if let Err(e) = users.load(&fetcher).await {
                log::warn!("current user unavailable: {e}");
            }
        });
    }

    view! {
        <Title text="Photos"/>

        <Router>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=StaticSegment("") view=LandingPage/>
            </Routes>
        </Router>
    }
}
