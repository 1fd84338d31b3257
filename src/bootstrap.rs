//! Landing-page bootstrap: decide between redirecting and rendering.
//!
//! SYSTEM CONTEXT
//! ==============
//! Runs once per cold load of the landing route, before anything renders:
//!
//! ```text
//! Start -> ConfigPending -> Decided(Redirect | Render)
//! ```
//!
//! `Start` subscribes the auto-login channel, `ConfigPending` awaits the
//! server-config loader, `Decided` reads the session and produces a
//! `BootstrapDecision`. The channel keeps running afterwards on its own.
//!
//! ERROR HANDLING
//! ==============
//! A redirected config request is followed. Every other config failure is
//! logged and the load fails open to rendering the landing view, with the
//! config treated as unknown.

#[cfg(test)]
#[path = "bootstrap_test.rs"]
mod bootstrap_test;

use std::sync::Arc;

use serde::Serialize;

use crate::config::BootstrapConfig;
use crate::net::fetch::Fetch;
use crate::net::server_config::ServerConfigLoader;
use crate::util::auto_login::{MessageBus, MessageHandler};
use crate::util::i18n::{FormatterSource, Translate};
use crate::util::navigation::{Navigator, Redirect};

pub const TITLE_KEY: &str = "welcome";
pub const DESCRIPTION_KEY: &str = "web_interface";

/// Title/description for the landing view's document head.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LandingMeta {
    pub title: String,
    pub description: String,
}

/// Payload handed to the view layer when the landing view renders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LandingData {
    pub meta: LandingMeta,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BootstrapDecision {
    Redirect(Redirect),
    Render(LandingData),
}

impl BootstrapDecision {
    pub fn redirect(&self) -> Option<&Redirect> {
        match self {
            Self::Redirect(redirect) => Some(redirect),
            Self::Render(_) => None,
        }
    }

    pub fn landing(&self) -> Option<&LandingData> {
        match self {
            Self::Render(data) => Some(data),
            Self::Redirect(_) => None,
        }
    }
}

/// Build the landing head strings from a translator.
pub fn landing_meta<T: Translate>(translator: &T) -> LandingMeta {
    LandingMeta {
        title: format!("{} 🎉", translator.translate(TITLE_KEY)),
        description: translator.translate(DESCRIPTION_KEY),
    }
}

/// One landing load. Consumed by `decide`/`run`, so a load cannot be retried.
pub struct Bootstrap<'a> {
    config: &'a BootstrapConfig,
    loader: &'a ServerConfigLoader,
    auto_login: Option<(&'a dyn MessageBus, Arc<dyn MessageHandler>)>,
}

impl<'a> Bootstrap<'a> {
    pub fn new(config: &'a BootstrapConfig, loader: &'a ServerConfigLoader) -> Self {
        Self { config, loader, auto_login: None }
    }

    /// Subscribe `handler` to `bus` when the load starts.
    #[must_use]
    pub fn with_auto_login(mut self, bus: &'a dyn MessageBus, handler: Arc<dyn MessageHandler>) -> Self {
        self.auto_login = Some((bus, handler));
        self
    }

    /// Run the load and return the decision without navigating.
    pub async fn decide<F, S>(self, fetcher: &F, formatter: &S) -> BootstrapDecision
    where
        F: Fetch,
        S: FormatterSource,
    {
        self.start();

        let loaded = match self.loader.load(fetcher).await {
            Ok(_) => true,
            Err(e) if e.is_navigation() => {
                if let Some(redirect) = e.into_redirect() {
                    log::info!("server config redirected, following to {}", redirect.location);
                    return BootstrapDecision::Redirect(redirect);
                }
                false
            }
            Err(e) => {
                log::warn!("server config unavailable, rendering landing view: {e}");
                false
            }
        };

        let snapshot = self.loader.session().snapshot();
        if self.config.redirect_authenticated && snapshot.current_user().is_some() {
            log::info!("user already authenticated, redirecting to {}", self.config.authenticated_path);
            return BootstrapDecision::Redirect(Redirect::found(self.config.authenticated_path.as_str()));
        }
        let initialized = if loaded { snapshot.server_initialized() } else { None };
        if initialized == Some(true) {
            log::info!("server initialized, redirecting to {}", self.config.login_path);
            return BootstrapDecision::Redirect(Redirect::found(self.config.login_path.as_str()));
        }

        let translator = formatter.formatter().await;
        BootstrapDecision::Render(LandingData { meta: landing_meta(&translator) })
    }

    /// Run the load and perform the redirect, if that is the decision.
    pub async fn run<F, S, N>(self, fetcher: &F, formatter: &S, navigator: &N) -> BootstrapDecision
    where
        F: Fetch,
        S: FormatterSource,
        N: Navigator,
    {
        let decision = self.decide(fetcher, formatter).await;
        if let Some(redirect) = decision.redirect() {
            navigator.follow(redirect);
        }
        decision
    }

    fn start(&self) {
        let Some((bus, handler)) = &self.auto_login else {
            return;
        };
        if !self.config.auto_login.enabled {
            log::debug!("auto-login disabled, not listening for handshake messages");
            return;
        }
        if bus.listen(Arc::clone(handler)) {
            log::debug!("auto-login listener installed");
        } else {
            log::debug!("auto-login listener already installed");
        }
    }
}
