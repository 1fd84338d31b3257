//! Server configuration loader.
//!
//! SYSTEM CONTEXT
//! ==============
//! Owns the session's `ConfigWriter`. The bootstrap orchestrator calls `load`
//! once per landing load and decides how to react to a failure; this module
//! never swallows one.
//!
//! ERROR HANDLING
//! ==============
//! A redirected response is reported as `ConfigLoadError::Redirected` so the
//! caller can follow it as navigation instead of treating it as a failure.
//! That covers a 3xx with a `Location`, and a followed redirect that ended on
//! something other than a config. A followed redirect that still served the
//! config (trailing slash, http -> https) is an ordinary success.

#[cfg(test)]
#[path = "server_config_test.rs"]
mod server_config_test;

use std::sync::atomic::{AtomicBool, Ordering};

use super::fetch::{Fetch, FetchError, FetchRequest};
use super::types::ServerConfig;
use crate::state::session::{ConfigWriter, SessionState};
use crate::util::navigation::{FOUND, Redirect};

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("server config redirected ({status}) to {location}")]
    Redirected { status: u16, location: String },
    #[error("server config request failed: {0}")]
    Status(u16),
    #[error("invalid server config payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("server config load already in flight")]
    InFlight,
}

impl ConfigLoadError {
    /// Whether this failure is really a control transfer to follow.
    pub fn is_navigation(&self) -> bool {
        matches!(self, Self::Redirected { .. })
    }

    /// The redirect to follow, for navigational failures.
    pub fn into_redirect(self) -> Option<Redirect> {
        match self {
            Self::Redirected { status, location } => Some(Redirect { status, location }),
            _ => None,
        }
    }
}

/// Fetches the public server config and records it in the session.
#[derive(Debug)]
pub struct ServerConfigLoader {
    writer: ConfigWriter,
    endpoint: String,
    in_flight: AtomicBool,
}

impl ServerConfigLoader {
    pub fn new(writer: ConfigWriter, endpoint: impl Into<String>) -> Self {
        Self { writer, endpoint: endpoint.into(), in_flight: AtomicBool::new(false) }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Read handle on the session this loader writes to.
    pub fn session(&self) -> SessionState {
        self.writer.reader()
    }

    /// Fetch the config and store it in the session.
    ///
    /// # Errors
    ///
    /// Returns `InFlight` if another load on this loader has not finished,
    /// `Redirected` for 3xx responses carrying a location or for a followed
    /// redirect whose body is not a config, `Status` for any
    /// other non-2xx response, and `Fetch`/`Decode` for transport and payload
    /// failures. The session is left untouched on every error.
    pub async fn load<F: Fetch>(&self, fetcher: &F) -> Result<ServerConfig, ConfigLoadError> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(ConfigLoadError::InFlight)?;
        log::debug!("loading server config from {}", self.endpoint);

        let resp = fetcher.fetch(FetchRequest::get(self.endpoint.as_str())).await?;
        if resp.is_redirect() {
            if let Some(location) = resp.location {
                return Err(ConfigLoadError::Redirected { status: resp.status, location });
            }
        }
        if !resp.is_success() {
            return Err(ConfigLoadError::Status(resp.status));
        }
        let config: ServerConfig = match (serde_json::from_str(&resp.body), resp.location) {
            (Ok(config), _) => config,
            // Redirected somewhere that is not the config (a proxy's sign-in page).
            (Err(_), Some(location)) => return Err(ConfigLoadError::Redirected { status: FOUND, location }),
            (Err(e), None) => return Err(e.into()),
        };

        log::debug!("server config loaded (initialized: {})", config.is_initialized);
        self.writer.set(config.clone());
        Ok(config)
    }
}

/// Clears the in-flight flag even if the load future is dropped mid-request.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
