//! Current-user REST helpers: the auth subsystem's side of the session.
//!
//! SYSTEM CONTEXT
//! ==============
//! `CurrentUserLoader` owns the session's `UserWriter`, the only handle that
//! may set or clear the logged-in user. The app runs it once at start-up so the
//! auto-login channel has a user to compare against.
//!
//! ERROR HANDLING
//! ==============
//! 401/403 are answers ("nobody is logged in"), not failures. Anything else
//! non-2xx propagates and leaves the user status as it was (usually
//! `Unknown`).

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use super::fetch::{Fetch, FetchError, FetchRequest};
use super::types::User;
use crate::state::session::{SessionState, UserWriter};

#[derive(Debug, thiserror::Error)]
pub enum UserLoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("current user request failed: {0}")]
    Status(u16),
    #[error("invalid current user payload: {0}")]
    Decode(#[from] serde_json::Error),
}

fn is_unauthenticated(status: u16) -> bool {
    matches!(status, 401 | 403)
}

/// Loads and clears the logged-in user.
#[derive(Debug)]
pub struct CurrentUserLoader {
    writer: UserWriter,
    endpoint: String,
    logout_endpoint: String,
}

impl CurrentUserLoader {
    pub fn new(writer: UserWriter, endpoint: impl Into<String>, logout_endpoint: impl Into<String>) -> Self {
        Self { writer, endpoint: endpoint.into(), logout_endpoint: logout_endpoint.into() }
    }

    pub fn session(&self) -> SessionState {
        self.writer.reader()
    }

    /// Fetch the current user and record the answer in the session.
    ///
    /// Returns `Ok(None)` when the server says nobody is logged in.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, unexpected status, or an
    /// undecodable body. The user status is not modified in those cases, but
    /// session watchers are still told the lookup is over.
    pub async fn load<F: Fetch>(&self, fetcher: &F) -> Result<Option<User>, UserLoadError> {
        let result = self.fetch_user(fetcher).await;
        if result.is_err() {
            self.writer.unresolved();
        }
        result
    }

    async fn fetch_user<F: Fetch>(&self, fetcher: &F) -> Result<Option<User>, UserLoadError> {
        let resp = fetcher.fetch(FetchRequest::get(self.endpoint.as_str())).await?;
        if is_unauthenticated(resp.status) {
            log::debug!("no authenticated user ({})", resp.status);
            self.writer.clear();
            return Ok(None);
        }
        if !resp.is_success() {
            return Err(UserLoadError::Status(resp.status));
        }
        let user: User = serde_json::from_str(&resp.body)?;
        log::debug!("authenticated as user {}", user.id);
        self.writer.set(user.clone());
        Ok(Some(user))
    }

    /// Log out on the server (best effort) and forget the user locally.
    pub async fn logout<F: Fetch>(&self, fetcher: &F) {
        match fetcher.fetch(FetchRequest::post(self.logout_endpoint.as_str())).await {
            Ok(resp) if !resp.is_success() => log::warn!("logout request failed: {}", resp.status),
            Ok(_) => {}
            Err(e) => log::warn!("logout request failed: {e}"),
        }
        self.writer.clear();
    }
}
