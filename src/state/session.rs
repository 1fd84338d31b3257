//! Process-wide session state shared by the bootstrap components.
//!
//! SYSTEM CONTEXT
//! ==============
//! Read by the bootstrap orchestrator and the auto-login channel. Written by
//! exactly two owners: the server-config loader (config field) and the auth
//! subsystem (user field). Each owner holds the only writer handle for its
//! field, so the single-writer rule is enforced by ownership rather than by
//! convention.
//!
//! CONCURRENCY
//! ===========
//! Every mutation replaces one field under a short write lock. Readers always
//! see either the old or the new value for a field, never a partial update.
//! User watchers run after the write lock is released.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::net::types::{ServerConfig, User};

/// What the auth subsystem knows about the logged-in user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum UserStatus {
    /// The current-user lookup has not answered (yet).
    #[default]
    Unknown,
    /// The server confirmed nobody is logged in.
    Anonymous,
    SignedIn(User),
}

impl UserStatus {
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::SignedIn(user) => Some(user),
            Self::Unknown | Self::Anonymous => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Point-in-time copy of the session fields.
///
/// An absent config and an `Unknown` user mean "not loaded yet", not
/// "confirmed negative".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user: UserStatus,
    pub server_config: Option<ServerConfig>,
}

impl SessionSnapshot {
    /// `Some(flag)` once the server config has been loaded.
    pub fn server_initialized(&self) -> Option<bool> {
        self.server_config.as_ref().map(|config| config.is_initialized)
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.user()
    }

    /// Email of the logged-in user, if any.
    pub fn current_email(&self) -> Option<&str> {
        self.current_user().map(|user| user.email.as_str())
    }
}

type UserWatcher = Arc<dyn Fn(&UserStatus) + Send + Sync>;

/// Read handle on the shared session. Cheap to clone.
#[derive(Clone)]
pub struct SessionState {
    inner: Arc<RwLock<SessionSnapshot>>,
    watchers: Arc<Mutex<Vec<UserWatcher>>>,
}

impl SessionState {
    /// Create an empty session together with its two writer handles.
    pub fn new() -> (Self, ConfigWriter, UserWriter) {
        let state = Self {
            inner: Arc::new(RwLock::new(SessionSnapshot::default())),
            watchers: Arc::new(Mutex::new(Vec::new())),
        };
        let config_writer = ConfigWriter { state: state.clone() };
        let user_writer = UserWriter { state: state.clone() };
        (state, config_writer, user_writer)
    }

    /// Copy both fields out under a single read lock.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.read().clone()
    }

    pub fn user_status(&self) -> UserStatus {
        self.read().user.clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.read().user.user().cloned()
    }

    pub fn server_config(&self) -> Option<ServerConfig> {
        self.read().server_config.clone()
    }

    /// Call `watcher` every time the current-user lookup settles, with the
    /// status it settled on. Watchers live as long as the session.
    pub fn on_user_settled(&self, watcher: impl Fn(&UserStatus) + Send + Sync + 'static) {
        self.watchers.lock().unwrap_or_else(PoisonError::into_inner).push(Arc::new(watcher));
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionSnapshot> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionSnapshot> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Notify watchers with no lock held, so they may read the session.
    fn user_settled(&self) {
        let status = self.user_status();
        let watchers = self.watchers.lock().unwrap_or_else(PoisonError::into_inner).clone();
        for watcher in watchers {
            watcher(&status);
        }
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let watchers = self.watchers.lock().unwrap_or_else(PoisonError::into_inner).len();
        f.debug_struct("SessionState").field("snapshot", &*self.read()).field("watchers", &watchers).finish()
    }
}

/// Sole writer of `server_config`. Owned by the server-config loader.
#[derive(Debug)]
pub struct ConfigWriter {
    state: SessionState,
}

impl ConfigWriter {
    pub fn set(&self, config: ServerConfig) {
        self.state.write().server_config = Some(config);
    }

    /// Read handle on the same session.
    pub fn reader(&self) -> SessionState {
        self.state.clone()
    }
}

/// Sole writer of the user status. Owned by the auth subsystem.
#[derive(Debug)]
pub struct UserWriter {
    state: SessionState,
}

impl UserWriter {
    pub fn set(&self, user: User) {
        self.state.write().user = UserStatus::SignedIn(user);
        self.state.user_settled();
    }

    /// Record that nobody is logged in (401/403 or explicit logout).
    pub fn clear(&self) {
        self.state.write().user = UserStatus::Anonymous;
        self.state.user_settled();
    }

    /// The lookup ended without an answer. The status stays as it was but
    /// watchers are told not to wait any longer.
    pub fn unresolved(&self) {
        self.state.user_settled();
    }

    /// Read handle on the same session.
    pub fn reader(&self) -> SessionState {
        self.state.clone()
    }
}
