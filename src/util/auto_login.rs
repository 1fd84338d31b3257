//! Cross-window auto-login handshake.
//!
//! Another window (or the embedding app) posts `{autoEmail, autoPassword,
//! autoUrl}` to this page. If the page is not already signed in as `autoEmail`
//! it is sent to the login view with `?continue=<path+search of autoUrl>`.
//!
//! SYSTEM CONTEXT
//! ==============
//! The listener lives for the whole page and may fire before, during or after
//! the bootstrap's config load. It only reads the session; the login view does
//! the actual authentication.
//!
//! A message that arrives while the current-user lookup is still running is
//! parked (latest wins) and evaluated once the session reports the lookup
//! settled, see `AutoLoginChannel::watch`.
//!
//! TRADE-OFFS
//! ==========
//! Credentials are dropped on arrival unless `forward_credentials` is enabled,
//! in which case they are parked in a `LoginHandoff` for the login view to
//! take once. Passwords never reach the logs.

#[cfg(test)]
#[path = "auto_login_test.rs"]
mod auto_login_test;

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use url::Url;

use super::navigation::{Navigator, Redirect, login_continue_target};
use crate::config::AutoLoginConfig;
use crate::state::session::{SessionState, UserStatus};

const EMAIL_KEY: &str = "autoEmail";
const PASSWORD_KEY: &str = "autoPassword";
const URL_KEY: &str = "autoUrl";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AutoLoginError {
    #[error("auto-login message from untrusted origin {0}")]
    UntrustedOrigin(String),
    #[error("auto-login message without autoUrl")]
    MissingUrl,
    #[error("auto-login autoUrl is not an absolute URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("auto-login autoUrl has unsupported scheme {0}")]
    UnsupportedScheme(String),
}

/// Email/password pair received over the handshake.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").field("email", &self.email).field("password", &"<redacted>").finish()
    }
}

/// A complete, validated handshake message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutoLoginMessage {
    pub credentials: Credentials,
    pub url: Url,
}

/// What an incoming `message` event turned out to be.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    /// Not a handshake message at all (none of the auto-login keys present).
    Unrelated,
    /// A handshake message missing the email or password.
    Incomplete,
    Complete(AutoLoginMessage),
}

impl Payload {
    /// Classify raw message data.
    ///
    /// # Errors
    ///
    /// Returns an error when email and password are present but `autoUrl` is
    /// missing, not absolute, or not http(s).
    pub fn parse(data: &Value) -> Result<Self, AutoLoginError> {
        let Some(fields) = data.as_object() else {
            return Ok(Self::Unrelated);
        };
        if ![EMAIL_KEY, PASSWORD_KEY, URL_KEY].iter().any(|key| fields.contains_key(*key)) {
            return Ok(Self::Unrelated);
        }

        let field = |key: &str| fields.get(key).and_then(Value::as_str).filter(|value| !value.is_empty());
        let (Some(email), Some(password)) = (field(EMAIL_KEY), field(PASSWORD_KEY)) else {
            return Ok(Self::Incomplete);
        };
        let raw_url = field(URL_KEY).ok_or(AutoLoginError::MissingUrl)?;
        let url = Url::parse(raw_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AutoLoginError::UnsupportedScheme(url.scheme().to_owned()));
        }

        Ok(Self::Complete(AutoLoginMessage {
            credentials: Credentials { email: email.to_owned(), password: password.to_owned() },
            url,
        }))
    }
}

/// What handling a message did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AutoLoginOutcome {
    Ignored,
    /// The session is already signed in as the requested email.
    AlreadySignedIn,
    /// Parked until the current-user lookup settles.
    Deferred,
    Redirected(Redirect),
}

/// One-shot slot the login view reads forwarded credentials from.
#[derive(Clone, Default)]
pub struct LoginHandoff {
    slot: Arc<Mutex<Option<Credentials>>>,
}

impl LoginHandoff {
    /// Park credentials, replacing any not yet taken.
    pub fn offer(&self, credentials: Credentials) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(credentials);
    }

    /// Take the parked credentials, leaving the slot empty.
    pub fn take(&self) -> Option<Credentials> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

impl fmt::Debug for LoginHandoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pending = self.slot.lock().unwrap_or_else(PoisonError::into_inner).is_some();
        f.debug_struct("LoginHandoff").field("pending", &pending).finish()
    }
}

/// Receiver side of the message subscription.
pub trait MessageHandler {
    fn receive(&self, origin: &str, data: &Value) -> AutoLoginOutcome;
}

/// Something that delivers `message` events to a handler for the page lifetime.
pub trait MessageBus {
    /// Subscribe `handler`. Returns `false` if a handler was already installed.
    fn listen(&self, handler: Arc<dyn MessageHandler>) -> bool;
}

pub struct AutoLoginChannel<N> {
    session: SessionState,
    config: AutoLoginConfig,
    login_path: String,
    own_origin: String,
    navigator: N,
    handoff: LoginHandoff,
    pending: Mutex<Option<AutoLoginMessage>>,
}

impl<N: Navigator> AutoLoginChannel<N> {
    pub fn new(
        session: SessionState,
        config: AutoLoginConfig,
        login_path: impl Into<String>,
        own_origin: impl Into<String>,
        navigator: N,
        handoff: LoginHandoff,
    ) -> Self {
        Self {
            session,
            config,
            login_path: login_path.into(),
            own_origin: own_origin.into(),
            navigator,
            handoff,
            pending: Mutex::new(None),
        }
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Validate one message and redirect to login if the session does not match.
    ///
    /// While the current user is still unknown the message is parked and
    /// `Deferred` is returned; `resume` evaluates it later.
    ///
    /// # Errors
    ///
    /// Returns an error for handshake messages from an untrusted origin or
    /// with an unusable `autoUrl`. Nothing is navigated in that case.
    pub fn handle(&self, origin: &str, data: &Value) -> Result<AutoLoginOutcome, AutoLoginError> {
        if !self.config.enabled {
            return Ok(AutoLoginOutcome::Ignored);
        }
        let message = match Payload::parse(data)? {
            Payload::Unrelated | Payload::Incomplete => return Ok(AutoLoginOutcome::Ignored),
            Payload::Complete(message) => message,
        };
        if !self.config.allows_origin(origin, &self.own_origin) {
            return Err(AutoLoginError::UntrustedOrigin(origin.to_owned()));
        }

        let status = self.session.user_status();
        if status.is_known() {
            return Ok(self.evaluate(message, &status));
        }

        log::debug!("auto-login for {} waits for the current user", message.credentials.email);
        *self.pending() = Some(message);
        // The lookup may have settled between the status read and parking.
        let status = self.session.user_status();
        if status.is_known() {
            if let Some(outcome) = self.resume(&status) {
                return Ok(outcome);
            }
        }
        Ok(AutoLoginOutcome::Deferred)
    }

    /// Evaluate the parked message, if any, against `status`.
    ///
    /// An `Unknown` status here means the lookup gave up, and no user is
    /// treated as signed in.
    pub fn resume(&self, status: &UserStatus) -> Option<AutoLoginOutcome> {
        let message = self.pending().take()?;
        Some(self.evaluate(message, status))
    }

    fn evaluate(&self, message: AutoLoginMessage, status: &UserStatus) -> AutoLoginOutcome {
        let AutoLoginMessage { credentials, url } = message;
        let current_email = status.user().map(|user| user.email.as_str());
        if current_email == Some(credentials.email.as_str()) {
            log::debug!("auto-login for {} matches current session", credentials.email);
            return AutoLoginOutcome::AlreadySignedIn;
        }

        log::info!(
            "auto-login for {} does not match session user {current_email:?}, redirecting to login",
            credentials.email
        );
        if self.config.forward_credentials {
            self.handoff.offer(credentials);
        }
        let redirect = Redirect::found(login_continue_target(&self.login_path, &url));
        self.navigator.follow(&redirect);
        AutoLoginOutcome::Redirected(redirect)
    }

    fn pending(&self) -> std::sync::MutexGuard<'_, Option<AutoLoginMessage>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<N: Navigator + Send + Sync + 'static> AutoLoginChannel<N> {
    /// Re-evaluate parked messages whenever the current-user lookup settles.
    pub fn watch(self: &Arc<Self>) {
        let channel = Arc::clone(self);
        self.session.on_user_settled(move |status| {
            if let Some(outcome) = channel.resume(status) {
                log::debug!("parked auto-login message handled: {outcome:?}");
            }
        });
    }
}

impl<N: Navigator> MessageHandler for AutoLoginChannel<N> {
    fn receive(&self, origin: &str, data: &Value) -> AutoLoginOutcome {
        self.handle(origin, data).unwrap_or_else(|e| {
            log::warn!("dropping auto-login message: {e}");
            AutoLoginOutcome::Ignored
        })
    }
}

/// `message` events on `window`, installed at most once per document.
#[cfg(feature = "csr")]
#[derive(Clone, Copy, Debug, Default)]
pub struct WindowMessageBus;

#[cfg(feature = "csr")]
static WINDOW_LISTENER_INSTALLED: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);

#[cfg(feature = "csr")]
impl WindowMessageBus {
    /// Origin of the current page, e.g. `https://photos.example`.
    pub fn own_origin() -> String {
        match web_sys::window().map(|w| w.location().origin()) {
            Some(Ok(origin)) => origin,
            _ => String::new(),
        }
    }
}

#[cfg(feature = "csr")]
fn message_data(event: &web_sys::MessageEvent) -> Value {
    let Ok(raw) = js_sys::JSON::stringify(&event.data()) else {
        return Value::Null;
    };
    match raw.as_string().map(|raw| serde_json::from_str(&raw)) {
        Some(Ok(data)) => data,
        Some(Err(e)) => {
            log::debug!("undecodable window message: {e}");
            Value::Null
        }
        None => Value::Null,
    }
}

#[cfg(feature = "csr")]
impl MessageBus for WindowMessageBus {
    fn listen(&self, handler: Arc<dyn MessageHandler>) -> bool {
        use std::sync::atomic::Ordering;
        use wasm_bindgen::{JsCast, closure::Closure};

        if WINDOW_LISTENER_INSTALLED.swap(true, Ordering::AcqRel) {
            return false;
        }
        let Some(window) = web_sys::window() else {
            WINDOW_LISTENER_INSTALLED.store(false, Ordering::Release);
            return false;
        };

        let cb = Closure::wrap(Box::new(move |event: web_sys::MessageEvent| {
            let outcome = handler.receive(&event.origin(), &message_data(&event));
            log::debug!("window message handled: {outcome:?}");
        }) as Box<dyn FnMut(web_sys::MessageEvent)>);

        if window.add_event_listener_with_callback("message", cb.as_ref().unchecked_ref()).is_err() {
            WINDOW_LISTENER_INSTALLED.store(false, Ordering::Release);
            return false;
        }
        // The listener stays for the page lifetime.
        cb.forget();
        true
    }
}
