//! Bootstrap configuration: routes, endpoints and the opt-in policies.
//!
//! Values come from an env-style key/value source (`from_lookup`), from
//! variables baked in at build time (`from_build_env`), or from JSON
//! (`from_json`). Every key is optional and falls back to its default.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";
pub const DEFAULT_AUTHENTICATED_PATH: &str = "/photos";
pub const DEFAULT_REGISTER_PATH: &str = "/auth/register";
pub const DEFAULT_SERVER_CONFIG_ENDPOINT: &str = "/api/server/config";
pub const DEFAULT_CURRENT_USER_ENDPOINT: &str = "/api/users/me";
pub const DEFAULT_LOGOUT_ENDPOINT: &str = "/api/auth/logout";
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;

/// Entry in `allowed_origins` that accepts messages from any origin.
pub const ANY_ORIGIN: &str = "*";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("invalid bootstrap config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Cross-window auto-login handshake settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoLoginConfig {
    /// Install the message listener at all.
    pub enabled: bool,
    /// Origins allowed to post handshake messages. Empty means the page's own origin only.
    pub allowed_origins: Vec<String>,
    /// Hand received credentials to the login view instead of dropping them.
    pub forward_credentials: bool,
}

impl Default for AutoLoginConfig {
    fn default() -> Self {
        Self { enabled: true, allowed_origins: Vec::new(), forward_credentials: false }
    }
}

impl AutoLoginConfig {
    /// Whether a message from `origin` may be acted on, given the page's own origin.
    pub fn allows_origin(&self, origin: &str, own_origin: &str) -> bool {
        if self.allowed_origins.is_empty() {
            return origin == own_origin;
        }
        self.allowed_origins.iter().any(|allowed| allowed == ANY_ORIGIN || allowed == origin)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub login_path: String,
    pub authenticated_path: String,
    /// Admin sign-up, linked from the landing view of an uninitialized server.
    pub register_path: String,
    pub server_config_endpoint: String,
    pub current_user_endpoint: String,
    pub logout_endpoint: String,
    pub fetch_timeout_ms: u64,
    /// Send an already-authenticated user straight to `authenticated_path`.
    pub redirect_authenticated: bool,
    pub auto_login: AutoLoginConfig,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            authenticated_path: DEFAULT_AUTHENTICATED_PATH.to_owned(),
            register_path: DEFAULT_REGISTER_PATH.to_owned(),
            server_config_endpoint: DEFAULT_SERVER_CONFIG_ENDPOINT.to_owned(),
            current_user_endpoint: DEFAULT_CURRENT_USER_ENDPOINT.to_owned(),
            logout_endpoint: DEFAULT_LOGOUT_ENDPOINT.to_owned(),
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            redirect_authenticated: false,
            auto_login: AutoLoginConfig::default(),
        }
    }
}

impl BootstrapConfig {
    /// Build config from an env-style source.
    ///
    /// Optional keys:
    /// - `LANDING_LOGIN_PATH`, `LANDING_AUTHENTICATED_PATH`, `LANDING_REGISTER_PATH`
    /// - `LANDING_SERVER_CONFIG_ENDPOINT`, `LANDING_CURRENT_USER_ENDPOINT`, `LANDING_LOGOUT_ENDPOINT`
    /// - `LANDING_FETCH_TIMEOUT_MS`: milliseconds, default 10000
    /// - `LANDING_REDIRECT_AUTHENTICATED`: bool, default false
    /// - `LANDING_AUTO_LOGIN`: bool, default true
    /// - `LANDING_AUTO_LOGIN_ORIGINS`: comma-separated origins, `*` for any
    /// - `LANDING_AUTO_LOGIN_FORWARD`: bool, default false
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidValue` for unparsable numbers/bools or
    /// paths that do not start with `/`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let auto_defaults = AutoLoginConfig::default();
        let allowed_origins = lookup("LANDING_AUTO_LOGIN_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or(auto_defaults.allowed_origins);

        Ok(Self {
            login_path: path_or(&lookup, "LANDING_LOGIN_PATH", defaults.login_path)?,
            authenticated_path: path_or(&lookup, "LANDING_AUTHENTICATED_PATH", defaults.authenticated_path)?,
            register_path: path_or(&lookup, "LANDING_REGISTER_PATH", defaults.register_path)?,
            server_config_endpoint: path_or(&lookup, "LANDING_SERVER_CONFIG_ENDPOINT", defaults.server_config_endpoint)?,
            current_user_endpoint: path_or(&lookup, "LANDING_CURRENT_USER_ENDPOINT", defaults.current_user_endpoint)?,
            logout_endpoint: path_or(&lookup, "LANDING_LOGOUT_ENDPOINT", defaults.logout_endpoint)?,
            fetch_timeout_ms: u64_or(&lookup, "LANDING_FETCH_TIMEOUT_MS", defaults.fetch_timeout_ms)?,
            redirect_authenticated: bool_or(&lookup, "LANDING_REDIRECT_AUTHENTICATED", defaults.redirect_authenticated)?,
            auto_login: AutoLoginConfig {
                enabled: bool_or(&lookup, "LANDING_AUTO_LOGIN", auto_defaults.enabled)?,
                allowed_origins,
                forward_credentials: bool_or(&lookup, "LANDING_AUTO_LOGIN_FORWARD", auto_defaults.forward_credentials)?,
            },
        })
    }

    /// Build config from variables set when the bundle was compiled.
    ///
    /// # Errors
    ///
    /// Same as [`BootstrapConfig::from_lookup`].
    pub fn from_build_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| {
            let value = match key {
                "LANDING_LOGIN_PATH" => option_env!("LANDING_LOGIN_PATH"),
                "LANDING_AUTHENTICATED_PATH" => option_env!("LANDING_AUTHENTICATED_PATH"),
                "LANDING_REGISTER_PATH" => option_env!("LANDING_REGISTER_PATH"),
                "LANDING_SERVER_CONFIG_ENDPOINT" => option_env!("LANDING_SERVER_CONFIG_ENDPOINT"),
                "LANDING_CURRENT_USER_ENDPOINT" => option_env!("LANDING_CURRENT_USER_ENDPOINT"),
                "LANDING_LOGOUT_ENDPOINT" => option_env!("LANDING_LOGOUT_ENDPOINT"),
                "LANDING_FETCH_TIMEOUT_MS" => option_env!("LANDING_FETCH_TIMEOUT_MS"),
                "LANDING_REDIRECT_AUTHENTICATED" => option_env!("LANDING_REDIRECT_AUTHENTICATED"),
                "LANDING_AUTO_LOGIN" => option_env!("LANDING_AUTO_LOGIN"),
                "LANDING_AUTO_LOGIN_ORIGINS" => option_env!("LANDING_AUTO_LOGIN_ORIGINS"),
                "LANDING_AUTO_LOGIN_FORWARD" => option_env!("LANDING_AUTO_LOGIN_FORWARD"),
                _ => None,
            };
            value.map(str::to_owned)
        })
    }

    /// Parse config from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Json` if `raw` is not a valid config object.
    pub fn from_json(raw: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(raw)?)
    }
}

fn path_or<F>(lookup: &F, key: &'static str, default: String) -> Result<String, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) if value.starts_with('/') => {
            let trimmed = value.trim_end_matches('/');
            Ok(if trimmed.is_empty() { "/".to_owned() } else { trimmed.to_owned() })
        }
        Some(value) => Err(SettingsError::InvalidValue { key, value }),
    }
}

fn u64_or<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| SettingsError::InvalidValue { key, value }),
    }
}

fn bool_or<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(SettingsError::InvalidValue { key, value }),
        },
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_owned)
        .collect()
}
