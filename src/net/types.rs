//! Wire DTOs read from the server's REST endpoints.
//!
//! DESIGN
//! ======
//! Field names follow the server's camelCase JSON. Only `isInitialized` is
//! required on the config record; everything else defaults so older or newer
//! servers still decode.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// The user this client instance is logged in as, from the current-user endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier.
    #[serde(default)]
    pub id: String,
    /// Login email; the auto-login handshake compares against this.
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Whether the account has admin rights.
    #[serde(default)]
    pub is_admin: bool,
}

/// Public server configuration from the server-config endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// `true` once an admin account exists on the server.
    pub is_initialized: bool,
    /// `true` once the admin finished onboarding.
    #[serde(default)]
    pub is_onboarded: bool,
    /// Optional banner shown on the login view.
    #[serde(default)]
    pub login_page_message: String,
    /// Label for the OAuth button on the login view.
    #[serde(default)]
    pub oauth_button_text: String,
    /// Public domain used when building share links.
    #[serde(default)]
    pub external_domain: String,
}
