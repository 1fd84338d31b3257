//! Networking modules for the bootstrap's REST calls.
//!
//! SYSTEM CONTEXT
//! ==============
//! `fetch` defines the fetch collaborator, `server_config` and `api` are the
//! two loaders that write into the session, and `types` defines the wire schema.

pub mod api;
pub mod fetch;
pub mod server_config;
pub mod types;
