//! Utility helpers shared across the bootstrap modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns (navigation, window
//! messages, display strings) from the bootstrap decision logic.

pub mod auto_login;
pub mod i18n;
pub mod navigation;
