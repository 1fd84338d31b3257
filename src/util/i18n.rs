//! Formatter collaborator for display strings.
//!
//! The bootstrap only needs two strings (landing title and description), so
//! the built-in `Catalog` is a flat key -> message map loaded from a JSON
//! bundle. Missing keys render as the key itself.

#[cfg(test)]
#[path = "i18n_test.rs"]
mod i18n_test;

use std::collections::HashMap;
use std::future::Future;

const EN_BUNDLE: &str = include_str!("../../locales/en.json");

/// Resolves a message key to display text.
pub trait Translate {
    fn translate(&self, key: &str) -> String;
}

/// Async source of a translator (`getFormatter()`).
pub trait FormatterSource {
    type Translator: Translate;

    fn formatter(&self) -> impl Future<Output = Self::Translator>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    messages: HashMap<String, String>,
}

impl Catalog {
    /// The bundled English messages.
    pub fn english() -> Self {
        Self::from_json(EN_BUNDLE).unwrap_or_default()
    }

    /// Parse a flat `{ "key": "message" }` bundle.
    ///
    /// # Errors
    ///
    /// Returns the serde error if `raw` is not a flat string map.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        Ok(Self { messages: serde_json::from_str(raw)? })
    }
}

impl Translate for Catalog {
    fn translate(&self, key: &str) -> String {
        match self.messages.get(key) {
            Some(message) if !message.is_empty() => message.clone(),
            _ => key.to_owned(),
        }
    }
}

impl FormatterSource for Catalog {
    type Translator = Catalog;

    fn formatter(&self) -> impl Future<Output = Catalog> {
        std::future::ready(self.clone())
    }
}
