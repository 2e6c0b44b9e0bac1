//! The record type shared by every tweet source.
//!
//! The upstream document store is schemaless, so both fields are optional:
//! a record with a missing `text` or `category` still decodes and is kept.
//!
//! ## For contributors
//!
//! Records have no identifier and are never addressed individually.  If you
//! need one, derive it from the position in the fetched sequence rather than
//! adding a field the backend does not send.

use serde::Deserialize;

/// A single tweet as stored in the hosted document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Tweet {
    /// Body text shown on the detail screen.
    #[serde(default)]
    pub text: Option<String>,

    /// Category the tweet is filed under.
    #[serde(default)]
    pub category: Option<String>,
}

impl Tweet {
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            category: Some(category.into()),
        }
    }

    /// Text to render, with a placeholder for records that have none.
    pub fn display_text(&self) -> &str {
        self.text.as_deref().unwrap_or("(no text)")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
