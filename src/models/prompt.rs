use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved enhancement: the user's prompt and what the service made of it.
///
/// Records are immutable once created; the history only ever prepends or
/// removes them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptRecord {
    /// Opaque unique token. New records use a UUID, older stores used
    /// millisecond strings, so this stays a plain string.
    pub id: String,
    pub original: String,
    pub enhanced: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl PromptRecord {
    /// Builds a record stamped with a fresh id and the current time.
    ///
    /// Returns `None` when either side is blank after trimming; such pairs
    /// are never worth persisting.
    pub fn new(original: impl Into<String>, enhanced: impl Into<String>) -> Option<Self> {
        let original = original.into();
        let enhanced = enhanced.into();
        if original.trim().is_empty() || enhanced.trim().is_empty() {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4().to_string(),
            original,
            enhanced,
            timestamp: Utc::now(),
        })
    }

    /// Case-insensitive containment check over both text fields.
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.original.to_lowercase().contains(needle)
            || self.enhanced.to_lowercase().contains(needle)
    }
}
