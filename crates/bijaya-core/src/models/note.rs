//! Note model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::util::{now_millis, strip_html, truncate_text};

/// Title given to notes saved without one.
pub const DEFAULT_NOTE_TITLE: &str = "Untitled Note";

/// A unique identifier for a note.
///
/// Freshly minted ids are UUID v7 (time-ordered plus random bits), but ids read
/// back from storage, a remote replica or a backup are kept verbatim whatever
/// their shape, so the wrapper stays an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Create a new unique note ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `len` characters, used for short display and file names
    #[must_use]
    pub fn short(&self, len: usize) -> String {
        self.0.chars().take(len).collect()
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A note in the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier
    pub id: NoteId,
    /// Display title, never blank once saved through the store
    pub title: String,
    /// Opaque content payload (may carry rich-text markup)
    pub content: String,
    /// Creation timestamp
    #[serde(with = "super::iso8601")]
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp, the ordering key for conflict resolution
    #[serde(with = "super::iso8601")]
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a note. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl NotePatch {
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

impl Note {
    /// Create a new note with a fresh id and both timestamps set to now
    #[must_use]
    pub fn new(title: &str, content: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: NoteId::new(),
            title: normalize_title(title),
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a patch and refresh `updated_at`.
    ///
    /// `updated_at` never drops below `created_at`, even if the wall clock
    /// stepped backwards since the note was created.
    pub fn apply(&mut self, patch: NotePatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = normalize_title(&title);
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        self.updated_at = now.max(self.created_at);
    }

    /// Case-insensitive substring match against title or content.
    ///
    /// `needle` must already be lowercased; an empty needle matches everything.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.title.to_lowercase().contains(needle)
            || self.content.to_lowercase().contains(needle)
    }

    /// Plain-text preview of the content, markup stripped
    #[must_use]
    pub fn preview(&self, max_len: usize) -> String {
        let plain = strip_html(&self.content);
        let collapsed = plain.split_whitespace().collect::<Vec<_>>().join(" ");
        truncate_text(&collapsed, max_len)
    }
}

/// Replace a blank title with [`DEFAULT_NOTE_TITLE`].
#[must_use]
pub fn normalize_title(title: &str) -> String {
    if title.trim().is_empty() {
        DEFAULT_NOTE_TITLE.to_string()
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_note_id_unique() {
        let id1 = NoteId::new();
        let id2 = NoteId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_note_id_keeps_foreign_shape() {
        let id = NoteId::from("lq2k3j9x0abc");
        assert_eq!(id.as_str(), "lq2k3j9x0abc");
        assert_eq!(id.short(8), "lq2k3j9x");
    }

    #[test]
    fn test_note_new() {
        let note = Note::new("Groceries", "milk, eggs");
        assert_eq!(note.title, "Groceries");
        assert_eq!(note.content, "milk, eggs");
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn test_note_new_blank_title_uses_default() {
        assert_eq!(Note::new("", "x").title, DEFAULT_NOTE_TITLE);
        assert_eq!(Note::new("   ", "x").title, DEFAULT_NOTE_TITLE);
    }

    #[test]
    fn test_apply_patch_refreshes_updated_at() {
        let mut note = Note::new("A", "one");
        let later = note.created_at + Duration::seconds(5);

        note.apply(NotePatch::default().content("two"), later);

        assert_eq!(note.title, "A");
        assert_eq!(note.content, "two");
        assert_eq!(note.updated_at, later);
    }

    #[test]
    fn test_apply_never_moves_updated_at_before_created_at() {
        let mut note = Note::new("A", "one");
        let earlier = note.created_at - Duration::hours(1);

        note.apply(NotePatch::default().title(""), earlier);

        assert_eq!(note.title, DEFAULT_NOTE_TITLE);
        assert!(note.updated_at >= note.created_at);
    }

    #[test]
    fn test_matches_title_or_content() {
        let note = Note::new("Weekly Meeting", "agenda");
        assert!(note.matches("meeting"));
        assert!(note.matches("agen"));
        assert!(note.matches(""));
        assert!(!note.matches("budget"));
    }

    #[test]
    fn test_serialized_field_names() {
        let note = Note::new("T", "C");
        let value = serde_json::to_value(&note).unwrap();
        for key in ["id", "title", "content", "createdAt", "updatedAt"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert!(value["createdAt"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_preview_strips_markup() {
        let note = Note::new("T", "<p>Hello <b>world</b></p>");
        assert_eq!(note.preview(40), "Hello world");
    }
}
