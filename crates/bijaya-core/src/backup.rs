//! JSON backup codec: full-collection and single-note exports, and validated
//! import of full backups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::{iso8601, Note};

/// Format version written into backup metadata
pub const BACKUP_VERSION: &str = "1.0.0";

/// Errors raised while reading or writing backups
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Failed to parse backup file: {0}")]
    Parse(String),
    #[error("Failed to parse backup file: Invalid backup file format: missing notes array")]
    MissingNotes,
    #[error("Failed to parse backup file: Invalid backup file format: missing metadata")]
    MissingMetadata,
    #[error("Failed to serialize backup: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Serializable note representation used in backups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupNote {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Backup header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMetadata {
    #[serde(default)]
    pub exported_at: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub total_notes: usize,
}

impl BackupMetadata {
    /// Read whatever header fields are usable. Missing or mistyped fields fall
    /// back to their defaults; a non-object header yields all defaults.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let total_notes = value
            .get("totalNotes")
            .and_then(|total| match total {
                Value::Number(number) => number.as_u64(),
                Value::String(text) => text.trim().parse().ok(),
                _ => None,
            })
            .and_then(|total| usize::try_from(total).ok())
            .unwrap_or_default();

        Self {
            exported_at: text("exportedAt"),
            version: text("version"),
            total_notes,
        }
    }

    /// Parsed `exported_at`, when it is a valid timestamp
    pub fn exported_at(&self) -> Option<DateTime<Utc>> {
        iso8601::parse(&self.exported_at).ok()
    }
}

/// Full backup file layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupFile {
    pub notes: Vec<BackupNote>,
    pub metadata: BackupMetadata,
}

/// A rendered export ready to be written out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupExport {
    pub file_name: String,
    pub contents: String,
}

/// A note accepted from a backup. Timestamps are kept as written; the store
/// assigns fresh ones on import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedNote {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Valid subset of a backup file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedBackup {
    pub notes: Vec<ImportedNote>,
    pub metadata: BackupMetadata,
    /// Entries dropped for missing `id`, `title` or `content`
    pub skipped: usize,
}

/// Convert a note into its backup record
#[must_use]
pub fn note_to_backup_item(note: &Note) -> BackupNote {
    BackupNote {
        id: note.id.to_string(),
        title: note.title.clone(),
        content: note.content.clone(),
        created_at: iso8601::format(&note.created_at),
        updated_at: iso8601::format(&note.updated_at),
    }
}

/// Render the whole collection as a pretty-printed backup file.
pub fn export_all(notes: &[Note], exported_at: DateTime<Utc>) -> Result<BackupExport, BackupError> {
    let file = BackupFile {
        notes: notes.iter().map(note_to_backup_item).collect(),
        metadata: BackupMetadata {
            exported_at: iso8601::format(&exported_at),
            version: BACKUP_VERSION.to_string(),
            total_notes: notes.len(),
        },
    };

    Ok(BackupExport {
        file_name: suggested_backup_file_name(exported_at),
        contents: serde_json::to_string_pretty(&file)?,
    })
}

/// Render one note as a bare note object.
pub fn export_single(note: &Note) -> Result<BackupExport, BackupError> {
    Ok(BackupExport {
        file_name: single_note_file_name(note),
        contents: serde_json::to_string_pretty(&note_to_backup_item(note))?,
    })
}

/// Default file name for a full backup taken at `exported_at`.
#[must_use]
pub fn suggested_backup_file_name(exported_at: DateTime<Utc>) -> String {
    format!(
        "bijaya-notes-complete-backup-{}.json",
        exported_at.format("%Y-%m-%d")
    )
}

/// File name for a single-note export: sanitized title plus an id fragment.
#[must_use]
pub fn single_note_file_name(note: &Note) -> String {
    format!(
        "note-{}-{}.json",
        sanitize_file_stem(&note.title),
        note.id.short(8)
    )
}

fn sanitize_file_stem(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Parse and validate a full backup file.
///
/// The top level must be an object with a `notes` array and a non-empty
/// `metadata` value. Notes lacking a non-empty `id`, `title` or `content` are dropped.
pub fn import_backup(bytes: &[u8]) -> Result<ImportedBackup, BackupError> {
    let text = std::str::from_utf8(bytes).map_err(|error| BackupError::Parse(error.to_string()))?;
    let root: Value =
        serde_json::from_str(text).map_err(|error| BackupError::Parse(error.to_string()))?;

    let Some(entries) = root.get("notes").and_then(Value::as_array) else {
        return Err(BackupError::MissingNotes);
    };
    let metadata = match root.get("metadata") {
        Some(value) if is_present(value) => BackupMetadata::from_value(value),
        _ => return Err(BackupError::MissingMetadata),
    };

    let notes = entries.iter().filter_map(imported_note).collect::<Vec<_>>();
    let skipped = entries.len() - notes.len();
    if skipped > 0 {
        tracing::warn!("Skipped {skipped} invalid notes while importing backup");
    }

    Ok(ImportedBackup {
        notes,
        metadata,
        skipped,
    })
}

/// `null`, `false`, `0` and `""` count as absent
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n.abs() > 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn imported_note(entry: &Value) -> Option<ImportedNote> {
    let required = |key: &str| {
        entry
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };
    let optional = |key: &str| entry.get(key).and_then(Value::as_str).map(str::to_string);

    Some(ImportedNote {
        id: required("id")?,
        title: required("title")?,
        content: required("content")?,
        created_at: optional("createdAt"),
        updated_at: optional("updatedAt"),
    })
}
