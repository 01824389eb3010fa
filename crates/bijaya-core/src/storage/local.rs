//! Fail-soft note and preferences persistence

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::kv::KeyValueStore;
use crate::error::Result;
use crate::models::{Note, Preferences};

/// Key holding the JSON array of notes
pub const NOTES_KEY: &str = "bijaya-notes";
/// Key holding the JSON preferences object
pub const PREFERENCES_KEY: &str = "bijaya-notes-preferences";

/// Size summary of the persisted notes record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageInfo {
    pub total_notes: usize,
    /// Human-readable size, e.g. `"1.25 KB"`
    pub estimated_size: String,
}

/// Write-through persistence for the note collection and preferences.
///
/// Failures are logged and swallowed: saves leave the previous record in
/// place, loads degrade to an empty collection or empty preferences.
pub struct LocalStorage {
    kv: Box<dyn KeyValueStore + Send + Sync>,
}

impl LocalStorage {
    pub fn new(kv: impl KeyValueStore + Send + Sync + 'static) -> Self {
        Self { kv: Box::new(kv) }
    }

    /// Persist the whole collection
    pub fn save_notes(&self, notes: &[Note]) {
        if let Err(error) = self.write_json(NOTES_KEY, notes) {
            tracing::error!("Failed to save notes to local storage: {error}");
        }
    }

    /// Load the collection; empty when absent or unreadable
    pub fn load_notes(&self) -> Vec<Note> {
        match self.read_json::<Vec<Note>>(NOTES_KEY) {
            Ok(notes) => notes.unwrap_or_default(),
            Err(error) => {
                tracing::error!("Failed to load notes from local storage: {error}");
                Vec::new()
            }
        }
    }

    pub fn save_preferences(&self, preferences: &Preferences) {
        if let Err(error) = self.write_json(PREFERENCES_KEY, preferences) {
            tracing::error!("Failed to save preferences: {error}");
        }
    }

    pub fn load_preferences(&self) -> Preferences {
        match self.read_json::<Preferences>(PREFERENCES_KEY) {
            Ok(preferences) => preferences.unwrap_or_default(),
            Err(error) => {
                tracing::error!("Failed to load preferences: {error}");
                Preferences::default()
            }
        }
    }

    /// Remove both the notes and the preferences records
    pub fn clear_all(&self) {
        for key in [NOTES_KEY, PREFERENCES_KEY] {
            if let Err(error) = self.kv.remove(key) {
                tracing::error!("Failed to clear {key} from local storage: {error}");
            }
        }
    }

    /// Count and approximate size of the stored notes record
    pub fn storage_info(&self) -> StorageInfo {
        let raw = match self.kv.get(NOTES_KEY) {
            Ok(raw) => raw.unwrap_or_default(),
            Err(error) => {
                tracing::error!("Failed to read local storage usage: {error}");
                String::new()
            }
        };
        let total_notes = serde_json::from_str::<Vec<serde_json::Value>>(&raw)
            .map(|notes| notes.len())
            .unwrap_or(0);

        StorageInfo {
            total_notes,
            estimated_size: format_kilobytes(raw.len()),
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let serialized = serde_json::to_string(value)?;
        self.kv.set(key, &serialized)
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.kv.get(key)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }
}

#[allow(clippy::cast_precision_loss)]
fn format_kilobytes(bytes: usize) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::SortBy;
    use crate::storage::MemoryKeyValueStore;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::Storage("disk on fire".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Storage("quota exceeded".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(Error::Storage("read-only".to_string()))
        }
    }

    fn memory_storage() -> LocalStorage {
        LocalStorage::new(MemoryKeyValueStore::new())
    }

    #[test]
    fn test_notes_roundtrip_keeps_timestamps() {
        let storage = memory_storage();
        let notes = vec![Note::new("One", "first"), Note::new("Two", "<p>second</p>")];

        storage.save_notes(&notes);

        assert_eq!(storage.load_notes(), notes);
    }

    #[test]
    fn test_record_uses_iso_timestamps() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let storage = LocalStorage::new(Arc::clone(&kv));
        storage.save_notes(&[Note::new("One", "first")]);

        let raw = kv.get(NOTES_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let created = value[0]["createdAt"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(created).is_ok());
        assert_eq!(value[0]["title"], "One");
    }

    #[test]
    fn test_missing_key_loads_empty() {
        let storage = memory_storage();
        assert!(storage.load_notes().is_empty());
        assert!(storage.load_preferences().is_empty());
    }

    #[test]
    fn test_corrupted_record_loads_empty() {
        let kv = MemoryKeyValueStore::new();
        kv.set(NOTES_KEY, "{not json").unwrap();
        kv.set(PREFERENCES_KEY, "[1,2]").unwrap();
        let storage = LocalStorage::new(kv);

        assert!(storage.load_notes().is_empty());
        assert!(storage.load_preferences().is_empty());
    }

    #[test]
    fn test_backend_failures_never_escape() {
        let storage = LocalStorage::new(BrokenStore);

        storage.save_notes(&[Note::new("x", "y")]);
        storage.save_preferences(&Preferences::new());
        storage.clear_all();

        assert!(storage.load_notes().is_empty());
        assert!(storage.load_preferences().is_empty());
        assert_eq!(storage.storage_info().total_notes, 0);
    }

    #[test]
    fn test_preferences_roundtrip() {
        let storage = memory_storage();
        let mut prefs = Preferences::new();
        prefs.set_sort_by(SortBy::CreatedAt);

        storage.save_preferences(&prefs);

        assert_eq!(storage.load_preferences().sort_by(), Some(SortBy::CreatedAt));
    }

    #[test]
    fn test_clear_all_removes_both_records() {
        let storage = memory_storage();
        storage.save_notes(&[Note::new("x", "y")]);
        storage.save_preferences(&Preferences::new());

        storage.clear_all();

        assert!(storage.load_notes().is_empty());
        assert_eq!(storage.storage_info().total_notes, 0);
    }

    #[test]
    fn test_storage_info_counts_notes() {
        let storage = memory_storage();
        assert_eq!(
            storage.storage_info(),
            StorageInfo {
                total_notes: 0,
                estimated_size: "0.00 KB".to_string(),
            }
        );

        storage.save_notes(&[Note::new("a", "b"), Note::new("c", "d")]);
        let info = storage.storage_info();
        assert_eq!(info.total_notes, 2);
        assert!(info.estimated_size.ends_with(" KB"));
    }
}
