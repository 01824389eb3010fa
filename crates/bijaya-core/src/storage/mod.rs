//! Local persistence for Bijaya Notes
//!
//! [`LocalStorage`] writes the note collection and the preferences record to a
//! durable key-value store. Everything above it treats persistence as
//! fail-soft: it never returns an error to the caller.

mod kv;
mod local;
mod migrations;
mod sqlite;

pub use kv::{KeyValueStore, MemoryKeyValueStore};
pub use local::{LocalStorage, StorageInfo, NOTES_KEY, PREFERENCES_KEY};
pub use sqlite::SqliteKeyValueStore;
