//! bijaya-core - Core library for Bijaya Notes
//!
//! This crate contains the note model, the local key-value persistence layer,
//! the last-write-wins merge used by sync, the remote sync adapter, the note
//! store state container and the JSON backup codec. Front ends (the CLI today)
//! only talk to [`NoteStore`] and [`SyncService`].

pub mod backup;
pub mod error;
pub mod models;
pub mod observer;
pub mod storage;
pub mod store;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{Note, NoteId, NotePatch, SortBy, SortOrder, SyncConflict, SyncStatus};
pub use store::{NoteStore, StoreEvent};
pub use sync::SyncService;
