//! Note store: the canonical in-memory collection plus selection, search and
//! sort state.
//!
//! Every mutation commits in-memory state, writes through to
//! [`LocalStorage`], notifies subscribers and, when a remote session is
//! active, hands a snapshot to a background upload. Local work never waits on
//! or fails because of the remote side.

mod state;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use chrono::Utc;

pub use state::{filter_and_sort, StoreState};

use crate::backup::{self, BackupError, BackupExport, BackupMetadata};
use crate::error::{Error, Result};
use crate::models::{Note, NoteId, NotePatch, Preferences, SortBy, SortOrder};
use crate::observer::{Listeners, Subscription};
use crate::storage::{LocalStorage, StorageInfo};
use crate::sync::{merge_with_report, SyncService};
use crate::util::now_millis;

/// What changed in a committed store mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// The collection changed (create, update, delete, sync, import)
    NotesChanged,
    /// The selected note id changed
    SelectionChanged,
    /// Search query, sort key or sort order changed
    ViewChanged,
}

/// Outcome of a successful backup import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    /// Notes created from the backup
    pub imported: usize,
    /// Entries dropped during validation
    pub skipped: usize,
    pub metadata: BackupMetadata,
}

/// State container for the note collection
pub struct NoteStore {
    state: StoreState,
    storage: LocalStorage,
    preferences: Preferences,
    sync: Option<Arc<SyncService>>,
    listeners: Listeners<StoreEvent>,
}

impl NoteStore {
    /// Create an empty store over `storage` without reading it
    pub fn new(storage: LocalStorage) -> Self {
        Self {
            state: StoreState::default(),
            storage,
            preferences: Preferences::default(),
            sync: None,
            listeners: Listeners::new(),
        }
    }

    /// Create a store and load persisted notes and view preferences
    pub fn open(storage: LocalStorage) -> Self {
        let mut store = Self::new(storage);
        store.initialize();
        store
    }

    /// Attach the remote sync adapter
    #[must_use]
    pub fn with_sync(mut self, sync: Arc<SyncService>) -> Self {
        self.sync = Some(sync);
        self
    }

    /// Load notes and view preferences from local storage
    pub fn initialize(&mut self) {
        self.state.notes = self.storage.load_notes();
        self.preferences = self.storage.load_preferences();
        if let Some(sort_by) = self.preferences.sort_by() {
            self.state.sort_by = sort_by;
        }
        if let Some(sort_order) = self.preferences.sort_order() {
            self.state.sort_order = sort_order;
        }
        tracing::debug!("Loaded {} notes from local storage", self.state.notes.len());
        self.listeners.notify(&StoreEvent::NotesChanged);
        self.listeners.notify(&StoreEvent::ViewChanged);
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn notes(&self) -> &[Note] {
        &self.state.notes
    }

    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.state.find(id)
    }

    pub fn selected_note(&self) -> Option<&Note> {
        self.state.selected_note()
    }

    pub fn filtered_notes(&self) -> Vec<&Note> {
        self.state.filtered_notes()
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn storage_info(&self) -> StorageInfo {
        self.storage.storage_info()
    }

    pub fn sync_service(&self) -> Option<&Arc<SyncService>> {
        self.sync.as_ref()
    }

    /// Subscribe to committed mutations
    pub fn subscribe(&self, listener: impl Fn(&StoreEvent) + Send + Sync + 'static) -> Subscription {
        self.listeners.subscribe(listener)
    }

    /// Create a note, prepend it and select it
    pub fn create_note(&mut self, title: &str, content: impl Into<String>) -> Note {
        let note = Note::new(title, content);
        self.state.notes.insert(0, note.clone());
        self.state.selected_note_id = Some(note.id.clone());
        self.commit_notes();
        self.listeners.notify(&StoreEvent::SelectionChanged);
        note
    }

    /// Apply `patch` to the note with `id`. Unknown ids are a no-op.
    pub fn update_note(&mut self, id: &NoteId, patch: NotePatch) -> Option<Note> {
        let position = self.state.position(id)?;
        let note = &mut self.state.notes[position];
        note.apply(patch, now_millis());
        let updated = note.clone();
        self.commit_notes();
        Some(updated)
    }

    /// Remove the note with `id`, clearing the selection if it pointed at it.
    /// Returns `false` (and does nothing) for unknown ids.
    pub fn delete_note(&mut self, id: &NoteId) -> bool {
        let Some(position) = self.state.position(id) else {
            return false;
        };
        self.state.notes.remove(position);
        let was_selected = self.state.selected_note_id.as_ref() == Some(id);
        if was_selected {
            self.state.selected_note_id = None;
        }
        self.commit_notes();
        if was_selected {
            self.listeners.notify(&StoreEvent::SelectionChanged);
        }
        true
    }

    /// Set the selection without checking that the note exists
    pub fn select_note(&mut self, id: Option<NoteId>) {
        self.state.selected_note_id = id;
        self.listeners.notify(&StoreEvent::SelectionChanged);
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.state.search_query = query.into();
        self.listeners.notify(&StoreEvent::ViewChanged);
    }

    pub fn set_sort_by(&mut self, sort_by: SortBy) {
        self.state.sort_by = sort_by;
        self.preferences.set_sort_by(sort_by);
        self.storage.save_preferences(&self.preferences);
        self.listeners.notify(&StoreEvent::ViewChanged);
    }

    pub fn set_sort_order(&mut self, sort_order: SortOrder) {
        self.state.sort_order = sort_order;
        self.preferences.set_sort_order(sort_order);
        self.storage.save_preferences(&self.preferences);
        self.listeners.notify(&StoreEvent::ViewChanged);
    }

    /// Download, merge, persist and upload.
    ///
    /// Returns `false` without side effects when not signed in or when another
    /// sync is running. A running upload is waited for. A failed download leaves
    /// local state untouched; a failed upload keeps the merged collection.
    /// Background uploads still queued from earlier mutations are dropped once
    /// the merge has absorbed them.
    pub async fn sync_notes(&mut self) -> bool {
        let Some(sync) = self.sync.clone() else {
            return false;
        };
        if !sync.is_signed_in() {
            return false;
        }
        let Some(exchange) = sync.begin_sync().await else {
            tracing::warn!("Sync already in progress; ignoring request");
            return false;
        };

        let Some(remote) = exchange.download().await else {
            return false;
        };

        let outcome = merge_with_report(&self.state.notes, &remote);
        for conflict in &outcome.conflicts {
            tracing::debug!(
                "Resolved conflict on note {} ({}): {:?} wins",
                conflict.note_id,
                conflict.strategy(),
                conflict.winner
            );
        }
        tracing::info!(
            "Merged {} local and {} remote notes into {} ({} conflicts)",
            self.state.notes.len(),
            remote.len(),
            outcome.notes.len(),
            outcome.conflicts.len()
        );

        self.storage.save_notes(&outcome.notes);
        self.state.notes = outcome.notes;
        self.listeners.notify(&StoreEvent::NotesChanged);

        exchange.supersede_pending_uploads();
        exchange.upload(&self.state.notes).await
    }

    /// Validate a backup, then create each valid note through
    /// [`Self::create_note`] (fresh ids and timestamps). Nothing changes if
    /// validation fails.
    pub fn import_backup(&mut self, bytes: &[u8]) -> std::result::Result<ImportSummary, BackupError> {
        let backup = backup::import_backup(bytes)?;
        for note in &backup.notes {
            self.create_note(&note.title, note.content.clone());
        }
        tracing::info!("Imported {} notes from backup", backup.notes.len());
        Ok(ImportSummary {
            imported: backup.notes.len(),
            skipped: backup.skipped,
            metadata: backup.metadata,
        })
    }

    /// Full-collection backup of the current notes
    pub fn export_all(&self) -> std::result::Result<BackupExport, BackupError> {
        backup::export_all(&self.state.notes, Utc::now())
    }

    /// Single-note export
    pub fn export_note(&self, id: &NoteId) -> Result<BackupExport> {
        let note = self
            .note(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        backup::export_single(note).map_err(|error| Error::InvalidInput(error.to_string()))
    }

    /// Wait for background uploads triggered by earlier mutations
    pub async fn wait_for_uploads(&self) {
        if let Some(sync) = &self.sync {
            sync.wait_for_uploads().await;
        }
    }

    fn commit_notes(&self) {
        self.storage.save_notes(&self.state.notes);
        self.listeners.notify(&StoreEvent::NotesChanged);
        self.schedule_upload();
    }

    fn schedule_upload(&self) {
        if let Some(sync) = &self.sync {
            if sync.is_signed_in() {
                sync.spawn_upload(self.state.notes.clone());
            }
        }
    }
}
