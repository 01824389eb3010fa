use std::sync::{Arc, Mutex};

use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;

use super::*;
use crate::storage::{KeyValueStore, MemoryKeyValueStore, NOTES_KEY};
use crate::sync::{MemoryRemote, RemoteStore};

fn memory_store() -> (Arc<MemoryKeyValueStore>, NoteStore) {
    let kv = Arc::new(MemoryKeyValueStore::new());
    let store = NoteStore::open(LocalStorage::new(Arc::clone(&kv)));
    (kv, store)
}

async fn synced_store(remote: MemoryRemote) -> (Arc<MemoryRemote>, Arc<SyncService>, NoteStore) {
    let remote = Arc::new(remote);
    let sync = Arc::new(SyncService::with_remote(
        Arc::clone(&remote) as Arc<dyn RemoteStore>
    ));
    assert!(sync.sign_in().await);
    let store = NoteStore::open(LocalStorage::new(MemoryKeyValueStore::new()))
        .with_sync(Arc::clone(&sync));
    (remote, sync, store)
}

fn fixed_note(id: &str, title: &str, updated_secs: i64) -> Note {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    Note {
        id: NoteId::from(id),
        title: title.to_string(),
        content: format!("{title} body"),
        created_at: base,
        updated_at: base + Duration::seconds(updated_secs),
    }
}

fn record(events: &Arc<Mutex<Vec<StoreEvent>>>) -> impl Fn(&StoreEvent) + Send + Sync + 'static {
    let sink = Arc::clone(events);
    move |event: &StoreEvent| sink.lock().unwrap().push(*event)
}

#[test]
fn create_prepends_selects_and_persists() {
    let (kv, mut store) = memory_store();

    let first = store.create_note("First", "a");
    let second = store.create_note("  ", "b");

    assert_eq!(second.title, "Untitled Note");
    assert_eq!(second.created_at, second.updated_at);
    assert_eq!(store.notes()[0].id, second.id);
    assert_eq!(store.notes()[1].id, first.id);
    assert_eq!(store.selected_note().map(|n| &n.id), Some(&second.id));

    let stored: Vec<Note> = serde_json::from_str(&kv.get(NOTES_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(stored, store.notes().to_vec());
}

#[test]
fn update_touches_only_given_fields() {
    let (_kv, mut store) = memory_store();
    let note = store.create_note("Title", "content");

    let updated = store
        .update_note(&note.id, NotePatch::default().content("new content"))
        .unwrap();

    assert_eq!(updated.title, "Title");
    assert_eq!(updated.content, "new content");
    assert_eq!(updated.created_at, note.created_at);
    assert!(updated.updated_at >= note.updated_at);
    assert_eq!(store.note(&note.id), Some(&updated));
}

#[test]
fn update_unknown_id_changes_nothing() {
    let (kv, mut store) = memory_store();
    store.create_note("Only", "one");
    let before = kv.get(NOTES_KEY).unwrap();

    let events = Arc::new(Mutex::new(Vec::new()));
    let _subscription = store.subscribe(record(&events));

    assert!(store
        .update_note(&NoteId::from("nope"), NotePatch::default().title("x"))
        .is_none());
    assert_eq!(kv.get(NOTES_KEY).unwrap(), before);
    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn delete_clears_matching_selection_only() {
    let (_kv, mut store) = memory_store();
    let a = store.create_note("A", "");
    let b = store.create_note("B", "");

    assert!(store.delete_note(&a.id));
    assert_eq!(store.state().selected_note_id.as_ref(), Some(&b.id));

    assert!(store.delete_note(&b.id));
    assert_eq!(store.state().selected_note_id, None);
    assert!(store.notes().is_empty());

    assert!(!store.delete_note(&b.id));
}

#[test]
fn select_does_not_validate() {
    let (_kv, mut store) = memory_store();
    store.create_note("A", "");

    store.select_note(Some(NoteId::from("ghost")));

    assert_eq!(store.state().selected_note_id, Some(NoteId::from("ghost")));
    assert!(store.selected_note().is_none());
}

#[test]
fn filtered_notes_follow_view_state() {
    let (_kv, mut store) = memory_store();
    store.create_note("banana", "yellow");
    store.create_note("Apple", "red fruit");
    store.create_note("cherry", "RED and small");

    store.set_search_query("red");
    store.set_sort_by(SortBy::Title);
    store.set_sort_order(SortOrder::Asc);

    let titles = store
        .filtered_notes()
        .into_iter()
        .map(|note| note.title.as_str())
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["Apple", "cherry"]);
}

#[test]
fn sort_preferences_survive_reopen_but_query_does_not() {
    let kv = Arc::new(MemoryKeyValueStore::new());
    {
        let mut store = NoteStore::open(LocalStorage::new(Arc::clone(&kv)));
        store.set_sort_by(SortBy::CreatedAt);
        store.set_sort_order(SortOrder::Asc);
        store.set_search_query("kept in memory only");
    }

    let reopened = NoteStore::open(LocalStorage::new(Arc::clone(&kv)));
    assert_eq!(reopened.state().sort_by, SortBy::CreatedAt);
    assert_eq!(reopened.state().sort_order, SortOrder::Asc);
    assert_eq!(reopened.state().search_query, "");
}

#[test]
fn listeners_receive_events_until_unsubscribed() {
    let (_kv, mut store) = memory_store();
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscription = store.subscribe(record(&events));

    let note = store.create_note("A", "");
    store.set_search_query("a");
    store.delete_note(&note.id);

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            StoreEvent::NotesChanged,
            StoreEvent::SelectionChanged,
            StoreEvent::ViewChanged,
            StoreEvent::NotesChanged,
            StoreEvent::SelectionChanged,
        ]
    );

    subscription.unsubscribe();
    store.create_note("B", "");
    assert_eq!(events.lock().unwrap().len(), 5);
}

#[test]
fn import_creates_fresh_notes_and_rejects_without_mutation() {
    let (_kv, mut store) = memory_store();
    let original = fixed_note("original-id", "Imported", 10);
    let export = backup::export_all(std::slice::from_ref(&original), Utc::now()).unwrap();

    let summary = store.import_backup(export.contents.as_bytes()).unwrap();

    assert_eq!(summary.imported, 1);
    assert_eq!(summary.metadata.total_notes, 1);
    let imported = &store.notes()[0];
    assert_eq!(imported.title, "Imported");
    assert_eq!(imported.content, "Imported body");
    assert_ne!(imported.id, original.id);

    let before = store.notes().to_vec();
    assert!(store.import_backup(br#"{"notes": []}"#).is_err());
    assert_eq!(store.notes(), before.as_slice());
}

#[test]
fn export_note_requires_known_id() {
    let (_kv, mut store) = memory_store();
    let note = store.create_note("Export me", "x");

    let export = store.export_note(&note.id).unwrap();
    assert!(export.file_name.starts_with("note-export_me-"));
    assert!(matches!(
        store.export_note(&NoteId::from("missing")),
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn sync_without_session_is_a_no_op() {
    let (_kv, mut store) = memory_store();
    store.create_note("Local", "");
    assert!(!store.sync_notes().await);

    let sync = Arc::new(SyncService::new(MemoryRemote::new()));
    let mut store = store.with_sync(sync);
    let before = store.notes().to_vec();
    assert!(!store.sync_notes().await);
    assert_eq!(store.notes(), before.as_slice());
}

#[tokio::test]
async fn sync_merges_persists_and_uploads() {
    let remote_newer = fixed_note("shared", "Remote edit", 50);
    let remote_only = fixed_note("remote-only", "From elsewhere", 5);
    let (remote, _sync, mut store) =
        synced_store(MemoryRemote::with_notes(&[remote_newer.clone(), remote_only.clone()])).await;

    store.state.notes = vec![fixed_note("shared", "Local edit", 10)];

    assert!(store.sync_notes().await);

    assert_eq!(store.notes(), &[remote_newer, remote_only][..]);
    assert_eq!(remote.notes(), Some(store.notes().to_vec()));
    assert_eq!(store.storage.load_notes(), store.notes().to_vec());
}

#[tokio::test]
async fn failed_download_leaves_local_untouched() {
    let (remote, sync, mut store) =
        synced_store(MemoryRemote::with_notes(&[fixed_note("r", "Remote", 1)])).await;
    store.state.notes = vec![fixed_note("l", "Local", 1)];
    remote.set_fail_reads(true);

    assert!(!store.sync_notes().await);

    assert_eq!(store.notes(), &[fixed_note("l", "Local", 1)][..]);
    assert!(sync.status().error.is_some());
}

#[tokio::test]
async fn failed_upload_keeps_merge() {
    let (remote, sync, mut store) =
        synced_store(MemoryRemote::with_notes(&[fixed_note("r", "Remote", 1)])).await;
    remote.set_fail_writes(true);

    assert!(!store.sync_notes().await);

    assert_eq!(store.notes(), &[fixed_note("r", "Remote", 1)][..]);
    assert_eq!(store.storage.load_notes().len(), 1);
    assert!(sync
        .status()
        .error
        .unwrap()
        .starts_with("Failed to upload notes"));
}

#[tokio::test]
async fn sync_is_rejected_while_another_sync_runs() {
    let (remote, sync, mut store) =
        synced_store(MemoryRemote::with_notes(&[fixed_note("r", "Remote", 1)])).await;

    let running = sync.begin_sync().await.unwrap();
    assert!(!store.sync_notes().await);
    assert!(store.notes().is_empty());
    drop(running);

    assert!(store.sync_notes().await);
    assert_eq!(store.notes().len(), 1);
    assert_eq!(remote.write_count(), 1);
}

#[tokio::test]
async fn mutations_upload_in_background() {
    let (remote, _sync, mut store) = synced_store(MemoryRemote::new()).await;

    let note = store.create_note("Pushed", "later");
    store.wait_for_uploads().await;

    assert_eq!(remote.notes(), Some(vec![note]));
}

#[tokio::test]
async fn queued_upload_does_not_overwrite_merged_remote() {
    let remote_only = fixed_note("elsewhere", "From elsewhere", 1);
    let (remote, _sync, mut store) =
        synced_store(MemoryRemote::with_notes(&[remote_only.clone()])).await;

    let local = store.create_note("Local", "edit");
    assert!(store.sync_notes().await);
    store.wait_for_uploads().await;

    let remote_notes = remote.notes().unwrap();
    assert_eq!(remote_notes, store.notes().to_vec());
    assert!(remote_notes.contains(&remote_only));
    assert!(remote_notes.contains(&local));
    assert_eq!(remote.write_count(), 1);
}

#[tokio::test]
async fn sync_waits_for_upload_in_progress() {
    let (_remote, sync, mut store) =
        synced_store(MemoryRemote::with_notes(&[fixed_note("r", "Remote", 1)])).await;
    let upload = sync.begin_exchange().await;

    let (synced, ()) = tokio::join!(store.sync_notes(), async move {
        tokio::task::yield_now().await;
        drop(upload);
    });

    assert!(synced);
    assert_eq!(store.notes().len(), 1);
    assert_eq!(sync.status().error, None);
}
