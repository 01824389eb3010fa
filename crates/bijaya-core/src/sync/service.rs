//! Remote sync adapter: status tracking, observers and serialized exchanges

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::MutexGuard;
use tokio::task::JoinSet;

use super::remote::{RemotePayload, RemoteStore};
use crate::models::{Note, SyncStatus};
use crate::observer::{Listeners, Subscription};
use crate::util::now_millis;

/// Service object owning the remote link.
///
/// Built once by the composition root and shared by `Arc`. All remote
/// operations go through an [`Exchange`] token, so at most one upload or
/// download touches the remote at a time. Background uploads are numbered;
/// a sync marks every upload queued before its merge as superseded, and
/// those are dropped instead of overwriting the merged collection.
pub struct SyncService {
    remote: Arc<dyn RemoteStore>,
    status: Mutex<SyncStatus>,
    listeners: Listeners<SyncStatus>,
    exchange: tokio::sync::Mutex<()>,
    sync_running: AtomicBool,
    next_upload: AtomicU64,
    superseded_before: AtomicU64,
    background: Mutex<JoinSet<()>>,
}

/// Exclusive right to talk to the remote store, released on drop
pub struct Exchange<'a> {
    service: &'a SyncService,
    _guard: MutexGuard<'a, ()>,
    _sync: Option<SyncSlot<'a>>,
}

/// Marks a sync as running until dropped
struct SyncSlot<'a>(&'a AtomicBool);

impl Drop for SyncSlot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SyncService {
    pub fn new(remote: impl RemoteStore + 'static) -> Self {
        Self::with_remote(Arc::new(remote))
    }

    pub fn with_remote(remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            remote,
            status: Mutex::new(SyncStatus::default()),
            listeners: Listeners::new(),
            exchange: tokio::sync::Mutex::new(()),
            sync_running: AtomicBool::new(false),
            next_upload: AtomicU64::new(0),
            superseded_before: AtomicU64::new(0),
            background: Mutex::new(JoinSet::new()),
        }
    }

    /// Current status snapshot
    pub fn status(&self) -> SyncStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_signed_in
    }

    /// Subscribe to status transitions
    pub fn on_status_change(
        &self,
        listener: impl Fn(&SyncStatus) + Send + Sync + 'static,
    ) -> Subscription {
        self.listeners.subscribe(listener)
    }

    /// Refresh `is_signed_in` from the transport, e.g. after start-up when a
    /// session may still be valid.
    pub async fn restore_session(&self) -> bool {
        let signed_in = self.remote.is_signed_in().await;
        self.update_status(|status| status.is_signed_in = signed_in);
        signed_in
    }

    pub async fn sign_in(&self) -> bool {
        self.update_status(|status| {
            status.is_syncing = true;
            status.error = None;
        });

        let result = self.remote.sign_in().await;
        let signed_in = self.remote.is_signed_in().await;

        self.update_status(|status| {
            status.is_signed_in = signed_in;
            status.is_syncing = false;
            if let Err(error) = &result {
                status.error = Some(format!("Failed to sign in: {error}"));
            }
        });

        match result {
            Ok(()) => signed_in,
            Err(error) => {
                tracing::error!("Sign in failed: {error}");
                false
            }
        }
    }

    pub async fn sign_out(&self) {
        self.update_status(|status| status.error = None);

        let result = self.remote.sign_out().await;
        let signed_in = self.remote.is_signed_in().await;

        self.update_status(|status| {
            status.is_signed_in = signed_in;
            status.last_sync = None;
            if let Err(error) = &result {
                status.error = Some(format!("Failed to sign out: {error}"));
            }
        });

        if let Err(error) = result {
            tracing::error!("Sign out failed: {error}");
        }
    }

    /// Wait for the exchange token
    pub async fn begin_exchange(&self) -> Exchange<'_> {
        Exchange {
            service: self,
            _guard: self.exchange.lock().await,
            _sync: None,
        }
    }

    /// Exchange token for a sync.
    ///
    /// Returns `None` right away when another sync is running; otherwise waits
    /// for any upload currently talking to the remote.
    pub async fn begin_sync(&self) -> Option<Exchange<'_>> {
        if self.sync_running.swap(true, Ordering::SeqCst) {
            return None;
        }
        let slot = SyncSlot(&self.sync_running);
        let guard = self.exchange.lock().await;
        Some(Exchange {
            service: self,
            _guard: guard,
            _sync: Some(slot),
        })
    }

    pub fn is_sync_running(&self) -> bool {
        self.sync_running.load(Ordering::SeqCst)
    }

    /// Overwrite the remote collection with `notes`
    pub async fn upload_notes(&self, notes: &[Note]) -> bool {
        self.begin_exchange().await.upload(notes).await
    }

    /// Fetch the remote collection; `None` on failure
    pub async fn download_notes(&self) -> Option<Vec<Note>> {
        self.begin_exchange().await.download().await
    }

    /// Upload in a background task without blocking the caller.
    ///
    /// Failures are logged only. Outside a tokio runtime the upload is skipped.
    /// An upload still queued when a sync merges is dropped.
    pub fn spawn_upload(self: &Arc<Self>, notes: Vec<Note>) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime available; skipping background upload");
            return;
        };

        let ticket = self.next_upload.fetch_add(1, Ordering::SeqCst);
        let service = Arc::clone(self);
        let mut tasks = self
            .background
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while tasks.try_join_next().is_some() {}
        tasks.spawn_on(
            async move {
                let exchange = service.begin_exchange().await;
                if ticket < service.superseded_before.load(Ordering::SeqCst) {
                    tracing::debug!("Dropping background upload superseded by a sync");
                    return;
                }
                if !exchange.upload(&notes).await {
                    tracing::warn!("Background upload of {} notes failed", notes.len());
                }
            },
            &handle,
        );
    }

    /// Wait until every background upload spawned so far has finished
    pub async fn wait_for_uploads(&self) {
        let mut tasks = std::mem::take(
            &mut *self
                .background
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        while let Some(result) = tasks.join_next().await {
            if let Err(error) = result {
                tracing::error!("Background upload task failed: {error}");
            }
        }
    }

    fn update_status(&self, apply: impl FnOnce(&mut SyncStatus)) {
        let snapshot = {
            let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
            apply(&mut status);
            status.clone()
        };
        self.listeners.notify(&snapshot);
    }

    fn begin_operation(&self) -> bool {
        let signed_in = self.is_signed_in();
        self.update_status(|status| {
            if signed_in {
                status.is_syncing = true;
                status.error = None;
            } else {
                status.error = Some("Not signed in to remote store".to_string());
            }
        });
        signed_in
    }

    fn finish_operation(&self, error: Option<String>) {
        self.update_status(|status| {
            status.is_syncing = false;
            match error {
                Some(error) => status.error = Some(error),
                None => status.last_sync = Some(now_millis()),
            }
        });
    }
}

impl Exchange<'_> {
    /// Drop every background upload queued so far. Called once the merged
    /// collection includes their changes.
    pub fn supersede_pending_uploads(&self) {
        let service = self.service;
        service.superseded_before.store(
            service.next_upload.load(Ordering::SeqCst),
            Ordering::SeqCst,
        );
    }

    /// Overwrite the remote collection with `notes`
    pub async fn upload(&self, notes: &[Note]) -> bool {
        let service = self.service;
        if !service.begin_operation() {
            return false;
        }

        let payload = RemotePayload::snapshot(notes);
        match service.remote.write_payload(&payload).await {
            Ok(()) => {
                tracing::info!("Uploaded {} notes to remote store", notes.len());
                service.finish_operation(None);
                true
            }
            Err(error) => {
                tracing::error!("Failed to upload notes: {error}");
                service.finish_operation(Some(format!(
                    "Failed to upload notes to remote store: {error}"
                )));
                false
            }
        }
    }

    /// Fetch the remote collection. A missing remote object is an empty
    /// collection, not a failure.
    pub async fn download(&self) -> Option<Vec<Note>> {
        let service = self.service;
        if !service.begin_operation() {
            return None;
        }

        match service.remote.read_payload().await {
            Ok(payload) => {
                let notes = payload.map(|payload| payload.notes).unwrap_or_default();
                tracing::info!("Downloaded {} notes from remote store", notes.len());
                service.finish_operation(None);
                Some(notes)
            }
            Err(error) => {
                tracing::error!("Failed to download notes: {error}");
                service.finish_operation(Some(format!(
                    "Failed to download from remote store: {error}"
                )));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::MemoryRemote;
    use std::sync::atomic::AtomicUsize;

    fn signed_out_service() -> (Arc<MemoryRemote>, SyncService) {
        let remote = Arc::new(MemoryRemote::new());
        let service = SyncService::with_remote(Arc::clone(&remote) as Arc<dyn RemoteStore>);
        (remote, service)
    }

    #[tokio::test]
    async fn upload_requires_sign_in() {
        let (remote, service) = signed_out_service();

        assert!(!service.upload_notes(&[Note::new("a", "b")]).await);

        let status = service.status();
        assert!(!status.is_signed_in);
        assert!(!status.is_syncing);
        assert_eq!(status.error.as_deref(), Some("Not signed in to remote store"));
        assert_eq!(remote.write_count(), 0);
    }

    #[tokio::test]
    async fn download_requires_sign_in() {
        let (_remote, service) = signed_out_service();
        assert_eq!(service.download_notes().await, None);
    }

    #[tokio::test]
    async fn upload_then_download_roundtrip() {
        let (remote, service) = signed_out_service();
        assert!(service.sign_in().await);

        let notes = vec![Note::new("Remote", "copy")];
        assert!(service.upload_notes(&notes).await);
        assert_eq!(remote.notes(), Some(notes.clone()));
        assert_eq!(service.download_notes().await, Some(notes));

        let status = service.status();
        assert!(status.last_sync.is_some());
        assert_eq!(status.error, None);
    }

    #[tokio::test]
    async fn missing_remote_object_downloads_as_empty() {
        let (_remote, service) = signed_out_service();
        service.sign_in().await;

        assert_eq!(service.download_notes().await, Some(Vec::new()));
    }

    #[tokio::test]
    async fn failed_download_reports_error_then_next_attempt_clears_it() {
        let (remote, service) = signed_out_service();
        service.sign_in().await;
        remote.set_fail_reads(true);

        assert_eq!(service.download_notes().await, None);
        assert!(service
            .status()
            .error
            .unwrap()
            .starts_with("Failed to download from remote store"));

        remote.set_fail_reads(false);
        assert!(service.download_notes().await.is_some());
        assert_eq!(service.status().error, None);
    }

    #[tokio::test]
    async fn listeners_see_syncing_transitions() {
        let (_remote, service) = signed_out_service();
        service.sign_in().await;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let subscription = service.on_status_change(move |status| {
            sink.lock().unwrap().push(status.is_syncing);
        });

        service.upload_notes(&[]).await;
        assert_eq!(*seen.lock().unwrap(), vec![true, false]);

        subscription.unsubscribe();
        service.upload_notes(&[]).await;
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn sign_out_clears_session_and_last_sync() {
        let (_remote, service) = signed_out_service();
        service.sign_in().await;
        service.upload_notes(&[]).await;
        assert!(service.status().last_sync.is_some());

        service.sign_out().await;

        let status = service.status();
        assert!(!status.is_signed_in);
        assert_eq!(status.last_sync, None);
    }

    #[tokio::test]
    async fn only_one_sync_at_a_time() {
        let (_remote, service) = signed_out_service();

        let running = service.begin_sync().await;
        assert!(running.is_some());
        assert!(service.is_sync_running());
        assert!(service.begin_sync().await.is_none());

        drop(running);
        assert!(!service.is_sync_running());
        assert!(service.begin_sync().await.is_some());
    }

    #[tokio::test]
    async fn sync_waits_for_running_upload() {
        let (_remote, service) = signed_out_service();
        let upload = service.begin_exchange().await;

        let (sync, ()) = tokio::join!(service.begin_sync(), async move {
            tokio::task::yield_now().await;
            drop(upload);
        });

        assert!(sync.is_some());
    }

    #[tokio::test]
    async fn superseded_uploads_are_dropped() {
        let remote = Arc::new(MemoryRemote::new());
        let service = Arc::new(SyncService::with_remote(
            Arc::clone(&remote) as Arc<dyn RemoteStore>
        ));
        service.sign_in().await;

        service.spawn_upload(vec![Note::new("stale", "1")]);
        {
            let exchange = service.begin_sync().await.unwrap();
            exchange.supersede_pending_uploads();
            assert!(exchange.upload(&[Note::new("merged", "2")]).await);
        }
        service.spawn_upload(vec![Note::new("later", "3")]);
        service.wait_for_uploads().await;

        assert_eq!(remote.write_count(), 2);
        assert_eq!(remote.notes().unwrap()[0].title, "later");
    }

    #[tokio::test]
    async fn spawned_uploads_finish_before_wait_returns() {
        let remote = Arc::new(MemoryRemote::new());
        let service = Arc::new(SyncService::with_remote(
            Arc::clone(&remote) as Arc<dyn RemoteStore>
        ));
        service.sign_in().await;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let _subscription = service.on_status_change(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        service.spawn_upload(vec![Note::new("bg", "1")]);
        service.spawn_upload(vec![Note::new("bg", "2")]);
        service.wait_for_uploads().await;

        assert_eq!(remote.write_count(), 2);
        assert!(calls.load(Ordering::SeqCst) >= 4);
    }

    #[test]
    fn spawn_upload_outside_runtime_is_skipped() {
        let remote = Arc::new(MemoryRemote::new());
        let service = Arc::new(SyncService::with_remote(
            Arc::clone(&remote) as Arc<dyn RemoteStore>
        ));

        service.spawn_upload(vec![Note::new("x", "y")]);

        assert_eq!(remote.write_count(), 0);
    }
}
