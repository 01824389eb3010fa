//! Remote store transports
//!
//! A transport only moves one whole [`RemotePayload`] at a time under a single
//! well-known object name; everything else (status, merging) is handled by
//! [`super::SyncService`] and the note store.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{iso8601, Note};

/// Name of the remote object holding the collection
pub const REMOTE_OBJECT_NAME: &str = "bijaya-notes.json";
/// Payload format version written on upload
pub const REMOTE_PAYLOAD_VERSION: &str = "1.0";

/// Whole-collection snapshot exchanged with the remote store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePayload {
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default, with = "iso8601::option")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub version: String,
}

impl RemotePayload {
    /// Snapshot of `notes` stamped with the current time
    #[must_use]
    pub fn snapshot(notes: &[Note]) -> Self {
        Self {
            notes: notes.to_vec(),
            last_modified: Some(crate::util::now_millis()),
            version: REMOTE_PAYLOAD_VERSION.to_string(),
        }
    }
}

/// Transport contract for a remote replica
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Start a session with the remote store
    async fn sign_in(&self) -> Result<()>;

    /// End the current session
    async fn sign_out(&self) -> Result<()>;

    /// Whether a session is currently active
    async fn is_signed_in(&self) -> bool;

    /// Read the remote object; `None` when it does not exist yet
    async fn read_payload(&self) -> Result<Option<RemotePayload>>;

    /// Overwrite the remote object with `payload`
    async fn write_payload(&self, payload: &RemotePayload) -> Result<()>;
}

fn not_signed_in() -> Error {
    Error::Remote("not signed in".to_string())
}

/// Remote replica kept as a JSON file in a directory, typically one mirrored by
/// a desktop cloud-drive client or a mounted network share.
///
/// Sign-in fails when the directory is missing, so an unmounted share is
/// never mistaken for an empty remote. Use [`FolderRemote::create`] when
/// first connecting to a new folder.
#[derive(Debug)]
pub struct FolderRemote {
    root: PathBuf,
    create_missing: bool,
    signed_in: AtomicBool,
}

impl FolderRemote {
    /// Remote over an existing directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            create_missing: false,
            signed_in: AtomicBool::new(false),
        }
    }

    /// Remote that creates its directory on sign-in
    pub fn create(root: impl Into<PathBuf>) -> Self {
        Self {
            create_missing: true,
            ..Self::new(root)
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self) -> PathBuf {
        self.root.join(REMOTE_OBJECT_NAME)
    }

    fn ensure_signed_in(&self) -> Result<()> {
        if self.signed_in.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(not_signed_in())
        }
    }
}

#[async_trait]
impl RemoteStore for FolderRemote {
    async fn sign_in(&self) -> Result<()> {
        if self.create_missing {
            tokio::fs::create_dir_all(&self.root).await?;
        }
        let metadata = match tokio::fs::metadata(&self.root).await {
            Ok(metadata) => metadata,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::Remote(format!(
                    "{} does not exist",
                    self.root.display()
                )));
            }
            Err(error) => return Err(error.into()),
        };
        if !metadata.is_dir() {
            return Err(Error::Remote(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }
        self.signed_in.store(true, Ordering::SeqCst);
        tracing::info!("Connected to remote folder {}", self.root.display());
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        self.signed_in.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn is_signed_in(&self) -> bool {
        self.signed_in.load(Ordering::SeqCst)
    }

    async fn read_payload(&self) -> Result<Option<RemotePayload>> {
        self.ensure_signed_in()?;
        let raw = match tokio::fs::read_to_string(self.object_path()).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    async fn write_payload(&self, payload: &RemotePayload) -> Result<()> {
        self.ensure_signed_in()?;
        let serialized = serde_json::to_string(payload)?;
        let target = self.object_path();
        let staging = self.root.join(format!(".{REMOTE_OBJECT_NAME}.tmp"));
        tokio::fs::write(&staging, serialized).await?;
        tokio::fs::rename(&staging, &target).await?;
        Ok(())
    }
}

/// In-process remote replica, for tests and demos.
///
/// Failure switches let callers simulate an unreachable remote.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    payload: Mutex<Option<RemotePayload>>,
    signed_in: AtomicBool,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryRemote {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remote that already holds `notes`
    #[must_use]
    pub fn with_notes(notes: &[Note]) -> Self {
        let remote = Self::new();
        *remote.payload.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(RemotePayload::snapshot(notes));
        remote
    }

    /// Notes currently held, if the remote object exists
    pub fn notes(&self) -> Option<Vec<Note>> {
        self.payload
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|payload| payload.notes.clone())
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn sign_in(&self) -> Result<()> {
        self.signed_in.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        self.signed_in.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn is_signed_in(&self) -> bool {
        self.signed_in.load(Ordering::SeqCst)
    }

    async fn read_payload(&self) -> Result<Option<RemotePayload>> {
        if !self.signed_in.load(Ordering::SeqCst) {
            return Err(not_signed_in());
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Remote("network unreachable".to_string()));
        }
        Ok(self
            .payload
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn write_payload(&self, payload: &RemotePayload) -> Result<()> {
        if !self.signed_in.load(Ordering::SeqCst) {
            return Err(not_signed_in());
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Remote("quota exceeded".to_string()));
        }
        *self.payload.lock().unwrap_or_else(PoisonError::into_inner) = Some(payload.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
