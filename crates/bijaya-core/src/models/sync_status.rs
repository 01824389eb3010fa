//! Remote sync status model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of the remote link. Process-wide, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    /// Whether a remote session is active
    pub is_signed_in: bool,
    /// True only while a remote operation is in flight
    pub is_syncing: bool,
    /// Time of the last successful exchange
    #[serde(default, with = "super::iso8601::option")]
    pub last_sync: Option<DateTime<Utc>>,
    /// Human-readable error of the last attempt, cleared when a new one starts
    pub error: Option<String>,
}
