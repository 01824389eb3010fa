//! Sync conflict model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::NoteId;

/// Which replica's version survived a conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictWinner {
    Local,
    Remote,
}

/// A note present on both replicas with different modification times,
/// resolved last-write-wins during a merge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConflict {
    /// Note involved in the conflict
    pub note_id: NoteId,
    /// Local version's timestamp
    #[serde(with = "super::iso8601")]
    pub local_updated_at: DateTime<Utc>,
    /// Remote version's timestamp
    #[serde(with = "super::iso8601")]
    pub remote_updated_at: DateTime<Utc>,
    /// Surviving side
    pub winner: ConflictWinner,
}

impl SyncConflict {
    /// Resolution strategy name, for logs and listings
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        "lww"
    }
}
