//! Remote replica sync: transports, the sync adapter and the LWW merge.

mod merge;
mod remote;
mod service;

pub use merge::{merge_notes, merge_with_report, MergeOutcome};
pub use remote::{
    FolderRemote, MemoryRemote, RemotePayload, RemoteStore, REMOTE_OBJECT_NAME,
    REMOTE_PAYLOAD_VERSION,
};
pub use service::{Exchange, SyncService};
