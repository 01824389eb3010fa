//! Last-write-wins merge of two note replicas

use std::collections::HashMap;

use crate::models::{ConflictWinner, Note, NoteId, SyncConflict};

/// Result of merging a local and a remote collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Merged collection, most recently updated first
    pub notes: Vec<Note>,
    /// Ids seen on both sides with different `updated_at`
    pub conflicts: Vec<SyncConflict>,
}

/// Merge `remote` into `local`, keeping per id the version with the strictly
/// later `updated_at`. Ties keep the version already present.
///
/// Local notes are seeded by id, so a duplicated local id keeps its last
/// entry. Duplicate ids inside `remote` go through the same later-wins rule.
#[must_use]
pub fn merge_notes(local: &[Note], remote: &[Note]) -> Vec<Note> {
    merge_with_report(local, remote).notes
}

/// Same as [`merge_notes`] but also reports every resolved conflict between
/// a local and a remote version. Duplicates within `remote` are not
/// conflicts.
#[must_use]
pub fn merge_with_report(local: &[Note], remote: &[Note]) -> MergeOutcome {
    let mut merged: Vec<Note> = Vec::with_capacity(local.len() + remote.len());
    // Position in `merged`, and whether that entry came from `remote`
    let mut index: HashMap<NoteId, (usize, bool)> =
        HashMap::with_capacity(local.len() + remote.len());

    for note in local {
        match index.get(&note.id) {
            Some(&(position, _)) => merged[position] = note.clone(),
            None => {
                index.insert(note.id.clone(), (merged.len(), false));
                merged.push(note.clone());
            }
        }
    }

    let mut conflicts = Vec::new();
    for incoming in remote {
        let Some(&(position, from_remote)) = index.get(&incoming.id) else {
            index.insert(incoming.id.clone(), (merged.len(), true));
            merged.push(incoming.clone());
            continue;
        };

        let existing = &merged[position];
        if incoming.updated_at == existing.updated_at {
            continue;
        }

        let remote_wins = incoming.updated_at > existing.updated_at;
        if !from_remote {
            conflicts.push(SyncConflict {
                note_id: incoming.id.clone(),
                local_updated_at: existing.updated_at,
                remote_updated_at: incoming.updated_at,
                winner: if remote_wins {
                    ConflictWinner::Remote
                } else {
                    ConflictWinner::Local
                },
            });
        }
        if remote_wins {
            merged[position] = incoming.clone();
            index.insert(incoming.id.clone(), (position, true));
        }
    }

    merged.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    MergeOutcome {
        notes: merged,
        conflicts,
    }
}
