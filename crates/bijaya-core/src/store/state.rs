//! Store state and the derived note list

use std::cmp::Ordering;

use crate::models::{Note, NoteId, SortBy, SortOrder};

/// UI-facing state owned by [`super::NoteStore`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    /// Collection in display order, newest creations first
    pub notes: Vec<Note>,
    /// Selected note; not validated against `notes` until read
    pub selected_note_id: Option<NoteId>,
    pub search_query: String,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl StoreState {
    pub fn find(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    pub(crate) fn position(&self, id: &NoteId) -> Option<usize> {
        self.notes.iter().position(|note| &note.id == id)
    }

    /// The selected note, if the selection points at an existing note
    pub fn selected_note(&self) -> Option<&Note> {
        self.selected_note_id.as_ref().and_then(|id| self.find(id))
    }

    /// Notes matching the search query, sorted by the current key and order
    pub fn filtered_notes(&self) -> Vec<&Note> {
        filter_and_sort(
            &self.notes,
            &self.search_query,
            self.sort_by,
            self.sort_order,
        )
    }
}

/// Case-insensitive substring filter on title or content followed by a stable
/// sort. Equal keys keep their relative input order.
pub fn filter_and_sort<'a>(
    notes: &'a [Note],
    query: &str,
    sort_by: SortBy,
    sort_order: SortOrder,
) -> Vec<&'a Note> {
    let needle = query.to_lowercase();
    let mut filtered = notes
        .iter()
        .filter(|note| note.matches(&needle))
        .collect::<Vec<_>>();

    filtered.sort_by(|a, b| {
        let ordering = compare(a, b, sort_by);
        match sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    filtered
}

fn compare(a: &Note, b: &Note, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::Title => a
            .title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.title.cmp(&b.title)),
        SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
        SortBy::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}
