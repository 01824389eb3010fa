use bijaya_core::{SortBy, SortOrder};

use crate::commands::common::{
    format_note_lines, note_to_list_item, open_store, CliPaths, NoteListItem,
};
use crate::error::CliError;

pub async fn run_list(
    limit: usize,
    search: Option<&str>,
    sort_by: Option<SortBy>,
    sort_order: Option<SortOrder>,
    as_json: bool,
    paths: &CliPaths,
) -> Result<(), CliError> {
    let mut store = open_store(paths).await?;
    if let Some(sort_by) = sort_by {
        store.set_sort_by(sort_by);
    }
    if let Some(sort_order) = sort_order {
        store.set_sort_order(sort_order);
    }
    if let Some(query) = search {
        store.set_search_query(query.trim());
    }

    let notes = store
        .filtered_notes()
        .into_iter()
        .take(limit)
        .collect::<Vec<_>>();

    if as_json {
        let json_items = notes
            .iter()
            .map(|note| note_to_list_item(note))
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if notes.is_empty() {
        println!("No notes found.");
    } else {
        for line in format_note_lines(&notes) {
            println!("{line}");
        }
    }

    Ok(())
}
