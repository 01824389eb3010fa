use bijaya_core::NotePatch;

use crate::commands::common::{
    capture_editor_input_with_initial, normalize_note_identifier, open_store, resolve_note,
    CliPaths,
};
use crate::error::CliError;

pub async fn run_edit(
    id: &str,
    title: Option<String>,
    content: Option<String>,
    paths: &CliPaths,
) -> Result<(), CliError> {
    let normalized_id = normalize_note_identifier(id)?;
    let mut store = open_store(paths).await?;
    let note = resolve_note(&normalized_id, &store)?.clone();

    let mut patch = NotePatch::default();
    if let Some(title) = title {
        patch = patch.title(title);
    }
    if let Some(content) = content {
        patch = patch.content(content);
    }

    if patch.is_empty() {
        let Some(edited_content) = capture_editor_input_with_initial(&note.content)? else {
            return Err(CliError::EmptyEditedContent);
        };
        if edited_content == note.content {
            println!("{}", note.id);
            return Ok(());
        }
        patch = patch.content(edited_content);
    }

    let updated = store
        .update_note(&note.id, patch)
        .ok_or_else(|| CliError::NoteNotFound(normalized_id.clone()))?;
    store.wait_for_uploads().await;

    println!("{}", updated.id);
    Ok(())
}
