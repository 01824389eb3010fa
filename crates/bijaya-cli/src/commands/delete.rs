use crate::commands::common::{normalize_note_identifier, open_store, resolve_note, CliPaths};
use crate::error::CliError;

pub async fn run_delete(id: &str, paths: &CliPaths) -> Result<(), CliError> {
    let normalized_id = normalize_note_identifier(id)?;
    let mut store = open_store(paths).await?;
    let note_id = resolve_note(&normalized_id, &store)?.id.clone();

    store.delete_note(&note_id);
    store.wait_for_uploads().await;

    println!("{note_id}");
    Ok(())
}
