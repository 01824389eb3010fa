use crate::commands::common::{open_store, resolve_note_content, CliPaths};
use crate::error::CliError;

pub async fn run_add(
    title: Option<&str>,
    content_parts: &[String],
    paths: &CliPaths,
) -> Result<(), CliError> {
    let content = resolve_note_content(content_parts)?;

    let mut store = open_store(paths).await?;
    let note = store.create_note(title.unwrap_or_default(), content);
    store.wait_for_uploads().await;

    println!("{}", note.id);
    Ok(())
}
