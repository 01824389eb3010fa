use bijaya_core::util::strip_html;

use crate::commands::common::{
    format_sync_timestamp, normalize_note_identifier, note_to_list_item, open_store,
    resolve_note, CliPaths,
};
use crate::error::CliError;

pub async fn run_show(id: &str, as_json: bool, paths: &CliPaths) -> Result<(), CliError> {
    let normalized_id = normalize_note_identifier(id)?;
    let store = open_store(paths).await?;
    let note = resolve_note(&normalized_id, &store)?;

    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&note_to_list_item(note))?
        );
        return Ok(());
    }

    println!("{}", note.title);
    println!("id:      {}", note.id);
    println!("created: {}", format_sync_timestamp(note.created_at));
    println!("updated: {}", format_sync_timestamp(note.updated_at));
    println!();
    println!("{}", strip_html(&note.content).trim());
    Ok(())
}
