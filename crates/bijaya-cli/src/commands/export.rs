use std::path::{Path, PathBuf};

use crate::commands::common::{normalize_note_identifier, open_store, resolve_note, CliPaths};
use crate::error::CliError;

pub async fn run_export(
    note_id: Option<&str>,
    output_path: Option<&Path>,
    paths: &CliPaths,
) -> Result<(), CliError> {
    let store = open_store(paths).await?;
    let export = if let Some(id) = note_id {
        let normalized_id = normalize_note_identifier(id)?;
        let note_id = resolve_note(&normalized_id, &store)?.id.clone();
        store.export_note(&note_id)?
    } else {
        store.export_all()?
    };

    if let Some(path) = output_path {
        let target = export_target(path, &export.file_name);
        std::fs::write(&target, export.contents)?;
        println!("{}", target.display());
    } else {
        println!("{}", export.contents);
    }

    Ok(())
}

/// A directory receives the suggested file name; anything else is used as is
pub fn export_target(path: &Path, file_name: &str) -> PathBuf {
    if path.is_dir() {
        path.join(file_name)
    } else {
        path.to_path_buf()
    }
}
