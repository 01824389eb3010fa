use std::path::Path;

use crate::commands::common::{open_store, CliPaths};
use crate::error::CliError;

pub async fn run_import(backup_path: &Path, paths: &CliPaths) -> Result<(), CliError> {
    let bytes = std::fs::read(backup_path)?;

    let mut store = open_store(paths).await?;
    let summary = store.import_backup(&bytes)?;
    store.wait_for_uploads().await;

    println!("Imported {} notes", summary.imported);
    if summary.skipped > 0 {
        println!("Skipped {} invalid entries", summary.skipped);
    }
    Ok(())
}
