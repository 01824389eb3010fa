use crate::commands::common::{open_store, CliPaths};
use crate::error::CliError;

pub async fn run_sync(paths: &CliPaths) -> Result<(), CliError> {
    let mut store = open_store(paths).await?;
    let Some(sync) = store.sync_service().cloned() else {
        return Err(CliError::SyncNotConfigured);
    };

    if !store.sync_notes().await {
        let reason = sync
            .status()
            .error
            .unwrap_or_else(|| "remote store unavailable".to_string());
        return Err(CliError::SyncFailed(reason));
    }

    println!("Sync completed ({} notes)", store.notes().len());
    Ok(())
}
