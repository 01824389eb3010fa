use std::path::Path;

use bijaya_core::sync::FolderRemote;
use bijaya_core::SyncService;

use crate::cli::RemoteCommands;
use crate::commands::common::{format_sync_timestamp, CliPaths};
use crate::error::CliError;

pub async fn run_remote(command: RemoteCommands, paths: &CliPaths) -> Result<(), CliError> {
    match command {
        RemoteCommands::Connect { folder } => run_remote_connect(&folder, paths).await,
        RemoteCommands::Disconnect => run_remote_disconnect(paths),
        RemoteCommands::Status => run_remote_status(paths).await,
    }
}

pub async fn run_remote_connect(folder: &Path, paths: &CliPaths) -> Result<(), CliError> {
    let sync = SyncService::new(FolderRemote::create(folder));
    if !sync.sign_in().await {
        let reason = sync
            .status()
            .error
            .unwrap_or_else(|| "remote folder unavailable".to_string());
        return Err(CliError::Config(reason));
    }

    let mut config = paths.load_config()?;
    config.set_remote_folder(Some(folder));
    config
        .save_to_path(&paths.config_path)
        .map_err(CliError::Config)?;

    println!("Remote folder set to {}", folder.display());
    println!("Run `bijaya sync` to merge existing notes.");
    Ok(())
}

pub fn run_remote_disconnect(paths: &CliPaths) -> Result<(), CliError> {
    let mut config = paths.load_config()?;
    if config.remote_folder().is_none() {
        println!("No remote folder configured");
        return Ok(());
    }

    config.set_remote_folder(None);
    config
        .save_to_path(&paths.config_path)
        .map_err(CliError::Config)?;
    println!("Remote folder disconnected");
    Ok(())
}

pub async fn run_remote_status(paths: &CliPaths) -> Result<(), CliError> {
    let config = paths.load_config()?;
    let Some(folder) = config.remote_folder() else {
        println!("Remote: not configured");
        return Ok(());
    };

    println!("Remote folder: {}", folder.display());
    let sync = SyncService::new(FolderRemote::new(&folder));
    if !sync.sign_in().await {
        println!("Status:        unavailable");
        return Ok(());
    }

    match sync.download_notes().await {
        Some(notes) => {
            println!("Status:        connected");
            println!("Remote notes:  {}", notes.len());
            if let Some(last_sync) = sync.status().last_sync {
                println!("Checked at:    {}", format_sync_timestamp(last_sync));
            }
        }
        None => {
            let reason = sync.status().error.unwrap_or_default();
            println!("Status:        error ({reason})");
        }
    }
    Ok(())
}
