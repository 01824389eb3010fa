use crate::commands::common::{open_store, CliPaths};
use crate::error::CliError;

pub async fn run_info(paths: &CliPaths) -> Result<(), CliError> {
    let config = paths.load_config()?;
    let store = open_store(paths).await?;
    let info = store.storage_info();

    println!("Database:      {}", paths.db_path.display());
    println!("Config:        {}", paths.config_path.display());
    println!("Notes:         {}", info.total_notes);
    println!("Stored size:   {}", info.estimated_size);
    println!(
        "Sort:          {} {}",
        store.state().sort_by,
        store.state().sort_order
    );
    match config.remote_folder() {
        Some(folder) => println!("Remote folder: {}", folder.display()),
        None => println!("Remote folder: (not configured)"),
    }
    Ok(())
}
