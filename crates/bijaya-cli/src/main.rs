//! Bijaya CLI - Command-line front end for Bijaya Notes
//!
//! Notes live in a local SQLite file; an optional remote folder keeps several
//! machines in sync, and JSON backups move notes in and out.

mod cli;
mod commands;
mod config;
mod error;

use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::common::CliPaths;
use crate::commands::completions::run_completions;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::export::run_export;
use crate::commands::import::run_import;
use crate::commands::info::run_info;
use crate::commands::list::run_list;
use crate::commands::remote::run_remote;
use crate::commands::show::run_show;
use crate::commands::sync::run_sync;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "bijaya=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(Commands::Completions { shell, output }) = &cli.command {
        return run_completions(*shell, output.as_deref());
    }

    let paths = CliPaths::resolve(cli.db_path)?;

    match cli.command {
        Some(Commands::Add { title, content }) => {
            run_add(title.as_deref(), &content, &paths).await?;
        }
        Some(Commands::List {
            limit,
            search,
            sort,
            order,
            json,
        }) => {
            run_list(
                limit,
                search.as_deref(),
                sort.map(Into::into),
                order.map(Into::into),
                json,
                &paths,
            )
            .await?;
        }
        Some(Commands::Show { id, json }) => run_show(&id, json, &paths).await?,
        Some(Commands::Edit { id, title, content }) => {
            run_edit(&id, title, content, &paths).await?;
        }
        Some(Commands::Delete { id }) => run_delete(&id, &paths).await?,
        Some(Commands::Export { id, output }) => {
            run_export(id.as_deref(), output.as_deref(), &paths).await?;
        }
        Some(Commands::Import { path }) => run_import(&path, &paths).await?,
        Some(Commands::Sync) => run_sync(&paths).await?,
        Some(Commands::Remote { command }) => run_remote(command, &paths).await?,
        Some(Commands::Info) => run_info(&paths).await?,
        Some(Commands::Completions { .. }) => {}
        None => {
            Cli::command().print_help().map_err(CliError::Io)?;
            println!();
        }
    }

    Ok(())
}
