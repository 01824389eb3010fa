use std::io::{self, Write};
use std::path::Path;

use clap::CommandFactory;

use crate::cli::{Cli, CompletionShell};
use crate::error::CliError;

/// Binary name the completion scripts are registered for
pub const BIN_NAME: &str = "bijaya";

/// Render the completion script for `shell`, covering every `bijaya`
/// subcommand and its flags.
pub fn completion_script(shell: CompletionShell) -> Vec<u8> {
    let mut command = Cli::command();
    let mut script = Vec::new();
    clap_complete::generate(
        clap_complete::Shell::from(shell),
        &mut command,
        BIN_NAME,
        &mut script,
    );
    script
}

pub fn run_completions(shell: CompletionShell, output_path: Option<&Path>) -> Result<(), CliError> {
    let script = completion_script(shell);

    let Some(path) = output_path else {
        io::stdout().write_all(&script)?;
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, &script)?;
    println!("{}", path.display());
    eprintln!("To enable completions, {}", shell.install_hint());
    Ok(())
}
