use std::path::PathBuf;

use bijaya_core::{SortBy, SortOrder};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "bijaya")]
#[command(about = "Take notes locally, sync them through a shared folder, back them up as JSON")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note
    #[command(alias = "new")]
    Add {
        /// Note title (defaults to "Untitled Note")
        #[arg(short, long)]
        title: Option<String>,
        /// Note content
        content: Vec<String>,
    },
    /// List notes
    List {
        /// Number of notes to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Only show notes whose title or content contains this text
        #[arg(short, long)]
        search: Option<String>,
        /// Sort key (remembered for later listings)
        #[arg(long, value_enum)]
        sort: Option<SortKey>,
        /// Sort direction (remembered for later listings)
        #[arg(long, value_enum)]
        order: Option<SortDirection>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a single note
    Show {
        /// Note ID or unique ID prefix
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit an existing note
    Edit {
        /// Note ID or unique ID prefix
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New content (opens $EDITOR when neither --title nor --content is given)
        #[arg(short, long)]
        content: Option<String>,
    },
    /// Delete an existing note
    Delete {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Export all notes, or a single note, as JSON
    Export {
        /// Export only this note (ID or unique ID prefix)
        #[arg(long, value_name = "ID")]
        id: Option<String>,
        /// Output file or directory (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Import notes from a full backup file
    Import {
        /// Backup file path
        path: PathBuf,
    },
    /// Merge local notes with the remote folder
    Sync,
    /// Configure the remote folder used for sync
    Remote {
        #[command(subcommand)]
        command: RemoteCommands,
    },
    /// Show local storage details
    Info,
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum RemoteCommands {
    /// Use a directory (e.g. one mirrored by a cloud drive client) as the remote
    Connect {
        /// Remote folder path
        folder: PathBuf,
    },
    /// Stop syncing with the remote folder
    Disconnect,
    /// Show the configured remote folder and whether it is reachable
    Status,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SortKey {
    Updated,
    Created,
    Title,
}

impl From<SortKey> for SortBy {
    fn from(value: SortKey) -> Self {
        match value {
            SortKey::Updated => Self::UpdatedAt,
            SortKey::Created => Self::CreatedAt,
            SortKey::Title => Self::Title,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl From<SortDirection> for SortOrder {
    fn from(value: SortDirection) -> Self {
        match value {
            SortDirection::Asc => Self::Asc,
            SortDirection::Desc => Self::Desc,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}

impl CompletionShell {
    /// Where the generated script is usually installed
    pub const fn install_hint(self) -> &'static str {
        match self {
            Self::Bash => "source it from ~/.bashrc or copy it to ~/.local/share/bash-completion/completions/bijaya",
            Self::Zsh => "copy it to a directory on $fpath as _bijaya",
            Self::Fish => "copy it to ~/.config/fish/completions/bijaya.fish",
            Self::PowerShell => "dot-source it from your $PROFILE",
        }
    }
}

impl From<CompletionShell> for clap_complete::Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Self::Bash,
            CompletionShell::Zsh => Self::Zsh,
            CompletionShell::Fish => Self::Fish,
            CompletionShell::PowerShell => Self::PowerShell,
        }
    }
}
