use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bijaya_core::models::iso8601;
use bijaya_core::storage::{LocalStorage, SqliteKeyValueStore};
use bijaya_core::sync::FolderRemote;
use bijaya_core::util::format_relative_date;
use bijaya_core::{Note, NoteStore, SyncService};
use chrono::Utc;
use serde::Serialize;

use crate::config::{resolve_config_path, CliConfig};
use crate::error::CliError;

/// Where the CLI keeps its state for this invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliPaths {
    pub db_path: PathBuf,
    pub config_path: PathBuf,
}

impl CliPaths {
    /// `--db-path`, then `BIJAYA_DB_PATH`, then the config file, then the
    /// platform data directory.
    pub fn resolve(cli_db_path: Option<PathBuf>) -> Result<Self, CliError> {
        let config_path = resolve_config_path();
        let config = CliConfig::load_from_path(&config_path).map_err(CliError::Config)?;
        let db_path = cli_db_path
            .or_else(|| env::var_os("BIJAYA_DB_PATH").map(PathBuf::from))
            .or_else(|| config.db_path())
            .unwrap_or_else(default_db_path);
        Ok(Self {
            db_path,
            config_path,
        })
    }

    pub fn load_config(&self) -> Result<CliConfig, CliError> {
        CliConfig::load_from_path(&self.config_path).map_err(CliError::Config)
    }
}

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub title: String,
    pub preview: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
    pub relative_time: String,
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| panic!("Failed to resolve CLI data directory"))
        .join("bijaya")
        .join("bijaya.db")
}

/// Open the note store, attaching the remote folder when one is configured
pub async fn open_store(paths: &CliPaths) -> Result<NoteStore, CliError> {
    let config = paths.load_config()?;
    let kv = SqliteKeyValueStore::open(&paths.db_path)?;
    let store = NoteStore::open(LocalStorage::new(kv));

    let Some(folder) = config.remote_folder() else {
        return Ok(store);
    };
    let sync = Arc::new(SyncService::new(FolderRemote::new(&folder)));
    if !sync.sign_in().await {
        tracing::warn!(
            "Remote folder {} is unavailable; changes stay local",
            folder.display()
        );
    }
    Ok(store.with_sync(sync))
}

/// Resolve a full id or a unique id prefix to a note
pub fn resolve_note<'a>(note_query: &str, store: &'a NoteStore) -> Result<&'a Note, CliError> {
    if let Some(note) = store.notes().iter().find(|note| note.id.as_str() == note_query) {
        return Ok(note);
    }

    let matching = store
        .notes()
        .iter()
        .filter(|note| note.id.as_str().starts_with(note_query))
        .collect::<Vec<_>>();

    match matching.as_slice() {
        [] => Err(CliError::NoteNotFound(note_query.to_string())),
        [note] => Ok(*note),
        _ => {
            let options = matching
                .iter()
                .take(3)
                .map(|note| note.id.short(13))
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousNoteId(format!(
                "ID prefix '{note_query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn format_note_lines(notes: &[&Note]) -> Vec<String> {
    let now = Utc::now();
    notes
        .iter()
        .map(|note| {
            let short_id = note.id.short(13);
            let title = note_title(note, 30);
            let preview = note.preview(40);
            let relative_time = format_relative_date(note.updated_at, now);

            format!("{short_id:<13}  {title:<30}  {preview:<40}  {relative_time}")
        })
        .collect()
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    NoteListItem {
        id: note.id.to_string(),
        title: note.title.clone(),
        preview: note.preview(80),
        content: note.content.clone(),
        created_at: iso8601::format(&note.created_at),
        updated_at: iso8601::format(&note.updated_at),
        relative_time: format_relative_date(note.updated_at, Utc::now()),
    }
}

fn note_title(note: &Note, max_chars: usize) -> String {
    bijaya_core::util::truncate_text(&note.title, max_chars)
}

pub fn format_sync_timestamp(timestamp: chrono::DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub fn resolve_note_content(content_parts: &[String]) -> Result<String, CliError> {
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(content);
    }

    if let Some(content) = read_piped_stdin()? {
        return Ok(content);
    }

    if let Some(content) = capture_editor_input()? {
        return Ok(content);
    }

    Err(CliError::EmptyContent)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_note_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyNoteId)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn capture_editor_input() -> Result<Option<String>, CliError> {
    capture_editor_input_with_initial("")
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_note_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let note_content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_content(&note_content))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) => {
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let mut command = Command::new(program);
            command.args(parts).arg(file_path);

            let status = command.status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_note_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("bijaya-note-{}-{now}.html", std::process::id()))
}
