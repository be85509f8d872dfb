//! File operations the host application provides, and table-file creation on
//! top of them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, SecondsFormat};

use crate::error::FileError;
use crate::io::atomic_write_string;
use crate::io::table_file::{deserialize_table_state, serialize_table_state};
use crate::state::data_model::{CellType, TableDocument};
use crate::state::factory::create_table_state;

pub const DEFAULT_TABLE_NAME: &str = "Untitled";
pub const TABLE_EXTENSION: &str = "table";

/// Host-provided file primitives. Paths are relative to the host's vault.
pub trait HostFiles {
    fn create_folder(&self, path: &str) -> Result<(), FileError>;
    /// Creates a new file; fails if it already exists.
    fn create_file(&self, path: &str, content: &str) -> Result<(), FileError>;
    fn write_file(&self, path: &str, content: &str) -> Result<(), FileError>;
    fn read_file(&self, path: &str) -> Result<String, FileError>;
}

/// [`HostFiles`] over a directory on the local filesystem.
#[derive(Clone, Debug)]
pub struct FsHost {
    root: PathBuf,
}

impl FsHost {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(Path::new(path))
    }
}

impl HostFiles for FsHost {
    fn create_folder(&self, path: &str) -> Result<(), FileError> {
        fs::create_dir_all(self.resolve(path))?;
        Ok(())
    }

    fn create_file(&self, path: &str, content: &str) -> Result<(), FileError> {
        let full = self.resolve(path);
        if full.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", full.display()),
            )
            .into());
        }
        atomic_write_string(&full, content)?;
        Ok(())
    }

    fn write_file(&self, path: &str, content: &str) -> Result<(), FileError> {
        atomic_write_string(&self.resolve(path), content)?;
        Ok(())
    }

    fn read_file(&self, path: &str) -> Result<String, FileError> {
        Ok(fs::read_to_string(self.resolve(path))?)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreateOptions {
    pub folder_path: String,
    /// Name of the note that is active in the host, if any.
    pub active_note: Option<String>,
    pub use_active_file_name_and_timestamp: bool,
}

pub fn get_file_path(folder_path: &str, file_name: &str) -> String {
    if folder_path.is_empty() {
        file_name.to_string()
    } else {
        format!("{folder_path}/{file_name}")
    }
}

pub fn table_file_name(options: &CreateOptions, now: DateTime<FixedOffset>) -> String {
    let base = match (&options.active_note, options.use_active_file_name_and_timestamp) {
        (Some(note), true) => {
            let stamp = now.to_rfc3339_opts(SecondsFormat::Secs, false).replace(':', ".");
            format!("{note}-{stamp}")
        }
        _ => DEFAULT_TABLE_NAME.to_string(),
    };
    format!("{base}.{TABLE_EXTENSION}")
}

/// Creates a new 1x1 table file and returns its path.
pub fn create_table_file(
    host: &dyn HostFiles,
    options: &CreateOptions,
    now: DateTime<FixedOffset>,
) -> Result<String, FileError> {
    if !options.folder_path.is_empty() {
        host.create_folder(&options.folder_path)?;
    }

    let file_name = table_file_name(options, now);
    let document = create_table_state(1, 1, CellType::Text, now.timestamp_millis());
    let serialized = serialize_table_state(&document)?;
    let path = get_file_path(&options.folder_path, &file_name);

    host.create_file(&path, &serialized).map_err(|err| {
        tracing::warn!(path = %path, error = %err, "could not create table file");
        err
    })?;
    tracing::info!(path = %path, "created table file");
    Ok(path)
}

pub fn load_table(host: &dyn HostFiles, path: &str) -> Result<TableDocument, FileError> {
    let text = host.read_file(path)?;
    deserialize_table_state(&text)
}

pub fn save_table(host: &dyn HostFiles, path: &str, document: &TableDocument) -> Result<(), FileError> {
    let text = serialize_table_state(document)?;
    host.write_file(path, &text)
}
