//! User settings. Every field has a default so partial files load.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::FileError;
use crate::io::host::CreateOptions;
use crate::state::table_state::{StoreContext, DEFAULT_HISTORY_LIMIT};

pub const DEFAULT_AUTOSAVE_DEBOUNCE_MS: u64 = 250;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub history_limit: usize,
    pub autosave_debounce_ms: u64,
    pub table_folder: String,
    pub use_active_file_name_and_timestamp: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            autosave_debounce_ms: DEFAULT_AUTOSAVE_DEBOUNCE_MS,
            table_folder: String::new(),
            use_active_file_name_and_timestamp: false,
        }
    }
}

impl Settings {
    pub fn from_json_str(text: &str) -> Result<Self, FileError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, FileError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_json_str(&text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }

    pub fn store_context(&self) -> StoreContext {
        StoreContext {
            history_limit: self.history_limit,
            ..StoreContext::default()
        }
    }

    pub fn create_options(&self, active_note: Option<String>) -> CreateOptions {
        CreateOptions {
            folder_path: self.table_folder.clone(),
            active_note,
            use_active_file_name_and_timestamp: self.use_active_file_name_and_timestamp,
        }
    }
}
