// User settings
// Loaded from ~/.config/dbdiff/settings.toml, or the file named by $DBDIFF_SETTINGS

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use dbdiff_engine::run::{DEFAULT_DOC_PREFIX, DEFAULT_SKIP_ROWS};

pub const SETTINGS_ENV: &str = "DBDIFF_SETTINGS";

/// Defaults for command-line options. Flags given on the command line win.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rows discarded above the header row
    pub skip_rows: usize,

    /// Sheets starting with this are never compared. Empty disables.
    pub doc_prefix: String,

    /// Directory the report is written to
    pub outdir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            skip_rows: DEFAULT_SKIP_ROWS,
            doc_prefix: DEFAULT_DOC_PREFIX.to_string(),
            outdir: PathBuf::from("."),
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(SETTINGS_ENV).filter(|p| !p.is_empty()) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dbdiff")
            .join("settings.toml")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// A missing file is silent; an unreadable one warns.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("error parsing {}: {}; using default settings", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("error reading {}: {}; using default settings", path.display(), e);
                Self::default()
            }
        }
    }

    /// Effective exclusion prefix: `None` when filtering is disabled.
    pub fn exclude_prefix(&self) -> Option<&str> {
        Some(self.doc_prefix.as_str()).filter(|p| !p.is_empty())
    }
}
