// Per-sheet key map
// sheet name -> key column, or list of key columns. YAML by default,
// TOML for `.toml`, JSON for `.json`.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use dbdiff_engine::KeyMap;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadStatus {
    Loaded { entries: usize },
    /// File does not exist.
    Missing,
    /// File exists but could not be read or parsed.
    Malformed { reason: String },
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStatus::Loaded { entries } => write!(f, "loaded {} keyed sheet(s)", entries),
            LoadStatus::Missing => write!(f, "file not found"),
            LoadStatus::Malformed { reason } => write!(f, "malformed: {}", reason),
        }
    }
}

/// A key map plus how it was obtained. The map is empty unless `status` is `Loaded`.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyMapLoad {
    pub map: KeyMap,
    pub status: LoadStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Toml,
    Json,
}

impl Format {
    fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("toml") => Format::Toml,
            Some("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

/// Load a key map. Never fails: problems are reported through `status`.
pub fn load_key_map(path: &Path) -> KeyMapLoad {
    let degraded = |status: LoadStatus| {
        log::warn!(
            "index map {}: {}; all sheets compare by position",
            path.display(),
            status
        );
        KeyMapLoad {
            map: KeyMap::default(),
            status,
        }
    };

    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return degraded(LoadStatus::Missing),
        Err(e) => return degraded(LoadStatus::Malformed { reason: e.to_string() }),
    };

    match parse_key_map(&contents, Format::from_path(path)) {
        Ok(map) => {
            log::debug!("index map {}: {} keyed sheet(s)", path.display(), map.len());
            KeyMapLoad {
                status: LoadStatus::Loaded { entries: map.len() },
                map,
            }
        }
        Err(reason) => degraded(LoadStatus::Malformed { reason }),
    }
}

fn parse_key_map(contents: &str, format: Format) -> Result<KeyMap, String> {
    if contents.trim().is_empty() {
        return Ok(KeyMap::default());
    }
    match format {
        Format::Yaml => serde_yaml::from_str(contents).map_err(|e| e.to_string()),
        Format::Toml => toml::from_str(contents).map_err(|e| e.to_string()),
        Format::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
    }
}
