//! Configuration file discovery
//!
//! Looks for `boxoffice.toml`, `boxoffice.yaml`, `boxoffice.yml` and
//! `boxoffice.json` in one directory. Files are returned in merge order, so
//! JSON overrides YAML, which overrides TOML.

use std::path::{Path, PathBuf};

use tracing::trace;

/// Base name of every configuration file.
pub const CONFIG_FILE_STEM: &str = "boxoffice";

/// Format of a configuration file, detected from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Detect format from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// A configuration file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub format: ConfigFormat,
}

/// Find configuration files in `dir`, lowest precedence first.
pub fn discover(dir: &Path) -> Vec<ConfigFile> {
    ["toml", "yaml", "yml", "json"]
        .iter()
        .filter_map(|ext| {
            let path = dir.join(format!("{CONFIG_FILE_STEM}.{ext}"));
            if !path.is_file() {
                return None;
            }
            trace!(path = %path.display(), "found config file");
            ConfigFormat::from_extension(ext).map(|format| ConfigFile { path, format })
        })
        .collect()
}
