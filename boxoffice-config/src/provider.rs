//! Configuration provider using Figment

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use tracing::{debug, trace};

use crate::discovery::{discover, ConfigFile, ConfigFormat};
use crate::error::{ConfigError, ConfigResult};
use crate::types::BoxOfficeConfig;

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "BOXOFFICE_";

/// Loads [`BoxOfficeConfig`] from layered sources.
///
/// Sources merge in precedence order (later sources override earlier ones):
/// 1. Built-in defaults
/// 2. `boxoffice.toml`, then `boxoffice.yaml`/`.yml`, then `boxoffice.json`
///    from the search directory
/// 3. An explicitly given file
/// 4. `BOXOFFICE_` environment variables, `__` separating nested keys
///    (`BOXOFFICE_TABLE__DEFAULT_PER_PAGE=25`)
///
/// Nothing is cached; every [`load`](Self::load) reads the sources again.
#[derive(Debug, Clone)]
pub struct ConfigProvider {
    search_dir: PathBuf,
    explicit_file: Option<PathBuf>,
}

impl ConfigProvider {
    /// Search for configuration files in `search_dir`.
    pub fn new(search_dir: impl Into<PathBuf>) -> Self {
        Self {
            search_dir: search_dir.into(),
            explicit_file: None,
        }
    }

    /// Search the current directory.
    pub fn from_current_dir() -> Self {
        Self::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Also merge `path` above the discovered files.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }

    pub fn search_dir(&self) -> &Path {
        &self.search_dir
    }

    /// Load and validate the configuration.
    pub fn load(&self) -> ConfigResult<BoxOfficeConfig> {
        let config: BoxOfficeConfig = self.build_figment()?.extract()?;
        config.validate()?;
        debug!(
            excluded_fields = ?config.forms.excluded_fields,
            log_level = %config.logging.level,
            "configuration loaded"
        );
        Ok(config)
    }

    fn build_figment(&self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(BoxOfficeConfig::default()));

        for file in discover(&self.search_dir) {
            trace!(path = %file.path.display(), format = ?file.format, "merging config file");
            figment = figment.merge(file_provider(&file));
        }

        if let Some(path) = &self.explicit_file {
            let format = ConfigFormat::from_path(path).ok_or_else(|| {
                ConfigError::invalid_value(
                    "config",
                    format!("unsupported file extension: {}", path.display()),
                )
            })?;
            figment = figment.merge(file_provider(&ConfigFile {
                path: path.clone(),
                format,
            }));
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }
}

impl Default for ConfigProvider {
    fn default() -> Self {
        Self::from_current_dir()
    }
}

fn file_provider(file: &ConfigFile) -> Figment {
    match file.format {
        ConfigFormat::Toml => Figment::from(Toml::file(&file.path)),
        ConfigFormat::Yaml => Figment::from(Yaml::file(&file.path)),
        ConfigFormat::Json => Figment::from(Json::file(&file.path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_load_defaults_from_empty_dir() {
        let dir = TempDir::new().unwrap();
        let config = ConfigProvider::new(dir.path()).load().unwrap();
        assert_eq!(config, BoxOfficeConfig::default());
    }

    #[test]
    #[serial]
    fn test_unsupported_explicit_file() {
        let dir = TempDir::new().unwrap();
        let err = ConfigProvider::new(dir.path())
            .with_file(dir.path().join("settings.ini"))
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
