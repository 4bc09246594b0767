//! Configuration settings

use boxoffice_forms::{SortOrder, TableOptions, DEFAULT_EXCLUDED_FIELDS};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Largest page size the listing API accepts.
pub const MAX_PER_PAGE_LIMIT: u32 = 100;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Resolved box office configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxOfficeConfig {
    pub forms: FormsSettings,
    pub table: TableSettings,
    pub logging: LoggingSettings,
}

/// Form defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsSettings {
    /// Top-level fields never sent as changed values
    pub excluded_fields: Vec<String>,
}

impl Default for FormsSettings {
    fn default() -> Self {
        Self {
            excluded_fields: DEFAULT_EXCLUDED_FIELDS
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }
}

/// Listing defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    pub default_sort_by: String,
    pub default_sort_order: SortOrder,
    pub default_per_page: u32,
    pub max_per_page: u32,
}

impl Default for TableSettings {
    fn default() -> Self {
        let options = TableOptions::default();
        Self {
            default_sort_by: options.default_sort_by,
            default_sort_order: options.default_sort_order,
            default_per_page: options.default_per_page,
            max_per_page: options.max_per_page,
        }
    }
}

impl TableSettings {
    /// Table options seeded from these settings.
    pub fn options(&self, auto_fetch: bool) -> TableOptions {
        TableOptions {
            default_sort_by: self.default_sort_by.clone(),
            default_sort_order: self.default_sort_order,
            default_per_page: self.default_per_page,
            max_per_page: self.max_per_page,
            auto_fetch,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl BoxOfficeConfig {
    /// Reject settings no component could honour.
    pub fn validate(&self) -> ConfigResult<()> {
        let table = &self.table;
        if table.default_sort_by.is_empty() {
            return Err(ConfigError::invalid_value(
                "table.default_sort_by",
                "must not be empty",
            ));
        }
        if !(1..=MAX_PER_PAGE_LIMIT).contains(&table.max_per_page) {
            return Err(ConfigError::invalid_value(
                "table.max_per_page",
                format!("must be between 1 and {MAX_PER_PAGE_LIMIT}"),
            ));
        }
        if !(1..=table.max_per_page).contains(&table.default_per_page) {
            return Err(ConfigError::invalid_value(
                "table.default_per_page",
                format!("must be between 1 and {}", table.max_per_page),
            ));
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!("must be one of: {}", LOG_LEVELS.join(", ")),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = BoxOfficeConfig::default();
        config.validate().unwrap();
        assert_eq!(config.forms.excluded_fields, vec!["password"]);
        assert_eq!(config.table.default_sort_by, "createdAt");
        assert_eq!(config.table.default_sort_order, SortOrder::Desc);
        assert_eq!(config.table.default_per_page, 10);
    }

    #[test]
    fn test_validate_rejects_page_size_above_max() {
        let mut config = BoxOfficeConfig::default();
        config.table.default_per_page = 50;
        config.table.max_per_page = 20;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("table.default_per_page"));
    }

    #[test]
    fn test_validate_rejects_unknown_log_level() {
        let mut config = BoxOfficeConfig::default();
        config.logging.level = "loud".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_table_options_carry_settings() {
        let mut settings = TableSettings::default();
        settings.default_sort_by = "name".into();
        let options = settings.options(false);
        assert_eq!(options.default_sort_by, "name");
        assert!(!options.auto_fetch);
    }
}
