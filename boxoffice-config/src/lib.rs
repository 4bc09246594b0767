//! Box office configuration
//!
//! Layered settings for the box office tools, loaded with Figment from
//! built-in defaults, `boxoffice.{toml,yaml,yml,json}` files and `BOXOFFICE_`
//! environment variables. See [`ConfigProvider`] for the precedence order.

pub mod discovery;
pub mod error;
pub mod provider;
pub mod types;

pub use discovery::{ConfigFile, ConfigFormat};
pub use error::{ConfigError, ConfigResult};
pub use provider::{ConfigProvider, ENV_PREFIX};
pub use types::{BoxOfficeConfig, FormsSettings, LoggingSettings, TableSettings};

/// Load configuration from the current directory and environment.
pub fn load_config() -> ConfigResult<BoxOfficeConfig> {
    ConfigProvider::from_current_dir().load()
}
