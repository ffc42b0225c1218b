//! CLI configuration

use std::path::PathBuf;

use clap::Args;
use storefront_cart::manager::{CartSettings, DEFAULT_STORAGE_KEY};

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Cart storage settings.
#[derive(Debug, Args)]
pub(crate) struct StorageConfig {
    /// Directory holding the persisted cart
    #[arg(long, env = "CART_STORE_DIR", default_value = ".storefront")]
    pub store_dir: PathBuf,

    /// Key the cart snapshot is stored under
    #[arg(long, env = "CART_STORAGE_KEY", default_value = DEFAULT_STORAGE_KEY)]
    pub storage_key: String,
}

impl StorageConfig {
    pub(crate) fn cart_settings(&self) -> CartSettings {
        CartSettings {
            storage_key: self.storage_key.clone(),
            ..CartSettings::default()
        }
    }
}

/// Storefront configuration
#[derive(Debug, Args)]
pub(crate) struct StorefrontConfig {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Cart storage settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Catalog YAML file; the bundled catalog is used when omitted
    #[arg(long, env = "CATALOG_PATH")]
    pub catalog: Option<PathBuf>,
}
