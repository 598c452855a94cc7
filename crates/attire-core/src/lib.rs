use thiserror::Error;

pub mod app_config;
pub mod catalog;
pub mod config;
pub mod record;

pub use app_config::{AppConfig, Environment};
pub use catalog::{load_catalog, CatalogFile, CategorySpec, GenderCatalog, SiteCatalog};
pub use config::{load_app_config, load_app_config_from_env};
pub use record::{Availability, Price, ProductRecord, ProgressCheckpoint};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog file {path}: {source}")]
    CatalogIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file: {0}")]
    CatalogParse(#[from] serde_yaml::Error),

    #[error("catalog validation failed: {0}")]
    Validation(String),
}
