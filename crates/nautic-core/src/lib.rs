pub mod app_config;
pub mod brands;
pub mod config;
pub mod products;
pub mod text;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, RemoteImagePolicy};
pub use brands::{load_brand_keywords, BrandKeywords, DEFAULT_BRAND_KEYWORDS};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::ProductRecord;
pub use text::{strip_markup, truncate_with_ellipsis};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read brands file {path}: {source}")]
    BrandsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse brands file: {0}")]
    BrandsFileParse(#[from] serde_yaml::Error),

    #[error("brands validation failed: {0}")]
    Validation(String),
}
