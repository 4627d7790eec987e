//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::AppConfig;
use crate::common::errors::{DcaError, Result};

/// Environment variable that overrides the default API base URL
pub const BASE_URL_ENV: &str = "KRAKEN_API_BASE";

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with KRAKEN_DCA, `__` separated)
/// 2. Configuration file (YAML format)
/// 3. `KRAKEN_API_BASE` for the API base URL
/// 4. Default values
pub fn load_config(config_path: &str) -> Result<AppConfig> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    if !Path::new(config_path).exists() {
        return Err(DcaError::Configuration(format!(
            "configuration file '{}' not found, create it from config.example.yaml",
            config_path
        )));
    }

    let mut builder = Config::builder();

    if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
        builder = builder
            .set_default("api.base_url", base_url)
            .map_err(|e| DcaError::Configuration(e.to_string()))?;
    }

    builder = builder
        .add_source(File::with_name(config_path))
        .add_source(
            Environment::with_prefix("KRAKEN_DCA")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder
        .build()
        .map_err(|e| DcaError::Configuration(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| DcaError::Configuration(e.to_string()))
}
