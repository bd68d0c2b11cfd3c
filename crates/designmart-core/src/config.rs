//! Configuration module
//!
//! Environment-driven configuration for the API server. Values are read once
//! at startup via [`Config::from_env`] and validated before the server binds.

use std::env;

use crate::validation::{PREVIEW_MAX_BYTES, RAW_MAX_BYTES};

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_DB_TIMEOUT_SECS: u64 = 30;
const DEFAULT_FILE_WRITE_TIMEOUT_SECS: u64 = 30;
// Body limit leaves headroom for several raw files plus multipart framing.
const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 256 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    /// Root directory of the asset tree; the security boundary for delivery.
    pub asset_root: String,
    /// Base URL prefixed onto relative storage paths in API responses.
    pub public_base_url: String,
    pub cors_origins: Vec<String>,
    pub preview_max_file_size: usize,
    pub raw_max_file_size: usize,
    pub max_request_body_size: usize,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    /// Per-file write timeout; a timed-out write is treated as an I/O failure.
    pub file_write_timeout_secs: u64,
    pub environment: String,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let config = Config {
            server_port: env_or("SERVER_PORT", DEFAULT_SERVER_PORT),
            database_url,
            asset_root: env::var("ASSET_ROOT").unwrap_or_else(|_| "./uploads".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            cors_origins,
            preview_max_file_size: env_or("PREVIEW_MAX_FILE_SIZE", PREVIEW_MAX_BYTES),
            raw_max_file_size: env_or("RAW_MAX_FILE_SIZE", RAW_MAX_BYTES),
            max_request_body_size: env_or("MAX_REQUEST_BODY_SIZE", DEFAULT_MAX_REQUEST_BODY_SIZE),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            db_timeout_seconds: env_or("DB_TIMEOUT_SECONDS", DEFAULT_DB_TIMEOUT_SECS),
            file_write_timeout_secs: env_or(
                "FILE_WRITE_TIMEOUT_SECS",
                DEFAULT_FILE_WRITE_TIMEOUT_SECS,
            ),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Fail fast on nonsense values before anything binds or connects.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.preview_max_file_size == 0 || self.raw_max_file_size == 0 {
            anyhow::bail!("file size limits must be greater than zero");
        }
        if self.max_request_body_size < self.raw_max_file_size {
            anyhow::bail!("MAX_REQUEST_BODY_SIZE must be at least RAW_MAX_FILE_SIZE");
        }
        if self.asset_root.trim().is_empty() {
            anyhow::bail!("ASSET_ROOT must not be empty");
        }
        if self.db_max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be greater than zero");
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment.to_lowercase().as_str(), "production" | "prod")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server_port: 3000,
            database_url: "postgres://localhost/designmart".to_string(),
            asset_root: "./uploads".to_string(),
            public_base_url: "http://localhost:3000".to_string(),
            cors_origins: vec![],
            preview_max_file_size: PREVIEW_MAX_BYTES,
            raw_max_file_size: RAW_MAX_BYTES,
            max_request_body_size: DEFAULT_MAX_REQUEST_BODY_SIZE,
            db_max_connections: 20,
            db_timeout_seconds: 30,
            file_write_timeout_secs: 30,
            environment: "test".to_string(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn body_limit_must_cover_raw_ceiling() {
        let mut config = base_config();
        config.max_request_body_size = config.raw_max_file_size - 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_limits_rejected() {
        let mut config = base_config();
        config.preview_max_file_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn production_detection() {
        let mut config = base_config();
        config.environment = "Production".to_string();
        assert!(config.is_production());
        config.environment = "development".to_string();
        assert!(!config.is_production());
    }
}
