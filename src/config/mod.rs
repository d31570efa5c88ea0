/// Service configuration loaded from the environment.
// region:    --- Imports
use crate::account::jwt::MAX_TOKEN_DAYS;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Config Error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}
// endregion: --- Config Error

// region:    --- Config
/// Where uploaded deliverables end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
    Cloudinary,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "cloudinary" => Ok(Self::Cloudinary),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_reset: bool,
    pub jwt_secret: String,
    pub jwt_expires_days: i64,
    pub cors_origin: String,
    pub storage_backend: StorageBackend,
    pub upload_dir: String,
    pub cloudinary_cloud_name: Option<String>,
    pub cloudinary_upload_preset: Option<String>,
    pub kafka_brokers: Option<String>,
    pub notification_topic: String,
}

impl Config {
    /// Load from process environment, reading `.env` first when present.
    pub fn load() -> Result<Self, ConfigError> {
        if dotenvy::dotenv().is_ok() {
            info!("{:<12} --> loaded .env file", "Config");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_backend: StorageBackend = try_load(&lookup, "STORAGE_BACKEND", "local")?;

        let config = Self {
            port: try_load(&lookup, "PORT", "4000")?,
            database_url: required(&lookup, "DATABASE_URL")?,
            database_max_connections: try_load(&lookup, "DATABASE_MAX_CONNECTIONS", "5")?,
            database_reset: try_load(&lookup, "DATABASE_RESET", "false")?,
            jwt_secret: required(&lookup, "JWT_SECRET")?,
            jwt_expires_days: try_load(&lookup, "JWT_EXPIRES_DAYS", "7")?,
            cors_origin: try_load(&lookup, "CORS_ORIGIN", "http://localhost:3000")?,
            upload_dir: try_load(&lookup, "UPLOAD_DIR", "./uploads")?,
            cloudinary_cloud_name: optional(&lookup, "CLOUDINARY_CLOUD_NAME"),
            cloudinary_upload_preset: optional(&lookup, "CLOUDINARY_UPLOAD_PRESET"),
            kafka_brokers: optional(&lookup, "KAFKA_BROKERS"),
            notification_topic: try_load(&lookup, "NOTIFICATION_TOPIC", "notifications")?,
            storage_backend,
        };

        if !(1..=MAX_TOKEN_DAYS).contains(&config.jwt_expires_days) {
            warn!(
                "{:<12} --> JWT_EXPIRES_DAYS out of range: {}",
                "Config", config.jwt_expires_days
            );
            return Err(ConfigError::Invalid {
                key: "JWT_EXPIRES_DAYS",
                reason: format!("must be between 1 and {MAX_TOKEN_DAYS}"),
            });
        }

        if config.storage_backend == StorageBackend::Cloudinary {
            if config.cloudinary_cloud_name.is_none() {
                return Err(ConfigError::Missing("CLOUDINARY_CLOUD_NAME"));
            }
            if config.cloudinary_upload_preset.is_none() {
                return Err(ConfigError::Missing("CLOUDINARY_UPLOAD_PRESET"));
            }
        }

        Ok(config)
    }
}
// endregion: --- Config

// region:    --- Helpers
fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key).ok_or(ConfigError::Missing(key))
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let raw = optional(lookup, key).unwrap_or_else(|| {
        info!("{:<12} --> {key} not set, using default: {default}", "Config");
        default.to_string()
    });

    raw.parse().map_err(|e: T::Err| {
        warn!("{:<12} --> Invalid {key} value: {e}", "Config");
        ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }
    })
}
// endregion: --- Helpers
