use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::db::default_data_directory;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_service_name() -> String {
    "Rate Cards API".to_string()
}

fn data_directory() -> PathBuf {
    default_data_directory().unwrap_or_else(|| PathBuf::from("ratecard-data"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_transformations_path")]
    pub transformations_path: PathBuf,
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
}

fn default_transformations_path() -> PathBuf {
    data_directory().join("ratecard.sqlite")
}

fn default_history_path() -> PathBuf {
    data_directory().join("transformations_history.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            transformations_path: default_transformations_path(),
            history_path: default_history_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory standing in for the object store; buckets are subdirectories.
    #[serde(default = "default_storage_root")]
    pub root_directory: PathBuf,
    pub bucket: String,
    /// Key prefix under which each transformation gets its own folder.
    #[serde(default = "default_jobs_root_path")]
    pub jobs_root_path: String,
}

fn default_storage_root() -> PathBuf {
    data_directory().join("objects")
}

fn default_jobs_root_path() -> String {
    "rate-cards".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

fn default_page_size() -> u32 {
    20
}

fn default_max_page_size() -> u32 {
    200
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `ratecard=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// A self-contained configuration keeping every file under `base`.
    pub fn local(base: &Path, bucket: &str) -> Self {
        Self {
            version: default_version(),
            service_name: default_service_name(),
            database: DatabaseConfig {
                transformations_path: base.join("ratecard.sqlite"),
                history_path: base.join("transformations_history.db"),
            },
            storage: StorageConfig {
                root_directory: base.join("objects"),
                bucket: bucket.to_string(),
                jobs_root_path: default_jobs_root_path(),
            },
            api: ApiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
