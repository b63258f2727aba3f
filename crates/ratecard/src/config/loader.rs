use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

/// Upper bound on page size accepted by the listing endpoint.
pub const MAX_PAGE_SIZE: u32 = 200;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(invalid(format!(
            "Unsupported config version: {}",
            config.version
        )));
    }

    let bucket = config.storage.bucket.trim();
    if bucket.is_empty() {
        return Err(invalid("storage.bucket must not be empty"));
    }
    if bucket.contains('/') || bucket == "." || bucket == ".." {
        return Err(invalid(format!(
            "storage.bucket '{}' must be a single path segment",
            bucket
        )));
    }

    let api = &config.api;
    if api.max_page_size == 0 || api.max_page_size > MAX_PAGE_SIZE {
        return Err(invalid(format!(
            "api.max_page_size must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, api.max_page_size
        )));
    }
    if api.default_page_size == 0 || api.default_page_size > api.max_page_size {
        return Err(invalid(format!(
            "api.default_page_size must be between 1 and {}, got {}",
            api.max_page_size, api.default_page_size
        )));
    }

    if let Err(e) = tracing_subscriber::EnvFilter::try_new(&config.logging.level) {
        return Err(invalid(format!(
            "Invalid logging.level '{}': {}",
            config.logging.level, e
        )));
    }

    if config.database.transformations_path == config.database.history_path {
        log::warn!(
            "Transformations and history share the database file {}",
            config.database.transformations_path.display()
        );
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = load_config_from_str(r#"{"storage": {"bucket": "ratecards"}}"#).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.service_name, "Rate Cards API");
        assert_eq!(config.api.default_page_size, 20);
        assert_eq!(config.api.max_page_size, 200);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert_eq!(config.storage.jobs_root_path, "rate-cards");
        assert!(config
            .database
            .transformations_path
            .ends_with("ratecard.sqlite"));
    }

    #[test]
    fn test_full_config() {
        let config = load_config_from_str(
            r#"{
                "version": "1.0",
                "service_name": "Rate Cards API (staging)",
                "database": {
                    "transformations_path": "/var/lib/ratecard/ratecard.sqlite",
                    "history_path": "/var/lib/ratecard/history.db"
                },
                "storage": {"root_directory": "/srv/objects", "bucket": "rc", "jobs_root_path": "jobs"},
                "api": {"default_page_size": 50, "max_page_size": 100},
                "logging": {"level": "ratecard=debug", "json": true}
            }"#,
        )
        .unwrap();
        assert_eq!(
            config.database.history_path,
            PathBuf::from("/var/lib/ratecard/history.db")
        );
        assert_eq!(config.storage.root_directory, PathBuf::from("/srv/objects"));
        assert_eq!(config.api.default_page_size, 50);
        assert!(config.logging.json);
    }

    #[test]
    fn test_missing_storage_is_parse_error() {
        let err = load_config_from_str("{}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseJson(_)));
    }

    #[test]
    fn test_rejects_bad_version() {
        let err = load_config_from_str(r#"{"version": "2.0", "storage": {"bucket": "rc"}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("Unsupported config version"));
    }

    #[test]
    fn test_rejects_bad_bucket() {
        for bucket in ["", "  ", "a/b", ".."] {
            let json = format!(r#"{{"storage": {{"bucket": "{}"}}}}"#, bucket);
            assert!(
                matches!(load_config_from_str(&json), Err(ConfigError::Validation { .. })),
                "bucket {:?} should be rejected",
                bucket
            );
        }
    }

    #[test]
    fn test_rejects_page_sizes_out_of_bounds() {
        for api in [
            r#"{"max_page_size": 201}"#,
            r#"{"max_page_size": 0}"#,
            r#"{"default_page_size": 0}"#,
            r#"{"default_page_size": 30, "max_page_size": 10}"#,
        ] {
            let json = format!(r#"{{"storage": {{"bucket": "rc"}}, "api": {}}}"#, api);
            assert!(
                matches!(load_config_from_str(&json), Err(ConfigError::Validation { .. })),
                "api {} should be rejected",
                api
            );
        }
    }

    #[test]
    fn test_rejects_bad_log_level() {
        let json = r#"{"storage": {"bucket": "rc"}, "logging": {"level": "ratecard=loud"}}"#;
        assert!(matches!(
            load_config_from_str(json),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratecard.json");
        std::fs::write(&path, r#"{"storage": {"bucket": "rc"}}"#).unwrap();
        assert_eq!(load_config(&path).unwrap().storage.bucket, "rc");

        let err = load_config(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
