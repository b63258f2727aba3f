//! Isolated service instance backed by a temporary directory.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use ratecard::{Config, TransformationService};

pub struct TestHarness {
    temp_dir: TempDir,
    pub config: Config,
    pub service: TransformationService,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Builds a harness after letting `adjust` tweak the local config.
    pub fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut config = Config::local(temp_dir.path(), "ratecards-test");
        adjust(&mut config);
        let service = TransformationService::from_config(&config).expect("Failed to open service");

        Self {
            temp_dir,
            config,
            service,
        }
    }

    pub fn base(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Filesystem path of an object key inside the configured bucket.
    pub fn object_path(&self, key: &str) -> PathBuf {
        self.config
            .storage
            .root_directory
            .join(&self.config.storage.bucket)
            .join(key)
    }

    /// Reopens the service on the same files, as after a restart.
    pub fn reopen(&self) -> TransformationService {
        TransformationService::from_config(&self.config).expect("Failed to reopen service")
    }
}
