//! Test support utilities for kubegate integration tests.
//!
//! Provides an isolated home directory, a config writer and a mock gateway.

#![allow(dead_code)]

pub mod assertions;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use gateway::Gateway;
#[allow(unused_imports)]
pub use fixtures::*;

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test environment with isolated temp directories.
///
/// Child processes get `HOME` pointed at `home`, so the default config and
/// kubeconfig locations never touch the real user's files.
pub struct Test {
    /// Working directory for child processes
    pub dir: TempDir,
    /// Temporary home directory
    pub home: TempDir,
}

impl Test {
    /// Create a new empty test environment.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");

        Self { dir, home }
    }

    /// Create a test environment with `~/.kubegate/config.toml` written.
    ///
    /// `{kubeconfig}` in `config` is replaced with [`Test::kubeconfig_path`].
    pub fn with_config(config: &str) -> Self {
        let t = Self::new();
        t.write_config(config);
        t
    }

    /// Default config location inside the temp home.
    pub fn config_path(&self) -> PathBuf {
        self.home.path().join(".kubegate").join("config.toml")
    }

    /// Kubeconfig the fixtures point the sink at.
    pub fn kubeconfig_path(&self) -> PathBuf {
        self.home.path().join(".kube").join("config")
    }

    pub fn write_config(&self, config: &str) {
        let path = self.config_path();
        fs::create_dir_all(path.parent().unwrap()).expect("failed to create config dir");
        let contents = config.replace(
            "{kubeconfig}",
            &self.kubeconfig_path().to_string_lossy().replace('\\', "/"),
        );
        fs::write(&path, contents).expect("failed to write config");
    }

    /// Contents of the kubeconfig, or an empty string if it was never written.
    pub fn kubeconfig(&self) -> String {
        fs::read_to_string(self.kubeconfig_path()).unwrap_or_default()
    }

    pub fn write_kubeconfig(&self, contents: &str) {
        let path = self.kubeconfig_path();
        fs::create_dir_all(path.parent().unwrap()).expect("failed to create kube dir");
        fs::write(&path, contents).expect("failed to write kubeconfig");
    }
}
