//! Process configuration.
//!
//! Values come from built-in defaults, then an optional YAML file named by
//! `COURIER_CONFIG`, then the `LISTEN` and `FILES_DIR` environment variables.
//!
//! ```yaml
//! server:
//!   listen_addr: 0.0.0.0:4221
//! files:
//!   directory: /tmp/data
//! ```

use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub files: FilesConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

/// Where the `/file/:name` endpoints read and write.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FilesConfig {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
}

fn default_listen_addr() -> String {
    "127.0.0.1:4221".to_string()
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var("COURIER_CONFIG") {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config file {path}"))?;
                Self::from_yaml(&raw).with_context(|| format!("invalid config file {path}"))?
            }
            Err(_) => Self::default(),
        };

        if let Ok(listen_addr) = std::env::var("LISTEN") {
            cfg.server.listen_addr = listen_addr;
        }
        if let Ok(directory) = std::env::var("FILES_DIR") {
            cfg.files.directory = PathBuf::from(directory);
        }

        Ok(cfg)
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }
}
