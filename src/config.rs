//! Configuration management with YAML support

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logs: LogsConfig,

    #[serde(default)]
    pub trash: TrashConfig,
}

/// Location of the session log tree: one subdirectory per project, one
/// `<sessionId>.jsonl` file per session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_logs_path")]
    pub path: String,
}

/// Trash root and retention policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrashConfig {
    #[serde(default = "default_trash_path")]
    pub path: String,

    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
}

// Default value functions
fn default_logs_path() -> String {
    "~/.claude/projects".to_string()
}

fn default_trash_path() -> String {
    "~/.claude/trash".to_string()
}

fn default_retention_days() -> i64 {
    30
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            path: default_logs_path(),
        }
    }
}

impl Default for TrashConfig {
    fn default() -> Self {
        Self {
            path: default_trash_path(),
            retention_days: default_retention_days(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logs: LogsConfig::default(),
            trash: TrashConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    /// Searches in order:
    /// 1. Provided path
    /// 2. ./ccview.yaml (current directory)
    /// 3. ~/.config/ccview/ccview.yaml
    pub fn load(path: &str) -> Result<Self> {
        let search_paths = vec![
            shellexpand::tilde(path).to_string(),
            "ccview.yaml".to_string(),
            shellexpand::tilde("~/.config/ccview/ccview.yaml").to_string(),
        ];

        for search_path in &search_paths {
            if std::path::Path::new(search_path).exists() {
                let content = std::fs::read_to_string(search_path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        // No config file found, use defaults
        Ok(Config::default())
    }

    /// Root directory holding the project log tree, with ~ expanded.
    /// The directory is allowed to not exist; scans just come back empty.
    pub fn logs_root(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.logs.path).to_string())
    }

    /// Root directory for trashed session files, with ~ expanded.
    /// Created on demand by the trash store.
    pub fn trash_root(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.trash.path).to_string())
    }

    pub fn retention_days(&self) -> i64 {
        self.trash.retention_days
    }
}
