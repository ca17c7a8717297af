use anyhow::{Context, Result};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::audit::DEFAULT_STALE_AFTER_DAYS;
use crate::error::AuditError;
use crate::server::{
    DEFAULT_QUEUE_FACTOR, DEFAULT_TIMEOUT, DEFAULT_WORKERS, MAX_QUEUE_FACTOR, MAX_WORKERS,
};

/// Configuration file structure for ci-audit.
///
/// Every value can also be given on the command line, which takes precedence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub audit: AuditConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Jenkins base URL, with a trailing slash
    pub url: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Concurrent job fetchers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Work queue holds `workers * queue_factor` pending jobs
    #[serde(default = "default_queue_factor")]
    pub queue_factor: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AuditConfig {
    /// Days without a build before a job counts as stale
    #[serde(default = "default_stale_after_days")]
    pub stale_after_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,

    /// Print the job health table after the findings
    #[serde(default)]
    pub health: bool,

    /// Where save mode writes job configurations
    #[serde(default = "default_jobs_dir")]
    pub jobs_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Summary,
    Json,
    Csv,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_factor: default_queue_factor(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            stale_after_days: default_stale_after_days(),
        }
    }
}

impl AuditConfig {
    /// Age past which a job's last build counts as stale.
    pub fn stale_after(&self) -> Result<TimeDelta, AuditError> {
        if self.stale_after_days < 0 {
            return Err(AuditError::Config(
                "stale-after-days must not be negative".into(),
            ));
        }
        TimeDelta::try_days(self.stale_after_days).ok_or_else(|| {
            AuditError::Config(format!(
                "stale-after-days is too large: {}",
                self.stale_after_days
            ))
        })
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Summary,
            pretty: false,
            health: false,
            jobs_dir: default_jobs_dir(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_queue_factor() -> usize {
    DEFAULT_QUEUE_FACTOR
}

fn default_stale_after_days() -> i64 {
    DEFAULT_STALE_AFTER_DAYS
}

fn default_jobs_dir() -> PathBuf {
    PathBuf::from("jobs")
}

/// Checks that a server URL parses and ends in `/`, since every endpoint is
/// built by appending to it.
pub fn validate_base_url(raw: &str) -> Result<(), AuditError> {
    if !raw.ends_with('/') {
        return Err(AuditError::Config(format!(
            "server URL should end in a trailing slash: {raw}"
        )));
    }
    Url::parse(raw).map_err(|e| AuditError::Config(format!("Invalid server URL {raw}: {e}")))?;
    Ok(())
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./ci-audit.toml
    /// 3. ./ci-audit.json
    /// 4. ./ci-audit.yaml
    /// 5. ./ci-audit.yml
    /// 6. `<user config dir>/ci-audit/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = [
            "ci-audit.toml",
            "ci-audit.json",
            "ci-audit.yaml",
            "ci-audit.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        if let Some(user_config) = dirs::config_dir().map(|dir| dir.join("ci-audit").join("config.toml")) {
            if user_config.exists() {
                return Self::load_from_path(&user_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }

    /// Rejects settings the fetch pipeline cannot run with.
    pub fn validate(&self) -> Result<(), AuditError> {
        if let Some(url) = &self.server.url {
            validate_base_url(url)?;
        }
        if self.server.timeout_secs == 0 {
            return Err(AuditError::Config("timeout-secs must be positive".into()));
        }
        if !(1..=MAX_WORKERS).contains(&self.fetch.workers) {
            return Err(AuditError::Config(format!(
                "workers must be between 1 and {MAX_WORKERS}"
            )));
        }
        if !(1..=MAX_QUEUE_FACTOR).contains(&self.fetch.queue_factor) {
            return Err(AuditError::Config(format!(
                "queue-factor must be between 1 and {MAX_QUEUE_FACTOR}"
            )));
        }
        self.audit.stale_after()?;
        Ok(())
    }
}
