/*
[INPUT]:  Optional YAML file + TASKDECK_* environment overrides
[OUTPUT]: Parsed dashboard configuration (endpoint, timings, paths)
[POS]:    Configuration layer - startup
[UPDATE]: When adding new configuration options
*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use taskdeck_adapter::{ClientConfig, DEFAULT_BASE_URL};

/// Environment variable prefix, e.g. `TASKDECK_BASE_URL`
pub const ENV_PREFIX: &str = "TASKDECK";

/// Top-level configuration for the dashboard
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Task Service address
    pub base_url: String,
    /// Period between background pulls
    pub poll_interval_ms: u64,
    /// Minimum time the refreshing indicator stays visible
    pub min_refresh_visible_ms: u64,
    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    /// File holding the bearer token between runs
    pub credential_path: PathBuf,
    /// Where exports and report downloads land
    pub download_dir: PathBuf,
    /// Daily rolling log files are written here when set
    pub log_dir: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval_ms: 3_000,
            min_refresh_visible_ms: 500,
            request_timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
            credential_path: default_credential_path(),
            download_dir: PathBuf::from("."),
            log_dir: None,
        }
    }
}

fn default_credential_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("taskdeck"))
        .unwrap_or_else(|| PathBuf::from(".taskdeck"))
        .join("token")
}

impl DashboardConfig {
    /// Load defaults, then the YAML file (if given), then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, config::Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Yaml)
                    .required(true),
            );
        }
        let loaded: Self = builder
            .add_source(env.try_parsing(true))
            .build()
            .context("read configuration sources")?
            .try_deserialize()
            .context("parse configuration")?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("serialize configuration")
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            bail!("base_url must not be empty");
        }
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn min_refresh_visible(&self) -> Duration {
        Duration::from_millis(self.min_refresh_visible_ms)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_millis(self.request_timeout_ms),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
        }
    }
}
