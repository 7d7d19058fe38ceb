use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct ProcessorConfig {
    /// HTTP(S) location of the metric config document
    pub metrics_config_url: Option<String>,
    /// Local path of the metric config document
    pub metrics_config_path: Option<String>,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Extra download attempts after the first failure
    #[serde(default = "default_fetch_retries")]
    pub fetch_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_fetch_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

/// Where the metric config document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource<'a> {
    Url(&'a str),
    Path(&'a Path),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub retries: u32,
    /// Delay before retry `n` is `n * backoff`.
    pub backoff: Duration,
}

impl ProcessorConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read processor config {path}"))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.source()?;
        Ok(config)
    }

    /// Exactly one of `metrics_config_url` and `metrics_config_path` must be set.
    pub fn source(&self) -> anyhow::Result<ConfigSource<'_>> {
        match (
            non_blank(self.metrics_config_url.as_deref()),
            non_blank(self.metrics_config_path.as_deref()),
        ) {
            (Some(url), None) => Ok(ConfigSource::Url(url)),
            (None, Some(path)) => Ok(ConfigSource::Path(Path::new(path))),
            (Some(_), Some(_)) => {
                anyhow::bail!("metrics_config_url and metrics_config_path are mutually exclusive")
            }
            (None, None) => anyhow::bail!("one of metrics_config_url or metrics_config_path is required"),
        }
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(self.fetch_timeout_secs),
            retries: self.fetch_retries,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
