use crate::config::{ConfigSource, FetchOptions, ProcessorConfig};
use anyhow::{Context, Result};
use hitmon_analyzer::config::MetricConfigs;
use std::path::Path;

/// Loads the metric config document from wherever `config` points.
pub async fn load_metric_configs(config: &ProcessorConfig) -> Result<MetricConfigs> {
    match config.source()? {
        ConfigSource::Path(path) => read_metric_configs(path),
        ConfigSource::Url(url) => download_metric_configs(url, &config.fetch_options()).await,
    }
}

pub fn parse_metric_configs(raw: &str) -> Result<MetricConfigs> {
    serde_json::from_str(raw).context("Unable to decode metric config document")
}

pub fn read_metric_configs(path: &Path) -> Result<MetricConfigs> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Unable to read metric config file {}", path.display()))?;
    parse_metric_configs(&content)
}

/// Downloads and decodes the config document.
///
/// Transport failures and non-2xx responses are retried `options.retries`
/// times with linear backoff; a document that downloads but fails to decode
/// is not retried.
pub async fn download_metric_configs(url: &str, options: &FetchOptions) -> Result<MetricConfigs> {
    let client = reqwest::Client::builder()
        .timeout(options.timeout)
        .build()
        .context("Unable to build HTTP client")?;

    let mut attempt: u32 = 0;
    let body = loop {
        attempt += 1;
        match fetch_body(&client, url).await {
            Ok(body) => break body,
            Err(e) if attempt <= options.retries => {
                tracing::warn!(url, attempt, error = %e, "Config download failed, retrying");
                tokio::time::sleep(options.backoff * attempt).await;
            }
            Err(e) => {
                return Err(e.context(format!("Unable to download config file after {attempt} attempts")))
            }
        }
    };

    let configs = parse_metric_configs(&body)?;
    tracing::info!(url, count = configs.configs.len(), "Metric configs downloaded");
    Ok(configs)
}

async fn fetch_body(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.text().await?)
}
