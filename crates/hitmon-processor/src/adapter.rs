use anyhow::{Context, Result};
use hitmon_analyzer::config::MetricConfigs;
use hitmon_analyzer::registry::MetricRegistry;
use hitmon_analyzer::{DerivedMetric, Output};
use hitmon_common::types::{MetricSample, MetricValue};

/// Tag set on every derived sample.
pub const DERIVED_TAG: &str = "derived_metrics_process";
/// Tag carrying the raw input value a derived sample was computed from.
pub const RAW_VALUE_TAG: &str = "average_data";

/// Runs host batches through a [`MetricRegistry`].
///
/// Owns the registry; a host that processes batches concurrently must put
/// the analyzer behind a lock.
pub struct NodeAnalyzer {
    registry: MetricRegistry,
}

impl NodeAnalyzer {
    pub fn new(registry: MetricRegistry) -> Self {
        Self { registry }
    }

    pub fn from_configs(configs: MetricConfigs) -> Result<Self> {
        let registry =
            MetricRegistry::new(configs.into_resolved()).context("Unable to create derived metrics")?;
        Ok(Self::new(registry))
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    /// Returns `batch` with one extra sample appended per analyzer output.
    ///
    /// A ratio output becomes a new sample under `<namespace>/<derived name>`;
    /// an alert re-emits the triggering sample unchanged. Samples without a
    /// numeric payload or with an unrepresentable timestamp pass through
    /// untouched.
    pub fn process_batch(&mut self, mut batch: Vec<MetricSample>) -> Vec<MetricSample> {
        let mut produced = Vec::new();

        for sample in &batch {
            let Some(value) = sample.data.as_ref().and_then(MetricValue::as_f64) else {
                tracing::debug!(metric = %sample.namespace, "Skipping sample without numeric data");
                continue;
            };
            let Some(timestamp) = sample.timestamp_nanos() else {
                tracing::debug!(metric = %sample.namespace, "Skipping sample with out-of-range timestamp");
                continue;
            };

            let name = sample.metric_name();
            match self.registry.process_metric(timestamp, &name, value) {
                Some(Output::Derived(derived)) => produced.push(derived_sample(sample, &derived, value)),
                Some(Output::Alert(alert)) => {
                    tracing::debug!(
                        metric = %name,
                        alert = %alert.name,
                        tags = %sample.tag_list(),
                        "Forwarding alerting sample"
                    );
                    produced.push(sample.clone());
                }
                None => {}
            }
        }

        batch.extend(produced);
        batch
    }
}

fn derived_sample(source: &MetricSample, derived: &DerivedMetric, raw: f64) -> MetricSample {
    let mut tags = source.tags.clone();
    tags.insert(DERIVED_TAG.to_string(), "true".to_string());
    tags.insert(RAW_VALUE_TAG.to_string(), raw.to_string());

    MetricSample {
        namespace: source.namespace.child(&derived.name),
        timestamp: source.timestamp,
        data: Some(MetricValue::Float(derived.value)),
        tags,
        version: source.version,
    }
}
