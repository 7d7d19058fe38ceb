//! Calculator construction from configuration.

pub mod threshold_window;

use crate::config::MetricConfig;
use crate::error::{AnalyzerError, Result};
use crate::Calculator;
use std::sync::Arc;
use threshold_window::{ThresholdWindowCalculator, ThresholdWindowSettings};

/// Checks that `config` can build a calculator without building one.
pub fn validate(config: &MetricConfig) -> Result<()> {
    check_label(config)?;
    match &config.threshold_window {
        Some(tw) => ThresholdWindowSettings::resolve(&config.metric, tw).map(|_| ()),
        None => Err(AnalyzerError::MissingCalculator {
            metric: config.metric.clone(),
        }),
    }
}

/// Builds a fresh calculator for `config`.
///
/// The config is shared, not copied: every calculator bound through the same
/// wildcard entry points at the same allocation.
///
/// # Errors
///
/// Returns [`AnalyzerError::MissingCalculator`] when no known sub-config is
/// present and [`AnalyzerError::InvalidConfig`] when its values are out of
/// range.
///
/// # Examples
///
/// ```
/// use hitmon_analyzer::calculators::build_calculator;
/// use hitmon_analyzer::config::{MetricConfig, OutputMode, ThresholdWindowConfig};
/// use hitmon_analyzer::Calculator;
/// use std::sync::Arc;
///
/// let config = Arc::new(MetricConfig {
///     metric: "/intel/procfs/cpu/all/active_percentage".into(),
///     name: "busy".into(),
///     threshold_window: Some(ThresholdWindowConfig {
///         window_ms: 30_000,
///         threshold: 50.0,
///         sample_interval_ms: 5_000,
///         output: OutputMode::Ratio,
///     }),
/// });
/// let mut calculator = build_calculator(config).unwrap();
/// assert!(calculator.update(0, 75.0).is_some());
/// assert_eq!(calculator.hit_count(), 1);
/// ```
pub fn build_calculator(config: Arc<MetricConfig>) -> Result<Box<dyn Calculator>> {
    check_label(&config)?;
    let settings = match &config.threshold_window {
        Some(tw) => ThresholdWindowSettings::resolve(&config.metric, tw)?,
        None => {
            return Err(AnalyzerError::MissingCalculator {
                metric: config.metric.clone(),
            })
        }
    };
    Ok(Box::new(ThresholdWindowCalculator::new(config, settings)))
}

fn check_label(config: &MetricConfig) -> Result<()> {
    if config.name.is_empty() {
        return Err(AnalyzerError::invalid(&config.metric, "derived metric name is empty"));
    }
    if config.name.contains('/') {
        return Err(AnalyzerError::invalid(
            &config.metric,
            format!("derived metric name '{}' must be a single segment", config.name),
        ));
    }
    Ok(())
}
