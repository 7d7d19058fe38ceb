use crate::config::{MetricConfig, OutputMode, ThresholdWindowConfig};
use crate::error::{AnalyzerError, Result};
use crate::window::HitWindow;
use crate::{Alert, Calculator, DerivedMetric, Output};
use std::sync::Arc;

const NANOS_PER_MILLI: i64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowMode {
    Ratio,
    /// Fire once `target` hits are in the window, then start over.
    Alert { target: usize },
}

/// Validated numeric form of a [`ThresholdWindowConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdWindowSettings {
    pub window_nanos: i64,
    pub sample_interval_nanos: i64,
    pub threshold: f64,
    /// `window / sample_interval`; the ratio denominator.
    pub total_slots: i64,
    pub mode: WindowMode,
}

impl ThresholdWindowSettings {
    pub fn resolve(metric: &str, config: &ThresholdWindowConfig) -> Result<Self> {
        let window_nanos = millis_to_nanos(metric, "window_ms", config.window_ms)?;
        let sample_interval_nanos =
            millis_to_nanos(metric, "sample_interval_ms", config.sample_interval_ms)?;
        if !config.threshold.is_finite() {
            return Err(AnalyzerError::invalid(metric, "threshold must be a finite number"));
        }

        let total_slots = window_nanos / sample_interval_nanos;
        if total_slots <= 0 {
            return Err(AnalyzerError::invalid(
                metric,
                format!(
                    "window of {}ms holds no {}ms sample interval",
                    config.window_ms, config.sample_interval_ms
                ),
            ));
        }

        let mode = match config.output {
            OutputMode::Ratio => WindowMode::Ratio,
            OutputMode::Alert { alert_ratio } => {
                let ratio = alert_ratio.ok_or_else(|| {
                    AnalyzerError::invalid(metric, "alert mode requires alert_ratio")
                })?;
                if !(ratio > 0.0 && ratio <= 1.0) {
                    return Err(AnalyzerError::invalid(
                        metric,
                        format!("alert_ratio must be in (0, 1], got {ratio}"),
                    ));
                }
                let target = (total_slots as f64 * ratio).ceil().max(1.0) as usize;
                WindowMode::Alert { target }
            }
        };

        Ok(Self {
            window_nanos,
            sample_interval_nanos,
            threshold: config.threshold,
            total_slots,
            mode,
        })
    }
}

fn millis_to_nanos(metric: &str, field: &str, millis: u64) -> Result<i64> {
    if millis == 0 {
        return Err(AnalyzerError::invalid(metric, format!("{field} must be positive")));
    }
    i64::try_from(millis)
        .ok()
        .and_then(|ms| ms.checked_mul(NANOS_PER_MILLI))
        .ok_or_else(|| AnalyzerError::invalid(metric, format!("{field} is too large")))
}

/// Tracks samples at or above a threshold over a trailing window.
///
/// Each above-threshold sample first fills sampling gaps, then the window is
/// pruned to `[timestamp - window, timestamp]`, then the sample is recorded.
/// Below-threshold samples leave the history alone. In ratio mode every
/// sample yields `hits / total_slots`; in alert mode an [`Alert`] is returned
/// once the hit count reaches the target and the history is cleared.
pub struct ThresholdWindowCalculator {
    config: Arc<MetricConfig>,
    settings: ThresholdWindowSettings,
    window: HitWindow,
}

impl ThresholdWindowCalculator {
    pub fn new(config: Arc<MetricConfig>, settings: ThresholdWindowSettings) -> Self {
        let window = HitWindow::new(settings.window_nanos, settings.sample_interval_nanos);
        Self {
            config,
            settings,
            window,
        }
    }

    pub fn settings(&self) -> &ThresholdWindowSettings {
        &self.settings
    }

    pub fn window(&self) -> &HitWindow {
        &self.window
    }
}

impl Calculator for ThresholdWindowCalculator {
    fn config(&self) -> &MetricConfig {
        &self.config
    }

    fn hit_count(&self) -> usize {
        self.window.len()
    }

    fn update(&mut self, timestamp: i64, value: f64) -> Option<Output> {
        if value >= self.settings.threshold {
            self.window.fill_gap(timestamp);
            self.window.prune(timestamp);
            if !self.window.record(timestamp) {
                tracing::debug!(
                    metric = %self.config.metric,
                    timestamp,
                    "Sample not after latest hit, not recorded"
                );
            }
        }

        match self.settings.mode {
            WindowMode::Ratio => Some(Output::Derived(DerivedMetric {
                name: self.config.name.clone(),
                value: self.window.len() as f64 / self.settings.total_slots as f64,
            })),
            WindowMode::Alert { target } => {
                let hits = self.window.len();
                if hits < target {
                    return None;
                }
                self.window.clear();
                tracing::info!(
                    metric = %self.config.metric,
                    name = %self.config.name,
                    hits,
                    target,
                    "Hit target reached, alert fired"
                );
                Some(Output::Alert(Alert {
                    name: self.config.name.clone(),
                    timestamp,
                    hits,
                    target,
                }))
            }
        }
    }
}
