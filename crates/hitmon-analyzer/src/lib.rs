//! Windowed threshold-hit analyzer.
//!
//! The analyzer keeps, per concrete metric name, a trailing window of
//! "hits" (samples at or above a threshold) and turns every incoming
//! `(timestamp, value)` pair into either a hit-ratio derived metric or a
//! one-shot alert. Metric names are bound to calculators by exact config or,
//! lazily, by the first matching wildcard pattern in the
//! [`registry::MetricRegistry`].

pub mod calculators;
pub mod config;
pub mod error;
pub mod pattern;
pub mod registry;
pub mod window;

#[cfg(test)]
mod tests;

use config::MetricConfig;
use serde::Serialize;

/// Per-metric-stream state machine fed one observation at a time.
///
/// Implementations are created by [`calculators::build_calculator`] and owned
/// by the [`registry::MetricRegistry`], which calls [`Calculator::update`] for
/// every sample whose metric name is bound to the instance. Timestamps are
/// nanoseconds and are expected to be non-decreasing per instance.
pub trait Calculator: Send {
    /// The configuration entry this calculator was built from.
    fn config(&self) -> &MetricConfig;

    /// Number of hits currently retained in the window.
    fn hit_count(&self) -> usize;

    /// Feeds one observation and returns the output it produces, if any.
    fn update(&mut self, timestamp: i64, value: f64) -> Option<Output>;
}

/// Continuous value derived from the hit window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedMetric {
    /// Label from [`MetricConfig::name`].
    pub name: String,
    pub value: f64,
}

/// Edge-triggered alert raised when the window accumulated enough hits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    /// Label from [`MetricConfig::name`].
    pub name: String,
    /// Timestamp of the sample that completed the target.
    pub timestamp: i64,
    pub hits: usize,
    pub target: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Output {
    Derived(DerivedMetric),
    Alert(Alert),
}
