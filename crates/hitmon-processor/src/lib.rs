//! Host side of the analyzer: loads the metric configuration, feeds sample
//! batches through a [`hitmon_analyzer::registry::MetricRegistry`], and
//! appends the derived samples to each batch.

pub mod adapter;
pub mod config;
pub mod loader;
pub mod transport;
