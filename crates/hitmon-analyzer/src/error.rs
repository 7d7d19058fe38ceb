/// Errors raised while building the analyzer from configuration.
///
/// Every variant is a configuration error: they surface once, when a
/// [`MetricRegistry`](crate::registry::MetricRegistry) or calculator is
/// constructed, and never while samples are being processed.
///
/// # Examples
///
/// ```rust
/// use hitmon_analyzer::error::AnalyzerError;
///
/// let err = AnalyzerError::DuplicateMetric("/intel/procfs/cpu".to_string());
/// assert!(err.to_string().contains("/intel/procfs/cpu"));
/// ```
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalyzerError {
    /// The config entry carries no calculator sub-config this build knows.
    #[error("Analyzer: no calculator config found for metric '{metric}'")]
    MissingCalculator { metric: String },

    /// A calculator sub-config has an out-of-range or inconsistent value.
    #[error("Analyzer: invalid config for metric '{metric}': {reason}")]
    InvalidConfig { metric: String, reason: String },

    /// A wildcard metric name could not be compiled.
    #[error("Analyzer: invalid metric pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Two entries configure the same exact metric name.
    #[error("Analyzer: duplicate config for metric '{0}'")]
    DuplicateMetric(String),
}

impl AnalyzerError {
    pub(crate) fn invalid(metric: &str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            metric: metric.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience `Result` alias for analyzer construction.
pub type Result<T> = std::result::Result<T, AnalyzerError>;
