use serde::{Deserialize, Serialize};

/// One derived-metric definition.
///
/// `metric` is either an exact flat metric name (`/intel/procfs/cpu/all/active_percentage`)
/// or a wildcard pattern (`/intel/procfs/cpu/*/active_percentage`). `name` is the
/// label appended to the source namespace when a derived sample is emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    pub metric: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_window: Option<ThresholdWindowConfig>,
}

/// Durations are in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdWindowConfig {
    pub window_ms: u64,
    pub threshold: f64,
    pub sample_interval_ms: u64,
    #[serde(default)]
    pub output: OutputMode,
}

/// What a threshold-window calculator emits.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OutputMode {
    /// Emit the hit ratio on every sample.
    #[default]
    Ratio,
    /// Emit a one-shot alert once `alert_ratio` of the window is hit.
    /// `None` inherits [`MetricConfigs::alert_ratio`].
    Alert {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alert_ratio: Option<f64>,
    },
}

/// The full configuration document.
///
/// # Examples
///
/// ```
/// use hitmon_analyzer::config::{MetricConfigs, OutputMode};
///
/// let doc: MetricConfigs = serde_json::from_str(r#"{
///     "alert_ratio": 0.5,
///     "configs": [{
///         "metric": "/intel/procfs/cpu/*/active_percentage",
///         "name": "busy",
///         "threshold_window": {
///             "window_ms": 80000, "threshold": 50.0, "sample_interval_ms": 5000,
///             "output": { "mode": "alert" }
///         }
///     }]
/// }"#).unwrap();
///
/// let configs = doc.into_resolved();
/// let output = &configs[0].threshold_window.as_ref().unwrap().output;
/// assert_eq!(output, &OutputMode::Alert { alert_ratio: Some(0.5) });
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricConfigs {
    /// Default hit ratio for alert-mode entries that do not set their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_ratio: Option<f64>,
    pub configs: Vec<MetricConfig>,
}

impl MetricConfigs {
    /// Applies document-level defaults and returns the individual entries.
    pub fn into_resolved(self) -> Vec<MetricConfig> {
        let global = self.alert_ratio;
        self.configs
            .into_iter()
            .map(|mut config| {
                if let Some(ThresholdWindowConfig {
                    output: OutputMode::Alert { alert_ratio },
                    ..
                }) = config.threshold_window.as_mut()
                {
                    if alert_ratio.is_none() {
                        *alert_ratio = global;
                    }
                }
                config
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_mode_defaults_to_ratio() {
        let config: MetricConfig = serde_json::from_str(
            r#"{"metric": "/a", "name": "busy",
                "threshold_window": {"window_ms": 30000, "threshold": 50, "sample_interval_ms": 5000}}"#,
        )
        .unwrap();
        assert_eq!(config.threshold_window.unwrap().output, OutputMode::Ratio);
    }

    #[test]
    fn per_entry_alert_ratio_wins_over_global() {
        let doc = MetricConfigs {
            alert_ratio: Some(0.5),
            configs: vec![MetricConfig {
                metric: "/a".into(),
                name: "busy".into(),
                threshold_window: Some(ThresholdWindowConfig {
                    window_ms: 30_000,
                    threshold: 50.0,
                    sample_interval_ms: 5_000,
                    output: OutputMode::Alert {
                        alert_ratio: Some(0.9),
                    },
                }),
            }],
        };
        let resolved = doc.into_resolved();
        assert_eq!(
            resolved[0].threshold_window.as_ref().unwrap().output,
            OutputMode::Alert {
                alert_ratio: Some(0.9)
            }
        );
    }

    #[test]
    fn missing_variant_config_still_parses() {
        let config: MetricConfig =
            serde_json::from_str(r#"{"metric": "/a", "name": "busy"}"#).unwrap();
        assert!(config.threshold_window.is_none());
    }
}
