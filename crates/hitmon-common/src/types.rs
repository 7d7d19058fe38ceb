use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Hierarchical metric path, e.g. `["intel", "procfs", "cpu", "all", "active_percentage"]`.
///
/// The flat form used for configuration matching is the `/`-joined absolute
/// path.
///
/// # Examples
///
/// ```
/// use hitmon_common::types::Namespace;
///
/// let ns = Namespace::new(["intel", "procfs", "cpu"]);
/// assert_eq!(ns.segments(), ["intel", "procfs", "cpu"]);
/// assert_eq!(ns.to_metric_name(), "/intel/procfs/cpu");
/// assert_eq!(ns.child("busy").to_metric_name(), "/intel/procfs/cpu/busy");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(Vec<String>);

impl Namespace {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn to_metric_name(&self) -> String {
        let mut name = String::with_capacity(self.0.iter().map(|s| s.len() + 1).sum());
        for segment in &self.0 {
            name.push('/');
            name.push_str(segment);
        }
        name
    }

    /// Returns a copy of this namespace with `segment` appended.
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_metric_name())
    }
}

/// Raw sample payload as delivered by the host.
///
/// Hosts send integers, floats, and occasionally strings or booleans; only
/// the numeric variants are usable by the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Other(serde_json::Value),
}

impl MetricValue {
    /// Numeric view of the payload, `None` for non-numeric data.
    ///
    /// # Examples
    ///
    /// ```
    /// use hitmon_common::types::MetricValue;
    ///
    /// assert_eq!(MetricValue::Integer(42).as_f64(), Some(42.0));
    /// assert_eq!(MetricValue::Float(0.5).as_f64(), Some(0.5));
    /// assert_eq!(MetricValue::Other("busy".into()).as_f64(), None);
    /// ```
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Unsigned(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Other(_) => None,
        }
    }
}

/// One sample in a host batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub namespace: Namespace,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub data: Option<MetricValue>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub version: i64,
}

impl MetricSample {
    pub fn metric_name(&self) -> String {
        self.namespace.to_metric_name()
    }

    /// Timestamp in nanoseconds since the Unix epoch, `None` outside the
    /// representable range (roughly years 1677 to 2262).
    pub fn timestamp_nanos(&self) -> Option<i64> {
        self.timestamp.timestamp_nanos_opt()
    }

    /// Tags as `key=value` pairs ordered by key, for log lines.
    pub fn tag_list(&self) -> String {
        let mut keys: Vec<&str> = self.tags.keys().map(String::as_str).collect();
        keys.sort_unstable();
        let mut out = String::new();
        for key in keys {
            if !out.is_empty() {
                out.push(',');
            }
            out.push_str(key);
            out.push('=');
            out.push_str(&self.tags[key]);
        }
        out
    }
}
