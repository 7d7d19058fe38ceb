use crate::calculators::{build_calculator, validate};
use crate::config::MetricConfig;
use crate::error::{AnalyzerError, Result};
use crate::pattern::{MetricPattern, MetricSelector};
use crate::{Calculator, Output};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

struct PatternBinding {
    pattern: MetricPattern,
    config: Arc<MetricConfig>,
}

/// Counts of bound names, for watching metric-name cardinality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    /// Calculators created from exact configs.
    pub exact: usize,
    /// Calculators created lazily through a pattern.
    pub bound: usize,
    pub patterns: usize,
    /// Names that matched nothing and will never be retried.
    pub unresolved: usize,
}

/// Maps concrete metric names to calculators.
///
/// Exact configs are built up front. Wildcard configs are kept in
/// registration order and bound lazily: the first time an unknown name is
/// seen, the first matching pattern builds a calculator that is memoized
/// under that name for the life of the registry. A name that matches no
/// pattern is remembered as unresolved and never matched again.
///
/// The registry is not synchronized; callers sharing it across threads must
/// serialize access themselves.
pub struct MetricRegistry {
    calculators: HashMap<String, Box<dyn Calculator>>,
    patterns: Vec<PatternBinding>,
    unresolved: HashSet<String>,
    exact_count: usize,
}

impl MetricRegistry {
    /// Validates every config and builds the calculators for exact names.
    ///
    /// # Errors
    ///
    /// Fails on the first invalid config, malformed pattern, or repeated
    /// exact metric name.
    pub fn new(configs: Vec<MetricConfig>) -> Result<Self> {
        let mut calculators: HashMap<String, Box<dyn Calculator>> = HashMap::new();
        let mut patterns = Vec::new();

        for config in configs {
            let config = Arc::new(config);
            match MetricSelector::parse(&config.metric)? {
                MetricSelector::Exact(name) => {
                    if calculators.contains_key(&name) {
                        return Err(AnalyzerError::DuplicateMetric(name));
                    }
                    calculators.insert(name, build_calculator(config)?);
                }
                MetricSelector::Pattern(pattern) => {
                    validate(&config)?;
                    patterns.push(PatternBinding { pattern, config });
                }
            }
        }

        tracing::info!(
            exact = calculators.len(),
            patterns = patterns.len(),
            "Metric registry initialized"
        );

        Ok(Self {
            exact_count: calculators.len(),
            calculators,
            patterns,
            unresolved: HashSet::new(),
        })
    }

    /// Looks up an already-bound calculator.
    pub fn resolve(&mut self, name: &str) -> Option<&mut (dyn Calculator + 'static)> {
        self.calculators.get_mut(name).map(|c| c.as_mut())
    }

    /// Like [`resolve`](Self::resolve), but binds `name` through the first
    /// matching pattern when it is not bound yet.
    pub fn bind_and_resolve(&mut self, name: &str) -> Option<&mut (dyn Calculator + 'static)> {
        if !self.calculators.contains_key(name) && !self.bind(name) {
            return None;
        }
        self.resolve(name)
    }

    /// Feeds one sample to the calculator bound to `name`.
    ///
    /// Returns `None` for names that no config selects, and whenever the
    /// calculator itself has nothing to report.
    pub fn process_metric(&mut self, timestamp: i64, name: &str, value: f64) -> Option<Output> {
        self.bind_and_resolve(name)?.update(timestamp, value)
    }

    /// Read-only view of the calculator bound to `name`.
    pub fn calculator(&self, name: &str) -> Option<&dyn Calculator> {
        self.calculators.get(name).map(|c| c.as_ref())
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.calculators.contains_key(name)
    }

    pub fn is_unresolved(&self, name: &str) -> bool {
        self.unresolved.contains(name)
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            exact: self.exact_count,
            bound: self.calculators.len() - self.exact_count,
            patterns: self.patterns.len(),
            unresolved: self.unresolved.len(),
        }
    }

    fn bind(&mut self, name: &str) -> bool {
        if self.unresolved.contains(name) {
            return false;
        }

        let Some(binding) = self.patterns.iter().find(|b| b.pattern.matches(name)) else {
            tracing::debug!(metric = name, "No config matches metric, ignoring it from now on");
            self.unresolved.insert(name.to_string());
            return false;
        };

        match build_calculator(Arc::clone(&binding.config)) {
            Ok(calculator) => {
                tracing::info!(
                    metric = name,
                    pattern = %binding.pattern,
                    "Bound metric to pattern config"
                );
                self.calculators.insert(name.to_string(), calculator);
                true
            }
            Err(e) => {
                tracing::warn!(metric = name, error = %e, "Failed to build calculator for metric");
                self.unresolved.insert(name.to_string());
                false
            }
        }
    }
}
