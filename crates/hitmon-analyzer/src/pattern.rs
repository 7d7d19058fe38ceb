use crate::error::{AnalyzerError, Result};

const WILDCARD_CHARS: [char; 4] = ['*', '?', '[', '{'];

/// How a configured `metric` string selects concrete metric names.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricSelector {
    Exact(String),
    Pattern(MetricPattern),
}

impl MetricSelector {
    /// Any `metric` containing a glob metacharacter is treated as a pattern.
    pub fn parse(metric: &str) -> Result<Self> {
        if metric.contains(WILDCARD_CHARS) {
            MetricPattern::compile(metric).map(Self::Pattern)
        } else {
            Ok(Self::Exact(metric.to_string()))
        }
    }
}

/// A validated wildcard metric name.
///
/// Wildcards never cross a `/`: each wildcard segment stands for exactly one
/// segment of the concrete name, so `/a/*/b` accepts `/a/x/b` but neither
/// `/a/x/y/b` nor `/a/b`.
///
/// # Examples
///
/// ```
/// use hitmon_analyzer::pattern::MetricPattern;
///
/// let pattern = MetricPattern::compile("/intel/procfs/cpu/*/active_percentage").unwrap();
/// assert!(pattern.matches("/intel/procfs/cpu/all/active_percentage"));
/// assert!(pattern.matches("/intel/procfs/cpu/3/active_percentage"));
/// assert!(!pattern.matches("/intel/procfs/cpu/3/iowait_percentage"));
/// assert!(!pattern.matches("/intel/procfs/cpu/node0/3/active_percentage"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPattern {
    source: String,
    segments: usize,
}

impl MetricPattern {
    pub fn compile(pattern: &str) -> Result<Self> {
        let invalid = |reason: &str| AnalyzerError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        let Some(rest) = pattern.strip_prefix('/') else {
            return Err(invalid("must be an absolute path starting with '/'"));
        };
        if pattern.contains("**") {
            return Err(invalid("'**' would match across segments"));
        }

        let mut segments = 0;
        for segment in rest.split('/') {
            if segment.is_empty() {
                return Err(invalid("contains an empty segment"));
            }
            check_brackets(segment).map_err(invalid)?;
            segments += 1;
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        name.strip_prefix('/')
            .is_some_and(|rest| rest.split('/').count() == self.segments)
            && glob_match::glob_match(&self.source, name)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl std::fmt::Display for MetricPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// `[..]` classes and `{..}` alternations must close inside their segment.
fn check_brackets(segment: &str) -> std::result::Result<(), &'static str> {
    let mut in_class = false;
    let mut braces = 0usize;
    for c in segment.chars() {
        match c {
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            ']' => return Err("unmatched ']'"),
            '{' if !in_class => braces += 1,
            '}' if !in_class => {
                braces = braces.checked_sub(1).ok_or("unmatched '}'")?;
            }
            _ => {}
        }
    }
    if in_class {
        return Err("unclosed '['");
    }
    if braces > 0 {
        return Err("unclosed '{'");
    }
    Ok(())
}
