use embedrank_core::{Error, LengthPolicy, Result, DEFAULT_SNIPPET_CHARS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Threshold used when the corpus looks healthy.
pub const DEFAULT_THRESHOLD: f64 = 0.1;
/// Threshold used once text-encoded embeddings have been seen.
pub const DEGRADED_THRESHOLD: f64 = 0.05;
pub const DEFAULT_LIMIT: i64 = 5;

/// Configuration for a corpus search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Results scoring at or above this are flagged as matches.
    pub threshold: f64,
    /// Maximum number of results. Zero or negative returns nothing.
    pub limit: i64,
    pub length_policy: LengthPolicy,
    pub snippet_chars: usize,
    /// Corpora at least this large are scanned in parallel.
    pub parallel_min_docs: usize,
    /// Searches slower than this log a warning.
    #[serde(with = "crate::serde_millis")]
    pub slow_search_warn: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            limit: DEFAULT_LIMIT,
            length_policy: LengthPolicy::Truncate,
            snippet_chars: DEFAULT_SNIPPET_CHARS,
            parallel_min_docs: 4096,
            slow_search_warn: Duration::from_secs(1),
        }
    }
}

impl SearchConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_length_policy(mut self, policy: LengthPolicy) -> Self {
        self.length_policy = policy;
        self
    }

    /// Load from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_threshold("threshold", self.threshold)?;
        if self.snippet_chars == 0 {
            return Err(Error::InvalidConfig("snippet_chars must be positive".to_string()));
        }
        Ok(())
    }
}

/// Picks a search threshold from what an audit found.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdPolicy {
    pub base: f64,
    /// Used instead of `base` when text-encoded embeddings are present.
    pub degraded: f64,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            base: DEFAULT_THRESHOLD,
            degraded: DEGRADED_THRESHOLD,
        }
    }
}

impl ThresholdPolicy {
    pub fn validate(&self) -> Result<()> {
        validate_threshold("base", self.base)?;
        validate_threshold("degraded", self.degraded)
    }
}

/// Configuration for a format audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Number of leading documents examined.
    pub sample_size: usize,
    pub max_error_samples: usize,
    pub max_prefix_samples: usize,
    /// Components kept per prefix sample.
    pub prefix_len: usize,
    pub threshold_policy: ThresholdPolicy,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            sample_size: 10,
            max_error_samples: 5,
            max_prefix_samples: 3,
            prefix_len: 3,
            threshold_policy: ThresholdPolicy::default(),
        }
    }
}

impl AuditConfig {
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_size == 0 {
            return Err(Error::InvalidConfig("sample_size must be positive".to_string()));
        }
        self.threshold_policy.validate()
    }
}

fn validate_threshold(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
        return Err(Error::InvalidConfig(format!(
            "{} must be within [-1.0, 1.0], got {}",
            name, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SearchConfig::default().validate().is_ok());
        assert!(AuditConfig::default().validate().is_ok());
        assert_eq!(SearchConfig::default().limit, 5);
        assert_eq!(SearchConfig::default().threshold, 0.1);
    }

    #[test]
    fn test_threshold_out_of_range() {
        let config = SearchConfig::default().with_threshold(1.5);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = SearchConfig::default().with_threshold(f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_sample_size_rejected() {
        let config = AuditConfig::default().with_sample_size(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: SearchConfig =
            serde_json::from_str(r#"{"threshold": 0.3, "length_policy": "reject", "slow_search_warn": 250}"#)
                .unwrap();
        assert_eq!(config.threshold, 0.3);
        assert_eq!(config.length_policy, LengthPolicy::Reject);
        assert_eq!(config.slow_search_warn, Duration::from_millis(250));
        assert_eq!(config.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_serialize_roundtrip_millis() {
        let json = serde_json::to_value(SearchConfig::default()).unwrap();
        assert_eq!(json["slow_search_warn"], 1000);
    }
}
