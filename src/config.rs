//! Model configuration and validation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TopicModelError};

/// How sampling sweeps are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SamplingMode {
    /// Exact collapsed Gibbs sampling, one token at a time.
    #[default]
    Sequential,
    /// Documents are split into `partitions` contiguous blocks swept in
    /// parallel against stale word-topic counts that are merged at the end
    /// of every sweep. Converges differently from `Sequential`.
    ApproximateParallel {
        /// Number of document blocks.
        partitions: usize,
    },
}

/// Parameters of one topic-model fit.
///
/// # Example
///
/// ```rust
/// use topicsift::ModelConfig;
///
/// let config = ModelConfig::default().with_topic_count(2).with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Number of topics (K).
    pub topic_count: usize,
    /// Dirichlet prior for document-topic distributions.
    pub alpha: f64,
    /// Dirichlet prior for topic-word distributions.
    pub beta: f64,
    /// Minimum number of documents a token must occur in.
    pub min_doc_freq: usize,
    /// Maximum share of documents a token may occur in, in `(0, 1]`.
    pub max_doc_freq: f64,
    /// Sweeps run and discarded before accumulation starts.
    pub burn_in_sweeps: usize,
    /// Sweeps whose counts are averaged into φ and θ.
    pub sampling_sweeps: usize,
    /// Length of each topic's ranked word list.
    pub top_words_per_topic: usize,
    /// Seed of the run's random generator.
    pub random_seed: u64,
    /// Sweep scheduling.
    pub mode: SamplingMode,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            topic_count: 7,
            alpha: 0.1,
            beta: 0.01,
            min_doc_freq: 2,
            max_doc_freq: 0.9,
            burn_in_sweeps: 200,
            sampling_sweeps: 100,
            top_words_per_topic: 15,
            random_seed: 42,
            mode: SamplingMode::Sequential,
        }
    }
}

impl ModelConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_topic_count(mut self, k: usize) -> Self {
        self.topic_count = k;
        self
    }

    #[must_use]
    pub fn with_priors(mut self, alpha: f64, beta: f64) -> Self {
        self.alpha = alpha;
        self.beta = beta;
        self
    }

    #[must_use]
    pub fn with_doc_freq_bounds(mut self, min_doc_freq: usize, max_doc_freq: f64) -> Self {
        self.min_doc_freq = min_doc_freq;
        self.max_doc_freq = max_doc_freq;
        self
    }

    #[must_use]
    pub fn with_sweeps(mut self, burn_in: usize, sampling: usize) -> Self {
        self.burn_in_sweeps = burn_in;
        self.sampling_sweeps = sampling;
        self
    }

    #[must_use]
    pub fn with_top_words(mut self, n: usize) -> Self {
        self.top_words_per_topic = n;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: SamplingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Check every parameter before any sampling state is allocated.
    pub fn validate(&self) -> Result<()> {
        if self.topic_count == 0 {
            return Err(TopicModelError::invalid("topic_count must be > 0"));
        }
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(TopicModelError::invalid(format!(
                "alpha must be a positive finite number, got {}",
                self.alpha
            )));
        }
        if !(self.beta.is_finite() && self.beta > 0.0) {
            return Err(TopicModelError::invalid(format!(
                "beta must be a positive finite number, got {}",
                self.beta
            )));
        }
        if !(self.max_doc_freq > 0.0 && self.max_doc_freq <= 1.0) {
            return Err(TopicModelError::invalid(format!(
                "max_doc_freq must lie in (0, 1], got {}",
                self.max_doc_freq
            )));
        }
        if self.burn_in_sweeps == 0 {
            return Err(TopicModelError::invalid("burn_in_sweeps must be > 0"));
        }
        if self.sampling_sweeps == 0 {
            return Err(TopicModelError::invalid("sampling_sweeps must be > 0"));
        }
        if self.top_words_per_topic == 0 {
            return Err(TopicModelError::invalid("top_words_per_topic must be > 0"));
        }
        if let SamplingMode::ApproximateParallel { partitions: 0 } = self.mode {
            return Err(TopicModelError::invalid("parallel mode needs at least one partition"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ModelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.topic_count, 7);
        assert_eq!(config.top_words_per_topic, 15);
        assert_eq!(config.mode, SamplingMode::Sequential);
    }

    #[test]
    fn test_zero_topics_rejected() {
        let err = ModelConfig::default().with_topic_count(0).validate().unwrap_err();
        assert!(matches!(err, TopicModelError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_negative_priors_rejected() {
        assert!(ModelConfig::default().with_priors(-0.1, 0.01).validate().is_err());
        assert!(ModelConfig::default().with_priors(0.1, -1.0).validate().is_err());
        assert!(ModelConfig::default().with_priors(f64::NAN, 0.01).validate().is_err());
    }

    #[test]
    fn test_sweep_counts_rejected() {
        assert!(ModelConfig::default().with_sweeps(0, 10).validate().is_err());
        assert!(ModelConfig::default().with_sweeps(10, 0).validate().is_err());
    }

    #[test]
    fn test_max_doc_freq_range() {
        assert!(ModelConfig::default().with_doc_freq_bounds(1, 0.0).validate().is_err());
        assert!(ModelConfig::default().with_doc_freq_bounds(1, 1.5).validate().is_err());
        assert!(ModelConfig::default().with_doc_freq_bounds(1, 1.0).validate().is_ok());
    }

    #[test]
    fn test_parallel_zero_partitions_rejected() {
        let config =
            ModelConfig::default().with_mode(SamplingMode::ApproximateParallel { partitions: 0 });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let config = ModelConfig::from_json_str(r#"{"topic_count": 3, "random_seed": 9}"#)
            .expect("config should parse");
        assert_eq!(config.topic_count, 3);
        assert_eq!(config.random_seed, 9);
        assert_eq!(config.min_doc_freq, 2);
    }

    #[test]
    fn test_json_parallel_mode() {
        let config = ModelConfig::from_json_str(
            r#"{"mode": {"kind": "approximate_parallel", "partitions": 4}}"#,
        )
        .expect("config should parse");
        assert_eq!(config.mode, SamplingMode::ApproximateParallel { partitions: 4 });
    }

    #[test]
    fn test_json_invalid_values_rejected() {
        let err = ModelConfig::from_json_str(r#"{"alpha": -2.0}"#).unwrap_err();
        assert!(matches!(err, TopicModelError::InvalidConfiguration(_)));
    }
}
