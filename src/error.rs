//! Error types for topicsift.
//!
//! Every fatal condition is reported before the count tables are touched,
//! so a returned error never carries a half-trained model.

use thiserror::Error;

/// Result type alias for topicsift operations.
pub type Result<T> = std::result::Result<T, TopicModelError>;

/// Errors that can occur while building or fitting a topic model.
#[derive(Error, Debug)]
pub enum TopicModelError {
    /// No token survived normalization and document-frequency filtering.
    #[error(
        "empty vocabulary: no token of {documents} documents survived filtering \
         (min_doc_freq={min_doc_freq}, max_doc_freq={max_doc_freq})"
    )]
    EmptyVocabulary {
        /// Corpus size.
        documents: usize,
        /// Absolute lower document-frequency bound.
        min_doc_freq: usize,
        /// Upper document-frequency bound, as a fraction of the corpus.
        max_doc_freq: f64,
    },

    /// Model parameters that cannot produce a valid sampler.
    #[error("invalid model configuration: {0}")]
    InvalidConfiguration(String),

    /// The caller raised the cancellation flag between two sweeps.
    #[error("inference cancelled before sweep {sweep}")]
    Cancelled {
        /// Zero-based index of the sweep that did not run.
        sweep: usize,
    },

    /// A required CSV column is absent from the header row.
    #[error("missing CSV column: {column}")]
    MissingColumn {
        /// Column name that was requested.
        column: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TopicModelError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}
