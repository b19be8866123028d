//! Topic modeling for short, noisy texts (tweets, speech transcripts).
//!
//! The pipeline is vocabulary construction, document encoding, Latent
//! Dirichlet Allocation fitted by collapsed Gibbs sampling, and extraction
//! of ranked topic words and each document's dominant topic.
//!
//! ```rust
//! use topicsift::{fit_topic_model, ModelConfig, RawDocument};
//!
//! let docs: Vec<RawDocument> = (0..6)
//!     .map(|i| {
//!         let text = if i % 2 == 0 { "vaccine clinic health" } else { "vote policy election" };
//!         RawDocument::new(i.to_string(), text)
//!     })
//!     .collect();
//! let config = ModelConfig::default().with_topic_count(2).with_sweeps(100, 50);
//! let result = fit_topic_model(&docs, &config).unwrap();
//! assert_eq!(result.topics.len(), 2);
//! assert_eq!(result.document_assignments.len(), 6);
//! ```

pub mod config;
pub mod corpus;
pub mod counts;
pub mod error;
pub mod model;
pub mod result;
pub mod sampler;
pub mod sink;
pub mod source;
pub mod tokenize;
pub mod vocabulary;

pub use config::{ModelConfig, SamplingMode};
pub use corpus::{Corpus, Document, RawDocument};
pub use error::{Result, TopicModelError};
pub use model::TopicModel;
pub use result::{DocumentAssignment, DominantTopic, RankedWord, Topic, TopicModelResult};
pub use vocabulary::Vocabulary;

/// Fit a topic model and extract its result in one call.
pub fn fit_topic_model(documents: &[RawDocument], config: &ModelConfig) -> Result<TopicModelResult> {
    Ok(TopicModel::fit(documents, config)?.result())
}
