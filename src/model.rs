//! Fitted topic model: pipeline driver and φ/θ finalization.

use std::sync::atomic::AtomicBool;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::ModelConfig;
use crate::corpus::{Corpus, RawDocument};
use crate::counts::AveragedCounts;
use crate::error::Result;
use crate::result::{self, DegenerateDocument, DominantTopic, TopicModelResult};
use crate::sampler::GibbsSampler;
use crate::tokenize::tokenize;
use crate::vocabulary::Vocabulary;

/// A Latent Dirichlet Allocation model fitted by collapsed Gibbs sampling.
///
/// # Example
///
/// ```rust
/// use topicsift::{ModelConfig, RawDocument, TopicModel};
///
/// let docs = vec![
///     RawDocument::new("1", "vaccine clinic"),
///     RawDocument::new("2", "vaccine clinic"),
///     RawDocument::new("3", "vote policy"),
///     RawDocument::new("4", "vote policy"),
/// ];
/// let config = ModelConfig::default().with_topic_count(2).with_sweeps(50, 20);
/// let model = TopicModel::fit(&docs, &config).unwrap();
/// assert_eq!(model.theta().len(), 4);
/// assert_eq!(model.phi().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TopicModel {
    config: ModelConfig,
    vocabulary: Vocabulary,
    corpus: Corpus,
    phi: Vec<Vec<f64>>,   // [topic][word]
    theta: Vec<Vec<f64>>, // [doc][topic]
    warnings: Vec<DegenerateDocument>,
}

impl TopicModel {
    /// Build the vocabulary, encode the corpus and run inference.
    pub fn fit(documents: &[RawDocument], config: &ModelConfig) -> Result<Self> {
        Self::fit_with_cancel(documents, config, &AtomicBool::new(false))
    }

    /// Like [`TopicModel::fit`], polling `cancel` between sweeps.
    pub fn fit_with_cancel(
        documents: &[RawDocument],
        config: &ModelConfig,
        cancel: &AtomicBool,
    ) -> Result<Self> {
        config.validate()?;

        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(&d.text)).collect();
        let vocabulary = Vocabulary::build(&tokenized, config.min_doc_freq, config.max_doc_freq)?;
        log::info!(
            "Built vocabulary: {} terms from {} documents",
            vocabulary.len(),
            documents.len()
        );

        let corpus = Corpus::from_tokens(documents, &tokenized, &vocabulary);
        let warnings = degenerate_documents(&corpus);
        log::info!(
            "Encoded corpus: {} token occurrences, {} degenerate documents",
            corpus.token_count(),
            warnings.len()
        );

        let mut rng = StdRng::seed_from_u64(config.random_seed);
        let mut sampler = GibbsSampler::new(
            &corpus,
            config.topic_count,
            config.alpha,
            config.beta,
            &mut rng,
        )?;
        log::info!(
            "Starting LDA (K={}, burn-in={}, sampling={}, mode={:?})",
            config.topic_count,
            config.burn_in_sweeps,
            config.sampling_sweeps,
            config.mode
        );
        let averaged = sampler.run(
            config.burn_in_sweeps,
            config.sampling_sweeps,
            config.mode,
            &mut rng,
            cancel,
        )?;
        drop(sampler);

        let phi = finalize_phi(&averaged, config.beta, vocabulary.len());
        let theta = finalize_theta(&averaged, &corpus, config.alpha, config.topic_count);

        let model = Self {
            config: config.clone(),
            vocabulary,
            corpus,
            phi,
            theta,
            warnings,
        };
        if let Some(perplexity) = model.perplexity() {
            log::info!("Finished LDA, perplexity {perplexity:.3}");
        }
        Ok(model)
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// φ[t][w] = (nkw[t][w] + β) / (nk[t] + V·β), averaged counts.
    pub fn phi(&self) -> &[Vec<f64>] {
        &self.phi
    }

    /// θ[d][t] = (ndk[d][t] + α) / (N_d + K·α), uniform for empty documents.
    pub fn theta(&self) -> &[Vec<f64>] {
        &self.theta
    }

    /// Per-token perplexity of the training corpus under φ and θ.
    /// `None` when the corpus holds no token.
    pub fn perplexity(&self) -> Option<f64> {
        let n = self.corpus.token_count();
        if n == 0 {
            return None;
        }
        let mut log_lik = 0.0;
        for (d, doc) in self.corpus.documents().iter().enumerate() {
            for occ in &doc.occurrences {
                let p: f64 = self
                    .theta[d]
                    .iter()
                    .zip(&self.phi)
                    .map(|(th, phi_t)| th * phi_t[occ.word])
                    .sum();
                log_lik += p.ln();
            }
        }
        Some((-log_lik / n as f64).exp())
    }

    /// Documents left without any in-vocabulary token, in corpus order.
    pub fn degenerate_documents(&self) -> &[DegenerateDocument] {
        &self.warnings
    }

    /// Top `n` words of each topic with their φ weight.
    pub fn top_words(&self, n: usize) -> Vec<Vec<(String, f64)>> {
        self.phi
            .iter()
            .map(|row| {
                result::rank_words(row, n)
                    .into_iter()
                    .map(|w| (self.vocabulary.words()[w].clone(), row[w]))
                    .collect()
            })
            .collect()
    }

    /// Dominant topic of every document, in corpus order.
    pub fn dominant_topics(&self) -> Vec<DominantTopic> {
        self.corpus
            .documents()
            .iter()
            .zip(&self.theta)
            .map(|(doc, row)| result::dominant_topic(row, doc.is_degenerate()))
            .collect()
    }

    /// Extract the ranked topic word lists and document assignments.
    pub fn result(&self) -> TopicModelResult {
        let topics = self
            .phi
            .iter()
            .enumerate()
            .map(|(t, row)| result::Topic {
                topic_index: t,
                top_words: result::rank_words(row, self.config.top_words_per_topic)
                    .into_iter()
                    .enumerate()
                    .map(|(rank, w)| result::RankedWord {
                        rank: rank + 1,
                        word: self.vocabulary.words()[w].clone(),
                        weight: row[w],
                    })
                    .collect(),
            })
            .collect();

        let document_assignments = self
            .corpus
            .documents()
            .iter()
            .zip(self.dominant_topics())
            .map(|(doc, dominant_topic)| result::DocumentAssignment {
                document_id: doc.id.clone(),
                dominant_topic,
            })
            .collect();

        TopicModelResult {
            topics,
            document_assignments,
            warnings: self.warnings.clone(),
        }
    }
}

fn degenerate_documents(corpus: &Corpus) -> Vec<DegenerateDocument> {
    corpus
        .documents()
        .iter()
        .enumerate()
        .filter(|(_, doc)| doc.is_degenerate())
        .map(|(index, doc)| {
            log::warn!("Document {} has no in-vocabulary token, left unassigned", doc.id);
            DegenerateDocument {
                index,
                document_id: doc.id.clone(),
            }
        })
        .collect()
}

fn finalize_phi(avg: &AveragedCounts, beta: f64, v: usize) -> Vec<Vec<f64>> {
    let vb = v as f64 * beta;
    avg.nkw
        .iter()
        .zip(&avg.nk)
        .map(|(row, &nk)| {
            let denom = nk + vb;
            row.iter().map(|&c| (c + beta) / denom).collect()
        })
        .collect()
}

fn finalize_theta(avg: &AveragedCounts, corpus: &Corpus, alpha: f64, k: usize) -> Vec<Vec<f64>> {
    let ka = k as f64 * alpha;
    corpus
        .documents()
        .iter()
        .zip(&avg.ndk)
        .map(|(doc, row)| {
            if doc.is_degenerate() {
                return vec![1.0 / k as f64; k];
            }
            let denom = doc.len() as f64 + ka;
            row.iter().map(|&c| (c + alpha) / denom).collect()
        })
        .collect()
}
