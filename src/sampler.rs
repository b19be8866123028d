//! Collapsed Gibbs sampling for Latent Dirichlet Allocation.
//!
//! For an occurrence of word `w` in document `d` the full conditional is
//!
//! ```text
//! p(z = t | rest) ∝ (ndk[d][t] + α) · (nkw[t][w] + β) / (nk[t] + V·β)
//! ```
//!
//! with the occurrence's own contribution removed from the counts first.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::config::SamplingMode;
use crate::corpus::{Corpus, Document};
use crate::counts::{AveragedCounts, CountSums, CountTables};
use crate::error::{Result, TopicModelError};

/// Sampler state for one fit: topic labels plus the tables derived from them.
///
/// The sampler never owns a random generator; every call that draws takes
/// the run's generator by `&mut`.
#[derive(Debug, Clone)]
pub struct GibbsSampler<'a> {
    corpus: &'a Corpus,
    k: usize,
    alpha: f64,
    beta: f64,
    z: Vec<Vec<usize>>, // [doc][position]
    counts: CountTables,
}

impl<'a> GibbsSampler<'a> {
    /// Draw a uniform initial topic for every occurrence and build the counts.
    pub fn new(corpus: &'a Corpus, k: usize, alpha: f64, beta: f64, rng: &mut StdRng) -> Result<Self> {
        if k == 0 {
            return Err(TopicModelError::invalid("topic count must be > 0"));
        }
        if corpus.vocab_size() == 0 {
            return Err(TopicModelError::invalid("vocabulary size must be > 0"));
        }
        if !(alpha > 0.0 && beta > 0.0) {
            return Err(TopicModelError::invalid("alpha and beta must be positive"));
        }
        if !(corpus.vocab_size() as f64 * beta).is_finite() || !(k as f64 * alpha).is_finite() {
            return Err(TopicModelError::invalid(format!(
                "priors overflow: V*beta or K*alpha is not finite (V={}, K={k}, alpha={alpha}, beta={beta})",
                corpus.vocab_size()
            )));
        }

        let mut counts = CountTables::zeros(k, corpus.vocab_size(), corpus.len());
        let mut z = Vec::with_capacity(corpus.len());
        for (di, doc) in corpus.documents().iter().enumerate() {
            let mut row = Vec::with_capacity(doc.len());
            for occ in &doc.occurrences {
                let topic = rng.gen_range(0..k);
                row.push(topic);
                counts.add(di, occ.word, topic);
            }
            z.push(row);
        }

        Ok(Self {
            corpus,
            k,
            alpha,
            beta,
            z,
            counts,
        })
    }

    pub fn counts(&self) -> &CountTables {
        &self.counts
    }

    pub fn assignments(&self) -> &[Vec<usize>] {
        &self.z
    }

    /// One exact sweep in document order, then position order.
    pub fn sweep(&mut self, rng: &mut StdRng) -> Result<()> {
        let vb = self.corpus.vocab_size() as f64 * self.beta;
        let mut weights = vec![0.0f64; self.k];
        let corpus: &'a Corpus = self.corpus;

        for (di, doc) in corpus.documents().iter().enumerate() {
            resample_document(
                doc,
                &mut self.z[di],
                &mut self.counts.ndk[di],
                &mut self.counts.nkw,
                &mut self.counts.nk,
                Priors {
                    alpha: self.alpha,
                    beta: self.beta,
                    vb,
                },
                &mut weights,
                rng,
            )?;
        }
        Ok(())
    }

    /// One approximate sweep over `partitions` contiguous document blocks.
    ///
    /// Each block samples against a private copy of `nkw`/`nk` taken at the
    /// start of the sweep; the per-block deltas are merged afterwards, so the
    /// tables are exact again once this returns. Block generators are seeded
    /// from `rng` in block order.
    pub fn sweep_parallel(&mut self, partitions: usize, rng: &mut StdRng) -> Result<()> {
        let n_docs = self.corpus.len();
        if n_docs == 0 {
            return Ok(());
        }
        let chunk = n_docs.div_ceil(partitions.max(1)).max(1);
        let n_chunks = n_docs.div_ceil(chunk);
        let seeds: Vec<u64> = (0..n_chunks).map(|_| rng.gen()).collect();

        let priors = Priors {
            alpha: self.alpha,
            beta: self.beta,
            vb: self.corpus.vocab_size() as f64 * self.beta,
        };
        let k = self.k;
        let base_nkw = self.counts.nkw.clone();
        let base_nk = self.counts.nk.clone();
        let corpus: &'a Corpus = self.corpus;

        let partials: Vec<Result<_>> = corpus
            .documents()
            .par_chunks(chunk)
            .zip(self.z.par_chunks_mut(chunk))
            .zip(self.counts.ndk.par_chunks_mut(chunk))
            .zip(seeds.par_iter())
            .map(|(((docs, z_rows), ndk_rows), &seed)| -> Result<(Vec<Vec<usize>>, Vec<usize>)> {
                let mut local_rng = StdRng::seed_from_u64(seed);
                let mut nkw = base_nkw.clone();
                let mut nk = base_nk.clone();
                let mut weights = vec![0.0f64; k];
                for ((doc, z_row), ndk_row) in docs.iter().zip(z_rows.iter_mut()).zip(ndk_rows.iter_mut()) {
                    resample_document(
                        doc,
                        z_row,
                        ndk_row,
                        &mut nkw,
                        &mut nk,
                        priors,
                        &mut weights,
                        &mut local_rng,
                    )?;
                }
                Ok((nkw, nk))
            })
            .collect();

        let mut nkw = base_nkw.clone();
        let mut nk = base_nk.clone();
        for partial in partials {
            let (local_nkw, local_nk) = partial?;
            for t in 0..k {
                for (w, count) in nkw[t].iter_mut().enumerate() {
                    *count = *count + local_nkw[t][w] - base_nkw[t][w];
                }
                nk[t] = nk[t] + local_nk[t] - base_nk[t];
            }
        }
        self.counts.nkw = nkw;
        self.counts.nk = nk;
        Ok(())
    }

    /// Burn-in, then sampling sweeps whose counts are averaged.
    ///
    /// `cancel` is polled before every sweep; when it is set the run stops
    /// with [`TopicModelError::Cancelled`] and the partial sums are dropped.
    pub fn run(
        &mut self,
        burn_in: usize,
        sampling: usize,
        mode: SamplingMode,
        rng: &mut StdRng,
        cancel: &AtomicBool,
    ) -> Result<AveragedCounts> {
        let total = burn_in + sampling;
        let mut sums = CountSums::zeros(self.k, self.corpus.vocab_size(), self.corpus.len());

        for it in 0..total {
            if cancel.load(Ordering::Relaxed) {
                log::info!("LDA inference cancelled before sweep {}/{}", it + 1, total);
                return Err(TopicModelError::Cancelled { sweep: it });
            }

            match mode {
                SamplingMode::Sequential => self.sweep(rng)?,
                SamplingMode::ApproximateParallel { partitions } => {
                    self.sweep_parallel(partitions, rng)?
                }
            }

            if it >= burn_in {
                sums.accumulate(&self.counts);
            }
            if (it + 1) % 50 == 0 {
                log::debug!("Training LDA: sweep {}/{}", it + 1, total);
            }
        }

        Ok(sums.average())
    }
}

#[derive(Debug, Clone, Copy)]
struct Priors {
    alpha: f64,
    beta: f64,
    vb: f64,
}

/// Resample every occurrence of `doc` against the given tables.
#[allow(clippy::too_many_arguments)]
fn resample_document(
    doc: &Document,
    z_row: &mut [usize],
    ndk_row: &mut [usize],
    nkw: &mut [Vec<usize>],
    nk: &mut [usize],
    priors: Priors,
    weights: &mut [f64],
    rng: &mut StdRng,
) -> Result<()> {
    for (pi, occ) in doc.occurrences.iter().enumerate() {
        let w = occ.word;
        let old_t = z_row[pi];

        ndk_row[old_t] -= 1;
        nkw[old_t][w] -= 1;
        nk[old_t] -= 1;

        for (t, weight) in weights.iter_mut().enumerate() {
            let left = (ndk_row[t] as f64) + priors.alpha;
            let right_num = (nkw[t][w] as f64) + priors.beta;
            let right_den = (nk[t] as f64) + priors.vb;
            *weight = left * (right_num / right_den);
        }

        let new_t = WeightedIndex::new(&*weights)
            .map_err(|e| TopicModelError::invalid(format!("degenerate topic weights: {e}")))?
            .sample(rng);

        z_row[pi] = new_t;
        ndk_row[new_t] += 1;
        nkw[new_t][w] += 1;
        nk[new_t] += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn two_theme_corpus() -> Corpus {
        let mut docs = Vec::new();
        for _ in 0..6 {
            docs.push(vec![0, 1, 2, 0, 1, 2]);
            docs.push(vec![3, 4, 5, 3, 4, 5]);
        }
        docs.push(vec![]);
        Corpus::from_word_ids(6, docs)
    }

    #[test]
    fn test_initial_counts_consistent() {
        let corpus = two_theme_corpus();
        let mut rng = StdRng::seed_from_u64(1);
        let sampler = GibbsSampler::new(&corpus, 3, 0.1, 0.01, &mut rng).expect("sampler");
        assert!(sampler.counts().is_consistent(&corpus, Some(sampler.assignments())));
        assert_eq!(sampler.assignments()[12].len(), 0);
    }

    #[test]
    fn test_zero_topics_rejected() {
        let corpus = two_theme_corpus();
        let mut rng = StdRng::seed_from_u64(1);
        let err = GibbsSampler::new(&corpus, 0, 0.1, 0.01, &mut rng).unwrap_err();
        assert!(matches!(err, TopicModelError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_empty_vocabulary_rejected() {
        let corpus = Corpus::from_word_ids(0, vec![vec![]]);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(GibbsSampler::new(&corpus, 2, 0.1, 0.01, &mut rng).is_err());
    }

    #[test]
    fn test_overflowing_priors_rejected() {
        let corpus = two_theme_corpus();
        let mut rng = StdRng::seed_from_u64(1);
        let err = GibbsSampler::new(&corpus, 2, 0.1, 1e308, &mut rng).unwrap_err();
        assert!(matches!(err, TopicModelError::InvalidConfiguration(_)));
        let err = GibbsSampler::new(&corpus, 2, f64::MAX, 0.01, &mut rng).unwrap_err();
        assert!(matches!(err, TopicModelError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_same_seed_same_assignments() {
        let corpus = two_theme_corpus();
        let run = || {
            let mut rng = StdRng::seed_from_u64(99);
            let mut sampler = GibbsSampler::new(&corpus, 2, 0.1, 0.01, &mut rng).expect("sampler");
            for _ in 0..20 {
                sampler.sweep(&mut rng).expect("sweep");
            }
            sampler.assignments().to_vec()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_run_accumulates_only_sampling_sweeps() {
        let corpus = two_theme_corpus();
        let mut rng = StdRng::seed_from_u64(5);
        let mut sampler = GibbsSampler::new(&corpus, 2, 0.1, 0.01, &mut rng).expect("sampler");
        let avg = sampler
            .run(10, 5, SamplingMode::Sequential, &mut rng, &AtomicBool::new(false))
            .expect("run");
        let total: f64 = avg.nk.iter().sum();
        assert!((total - corpus.token_count() as f64).abs() < 1e-9);
        for (d, doc) in corpus.documents().iter().enumerate() {
            let row: f64 = avg.ndk[d].iter().sum();
            assert!((row - doc.len() as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn test_cancel_before_first_sweep() {
        let corpus = two_theme_corpus();
        let mut rng = StdRng::seed_from_u64(5);
        let mut sampler = GibbsSampler::new(&corpus, 2, 0.1, 0.01, &mut rng).expect("sampler");
        let err = sampler
            .run(10, 5, SamplingMode::Sequential, &mut rng, &AtomicBool::new(true))
            .unwrap_err();
        assert!(matches!(err, TopicModelError::Cancelled { sweep: 0 }));
    }

    #[test]
    fn test_parallel_sweep_is_reproducible() {
        let corpus = two_theme_corpus();
        let run = || {
            let mut rng = StdRng::seed_from_u64(3);
            let mut sampler = GibbsSampler::new(&corpus, 2, 0.1, 0.01, &mut rng).expect("sampler");
            for _ in 0..10 {
                sampler.sweep_parallel(3, &mut rng).expect("sweep");
            }
            sampler.counts().clone()
        };
        assert_eq!(run(), run());
    }

    fn corpus_strategy() -> impl Strategy<Value = (usize, Vec<Vec<usize>>)> {
        (1usize..8).prop_flat_map(|v| {
            (
                Just(v),
                prop::collection::vec(prop::collection::vec(0..v, 0..10), 1..8),
            )
        })
    }

    proptest! {
        #[test]
        fn prop_counts_consistent_after_every_sweep(
            (v, docs) in corpus_strategy(),
            k in 1usize..5,
            seed in any::<u64>(),
        ) {
            let corpus = Corpus::from_word_ids(v, docs);
            let mut rng = StdRng::seed_from_u64(seed);
            let mut sampler = GibbsSampler::new(&corpus, k, 0.5, 0.1, &mut rng).unwrap();
            for _ in 0..5 {
                sampler.sweep(&mut rng).unwrap();
                prop_assert!(sampler.counts().is_consistent(&corpus, Some(sampler.assignments())));
                prop_assert!(sampler.assignments().iter().flatten().all(|&t| t < k));
            }
        }

        #[test]
        fn prop_parallel_counts_consistent_after_every_sweep(
            (v, docs) in corpus_strategy(),
            k in 1usize..5,
            partitions in 1usize..4,
            seed in any::<u64>(),
        ) {
            let corpus = Corpus::from_word_ids(v, docs);
            let mut rng = StdRng::seed_from_u64(seed);
            let mut sampler = GibbsSampler::new(&corpus, k, 0.5, 0.1, &mut rng).unwrap();
            for _ in 0..3 {
                sampler.sweep_parallel(partitions, &mut rng).unwrap();
                prop_assert!(sampler.counts().is_consistent(&corpus, Some(sampler.assignments())));
            }
        }
    }
}
