//! Count tables derived from the topic assignment state.

use crate::corpus::Corpus;
use crate::vocabulary::WordId;

/// Sufficient statistics of a collapsed Gibbs sampler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountTables {
    pub(crate) ndk: Vec<Vec<usize>>, // [doc][topic]
    pub(crate) nkw: Vec<Vec<usize>>, // [topic][word]
    pub(crate) nk: Vec<usize>,       // [topic]
}

impl CountTables {
    pub fn zeros(k: usize, v: usize, d: usize) -> Self {
        Self {
            ndk: vec![vec![0; k]; d],
            nkw: vec![vec![0; v]; k],
            nk: vec![0; k],
        }
    }

    #[inline]
    pub(crate) fn add(&mut self, d: usize, w: WordId, t: usize) {
        self.ndk[d][t] += 1;
        self.nkw[t][w] += 1;
        self.nk[t] += 1;
    }

    /// Occurrences of `w` currently labeled `t`.
    pub fn word_topic(&self, w: WordId, t: usize) -> usize {
        self.nkw[t][w]
    }

    /// Occurrences in document `d` currently labeled `t`.
    pub fn doc_topic(&self, d: usize, t: usize) -> usize {
        self.ndk[d][t]
    }

    /// Total occurrences labeled `t`.
    pub fn topic_total(&self, t: usize) -> usize {
        self.nk[t]
    }

    /// Verify the marginal identities against the corpus and, when given,
    /// recompute the tables from the assignment state `z` and compare.
    pub fn is_consistent(&self, corpus: &Corpus, z: Option<&[Vec<usize>]>) -> bool {
        let k = self.nk.len();
        let v = corpus.vocab_size();

        let mut word_occurrences = vec![0usize; v];
        for (di, doc) in corpus.documents().iter().enumerate() {
            if self.ndk[di].iter().sum::<usize>() != doc.len() {
                return false;
            }
            for occ in &doc.occurrences {
                word_occurrences[occ.word] += 1;
            }
        }
        for (w, &total) in word_occurrences.iter().enumerate() {
            if (0..k).map(|t| self.nkw[t][w]).sum::<usize>() != total {
                return false;
            }
        }
        for t in 0..k {
            let by_word: usize = self.nkw[t].iter().sum();
            let by_doc: usize = self.ndk.iter().map(|row| row[t]).sum();
            if by_word != self.nk[t] || by_doc != self.nk[t] {
                return false;
            }
        }

        match z {
            Some(z) => {
                let mut rebuilt = CountTables::zeros(k, v, corpus.len());
                for (di, doc) in corpus.documents().iter().enumerate() {
                    for (pi, occ) in doc.occurrences.iter().enumerate() {
                        rebuilt.add(di, occ.word, z[di][pi]);
                    }
                }
                rebuilt == *self
            }
            None => true,
        }
    }
}

/// Running sums of count tables over the retained sampling sweeps.
#[derive(Debug, Clone)]
pub struct CountSums {
    sweeps: usize,
    ndk: Vec<Vec<f64>>,
    nkw: Vec<Vec<f64>>,
    nk: Vec<f64>,
}

/// Count tables averaged over the retained sampling sweeps.
#[derive(Debug, Clone)]
pub struct AveragedCounts {
    pub ndk: Vec<Vec<f64>>,
    pub nkw: Vec<Vec<f64>>,
    pub nk: Vec<f64>,
}

impl CountSums {
    pub fn zeros(k: usize, v: usize, d: usize) -> Self {
        Self {
            sweeps: 0,
            ndk: vec![vec![0.0; k]; d],
            nkw: vec![vec![0.0; v]; k],
            nk: vec![0.0; k],
        }
    }

    pub fn accumulate(&mut self, counts: &CountTables) {
        for (acc, row) in self.ndk.iter_mut().zip(&counts.ndk) {
            for (a, &c) in acc.iter_mut().zip(row) {
                *a += c as f64;
            }
        }
        for (acc, row) in self.nkw.iter_mut().zip(&counts.nkw) {
            for (a, &c) in acc.iter_mut().zip(row) {
                *a += c as f64;
            }
        }
        for (a, &c) in self.nk.iter_mut().zip(&counts.nk) {
            *a += c as f64;
        }
        self.sweeps += 1;
    }

    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    /// Divide the sums by the number of accumulated sweeps.
    pub fn average(self) -> AveragedCounts {
        let n = self.sweeps.max(1) as f64;
        let scale = |rows: Vec<Vec<f64>>| -> Vec<Vec<f64>> {
            rows.into_iter()
                .map(|row| row.into_iter().map(|x| x / n).collect())
                .collect()
        };
        AveragedCounts {
            ndk: scale(self.ndk),
            nkw: scale(self.nkw),
            nk: self.nk.into_iter().map(|x| x / n).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_updates_all_tables() {
        let mut counts = CountTables::zeros(2, 3, 1);
        counts.add(0, 2, 1);
        counts.add(0, 2, 1);
        assert_eq!(counts.word_topic(2, 1), 2);
        assert_eq!(counts.doc_topic(0, 1), 2);
        assert_eq!(counts.topic_total(1), 2);
        assert_eq!(counts.topic_total(0), 0);
    }

    #[test]
    fn test_consistency_detects_drift() {
        let corpus = Corpus::from_word_ids(2, vec![vec![0, 1], vec![1]]);
        let z = vec![vec![0, 1], vec![1]];
        let mut counts = CountTables::zeros(2, 2, 2);
        counts.add(0, 0, 0);
        counts.add(0, 1, 1);
        counts.add(1, 1, 1);
        assert!(counts.is_consistent(&corpus, Some(z.as_slice())));

        counts.nk[0] += 1;
        assert!(!counts.is_consistent(&corpus, None));
    }

    #[test]
    fn test_average_of_sums() {
        let mut counts = CountTables::zeros(2, 1, 1);
        let mut sums = CountSums::zeros(2, 1, 1);
        counts.add(0, 0, 0);
        sums.accumulate(&counts);
        let mut moved = CountTables::zeros(2, 1, 1);
        moved.add(0, 0, 1);
        sums.accumulate(&moved);
        assert_eq!(sums.sweeps(), 2);

        let avg = sums.average();
        assert_eq!(avg.nk, vec![0.5, 0.5]);
        assert_eq!(avg.ndk[0], vec![0.5, 0.5]);
        assert_eq!(avg.nkw[1], vec![0.5]);
    }
}
