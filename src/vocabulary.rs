//! Vocabulary construction with document-frequency filtering.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{Result, TopicModelError};

/// Dense vocabulary index in `0..V`.
pub type WordId = usize;

/// Bidirectional token <-> id mapping.
///
/// Ids are assigned in lexical (byte) order of the retained tokens, so the
/// same corpus and thresholds always give the same ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    words: Vec<String>,
    word_to_id: HashMap<String, WordId>,
    doc_freq: Vec<usize>,
}

impl Vocabulary {
    /// Build a vocabulary from already tokenized documents.
    ///
    /// A token is kept when it occurs in at least `min_doc_freq` documents
    /// and in at most `max_doc_freq * documents.len()` documents.
    ///
    /// ```rust
    /// use topicsift::Vocabulary;
    ///
    /// let docs = vec![
    ///     vec!["vote".to_string(), "policy".to_string()],
    ///     vec!["vote".to_string(), "clinic".to_string()],
    ///     vec!["health".to_string()],
    /// ];
    /// let vocab = Vocabulary::build(&docs, 2, 1.0).unwrap();
    /// assert_eq!(vocab.len(), 1);
    /// assert_eq!(vocab.id("vote"), Some(0));
    /// ```
    pub fn build(documents: &[Vec<String>], min_doc_freq: usize, max_doc_freq: f64) -> Result<Self> {
        let mut df: BTreeMap<&str, usize> = BTreeMap::new();
        for doc in documents {
            let distinct: HashSet<&str> = doc.iter().map(String::as_str).collect();
            for tok in distinct {
                *df.entry(tok).or_insert(0) += 1;
            }
        }

        let max_count = max_doc_freq * documents.len() as f64;
        let mut words = Vec::new();
        let mut doc_freq = Vec::new();
        for (tok, count) in df {
            if count >= min_doc_freq && (count as f64) <= max_count {
                words.push(tok.to_string());
                doc_freq.push(count);
            }
        }

        if words.is_empty() {
            return Err(TopicModelError::EmptyVocabulary {
                documents: documents.len(),
                min_doc_freq,
                max_doc_freq,
            });
        }

        let word_to_id = words
            .iter()
            .enumerate()
            .map(|(id, w)| (w.clone(), id))
            .collect();

        Ok(Self {
            words,
            word_to_id,
            doc_freq,
        })
    }

    /// Id of `word`, if it survived filtering.
    pub fn id(&self, word: &str) -> Option<WordId> {
        self.word_to_id.get(word).copied()
    }

    /// Token string for `id`.
    pub fn word(&self, id: WordId) -> Option<&str> {
        self.words.get(id).map(String::as_str)
    }

    /// Number of documents containing the token `id`.
    pub fn doc_frequency(&self, id: WordId) -> Option<usize> {
        self.doc_freq.get(id).copied()
    }

    /// Tokens in id order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|d| d.iter().map(|w| w.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_ids_are_lexical_and_contiguous() {
        let corpus = docs(&[&["zebra", "apple", "mango"], &["mango", "zebra", "apple"]]);
        let vocab = Vocabulary::build(&corpus, 1, 1.0).expect("vocab should build");
        assert_eq!(vocab.words(), &["apple", "mango", "zebra"]);
        for (id, w) in vocab.words().iter().enumerate() {
            assert_eq!(vocab.id(w), Some(id));
            assert_eq!(vocab.word(id), Some(w.as_str()));
        }
    }

    #[test]
    fn test_doc_frequency_counts_documents_not_occurrences() {
        let corpus = docs(&[&["vote", "vote", "vote"], &["policy"], &["vote"]]);
        let vocab = Vocabulary::build(&corpus, 2, 1.0).expect("vocab should build");
        assert_eq!(vocab.len(), 1);
        assert_eq!(vocab.doc_frequency(0), Some(2));
    }

    #[test]
    fn test_max_doc_freq_drops_ubiquitous_tokens() {
        let corpus = docs(&[
            &["covid", "vaccine"],
            &["covid", "vaccine"],
            &["covid", "vote"],
            &["covid", "vote"],
        ]);
        let vocab = Vocabulary::build(&corpus, 2, 0.9).expect("vocab should build");
        assert_eq!(vocab.id("covid"), None);
        assert_eq!(vocab.words(), &["vaccine", "vote"]);
    }

    #[test]
    fn test_min_doc_freq_above_every_token_is_empty() {
        let corpus = docs(&[&["vote", "policy"], &["vote"]]);
        let err = Vocabulary::build(&corpus, 3, 1.0).unwrap_err();
        assert!(matches!(err, TopicModelError::EmptyVocabulary { documents: 2, .. }));
    }

    #[test]
    fn test_all_empty_documents_is_empty_vocabulary() {
        let corpus = docs(&[&[], &[]]);
        assert!(matches!(
            Vocabulary::build(&corpus, 1, 1.0),
            Err(TopicModelError::EmptyVocabulary { .. })
        ));
    }

    #[test]
    fn test_rebuild_is_identical() {
        let corpus = docs(&[&["b", "a", "c"], &["c", "a"], &["a", "d"]]);
        let first = Vocabulary::build(&corpus, 1, 1.0).expect("vocab should build");
        let second = Vocabulary::build(&corpus, 1, 1.0).expect("vocab should build");
        assert_eq!(first, second);
    }
}
