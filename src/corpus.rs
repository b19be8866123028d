//! Document encoding: raw text to vocabulary-id occurrences.

use serde::{Deserialize, Serialize};

use crate::tokenize::tokenize;
use crate::vocabulary::{Vocabulary, WordId};

/// A document as handed over by the corpus source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    pub id: String,
    pub text: String,
    /// Extra source columns as `(name, value)`, carried through to the sink.
    #[serde(default)]
    pub metadata: Vec<(String, String)>,
}

impl RawDocument {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((name.into(), value.into()));
        self
    }

    /// Value of the metadata column `name`, if present.
    pub fn metadata(&self, name: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// One in-vocabulary token of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub word: WordId,
    /// Index of the token in the document's normalized token stream,
    /// counted before out-of-vocabulary tokens were dropped.
    pub position: usize,
}

/// An encoded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub occurrences: Vec<Occurrence>,
}

impl Document {
    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    /// A document with no in-vocabulary token. It stays in the corpus but
    /// gets a uniform topic distribution and no dominant topic.
    pub fn is_degenerate(&self) -> bool {
        self.occurrences.is_empty()
    }
}

/// Ordered documents sharing one vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    documents: Vec<Document>,
    vocab_size: usize,
}

impl Corpus {
    /// Tokenize and encode `documents` through `vocab`.
    pub fn encode(documents: &[RawDocument], vocab: &Vocabulary) -> Self {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(&d.text)).collect();
        Self::from_tokens(documents, &tokenized, vocab)
    }

    /// Encode documents whose tokens were already produced by [`tokenize`].
    pub(crate) fn from_tokens(
        documents: &[RawDocument],
        tokenized: &[Vec<String>],
        vocab: &Vocabulary,
    ) -> Self {
        let documents = documents
            .iter()
            .zip(tokenized)
            .map(|(raw, tokens)| Document {
                id: raw.id.clone(),
                occurrences: tokens
                    .iter()
                    .enumerate()
                    .filter_map(|(position, tok)| {
                        vocab.id(tok).map(|word| Occurrence { word, position })
                    })
                    .collect(),
            })
            .collect();

        Self {
            documents,
            vocab_size: vocab.len(),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_word_ids(vocab_size: usize, docs: Vec<Vec<WordId>>) -> Self {
        let documents = docs
            .into_iter()
            .enumerate()
            .map(|(di, words)| Document {
                id: di.to_string(),
                occurrences: words
                    .into_iter()
                    .enumerate()
                    .map(|(position, word)| Occurrence { word, position })
                    .collect(),
            })
            .collect();
        Self {
            documents,
            vocab_size,
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Total number of token occurrences.
    pub fn token_count(&self) -> usize {
        self.documents.iter().map(Document::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> (Vec<RawDocument>, Vocabulary) {
        let raw = vec![
            RawDocument::new("t1", "Vaccine clinic opens; the clinic is free"),
            RawDocument::new("t2", "Vote for the vaccine policy"),
            RawDocument::new("t3", "!!!"),
        ];
        let tokenized: Vec<Vec<String>> = raw.iter().map(|d| tokenize(&d.text)).collect();
        let vocab = Vocabulary::build(&tokenized, 1, 1.0).expect("vocab should build");
        (raw, vocab)
    }

    #[test]
    fn test_encode_keeps_order_and_positions() {
        let (raw, vocab) = corpus();
        let corpus = Corpus::encode(&raw, &vocab);
        assert_eq!(corpus.len(), 3);
        let first = &corpus.documents()[0];
        assert_eq!(first.id, "t1");
        let words: Vec<&str> = first
            .occurrences
            .iter()
            .map(|o| vocab.word(o.word).unwrap())
            .collect();
        assert_eq!(words, vec!["vaccine", "clinic", "opens", "clinic", "free"]);
        let positions: Vec<usize> = first.occurrences.iter().map(|o| o.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_out_of_vocabulary_tokens_dropped() {
        let raw = vec![
            RawDocument::new("a", "vote policy"),
            RawDocument::new("b", "vote budget"),
        ];
        let tokenized: Vec<Vec<String>> = raw.iter().map(|d| tokenize(&d.text)).collect();
        let vocab = Vocabulary::build(&tokenized, 2, 1.0).expect("vocab should build");
        let corpus = Corpus::encode(&raw, &vocab);
        let second = &corpus.documents()[1];
        assert_eq!(second.len(), 1);
        assert_eq!(second.occurrences[0].position, 0);
        assert_eq!(corpus.token_count(), 2);
    }

    #[test]
    fn test_degenerate_document_kept_in_place() {
        let (raw, vocab) = corpus();
        let corpus = Corpus::encode(&raw, &vocab);
        let last = &corpus.documents()[2];
        assert_eq!(last.id, "t3");
        assert!(last.is_degenerate());
        assert!(!corpus.documents()[0].is_degenerate());
    }
}
