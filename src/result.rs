//! Result extraction: ranked topic words and dominant topics.

use std::cmp::Ordering;
use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::vocabulary::WordId;

/// Word ids of `row` sorted by weight descending, ties by ascending id,
/// truncated to `n`.
pub fn rank_words(row: &[f64], n: usize) -> Vec<WordId> {
    let mut ids: Vec<WordId> = (0..row.len()).collect();
    ids.sort_by(|&a, &b| row[b].total_cmp(&row[a]).then(a.cmp(&b)));
    ids.truncate(n);
    ids
}

/// `argmax` of a document's topic distribution, lowest index on ties.
pub fn dominant_topic(theta_row: &[f64], degenerate: bool) -> DominantTopic {
    if degenerate {
        return DominantTopic::Unassigned;
    }
    theta_row
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (t, &p)| match best {
            Some((_, bp)) if p.total_cmp(&bp) != Ordering::Greater => best,
            _ => Some((t, p)),
        })
        .map_or(DominantTopic::Unassigned, |(t, _)| DominantTopic::Topic(t))
}

/// Dominant topic of a document.
///
/// Serialized as the topic index, or the string `"unassigned"` for documents
/// without any in-vocabulary token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DominantTopic {
    Topic(usize),
    Unassigned,
}

impl DominantTopic {
    pub fn index(self) -> Option<usize> {
        match self {
            Self::Topic(t) => Some(t),
            Self::Unassigned => None,
        }
    }
}

impl fmt::Display for DominantTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topic(t) => write!(f, "{t}"),
            Self::Unassigned => f.write_str(UNASSIGNED),
        }
    }
}

const UNASSIGNED: &str = "unassigned";

impl Serialize for DominantTopic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Topic(t) => serializer.serialize_u64(*t as u64),
            Self::Unassigned => serializer.serialize_str(UNASSIGNED),
        }
    }
}

impl<'de> Deserialize<'de> for DominantTopic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DominantTopicVisitor;

        impl<'de> Visitor<'de> for DominantTopicVisitor {
            type Value = DominantTopic;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a topic index or \"unassigned\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                usize::try_from(v)
                    .map(DominantTopic::Topic)
                    .map_err(|_| E::custom("topic index out of range"))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                usize::try_from(v)
                    .map(DominantTopic::Topic)
                    .map_err(|_| E::custom("topic index must be non-negative"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                if v == UNASSIGNED {
                    Ok(DominantTopic::Unassigned)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }
        }

        deserializer.deserialize_any(DominantTopicVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedWord {
    /// 1-based rank within the topic.
    pub rank: usize,
    pub word: String,
    /// φ weight of the word in the topic.
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub topic_index: usize,
    pub top_words: Vec<RankedWord>,
}

impl Topic {
    /// Top words without ranks or weights.
    pub fn words(&self) -> Vec<&str> {
        self.top_words.iter().map(|w| w.word.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAssignment {
    pub document_id: String,
    pub dominant_topic: DominantTopic,
}

/// A document that lost every token to filtering. Recorded, not fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegenerateDocument {
    /// Position of the document in the input.
    pub index: usize,
    pub document_id: String,
}

/// Everything the result sink consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicModelResult {
    pub topics: Vec<Topic>,
    pub document_assignments: Vec<DocumentAssignment>,
    #[serde(default)]
    pub warnings: Vec<DegenerateDocument>,
}

impl TopicModelResult {
    /// Indices of the documents assigned to `topic`, in input order.
    pub fn documents_in_topic(&self, topic: usize) -> Vec<usize> {
        self.document_assignments
            .iter()
            .enumerate()
            .filter(|(_, a)| a.dominant_topic == DominantTopic::Topic(topic))
            .map(|(i, _)| i)
            .collect()
    }
}
