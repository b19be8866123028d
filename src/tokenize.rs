//! Text normalization: lowercasing, punctuation stripping and stop words.

use std::collections::HashSet;
use std::sync::OnceLock;

/// English stop words plus a few tokens that dominate tweet bodies
/// (retweet markers, URL schemes, HTML entities).
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all",
    "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
    "amongst", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "been", "before", "behind", "being", "below", "beside", "besides", "between",
    "beyond", "both", "but", "by", "can", "cannot", "could", "did", "do", "does", "doing",
    "done", "down", "during", "each", "either", "else", "enough", "even", "ever", "every",
    "everyone", "everything", "everywhere", "few", "for", "from", "further", "get", "got",
    "had", "has", "have", "having", "he", "hence", "her", "here", "hers", "herself", "him",
    "himself", "his", "how", "however", "i", "if", "in", "into", "is", "it", "its", "itself",
    "just", "least", "less", "made", "many", "may", "me", "might", "more", "moreover", "most",
    "mostly", "much", "must", "my", "myself", "neither", "never", "nevertheless", "no",
    "nobody", "none", "nor", "not", "nothing", "now", "of", "off", "often", "on", "once",
    "one", "only", "onto", "or", "other", "others", "otherwise", "our", "ours", "ourselves",
    "out", "over", "own", "per", "perhaps", "please", "rather", "same", "several", "she",
    "should", "since", "so", "some", "somehow", "someone", "something", "sometimes",
    "somewhere", "still", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "therefore", "these", "they", "this", "those", "though",
    "through", "throughout", "thus", "to", "together", "too", "toward", "towards", "under",
    "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were", "what",
    "whatever", "when", "whenever", "where", "whether", "which", "while", "who", "whoever",
    "whole", "whom", "whose", "why", "will", "with", "within", "without", "would", "yet",
    "you", "your", "yours", "yourself", "yourselves",
    // tweet noise
    "rt", "amp", "http", "https", "www", "com", "co", "ftp",
];

fn stop_words() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

/// Check whether `word` (already lowercased) is a stop word.
pub fn is_stop_word(word: &str) -> bool {
    stop_words().contains(word)
}

/// Split `text` into normalized tokens, in document order.
///
/// Text is lowercased, every character that is neither alphabetic nor
/// numeric becomes a separator, and tokens shorter than two characters,
/// pure numbers and stop words are dropped.
///
/// ```rust
/// use topicsift::tokenize::tokenize;
///
/// let tokens = tokenize("RT @cdcgov: Vaccines save lives!! https://t.co/x");
/// assert_eq!(tokens, vec!["cdcgov", "vaccines", "save", "lives"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .filter(|tok| tok.chars().count() >= 2)
        .filter(|tok| !tok.chars().all(|c| c.is_numeric()))
        .filter(|tok| !is_stop_word(tok))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_strips_punctuation() {
        assert_eq!(tokenize("Health, CLINIC... vaccine!"), vec!["health", "clinic", "vaccine"]);
    }

    #[test]
    fn test_punctuation_only_input() {
        assert!(tokenize("!!! ... ?? -- ,,").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_drops_stop_words_and_short_tokens() {
        assert_eq!(tokenize("the vote is a right of x"), vec!["vote", "right"]);
    }

    #[test]
    fn test_drops_numbers_keeps_alphanumeric() {
        assert_eq!(tokenize("2020 covid19 42"), vec!["covid19"]);
    }

    #[test]
    fn test_non_ascii_letters_survive() {
        assert_eq!(tokenize("Élection Über"), vec!["élection", "über"]);
    }

    #[test]
    fn test_stop_word_lookup() {
        assert!(is_stop_word("the"));
        assert!(is_stop_word("rt"));
        assert!(!is_stop_word("vaccine"));
    }
}
