//! Tokenization: split text into alphanumeric-ASCII words, lowercase, and
//! stem. The stemmer itself is an external collaborator (`rust-stemmers`,
//! Porter's algorithm) -- this module's job is the span-splitting and
//! filtering contract around it.

use ahash::AHashMap;
use rust_stemmers::{Algorithm, Stemmer};
use std::sync::OnceLock;

/// Returns the process-wide Porter stemmer instance.
fn stemmer() -> &'static Stemmer {
    static STEMMER: OnceLock<Stemmer> = OnceLock::new();
    STEMMER.get_or_init(|| Stemmer::create(Algorithm::English))
}

/// Result of tokenizing one piece of text: stemmed-token -> occurrence
/// count, and stemmed-token -> sorted list of character offsets of each
/// occurrence in the original input.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenCounts {
    pub counts: AHashMap<String, u32>,
    pub starts: AHashMap<String, Vec<usize>>,
}

impl TokenCounts {
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Splits `text` into alphanumeric runs (word/punctuation-boundary
/// tokenization: a run of non-alphanumeric characters always separates
/// words), rejecting any run containing a non-ASCII codepoint, lowercasing
/// and stemming what remains.
///
/// Deterministic: identical input always yields identical output.
pub fn tokenize(text: &str) -> TokenCounts {
    let mut result = TokenCounts::default();
    if text.is_empty() {
        return result;
    }

    let stemmer = stemmer();
    let mut char_indices = text.char_indices().peekable();

    while let Some(&(start, ch)) = char_indices.peek() {
        if !ch.is_alphanumeric() {
            char_indices.next();
            continue;
        }

        let mut end = start + ch.len_utf8();
        let mut ascii_only = ch.is_ascii();
        char_indices.next();

        while let Some(&(idx, c)) = char_indices.peek() {
            if !c.is_alphanumeric() {
                break;
            }
            ascii_only &= c.is_ascii();
            end = idx + c.len_utf8();
            char_indices.next();
        }

        if !ascii_only {
            continue;
        }

        let raw = &text[start..end];
        let lowered = raw.to_ascii_lowercase();
        let stemmed = stemmer.stem(&lowered).into_owned();

        *result.counts.entry(stemmed.clone()).or_insert(0) += 1;
        result.starts.entry(stemmed).or_default().push(start);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_empty_maps() {
        let r = tokenize("");
        assert!(r.counts.is_empty());
        assert!(r.starts.is_empty());
    }

    #[test]
    fn counts_repeated_words() {
        let r = tokenize("Hello hello HELLO");
        assert_eq!(r.counts.get("hello"), Some(&3));
    }

    #[test]
    fn rejects_non_ascii_spans() {
        let r = tokenize("café naïve plain");
        assert!(!r.counts.contains_key("café"));
        assert!(r.counts.contains_key("plain"));
        // "caf" and "na" never appear -- the whole run containing a non-ASCII
        // codepoint is rejected, not just the offending character.
        assert!(!r.counts.contains_key("caf"));
    }

    #[test]
    fn splits_on_punctuation() {
        let r = tokenize("hello, world! hello-world");
        assert_eq!(r.counts.get("hello"), Some(&2));
        assert_eq!(r.counts.get("world"), Some(&2));
    }

    #[test]
    fn records_sorted_offsets() {
        let r = tokenize("run runs running run");
        let starts = r.starts.get("run").unwrap();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, &sorted);
    }

    #[test]
    fn is_deterministic() {
        let text = "The Quick Brown Fox jumps over the lazy dog's fence.";
        let a = tokenize(text);
        let b = tokenize(text);
        assert_eq!(a, b);
    }

    #[test]
    fn stems_related_forms_together() {
        let r = tokenize("running runs run");
        // Porter stemming collapses these to a shared stem ("run").
        assert_eq!(r.counts.len(), 1);
        assert_eq!(r.counts.get("run"), Some(&3));
    }
}
