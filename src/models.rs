//! The inverted-index data model: postings, entries, importance tiers, and
//! the in-memory index itself.
//!
//! The in-memory index is backed by a hash map for O(1) insertion during a
//! build; it is only finalized to a token-ordered vector when it is handed to
//! the writer (see [`crate::index_io::write_partial_index`]). This avoids the
//! per-insert binary-insertion cost of keeping a sorted vector live across an
//! entire batch.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Totally ordered importance tier a token can carry within one document.
/// Higher is more important; merges always take the maximum.
///
/// `Serialize`/`Deserialize` are hand-implemented in `importance_codec`
/// below (plain integer 0/1/2 on the wire, matching the on-disk format),
/// rather than pulling in `serde_repr` for a single three-variant enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Importance {
    Normal = 0,
    BoldOrHeading = 1,
    Title = 2,
}

impl Default for Importance {
    fn default() -> Self {
        Importance::Normal
    }
}

/// One token's occurrence in a single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: u32,
    pub tf: u32,
    pub importance: Importance,
}

impl Posting {
    pub fn new(doc_id: u32, tf: u32, importance: Importance) -> Self {
        Posting {
            doc_id,
            tf,
            importance,
        }
    }
}

/// Inverted-index entry: one stemmed token and its posting list, ordered by
/// `doc_id` with no duplicates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexEntry {
    pub token: String,
    pub postings: Vec<Posting>,
    #[serde(default)]
    pub df: usize,
}

impl IndexEntry {
    pub fn new(token: impl Into<String>) -> Self {
        IndexEntry {
            token: token.into(),
            postings: Vec::new(),
            df: 0,
        }
    }

    /// Add `tf_delta` to the posting for `doc_id`, creating it if absent, and
    /// raise its importance to the max of current and `importance`. Postings
    /// during a single build are appended at the tail and stay sorted because
    /// doc-ids are assigned monotonically within one run; this still uses a
    /// binary search so merge paths (which see postings out of doc-id order
    /// across batches) stay correct too.
    pub fn add_or_update_posting(&mut self, doc_id: u32, tf_delta: u32, importance: Importance) {
        match self.postings.binary_search_by_key(&doc_id, |p| p.doc_id) {
            Ok(idx) => {
                let p = &mut self.postings[idx];
                p.tf += tf_delta;
                if importance > p.importance {
                    p.importance = importance;
                }
            }
            Err(idx) => {
                self.postings
                    .insert(idx, Posting::new(doc_id, tf_delta, importance));
            }
        }
        self.df = self.postings.len();
    }

    /// Merge another entry's postings into this one.
    pub fn merge(&mut self, other: &IndexEntry) {
        for p in &other.postings {
            self.add_or_update_posting(p.doc_id, p.tf, p.importance);
        }
    }

    /// Recompute `df` from the current posting list. Called by the merger
    /// right before an entry is finalized onto disk.
    pub fn recompute_df(&mut self) {
        self.df = self.postings.len();
    }
}

/// In-memory inverted index built during one batch of the construction
/// pipeline. `token_to_entry` is the only storage; token order is imposed
/// only when the index is finalized for writing.
#[derive(Debug, Default)]
pub struct Index {
    token_to_entry: AHashMap<String, IndexEntry>,
}

impl Index {
    pub fn new() -> Self {
        Index::default()
    }

    pub fn len(&self) -> usize {
        self.token_to_entry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token_to_entry.is_empty()
    }

    /// Add one occurrence set for `token` in `doc_id`. Silently rejects
    /// `tf <= 0` -- the tokenizer never produces such a call, but the
    /// invariant is enforced here too since `Index` is a reusable library
    /// type, not something only the builder touches.
    pub fn add_token(&mut self, token: &str, doc_id: u32, tf: u32, importance: Importance) {
        if tf == 0 {
            tracing::trace!(token, doc_id, "ignoring non-positive tf");
            return;
        }
        self.token_to_entry
            .entry(token.to_string())
            .or_insert_with(|| IndexEntry::new(token))
            .add_or_update_posting(doc_id, tf, importance);
    }

    pub fn get_entry(&self, token: &str) -> Option<&IndexEntry> {
        self.token_to_entry.get(token)
    }

    /// Merge another index's entries into this one.
    pub fn merge(&mut self, other: Index) {
        for (token, entry) in other.token_to_entry {
            match self.token_to_entry.get_mut(&token) {
                Some(existing) => existing.merge(&entry),
                None => {
                    self.token_to_entry.insert(token, entry);
                }
            }
        }
    }

    /// Consume the index, returning its entries sorted token-ascending. This
    /// is the only point where token ordering is materialized.
    pub fn into_sorted_entries(self) -> Vec<IndexEntry> {
        let mut entries: Vec<IndexEntry> = self.token_to_entry.into_values().collect();
        entries.sort_by(|a, b| a.token.cmp(&b.token));
        entries
    }
}

// serde_repr isn't pulled in as a dependency (the rest of the on-disk format
// already uses plain numeric fields); Importance is encoded/decoded by hand
// instead of deriving Serialize/Deserialize via serde_repr.
mod importance_codec {
    use super::Importance;
    use serde::de::{self, Deserializer, Visitor};
    use serde::ser::Serializer;
    use std::fmt;

    impl serde::Serialize for Importance {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_u8(*self as u8)
        }
    }

    struct ImportanceVisitor;
    impl<'de> Visitor<'de> for ImportanceVisitor {
        type Value = Importance;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an integer 0, 1, or 2")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Importance, E> {
            match v {
                0 => Ok(Importance::Normal),
                1 => Ok(Importance::BoldOrHeading),
                2 => Ok(Importance::Title),
                other => Err(de::Error::custom(format!(
                    "importance out of range: {other}"
                ))),
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for Importance {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Importance, D::Error> {
            deserializer.deserialize_u64(ImportanceVisitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn importance_order() {
        assert!(Importance::Title > Importance::BoldOrHeading);
        assert!(Importance::BoldOrHeading > Importance::Normal);
    }

    #[test]
    fn add_token_rejects_non_positive_tf() {
        let mut idx = Index::new();
        idx.add_token("hello", 0, 0, Importance::Normal);
        assert!(idx.get_entry("hello").is_none());
    }

    #[test]
    fn add_token_accumulates_tf_and_raises_importance() {
        let mut idx = Index::new();
        idx.add_token("foo", 0, 2, Importance::Normal);
        idx.add_token("foo", 0, 3, Importance::Title);
        let entry = idx.get_entry("foo").unwrap();
        assert_eq!(entry.postings.len(), 1);
        assert_eq!(entry.postings[0].tf, 5);
        assert_eq!(entry.postings[0].importance, Importance::Title);
    }

    #[test]
    fn postings_stay_doc_id_ordered_and_unique() {
        let mut idx = Index::new();
        idx.add_token("foo", 5, 1, Importance::Normal);
        idx.add_token("foo", 1, 1, Importance::Normal);
        idx.add_token("foo", 3, 1, Importance::Normal);
        idx.add_token("foo", 3, 1, Importance::Normal);
        let entry = idx.get_entry("foo").unwrap();
        let ids: Vec<u32> = entry.postings.iter().map(|p| p.doc_id).collect();
        assert_eq!(ids, vec![1, 3, 5]);
        assert_eq!(entry.df, 3);
    }

    #[test]
    fn merge_is_commutative_on_tf_and_importance() {
        let mut a = Index::new();
        a.add_token("x", 0, 2, Importance::Normal);
        let mut b = Index::new();
        b.add_token("x", 0, 3, Importance::Title);

        let mut a_then_b = Index::new();
        a_then_b.add_token("x", 0, 2, Importance::Normal);
        a_then_b.merge(b);

        let mut b_then_a = Index::new();
        b_then_a.add_token("x", 0, 3, Importance::Title);
        b_then_a.merge(a);

        let e1 = a_then_b.get_entry("x").unwrap();
        let e2 = b_then_a.get_entry("x").unwrap();
        assert_eq!(e1.postings[0].tf, e2.postings[0].tf);
        assert_eq!(e1.postings[0].importance, e2.postings[0].importance);
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let mut a = Index::new();
        a.add_token("x", 0, 2, Importance::Normal);
        a.add_token("y", 1, 4, Importance::BoldOrHeading);
        a.merge(Index::new());
        let mut entries = a.into_sorted_entries();
        entries.sort_by(|p, q| p.token.cmp(&q.token));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].token, "x");
        assert_eq!(entries[1].token, "y");
    }

    #[test]
    fn into_sorted_entries_is_token_ascending() {
        let mut idx = Index::new();
        idx.add_token("zebra", 0, 1, Importance::Normal);
        idx.add_token("apple", 0, 1, Importance::Normal);
        idx.add_token("mango", 0, 1, Importance::Normal);
        let entries = idx.into_sorted_entries();
        let tokens: Vec<&str> = entries.iter().map(|e| e.token.as_str()).collect();
        assert_eq!(tokens, vec!["apple", "mango", "zebra"]);
    }
}
