//! Exact and near-duplicate detection: SHA-256 content hashing plus a
//! SimHash fingerprint compared via pigeonhole-banded Hamming lookup.

use crate::tokenizer::TokenCounts;
use ahash::AHashMap;
use sha2::{Digest, Sha256};

pub const HAMMING_K: u32 = 3;
pub const NUM_BITS: u32 = 64;
pub const NUM_BLOCKS: u32 = HAMMING_K + 1;
const BLOCK_SIZE: u32 = NUM_BITS / NUM_BLOCKS;

/// Outcome of [`DuplicateDetector::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DupVerdict {
    /// Exact duplicate of previously seen content.
    Exact,
    /// Near duplicate of a previously admitted document.
    Near,
    /// Not a duplicate; carries the fingerprint to register via `add_doc`
    /// once the caller has assigned a doc-id. `None` when no fingerprint
    /// could be computed (token counts were absent).
    New(Option<u64>),
}

/// SHA-256 of raw HTML content, used for exact-duplicate detection.
pub fn content_hash(html: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(html.as_bytes());
    hasher.finalize().into()
}

/// Computes a 64-bit SimHash fingerprint from a token->weight map. Bit `i`
/// of the fingerprint is 1 iff the signed sum of `+weight`/`-weight`
/// contributions (keyed on bit `i` of each term's MD5 hash) is positive.
pub fn compute_simhash(token_counts: &AHashMap<String, u32>) -> u64 {
    let mut v = [0i64; NUM_BITS as usize];

    for (term, &weight) in token_counts {
        if weight == 0 {
            continue;
        }
        let digest = md5::compute(term.as_bytes());
        let h = u64::from_be_bytes(digest.0[..8].try_into().unwrap());
        for i in 0..NUM_BITS {
            if (h >> i) & 1 == 1 {
                v[i as usize] += weight as i64;
            } else {
                v[i as usize] -= weight as i64;
            }
        }
    }

    let mut fingerprint: u64 = 0;
    for (i, &bit_sum) in v.iter().enumerate() {
        if bit_sum > 0 {
            fingerprint |= 1 << i;
        }
    }
    fingerprint
}

/// Population count of `a XOR b`, masked to the low `NUM_BITS` bits.
pub fn hamming_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

/// Splits a fingerprint into `NUM_BLOCKS` contiguous, equal-width blocks;
/// block 0 is the low bits. By the pigeonhole principle, two fingerprints
/// at Hamming distance <= `HAMMING_K` must share at least one block value,
/// since `HAMMING_K` bit flips cannot each land in a different block when
/// there are `HAMMING_K + 1` blocks.
pub fn block_values(fingerprint: u64) -> [u16; NUM_BLOCKS as usize] {
    let mut blocks = [0u16; NUM_BLOCKS as usize];
    let mask = (1u64 << BLOCK_SIZE) - 1;
    for (i, block) in blocks.iter_mut().enumerate() {
        let start_bit = i as u32 * BLOCK_SIZE;
        *block = ((fingerprint >> start_bit) & mask) as u16;
    }
    blocks
}

/// In-memory, best-effort exact- and near-duplicate detector. State is not
/// persisted: a crash before the final index is written loses it, which is
/// acceptable since a restarted build reprocesses the whole corpus.
#[derive(Debug)]
pub struct DuplicateDetector {
    seen_content_hashes: std::collections::HashSet<[u8; 32]>,
    // band[i]: block value -> (fingerprint, doc_id) admitted with that value.
    bands: [AHashMap<u16, Vec<(u64, u32)>>; NUM_BLOCKS as usize],
    hamming_threshold: u32,
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        DuplicateDetector::with_hamming_threshold(HAMMING_K)
    }
}

impl DuplicateDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a detector with a configurable Hamming threshold, used when
    /// `IndexBuilderConfig::hamming_k` overrides the compile-time default.
    /// The banding scheme itself (`NUM_BLOCKS` blocks) stays fixed -- it is
    /// sized for the default threshold of 3; overriding the threshold does
    /// not change pigeonhole coverage guarantees beyond that design point.
    pub fn with_hamming_threshold(hamming_threshold: u32) -> Self {
        DuplicateDetector {
            seen_content_hashes: std::collections::HashSet::new(),
            bands: Default::default(),
            hamming_threshold,
        }
    }

    /// Checks whether `html`/`token_counts` describe a duplicate. Exact
    /// check runs first; near-duplicate check only runs if both `html` and
    /// `token_counts` are present (the stricter reading of the reference
    /// implementation's two documented variants: absence of either input
    /// skips straight to "not a duplicate" with no fingerprint).
    pub fn check(&self, html: Option<&str>, token_counts: Option<&TokenCounts>) -> DupVerdict {
        let html = match html {
            Some(h) => h,
            None => return DupVerdict::New(None),
        };

        let hash = content_hash(html);
        if self.seen_content_hashes.contains(&hash) {
            return DupVerdict::Exact;
        }

        let token_counts = match token_counts {
            Some(tc) => tc,
            None => return DupVerdict::New(None),
        };

        let fingerprint = compute_simhash(&token_counts.counts);
        let blocks = block_values(fingerprint);
        for (i, &block_val) in blocks.iter().enumerate() {
            if let Some(candidates) = self.bands[i].get(&block_val) {
                for &(other_fp, _doc_id) in candidates {
                    if hamming_distance(fingerprint, other_fp) <= self.hamming_threshold {
                        return DupVerdict::Near;
                    }
                }
            }
        }

        DupVerdict::New(Some(fingerprint))
    }

    /// Registers a non-duplicate document's fingerprint under each of its
    /// `NUM_BLOCKS` blocks.
    pub fn add_doc(&mut self, fingerprint: u64, doc_id: u32) {
        let blocks = block_values(fingerprint);
        for (i, &block_val) in blocks.iter().enumerate() {
            self.bands[i]
                .entry(block_val)
                .or_default()
                .push((fingerprint, doc_id));
        }
    }

    /// Marks `html`'s content hash as seen.
    pub fn register_content_hash(&mut self, html: &str) {
        self.seen_content_hashes.insert(content_hash(html));
    }
}
