//! Boolean keyword query engine: tokenize the query, open only the shards
//! the query's tokens touch, intersect or union posting lists, and rank
//! candidates by term frequency plus an importance bonus.

use crate::doc_mapping::read_doc_mapping;
use crate::errors::IndexError;
use crate::index_io::parse_entry_line;
use crate::models::IndexEntry;
use crate::tokenizer::tokenize;
use ahash::AHashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Boolean combination mode for a multi-token query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    And,
    Or,
}

/// Tokenizes a raw query string with the same tokenizer used at index
/// time, returning the sorted, deduplicated set of stemmed query tokens.
/// This crate treats the whole query as one multi-term query (the
/// programmatic-`search` behavior), not as whitespace-split independent
/// single-term searches.
pub fn process_query(raw_query: &str) -> Vec<String> {
    let counts = tokenize(raw_query);
    let mut tokens: Vec<String> = counts.counts.into_keys().collect();
    tokens.sort_unstable();
    tokens
}

/// Opens `<final_dir>/<token[0]>.jsonl` and scans it line by line for
/// `token`, stopping early once a lexicographically greater token is seen.
/// A missing shard file or an absent token both yield an empty entry --
/// neither is an error (§4.G failure semantics); a malformed line is fatal.
pub fn fetch_from_index(final_dir: &Path, token: &str) -> Result<IndexEntry, IndexError> {
    let Some(leading_char) = token.chars().next() else {
        return Ok(IndexEntry::new(token));
    };
    let shard_path = final_dir.join(format!("{leading_char}.jsonl"));

    let file = match File::open(&shard_path) {
        Ok(f) => f,
        Err(_) => {
            tracing::debug!(token, path = %shard_path.display(), "shard file missing, treating as empty postings");
            return Ok(IndexEntry::new(token));
        }
    };

    let reader = BufReader::new(file);
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| IndexError::Open {
            kind: "shard",
            path: shard_path.clone(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let entry = parse_entry_line(&line, &shard_path, line_no + 1)?;
        match entry.token.as_str().cmp(token) {
            std::cmp::Ordering::Equal => return Ok(entry),
            std::cmp::Ordering::Greater => break,
            std::cmp::Ordering::Less => continue,
        }
    }

    Ok(IndexEntry::new(token))
}

/// Boolean-merges per-token posting lists into a sorted, deduplicated list
/// of candidate `doc_id`s. For `AND`, any empty posting list short-circuits
/// to an empty result; for `OR`, empty posting lists are simply skipped
/// (callers filter those entries out before calling this).
pub fn merge_postings(entries: &[IndexEntry], mode: SearchMode) -> Vec<u32> {
    if entries.is_empty() {
        return Vec::new();
    }

    let doc_sets: Vec<AHashSet<u32>> = entries
        .iter()
        .map(|e| e.postings.iter().map(|p| p.doc_id).collect())
        .collect();

    if mode == SearchMode::And && doc_sets.iter().any(|s| s.is_empty()) {
        return Vec::new();
    }

    let mut result: AHashSet<u32> = match mode {
        SearchMode::And => doc_sets[0].clone(),
        SearchMode::Or => AHashSet::default(),
    };

    match mode {
        SearchMode::And => {
            for set in &doc_sets[1..] {
                result.retain(|id| set.contains(id));
            }
        }
        SearchMode::Or => {
            for set in &doc_sets {
                result.extend(set.iter().copied());
            }
        }
    }

    let mut sorted: Vec<u32> = result.into_iter().collect();
    sorted.sort_unstable();
    sorted
}

/// `score(doc_id) = sum over token-entries e { p.tf + 0.5 * p.importance }`,
/// a token contributing zero if `doc_id` is absent from its postings.
pub fn score_doc(doc_id: u32, entries: &[IndexEntry]) -> f64 {
    let mut score = 0.0;
    for entry in entries {
        if let Some(p) = entry.postings.iter().find(|p| p.doc_id == doc_id) {
            score += p.tf as f64 + 0.5 * (p.importance as u8 as f64);
        }
    }
    score
}

/// One ranked search result: a URL and its score.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub url: String,
    pub score: f64,
}

/// Runs a full query against a built index: tokenize, fetch shards,
/// boolean-merge, rank, and map doc-ids back to URLs. Returns results
/// sorted by score descending, then `doc_id` ascending.
pub fn search(final_dir: &Path, query: &str, mode: SearchMode) -> Result<Vec<SearchResult>, IndexError> {
    let tokens = process_query(query);
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::with_capacity(tokens.len());
    for token in &tokens {
        let entry = fetch_from_index(final_dir, token)?;
        if entry.postings.is_empty() {
            if mode == SearchMode::And {
                return Ok(Vec::new());
            }
            continue;
        }
        entries.push(entry);
    }

    if entries.is_empty() {
        return Ok(Vec::new());
    }

    let doc_ids = merge_postings(&entries, mode);
    if doc_ids.is_empty() {
        return Ok(Vec::new());
    }

    let doc_mapping = read_doc_mapping(&final_dir.join("doc_mapping.json"))?;

    let mut scored: Vec<(u32, f64)> = Vec::with_capacity(doc_ids.len());
    for doc_id in doc_ids {
        scored.push((doc_id, score_doc(doc_id, &entries)));
    }
    // Score descending, doc_id ascending as the tie-break.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then(a.0.cmp(&b.0)));

    let mut results = Vec::with_capacity(scored.len());
    for (doc_id, score) in scored {
        let url = doc_mapping
            .get(&doc_id)
            .ok_or(IndexError::UnknownDocId { doc_id })?;
        results.push(SearchResult {
            url: url.clone(),
            score,
        });
    }
    Ok(results)
}
