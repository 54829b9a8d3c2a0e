//! Disk-based k-way merge of partial indexes into a letter-sharded final
//! index. A natural fit for a min-heap of `(token, reader)`: pop the
//! smallest token, drain every reader whose next entry ties it, merge them,
//! and write one finalized entry per token, one shard file per leading
//! character.

use crate::errors::IndexError;
use crate::index_io::{parse_entry_line, write_entries};
use crate::models::IndexEntry;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// A partial-index file opened for streaming, sequential reads: the merger
/// never holds more than one pending entry per partial in memory at a time.
struct PartialReader {
    path: PathBuf,
    lines: std::io::Lines<BufReader<File>>,
    line_no: usize,
}

impl PartialReader {
    fn open(path: &Path) -> Result<Self, IndexError> {
        let file = File::open(path).map_err(|source| IndexError::Open {
            kind: "partial index",
            path: path.to_path_buf(),
            source,
        })?;
        Ok(PartialReader {
            path: path.to_path_buf(),
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }

    /// Reads the next non-blank entry, skipping blank lines, or `None` at EOF.
    fn next_entry(&mut self) -> Result<Option<IndexEntry>, IndexError> {
        loop {
            let Some(line) = self.lines.next() else {
                return Ok(None);
            };
            self.line_no += 1;
            let line = line.map_err(|source| IndexError::Open {
                kind: "partial index",
                path: self.path.clone(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            return Ok(Some(parse_entry_line(&line, &self.path, self.line_no)?));
        }
    }
}

/// A pending `(token, entry)` pulled from one reader, ordered for a
/// min-heap (reversed `Ord`) and compared only on `token` -- ties are
/// resolved by draining every reader at that token before advancing.
struct HeapItem {
    token: String,
    entry: IndexEntry,
    reader_idx: usize,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}
impl Eq for HeapItem {}
impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so `BinaryHeap` (a max-heap) behaves as a min-heap on token.
        other.token.cmp(&self.token)
    }
}

/// Merges `partial_paths` (each sorted by token ascending) into one final
/// shard file per distinct leading token character under `final_dir`,
/// named `<char>.jsonl`. Holds at most one entry resident per partial file
/// plus one accumulating entry; all readers are opened up front and closed
/// (via `Drop`) once the merge completes or fails.
///
/// Returns the number of distinct tokens written across all shards.
pub fn merge_partial_indexes(
    partial_paths: &[PathBuf],
    final_dir: &Path,
) -> Result<usize, IndexError> {
    std::fs::create_dir_all(final_dir).map_err(|source| IndexError::Write {
        kind: "final index directory",
        path: final_dir.to_path_buf(),
        source,
    })?;

    let mut readers: Vec<PartialReader> = partial_paths
        .iter()
        .map(|p| PartialReader::open(p))
        .collect::<Result<_, _>>()?;

    let mut heap: BinaryHeap<HeapItem> = BinaryHeap::new();
    for (idx, reader) in readers.iter_mut().enumerate() {
        if let Some(entry) = reader.next_entry()? {
            heap.push(HeapItem {
                token: entry.token.clone(),
                entry,
                reader_idx: idx,
            });
        }
    }

    let mut current_shard_char: Option<char> = None;
    let mut shard_entries: Vec<IndexEntry> = Vec::new();
    let mut total_tokens = 0usize;

    macro_rules! flush_shard {
        () => {
            if let Some(ch) = current_shard_char.take() {
                let shard_path = final_dir.join(format!("{ch}.jsonl"));
                write_entries(shard_entries.iter(), &shard_path)?;
                shard_entries.clear();
            }
        };
    }

    while let Some(top) = heap.pop() {
        let mut merged = top.entry;
        let token = top.token.clone();

        if let Some(entry) = readers[top.reader_idx].next_entry()? {
            heap.push(HeapItem {
                token: entry.token.clone(),
                entry,
                reader_idx: top.reader_idx,
            });
        }

        // Drain every reader whose next entry ties the current token.
        while let Some(next_top) = heap.peek() {
            if next_top.token != token {
                break;
            }
            let tied = heap.pop().unwrap();
            merged.merge(&tied.entry);
            if let Some(entry) = readers[tied.reader_idx].next_entry()? {
                heap.push(HeapItem {
                    token: entry.token.clone(),
                    entry,
                    reader_idx: tied.reader_idx,
                });
            }
        }

        merged.recompute_df();

        let leading_char = token.chars().next().expect("token is non-empty");
        if current_shard_char != Some(leading_char) {
            flush_shard!();
            current_shard_char = Some(leading_char);
        }
        shard_entries.push(merged);
        total_tokens += 1;
    }

    flush_shard!();

    Ok(total_tokens)
}
