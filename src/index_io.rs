//! Reading and writing the on-disk line-delimited JSON format shared by
//! partial indexes and final shards: one [`IndexEntry`] per line, entries
//! written token-ascending.

use crate::errors::IndexError;
use crate::models::{Index, IndexEntry, Posting};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// On-the-wire shape of a partial-index line: `{"token", "postings"}` only,
/// per §4.E -- `df` is a final-shard addition computed at merge time, not
/// carried by partials.
#[derive(Serialize)]
struct PartialEntryLine<'a> {
    token: &'a str,
    postings: &'a [Posting],
}

/// Writes `index`'s entries, token-ascending, as line-delimited JSON to
/// `path`. Creates the parent directory if missing. The file handle is
/// closed (flushed and dropped) before this function returns, so a reader
/// invoked afterwards never observes a partially-written file.
pub fn write_partial_index(index: Index, path: &Path) -> Result<(), IndexError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| IndexError::Write {
                kind: "partial index directory",
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let file = File::create(path).map_err(|source| IndexError::Write {
        kind: "partial index",
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    for entry in index.into_sorted_entries() {
        write_partial_entry_line(&mut writer, &entry, path)?;
    }

    writer.flush().map_err(|source| IndexError::Write {
        kind: "partial index",
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Writes already-sorted, already-finalized entries (used by the merger,
/// which streams one shard's entries in ascending order as they're
/// produced rather than building an in-memory `Index` first).
pub fn write_entries<'a>(
    entries: impl Iterator<Item = &'a IndexEntry>,
    path: &Path,
) -> Result<(), IndexError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| IndexError::Write {
                kind: "shard directory",
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let file = File::create(path).map_err(|source| IndexError::Write {
        kind: "shard",
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    for entry in entries {
        write_entry_line(&mut writer, entry, path)?;
    }
    writer.flush().map_err(|source| IndexError::Write {
        kind: "shard",
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Writes one final-shard line, `df` included (§6: shards carry `df`).
fn write_entry_line(
    writer: &mut impl Write,
    entry: &IndexEntry,
    path: &Path,
) -> Result<(), IndexError> {
    let line = serde_json::to_string(entry).map_err(|source| IndexError::CorruptLine {
        path: path.to_path_buf(),
        line: 0,
        source,
    })?;
    writeln!(writer, "{line}").map_err(|source| IndexError::Write {
        kind: "index entry",
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Writes one partial-index line, `df` omitted (§4.E: partials carry only
/// `token` and `postings`; `df` is computed at merge-finalization).
fn write_partial_entry_line(
    writer: &mut impl Write,
    entry: &IndexEntry,
    path: &Path,
) -> Result<(), IndexError> {
    let partial = PartialEntryLine {
        token: &entry.token,
        postings: &entry.postings,
    };
    let line = serde_json::to_string(&partial).map_err(|source| IndexError::CorruptLine {
        path: path.to_path_buf(),
        line: 0,
        source,
    })?;
    writeln!(writer, "{line}").map_err(|source| IndexError::Write {
        kind: "index entry",
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Reads a line-delimited-JSON index file (partial or shard) back into an
/// [`Index`]. Any malformed line is a fatal corruption error.
pub fn read_partial_index(path: &Path) -> Result<Index, IndexError> {
    let file = File::open(path).map_err(|source| IndexError::Open {
        kind: "partial index",
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    let mut index = Index::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| IndexError::Open {
            kind: "partial index",
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let entry = parse_entry_line(&line, path, line_no + 1)?;
        for p in &entry.postings {
            index.add_token(&entry.token, p.doc_id, p.tf, p.importance);
        }
    }

    Ok(index)
}

/// Parses one line of the on-disk format into an `IndexEntry`, failing with
/// [`IndexError::CorruptLine`]/[`IndexError::MissingField`] on malformed
/// input (§7: corruption at read is fatal).
pub fn parse_entry_line(line: &str, path: &Path, line_no: usize) -> Result<IndexEntry, IndexError> {
    let value: serde_json::Value =
        serde_json::from_str(line).map_err(|source| IndexError::CorruptLine {
            path: path.to_path_buf(),
            line: line_no,
            source,
        })?;

    if value.get("token").is_none() {
        return Err(IndexError::MissingField {
            path: path.to_path_buf(),
            field: "token",
        });
    }
    if value.get("postings").is_none() {
        return Err(IndexError::MissingField {
            path: path.to_path_buf(),
            field: "postings",
        });
    }

    serde_json::from_value(value).map_err(|source| IndexError::CorruptLine {
        path: path.to_path_buf(),
        line: line_no,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Importance;
    use tempfile::tempdir;

    #[test]
    fn round_trips_an_index() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial_0.json");

        let mut index = Index::new();
        index.add_token("hello", 0, 2, Importance::Normal);
        index.add_token("world", 1, 1, Importance::Title);

        write_partial_index(index, &path).unwrap();
        let read_back = read_partial_index(&path).unwrap();

        let hello = read_back.get_entry("hello").unwrap();
        assert_eq!(hello.postings[0].tf, 2);
        let world = read_back.get_entry("world").unwrap();
        assert_eq!(world.postings[0].importance, Importance::Title);
    }

    #[test]
    fn entries_are_written_token_ascending() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial_0.json");

        let mut index = Index::new();
        index.add_token("zebra", 0, 1, Importance::Normal);
        index.add_token("apple", 0, 1, Importance::Normal);
        write_partial_index(index, &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let tokens: Vec<String> = contents
            .lines()
            .map(|l| {
                let v: serde_json::Value = serde_json::from_str(l).unwrap();
                v["token"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(tokens, vec!["apple".to_string(), "zebra".to_string()]);
    }

    #[test]
    fn missing_token_field_is_a_corruption_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        fs::write(&path, "{\"postings\":[]}\n").unwrap();
        let err = read_partial_index(&path).unwrap_err();
        assert!(matches!(err, IndexError::MissingField { field: "token", .. }));
    }

    #[test]
    fn malformed_json_line_is_a_corruption_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        fs::write(&path, "not json at all\n").unwrap();
        let err = read_partial_index(&path).unwrap_err();
        assert!(matches!(err, IndexError::CorruptLine { .. }));
    }

    #[test]
    fn creates_parent_directory_if_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("partial_0.json");
        write_partial_index(Index::new(), &path).unwrap();
        assert!(path.exists());
    }
}
