//! Doc-id <-> URL persistence: a single JSON object mapping the stringified
//! doc-id to its normalized URL.

use crate::errors::IndexError;
use ahash::AHashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

/// Strips the fragment (`#...`) and surrounding whitespace from a URL, the
/// normalization applied at ingestion time before a URL is ever stored.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    match trimmed.find('#') {
        Some(idx) => trimmed[..idx].to_string(),
        None => trimmed.to_string(),
    }
}

/// Persists `doc_id -> url` as `{ "0": "http://...", "1": "http://..." }`.
pub fn write_doc_mapping(
    mapping: &AHashMap<u32, String>,
    path: &Path,
) -> Result<(), IndexError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| IndexError::Write {
                kind: "doc mapping directory",
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let stringified: std::collections::BTreeMap<String, &String> = mapping
        .iter()
        .map(|(doc_id, url)| (doc_id.to_string(), url))
        .collect();

    let file = File::create(path).map_err(|source| IndexError::Write {
        kind: "doc mapping",
        path: path.to_path_buf(),
        source,
    })?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &stringified).map_err(|source| IndexError::Write {
        kind: "doc mapping",
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::Other, source),
    })?;
    Ok(())
}

/// Reads a doc-id mapping back, parsing stringified keys into `u32`.
pub fn read_doc_mapping(path: &Path) -> Result<AHashMap<u32, String>, IndexError> {
    let bytes = fs::read(path).map_err(|source| IndexError::Open {
        kind: "doc mapping",
        path: path.to_path_buf(),
        source,
    })?;
    let raw: std::collections::HashMap<String, String> =
        serde_json::from_slice(&bytes).map_err(|source| IndexError::CorruptLine {
            path: path.to_path_buf(),
            line: 1,
            source,
        })?;

    let mut mapping = AHashMap::with_capacity(raw.len());
    for (key, url) in raw {
        let doc_id: u32 = key.parse().map_err(|_| IndexError::MissingField {
            path: path.to_path_buf(),
            field: "doc_id",
        })?;
        mapping.insert(doc_id, url);
    }
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn strips_fragment_and_whitespace() {
        assert_eq!(
            normalize_url("  http://example.com/page#section  "),
            "http://example.com/page"
        );
        assert_eq!(normalize_url("http://example.com/page"), "http://example.com/page");
    }

    #[test]
    fn round_trips_a_mapping() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc_mapping.json");

        let mut mapping = AHashMap::new();
        mapping.insert(0u32, "http://a.com".to_string());
        mapping.insert(1u32, "http://b.com".to_string());

        write_doc_mapping(&mapping, &path).unwrap();
        let read_back = read_doc_mapping(&path).unwrap();

        assert_eq!(read_back.get(&0), Some(&"http://a.com".to_string()));
        assert_eq!(read_back.get(&1), Some(&"http://b.com".to_string()));
    }
}
