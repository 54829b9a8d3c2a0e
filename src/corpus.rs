//! Corpus reader: walks a directory of per-document JSON files into a
//! stream of `(url, html)` pairs. An external-collaborator shim -- corpus
//! discovery itself is out of scope, this just turns a directory into the
//! `(url, Option<String>)` stream the builder iterates.

use crate::doc_mapping::normalize_url;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One corpus document as read off disk: a normalized URL and its raw HTML
/// content (`None` if `content` was null, missing, or the file could not be
/// parsed as the expected shape after all -- callers treat `None` as an
/// empty-payload skip, per §7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusDocument {
    pub url: String,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    url: Option<String>,
    content: Option<String>,
}

/// Streaming iterator over every `*.json` file under `dataset_dir`, sorted
/// by path for determinism. Files missing `url`, failing to parse as JSON,
/// or unreadable are skipped (logged at `warn`) without being treated as
/// duplicates.
pub struct CorpusIter {
    paths: std::vec::IntoIter<PathBuf>,
}

impl CorpusIter {
    pub fn new(dataset_dir: &Path) -> Self {
        let mut paths: Vec<PathBuf> = WalkDir::new(dataset_dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "json"))
            .map(|entry| entry.into_path())
            .collect();
        paths.sort();
        CorpusIter {
            paths: paths.into_iter(),
        }
    }
}

impl Iterator for CorpusIter {
    type Item = CorpusDocument;

    fn next(&mut self) -> Option<CorpusDocument> {
        for path in self.paths.by_ref() {
            let bytes = match std::fs::read(&path) {
                Ok(b) => b,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable corpus file");
                    continue;
                }
            };
            let raw: RawDocument = match serde_json::from_slice(&bytes) {
                Ok(r) => r,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping malformed corpus document");
                    continue;
                }
            };
            let Some(url) = raw.url else {
                tracing::warn!(path = %path.display(), "skipping corpus document missing `url`");
                continue;
            };
            return Some(CorpusDocument {
                url: normalize_url(&url),
                content: raw.content.filter(|c| !c.is_empty()),
            });
        }
        None
    }
}

/// Convenience entry point matching the rest of the crate's module-level
/// function style.
pub fn iter_documents(dataset_dir: &Path) -> CorpusIter {
    CorpusIter::new(dataset_dir)
}
