// Error types for the index builder and query engine.
//
// Non-fatal conditions (missing `url`, malformed document JSON, a content-less
// document, a duplicate) are never represented here -- they are counted and
// logged at the call site. Only conditions that should abort the run reach
// these variants.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("failed to write {kind} to {path}: {source}")]
    Write {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {kind} from {path}: {source}")]
    Open {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt index: malformed JSON line in {path} (line {line}): {source}")]
    CorruptLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("corrupt index: entry in {path} missing required field `{field}`")]
    MissingField { path: PathBuf, field: &'static str },

    #[error("index inconsistency: doc_id {doc_id} has no entry in the doc mapping")]
    UnknownDocId { doc_id: u32 },

    #[error("invalid configuration value for {key}: {value}")]
    InvalidConfig { key: &'static str, value: String },
}
