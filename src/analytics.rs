//! Human-readable build report: document counts, unique tokens, dedup
//! counters, and on-disk index size. Written to `index_analytics.txt`
//! alongside the final shards and echoed to stdout.

use crate::errors::IndexError;
use std::fs;
use std::path::Path;

/// Summary statistics produced by one successful build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildStats {
    pub num_docs: usize,
    pub num_unique_tokens: usize,
    pub index_size_kb: f64,
    pub exact_dups_removed: usize,
    pub near_dups_removed: usize,
}

impl BuildStats {
    /// Renders the plain-text analytics report body.
    pub fn report(&self) -> String {
        format!(
            "Index analytics:\n\
             \u{20}\u{20}Number of indexed documents (after dedup): {}\n\
             \u{20}\u{20}Number of unique tokens:     {}\n\
             \u{20}\u{20}Total size of index on disk: {:.2} KB\n\
             \u{20}\u{20}Exact duplicates removed:    {}\n\
             \u{20}\u{20}Near-duplicates removed:     {}\n",
            self.num_docs,
            self.num_unique_tokens,
            self.index_size_kb,
            self.exact_dups_removed,
            self.near_dups_removed,
        )
    }
}

/// Sums the on-disk byte size of every `<char>.jsonl` shard in `final_dir`,
/// returned in KB.
pub fn final_index_size_kb(final_dir: &Path) -> Result<f64, IndexError> {
    let mut total_bytes: u64 = 0;
    let entries = fs::read_dir(final_dir).map_err(|source| IndexError::Write {
        kind: "final index directory",
        path: final_dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| IndexError::Write {
            kind: "final index directory",
            path: final_dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "jsonl") {
            let meta = fs::metadata(&path).map_err(|source| IndexError::Write {
                kind: "shard",
                path: path.clone(),
                source,
            })?;
            total_bytes += meta.len();
        }
    }
    Ok(total_bytes as f64 / 1024.0)
}

/// Writes the analytics report to `<final_dir>/index_analytics.txt`.
pub fn write_analytics_report(stats: &BuildStats, final_dir: &Path) -> Result<(), IndexError> {
    let path = final_dir.join("index_analytics.txt");
    fs::write(&path, stats.report()).map_err(|source| IndexError::Write {
        kind: "analytics report",
        path,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn report_contains_all_counters() {
        let stats = BuildStats {
            num_docs: 3,
            num_unique_tokens: 10,
            index_size_kb: 1.5,
            exact_dups_removed: 1,
            near_dups_removed: 2,
        };
        let report = stats.report();
        assert!(report.contains("3"));
        assert!(report.contains("10"));
        assert!(report.contains("1.50 KB"));
        assert!(report.contains("Exact duplicates removed:    1"));
        assert!(report.contains("Near-duplicates removed:     2"));
    }

    #[test]
    fn size_sums_only_jsonl_shards() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.jsonl"), "x".repeat(1024)).unwrap();
        fs::write(dir.path().join("doc_mapping.json"), "ignored").unwrap();
        let size = final_index_size_kb(dir.path()).unwrap();
        assert!((size - 1.0).abs() < 0.01);
    }

    #[test]
    fn writes_report_file() {
        let dir = tempdir().unwrap();
        let stats = BuildStats {
            num_docs: 1,
            num_unique_tokens: 1,
            index_size_kb: 0.1,
            exact_dups_removed: 0,
            near_dups_removed: 0,
        };
        write_analytics_report(&stats, dir.path()).unwrap();
        let contents = fs::read_to_string(dir.path().join("index_analytics.txt")).unwrap();
        assert!(contents.contains("Number of indexed documents"));
    }
}
