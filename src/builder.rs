//! Orchestrates the construction pipeline end to end: iterate documents,
//! extract, tokenize, dedup, accumulate, spill partials on batch
//! boundaries, k-way merge into final shards, and write the doc mapping and
//! analytics report.

use crate::analytics::{final_index_size_kb, write_analytics_report, BuildStats};
use crate::config::IndexBuilderConfig;
use crate::corpus::iter_documents;
use crate::dedup::{DupVerdict, DuplicateDetector};
use crate::doc_mapping::write_doc_mapping;
use crate::errors::IndexError;
use crate::extract::extract_text;
use crate::index_io::write_partial_index;
use crate::merge::merge_partial_indexes;
use crate::models::{Importance, Index};
use crate::tokenizer::tokenize;
use ahash::AHashMap;
use std::path::PathBuf;

/// Runs the full index-construction pipeline against `config` and returns
/// the resulting build statistics. Fatal I/O or corruption failures abort
/// the run and propagate as `IndexError`; per-document defects (missing
/// `url`, empty payload, duplicates) are counted and logged, never
/// propagated.
pub fn build_index(config: &IndexBuilderConfig) -> Result<BuildStats, IndexError> {
    tracing::info!(
        dataset_dir = %config.dataset_dir.display(),
        partial_index_dir = %config.partial_index_dir.display(),
        final_index_dir = %config.final_index_dir.display(),
        batch_size = config.batch_size,
        "starting index construction",
    );

    let mut doc_id_to_url: AHashMap<u32, String> = AHashMap::new();
    let mut partial_paths: Vec<PathBuf> = Vec::new();
    let mut current_index = Index::new();
    let mut next_doc_id: u32 = 0;
    let mut exact_dups_removed = 0usize;
    let mut near_dups_removed = 0usize;
    let mut detector = DuplicateDetector::with_hamming_threshold(config.hamming_k);

    for doc in iter_documents(&config.dataset_dir) {
        let Some(html) = doc.content else {
            continue;
        };

        let (body_text, title_text, heading_text) = extract_text(&html);
        let body_counts = tokenize(&body_text);
        let title_counts = tokenize(&title_text);
        let heading_counts = tokenize(&heading_text);

        let verdict = detector.check(Some(&html), Some(&body_counts));
        match verdict {
            DupVerdict::Exact => {
                exact_dups_removed += 1;
                continue;
            }
            DupVerdict::Near => {
                near_dups_removed += 1;
                continue;
            }
            DupVerdict::New(fingerprint) => {
                detector.register_content_hash(&html);
                let doc_id = next_doc_id;
                next_doc_id += 1;
                if let Some(fp) = fingerprint {
                    detector.add_doc(fp, doc_id);
                }
                doc_id_to_url.insert(doc_id, doc.url);

                // `body_counts` already contains every occurrence of every
                // token, including ones inside `<title>`/heading/bold spans
                // (`body_text` is the whole document's text). Each token's
                // true `tf` is counted exactly once, here; `title_counts`/
                // `heading_counts` are consulted only to decide the highest
                // importance tier that occurrence reaches in this document,
                // never to add further `tf`.
                for (token, &tf) in &body_counts.counts {
                    let importance = if title_counts.counts.contains_key(token) {
                        Importance::Title
                    } else if heading_counts.counts.contains_key(token) {
                        Importance::BoldOrHeading
                    } else {
                        Importance::Normal
                    };
                    current_index.add_token(token, doc_id, tf, importance);
                }

                if (next_doc_id as usize) % config.batch_size == 0 {
                    spill_partial(
                        &mut current_index,
                        &mut partial_paths,
                        &config.partial_index_dir,
                    )?;
                }
            }
        }
    }

    if !current_index.is_empty() {
        spill_partial(
            &mut current_index,
            &mut partial_paths,
            &config.partial_index_dir,
        )?;
    }

    tracing::info!(
        partials = partial_paths.len(),
        indexed = doc_id_to_url.len(),
        exact_dups_removed,
        near_dups_removed,
        "document ingestion complete, merging partial indexes",
    );

    let num_unique_tokens = merge_partial_indexes(&partial_paths, &config.final_index_dir)?;

    let mapping_path = config.final_index_dir.join("doc_mapping.json");
    write_doc_mapping(&doc_id_to_url, &mapping_path)?;

    let index_size_kb = final_index_size_kb(&config.final_index_dir)?;

    let stats = BuildStats {
        num_docs: doc_id_to_url.len(),
        num_unique_tokens,
        index_size_kb,
        exact_dups_removed,
        near_dups_removed,
    };

    write_analytics_report(&stats, &config.final_index_dir)?;
    tracing::info!(?stats, "index build complete");

    Ok(stats)
}

fn spill_partial(
    current_index: &mut Index,
    partial_paths: &mut Vec<PathBuf>,
    partial_dir: &std::path::Path,
) -> Result<(), IndexError> {
    let part_path = partial_dir.join(format!("partial_{}.json", partial_paths.len()));
    tracing::info!(
        path = %part_path.display(),
        unique_tokens = current_index.len(),
        "spilling partial index",
    );
    let spilled = std::mem::take(current_index);
    write_partial_index(spilled, &part_path)?;
    partial_paths.push(part_path);
    Ok(())
}
