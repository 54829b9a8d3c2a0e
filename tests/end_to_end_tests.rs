//! End-to-end scenarios for the build-then-query pipeline, covering a full
//! run from a corpus directory on disk through to ranked search results.

use boolit::builder::build_index;
use boolit::config::IndexBuilderConfig;
use boolit::query::{search, SearchMode};
use tempfile::TempDir;

fn write_doc(dir: &std::path::Path, name: &str, url: &str, content: &str) {
    let body = serde_json::json!({"url": url, "content": content});
    std::fs::write(dir.join(name), body.to_string()).unwrap();
}

fn config_for(root: &std::path::Path) -> IndexBuilderConfig {
    IndexBuilderConfig {
        dataset_dir: root.join("dataset"),
        partial_index_dir: root.join("partial"),
        final_index_dir: root.join("final"),
        batch_size: 5_000,
        hamming_k: 3,
    }
}

fn dataset_dir(root: &std::path::Path) -> std::path::PathBuf {
    let dir = root.join("dataset");
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// S1 -- single doc, single token: the merged shard carries one entry with
/// the expected posting, and a query for that token returns the doc scored
/// by its term frequency alone.
#[test]
fn s1_single_doc_single_token() {
    let tmp = TempDir::new().unwrap();
    let dataset = dataset_dir(tmp.path());
    write_doc(&dataset, "doc0.json", "http://x", "<p>Hello hello</p>");

    let config = config_for(tmp.path());
    let stats = build_index(&config).unwrap();
    assert_eq!(stats.num_docs, 1);

    let shard = std::fs::read_to_string(config.final_index_dir.join("h.jsonl")).unwrap();
    let lines: Vec<&str> = shard.lines().collect();
    assert_eq!(lines.len(), 1);
    let entry: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(entry["token"], "hello");
    assert_eq!(entry["postings"].as_array().unwrap().len(), 1);
    assert_eq!(entry["postings"][0]["doc_id"], 0);
    assert_eq!(entry["postings"][0]["tf"], 2);
    assert_eq!(entry["postings"][0]["importance"], 0);
    assert_eq!(entry["df"], 1);

    let results = search(&config.final_index_dir, "hello", SearchMode::And).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, "http://x");
    assert_eq!(results[0].score, 2.0);
}

/// S2 -- exact duplicate: the second identical document is skipped and
/// counted, never consuming a doc-id.
#[test]
fn s2_exact_duplicate_is_skipped_and_counted() {
    let tmp = TempDir::new().unwrap();
    let dataset = dataset_dir(tmp.path());
    write_doc(&dataset, "doc0.json", "http://a", "<p>identical content block</p>");
    write_doc(&dataset, "doc1.json", "http://b", "<p>identical content block</p>");

    let config = config_for(tmp.path());
    let stats = build_index(&config).unwrap();

    assert_eq!(stats.num_docs, 1);
    assert_eq!(stats.exact_dups_removed, 1);
    assert_eq!(stats.near_dups_removed, 0);
}

/// S3 -- near duplicate: two documents whose SimHash fingerprints differ by
/// a single bit (well within Hamming-3) are supplied in order; the second is
/// skipped as near-duplicate rather than exact, since its bytes differ.
#[test]
fn s3_near_duplicate_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let dataset = dataset_dir(tmp.path());
    // Same bag of words, trivially different markup -- same SimHash
    // fingerprint (computed purely from token weights), different raw
    // bytes, so the exact-hash gate lets it through to the near-dup gate.
    write_doc(
        &dataset,
        "doc0.json",
        "http://a",
        "<p>the quick brown fox jumps over the lazy dog</p>",
    );
    write_doc(
        &dataset,
        "doc1.json",
        "http://b",
        "<div>the quick brown fox jumps over the lazy dog</div>",
    );

    let config = config_for(tmp.path());
    let stats = build_index(&config).unwrap();

    assert_eq!(stats.num_docs, 1);
    assert_eq!(stats.exact_dups_removed, 0);
    assert_eq!(stats.near_dups_removed, 1);
}

/// S4 -- importance bonus: a title occurrence and a body occurrence of the
/// same token merge into one posting whose importance is the max tier and
/// whose `tf` sums across both extractions; the query score reflects the
/// importance bonus.
#[test]
fn s4_importance_bonus_and_tf_summation() {
    let tmp = TempDir::new().unwrap();
    let dataset = dataset_dir(tmp.path());
    write_doc(&dataset, "doc0.json", "http://x", "<title>foo</title><p>foo</p>");

    let config = config_for(tmp.path());
    build_index(&config).unwrap();

    let results = search(&config.final_index_dir, "foo", SearchMode::And).unwrap();
    assert_eq!(results.len(), 1);
    // tf=2 (one body occurrence, one title occurrence) + 0.5 * Title(2)
    assert_eq!(results[0].score, 2.0 + 0.5 * 2.0);
}

/// S5 -- AND vs OR: a two-document corpus where each document carries only
/// one of two distinct tokens. AND finds nothing; OR finds both, each
/// scored only by the token it actually contains.
#[test]
fn s5_and_vs_or_semantics() {
    let tmp = TempDir::new().unwrap();
    let dataset = dataset_dir(tmp.path());
    write_doc(&dataset, "doc0.json", "http://alpha", "<p>alpha</p>");
    write_doc(&dataset, "doc1.json", "http://beta", "<p>beta</p>");

    let config = config_for(tmp.path());
    build_index(&config).unwrap();

    let and_results = search(&config.final_index_dir, "alpha beta", SearchMode::And).unwrap();
    assert!(and_results.is_empty());

    let or_results = search(&config.final_index_dir, "alpha beta", SearchMode::Or).unwrap();
    assert_eq!(or_results.len(), 2);
    let urls: Vec<&str> = or_results.iter().map(|r| r.url.as_str()).collect();
    assert!(urls.contains(&"http://alpha"));
    assert!(urls.contains(&"http://beta"));
    for r in &or_results {
        assert_eq!(r.score, 1.0);
    }
}

/// S6 -- sharding: tokens spanning distinct leading letters land in
/// separate, correctly-sorted shard files.
#[test]
fn s6_shards_partition_by_leading_character() {
    let tmp = TempDir::new().unwrap();
    let dataset = dataset_dir(tmp.path());
    write_doc(&dataset, "doc0.json", "http://x", "<p>apple banana zebra</p>");

    let config = config_for(tmp.path());
    build_index(&config).unwrap();

    for ch in ['a', 'b', 'z'] {
        let path = config.final_index_dir.join(format!("{ch}.jsonl"));
        assert!(path.exists(), "expected shard {ch}.jsonl to exist");
        let contents = std::fs::read_to_string(&path).unwrap();
        for line in contents.lines() {
            let entry: serde_json::Value = serde_json::from_str(line).unwrap();
            let token = entry["token"].as_str().unwrap();
            assert_eq!(token.chars().next().unwrap(), ch);
        }
    }

    let a_contents = std::fs::read_to_string(config.final_index_dir.join("a.jsonl")).unwrap();
    assert_eq!(a_contents.lines().count(), 1);
}

/// Query engine failure semantics: a missing shard (no documents touch that
/// letter) is treated as empty postings, not an error.
#[test]
fn missing_shard_yields_empty_results_not_an_error() {
    let tmp = TempDir::new().unwrap();
    let dataset = dataset_dir(tmp.path());
    write_doc(&dataset, "doc0.json", "http://x", "<p>apple</p>");

    let config = config_for(tmp.path());
    build_index(&config).unwrap();

    let results = search(&config.final_index_dir, "zzzznotindexed", SearchMode::And).unwrap();
    assert!(results.is_empty());
}

/// Multiple batches (small `batch_size`) still merge into one coherent
/// final index spanning all documents.
#[test]
fn multiple_partials_merge_into_one_coherent_index() {
    let tmp = TempDir::new().unwrap();
    let dataset = dataset_dir(tmp.path());
    for i in 0..6 {
        write_doc(
            &dataset,
            &format!("doc{i}.json"),
            &format!("http://doc{i}"),
            "<p>shared common token</p>",
        );
    }

    let mut config = config_for(tmp.path());
    config.batch_size = 2;
    let stats = build_index(&config).unwrap();
    assert_eq!(stats.num_docs, 6);

    let results = search(&config.final_index_dir, "shared", SearchMode::And).unwrap();
    assert_eq!(results.len(), 6);
}
