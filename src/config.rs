//! Layered runtime configuration: built-in defaults, an optional
//! `probe-index.json` in the working directory, then environment variable
//! overrides. Mirrors the teacher's `ProbeConfig` layering, scaled down to
//! this crate's much smaller knob surface.

use crate::errors::IndexError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "probe-index.json";

/// Raw, partially-specified configuration as read from a file. Every field
/// is optional so file and env layers can each override only what they set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_index_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_index_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hamming_k: Option<u32>,
}

/// Fully resolved configuration driving one build.
#[derive(Debug, Clone)]
pub struct IndexBuilderConfig {
    pub dataset_dir: PathBuf,
    pub partial_index_dir: PathBuf,
    pub final_index_dir: PathBuf,
    pub batch_size: usize,
    pub hamming_k: u32,
}

impl Default for IndexBuilderConfig {
    fn default() -> Self {
        IndexBuilderConfig {
            dataset_dir: PathBuf::from("dataset"),
            partial_index_dir: PathBuf::from("partial_index"),
            final_index_dir: PathBuf::from("final_index"),
            batch_size: 5_000,
            hamming_k: crate::dedup::HAMMING_K,
        }
    }
}

impl IndexBuilderConfig {
    /// Resolves the configuration: built-in defaults, then `./probe-index.json`
    /// if present, then environment variables, each overriding the previous.
    pub fn load() -> Result<Self> {
        let mut cfg = IndexBuilderConfig::default();

        if let Some(file_cfg) = Self::load_config_file(Path::new(CONFIG_FILE_NAME))? {
            cfg.apply_file(file_cfg);
        }

        cfg.apply_env()?;
        Ok(cfg)
    }

    fn load_config_file(path: &Path) -> Result<Option<FileConfig>> {
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => {
                let bytes = fs::read(path)
                    .with_context(|| format!("failed to read config file: {}", path.display()))?;
                let parsed: FileConfig = serde_json::from_slice(&bytes)
                    .with_context(|| format!("failed to parse config file: {}", path.display()))?;
                Ok(Some(parsed))
            }
            _ => Ok(None),
        }
    }

    fn apply_file(&mut self, file_cfg: FileConfig) {
        if let Some(v) = file_cfg.dataset_dir {
            self.dataset_dir = PathBuf::from(v);
        }
        if let Some(v) = file_cfg.partial_index_dir {
            self.partial_index_dir = PathBuf::from(v);
        }
        if let Some(v) = file_cfg.final_index_dir {
            self.final_index_dir = PathBuf::from(v);
        }
        if let Some(v) = file_cfg.batch_size {
            self.batch_size = v;
        }
        if let Some(v) = file_cfg.hamming_k {
            self.hamming_k = v;
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(v) = env::var("DATASET_DIR") {
            self.dataset_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("PARTIAL_INDEX_DIR") {
            self.partial_index_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("FINAL_INDEX_DIR") {
            self.final_index_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("BATCH_SIZE") {
            self.batch_size = v.parse().map_err(|_| IndexError::InvalidConfig {
                key: "BATCH_SIZE",
                value: v,
            })?;
        }
        if let Ok(v) = env::var("HAMMING_K") {
            self.hamming_k = v.parse().map_err(|_| IndexError::InvalidConfig {
                key: "HAMMING_K",
                value: v,
            })?;
        }
        Ok(())
    }
}
