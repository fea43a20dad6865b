/// Configuration module for codesearch.
///
/// Handles loading, validating, and providing default configuration values.
use std::path::Path;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chunker::{ChunkError, DEFAULT_MAX_CHARS, DEFAULT_MIN_LINES, SplitterConfig};
use crate::search::QueryMode;

pub const DEFAULT_CONFIG_PATH: &str = "codesearch.json";

// ── Default value functions ──────────────────────────────────────────

fn default_db_path() -> String {
    "./codesearch.db".to_string()
}

fn default_max_chars() -> u32 {
    DEFAULT_MAX_CHARS
}

fn default_min_lines() -> u32 {
    DEFAULT_MIN_LINES
}

fn default_merge_min_length() -> Option<usize> {
    Some(40)
}

fn default_top_k() -> usize {
    10
}

fn default_rerank_top_n() -> usize {
    5
}

fn default_model_name() -> String {
    "feature-hash".to_string()
}

fn default_dimensions() -> usize {
    384
}

fn default_exclude_patterns() -> Vec<String> {
    vec![
        "**/target/**".to_string(),
        "**/node_modules/**".to_string(),
        "**/.git/**".to_string(),
    ]
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default)]
    pub chunking: ChunkingConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_chars")]
    pub max_chars: u32,

    #[serde(default = "default_min_lines")]
    pub min_lines: u32,

    /// Non-whitespace length a chunk must exceed before it stands alone;
    /// `null` turns the small-chunk merge off.
    #[serde(default = "default_merge_min_length")]
    pub merge_min_length: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SearchConfig {
    /// Candidates fetched from each retriever.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Results kept after reranking.
    #[serde(default = "default_rerank_top_n")]
    pub rerank_top_n: usize,

    #[serde(default)]
    pub default_mode: QueryMode,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_model_name")]
    pub name: String,

    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

// ── Default impls ────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            chunking: ChunkingConfig::default(),
            search: SearchConfig::default(),
            model: ModelConfig::default(),
            exclude_patterns: default_exclude_patterns(),
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            min_lines: default_min_lines(),
            merge_min_length: default_merge_min_length(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            rerank_top_n: default_rerank_top_n(),
            default_mode: QueryMode::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            dimensions: default_dimensions(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// If `config_path` is empty, defaults to [`DEFAULT_CONFIG_PATH`].
    /// If the file does not exist, returns a default config and generates a
    /// template when the default path was used.
    pub fn load(config_path: &str) -> Result<Self> {
        let path = if config_path.is_empty() {
            DEFAULT_CONFIG_PATH
        } else {
            config_path
        };

        if !Path::new(path).exists() {
            info!("{path} not found, using defaults");
            let cfg = Self::default();

            if path == DEFAULT_CONFIG_PATH {
                match cfg.save(path) {
                    Ok(()) => info!("Generated config template: {path}"),
                    Err(e) => warn!("Failed to generate config template: {e}"),
                }
            }

            return Ok(cfg);
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {path}"))?;

        let cfg: Config = match serde_json::from_str(&data) {
            Ok(c) => c,
            Err(e) => {
                warn!("Invalid JSON in {path}: {e}");
                warn!("Using default configuration");
                return Ok(Self::default());
            }
        };

        info!("Loaded configuration from {path}");
        Ok(cfg)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &str) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data).with_context(|| format!("failed to write config: {path}"))?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.chunking.max_chars > 0,
            "chunking.max_chars must be positive"
        );
        anyhow::ensure!(
            self.chunking.min_lines > 0,
            "chunking.min_lines must be positive"
        );
        anyhow::ensure!(self.search.top_k > 0, "search.top_k must be positive");
        anyhow::ensure!(
            self.search.rerank_top_n > 0,
            "search.rerank_top_n must be positive"
        );
        anyhow::ensure!(
            self.model.dimensions > 0,
            "model.dimensions must be positive"
        );
        self.exclude_set().context("invalid exclude_patterns")?;
        Ok(())
    }

    /// Chunker settings derived from the `chunking` section.
    pub fn splitter_config(&self) -> Result<SplitterConfig, ChunkError> {
        SplitterConfig::new(self.chunking.max_chars, self.chunking.min_lines)
    }

    /// Compile `exclude_patterns` into a matcher over relative paths.
    pub fn exclude_set(&self) -> Result<GlobSet, globset::Error> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude_patterns {
            builder.add(Glob::new(pattern)?);
        }
        builder.build()
    }
}

// ── Tests ────────────────────────────────────────────────────────────
