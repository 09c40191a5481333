//! Configuration file support for memdex
//!
//! Config file location: ~/.config/memdex/config.toml
//!
//! Example config:
//! ```toml
//! [embedding]
//! provider = "ollama"  # ollama, openai, simulated, local
//! model = "all-minilm"
//! host = "http://localhost:11434"  # for ollama
//! # base_url = "http://localhost:1234/v1"  # for openai-compatible servers
//! # api_key = "sk-..."  # for openai
//!
//! [build]
//! max_tokens = 200
//!
//! [search]
//! top_k = 3
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::chunker::DEFAULT_MAX_TOKENS;
use crate::embedding::{DEFAULT_BATCH_SIZE, SIMULATED_DIMENSIONS};
use crate::extract::DEFAULT_FILE_TYPES;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider type: ollama, openai, simulated, local
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Host for Ollama (e.g., http://localhost:11434)
    pub host: Option<String>,

    /// Base URL for OpenAI-compatible APIs (e.g., http://localhost:1234/v1)
    pub base_url: Option<String>,

    /// API key for OpenAI
    pub api_key: Option<String>,

    /// Texts per embedding request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Embedding requests in flight at once
    #[serde(default = "default_max_concurrent_batches")]
    pub max_concurrent_batches: usize,

    /// Vector length for the simulated provider
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            host: None,
            base_url: None,
            api_key: None,
            batch_size: default_batch_size(),
            max_concurrent_batches: default_max_concurrent_batches(),
            dimensions: default_dimensions(),
        }
    }
}

fn default_provider() -> String {
    "ollama".to_string()
}

fn default_model() -> String {
    "all-minilm".to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_max_concurrent_batches() -> usize {
    1
}

fn default_dimensions() -> usize {
    SIMULATED_DIMENSIONS
}

/// Build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Word budget per passage
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// File types to include
    #[serde(default = "default_file_types")]
    pub file_types: Vec<String>,

    /// Include hidden files
    #[serde(default)]
    pub include_hidden: bool,

    /// Descend into subdirectories
    #[serde(default = "default_recursive")]
    pub recursive: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            file_types: default_file_types(),
            include_hidden: false,
            recursive: default_recursive(),
        }
    }
}

fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}

fn default_file_types() -> Vec<String> {
    DEFAULT_FILE_TYPES.iter().map(|s| s.to_string()).collect()
}

fn default_recursive() -> bool {
    true
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Results per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    3
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Override for the project index directory (default: .memdex/indexes)
    pub index_dir: Option<PathBuf>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("memdex")
            .join("config.toml")
    }

    /// Load config from file, returning defaults if not found
    pub fn load() -> Self {
        let path = Self::config_path();
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file: {}", e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config file: {}", e);
                }
            }
        }
        Self::default()
    }

    /// Write the commented example config, replacing any existing file
    pub fn write_example() -> anyhow::Result<PathBuf> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, EXAMPLE_CONFIG)?;
        Ok(path)
    }
}

const EXAMPLE_CONFIG: &str = r#"# memdex configuration
# Location: ~/.config/memdex/config.toml

[embedding]
# Provider: ollama, openai, simulated, local
provider = "ollama"

# Model name (provider-specific)
# Ollama: all-minilm, nomic-embed-text, mxbai-embed-large
# OpenAI: text-embedding-3-small, text-embedding-3-large
# Local: sentence-transformers/all-MiniLM-L6-v2
model = "all-minilm"

# Ollama host (default: http://localhost:11434)
# host = "http://localhost:11434"

# OpenAI-compatible base URL
# base_url = "http://localhost:1234/v1"

# API key (for OpenAI, or set OPENAI_API_KEY)
# api_key = "sk-..."

# Texts per embedding request
batch_size = 32

# Embedding requests in flight at once
max_concurrent_batches = 1

# Vector length for the simulated provider
# dimensions = 384

[build]
# Word budget per passage
max_tokens = 200

# File types to include
file_types = [".txt", ".pdf", ".docx", ".jpg", ".jpeg", ".png", ".bmp", ".tiff"]

# include_hidden = false
# recursive = true

[search]
top_k = 3

[storage]
# index_dir = ".memdex/indexes"
"#;
