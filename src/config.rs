//! Configuration for the RAG pipeline and its evaluation.
//!
//! Supports both environment variables and YAML config file.
//! Environment variables take precedence over config file values, and the
//! binaries apply command-line flags on top of the loaded [`Config`].

use crate::error::{RagError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Default base URL for OpenAI-compatible APIs.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com";

/// LLM configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL for the LLM API (e.g., "https://api.openai.com")
    pub api_base: String,

    /// API key for authentication
    pub api_key: String,

    /// Model name used for page generation (e.g., "gpt-4o-mini")
    pub model: String,

    /// Maximum tokens for response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// HTTP client timeout. `None` leaves requests unbounded.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.0
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            request_timeout_secs: None,
        }
    }
}

impl LlmConfig {
    /// Same endpoint and credentials, different model.
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }
}

/// Embedding service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    /// HTTP client timeout. `None` leaves requests unbounded.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: String::new(),
            model: "text-embedding-3-large".to_string(),
            request_timeout_secs: None,
        }
    }
}

/// Retrieval and generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Characters per chunk.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of chunks retrieved per question.
    pub top_k: usize,
    /// Audience the generated page is written for.
    pub target_audience: String,
    /// Vector store backend name.
    pub vector_store: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 100,
            target_audience: "Biologists and people with a degree in medicine.".to_string(),
            vector_store: "InMemory".to_string(),
        }
    }
}

/// Correctness evaluation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Model behind the first correctness judge.
    pub primary_model: String,
    /// Model behind the second correctness judge.
    pub secondary_model: String,
    /// Cumulative CSV log of scores.
    pub log_path: PathBuf,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            primary_model: "gpt-4o".to_string(),
            secondary_model: "gpt-4o-mini".to_string(),
            log_path: PathBuf::from("evaluation.csv"),
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub pipeline: PipelineConfig,
    pub evaluation: EvaluationConfig,
}

/// Configuration file structure (YAML format).
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    llm: Option<LlmFileSection>,
    embedding: Option<EmbeddingFileSection>,
    pipeline: Option<PipelineFileSection>,
    evaluation: Option<EvaluationFileSection>,
}

#[derive(Debug, Deserialize)]
struct LlmFileSection {
    api_base: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingFileSection {
    api_base: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PipelineFileSection {
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    top_k: Option<usize>,
    target_audience: Option<String>,
    vector_store: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EvaluationFileSection {
    primary_model: Option<String>,
    secondary_model: Option<String>,
    log_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (LLM_*, EMBEDDING_*, then OPENAI_API_KEY for keys)
    /// 2. Config file (~/.config/wiki-rag/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                config = Self::load_from_file(&config_path)?;
            }
        }

        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// [`Config::load`]).
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var("OPENAI_API_KEY") {
            if self.llm.api_key.is_empty() {
                self.llm.api_key = key.clone();
            }
            if self.embedding.api_key.is_empty() {
                self.embedding.api_key = key;
            }
        }

        if let Some(api_base) = var("LLM_API_BASE") {
            self.llm.api_base = api_base;
        }
        if let Some(api_key) = var("LLM_API_KEY") {
            self.llm.api_key = api_key;
        }
        if let Some(model) = var("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(tokens) = var("LLM_MAX_TOKENS").and_then(|v| v.parse().ok()) {
            self.llm.max_tokens = tokens;
        }
        if let Some(temp) = var("LLM_TEMPERATURE").and_then(|v| v.parse().ok()) {
            self.llm.temperature = temp;
        }
        if let Some(secs) = var("LLM_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.llm.request_timeout_secs = Some(secs);
        }

        if let Some(api_base) = var("EMBEDDING_API_BASE") {
            self.embedding.api_base = api_base;
        }
        if let Some(api_key) = var("EMBEDDING_API_KEY") {
            self.embedding.api_key = api_key;
        }
        if let Some(model) = var("EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Some(secs) = var("EMBEDDING_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.embedding.request_timeout_secs = Some(secs);
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RagError::io(path, e))?;
        Self::from_yaml(&content)
    }

    /// Parse a YAML document, filling unspecified fields with defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file_config: ConfigFile = serde_yaml::from_str::<Option<ConfigFile>>(content)
            .map_err(|e| RagError::Config(format!("Failed to parse config file: {}", e)))?
            .unwrap_or_default();

        let mut config = Config::default();

        if let Some(llm) = file_config.llm {
            if let Some(api_base) = llm.api_base {
                config.llm.api_base = api_base;
            }
            if let Some(api_key) = llm.api_key {
                config.llm.api_key = api_key;
            }
            if let Some(model) = llm.model {
                config.llm.model = model;
            }
            if let Some(max_tokens) = llm.max_tokens {
                config.llm.max_tokens = max_tokens;
            }
            if let Some(temperature) = llm.temperature {
                config.llm.temperature = temperature;
            }
            config.llm.request_timeout_secs = llm.request_timeout_secs;
        }

        if let Some(embedding) = file_config.embedding {
            if let Some(api_base) = embedding.api_base {
                config.embedding.api_base = api_base;
            }
            if let Some(api_key) = embedding.api_key {
                config.embedding.api_key = api_key;
            }
            if let Some(model) = embedding.model {
                config.embedding.model = model;
            }
            config.embedding.request_timeout_secs = embedding.request_timeout_secs;
        }

        if let Some(pipeline) = file_config.pipeline {
            if let Some(chunk_size) = pipeline.chunk_size {
                config.pipeline.chunk_size = chunk_size;
            }
            if let Some(chunk_overlap) = pipeline.chunk_overlap {
                config.pipeline.chunk_overlap = chunk_overlap;
            }
            if let Some(top_k) = pipeline.top_k {
                config.pipeline.top_k = top_k;
            }
            if let Some(audience) = pipeline.target_audience {
                config.pipeline.target_audience = audience;
            }
            if let Some(store) = pipeline.vector_store {
                config.pipeline.vector_store = store;
            }
        }

        if let Some(evaluation) = file_config.evaluation {
            if let Some(model) = evaluation.primary_model {
                config.evaluation.primary_model = model;
            }
            if let Some(model) = evaluation.secondary_model {
                config.evaluation.secondary_model = model;
            }
            if let Some(path) = evaluation.log_path {
                config.evaluation.log_path = path;
            }
        }

        Ok(config)
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "wiki-rag")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate the LLM settings (generation and judging).
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_base.is_empty() {
            return Err(RagError::Config(
                "LLM API base URL is required. Set LLM_API_BASE environment variable or add to config file.".to_string()
            ));
        }

        if self.llm.api_key.is_empty() {
            return Err(RagError::Config(
                "LLM API key is required. Set LLM_API_KEY or OPENAI_API_KEY environment variable or add to config file.".to_string()
            ));
        }

        if self.llm.model.is_empty() {
            return Err(RagError::Config(
                "LLM model is required. Set LLM_MODEL environment variable or add to config file."
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Validate everything the generation pipeline needs.
    pub fn validate_pipeline(&self) -> Result<()> {
        self.validate()?;

        if self.embedding.api_base.is_empty() || self.embedding.api_key.is_empty() {
            return Err(RagError::Config(
                "Embedding API base URL and key are required. Set EMBEDDING_API_KEY or OPENAI_API_KEY.".to_string(),
            ));
        }

        if self.embedding.model.is_empty() {
            return Err(RagError::Config("Embedding model is required.".to_string()));
        }

        if self.pipeline.chunk_size == 0 || self.pipeline.chunk_overlap >= self.pipeline.chunk_size {
            return Err(RagError::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.pipeline.chunk_overlap, self.pipeline.chunk_size
            )));
        }

        Ok(())
    }

    /// Create a config from explicit values (useful for testing).
    pub fn with_llm(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            llm: LlmConfig {
                api_base: api_base.into(),
                api_key: api_key.into(),
                model: model.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
