//! Error types for the RAG pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, RagError>;

/// Errors that can occur while building, querying or evaluating a page.
#[derive(Error, Debug)]
pub enum RagError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input directory does not exist or is not a directory.
    #[error("Input path '{0}' does not exist or is not a directory")]
    InvalidInputDir(PathBuf),

    /// A supported document could not be parsed.
    #[error("Failed to load document '{path}': {reason}")]
    Load { path: PathBuf, reason: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM API error.
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// LLM response parsing error.
    #[error("Failed to parse LLM response: {0}")]
    LlmParse(String),

    /// Embedding API error.
    #[error("Embedding API error: {0}")]
    Embedding(String),

    /// HTTP request error.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Evaluation log read/write error.
    #[error("Evaluation log error: {0}")]
    Log(String),

    /// Chart rendering error.
    #[error("Plot error: {0}")]
    Plot(String),
}

impl RagError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a load error for a document that failed to parse.
    pub fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True for failures of an external embedding/generation/scoring call.
    pub fn is_generation_error(&self) -> bool {
        matches!(
            self,
            RagError::LlmApi(_) | RagError::LlmParse(_) | RagError::Embedding(_) | RagError::Http(_)
        )
    }
}

impl From<reqwest::Error> for RagError {
    fn from(err: reqwest::Error) -> Self {
        RagError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for RagError {
    fn from(err: serde_json::Error) -> Self {
        RagError::LlmParse(err.to_string())
    }
}

impl From<csv::Error> for RagError {
    fn from(err: csv::Error) -> Self {
        RagError::Log(err.to_string())
    }
}
