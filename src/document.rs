//! Document representation.
//!
//! A document is a unit of text plus string metadata. PDF files produce one
//! document per page; HTML files produce one document per file. The
//! `source` metadata key always holds the originating file path.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Metadata key for the originating file.
pub const SOURCE_KEY: &str = "source";

/// Metadata key for the 0-based page number of paged formats.
pub const PAGE_KEY: &str = "page";

/// A loaded unit of text with its source metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Text content.
    pub text: String,
    /// Source metadata (at least `source`).
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    /// Create a document whose only metadata is its source.
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(SOURCE_KEY.to_string(), source.into());
        Self {
            text: text.into(),
            metadata,
        }
    }

    /// Create a document for a file on disk.
    pub fn from_file(text: impl Into<String>, path: &Path) -> Self {
        Self::new(text, path.display().to_string())
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.metadata.insert(key.into(), value.to_string());
        self
    }

    /// Source identifier, or `"unknown"` when missing.
    pub fn source(&self) -> &str {
        self.metadata
            .get(SOURCE_KEY)
            .map(String::as_str)
            .unwrap_or("unknown")
    }

    /// Page number for paged formats.
    pub fn page(&self) -> Option<usize> {
        self.metadata.get(PAGE_KEY).and_then(|p| p.parse().ok())
    }

    /// Length of the text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
