//! Fixed-window text chunking with overlap.

use crate::document::Document;
use crate::error::{RagError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata key holding a chunk's start offset.
pub const START_INDEX_KEY: &str = "start_index";

/// Configuration for text chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl ChunkConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Distance between the starts of consecutive chunks.
    pub fn stride(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::InvalidConfig("chunk_size must be positive".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// A window of a document's text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text content.
    pub text: String,
    /// Parent document metadata plus `start_index`.
    pub metadata: BTreeMap<String, String>,
    /// Start character position in the parent document.
    pub start_offset: usize,
}

impl Chunk {
    /// Source identifier inherited from the parent document.
    pub fn source(&self) -> &str {
        self.metadata
            .get(crate::document::SOURCE_KEY)
            .map(String::as_str)
            .unwrap_or("unknown")
    }
}

/// Splits documents into overlapping fixed-size character windows.
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkConfig,
}

impl Chunker {
    /// Create a chunker, rejecting `chunk_size == 0` and `chunk_overlap >= chunk_size`.
    pub fn new(config: ChunkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> ChunkConfig {
        self.config
    }

    /// Split raw text into `(start_offset, text)` windows.
    ///
    /// The window advances by `chunk_size - chunk_overlap` characters and
    /// stops after the window that reaches the end of the text, so only the
    /// final window can be shorter than `chunk_size`.
    pub fn split_text(&self, text: &str) -> Vec<(usize, String)> {
        let chars: Vec<char> = text.chars().collect();
        let text_len = chars.len();
        let mut windows = Vec::new();

        let mut start = 0;
        while start < text_len {
            let end = (start + self.config.chunk_size).min(text_len);
            windows.push((start, chars[start..end].iter().collect()));
            if end == text_len {
                break;
            }
            start += self.config.stride();
        }

        windows
    }

    /// Chunk every document independently; chunks never span documents.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        documents
            .iter()
            .flat_map(|document| {
                self.split_text(&document.text)
                    .into_iter()
                    .map(|(start_offset, text)| {
                        let mut metadata = document.metadata.clone();
                        metadata.insert(START_INDEX_KEY.to_string(), start_offset.to_string());
                        Chunk {
                            text,
                            metadata,
                            start_offset,
                        }
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(size: usize, overlap: usize) -> Chunker {
        Chunker::new(ChunkConfig::new(size, overlap)).unwrap()
    }

    #[test]
    fn test_chunk_config_default() {
        let config = ChunkConfig::default();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.stride(), 800);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        assert!(Chunker::new(ChunkConfig::new(0, 0)).is_err());
        assert!(Chunker::new(ChunkConfig::new(10, 10)).is_err());
        assert!(Chunker::new(ChunkConfig::new(10, 12)).is_err());
        assert!(Chunker::new(ChunkConfig::new(10, 9)).is_ok());
    }

    #[test]
    fn test_split_text_windows_and_offsets() {
        let windows = chunker(4, 1).split_text("abcdefghij");
        let expected = vec![
            (0, "abcd".to_string()),
            (3, "defg".to_string()),
            (6, "ghij".to_string()),
        ];
        assert_eq!(windows, expected);
    }

    #[test]
    fn test_final_chunk_may_be_short() {
        let windows = chunker(4, 1).split_text("abcdefgh");
        assert_eq!(windows.last().unwrap(), &(6, "gh".to_string()));
    }

    #[test]
    fn test_short_and_empty_text() {
        assert!(chunker(4, 1).split_text("").is_empty());
        assert_eq!(chunker(4, 1).split_text("ab"), vec![(0, "ab".to_string())]);
    }

    #[test]
    fn test_offsets_are_in_characters() {
        let windows = chunker(2, 0).split_text("αβγδ");
        assert_eq!(windows, vec![(0, "αβ".to_string()), (2, "γδ".to_string())]);
    }

    #[test]
    fn test_chunks_stay_within_documents() {
        let docs = vec![
            Document::new("aaaaaa", "one.html"),
            Document::new("bbbb", "two.html"),
        ];
        let chunks = chunker(4, 2).split_documents(&docs);

        assert_eq!(chunks.len(), 3);
        assert!(chunks[..2].iter().all(|c| c.source() == "one.html" && c.text.chars().all(|ch| ch == 'a')));
        assert_eq!(chunks[2].source(), "two.html");
        assert_eq!(chunks[2].start_offset, 0);
        assert_eq!(chunks[1].metadata.get(START_INDEX_KEY).map(String::as_str), Some("2"));
    }
}
