//! In-memory similarity index over embedded chunks.

use crate::chunker::Chunk;
use crate::embedding::{EmbeddingProvider, cosine_similarity};
use crate::error::{RagError, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// Vector store backends that can be selected by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexBackend {
    /// Brute-force cosine scan over a memory-resident table.
    #[default]
    InMemory,
}

impl FromStr for IndexBackend {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "InMemory" => Ok(IndexBackend::InMemory),
            other => Err(RagError::Config(format!("Unknown vector store type: {}", other))),
        }
    }
}

impl fmt::Display for IndexBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexBackend::InMemory => write!(f, "InMemory"),
        }
    }
}

impl IndexBackend {
    /// Create an empty index of this backend.
    pub fn create(self, embedder: Arc<dyn EmbeddingProvider>) -> InMemoryIndex {
        match self {
            IndexBackend::InMemory => InMemoryIndex::new(embedder),
        }
    }
}

/// A chunk with its embedding vector.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// A query hit.
#[derive(Debug, Clone)]
pub struct ScoredEntry {
    pub entry: IndexEntry,
    /// Cosine similarity to the query.
    pub score: f32,
}

/// Memory-resident vector index; contents are lost when it is dropped.
pub struct InMemoryIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    entries: Vec<IndexEntry>,
}

impl InMemoryIndex {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            entries: Vec::new(),
        }
    }

    /// Embed and store chunks, keeping insertion order.
    pub async fn add(&mut self, chunks: Vec<Chunk>) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(RagError::Embedding(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        self.entries.extend(
            chunks
                .into_iter()
                .zip(embeddings)
                .map(|(chunk, embedding)| IndexEntry { chunk, embedding }),
        );

        info!(
            model = self.embedder.model(),
            total = self.entries.len(),
            "indexed chunks"
        );
        Ok(())
    }

    /// Return up to `k` entries most similar to `question`, best first.
    ///
    /// Equal scores keep insertion order. An empty index answers with an
    /// empty result without contacting the embedding service.
    pub async fn query(&self, question: &str, k: usize) -> Result<Vec<ScoredEntry>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(question).await?;

        let mut results: Vec<ScoredEntry> = self
            .entries
            .iter()
            .map(|entry| ScoredEntry {
                score: cosine_similarity(&query_embedding, &entry.embedding),
                entry: entry.clone(),
            })
            .collect();

        // Stable sort keeps insertion order for ties; NaN scores rank last.
        results.sort_by(|a, b| match (a.score.is_nan(), b.score.is_nan()) {
            (false, false) => b.score.total_cmp(&a.score),
            (a_nan, b_nan) => a_nan.cmp(&b_nan),
        });
        results.truncate(k);

        debug!(k, returned = results.len(), "index query");
        Ok(results)
    }

    /// Number of chunks in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Looks vectors up by exact text; counts calls.
    struct TableEmbedder {
        table: HashMap<&'static str, Vec<f32>>,
        calls: AtomicUsize,
    }

    impl TableEmbedder {
        fn new(pairs: &[(&'static str, [f32; 2])]) -> Self {
            Self {
                table: pairs.iter().map(|(k, v)| (*k, v.to_vec())).collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for TableEmbedder {
        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            texts
                .iter()
                .map(|t| {
                    self.table
                        .get(t)
                        .cloned()
                        .ok_or_else(|| RagError::Embedding(format!("no vector for {}", t)))
                })
                .collect()
        }

        fn model(&self) -> &str {
            "table"
        }
    }

    fn chunk(text: &str) -> Chunk {
        Chunk {
            text: text.to_string(),
            metadata: Default::default(),
            start_offset: 0,
        }
    }

    #[test]
    fn test_backend_selector() {
        assert_eq!("InMemory".parse::<IndexBackend>().unwrap(), IndexBackend::InMemory);
        let err = "Chroma".parse::<IndexBackend>().unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
        assert!(err.to_string().contains("Chroma"));
        assert_eq!(IndexBackend::InMemory.to_string(), "InMemory");
    }

    #[tokio::test]
    async fn test_query_orders_by_similarity() {
        let embedder = Arc::new(TableEmbedder::new(&[
            ("north", [0.0, 1.0]),
            ("east", [1.0, 0.0]),
            ("north-east", [1.0, 1.0]),
            ("q", [0.1, 1.0]),
        ]));
        let mut index = IndexBackend::InMemory.create(embedder);
        index
            .add(vec![chunk("east"), chunk("north-east"), chunk("north")])
            .await
            .unwrap();

        let hits = index.query("q", 2).await.unwrap();
        let texts: Vec<&str> = hits.iter().map(|h| h.entry.chunk.text.as_str()).collect();
        assert_eq!(texts, vec!["north", "north-east"]);
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let embedder = Arc::new(TableEmbedder::new(&[
            ("first", [1.0, 0.0]),
            ("second", [2.0, 0.0]),
            ("q", [1.0, 0.0]),
        ]));
        let mut index = InMemoryIndex::new(embedder);
        index.add(vec![chunk("first"), chunk("second")]).await.unwrap();

        let hits = index.query("q", 5).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].entry.chunk.text, "first");
        assert_eq!(hits[1].entry.chunk.text, "second");
    }

    #[tokio::test]
    async fn test_nan_similarity_ranks_last() {
        let embedder = Arc::new(TableEmbedder::new(&[
            ("broken", [f32::NAN, 1.0]),
            ("east", [1.0, 0.0]),
            ("north", [0.0, 1.0]),
            ("q", [0.1, 1.0]),
        ]));
        let mut index = InMemoryIndex::new(embedder);
        index
            .add(vec![chunk("broken"), chunk("east"), chunk("north")])
            .await
            .unwrap();

        let hits = index.query("q", 3).await.unwrap();
        let texts: Vec<&str> = hits.iter().map(|h| h.entry.chunk.text.as_str()).collect();
        assert_eq!(texts, vec!["north", "east", "broken"]);
        assert!(hits[2].score.is_nan());
    }

    #[tokio::test]
    async fn test_empty_index_does_not_embed() {
        let embedder = Arc::new(TableEmbedder::new(&[]));
        let index = InMemoryIndex::new(embedder.clone());

        let hits = index.query("anything", 10).await.unwrap();
        assert!(hits.is_empty());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let embedder = Arc::new(TableEmbedder::new(&[]));
        let mut index = InMemoryIndex::new(embedder);
        let err = index.add(vec![chunk("unknown")]).await.unwrap_err();
        assert!(err.is_generation_error());
        assert!(index.is_empty());
    }
}
