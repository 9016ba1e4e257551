//! Property tests for chunk windows and similarity ranking.

use async_trait::async_trait;
use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use wiki_rag::chunker::{Chunk, ChunkConfig, Chunker};
use wiki_rag::embedding::EmbeddingProvider;
use wiki_rag::error::{RagError, Result};
use wiki_rag::index::InMemoryIndex;

/// Looks embeddings up by exact text.
struct TableEmbedder {
    table: HashMap<String, Vec<f32>>,
}

#[async_trait]
impl EmbeddingProvider for TableEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts
            .iter()
            .map(|text| {
                self.table
                    .get(*text)
                    .cloned()
                    .ok_or_else(|| RagError::Embedding(format!("no vector for '{}'", text)))
            })
            .collect()
    }

    fn model(&self) -> &str {
        "table"
    }
}

fn chunk(text: String) -> Chunk {
    Chunk {
        text,
        metadata: Default::default(),
        start_offset: 0,
    }
}

fn chunk_config() -> impl Strategy<Value = ChunkConfig> {
    (1usize..40).prop_flat_map(|size| (Just(size), 0..size).prop_map(|(size, overlap)| ChunkConfig::new(size, overlap)))
}

proptest! {
    #[test]
    fn windows_overlap_and_reconstruct(text in "[a-zé ]{0,300}", config in chunk_config()) {
        let chunker = Chunker::new(config).unwrap();
        let windows = chunker.split_text(&text);

        let mut rebuilt = String::new();
        for (i, (start, window)) in windows.iter().enumerate() {
            prop_assert_eq!(*start, i * config.stride());
            prop_assert!(window.chars().count() <= config.chunk_size);
            if i == 0 {
                rebuilt.push_str(window);
            } else {
                rebuilt.extend(window.chars().skip(config.chunk_overlap));
            }
        }
        prop_assert_eq!(&rebuilt, &text);

        for pair in windows.windows(2) {
            let prev: Vec<char> = pair[0].1.chars().collect();
            let next: Vec<char> = pair[1].1.chars().collect();
            prop_assert_eq!(prev.len(), config.chunk_size);
            let overlap = config.chunk_overlap.min(next.len());
            prop_assert_eq!(&prev[prev.len() - config.chunk_overlap..][..overlap], &next[..overlap]);
        }
    }

    #[test]
    fn query_is_bounded_ranked_and_drawn_from_index(
        vectors in prop::collection::vec(prop::collection::vec(-1.0f32..1.0, 4), 1..20),
        query in prop::collection::vec(-1.0f32..1.0, 4),
        k in 0usize..25,
    ) {
        let mut table: HashMap<String, Vec<f32>> = vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("chunk-{}", i), v.clone()))
            .collect();
        table.insert("query".to_string(), query);

        let mut index = InMemoryIndex::new(Arc::new(TableEmbedder { table }));
        let chunks: Vec<Chunk> = (0..vectors.len()).map(|i| chunk(format!("chunk-{}", i))).collect();
        tokio_test::block_on(index.add(chunks.clone())).unwrap();

        let results = tokio_test::block_on(index.query("query", k)).unwrap();

        prop_assert_eq!(results.len(), k.min(vectors.len()));
        for pair in results.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
        for hit in &results {
            prop_assert!(chunks.contains(&hit.entry.chunk));
        }
    }
}
