//! Wiki RAG - retrieval-augmented generation of Wikipedia-style pages.
//!
//! Given a folder of PDF and HTML documents and a question, the pipeline
//! loads the documents, splits them into overlapping chunks, embeds them
//! into an in-memory index, retrieves the chunks most similar to the
//! question and asks an LLM to write a Wikipedia-style page from them.
//! The page is saved as markdown under a file name derived from the
//! question.
//!
//! Generated pages can then be scored against a reference page by two
//! LLM judges, with the scores appended to a CSV log that the analysis
//! module summarizes as boxplots.
//!
//! # Quick Start
//!
//! ```no_run
//! use wiki_rag::{config::Config, pipeline::RagPipeline};
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!
//!     let mut pipeline = RagPipeline::from_config(&config, "pages")?;
//!     pipeline.ingest(Path::new("corpus")).await?;
//!
//!     let path = pipeline
//!         .run("What is Ferritin?", |step| print!("{}", step))
//!         .await?;
//!     println!("Saved to {}", path.display());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **loader**: PDF (one document per page) and HTML files from a folder
//! - **chunker**: fixed-size character windows with overlap
//! - **index**: embeddings plus cosine-similarity top-k search
//! - **generator**: one LLM call over the retrieved context
//! - **evaluation**: two correctness judges and the CSV score log
//! - **analysis**: abbreviation column and score boxplots

pub mod analysis;
pub mod chunker;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod evaluation;
pub mod generator;
pub mod index;
pub mod llm;
pub mod loader;
pub mod logging;
pub mod persistence;
pub mod pipeline;

// Re-export commonly used types
pub use chunker::{Chunk, ChunkConfig, Chunker};
pub use config::Config;
pub use document::Document;
pub use embedding::{EmbeddingProvider, OpenAiEmbeddings};
pub use error::{RagError, Result};
pub use evaluation::{CorrectnessJudge, EvaluationLog, EvaluationRecord, Evaluator};
pub use generator::{Answer, AnswerGenerator};
pub use index::{IndexBackend, InMemoryIndex};
pub use llm::{LlmClient, TextGenerator};
pub use loader::load_documents;
pub use persistence::save_answer;
pub use pipeline::{IngestReport, PipelineStep, RagPipeline};
