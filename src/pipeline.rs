//! Retrieve-then-generate orchestration.
//!
//! A run is split into named steps delivered to an observer as each one
//! completes: [`PipelineStep::Retrieve`] then [`PipelineStep::Generate`].
//! Steps never overlap, and any failure aborts the run.

use crate::chunker::{Chunk, ChunkConfig, Chunker};
use crate::config::Config;
use crate::embedding::OpenAiEmbeddings;
use crate::error::Result;
use crate::generator::{Answer, AnswerGenerator};
use crate::index::{IndexBackend, InMemoryIndex};
use crate::llm::LlmClient;
use crate::loader::load_documents;
use crate::persistence::save_answer;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Summary of building the index from an input directory.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub documents: usize,
    pub chunks: usize,
    /// Files skipped for having an unsupported format.
    pub skipped: Vec<PathBuf>,
}

/// A completed pipeline step.
#[derive(Debug, Clone)]
pub enum PipelineStep {
    /// Chunks retrieved for the question, most similar first.
    Retrieve { context: Vec<Chunk> },
    /// The generated page and where it was saved.
    Generate { answer: Answer, output_path: PathBuf },
}

impl PipelineStep {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineStep::Retrieve { .. } => "retrieve",
            PipelineStep::Generate { .. } => "generate",
        }
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStep::Retrieve { context } => {
                writeln!(f, "[retrieve] {} chunks", context.len())?;
                for chunk in context {
                    let preview: String = chunk.text.chars().take(80).collect();
                    writeln!(
                        f,
                        "  {} @{}: {}",
                        chunk.source(),
                        chunk.start_offset,
                        preview.replace('\n', " ")
                    )?;
                }
                Ok(())
            }
            PipelineStep::Generate {
                answer,
                output_path,
            } => {
                writeln!(
                    f,
                    "[generate] {} characters for \"{}\"",
                    answer.content.chars().count(),
                    answer.question
                )?;
                writeln!(f, "  saved to {}", output_path.display())
            }
        }
    }
}

/// Loader, chunker, index, generator and output directory wired together.
pub struct RagPipeline {
    chunker: Chunker,
    index: InMemoryIndex,
    generator: AnswerGenerator,
    output_dir: PathBuf,
    top_k: usize,
}

impl RagPipeline {
    pub fn new(
        chunker: Chunker,
        index: InMemoryIndex,
        generator: AnswerGenerator,
        output_dir: impl Into<PathBuf>,
        top_k: usize,
    ) -> Self {
        Self {
            chunker,
            index,
            generator,
            output_dir: output_dir.into(),
            top_k,
        }
    }

    /// Build a pipeline backed by the configured HTTP services.
    pub fn from_config(config: &Config, output_dir: impl Into<PathBuf>) -> Result<Self> {
        config.validate_pipeline()?;

        let backend: IndexBackend = config.pipeline.vector_store.parse()?;
        let chunker = Chunker::new(ChunkConfig::new(
            config.pipeline.chunk_size,
            config.pipeline.chunk_overlap,
        ))?;
        let embedder = Arc::new(OpenAiEmbeddings::new(config.embedding.clone())?);
        let llm = Arc::new(LlmClient::new(config.llm.clone())?);

        Ok(Self::new(
            chunker,
            backend.create(embedder),
            AnswerGenerator::new(llm, config.pipeline.target_audience.clone()),
            output_dir,
            config.pipeline.top_k,
        ))
    }

    pub fn index(&self) -> &InMemoryIndex {
        &self.index
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Load, chunk and embed every supported file of `input_dir`.
    pub async fn ingest(&mut self, input_dir: &Path) -> Result<IngestReport> {
        let corpus = load_documents(input_dir)?;
        if corpus.is_empty() {
            warn!(dir = %input_dir.display(), "no documents loaded");
        }

        let chunks = self.chunker.split_documents(&corpus.documents);
        let report = IngestReport {
            documents: corpus.documents.len(),
            chunks: chunks.len(),
            skipped: corpus.skipped,
        };

        self.index.add(chunks).await?;
        info!(
            documents = report.documents,
            chunks = report.chunks,
            "index built"
        );
        Ok(report)
    }

    /// Retrieve the `top_k` chunks most similar to `question`.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<Chunk>> {
        let hits = self.index.query(question, self.top_k).await?;
        Ok(hits.into_iter().map(|hit| hit.entry.chunk).collect())
    }

    /// Generate and save the page for `question` from `context`.
    pub async fn generate(&self, question: &str, context: &[Chunk]) -> Result<(Answer, PathBuf)> {
        let answer = self.generator.generate(question, context).await?;
        let output_path = save_answer(&self.output_dir, &answer.question, &answer.content)?;
        Ok((answer, output_path))
    }

    /// Run retrieve then generate, reporting each step; returns the saved path.
    pub async fn run<F>(&self, question: &str, mut observer: F) -> Result<PathBuf>
    where
        F: FnMut(&PipelineStep),
    {
        let context = self.retrieve(question).await?;
        observer(&PipelineStep::Retrieve {
            context: context.clone(),
        });

        let (answer, output_path) = self.generate(question, &context).await?;
        observer(&PipelineStep::Generate {
            answer,
            output_path: output_path.clone(),
        });

        Ok(output_path)
    }
}
