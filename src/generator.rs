//! Answer generation from retrieved chunks.

use crate::chunker::Chunk;
use crate::error::Result;
use crate::llm::{Prompts, TextGenerator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// A generated page for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub content: String,
}

/// Renders the page prompt and makes a single generation call.
pub struct AnswerGenerator {
    llm: Arc<dyn TextGenerator>,
    target_audience: String,
}

impl AnswerGenerator {
    pub fn new(llm: Arc<dyn TextGenerator>, target_audience: impl Into<String>) -> Self {
        Self {
            llm,
            target_audience: target_audience.into(),
        }
    }

    pub fn target_audience(&self) -> &str {
        &self.target_audience
    }

    /// Format chunks as `source: ...\nchunk: ...` blocks separated by blank lines.
    pub fn render_context(chunks: &[Chunk]) -> String {
        chunks
            .iter()
            .map(|c| format!("source: {}\nchunk: {}", c.source(), c.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Fill the page template for `question`.
    pub fn render_prompt(&self, question: &str, chunks: &[Chunk]) -> String {
        let context = Self::render_context(chunks);
        Prompts::fill(
            Prompts::wikipedia_page(),
            &[
                ("topic", question),
                ("target_audience", &self.target_audience),
                ("context", &context),
            ],
        )
    }

    /// Generate the page. The model output is returned verbatim.
    ///
    /// Exactly one call is made to the text generator; its error, if
    /// any, is returned as is.
    pub async fn generate(&self, question: &str, chunks: &[Chunk]) -> Result<Answer> {
        let prompt = self.render_prompt(question, chunks);
        info!(model = self.llm.model(), chunks = chunks.len(), "generating page");

        let content = self
            .llm
            .complete(Some(Prompts::system_page_writer()), &prompt)
            .await?;

        Ok(Answer {
            question: question.to_string(),
            content,
        })
    }
}
