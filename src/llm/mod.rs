//! LLM integration module.
//!
//! Provides an OpenAI-compatible client for chat completions, the
//! [`TextGenerator`] seam used by the generator and the judges, and the
//! prompt templates.

mod client;
mod prompts;

pub use client::{LlmClient, LlmResponse, Message, Role, TextGenerator, TokenUsage};
pub use prompts::Prompts;
