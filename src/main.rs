//! Wiki RAG CLI
//!
//! Generates a Wikipedia-style page for a question from a folder of documents.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use wiki_rag::{
    config::Config,
    llm::LlmClient,
    logging,
    pipeline::{PipelineStep, RagPipeline},
};

/// Wiki RAG - retrieval-augmented Wikipedia page generation
#[derive(Parser)]
#[command(name = "wiki-rag")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a document folder and generate a page for a question
    Generate(GenerateArgs),

    /// Test LLM connection
    Test,
}

/// Flags of `generate`. Unset options keep the configured value.
#[derive(Args)]
struct GenerateArgs {
    /// Folder containing the PDF and HTML documents
    #[arg(long)]
    input_dir: PathBuf,

    /// Folder receiving the generated page
    #[arg(long)]
    output_dir: PathBuf,

    /// The question the page should answer
    #[arg(long)]
    question: String,

    /// Chat model used for generation [config default: gpt-4o-mini]
    #[arg(long)]
    llm_model: Option<String>,

    /// Embedding model used for indexing and retrieval [config default: text-embedding-3-large]
    #[arg(long)]
    embeddings_model: Option<String>,

    /// Vector store backend [config default: InMemory]
    #[arg(long)]
    vector_store_type: Option<String>,

    /// Number of chunks retrieved as context [config default: 100]
    #[arg(long)]
    top_k: Option<usize>,

    /// Chunk size in characters [config default: 1000]
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Overlap between consecutive chunks in characters [config default: 200]
    #[arg(long)]
    chunk_overlap: Option<usize>,
}

impl GenerateArgs {
    /// Layer the flags that were given over the loaded configuration.
    fn apply(&self, config: &mut Config) {
        if let Some(model) = &self.llm_model {
            config.llm.model = model.clone();
        }
        if let Some(model) = &self.embeddings_model {
            config.embedding.model = model.clone();
        }
        if let Some(store) = &self.vector_store_type {
            config.pipeline.vector_store = store.clone();
        }
        if let Some(top_k) = self.top_k {
            config.pipeline.top_k = top_k;
        }
        if let Some(size) = self.chunk_size {
            config.pipeline.chunk_size = size;
        }
        if let Some(overlap) = self.chunk_overlap {
            config.pipeline.chunk_overlap = overlap;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Generate(args) => {
            let mut config = Config::load().context("Failed to load configuration")?;
            args.apply(&mut config);

            cmd_generate(config, args.input_dir, args.output_dir, args.question).await
        }
        Commands::Test => cmd_test().await,
    }
}

async fn cmd_generate(config: Config, input_dir: PathBuf, output_dir: PathBuf, question: String) -> Result<()> {
    println!("Generating page for: \"{}\"", question);
    println!("  LLM model:        {}", config.llm.model);
    println!("  Embeddings model: {}", config.embedding.model);
    println!("  Vector store:     {}", config.pipeline.vector_store);
    println!(
        "  Chunks:           {} chars, {} overlap, top {}",
        config.pipeline.chunk_size, config.pipeline.chunk_overlap, config.pipeline.top_k
    );
    println!();

    let mut pipeline = RagPipeline::from_config(&config, &output_dir).context("Invalid configuration")?;

    let start = Instant::now();
    let report = pipeline
        .ingest(&input_dir)
        .await
        .with_context(|| format!("Failed to index documents in '{}'", input_dir.display()))?;

    println!(
        "Indexed {} documents into {} chunks ({} unsupported files skipped) in {:.2?}\n",
        report.documents,
        report.chunks,
        report.skipped.len(),
        start.elapsed()
    );

    let output_path = pipeline
        .run(&question, |step: &PipelineStep| {
            print!("{}", step);
        })
        .await
        .context("Page generation failed")?;

    println!("\nPage saved to: {}", output_path.display());
    Ok(())
}

async fn cmd_test() -> Result<()> {
    println!("Testing LLM connection...\n");

    let config = Config::load().context("Failed to load configuration")?;

    println!("Configuration:");
    println!("  API Base:  {}", config.llm.api_base);
    println!("  Model:     {}", config.llm.model);
    println!(
        "  API Key:   {}...",
        config.llm.api_key.chars().take(8).collect::<String>()
    );
    println!();

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Ok(());
    }

    let client = LlmClient::new(config.llm).context("Failed to build HTTP client")?;

    println!("Sending test request...");
    match client.test_connection().await {
        Ok(()) => println!("Connection successful!"),
        Err(e) => println!("Connection failed: {}", e),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_args(extra: &[&str]) -> GenerateArgs {
        let mut argv = vec![
            "wiki-rag",
            "generate",
            "--input-dir",
            "docs",
            "--output-dir",
            "out",
            "--question",
            "What is Ferritin?",
        ];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Generate(args) => args,
            Commands::Test => panic!("expected generate"),
        }
    }

    fn yaml_config() -> Config {
        Config::from_yaml(
            r#"
llm:
  model: yaml-model
embedding:
  model: yaml-embeddings
pipeline:
  top_k: 7
  chunk_size: 500
  chunk_overlap: 50
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_unset_flags_keep_configured_values() {
        let mut config = yaml_config();
        generate_args(&[]).apply(&mut config);

        assert_eq!(config.llm.model, "yaml-model");
        assert_eq!(config.embedding.model, "yaml-embeddings");
        assert_eq!(config.pipeline.top_k, 7);
        assert_eq!(config.pipeline.chunk_size, 500);
        assert_eq!(config.pipeline.chunk_overlap, 50);
        assert_eq!(config.pipeline.vector_store, "InMemory");
    }

    #[test]
    fn test_given_flags_override_config() {
        let mut config = yaml_config();
        generate_args(&[
            "--llm-model",
            "gpt-4o",
            "--top-k",
            "20",
            "--chunk-size",
            "800",
            "--chunk-overlap",
            "100",
        ])
        .apply(&mut config);

        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.embedding.model, "yaml-embeddings");
        assert_eq!(config.pipeline.top_k, 20);
        assert_eq!(config.pipeline.chunk_size, 800);
        assert_eq!(config.pipeline.chunk_overlap, 100);
    }
}
