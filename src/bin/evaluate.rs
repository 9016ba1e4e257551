//! Evaluation CLI: scores a generated page against a reference page.
//!
//! Usage:
//!   evaluate --question <Q> --to-be-evaluated <page.md> --reference-text <ref.md> --keyword <topic>
//!
//! Options:
//!   --csv                    # Append the scores to the log
//!   --csv-path <path>        # Log file (default: evaluation.csv)
//!   --primary-model <name>   # First judge (default: gpt-4o)
//!   --secondary-model <name> # Second judge (default: gpt-4o-mini)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use wiki_rag::config::Config;
use wiki_rag::evaluation::{EvaluationRequest, Evaluator};
use wiki_rag::logging;

#[derive(Parser)]
#[command(name = "evaluate")]
#[command(about = "Score a generated page against a reference with two LLM judges", long_about = None)]
struct Cli {
    /// Question the page was generated for
    #[arg(long)]
    question: String,

    /// Generated page to evaluate
    #[arg(long)]
    to_be_evaluated: PathBuf,

    /// Reference page
    #[arg(long)]
    reference_text: PathBuf,

    /// Topic label recorded in the log
    #[arg(long)]
    keyword: String,

    /// Append the scores to the CSV log
    #[arg(long)]
    csv: bool,

    /// CSV log path
    #[arg(long)]
    csv_path: Option<PathBuf>,

    /// Model of the first judge
    #[arg(long)]
    primary_model: Option<String>,

    /// Model of the second judge
    #[arg(long)]
    secondary_model: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(path) = cli.csv_path {
        config.evaluation.log_path = path;
    }
    if let Some(model) = cli.primary_model {
        config.evaluation.primary_model = model;
    }
    if let Some(model) = cli.secondary_model {
        config.evaluation.secondary_model = model;
    }

    println!("LLM API Base: {}", config.llm.api_base);
    println!(
        "Judges: {} / {}",
        config.evaluation.primary_model, config.evaluation.secondary_model
    );
    println!("Evaluating {:?} against {:?}...", cli.to_be_evaluated, cli.reference_text);

    let evaluator = Evaluator::from_config(&config).context("Invalid configuration")?;
    let request = EvaluationRequest {
        question: cli.question,
        candidate_path: cli.to_be_evaluated,
        reference_path: cli.reference_text,
        topic: cli.keyword,
        record_to_log: cli.csv,
    };

    let outcome = evaluator.evaluate(&request).await.context("Evaluation failed")?;

    println!();
    println!("{} correctness score: {}", outcome.primary.model, outcome.primary.score);
    println!("  Reason: {}", outcome.primary.reason);
    println!("{} correctness score: {}", outcome.secondary.model, outcome.secondary.score);
    println!("  Reason: {}", outcome.secondary.reason);
    println!();
    println!("Report saved to {:?}", outcome.report_path);

    if outcome.logged.is_some() {
        println!("Scores appended to {:?}", evaluator.log_path());
    }

    Ok(())
}
