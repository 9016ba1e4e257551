//! Analysis CLI for the evaluation log.
//!
//! Usage:
//!   analyze --df-filename evaluation.csv --abbreviation
//!   analyze --df-filename evaluation.csv --boxplots save --k-chunks 50

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use wiki_rag::analysis::{BoxplotRequest, ChunkFilter, DEFAULT_FILTER_COLUMN, LogTable, PlotMode, PlotOutcome, render_boxplots};
use wiki_rag::logging;

#[derive(Parser)]
#[command(name = "analyze")]
#[command(about = "Summarize evaluation scores", long_about = None)]
struct Cli {
    /// Evaluation log (CSV)
    #[arg(long)]
    df_filename: PathBuf,

    /// Draw score boxplots: `show` prints a summary, `save` writes an SVG
    #[arg(long, num_args = 0..=1, default_missing_value = "show")]
    boxplots: Option<PlotMode>,

    /// Add or refresh the abbreviation column and rewrite the log
    #[arg(long)]
    abbreviation: bool,

    /// Keep only rows whose filter column equals this value (`all` keeps every row)
    #[arg(long, default_value = "all")]
    k_chunks: ChunkFilter,

    /// Column the filter applies to
    #[arg(long, default_value = DEFAULT_FILTER_COLUMN)]
    filter_column: String,

    /// Directory receiving saved plots
    #[arg(long, default_value = ".")]
    plot_dir: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut table = LogTable::read(&cli.df_filename)
        .with_context(|| format!("Failed to read {:?}", cli.df_filename))?;
    println!("Loaded {} rows from {:?}", table.len(), cli.df_filename);

    if cli.abbreviation {
        table.add_abbreviations().context("Failed to add abbreviations")?;
        table
            .write(&cli.df_filename)
            .with_context(|| format!("Failed to rewrite {:?}", cli.df_filename))?;
        println!("Abbreviation column written to {:?}", cli.df_filename);
    }

    if let Some(mode) = cli.boxplots {
        let request = BoxplotRequest {
            filter: cli.k_chunks,
            filter_column: cli.filter_column,
            mode,
            plot_dir: cli.plot_dir,
        };

        match render_boxplots(&table, &request).context("Failed to draw boxplots")? {
            PlotOutcome::NoData => {
                println!("No data available for {} = {}", request.filter_column, request.filter);
            }
            PlotOutcome::Shown(summaries) => {
                println!("Score distribution ({} = {}):", request.filter_column, request.filter);
                for summary in summaries {
                    println!("  {}", summary);
                }
            }
            PlotOutcome::Saved(path) => println!("Boxplots saved to {:?}", path),
        }
    }

    Ok(())
}
