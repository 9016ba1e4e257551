//! Post-hoc analysis of the evaluation log.
//!
//! - [`LogTable`] reads and rewrites the CSV log
//! - [`LogTable::add_abbreviations`] adds the protein abbreviation column
//! - [`render_boxplots`] draws the score distributions, optionally filtered

pub mod plot;
pub mod table;

pub use plot::{
    BoxplotRequest, ColumnSummary, DEFAULT_FILTER_COLUMN, PlotMode, PlotOutcome, SCORE_COLUMNS, plot_file_name,
    render_boxplots,
};
pub use table::{ChunkFilter, LogTable, PROTEIN_ABBREVIATIONS, abbreviation_for};
