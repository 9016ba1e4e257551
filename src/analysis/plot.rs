//! Boxplots of the judge score columns.

use super::table::{ChunkFilter, LogTable};
use crate::error::{RagError, Result};
use crate::evaluation::log::{PRIMARY_SCORE_COLUMN, SECONDARY_SCORE_COLUMN};
use plotters::data::Quartiles;
use plotters::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Score columns drawn side by side.
pub const SCORE_COLUMNS: [&str; 2] = [PRIMARY_SCORE_COLUMN, SECONDARY_SCORE_COLUMN];

/// Default grouping column for the filter.
pub const DEFAULT_FILTER_COLUMN: &str = "k_chunks";

const PLOT_SIZE: (u32, u32) = (900, 500);

/// What to do with the boxplots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlotMode {
    /// Summarize each column on the terminal.
    #[default]
    Show,
    /// Render an SVG file.
    Save,
}

impl std::str::FromStr for PlotMode {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "show" => Ok(PlotMode::Show),
            "save" => Ok(PlotMode::Save),
            other => Err(RagError::Config(format!("Unknown boxplot mode: {}", other))),
        }
    }
}

/// Five-number summary of one score column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Lower whisker, Q1, median, Q3, upper whisker.
    pub quartiles: [f32; 5],
}

impl ColumnSummary {
    fn from_values(column: &str, values: &[f64]) -> Self {
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        Self {
            column: column.to_string(),
            count,
            mean,
            quartiles: Quartiles::new(values).values(),
        }
    }
}

impl fmt::Display for ColumnSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [low, q1, median, q3, high] = self.quartiles;
        write!(
            f,
            "{}: n={} mean={:.3} whiskers=[{:.3}, {:.3}] q1={:.3} median={:.3} q3={:.3}",
            self.column, self.count, self.mean, low, high, q1, median, q3
        )
    }
}

/// Result of [`render_boxplots`].
#[derive(Debug, Clone, PartialEq)]
pub enum PlotOutcome {
    /// The filter matched no rows; nothing was rendered.
    NoData,
    /// Summaries for [`PlotMode::Show`].
    Shown(Vec<ColumnSummary>),
    /// SVG written for [`PlotMode::Save`].
    Saved(PathBuf),
}

/// Where to render and how to filter.
#[derive(Debug, Clone)]
pub struct BoxplotRequest {
    pub filter: ChunkFilter,
    pub filter_column: String,
    pub mode: PlotMode,
    /// Directory receiving saved plots.
    pub plot_dir: PathBuf,
}

impl Default for BoxplotRequest {
    fn default() -> Self {
        Self {
            filter: ChunkFilter::All,
            filter_column: DEFAULT_FILTER_COLUMN.to_string(),
            mode: PlotMode::Show,
            plot_dir: PathBuf::from("."),
        }
    }
}

/// `boxplots_k<filter>.svg`
pub fn plot_file_name(filter: &ChunkFilter) -> String {
    format!("boxplots_k{}.svg", filter)
}

/// Filter the table and draw one boxplot per score column.
pub fn render_boxplots(table: &LogTable, request: &BoxplotRequest) -> Result<PlotOutcome> {
    let data = table.filtered(&request.filter_column, &request.filter)?;
    if data.is_empty() {
        warn!(column = %request.filter_column, filter = %request.filter, "no rows match filter");
        return Ok(PlotOutcome::NoData);
    }

    let columns = SCORE_COLUMNS
        .iter()
        .map(|name| Ok((*name, data.numeric_column(name)?)))
        .collect::<Result<Vec<(&str, Vec<f64>)>>>()?;

    match request.mode {
        PlotMode::Show => Ok(PlotOutcome::Shown(
            columns
                .iter()
                .map(|(name, values)| ColumnSummary::from_values(name, values))
                .collect(),
        )),
        PlotMode::Save => {
            let path = request.plot_dir.join(plot_file_name(&request.filter));
            draw_svg(&path, &request.filter_column, &request.filter, &columns)?;
            info!(path = %path.display(), rows = data.len(), "saved boxplots");
            Ok(PlotOutcome::Saved(path))
        }
    }
}

fn plot_error(e: impl fmt::Display) -> RagError {
    RagError::Plot(e.to_string())
}

fn draw_svg(path: &Path, filter_column: &str, filter: &ChunkFilter, columns: &[(&str, Vec<f64>)]) -> Result<()> {
    let root = SVGBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let panels = root.split_evenly((1, columns.len()));
    for (panel, (name, values)) in panels.iter().zip(columns) {
        let quartiles = Quartiles::new(values.as_slice());

        let mut chart = ChartBuilder::on(panel)
            .caption(format!("{} ({} = {})", name, filter_column, filter), ("sans-serif", 18))
            .margin(15)
            .x_label_area_size(30)
            .y_label_area_size(45)
            .build_cartesian_2d((0i32..1).into_segmented(), -0.05f32..1.05f32)
            .map_err(plot_error)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&|_: &SegmentValue<i32>| String::new())
            .y_desc("score")
            .draw()
            .map_err(plot_error)?;

        chart
            .draw_series(std::iter::once(
                Boxplot::new_vertical(SegmentValue::CenterOf(0), &quartiles).width(40),
            ))
            .map_err(plot_error)?;
    }

    root.present().map_err(plot_error)
}
