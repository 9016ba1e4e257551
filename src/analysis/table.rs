//! Tabular view of the evaluation log.

use crate::error::{RagError, Result};
use crate::evaluation::log::{ABBREVIATION_COLUMN, TOPIC_COLUMN};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Protein topic -> abbreviation.
pub const PROTEIN_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Alcohol_dehydrogenase", "ADH"),
    ("Beta_2_microglobulin", "B2M"),
    ("Catalase", "CAT"),
    ("Cytochrome_c", "CYTC"),
    ("Ferritin", "FT"),
    ("FtsZ", "FtsZ"),
    ("Green_fluorescent_protein", "GFP"),
    ("Hemoglobin", "HB"),
    ("Insulin", "INS"),
    ("Lactase", "LAC"),
    ("Myosin", "MYO"),
    ("p53", "p53"),
    ("Peripherin", "PRPH"),
    ("Ubiquitin", "UB"),
    ("UGGT", "UGGT"),
];

/// Look up the abbreviation of a topic (exact, case-sensitive).
pub fn abbreviation_for(topic: &str) -> Option<&'static str> {
    PROTEIN_ABBREVIATIONS
        .iter()
        .find(|(name, _)| *name == topic)
        .map(|(_, abbr)| *abbr)
}

/// Row filter on the grouping column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChunkFilter {
    /// Keep every row.
    #[default]
    All,
    /// Keep rows whose grouping column equals this value exactly.
    Value(String),
}

impl FromStr for ChunkFilter {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RagError::Config("filter value must not be empty".to_string()));
        }
        if s.eq_ignore_ascii_case("all") {
            Ok(ChunkFilter::All)
        } else {
            Ok(ChunkFilter::Value(s.to_string()))
        }
    }
}

impl fmt::Display for ChunkFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkFilter::All => write!(f, "all"),
            ChunkFilter::Value(v) => write!(f, "{}", v),
        }
    }
}

/// Headers plus string rows, read from and written to CSV.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LogTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl LogTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Read a CSV file with a header row.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(RagError::Log(format!("log file '{}' not found", path.display())));
        }

        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let rows = reader
            .records()
            .map(|record| Ok(record?.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>>>()?;

        Ok(Self { headers, rows })
    }

    /// Rewrite `path` with this table.
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush().map_err(|e| RagError::io(path, e))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| RagError::Config(format!("column '{}' not found in log", name)))
    }

    /// Values of a column as strings.
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.require_column(name)?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(idx).map(String::as_str).unwrap_or_default())
            .collect())
    }

    /// Values of a column parsed as finite numbers.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        self.column(name)?
            .into_iter()
            .map(|value| {
                value
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| {
                        RagError::Log(format!("non-numeric value '{}' in column '{}'", value, name))
                    })
            })
            .collect()
    }

    /// Put an `Abbreviation` column second, right after `Topic`.
    ///
    /// The other columns keep their relative order. An existing
    /// abbreviation column is recomputed, so repeating this is a no-op.
    /// Unknown topics get an empty cell.
    pub fn add_abbreviations(&mut self) -> Result<()> {
        let topic_idx = self.require_column(TOPIC_COLUMN)?;
        let existing = self.column_index(ABBREVIATION_COLUMN);
        let rest: Vec<usize> = (0..self.headers.len())
            .filter(|&i| i != topic_idx && Some(i) != existing)
            .collect();

        let mut headers = vec![TOPIC_COLUMN.to_string(), ABBREVIATION_COLUMN.to_string()];
        headers.extend(rest.iter().map(|&i| self.headers[i].clone()));

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let cell = |i: usize| row.get(i).cloned().unwrap_or_default();
                let topic = cell(topic_idx);
                let abbreviation = abbreviation_for(&topic).unwrap_or_default().to_string();
                let mut out = vec![topic, abbreviation];
                out.extend(rest.iter().map(|&i| cell(i)));
                out
            })
            .collect();

        self.headers = headers;
        self.rows = rows;
        Ok(())
    }

    /// Rows whose `column` matches `filter`.
    pub fn filtered(&self, column: &str, filter: &ChunkFilter) -> Result<LogTable> {
        let value = match filter {
            ChunkFilter::All => return Ok(self.clone()),
            ChunkFilter::Value(v) => v,
        };

        let idx = self.require_column(column)?;
        let rows = self
            .rows
            .iter()
            .filter(|row| row.get(idx).is_some_and(|cell| cell == value))
            .cloned()
            .collect();

        Ok(LogTable {
            headers: self.headers.clone(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn table(headers: &[&str], rows: &[&[&str]]) -> LogTable {
        LogTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_abbreviation_lookup() {
        assert_eq!(abbreviation_for("Ferritin"), Some("FT"));
        assert_eq!(abbreviation_for("Green_fluorescent_protein"), Some("GFP"));
        assert_eq!(abbreviation_for("ferritin"), None);
    }

    #[test]
    fn test_chunk_filter_parse() {
        assert_eq!("all".parse::<ChunkFilter>().unwrap(), ChunkFilter::All);
        assert_eq!("ALL".parse::<ChunkFilter>().unwrap(), ChunkFilter::All);
        assert_eq!(
            "50".parse::<ChunkFilter>().unwrap(),
            ChunkFilter::Value("50".to_string())
        );
        assert!("".parse::<ChunkFilter>().is_err());
        assert_eq!(ChunkFilter::Value("100".into()).to_string(), "100");
    }

    #[test]
    fn test_add_abbreviations_second_column_and_idempotent() {
        let mut t = table(
            &["Topic", "GEval 4o score", "GEval 4o-mini score"],
            &[&["Ferritin", "0.5", "0.75"], &["Mystery", "0.25", "0"]],
        );
        t.add_abbreviations().unwrap();
        let once = t.clone();
        t.add_abbreviations().unwrap();

        assert_eq!(t, once);
        assert_eq!(
            t.headers(),
            ["Topic", "Abbreviation", "GEval 4o score", "GEval 4o-mini score"]
        );
        assert_eq!(t.rows()[0], ["Ferritin", "FT", "0.5", "0.75"]);
        assert_eq!(t.rows()[1], ["Mystery", "", "0.25", "0"]);
    }

    #[test]
    fn test_add_abbreviations_requires_topic() {
        let mut t = table(&["Name"], &[&["x"]]);
        assert!(matches!(t.add_abbreviations(), Err(RagError::Config(_))));
    }

    #[test]
    fn test_filtered_exact_match() {
        let t = table(
            &["Topic", "k_chunks"],
            &[&["Insulin", "50"], &["Catalase", "100"], &["UGGT", "50"]],
        );

        let fifty = t.filtered("k_chunks", &ChunkFilter::Value("50".into())).unwrap();
        assert_eq!(fifty.len(), 2);

        let none = t.filtered("k_chunks", &ChunkFilter::Value("5".into())).unwrap();
        assert!(none.is_empty());

        assert_eq!(t.filtered("k_chunks", &ChunkFilter::All).unwrap(), t);
        assert!(t.filtered("missing", &ChunkFilter::Value("1".into())).is_err());
    }

    #[test]
    fn test_numeric_column() {
        let t = table(&["Topic", "score"], &[&["a", "0.5"], &["b", "1"]]);
        assert_eq!(t.numeric_column("score").unwrap(), vec![0.5, 1.0]);

        let bad = table(&["Topic", "score"], &[&["a", "n/a"]]);
        assert!(matches!(bad.numeric_column("score"), Err(RagError::Log(_))));
    }

    #[test]
    fn test_numeric_column_rejects_non_finite() {
        for cell in ["NaN", "inf", "-infinity"] {
            let t = table(&["Topic", "score"], &[&["a", "0.5"], &["b", cell]]);
            assert!(matches!(t.numeric_column("score"), Err(RagError::Log(_))), "{}", cell);
        }
    }

    #[test]
    fn test_read_write_preserves_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("evaluation.csv");
        std::fs::write(&path, "Topic,GEval 4o score,GEval 4o-mini score\nInsulin,0.5,0.25\n").unwrap();

        let mut t = LogTable::read(&path).unwrap();
        t.add_abbreviations().unwrap();
        t.write(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Topic,Abbreviation,GEval 4o score,GEval 4o-mini score\nInsulin,INS,0.5,0.25\n"
        );
    }

    #[test]
    fn test_read_missing_file() {
        assert!(matches!(
            LogTable::read(Path::new("/nonexistent/evaluation.csv")),
            Err(RagError::Log(_))
        ));
    }
}
