//! Cumulative CSV log of evaluation scores.
//!
//! The log is append-only: rows keep append order and repeated topics are
//! not deduplicated. The header is written when the file is created or
//! found empty, never otherwise. One writer at a time is assumed; nothing
//! here locks the file.

use crate::analysis::abbreviation_for;
use crate::error::{RagError, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const TOPIC_COLUMN: &str = "Topic";
pub const PRIMARY_SCORE_COLUMN: &str = "GEval 4o score";
pub const SECONDARY_SCORE_COLUMN: &str = "GEval 4o-mini score";
pub const ABBREVIATION_COLUMN: &str = "Abbreviation";

/// Header written to a new log.
pub const LOG_HEADER: [&str; 3] = [TOPIC_COLUMN, PRIMARY_SCORE_COLUMN, SECONDARY_SCORE_COLUMN];

/// One evaluation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub topic: String,
    pub score_primary: f64,
    pub score_secondary: f64,
}

/// Handle on a log file with a known header.
#[derive(Debug, Clone)]
pub struct EvaluationLog {
    path: PathBuf,
    header: Vec<String>,
}

impl EvaluationLog {
    /// Open the log at `path`, creating it with [`LOG_HEADER`] if it is
    /// missing, empty, or has a blank header line.
    pub fn open_or_create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let exists = match fs::metadata(&path) {
            Ok(metadata) => metadata.len() > 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => return Err(RagError::io(&path, e)),
        };

        let header: Vec<String> = if exists {
            csv::Reader::from_path(&path)?
                .headers()?
                .iter()
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };

        if header.iter().all(|c| c.trim().is_empty()) {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| RagError::io(parent, e))?;
            }
            let mut writer = csv::Writer::from_path(&path)?;
            writer.write_record(LOG_HEADER)?;
            writer.flush().map_err(|e| RagError::io(&path, e))?;
            debug!(path = %path.display(), "created evaluation log");

            return Ok(Self {
                path,
                header: LOG_HEADER.iter().map(|c| c.to_string()).collect(),
            });
        }

        Ok(Self { path, header })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Append one row laid out according to the file's header.
    ///
    /// Known columns are filled from the record (and the abbreviation
    /// table); unknown columns are left empty.
    pub fn append(&self, record: &EvaluationRecord) -> Result<()> {
        let row: Vec<String> = self
            .header
            .iter()
            .map(|column| match column.as_str() {
                TOPIC_COLUMN => record.topic.clone(),
                PRIMARY_SCORE_COLUMN => record.score_primary.to_string(),
                SECONDARY_SCORE_COLUMN => record.score_secondary.to_string(),
                ABBREVIATION_COLUMN => abbreviation_for(&record.topic).unwrap_or_default().to_string(),
                _ => String::new(),
            })
            .collect();

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| RagError::io(&self.path, e))?;

        if !ends_with_newline(&mut file).map_err(|e| RagError::io(&self.path, e))? {
            file.write_all(b"\n").map_err(|e| RagError::io(&self.path, e))?;
        }

        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(&row)?;
        writer.flush().map_err(|e| RagError::io(&self.path, e))?;

        debug!(path = %self.path.display(), topic = %record.topic, "appended evaluation row");
        Ok(())
    }

    /// Read every data row back as records.
    pub fn records(&self) -> Result<Vec<EvaluationRecord>> {
        let column = |name: &str| {
            self.header
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| RagError::Log(format!("column '{}' missing from {}", name, self.path.display())))
        };
        let topic_idx = column(TOPIC_COLUMN)?;
        let primary_idx = column(PRIMARY_SCORE_COLUMN)?;
        let secondary_idx = column(SECONDARY_SCORE_COLUMN)?;

        let mut reader = csv::Reader::from_path(&self.path)?;
        reader
            .records()
            .map(|row| {
                let row = row?;
                let field = |idx: usize| row.get(idx).unwrap_or_default();
                Ok(EvaluationRecord {
                    topic: field(topic_idx).to_string(),
                    score_primary: parse_score(field(primary_idx))?,
                    score_secondary: parse_score(field(secondary_idx))?,
                })
            })
            .collect()
    }
}

fn parse_score(value: &str) -> Result<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| RagError::Log(format!("invalid score '{}'", value)))
}

/// True for an empty file or one whose last byte is `\n`.
fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(topic: &str, a: f64, b: f64) -> EvaluationRecord {
        EvaluationRecord {
            topic: topic.to_string(),
            score_primary: a,
            score_secondary: b,
        }
    }

    #[test]
    fn test_header_written_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("evaluation.csv");

        EvaluationLog::open_or_create(&path).unwrap().append(&record("Insulin", 0.5, 0.75)).unwrap();
        EvaluationLog::open_or_create(&path).unwrap().append(&record("Insulin", 0.25, 1.0)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Topic,GEval 4o score,GEval 4o-mini score\nInsulin,0.5,0.75\nInsulin,0.25,1\n"
        );
    }

    #[test]
    fn test_empty_existing_file_gets_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("evaluation.csv");
        fs::write(&path, "").unwrap();

        let log = EvaluationLog::open_or_create(&path).unwrap();
        assert_eq!(log.header(), LOG_HEADER);
        assert!(log.records().unwrap().is_empty());
    }

    #[test]
    fn test_blank_header_line_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("evaluation.csv");
        fs::write(&path, "\n").unwrap();

        let log = EvaluationLog::open_or_create(&path).unwrap();
        assert_eq!(log.header(), LOG_HEADER);
        log.append(&record("Ferritin", 0.5, 0.25)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Topic,GEval 4o score,GEval 4o-mini score\nFerritin,0.5,0.25\n");
    }

    #[test]
    fn test_append_follows_augmented_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("evaluation.csv");
        fs::write(
            &path,
            "Topic,Abbreviation,GEval 4o score,GEval 4o-mini score,k_chunks\nCatalase,CAT,0.5,0.5,50",
        )
        .unwrap();

        let log = EvaluationLog::open_or_create(&path).unwrap();
        log.append(&record("Ferritin", 0.75, 0.5)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.ends_with("Catalase,CAT,0.5,0.5,50\nFerritin,FT,0.75,0.5,\n"));
        assert_eq!(log.records().unwrap().len(), 2);
    }

    #[test]
    fn test_topics_with_commas_are_quoted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("evaluation.csv");

        let log = EvaluationLog::open_or_create(&path).unwrap();
        log.append(&record("Iron, storage", 0.0, 0.25)).unwrap();

        let records = log.records().unwrap();
        assert_eq!(records, vec![record("Iron, storage", 0.0, 0.25)]);
    }

    #[test]
    fn test_invalid_score_is_log_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("evaluation.csv");
        fs::write(&path, "Topic,GEval 4o score,GEval 4o-mini score\nInsulin,high,0.5\n").unwrap();

        let log = EvaluationLog::open_or_create(&path).unwrap();
        assert!(matches!(log.records(), Err(RagError::Log(_))));
    }
}
