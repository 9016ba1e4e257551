//! Scoring a generated page against a reference with two judges.

use super::judge::{CorrectnessJudge, JudgeVerdict, TestCase};
use super::log::{EvaluationLog, EvaluationRecord};
use crate::config::Config;
use crate::error::{RagError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Marker prepended to the file name of annotated copies.
pub const REPORT_PREFIX: &str = "[Eval]";

/// One evaluation run.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    /// Question the page was generated for.
    pub question: String,
    /// Generated page.
    pub candidate_path: PathBuf,
    /// Reference page.
    pub reference_path: PathBuf,
    /// Label stored in the log's topic column.
    pub topic: String,
    /// Whether to append the scores to the log.
    pub record_to_log: bool,
}

/// Verdicts and where they were written.
#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    pub primary: JudgeVerdict,
    pub secondary: JudgeVerdict,
    /// Annotated copy of the candidate.
    pub report_path: PathBuf,
    /// The appended row, when logging was requested.
    pub logged: Option<EvaluationRecord>,
}

/// Runs both judges and records their scores.
pub struct Evaluator {
    primary: CorrectnessJudge,
    secondary: CorrectnessJudge,
    log_path: PathBuf,
}

impl Evaluator {
    pub fn new(primary: CorrectnessJudge, secondary: CorrectnessJudge, log_path: impl Into<PathBuf>) -> Self {
        Self {
            primary,
            secondary,
            log_path: log_path.into(),
        }
    }

    /// Judges on the configured endpoint, differing only in model.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            CorrectnessJudge::from_config(&config.llm, &config.evaluation.primary_model)?,
            CorrectnessJudge::from_config(&config.llm, &config.evaluation.secondary_model)?,
            config.evaluation.log_path.clone(),
        ))
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Score the candidate, write the annotated copy and optionally log.
    pub async fn evaluate(&self, request: &EvaluationRequest) -> Result<EvaluationOutcome> {
        let actual_output = read_text(&request.candidate_path)?;
        let expected_output = read_text(&request.reference_path)?;

        let case = TestCase {
            input: &request.question,
            actual_output: &actual_output,
            expected_output: &expected_output,
        };

        let primary = self.primary.measure(case).await?;
        let secondary = self.secondary.measure(case).await?;

        let report_path = report_path(&request.candidate_path);
        let report = render_report(&actual_output, &primary, &secondary);
        fs::write(&report_path, report).map_err(|e| RagError::io(&report_path, e))?;
        info!(path = %report_path.display(), "wrote evaluation report");

        let logged = if request.record_to_log {
            let record = EvaluationRecord {
                topic: request.topic.clone(),
                score_primary: primary.score,
                score_secondary: secondary.score,
            };
            EvaluationLog::open_or_create(&self.log_path)?.append(&record)?;
            info!(log = %self.log_path.display(), topic = %record.topic, "logged scores");
            Some(record)
        } else {
            None
        };

        Ok(EvaluationOutcome {
            primary,
            secondary,
            report_path,
            logged,
        })
    }
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| RagError::io(path, e))
}

/// `<dir>/[Eval]<file name>` next to the candidate.
pub fn report_path(candidate: &Path) -> PathBuf {
    let name = candidate
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    candidate.with_file_name(format!("{}{}", REPORT_PREFIX, name))
}

/// Candidate text followed by the evaluation footer.
pub fn render_report(candidate: &str, primary: &JudgeVerdict, secondary: &JudgeVerdict) -> String {
    let mut report = candidate.to_string();
    if !report.is_empty() && !report.ends_with('\n') {
        report.push('\n');
    }
    report.push_str(&format!(
        "\n## Evaluation\n\
         GEval 4o correctness score: {}\n\
         Reason: {}\n\n\
         GEval 4o-mini correctness score: {}\n\
         Reason: {}\n",
        primary.score, primary.reason, secondary.score, secondary.reason
    ));
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(model: &str, score: f64, reason: &str) -> JudgeVerdict {
        JudgeVerdict {
            model: model.to_string(),
            score,
            reason: reason.to_string(),
        }
    }

    #[test]
    fn test_report_path_prefixes_file_name() {
        assert_eq!(
            report_path(Path::new("out/What is Ferritin_.md")),
            PathBuf::from("out/[Eval]What is Ferritin_.md")
        );
        assert_eq!(report_path(Path::new("page.md")), PathBuf::from("[Eval]page.md"));
    }

    #[test]
    fn test_render_report_uses_each_metric() {
        let report = render_report(
            "# Wikipedia page\nFerritin.",
            &verdict("gpt-4o", 0.75, "Accurate"),
            &verdict("gpt-4o-mini", 0.5, "Missing history"),
        );
        assert_eq!(
            report,
            "# Wikipedia page\nFerritin.\n\n## Evaluation\n\
             GEval 4o correctness score: 0.75\nReason: Accurate\n\n\
             GEval 4o-mini correctness score: 0.5\nReason: Missing history\n"
        );
    }
}
