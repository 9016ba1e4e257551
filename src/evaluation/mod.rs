//! Evaluation of generated pages against reference pages.
//!
//! This module provides:
//! - LLM-as-judge correctness scoring ([`CorrectnessJudge`])
//! - the cumulative score log ([`EvaluationLog`])
//! - the two-judge evaluation run ([`Evaluator`])

pub mod evaluator;
pub mod judge;
pub mod log;

pub use evaluator::{EvaluationOutcome, EvaluationRequest, Evaluator, REPORT_PREFIX, render_report, report_path};
pub use judge::{CorrectnessJudge, JudgeVerdict, TestCase, normalize_score};
pub use log::{EvaluationLog, EvaluationRecord, LOG_HEADER};
