//! LLM-as-judge correctness scoring.

use crate::config::LlmConfig;
use crate::error::{RagError, Result};
use crate::llm::{LlmClient, Prompts, TextGenerator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Inputs to one correctness measurement.
#[derive(Debug, Clone, Copy)]
pub struct TestCase<'a> {
    /// The question the page answers.
    pub input: &'a str,
    /// The generated page.
    pub actual_output: &'a str,
    /// The reference page.
    pub expected_output: &'a str,
}

/// A judge's score and rationale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeVerdict {
    /// Model that produced the verdict.
    pub model: String,
    /// Normalized score in `[0, 1]`.
    pub score: f64,
    /// Explanation from the judge.
    pub reason: String,
}

/// Correctness judge bound to a single model.
pub struct CorrectnessJudge {
    client: Arc<dyn TextGenerator>,
}

impl CorrectnessJudge {
    /// Create a new judge with the given text generator.
    pub fn new(client: Arc<dyn TextGenerator>) -> Self {
        Self { client }
    }

    /// Create from LLM config, replacing its model with `model`.
    pub fn from_config(config: &LlmConfig, model: &str) -> Result<Self> {
        Ok(Self::new(Arc::new(LlmClient::new(config.with_model(model))?)))
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Score the actual output against the expected output.
    pub async fn measure(&self, case: TestCase<'_>) -> Result<JudgeVerdict> {
        let prompt = Prompts::fill(
            Prompts::correctness_judge(),
            &[
                ("input", case.input),
                ("actual_output", case.actual_output),
                ("expected_output", case.expected_output),
            ],
        );

        let response = self
            .client
            .complete(Some(Prompts::system_judge()), &prompt)
            .await?;
        let (score, reason) = Self::parse_verdict(&response)?;

        info!(model = self.model(), score, "correctness measured");
        Ok(JudgeVerdict {
            model: self.model().to_string(),
            score,
            reason,
        })
    }

    /// Parse `{"score": 1-5, "reason": ...}` into a normalized score.
    fn parse_verdict(response: &str) -> Result<(f64, String)> {
        let json_str = Self::extract_json(response);

        #[derive(Deserialize)]
        struct RawVerdict {
            score: f64,
            #[serde(default)]
            reason: String,
        }

        let raw: RawVerdict = serde_json::from_str(&json_str).map_err(|e| {
            RagError::LlmParse(format!(
                "Failed to parse judge response: {}. Response: {}",
                e, response
            ))
        })?;

        if !raw.score.is_finite() {
            return Err(RagError::LlmParse(format!(
                "Judge score is not a number: {}",
                response
            )));
        }

        Ok((normalize_score(raw.score), raw.reason))
    }

    /// Extract JSON from response.
    fn extract_json(response: &str) -> String {
        let response = response.trim();

        if response.starts_with("```json") {
            if let Some(end) = response.rfind("```") {
                let start = "```json".len();
                if end > start {
                    return response[start..end].trim().to_string();
                }
            }
        }

        if response.starts_with("```") {
            if let Some(end) = response.rfind("```") {
                let start = response.find('\n').map(|n| n + 1).unwrap_or(3);
                if end > start {
                    return response[start..end].trim().to_string();
                }
            }
        }

        if let Some(start) = response.find('{') {
            if let Some(end) = response.rfind('}') {
                if end > start {
                    return response[start..=end].to_string();
                }
            }
        }

        response.to_string()
    }
}

/// Map a 1-5 rubric score onto `[0, 1]`.
pub fn normalize_score(raw: f64) -> f64 {
    (raw.clamp(1.0, 5.0) - 1.0) / 4.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verdict() {
        let response = r#"{"score": 4, "reason": "Mostly accurate"}"#;
        let (score, reason) = CorrectnessJudge::parse_verdict(response).unwrap();

        assert_eq!(score, 0.75);
        assert_eq!(reason, "Mostly accurate");
    }

    #[test]
    fn test_parse_fenced_verdict() {
        let response = "```json\n{\"score\": 5, \"reason\": \"Exact\"}\n```";
        let (score, _) = CorrectnessJudge::parse_verdict(response).unwrap();
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_parse_verdict_with_prose() {
        let response = "Here is my evaluation: {\"score\": 1, \"reason\": \"Wrong facts\"} Thanks.";
        let (score, reason) = CorrectnessJudge::parse_verdict(response).unwrap();
        assert_eq!(score, 0.0);
        assert_eq!(reason, "Wrong facts");
    }

    #[test]
    fn test_parse_verdict_rejects_garbage() {
        let err = CorrectnessJudge::parse_verdict("I cannot grade this.").unwrap_err();
        assert!(matches!(err, RagError::LlmParse(_)));
    }

    #[test]
    fn test_normalize_score_clamps() {
        assert_eq!(normalize_score(3.0), 0.5);
        assert_eq!(normalize_score(0.0), 0.0);
        assert_eq!(normalize_score(9.0), 1.0);
    }
}
