use std::sync::Arc;
use std::time::Instant;

use super::parser::parse_model_response;
use super::prompt::build_interaction_prompt;
use super::types::{InteractionReport, LlmClient, MedicationEntry};
use super::validation::validate_report;
use super::AnalysisError;
use crate::config::AnalyzerConfig;
use crate::models::PromptLanguage;

/// Runs one interaction analysis:
/// check input → check credential → prompt → model → parse → validate
pub struct InteractionAnalyzer {
    llm: Arc<dyn LlmClient>,
    model: String,
    max_tokens: u32,
    language: PromptLanguage,
}

impl InteractionAnalyzer {
    pub fn new(llm: Arc<dyn LlmClient>, config: &AnalyzerConfig) -> Self {
        Self {
            llm,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            language: config.language,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn language(&self) -> PromptLanguage {
        self.language
    }

    pub fn is_configured(&self) -> bool {
        self.llm.is_configured()
    }

    /// Analyze `medications` for interactions. Blocking; makes exactly one
    /// model call on valid input and none otherwise.
    pub fn analyze(&self, medications: &[MedicationEntry]) -> Result<InteractionReport, AnalysisError> {
        if medications.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        if !self.llm.is_configured() {
            return Err(AnalysisError::Configuration("API key is not set".into()));
        }

        let start = Instant::now();
        let prompt = build_interaction_prompt(medications, self.language)?;

        let raw = self.llm.generate(&self.model, &prompt, self.max_tokens)?;

        let object = parse_model_response(&raw).inspect_err(|e| {
            if let AnalysisError::ResponseParse { raw, detail } = e {
                tracing::error!(
                    model = %self.model,
                    detail = %detail,
                    raw_response = %raw,
                    "Model response could not be parsed"
                );
            }
        })?;

        let validated = validate_report(&object);
        let report = validated.report;

        tracing::info!(
            model = %self.model,
            medications = medications.len(),
            interactions = report.interactions.len(),
            unknown = report.unknown_medications.len(),
            dropped = validated.warnings.len(),
            highest_severity = report.highest_severity().map(|s| s.as_str()).unwrap_or("none"),
            severity_label = report
                .highest_severity()
                .map(|s| s.label(self.language))
                .unwrap_or("-"),
            urgent = report.urgent_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Interaction analysis complete"
        );

        Ok(report)
    }
}
