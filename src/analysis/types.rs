use serde::{Deserialize, Serialize};

use super::AnalysisError;
use crate::models::{Medication, Severity};

/// One medication as sent to the analyzer. Ids and timestamps are not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationEntry {
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
}

impl MedicationEntry {
    pub fn new(name: &str, dosage: &str, frequency: &str) -> Self {
        Self {
            name: name.to_string(),
            dosage: dosage.to_string(),
            frequency: frequency.to_string(),
        }
    }
}

impl From<&Medication> for MedicationEntry {
    fn from(med: &Medication) -> Self {
        Self {
            name: med.name.clone(),
            dosage: med.dosage.clone(),
            frequency: med.frequency.clone(),
        }
    }
}

/// A medication the model declined to analyze.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnknownMedication {
    pub name: String,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub severity: Severity,
    pub description: String,
    pub medications: Vec<String>,
    pub what_to_do: String,
}

/// Complete result of one analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionReport {
    #[serde(default)]
    pub unknown_medications: Vec<UnknownMedication>,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub questions_for_doctor: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl InteractionReport {
    /// Most urgent severity across all interactions, `None` when there are none.
    pub fn highest_severity(&self) -> Option<Severity> {
        self.interactions.iter().map(|i| i.severity).max()
    }

    /// Interactions the user should act on within days.
    pub fn urgent_count(&self) -> usize {
        self.interactions
            .iter()
            .filter(|i| i.severity.is_urgent())
            .count()
    }

    /// True when the model flagged `name` as unknown (case-insensitive).
    pub fn is_unknown(&self, name: &str) -> bool {
        self.unknown_medications
            .iter()
            .any(|u| names_match(&u.name, name))
    }
}

/// Medication names compare trimmed and case-insensitively.
pub fn names_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Text-generation backend (allows mocking).
pub trait LlmClient: Send + Sync {
    /// Send one prompt, return the text of the first content block.
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, AnalysisError>;

    /// Whether a credential is available. Checked before any call is made.
    fn is_configured(&self) -> bool {
        true
    }
}
