use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum length of a medication name after trimming.
pub const MIN_NAME_CHARS: usize = 2;

/// One entry of the user's medication list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: Uuid,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Medication {
    /// New record with a fresh id; `created_at == updated_at`.
    pub fn new(input: MedicationInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            dosage: input.dosage,
            frequency: input.frequency,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update and refresh `updated_at`.
    ///
    /// `updated_at` never moves backwards, even if the wall clock does.
    pub fn apply(&mut self, update: MedicationUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(dosage) = update.dosage {
            self.dosage = dosage;
        }
        if let Some(frequency) = update.frequency {
            self.frequency = frequency;
        }
        self.updated_at = Utc::now().max(self.updated_at);
    }
}

/// Field-level validation failure for user-entered medication data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Medication name must have at least 2 characters")]
    NameTooShort,
    #[error("Dosage is required")]
    DosageRequired,
    #[error("Frequency is required")]
    FrequencyRequired,
}

/// Data needed to add a medication. Missing fields deserialize as empty
/// and are rejected by [`MedicationInput::validated`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
}

impl MedicationInput {
    pub fn new(name: &str, dosage: &str, frequency: &str) -> Self {
        Self {
            name: name.to_string(),
            dosage: dosage.to_string(),
            frequency: frequency.to_string(),
        }
    }

    /// Trim every field and check the form rules.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let name = validate_name(&self.name)?;
        let dosage = validate_required(&self.dosage, ValidationError::DosageRequired)?;
        let frequency = validate_required(&self.frequency, ValidationError::FrequencyRequired)?;
        Ok(Self {
            name,
            dosage,
            frequency,
        })
    }
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
}

impl MedicationUpdate {
    /// Same rules as [`MedicationInput::validated`], for the fields present.
    pub fn validated(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: self.name.as_deref().map(validate_name).transpose()?,
            dosage: self
                .dosage
                .as_deref()
                .map(|d| validate_required(d, ValidationError::DosageRequired))
                .transpose()?,
            frequency: self
                .frequency
                .as_deref()
                .map(|f| validate_required(f, ValidationError::FrequencyRequired))
                .transpose()?,
        })
    }
}

fn validate_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.chars().count() < MIN_NAME_CHARS {
        return Err(ValidationError::NameTooShort);
    }
    Ok(name.to_string())
}

fn validate_required(raw: &str, err: ValidationError) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(err);
    }
    Ok(value.to_string())
}
