//! Shared types for the API layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::MedicationEntry;
use crate::core_state::CoreState;
use crate::models::Medication;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// Body of `POST /api/analyze`. A missing list is treated as empty.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub medications: Option<Vec<MedicationEntry>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationListResponse {
    pub medications: Vec<Medication>,
    pub total: usize,
}
