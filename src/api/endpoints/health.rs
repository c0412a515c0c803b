//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::analysis_service::ActiveAnalysis;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub analysis_running: bool,
    pub credential_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_analysis: Option<ActiveAnalysis>,
}

/// `GET /api/health`: liveness plus analyzer readiness.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        analysis_running: ctx.core.is_analysis_running(),
        credential_configured: ctx.core.analyzer().is_configured(),
        current_analysis: ctx.core.current_analysis(),
    })
}
