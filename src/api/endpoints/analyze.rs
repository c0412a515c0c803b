//! `POST /api/analyze`: analyze a submitted medication list.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::analysis::InteractionReport;
use crate::analysis_service::AnalysisSource;
use crate::api::error::ApiError;
use crate::api::types::{AnalyzeRequest, ApiContext};

pub async fn analyze(
    State(ctx): State<ApiContext>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<InteractionReport>, ApiError> {
    let Json(request) = payload?;
    let entries = request.medications.unwrap_or_default();

    let report = ctx.core.analyze(AnalysisSource::Submitted, entries).await?;
    Ok(Json(report))
}
