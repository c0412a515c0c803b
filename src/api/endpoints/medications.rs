//! Medication list endpoints.
//!
//! - `GET /api/medications`: full list, insertion order
//! - `POST /api/medications`: add
//! - `GET /api/medications/:id`: one record
//! - `PUT /api/medications/:id`: partial update
//! - `DELETE /api/medications/:id`: remove
//! - `POST /api/medications/analyze`: analyze the stored list

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::analysis::InteractionReport;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, MedicationListResponse};
use crate::models::{Medication, MedicationInput, MedicationUpdate};

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|e| ApiError::BadRequest(format!("Invalid medication ID: {e}")))
}

fn not_found() -> ApiError {
    ApiError::NotFound("Medication not found".into())
}

/// `GET /api/medications`
pub async fn list(
    State(ctx): State<ApiContext>,
) -> Result<Json<MedicationListResponse>, ApiError> {
    let medications = ctx.core.with_store(|store| store.list()).await?;
    Ok(Json(MedicationListResponse {
        total: medications.len(),
        medications,
    }))
}

/// `POST /api/medications`
pub async fn create(
    State(ctx): State<ApiContext>,
    payload: Result<Json<MedicationInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Medication>), ApiError> {
    let Json(input) = payload?;
    let input = input.validated()?;

    let med = ctx.core.with_store(move |store| store.add(input)).await?;
    Ok((StatusCode::CREATED, Json(med)))
}

/// `GET /api/medications/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(medication_id): Path<String>,
) -> Result<Json<Medication>, ApiError> {
    let id = parse_id(&medication_id)?;
    ctx.core
        .with_store(move |store| store.get(&id))
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// `PUT /api/medications/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(medication_id): Path<String>,
    payload: Result<Json<MedicationUpdate>, JsonRejection>,
) -> Result<Json<Medication>, ApiError> {
    let id = parse_id(&medication_id)?;
    let Json(update) = payload?;
    let update = update.validated()?;

    let updated = ctx
        .core
        .with_store(move |store| store.update(&id, update))
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(id = %updated.id, "Medication updated");
    Ok(Json(updated))
}

/// `DELETE /api/medications/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(medication_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&medication_id)?;
    if ctx.core.with_store(move |store| store.delete(&id)).await? {
        tracing::info!(%id, "Medication deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}

/// `POST /api/medications/analyze`
pub async fn analyze_stored(
    State(ctx): State<ApiContext>,
) -> Result<Json<InteractionReport>, ApiError> {
    let report = ctx.core.analyze_stored().await?;
    Ok(Json(report))
}
