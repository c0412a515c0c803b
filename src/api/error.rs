//! API error types with structured JSON responses.
//!
//! Analyzer and store failures reach the client only as a generic message
//! plus a code. Details go to the log.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::analysis::AnalysisError;
use crate::core_state::CoreError;
use crate::models::ValidationError;
use crate::store::StoreError;

/// Error response body: `{ "error": <message>, "code": <CODE> }`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("An analysis is already running")]
    AnalysisBusy,
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Upstream error: {0}")]
    Upstream(String),
    #[error("Upstream timed out after {0}s")]
    UpstreamTimeout(u64),
    #[error("Response parse error: {0}")]
    ResponseParse(String),
    #[error("Unsupported response shape: {0}")]
    UnsupportedResponseShape(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::AnalysisBusy => (
                StatusCode::CONFLICT,
                "ANALYSIS_BUSY",
                "Another analysis is already running, try again shortly".to_string(),
            ),
            ApiError::Configuration(detail) => {
                tracing::error!(detail, "Analyzer is not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION",
                    "API key is not configured".to_string(),
                )
            }
            ApiError::Upstream(detail) => {
                tracing::error!(detail, "Model service request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPSTREAM",
                    "AI service request failed".to_string(),
                )
            }
            ApiError::UpstreamTimeout(secs) => {
                tracing::error!(timeout_secs = secs, "Model service timed out");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "UPSTREAM_TIMEOUT",
                    "AI service did not respond in time".to_string(),
                )
            }
            ApiError::ResponseParse(detail) => {
                tracing::error!(detail, "Model response rejected");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RESPONSE_PARSE",
                    "Could not process the AI response".to_string(),
                )
            }
            ApiError::UnsupportedResponseShape(kind) => {
                tracing::error!(kind, "Model returned non-text content");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UNSUPPORTED_RESPONSE",
                    "Could not process the AI response".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message, code })).into_response()
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::EmptyInput => {
                ApiError::BadRequest(AnalysisError::EmptyInput.to_string())
            }
            AnalysisError::Configuration(detail) => ApiError::Configuration(detail),
            AnalysisError::Upstream(detail) => ApiError::Upstream(detail),
            AnalysisError::UpstreamTimeout(secs) => ApiError::UpstreamTimeout(secs),
            AnalysisError::UnsupportedResponseShape(kind) => {
                ApiError::UnsupportedResponseShape(kind)
            }
            // Raw text was logged by the analyzer.
            AnalysisError::ResponseParse { detail, .. } => ApiError::ResponseParse(detail),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AnalysisBusy => ApiError::AnalysisBusy,
            CoreError::Analysis(e) => e.into(),
            CoreError::Store(e) => e.into(),
            CoreError::Worker(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn empty_input_is_400_with_message() {
        let response = ApiError::from(AnalysisError::EmptyInput).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "medication list is empty");
        assert_eq!(json["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn configuration_is_500_generic() {
        let response =
            ApiError::from(AnalysisError::Configuration("API key is not set".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "API key is not configured");
        assert_eq!(json["code"], "CONFIGURATION");
    }

    #[tokio::test]
    async fn upstream_detail_is_hidden() {
        let response = ApiError::from(AnalysisError::Upstream("status 401: invalid x-api-key".into()))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "AI service request failed");
        assert!(!json.to_string().contains("x-api-key"));
    }

    #[tokio::test]
    async fn timeout_is_504() {
        let response = ApiError::from(AnalysisError::UpstreamTimeout(60)).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body_json(response).await["code"], "UPSTREAM_TIMEOUT");
    }

    #[tokio::test]
    async fn parse_error_never_echoes_raw_reply() {
        let err = AnalysisError::ResponseParse {
            raw: "SECRET MODEL OUTPUT".into(),
            detail: "expected value at line 1 column 1".into(),
        };
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Could not process the AI response");
        assert!(!json.to_string().contains("SECRET"));
    }

    #[tokio::test]
    async fn unsupported_shape_is_500() {
        let response =
            ApiError::from(AnalysisError::UnsupportedResponseShape("tool_use".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["code"], "UNSUPPORTED_RESPONSE");
    }

    #[tokio::test]
    async fn busy_is_409() {
        let response = ApiError::from(CoreError::AnalysisBusy).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["code"], "ANALYSIS_BUSY");
    }

    #[tokio::test]
    async fn store_errors_are_internal() {
        let err = StoreError::Io(std::io::Error::other("disk full"));
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Internal server error");
    }

    #[tokio::test]
    async fn validation_error_is_400() {
        let response = ApiError::from(ValidationError::NameTooShort).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Medication name must have at least 2 characters");
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let response = ApiError::NotFound("Medication not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
