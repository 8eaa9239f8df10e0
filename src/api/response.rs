//! Response types for the royalty distribution API.
//!
//! This module defines the success bodies, the error response structures and
//! the mapping from engine errors to HTTP statuses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::allocation::Breakdown;
use crate::error::EngineError;
use crate::models::CreationId;

/// Response body for the `/allocate` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocateResponse {
    /// The creation allocated for.
    pub creation_id: CreationId,
    /// The amount that was split.
    pub amount: Decimal,
    /// Unrounded share per artist.
    pub shares: Breakdown,
}

/// Response body when a run found nothing to distribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatus {
    /// Always `nothing_to_distribute`.
    pub status: String,
}

impl RunStatus {
    /// The body returned for an empty window.
    pub fn nothing_to_distribute() -> Self {
        Self {
            status: "nothing_to_distribute".to_string(),
        }
    }
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfig { .. } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            EngineError::CreationNotFound { .. } => ApiErrorResponse::new(
                StatusCode::NOT_FOUND,
                ApiError::new("CREATION_NOT_FOUND", message),
            ),
            EngineError::PartyNotFound { .. } => ApiErrorResponse::new(
                StatusCode::NOT_FOUND,
                ApiError::new("PARTY_NOT_FOUND", message),
            ),
            EngineError::MissingAccount { .. } => ApiErrorResponse::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::with_details(
                    "MISSING_ACCOUNT",
                    message,
                    "Set up the account and re-run the distribution",
                ),
            ),
            EngineError::JournalNotFound { .. } => ApiErrorResponse::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("JOURNAL_NOT_FOUND", message),
            ),
            EngineError::PeriodNotFound { .. } => ApiErrorResponse::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("PERIOD_NOT_FOUND", message),
            ),
            EngineError::InvalidWindow { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_WINDOW", message),
            ),
            EngineError::OverlappingDistribution { .. } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::new("OVERLAPPING_DISTRIBUTION", message),
            ),
            EngineError::DerivationCycle { .. } | EngineError::DerivationTooDeep { .. } => {
                ApiErrorResponse::new(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ApiError::new("INVALID_DERIVATION", message),
                )
            }
            EngineError::CommitRejected { .. } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::new("COMMIT_REJECTED", message),
            ),
            EngineError::UnbalancedMove { .. } | EngineError::CalculationError { .. } => {
                ApiErrorResponse::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
                )
            }
        }
    }
}
