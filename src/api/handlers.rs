//! HTTP request handlers for the royalty distribution API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::allocation::{ContributionGraph, allocate_in_graph};
use crate::distribution::{DistributionOutcome, Distributor};
use crate::error::EngineError;

use super::request::{AllocateRequest, RunDistributionRequest};
use super::response::{AllocateResponse, ApiError, ApiErrorResponse, RunStatus};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/allocate", post(allocate_handler))
        .route("/distributions", post(distribution_handler))
        .with_state(state)
}

/// Turns a JSON extraction failure into a 400 response.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    (
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, "application/json")],
        Json(error),
    )
        .into_response()
}

fn engine_error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    let api_error: ApiErrorResponse = err.into();
    (
        api_error.status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(api_error.error),
    )
        .into_response()
}

/// Handler for POST /allocate.
///
/// Splits an amount across a creation's artists without touching any state.
async fn allocate_handler(
    State(state): State<AppState>,
    payload: Result<Json<AllocateRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing allocation preview");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    if request.amount < Decimal::ZERO {
        warn!(
            correlation_id = %correlation_id,
            amount = %request.amount,
            "Negative amount"
        );
        return (
            StatusCode::BAD_REQUEST,
            [(header::CONTENT_TYPE, "application/json")],
            Json(ApiError::validation_error("amount must not be negative")),
        )
            .into_response();
    }

    let office = state.back_office().lock().await;
    let Some(creation) = office.creation(&request.creation_id) else {
        return engine_error_response(
            correlation_id,
            EngineError::CreationNotFound {
                id: request.creation_id.to_string(),
            },
        );
    };

    match allocate_in_graph(&*office, state.config().rules(), creation, request.amount) {
        Ok(shares) => {
            info!(
                correlation_id = %correlation_id,
                creation = %request.creation_id,
                amount = %request.amount,
                artists = shares.len(),
                "Allocation preview computed"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(AllocateResponse {
                    creation_id: request.creation_id,
                    amount: request.amount,
                    shares,
                }),
            )
                .into_response()
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /distributions.
///
/// Runs one distribution. Returns 201 with the report, or 200 with
/// `{"status": "nothing_to_distribute"}` when the window is empty.
async fn distribution_handler(
    State(state): State<AppState>,
    payload: Result<Json<RunDistributionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing distribution request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let run_request = match request.resolve(Utc::now().date_naive()) {
        Ok(run_request) => run_request,
        Err(err) => return engine_error_response(correlation_id, err),
    };

    // one run at a time
    let mut office = state.back_office().lock().await;
    let start_time = Instant::now();
    match Distributor::new(state.config().config()).run(&mut *office, &run_request) {
        Ok(DistributionOutcome::NothingToDistribute) => {
            info!(
                correlation_id = %correlation_id,
                from_date = %run_request.from_date,
                thru_date = %run_request.thru_date,
                "Nothing to distribute"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(RunStatus::nothing_to_distribute()),
            )
                .into_response()
        }
        Ok(DistributionOutcome::Distributed(report)) => {
            info!(
                correlation_id = %correlation_id,
                distribution = %report.distribution.code,
                allocations = report.allocations.len(),
                allocated = %report.totals.allocated,
                duration_us = start_time.elapsed().as_micros(),
                "Distribution completed successfully"
            );
            (
                StatusCode::CREATED,
                [(header::CONTENT_TYPE, "application/json")],
                Json(*report),
            )
                .into_response()
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}
