//! HTTP handlers for the REST API.
//!
//! Reads lock the engine briefly and run inline. Creates and deletes fsync
//! the bookings snapshot, so they go to the blocking pool.

use std::time::Instant;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::NaiveDate;

use super::dto::{AvailabilityQuery, BookingsQuery, DeleteResponse};
use super::error::AppError;
use super::state::AppState;
use crate::model::{Availability, Booking, BookingFilter, BookingRequest, Resource, Stats};
use crate::observability::{Operation, record_request};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn observe<T>(op: Operation, started: Instant, ok: StatusCode, result: &Result<T, AppError>) {
    let status = match result {
        Ok(_) => ok,
        Err(e) => e.status(),
    };
    record_request(op, status.as_u16(), started);
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("Invalid date format. Use YYYY-MM-DD".into()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// =============================================================================
// Resources
// =============================================================================

/// GET /api/resources
pub async fn list_resources(State(state): State<AppState>) -> HandlerResult<Vec<Resource>> {
    let started = Instant::now();
    let result = Ok(Json(state.engine.list_resources()));
    observe(Operation::ListResources, started, StatusCode::OK, &result);
    result
}

// =============================================================================
// Bookings
// =============================================================================

/// GET /api/bookings?resource=&date=
///
/// `resource` matches either the id or the display name.
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingsQuery>,
) -> HandlerResult<Vec<Booking>> {
    let started = Instant::now();
    let result = non_empty(query.date)
        .as_deref()
        .map(parse_date)
        .transpose()
        .map(|date| {
            let filter = BookingFilter {
                resource: non_empty(query.resource),
                date,
            };
            Json(state.engine.list_bookings(&filter))
        });
    observe(Operation::ListBookings, started, StatusCode::OK, &result);
    result
}

/// POST /api/bookings
pub async fn create_booking(
    State(state): State<AppState>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let started = Instant::now();
    let result = create(state, payload).await;
    observe(Operation::CreateBooking, started, StatusCode::CREATED, &result);
    result
}

async fn create(
    state: AppState,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let Json(request) = payload?;
    let engine = state.engine;
    let booking = tokio::task::spawn_blocking(move || engine.create_booking(&request)).await??;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// DELETE /api/bookings/{id}
pub async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<DeleteResponse> {
    let started = Instant::now();
    let engine = state.engine;
    let deleted = tokio::task::spawn_blocking(move || engine.delete_booking(&id)).await;
    let result: HandlerResult<DeleteResponse> = match deleted {
        Ok(Ok(_)) => Ok(Json(DeleteResponse::deleted())),
        Ok(Err(e)) => Err(e.into()),
        Err(e) => Err(e.into()),
    };
    observe(Operation::DeleteBooking, started, StatusCode::OK, &result);
    result
}

// =============================================================================
// Availability & stats
// =============================================================================

/// GET /api/availability/{resource_id}?date=YYYY-MM-DD
pub async fn get_availability(
    State(state): State<AppState>,
    Path(resource_id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> HandlerResult<Availability> {
    let started = Instant::now();
    let result: HandlerResult<Availability> = match non_empty(query.date) {
        None => Err(AppError::BadRequest("Date parameter is required".into())),
        Some(raw) => parse_date(&raw).map(|date| Json(state.engine.availability(&resource_id, date))),
    };
    observe(Operation::Availability, started, StatusCode::OK, &result);
    result
}

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> HandlerResult<Stats> {
    let started = Instant::now();
    let result = Ok(Json(state.engine.stats()));
    observe(Operation::Stats, started, StatusCode::OK, &result);
    result
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound("Not found".into())
}
