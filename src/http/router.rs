//! Router configuration for the HTTP API.

use std::any::Any;

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use super::error::AppError;
use super::handlers;
use super::state::AppState;

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    AppError::Internal(format!("handler panicked: {detail}")).into_response()
}

/// Create the application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/resources", get(handlers::list_resources))
        .route(
            "/bookings",
            get(handlers::list_bookings).post(handlers::create_booking),
        )
        .route("/bookings/{id}", delete(handlers::delete_booking))
        .route("/availability/{resource_id}", get(handlers::get_availability))
        .route("/stats", get(handlers::get_stats));

    Router::new()
        .nest("/api", api)
        .fallback(handlers::not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
