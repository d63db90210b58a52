//! HTTP surface: JSON routes under `/api` over a shared [`Engine`](crate::engine::Engine).

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::{ApiError, AppError};
pub use router::create_router;
pub use state::AppState;
