//! Query strings and response bodies that only exist at the HTTP boundary.

use serde::{Deserialize, Serialize};

/// `GET /api/bookings` filters. Empty values mean "no filter".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingsQuery {
    pub resource: Option<String>,
    pub date: Option<String>,
}

/// `GET /api/availability/{resource_id}` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailabilityQuery {
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

impl DeleteResponse {
    pub fn deleted() -> Self {
        Self {
            message: "Booking deleted successfully".into(),
        }
    }
}
