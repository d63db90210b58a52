use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: API requests handled. Labels: operation, status.
pub const REQUESTS_TOTAL: &str = "labsync_requests_total";

/// Histogram: request latency in seconds. Labels: operation.
pub const REQUEST_DURATION_SECONDS: &str = "labsync_request_duration_seconds";

// ── Booking lifecycle ───────────────────────────────────────────

/// Counter: bookings successfully created.
pub const BOOKINGS_CREATED_TOTAL: &str = "labsync_bookings_created_total";

/// Counter: create requests rejected because the slot was taken.
pub const BOOKING_CONFLICTS_TOTAL: &str = "labsync_booking_conflicts_total";

/// Gauge: bookings currently stored.
pub const BOOKINGS_ACTIVE: &str = "labsync_bookings_active";

// ── Storage ─────────────────────────────────────────────────────

/// Histogram: whole-document snapshot rewrite duration in seconds.
pub const SNAPSHOT_WRITE_DURATION_SECONDS: &str = "labsync_snapshot_write_duration_seconds";

/// Install the Prometheus exporter on `port`. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), BuildError> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

/// The API operations, as metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListResources,
    ListBookings,
    CreateBooking,
    DeleteBooking,
    Availability,
    Stats,
}

impl Operation {
    pub fn label(self) -> &'static str {
        match self {
            Operation::ListResources => "list_resources",
            Operation::ListBookings => "list_bookings",
            Operation::CreateBooking => "create_booking",
            Operation::DeleteBooking => "delete_booking",
            Operation::Availability => "availability",
            Operation::Stats => "stats",
        }
    }
}

/// Record one finished request.
pub fn record_request(op: Operation, status: u16, started: Instant) {
    metrics::counter!(REQUESTS_TOTAL, "operation" => op.label(), "status" => status.to_string())
        .increment(1);
    metrics::histogram!(REQUEST_DURATION_SECONDS, "operation" => op.label())
        .record(started.elapsed().as_secs_f64());
}
