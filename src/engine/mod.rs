mod conflict;
mod error;
mod mutations;
mod queries;

pub use conflict::{find_conflict, parse_clock_minutes};
pub use error::{EngineError, ErrorKind};

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, info};

use crate::catalog::ResourceCatalog;
use crate::clock::{Clock, SystemClock};
use crate::model::*;
use crate::snapshot::Snapshot;

pub const BOOKINGS_FILE: &str = "bookings.json";

/// Owns the booking collection and the resource catalog.
///
/// All booking state sits behind one mutex. Mutations hold it across
/// validate → conflict check → write → persist, so two overlapping creates
/// can never both succeed and memory never drifts from disk.
pub struct Engine {
    catalog: ResourceCatalog,
    bookings: Mutex<Vec<Booking>>,
    snapshot: Snapshot,
    clock: Arc<dyn Clock>,
}

impl Engine {
    pub fn open(data_dir: &Path) -> Result<Self, EngineError> {
        Self::open_with_clock(data_dir, Arc::new(SystemClock))
    }

    /// Load the catalog (seeding defaults on first run) and the persisted
    /// bookings. A missing bookings file is created empty; an unreadable one
    /// is an error and is left untouched.
    pub fn open_with_clock(data_dir: &Path, clock: Arc<dyn Clock>) -> Result<Self, EngineError> {
        let catalog = ResourceCatalog::load_or_seed(data_dir);
        let snapshot = Snapshot::new(data_dir.join(BOOKINGS_FILE));
        let bookings = match snapshot.load::<Booking>()? {
            Some(bookings) => bookings,
            None => {
                snapshot.write::<Booking>(&[])?;
                Vec::new()
            }
        };
        info!(
            "loaded {} bookings and {} resources from {}",
            bookings.len(),
            catalog.len(),
            data_dir.display()
        );
        metrics::gauge!(crate::observability::BOOKINGS_ACTIVE).set(bookings.len() as f64);

        Ok(Self {
            catalog,
            bookings: Mutex::new(bookings),
            snapshot,
            clock,
        })
    }

    /// Rewrite the bookings document. Caller holds the lock and rolls back
    /// its in-memory change on error.
    pub(super) fn persist(&self, bookings: &[Booking]) -> Result<(), EngineError> {
        if let Err(e) = self.snapshot.write(bookings) {
            error!("failed to persist {}: {e}", self.snapshot.path().display());
            return Err(EngineError::Storage(e));
        }
        metrics::gauge!(crate::observability::BOOKINGS_ACTIVE).set(bookings.len() as f64);
        Ok(())
    }
}
