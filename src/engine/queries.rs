use std::collections::BTreeSet;

use chrono::{NaiveDate, Timelike};
use uuid::Uuid;

use crate::catalog::DEFAULT_RESOURCES;
use crate::model::*;

use super::conflict::{find_conflict, parse_clock_minutes};
use super::{Engine, EngineError};

impl Engine {
    pub fn list_resources(&self) -> Vec<Resource> {
        self.catalog.list().to_vec()
    }

    /// Bookings matching `filter`, ordered by start time.
    pub fn list_bookings(&self, filter: &BookingFilter) -> Vec<Booking> {
        let mut out: Vec<Booking> = self
            .bookings
            .lock()
            .iter()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        out
    }

    pub fn booking_count(&self) -> usize {
        self.bookings.lock().len()
    }

    /// Day-level availability: the resource is available iff it has no
    /// bookings at all on `date`. Unknown resources just have none.
    pub fn availability(&self, resource_id: &str, date: NaiveDate) -> Availability {
        let filter = BookingFilter {
            resource: None,
            date: Some(date),
        };
        let bookings: Vec<Booking> = self
            .list_bookings(&filter)
            .into_iter()
            .filter(|b| b.resource_id == resource_id)
            .collect();
        Availability {
            resource_id: resource_id.to_string(),
            date,
            available: bookings.is_empty(),
            bookings,
        }
    }

    /// Would `[start_hhmm, start_hhmm + duration)` on `resource_id` and `date`
    /// overlap an existing booking other than `exclude_id`?
    pub fn has_conflict(
        &self,
        resource_id: &str,
        date: NaiveDate,
        start_hhmm: &str,
        duration: u32,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, EngineError> {
        let start = parse_clock_minutes(start_hhmm)?;
        let span = MinuteSpan::from_duration(start, duration);
        let bookings = self.bookings.lock();
        Ok(find_conflict(&bookings, resource_id, date, &span, exclude_id).is_some())
    }

    /// Totals plus the resources occupied at this very minute.
    ///
    /// `available_resources` is measured against the default catalog size,
    /// not the loaded catalog.
    pub fn stats(&self) -> Stats {
        let now = self.clock.local_now();
        let today = now.date();
        let minute = now.hour() * 60 + now.minute();

        let bookings = self.bookings.lock();
        let mut today_bookings = 0;
        let mut busy = BTreeSet::new();
        for b in bookings.iter().filter(|b| b.date() == today) {
            today_bookings += 1;
            if b.span().contains_minute(minute) {
                busy.insert(b.resource_id.clone());
            }
        }

        Stats {
            total_bookings: bookings.len(),
            today_bookings,
            available_resources: DEFAULT_RESOURCES.len().saturating_sub(busy.len()),
            busy_resources: busy.into_iter().collect(),
        }
    }
}
