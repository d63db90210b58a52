use tracing::{debug, info};
use uuid::Uuid;

use crate::limits::*;
use crate::model::*;

use super::conflict::check_no_conflict;
use super::{Engine, EngineError};

/// A create request that passed field validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ValidRequest {
    pub user: String,
    pub resource_id: String,
    pub start_time: StartTime,
    pub duration: u32,
}

impl ValidRequest {
    pub fn span(&self) -> MinuteSpan {
        MinuteSpan::from_duration(self.start_time.minute_of_day(), self.duration)
    }
}

/// Absent, empty and zero values all count as missing.
fn is_blank(d: &DurationInput) -> bool {
    match d {
        DurationInput::Minutes(m) => *m == 0,
        DurationInput::Fractional(f) => *f == 0.0,
        DurationInput::Text(s) => s.is_empty(),
    }
}

fn coerce_minutes(d: &DurationInput) -> Result<u32, EngineError> {
    let minutes = match d {
        DurationInput::Minutes(m) => *m,
        DurationInput::Fractional(f) if f.is_finite() => f.trunc() as i64,
        DurationInput::Fractional(f) => return Err(EngineError::InvalidDuration(f.to_string())),
        DurationInput::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| EngineError::InvalidDuration(s.clone()))?,
    };
    if minutes <= 0 {
        return Err(EngineError::InvalidDuration(minutes.to_string()));
    }
    u32::try_from(minutes)
        .ok()
        .filter(|&m| m <= MAX_DURATION_MINUTES)
        .ok_or(EngineError::LimitExceeded("duration longer than one day"))
}

pub(super) fn validate_request(req: &BookingRequest) -> Result<ValidRequest, EngineError> {
    let user = req.user.as_deref().map(str::trim).filter(|u| !u.is_empty());
    let resource_id = req.resource_id.as_deref().filter(|r| !r.is_empty());
    let start_time = req.start_time.as_deref().filter(|s| !s.is_empty());
    let duration = req.duration.as_ref().filter(|d| !is_blank(d));

    let mut missing = Vec::new();
    if user.is_none() {
        missing.push("user");
    }
    if resource_id.is_none() {
        missing.push("resource_id");
    }
    if start_time.is_none() {
        missing.push("start_time");
    }
    if duration.is_none() {
        missing.push("duration");
    }
    let (Some(user), Some(resource_id), Some(start_time), Some(duration)) =
        (user, resource_id, start_time, duration)
    else {
        return Err(EngineError::MissingFields(missing));
    };

    if user.len() > MAX_USER_LEN {
        return Err(EngineError::LimitExceeded("user name too long"));
    }
    if resource_id.len() > MAX_RESOURCE_ID_LEN {
        return Err(EngineError::LimitExceeded("resource_id too long"));
    }

    let start_time = StartTime::parse(start_time)
        .ok_or_else(|| EngineError::InvalidStartTime(start_time.to_string()))?;
    let duration = coerce_minutes(duration)?;

    Ok(ValidRequest {
        user: user.to_string(),
        resource_id: resource_id.to_string(),
        start_time,
        duration,
    })
}

impl Engine {
    /// Validate, conflict-check, store and persist a new booking.
    pub fn create_booking(&self, req: &BookingRequest) -> Result<Booking, EngineError> {
        let valid = validate_request(req).inspect_err(|e| debug!("rejecting booking request: {e}"))?;

        let today = self.clock.local_now().date();
        let date = valid.start_time.date();
        if date < today {
            debug!("rejecting past-dated booking for {date} (today is {today})");
            return Err(EngineError::PastDate(date));
        }

        let span = valid.span();
        let mut bookings = self.bookings.lock();

        if let Err(e) = check_no_conflict(&bookings, &valid.resource_id, date, &span) {
            metrics::counter!(crate::observability::BOOKING_CONFLICTS_TOTAL).increment(1);
            debug!("booking on {} at {} rejected: {e}", valid.resource_id, valid.start_time);
            return Err(e);
        }

        let mut id = Uuid::new_v4();
        while bookings.iter().any(|b| b.id == id) {
            id = Uuid::new_v4();
        }
        let booking = Booking {
            id,
            resource_name: self.catalog.name_of(&valid.resource_id),
            resource_id: valid.resource_id,
            user: valid.user,
            start_time: valid.start_time,
            duration: valid.duration,
            created_at: self.clock.now_ms(),
        };

        bookings.push(booking.clone());
        if let Err(e) = self.persist(&bookings) {
            bookings.pop();
            return Err(e);
        }

        metrics::counter!(crate::observability::BOOKINGS_CREATED_TOTAL).increment(1);
        info!(
            "booking {} created: {} on {} at {} for {} min",
            booking.id, booking.user, booking.resource_id, booking.start_time, booking.duration
        );
        Ok(booking)
    }

    /// Remove a booking by id and persist. Returns the removed booking.
    pub fn delete_booking(&self, id: &str) -> Result<Booking, EngineError> {
        let not_found = || EngineError::NotFound(id.to_string());
        let uuid = Uuid::parse_str(id).map_err(|_| not_found())?;

        let mut bookings = self.bookings.lock();
        let pos = bookings
            .iter()
            .position(|b| b.id == uuid)
            .ok_or_else(not_found)
            .inspect_err(|_| debug!("delete of unknown booking {id}"))?;
        let removed = bookings.remove(pos);

        if let Err(e) = self.persist(&bookings) {
            bookings.insert(pos, removed);
            return Err(e);
        }

        info!("booking {} deleted from {}", removed.id, removed.resource_id);
        Ok(removed)
    }
}
