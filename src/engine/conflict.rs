use chrono::NaiveDate;
use uuid::Uuid;

use crate::model::*;

use super::EngineError;

/// Zero-padded `"HH:MM"` to minutes since midnight.
pub fn parse_clock_minutes(hhmm: &str) -> Result<Minute, EngineError> {
    let invalid = || EngineError::InvalidTime(hhmm.to_string());
    let clock = hhmm.trim();
    if !matches_shape(clock, "dd:dd") {
        return Err(invalid());
    }
    let (h, m) = clock.split_once(':').ok_or_else(invalid)?;
    let h: Minute = h.parse().map_err(|_| invalid())?;
    let m: Minute = m.parse().map_err(|_| invalid())?;
    if h > 23 || m > 59 {
        return Err(invalid());
    }
    Ok(h * 60 + m)
}

/// First booking on `resource_id` dated `date` whose span overlaps `span`,
/// skipping `exclude`.
pub fn find_conflict<'a>(
    bookings: &'a [Booking],
    resource_id: &str,
    date: NaiveDate,
    span: &MinuteSpan,
    exclude: Option<Uuid>,
) -> Option<&'a Booking> {
    bookings
        .iter()
        .filter(|b| exclude != Some(b.id))
        .filter(|b| b.resource_id == resource_id && b.date() == date)
        .find(|b| b.span().overlaps(span))
}

pub(crate) fn check_no_conflict(
    bookings: &[Booking],
    resource_id: &str,
    date: NaiveDate,
    span: &MinuteSpan,
) -> Result<(), EngineError> {
    match find_conflict(bookings, resource_id, date, span, None) {
        Some(existing) => Err(EngineError::Conflict(existing.id)),
        None => Ok(()),
    }
}
