use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Minutes since local midnight.
pub type Minute = u32;

/// Half-open interval `[start, end)` on the minute-of-day axis.
///
/// `end` may run past 1440 for a booking that crosses midnight; it only ever
/// competes with bookings dated the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinuteSpan {
    pub start: Minute,
    pub end: Minute,
}

impl MinuteSpan {
    pub fn new(start: Minute, end: Minute) -> Self {
        debug_assert!(start < end, "MinuteSpan start must be before end");
        Self { start, end }
    }

    /// A zero duration yields an empty span that overlaps nothing.
    pub fn from_duration(start: Minute, duration: u32) -> Self {
        Self {
            start,
            end: start.saturating_add(duration),
        }
    }

    pub fn duration(&self) -> u32 {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &MinuteSpan) -> bool {
        self.start.max(other.start) < self.end.min(other.end)
    }

    pub fn contains_minute(&self, m: Minute) -> bool {
        self.start <= m && m < self.end
    }
}

/// A booking's `start_time`: the caller's ISO-8601 text plus its parsed
/// wall-clock value.
///
/// Serializes back to the submitted text, so a stored booking reads exactly as
/// it was submitted. Any zone suffix is ignored; the date and time as written
/// are what count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StartTime {
    raw: String,
    at: NaiveDateTime,
}

const TIME_FORMATS: [&str; 3] = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

impl StartTime {
    /// Parse `YYYY-MM-DD[T| ]HH:MM[:SS[.fff]][Z|±HH:MM|±HHMM]`, zero-padded.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let (date_part, time_part) = trimmed.split_once(['T', ' '])?;
        if !matches_shape(date_part, "dddd-dd-dd") {
            return None;
        }
        let time_part = strip_zone(time_part)?;
        if !is_clock_time(time_part) {
            return None;
        }
        let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
        let time = TIME_FORMATS
            .iter()
            .find_map(|f| NaiveTime::parse_from_str(time_part, f).ok())?;
        Some(Self {
            raw: trimmed.to_string(),
            at: date.and_time(time),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn date(&self) -> NaiveDate {
        self.at.date()
    }

    /// `HH:MM` as minutes since midnight. Seconds are ignored.
    pub fn minute_of_day(&self) -> Minute {
        self.at.hour() * 60 + self.at.minute()
    }

}

/// `d` in `shape` stands for an ASCII digit; every other byte must match exactly.
pub(crate) fn matches_shape(s: &str, shape: &str) -> bool {
    s.len() == shape.len()
        && s
            .bytes()
            .zip(shape.bytes())
            .all(|(c, p)| if p == b'd' { c.is_ascii_digit() } else { c == p })
}

/// `HH:MM`, `HH:MM:SS` or `HH:MM:SS.f+`. Ranges are left to chrono.
fn is_clock_time(t: &str) -> bool {
    let Some((hh_mm, rest)) = t.split_at_checked(5) else {
        return false;
    };
    if !matches_shape(hh_mm, "dd:dd") {
        return false;
    }
    let Some(secs) = rest.strip_prefix(':') else {
        return rest.is_empty();
    };
    match secs.split_once('.') {
        None => matches_shape(secs, "dd"),
        Some((ss, frac)) => {
            matches_shape(ss, "dd") && !frac.is_empty() && frac.bytes().all(|b| b.is_ascii_digit())
        }
    }
}

/// Drop a trailing `Z`, `±HH:MM` or `±HHMM`. Any other text after a sign is
/// not a zone and fails the parse.
fn strip_zone(time: &str) -> Option<&str> {
    if let Some(stripped) = time.strip_suffix(['Z', 'z']) {
        return Some(stripped);
    }
    let Some(pos) = time.rfind(['+', '-']) else {
        return Some(time);
    };
    let offset = &time[pos + 1..];
    let (hh, mm) = if matches_shape(offset, "dd:dd") {
        (&offset[..2], &offset[3..])
    } else if matches_shape(offset, "dddd") {
        (&offset[..2], &offset[2..])
    } else {
        return None;
    };
    let in_range =
        hh.parse::<u32>().is_ok_and(|h| h <= 23) && mm.parse::<u32>().is_ok_and(|m| m <= 59);
    in_range.then_some(&time[..pos])
}

impl Ord for StartTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at.cmp(&other.at).then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for StartTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for StartTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for StartTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for StartTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        StartTime::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid start_time: {raw}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Equipment,
    Room,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    Available,
    Unavailable,
}

/// A bookable physical asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub status: ResourceStatus,
}

impl Resource {
    pub fn new(id: &str, name: &str, kind: ResourceKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            status: ResourceStatus::Available,
        }
    }
}

/// A reservation of one resource for a contiguous run of minutes on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub resource_id: String,
    pub resource_name: String,
    pub user: String,
    pub start_time: StartTime,
    pub duration: u32,
    /// Unix milliseconds.
    #[serde(alias = "timestamp")]
    pub created_at: i64,
}

impl Booking {
    pub fn date(&self) -> NaiveDate {
        self.start_time.date()
    }

    pub fn span(&self) -> MinuteSpan {
        MinuteSpan::from_duration(self.start_time.minute_of_day(), self.duration)
    }
}

// ── Request types ────────────────────────────────────────────────

/// `duration` as clients send it: a number of minutes, possibly fractional
/// or quoted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationInput {
    Minutes(i64),
    Fractional(f64),
    Text(String),
}

/// Unvalidated create-booking payload. Every field may be absent; the engine
/// reports all missing ones at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub user: Option<String>,
    pub resource_id: Option<String>,
    pub start_time: Option<String>,
    pub duration: Option<DurationInput>,
}

impl BookingRequest {
    pub fn new(user: &str, resource_id: &str, start_time: &str, duration: i64) -> Self {
        Self {
            user: Some(user.to_string()),
            resource_id: Some(resource_id.to_string()),
            start_time: Some(start_time.to_string()),
            duration: Some(DurationInput::Minutes(duration)),
        }
    }
}

/// Listing filter. `resource` matches either a resource id or a resource name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingFilter {
    pub resource: Option<String>,
    pub date: Option<NaiveDate>,
}

impl BookingFilter {
    pub fn matches(&self, b: &Booking) -> bool {
        let resource_ok = self
            .resource
            .as_deref()
            .is_none_or(|r| b.resource_id == r || b.resource_name == r);
        let date_ok = self.date.is_none_or(|d| b.date() == d);
        resource_ok && date_ok
    }
}

// ── Query result types ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub resource_id: String,
    pub date: NaiveDate,
    pub bookings: Vec<Booking>,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_bookings: usize,
    pub today_bookings: usize,
    pub available_resources: usize,
    pub busy_resources: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(s: &str) -> StartTime {
        StartTime::parse(s).unwrap()
    }

    #[test]
    fn span_basics() {
        let s = MinuteSpan::new(540, 600);
        assert_eq!(s.duration(), 60);
        assert!(s.contains_minute(540));
        assert!(s.contains_minute(599));
        assert!(!s.contains_minute(600)); // half-open
    }

    #[test]
    fn span_overlap() {
        let a = MinuteSpan::new(540, 600);
        let b = MinuteSpan::new(570, 600);
        let c = MinuteSpan::new(600, 630);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c)); // adjacent, not overlapping
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn span_enclosing_overlaps() {
        let outer = MinuteSpan::new(0, 1440);
        let inner = MinuteSpan::new(700, 701);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn start_time_plain() {
        let t = start("2099-01-10T09:30");
        assert_eq!(t.date(), NaiveDate::from_ymd_opt(2099, 1, 10).unwrap());
        assert_eq!(t.minute_of_day(), 9 * 60 + 30);
        assert_eq!(t.as_str(), "2099-01-10T09:30");
    }

    #[test]
    fn start_time_seconds_ignored_for_minutes() {
        let t = start("2099-01-10T09:30:59.250");
        assert_eq!(t.minute_of_day(), 570);
    }

    #[test]
    fn start_time_zone_suffix_stripped() {
        assert_eq!(start("2099-01-10T23:15Z").minute_of_day(), 23 * 60 + 15);
        assert_eq!(start("2099-01-10T23:15:00+02:00").minute_of_day(), 23 * 60 + 15);
        assert_eq!(start("2099-01-10T08:00-0500").minute_of_day(), 480);
        // Wall-clock date as written, no normalization.
        assert_eq!(
            start("2099-01-10T23:15-05:00").date(),
            NaiveDate::from_ymd_opt(2099, 1, 10).unwrap()
        );
    }

    #[test]
    fn start_time_space_separator() {
        assert_eq!(start("2099-01-10 07:05").minute_of_day(), 425);
    }

    #[test]
    fn start_time_rejects_malformed() {
        assert!(StartTime::parse("2099-01-10").is_none());
        assert!(StartTime::parse("tomorrow at nine").is_none());
        assert!(StartTime::parse("2099-13-10T09:00").is_none());
        assert!(StartTime::parse("2099-01-10T25:00").is_none());
        assert!(StartTime::parse("2099-01-10T9").is_none());
        assert!(StartTime::parse("").is_none());
    }

    #[test]
    fn start_time_rejects_bogus_zone_suffix() {
        for bad in [
            "2099-01-10T09:00+banana",
            "2099-01-10T09:00-",
            "2099-01-10T09:00+",
            "2099-01-10T09:00-99:99",
            "2099-01-10T09:00+2:00",
            "2099-01-10T09:00+020",
            "2099-01-10T09:00ZZ",
        ] {
            assert!(StartTime::parse(bad).is_none(), "{bad} should not parse");
        }
    }

    #[test]
    fn start_time_requires_zero_padding() {
        for bad in [
            "2099-1-5T9:05",
            "2099-01-5T09:05",
            "2099-01-10T9:05",
            "2099-01-10T09:5",
            "2099-01-10T09:05:7",
            "2099-01-10T09:05:07.",
            "+2099-01-10T09:05",
            "2099-01-10T+9:05",
        ] {
            assert!(StartTime::parse(bad).is_none(), "{bad} should not parse");
        }
    }

    #[test]
    fn start_time_stores_trimmed_text() {
        let t = start("  2099-01-10T09:00  ");
        assert_eq!(t.as_str(), "2099-01-10T09:00");
        assert_eq!(t.minute_of_day(), 540);
    }

    #[test]
    fn start_time_orders_chronologically() {
        let mut times = vec![
            start("2099-01-10T10:00"),
            start("2099-01-09T23:00"),
            start("2099-01-10T09:00"),
        ];
        times.sort();
        let raw: Vec<&str> = times.iter().map(StartTime::as_str).collect();
        assert_eq!(raw, ["2099-01-09T23:00", "2099-01-10T09:00", "2099-01-10T10:00"]);
    }

    #[test]
    fn booking_json_shape() {
        let b = Booking {
            id: Uuid::new_v4(),
            resource_id: "microscope-a".into(),
            resource_name: "Microscope A".into(),
            user: "Alice".into(),
            start_time: start("2099-01-10T09:00"),
            duration: 60,
            created_at: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["start_time"], "2099-01-10T09:00");
        assert_eq!(json["duration"], 60);
        assert_eq!(json["created_at"], 1_700_000_000_000_i64);

        let back: Booking = serde_json::from_value(json).unwrap();
        assert_eq!(back, b);
        assert_eq!(back.span(), MinuteSpan::new(540, 600));
    }

    #[test]
    fn booking_accepts_legacy_timestamp_key() {
        let json = serde_json::json!({
            "id": "5f0c2a5e-8f7b-4a53-9d3e-2a1c0b9e7d11",
            "resource_id": "centrifuge",
            "resource_name": "Centrifuge",
            "user": "Bob",
            "start_time": "2099-02-01T14:00",
            "duration": 45,
            "timestamp": 1_690_000_000_000_i64
        });
        let b: Booking = serde_json::from_value(json).unwrap();
        assert_eq!(b.created_at, 1_690_000_000_000);
    }

    #[test]
    fn resource_json_uses_type_key() {
        let r = Resource::new("cold-room-1", "Cold Room 1", ResourceKind::Room);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["type"], "room");
        assert_eq!(json["status"], "available");
    }

    #[test]
    fn duration_input_shapes() {
        let req: BookingRequest = serde_json::from_str(
            r#"{"user":"a","resource_id":"b","start_time":"c","duration":"90"}"#,
        )
        .unwrap();
        assert_eq!(req.duration, Some(DurationInput::Text("90".into())));

        let req: BookingRequest = serde_json::from_str(r#"{"duration":30.5}"#).unwrap();
        assert_eq!(req.duration, Some(DurationInput::Fractional(30.5)));
        assert!(req.user.is_none());

        let req: BookingRequest = serde_json::from_str(r#"{"duration":30}"#).unwrap();
        assert_eq!(req.duration, Some(DurationInput::Minutes(30)));
    }

    #[test]
    fn filter_by_name_or_id() {
        let b = Booking {
            id: Uuid::new_v4(),
            resource_id: "pcr-machine".into(),
            resource_name: "PCR Machine".into(),
            user: "Carol".into(),
            start_time: start("2099-03-03T11:00"),
            duration: 30,
            created_at: 0,
        };
        let by_id = BookingFilter { resource: Some("pcr-machine".into()), date: None };
        let by_name = BookingFilter { resource: Some("PCR Machine".into()), date: None };
        let other = BookingFilter { resource: Some("centrifuge".into()), date: None };
        let on_date = BookingFilter {
            resource: None,
            date: NaiveDate::from_ymd_opt(2099, 3, 3),
        };
        let off_date = BookingFilter {
            resource: Some("pcr-machine".into()),
            date: NaiveDate::from_ymd_opt(2099, 3, 4),
        };
        assert!(BookingFilter::default().matches(&b));
        assert!(by_id.matches(&b));
        assert!(by_name.matches(&b));
        assert!(!other.matches(&b));
        assert!(on_date.matches(&b));
        assert!(!off_date.matches(&b));
    }
}
