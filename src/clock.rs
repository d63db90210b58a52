use chrono::{Local, NaiveDateTime, Utc};

/// Source of "now" for the past-date rule, stats and `created_at`.
pub trait Clock: Send + Sync {
    /// Local wall-clock time, compared against booking start times as written.
    fn local_now(&self) -> NaiveDateTime;

    /// Unix milliseconds.
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn local_now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Frozen clock for tests. `now_ms` treats the wall-clock value as UTC.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn local_now(&self) -> NaiveDateTime {
        self.0
    }

    fn now_ms(&self) -> i64 {
        self.0.and_utc().timestamp_millis()
    }
}
