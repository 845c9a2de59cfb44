// Time types used by the earning rules
//
// Rules never read the system clock directly: the daemon injects a Clock
// so tests can pin "now" and every call site of a request sees the same day.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, NaiveDate, Utc};

use crate::config::SECONDS_PER_DAY;

// Seconds timestamps used to determine it using its type
pub type TimestampSeconds = u64;

// UTC calendar day, counted from the unix epoch
pub type DayIndex = u32;

#[inline]
pub fn get_current_time() -> Duration {
    // A clock set before 1970 is treated as the epoch
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

pub fn get_current_time_in_seconds() -> TimestampSeconds {
    get_current_time().as_secs()
}

/// UTC calendar day containing `timestamp`
#[inline]
pub fn day_index(timestamp: TimestampSeconds) -> DayIndex {
    (timestamp / SECONDS_PER_DAY) as DayIndex
}

/// First second of a day
#[inline]
pub fn day_start(day: DayIndex) -> TimestampSeconds {
    day as TimestampSeconds * SECONDS_PER_DAY
}

/// Calendar date of a day, None when out of chrono's range
pub fn day_to_date(day: DayIndex) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp(day_start(day) as i64, 0).map(|dt| dt.date_naive())
}

/// Add whole days to a timestamp, saturating on overflow
#[inline]
pub fn add_days(timestamp: TimestampSeconds, days: u32) -> TimestampSeconds {
    timestamp.saturating_add(days as TimestampSeconds * SECONDS_PER_DAY)
}

pub trait Clock: Send + Sync {
    fn now(&self) -> TimestampSeconds;

    fn today(&self) -> DayIndex {
        day_index(self.now())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimestampSeconds {
        get_current_time_in_seconds()
    }
}

/// Manually driven clock, used by tests and replay tooling
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicU64,
}

impl FixedClock {
    pub fn new(now: TimestampSeconds) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn set(&self, now: TimestampSeconds) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance_days(&self, days: u32) {
        self.now
            .fetch_add(days as TimestampSeconds * SECONDS_PER_DAY, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> TimestampSeconds {
        self.now.load(Ordering::SeqCst)
    }
}
