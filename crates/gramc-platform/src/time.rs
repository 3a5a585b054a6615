//! Monotonic ticks and wall-clock time.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use chrono::{Datelike, Local, Timelike};
use lazy_static::lazy_static;

/// Monotonic tick value, in milliseconds since process start.
pub type Tick = u64;

/// Interval between mutator safepoint checks, in ticks.
pub const GC_SYNC_INTERVAL: Tick = 2;

lazy_static! {
    static ref PROCESS_START: Instant = Instant::now();
}

/// A very fast monotonic counter used to measure time intervals for GC
/// synchronization. The absolute value is meaningless; only differences are.
pub fn current_tick() -> Tick {
    PROCESS_START.elapsed().as_millis() as Tick
}

/// Wall-clock time in milliseconds since the Unix epoch.
pub fn current_time_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Broken-down local date and time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

/// The current local date and time.
pub fn local_date_time() -> DateTime {
    let now = Local::now();
    DateTime {
        year: now.year(),
        month: now.month(),
        day: now.day(),
        hour: now.hour(),
        minute: now.minute(),
        second: now.second(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_are_monotonic() {
        let a = current_tick();
        let b = current_tick();
        assert!(b >= a);
    }

    #[test]
    fn wall_clock_is_after_2020() {
        // 2020-01-01 in Unix milliseconds.
        assert!(current_time_millis() > 1_577_836_800_000);
    }

    #[test]
    fn local_time_fields_are_in_range() {
        let t = local_date_time();
        assert!((1..=12).contains(&t.month));
        assert!((1..=31).contains(&t.day));
        assert!(t.hour < 24 && t.minute < 60 && t.second < 61);
    }
}
