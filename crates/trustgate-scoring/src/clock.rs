//! Time sources for scoring.

use chrono::{DateTime, Local, Timelike, Utc};

/// Epoch used by [`FixedClock`] constructors: 2023-11-14T22:13:20Z.
const FIXED_EPOCH_SECS: i64 = 1_700_000_000;

/// Time source for evaluations.
///
/// The off-hours check asks only for the local hour; event timestamps
/// use UTC. Splitting the two keeps test clocks free of timezone
/// arithmetic.
pub trait Clock: Send + Sync {
    /// Wall-clock instant used for event timestamps.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Hour of day (0-23) in gateway local time.
    fn local_hour(&self) -> u32;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_hour(&self) -> u32 {
        Local::now().hour()
    }
}

/// A clock pinned to a fixed instant and local hour.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<Utc>,
    hour: u32,
}

impl FixedClock {
    #[must_use]
    pub const fn new(at: DateTime<Utc>, hour: u32) -> Self {
        FixedClock { at, hour }
    }

    /// A clock reporting the given local hour at a fixed UTC instant.
    #[must_use]
    pub fn at_hour(hour: u32) -> Self {
        let at = DateTime::from_timestamp(FIXED_EPOCH_SECS, 0).unwrap_or_default();
        FixedClock { at, hour }
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.at
    }

    fn local_hour(&self) -> u32 {
        self.hour
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_reports_a_valid_hour() {
        let clock = SystemClock;
        assert!(clock.local_hour() < 24);
    }

    #[test]
    fn fixed_clock_is_pinned() {
        let clock = FixedClock::at_hour(3);
        assert_eq!(clock.local_hour(), 3);
        assert_eq!(clock.now_utc(), clock.now_utc());

        let at = DateTime::from_timestamp(1_000, 0).unwrap();
        let clock = FixedClock::new(at, 23);
        assert_eq!(clock.now_utc(), at);
        assert_eq!(clock.local_hour(), 23);
    }
}
