use std::time::{SystemTime, UNIX_EPOCH};

use crate::time::TimeSource;

/// The system wall clock.
///
/// Every call performs a `SystemTime::now()` read. Because the wall clock can
/// be stepped by NTP or an operator, this is the time source for which
/// [`Error::ClockMovedBackward`] is observable.
///
/// [`Error::ClockMovedBackward`]: crate::Error::ClockMovedBackward
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        // A clock set before 1970 reads as 0, which the generator then reports
        // as out of range for any sensible epoch.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64)
    }
}
