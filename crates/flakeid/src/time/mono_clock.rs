use core::time::Duration;
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    thread,
    time::Instant,
};

use crate::time::{SystemClock, TimeSource};

/// Shared tick counter updated by the ticker thread once per millisecond.
#[derive(Debug)]
struct SharedTicker {
    elapsed: AtomicU64,
}

/// A time source that reads the wall clock once and then only moves forward.
///
/// At construction the clock samples [`SystemClock`] as its anchor and spawns
/// a ticker thread that publishes the milliseconds elapsed since then, as
/// measured by [`Instant`]. Reads are a single atomic load, and the returned
/// value never goes backward even if the system clock is stepped, so a
/// generator driven by this clock never reports
/// [`Error::ClockMovedBackward`].
///
/// The trade-off is drift: after a wall-clock correction the timestamps stay
/// on the old timeline until the process restarts.
///
/// Clones share the same ticker. The thread exits once the last clone is
/// dropped.
///
/// # Example
///
/// ```
/// use flakeid::{MonotonicClock, TimeSource};
///
/// let clock = MonotonicClock::new();
/// let a = clock.current_millis();
/// std::thread::sleep(std::time::Duration::from_millis(5));
/// let b = clock.current_millis();
/// assert!(b >= a);
/// ```
///
/// [`Error::ClockMovedBackward`]: crate::Error::ClockMovedBackward
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    inner: Arc<SharedTicker>,
    anchor: u64, // unix millis at construction
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Creates a clock anchored to the current system time.
    pub fn new() -> Self {
        Self::with_anchor(SystemClock.current_millis())
    }

    /// Creates a clock whose first reading is `anchor` milliseconds since the
    /// Unix epoch.
    pub fn with_anchor(anchor: u64) -> Self {
        let start = Instant::now();
        let inner = Arc::new(SharedTicker {
            elapsed: AtomicU64::new(0),
        });

        let weak_inner = Arc::downgrade(&inner);
        thread::spawn(move || {
            let mut tick = 0;

            loop {
                let Some(inner_ref) = weak_inner.upgrade() else {
                    break;
                };

                // Absolute target time of the next tick
                let target = start + Duration::from_millis(tick);

                let now = Instant::now();
                if now < target {
                    thread::sleep(target - now);
                }

                let now_ms = start.elapsed().as_millis() as u64;
                inner_ref.elapsed.store(now_ms, Ordering::Relaxed);

                // Align to next tick after the current actual time
                tick = now_ms + 1;
            }
        });

        Self { inner, anchor }
    }
}

impl TimeSource for MonotonicClock {
    fn current_millis(&self) -> u64 {
        self.anchor + self.inner.elapsed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_anchor_and_advances() {
        let clock = MonotonicClock::with_anchor(1_000);
        let first = clock.current_millis();
        assert!(first >= 1_000);

        thread::sleep(Duration::from_millis(20));
        let later = clock.current_millis();
        assert!(later > first, "expected {later} > {first}");
    }

    #[test]
    fn clones_share_the_ticker() {
        let clock = MonotonicClock::with_anchor(0);
        let clone = clock.clone();
        thread::sleep(Duration::from_millis(5));
        let a = clock.current_millis();
        let b = clone.current_millis();
        assert!(b >= a);
    }
}
