use core::{cmp::Ordering, fmt};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    BitLayout, Error, FlakeId, FlakeParts, GeneratorConfig, Result,
    mutex::{Mutex, MutexGuard},
    time::{SystemClock, TimeSource},
};

/// Mutable generator state. Only read or written while holding the lock.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct State {
    /// Unix millis of the last emission, `None` until the first one.
    pub(crate) last_timestamp: Option<u64>,
    pub(crate) sequence: u64,
}

/// A lock-based, thread-safe identifier generator for one producer.
///
/// Each generator owns a fixed `(data_center_id, machine_id)` namespace and
/// guards its last timestamp and sequence counter with a single mutex, so
/// every call to [`IdGenerator::next_id`] observes and updates them as one
/// step. Share it across threads behind an [`Arc`](std::sync::Arc) or a
/// reference.
///
/// Uniqueness across producers relies on every producer being assigned a
/// distinct `(data_center_id, machine_id)` pair and on all of them using the
/// same [`GeneratorConfig`].
///
/// ## Clock handling
/// - A repeated millisecond increments the sequence.
/// - When the sequence is exhausted the call spins until the clock moves to
///   the next millisecond. There is no timeout: a clock that never advances
///   keeps the caller spinning.
/// - A clock reading earlier than the last emission fails with
///   [`Error::ClockMovedBackward`] and consumes nothing.
pub struct IdGenerator<T: TimeSource = SystemClock> {
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<State>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<State>,
    data_center_id: u64,
    machine_id: u64,
    config: GeneratorConfig,
    time: T,
}

impl IdGenerator<SystemClock> {
    /// Creates a generator with the default layout and epoch, reading the
    /// system wall clock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `data_center_id` or `machine_id`
    /// exceeds 31.
    ///
    /// # Example
    /// ```
    /// use flakeid::IdGenerator;
    ///
    /// let generator = IdGenerator::new(1, 1).unwrap();
    /// let a = generator.next_id().unwrap();
    /// let b = generator.next_id().unwrap();
    /// assert!(a < b);
    ///
    /// assert!(IdGenerator::new(32, 0).is_err());
    /// ```
    pub fn new(data_center_id: u64, machine_id: u64) -> Result<Self> {
        Self::with_config(
            data_center_id,
            machine_id,
            GeneratorConfig::default(),
            SystemClock,
        )
    }
}

impl<T: TimeSource> IdGenerator<T> {
    /// Creates a generator with an explicit configuration and time source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `data_center_id` or `machine_id`
    /// does not fit the widths of `config.layout`.
    ///
    /// # Example
    /// ```
    /// use flakeid::{BitLayout, GeneratorConfig, IdGenerator, MonotonicClock};
    ///
    /// let config = GeneratorConfig::default().with_layout(BitLayout::new(41, 2, 8, 12).unwrap());
    /// let generator = IdGenerator::with_config(3, 255, config, MonotonicClock::new()).unwrap();
    ///
    /// let id = generator.next_id().unwrap();
    /// let parts = generator.decompose(id);
    /// assert_eq!((parts.data_center_id, parts.machine_id), (3, 255));
    /// ```
    pub fn with_config(
        data_center_id: u64,
        machine_id: u64,
        config: GeneratorConfig,
        time: T,
    ) -> Result<Self> {
        let layout = config.layout;
        if data_center_id > layout.max_data_center_id() {
            return Err(Error::InvalidArgument {
                field: "data_center_id",
                value: data_center_id,
                max: layout.max_data_center_id(),
            });
        }
        if machine_id > layout.max_machine_id() {
            return Err(Error::InvalidArgument {
                field: "machine_id",
                value: machine_id,
                max: layout.max_machine_id(),
            });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            data_center_id,
            machine_id,
            epoch_ms = config.epoch_millis(),
            "created id generator"
        );

        let state = Mutex::new(State::default());
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(state),
            #[cfg(not(feature = "cache-padded"))]
            state,
            data_center_id,
            machine_id,
            config,
            time,
        })
    }

    /// Generates the next identifier.
    ///
    /// Returns a value strictly greater than every identifier this generator
    /// has returned before. If the current millisecond's sequence space is
    /// used up, this spins until the clock advances.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockMovedBackward`] if the clock reads earlier than the
    ///   last emission. The generator state is left as it was.
    /// - [`Error::TimestampOutOfRange`] if the clock is before the epoch or
    ///   past the end of the timestamp field.
    /// - [`Error::LockPoisoned`] if another thread panicked while holding the
    ///   lock (std mutex only).
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<FlakeId> {
        let layout = self.config.layout;
        let mut state = self.lock()?;

        let mut now = self.time.current_millis();
        let mut sequence = 0;

        if let Some(last) = state.last_timestamp {
            match now.cmp(&last) {
                Ordering::Less => return Err(Self::cold_clock_behind(last, now)),
                Ordering::Equal => {
                    sequence = state.sequence + 1;
                    if sequence > layout.max_sequence() {
                        now = self.cold_wait_next_millis(last);
                        sequence = 0;
                    }
                }
                Ordering::Greater => {}
            }
        }

        let timestamp = self.timestamp_delta(now)?;
        state.last_timestamp = Some(now);
        state.sequence = sequence;

        Ok(layout.compose(FlakeParts {
            timestamp,
            data_center_id: self.data_center_id,
            machine_id: self.machine_id,
            sequence,
        }))
    }

    /// Splits an identifier into its fields using this generator's layout.
    pub fn decompose(&self, id: FlakeId) -> FlakeParts {
        self.config.layout.decompose(id)
    }

    /// Returns the data center part of this generator's namespace.
    pub fn data_center_id(&self) -> u64 {
        self.data_center_id
    }

    /// Returns the machine part of this generator's namespace.
    pub fn machine_id(&self) -> u64 {
        self.machine_id
    }

    /// Returns the layout and epoch this generator encodes with.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Returns the bit layout of the identifiers this generator emits.
    pub fn layout(&self) -> &BitLayout {
        &self.config.layout
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> State {
        *self.lock().unwrap()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }

    fn timestamp_delta(&self, now: u64) -> Result<u64> {
        let epoch = self.config.epoch_millis();
        let max = self.config.layout.max_timestamp();
        match now.checked_sub(epoch) {
            Some(delta) if delta <= max => Ok(delta),
            _ => Err(Error::TimestampOutOfRange { now, epoch, max }),
        }
    }

    /// Spins until the clock reads past `last`.
    #[cold]
    #[inline(never)]
    fn cold_wait_next_millis(&self, last: u64) -> u64 {
        #[cfg(feature = "tracing")]
        tracing::debug!(last, "sequence exhausted, waiting for next millisecond");

        loop {
            let now = self.time.current_millis();
            if now > last {
                return now;
            }
            core::hint::spin_loop();
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(last: u64, now: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(last, now, behind_ms = last - now, "clock moved backward");

        Error::ClockMovedBackward { last, now }
    }
}

impl<T: TimeSource> fmt::Debug for IdGenerator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdGenerator")
            .field("data_center_id", &self.data_center_id)
            .field("machine_id", &self.machine_id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
