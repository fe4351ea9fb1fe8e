/// A result type defaulting to the crate [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `flakeid` can emit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A generator was constructed with an identity value that does not fit
    /// its bit field.
    #[error("{field} ({value}) must be between 0 and {max}")]
    InvalidArgument {
        /// Name of the rejected field (`data_center_id` or `machine_id`).
        field: &'static str,
        /// The value that was supplied.
        value: u64,
        /// The largest value the configured layout can hold.
        max: u64,
    },

    /// The clock returned a time earlier than the last emitted timestamp.
    ///
    /// No identifier was produced and the generator state is untouched, so the
    /// call may be retried once the clock has caught up again.
    #[error("clock moved backward: now {now} ms < last {last} ms, refusing to generate id")]
    ClockMovedBackward {
        /// The timestamp that was last used to emit an identifier.
        last: u64,
        /// The regressed clock reading.
        now: u64,
    },

    /// Field widths are zero or do not fit into 63 bits.
    #[error(
        "invalid bit layout {timestamp_bits}/{data_center_bits}/{machine_bits}/{sequence_bits}: \
         every field needs at least one bit and the total must not exceed 63"
    )]
    InvalidLayout {
        timestamp_bits: u8,
        data_center_bits: u8,
        machine_bits: u8,
        sequence_bits: u8,
    },

    /// The clock reading is before the epoch, or too far past it to fit the
    /// timestamp field.
    #[error("timestamp {now} ms is outside the range of epoch {epoch} ms + {max} ms")]
    TimestampOutOfRange { now: u64, epoch: u64, max: u64 },

    /// The operation failed because the lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is not available.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
use crate::mutex::{MutexGuard, PoisonError};

#[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
