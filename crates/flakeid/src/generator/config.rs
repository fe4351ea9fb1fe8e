use core::time::Duration;

use crate::{BitLayout, DEFAULT_EPOCH};

/// Construction-time settings shared by every generator in an identifier
/// space.
///
/// Both the layout and the epoch are part of the identifier format. All
/// producers writing into the same store must agree on them, and neither can
/// change once identifiers have been issued.
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use flakeid::{BitLayout, GeneratorConfig};
///
/// let config = GeneratorConfig::default()
///     .with_layout(BitLayout::new(41, 2, 8, 12).unwrap())
///     .with_epoch(Duration::from_millis(1_700_000_000_000));
/// assert_eq!(config.epoch_millis(), 1_700_000_000_000);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GeneratorConfig {
    pub layout: BitLayout,
    /// Offset from the Unix epoch that timestamp deltas are measured from.
    pub epoch: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            layout: BitLayout::DEFAULT,
            epoch: DEFAULT_EPOCH,
        }
    }
}

impl GeneratorConfig {
    #[must_use]
    pub const fn with_layout(mut self, layout: BitLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub const fn with_epoch(mut self, epoch: Duration) -> Self {
        self.epoch = epoch;
        self
    }

    /// The epoch in milliseconds since the Unix epoch.
    ///
    /// Saturates at `u64::MAX`, which no clock reading can reach, so an
    /// oversized epoch surfaces as [`Error::TimestampOutOfRange`] instead of
    /// wrapping to a plausible value.
    ///
    /// [`Error::TimestampOutOfRange`]: crate::Error::TimestampOutOfRange
    pub const fn epoch_millis(&self) -> u64 {
        let millis = self.epoch.as_millis();
        if millis > u64::MAX as u128 {
            u64::MAX
        } else {
            millis as u64
        }
    }
}
