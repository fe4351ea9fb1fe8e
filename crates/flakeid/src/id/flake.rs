use core::{fmt, time::Duration};

/// A 64-bit time-ordered identifier.
///
/// The raw value is partitioned by a [`BitLayout`]; with the default layout
/// it reads (most to least significant):
///
/// ```text
///  Bit Index:  63           63 62            22 21              17 16          12 11             0
///              +--------------+----------------+------------------+-------------+---------------+
///  Field:      | reserved (1) | timestamp (41) | data center (5)  | machine (5) | sequence (12) |
///              +--------------+----------------+------------------+-------------+---------------+
///              |<----------- MSB ------------------- 64 bits ------------------- LSB ----------->|
/// ```
///
/// The reserved top bit is always zero, so every identifier also fits a
/// non-negative `i64`. Identifiers compare by their raw value, which orders
/// them by time first.
///
/// [`BitLayout`]: crate::BitLayout
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct FlakeId {
    id: u64,
}

impl FlakeId {
    /// Wraps a raw value without validation.
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns the raw 64-bit value.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Returns the value as a signed integer, for stores that only have a
    /// signed 64-bit column type. Lossless for every identifier a generator
    /// emits.
    pub const fn to_i64(&self) -> i64 {
        self.id as i64
    }

    /// Returns the ID as a zero-padded 20-digit string, so that string order
    /// matches numeric order.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl fmt::Display for FlakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl From<FlakeId> for u64 {
    fn from(id: FlakeId) -> Self {
        id.id
    }
}

impl From<u64> for FlakeId {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

/// The decoded fields of a [`FlakeId`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FlakeParts {
    /// Milliseconds since the generator epoch.
    pub timestamp: u64,
    pub data_center_id: u64,
    pub machine_id: u64,
    pub sequence: u64,
}

impl FlakeParts {
    /// Returns the absolute timestamp in milliseconds since the Unix epoch,
    /// or `None` if it does not fit a `u64`.
    pub fn unix_millis(&self, epoch: Duration) -> Option<u64> {
        u64::try_from(epoch.as_millis())
            .ok()?
            .checked_add(self.timestamp)
    }
}
