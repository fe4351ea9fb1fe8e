use crate::{Error, FlakeId, FlakeParts, Result};

/// Widths of the four fields packed into a [`FlakeId`].
///
/// Fields are laid out from most to least significant as `timestamp`,
/// `data_center`, `machine`, `sequence`. The widths must add up to at most 63
/// bits so the top bit stays clear.
///
/// Changing the layout of an existing identifier space is a breaking change:
/// previously issued identifiers would decode into the wrong fields.
///
/// # Example
///
/// ```
/// use flakeid::{BitLayout, FlakeParts};
///
/// let layout = BitLayout::DEFAULT;
/// assert_eq!(layout.max_sequence(), 4095);
/// assert_eq!(layout.timestamp_shift(), 22);
///
/// let parts = FlakeParts { timestamp: 7, data_center_id: 1, machine_id: 2, sequence: 3 };
/// let id = layout.compose(parts);
/// assert_eq!(layout.decompose(id), parts);
/// ```
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "BitWidths", into = "BitWidths")
)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitLayout {
    timestamp_bits: u8,
    data_center_bits: u8,
    machine_bits: u8,
    sequence_bits: u8,
}

impl Default for BitLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitLayout {
    /// 41 bits of timestamp, 5 of data center, 5 of machine, 12 of sequence.
    pub const DEFAULT: Self = Self {
        timestamp_bits: 41,
        data_center_bits: 5,
        machine_bits: 5,
        sequence_bits: 12,
    };

    /// Largest total width a layout may use.
    pub const MAX_TOTAL_BITS: u8 = 63;

    /// Creates a layout from explicit field widths.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLayout`] if any width is zero or the widths add
    /// up to more than [`Self::MAX_TOTAL_BITS`].
    pub const fn new(
        timestamp_bits: u8,
        data_center_bits: u8,
        machine_bits: u8,
        sequence_bits: u8,
    ) -> Result<Self> {
        let total = timestamp_bits as u16
            + data_center_bits as u16
            + machine_bits as u16
            + sequence_bits as u16;
        if timestamp_bits == 0
            || data_center_bits == 0
            || machine_bits == 0
            || sequence_bits == 0
            || total > Self::MAX_TOTAL_BITS as u16
        {
            return Err(Error::InvalidLayout {
                timestamp_bits,
                data_center_bits,
                machine_bits,
                sequence_bits,
            });
        }
        Ok(Self {
            timestamp_bits,
            data_center_bits,
            machine_bits,
            sequence_bits,
        })
    }

    pub const fn timestamp_bits(&self) -> u8 {
        self.timestamp_bits
    }

    pub const fn data_center_bits(&self) -> u8 {
        self.data_center_bits
    }

    pub const fn machine_bits(&self) -> u8 {
        self.machine_bits
    }

    pub const fn sequence_bits(&self) -> u8 {
        self.sequence_bits
    }

    /// Sum of all field widths.
    pub const fn total_bits(&self) -> u8 {
        self.timestamp_bits + self.data_center_bits + self.machine_bits + self.sequence_bits
    }

    /// Largest timestamp delta (milliseconds past the epoch) that fits.
    pub const fn max_timestamp(&self) -> u64 {
        mask(self.timestamp_bits)
    }

    pub const fn max_data_center_id(&self) -> u64 {
        mask(self.data_center_bits)
    }

    pub const fn max_machine_id(&self) -> u64 {
        mask(self.machine_bits)
    }

    pub const fn max_sequence(&self) -> u64 {
        mask(self.sequence_bits)
    }

    /// Bit position of the lowest timestamp bit.
    pub const fn timestamp_shift(&self) -> u32 {
        self.data_center_shift() + self.data_center_bits as u32
    }

    /// Bit position of the lowest data-center bit.
    pub const fn data_center_shift(&self) -> u32 {
        self.machine_shift() + self.machine_bits as u32
    }

    /// Bit position of the lowest machine bit.
    pub const fn machine_shift(&self) -> u32 {
        self.sequence_bits as u32
    }

    /// Packs the fields into an identifier.
    ///
    /// Each field is masked to its width; callers are expected to have range
    /// checked the values already.
    pub const fn compose(&self, parts: FlakeParts) -> FlakeId {
        debug_assert!(parts.timestamp <= self.max_timestamp(), "timestamp overflow");
        debug_assert!(
            parts.data_center_id <= self.max_data_center_id(),
            "data_center_id overflow"
        );
        debug_assert!(parts.machine_id <= self.max_machine_id(), "machine_id overflow");
        debug_assert!(parts.sequence <= self.max_sequence(), "sequence overflow");

        let timestamp = (parts.timestamp & self.max_timestamp()) << self.timestamp_shift();
        let data_center =
            (parts.data_center_id & self.max_data_center_id()) << self.data_center_shift();
        let machine = (parts.machine_id & self.max_machine_id()) << self.machine_shift();
        let sequence = parts.sequence & self.max_sequence();
        FlakeId::from_raw(timestamp | data_center | machine | sequence)
    }

    /// Splits an identifier into its fields.
    pub const fn decompose(&self, id: FlakeId) -> FlakeParts {
        let raw = id.to_raw();
        FlakeParts {
            timestamp: (raw >> self.timestamp_shift()) & self.max_timestamp(),
            data_center_id: (raw >> self.data_center_shift()) & self.max_data_center_id(),
            machine_id: (raw >> self.machine_shift()) & self.max_machine_id(),
            sequence: raw & self.max_sequence(),
        }
    }
}

const fn mask(bits: u8) -> u64 {
    (1 << bits) - 1
}

/// Unvalidated field widths, the serialized form of a [`BitLayout`].
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct BitWidths {
    timestamp_bits: u8,
    data_center_bits: u8,
    machine_bits: u8,
    sequence_bits: u8,
}

#[cfg(feature = "serde")]
impl TryFrom<BitWidths> for BitLayout {
    type Error = Error;

    fn try_from(w: BitWidths) -> Result<Self> {
        Self::new(
            w.timestamp_bits,
            w.data_center_bits,
            w.machine_bits,
            w.sequence_bits,
        )
    }
}

#[cfg(feature = "serde")]
impl From<BitLayout> for BitWidths {
    fn from(layout: BitLayout) -> Self {
        Self {
            timestamp_bits: layout.timestamp_bits,
            data_center_bits: layout.data_center_bits,
            machine_bits: layout.machine_bits,
            sequence_bits: layout.sequence_bits,
        }
    }
}
