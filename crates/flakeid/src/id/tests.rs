use crate::{BitLayout, DEFAULT_EPOCH, Error, FlakeId, FlakeParts};
use core::time::Duration;

#[test]
fn default_layout_matches_reference_positions() {
    let layout = BitLayout::DEFAULT;
    assert_eq!(layout.total_bits(), 63);
    assert_eq!(layout.machine_shift(), 12);
    assert_eq!(layout.data_center_shift(), 17);
    assert_eq!(layout.timestamp_shift(), 22);
    assert_eq!(layout.max_sequence(), 4095);
    assert_eq!(layout.max_machine_id(), 31);
    assert_eq!(layout.max_data_center_id(), 31);
    assert_eq!(layout.max_timestamp(), (1 << 41) - 1);
    assert_eq!(BitLayout::default(), layout);
}

#[test]
fn compose_places_each_field() {
    let layout = BitLayout::DEFAULT;
    assert_eq!(
        layout
            .compose(FlakeParts {
                sequence: 1,
                ..FlakeParts::default()
            })
            .to_raw(),
        1
    );
    assert_eq!(
        layout
            .compose(FlakeParts {
                machine_id: 1,
                ..FlakeParts::default()
            })
            .to_raw(),
        1 << 12
    );
    assert_eq!(
        layout
            .compose(FlakeParts {
                data_center_id: 1,
                ..FlakeParts::default()
            })
            .to_raw(),
        1 << 17
    );
    assert_eq!(
        layout
            .compose(FlakeParts {
                timestamp: 1,
                ..FlakeParts::default()
            })
            .to_raw(),
        1 << 22
    );
}

#[test]
fn all_fields_at_max_keep_top_bit_clear() {
    let layout = BitLayout::DEFAULT;
    let parts = FlakeParts {
        timestamp: layout.max_timestamp(),
        data_center_id: layout.max_data_center_id(),
        machine_id: layout.max_machine_id(),
        sequence: layout.max_sequence(),
    };
    let id = layout.compose(parts);
    assert_eq!(id.to_raw(), i64::MAX as u64);
    assert!(id.to_i64() >= 0);
    assert_eq!(layout.decompose(id), parts);
}

#[test]
fn custom_layout_decomposes() {
    // 10 bits of machine identity split 2 + 8, 10 bits of sequence.
    let layout = BitLayout::new(42, 2, 8, 10).unwrap();
    assert_eq!(layout.total_bits(), 62);
    assert_eq!(layout.max_data_center_id(), 3);
    assert_eq!(layout.max_machine_id(), 255);
    assert_eq!(layout.timestamp_shift(), 20);

    let parts = FlakeParts {
        timestamp: 123_456_789,
        data_center_id: 2,
        machine_id: 200,
        sequence: 1000,
    };
    assert_eq!(layout.decompose(layout.compose(parts)), parts);
}

#[test]
fn layout_rejects_too_many_bits() {
    let err = BitLayout::new(42, 5, 5, 12).unwrap_err();
    assert_eq!(
        err,
        Error::InvalidLayout {
            timestamp_bits: 42,
            data_center_bits: 5,
            machine_bits: 5,
            sequence_bits: 12,
        }
    );
}

#[test]
fn layout_rejects_empty_field() {
    assert!(matches!(
        BitLayout::new(41, 0, 5, 12),
        Err(Error::InvalidLayout { .. })
    ));
    assert!(matches!(
        BitLayout::new(41, 5, 5, 0),
        Err(Error::InvalidLayout { .. })
    ));
}

#[test]
fn ids_order_by_timestamp_first() {
    let layout = BitLayout::DEFAULT;
    let earlier = layout.compose(FlakeParts {
        timestamp: 10,
        data_center_id: 31,
        machine_id: 31,
        sequence: 4095,
    });
    let later = layout.compose(FlakeParts {
        timestamp: 11,
        ..FlakeParts::default()
    });
    assert!(earlier < later);
}

#[test]
fn unix_millis_adds_epoch() {
    let parts = FlakeParts {
        timestamp: 1_000,
        ..FlakeParts::default()
    };
    assert_eq!(parts.unix_millis(DEFAULT_EPOCH), Some(1_534_694_401_000));
}

#[test]
fn unix_millis_overflow_is_none() {
    let parts = FlakeParts {
        timestamp: 1,
        ..FlakeParts::default()
    };
    assert_eq!(parts.unix_millis(Duration::from_millis(u64::MAX)), None);
    assert_eq!(parts.unix_millis(Duration::from_secs(u64::MAX / 500)), None);
    assert_eq!(parts.unix_millis(Duration::from_millis(u64::MAX - 1)), Some(u64::MAX));
}

#[test]
fn padded_string_and_display() {
    let id = FlakeId::from_raw(42);
    assert_eq!(id.to_string(), "42");
    assert_eq!(id.to_padded_string(), "00000000000000000042");
    assert_eq!(u64::from(id), 42);
    assert_eq!(FlakeId::from(42), id);
}

#[cfg(feature = "serde")]
#[test]
fn serde_id_is_a_bare_number() {
    let id = FlakeId::from_raw(123_456);
    assert_eq!(serde_json::to_string(&id).unwrap(), "123456");
    let back: FlakeId = serde_json::from_str("123456").unwrap();
    assert_eq!(back, id);
}

#[cfg(feature = "serde")]
#[test]
fn serde_layout_is_validated() {
    let json = r#"{"timestamp_bits":41,"data_center_bits":5,"machine_bits":5,"sequence_bits":12}"#;
    let layout: BitLayout = serde_json::from_str(json).unwrap();
    assert_eq!(layout, BitLayout::DEFAULT);
    assert_eq!(serde_json::to_string(&layout).unwrap(), json);

    let bad = r#"{"timestamp_bits":60,"data_center_bits":5,"machine_bits":5,"sequence_bits":12}"#;
    assert!(serde_json::from_str::<BitLayout>(bad).is_err());
}
