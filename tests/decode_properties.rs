//! Property-based tests for the Xbox BLE input report decoder.
//!
//! Covers:
//! - determinism and trailing-byte handling for full reports
//! - partial decoding of truncated reports
//! - round trips through the packed report image
//! - D-pad symbol resolution and button flag independence

use packed_struct::PackedStruct;
use proptest::prelude::*;
use xbox_ble_report::drivers::xbox_ble::{
    decoder::{DecodeError, Decoder},
    hid_report::{Button, ButtonSet, DPadDirection, InputDataReport, BUTTON_MASK, REPORT_SIZE},
    layout::{FieldId, PacketLayout},
};

fn arb_button() -> impl Strategy<Value = Button> {
    prop::sample::select(Button::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Decoding the same bytes twice yields identical reports
    #[test]
    fn prop_decode_is_deterministic(buf in prop::collection::vec(any::<u8>(), REPORT_SIZE)) {
        let decoder = Decoder::default();
        let first = decoder.decode(&buf);
        let second = decoder.decode(&buf);
        prop_assert!(first.is_ok());
        prop_assert_eq!(first.ok(), second.ok());
    }

    /// Bytes after the report are ignored
    #[test]
    fn prop_trailing_bytes_ignored(
        buf in prop::collection::vec(any::<u8>(), REPORT_SIZE),
        extra in prop::collection::vec(any::<u8>(), 1..32),
    ) {
        let decoder = Decoder::default();
        let mut long = buf.clone();
        long.extend_from_slice(&extra);
        prop_assert_eq!(decoder.decode(&long).ok(), decoder.decode(&buf).ok());
    }

    /// Short buffers report truncation and populate exactly the fields that fit
    #[test]
    fn prop_truncated_fields(buf in prop::collection::vec(any::<u8>(), 0..REPORT_SIZE)) {
        let decoder = Decoder::default();
        let layout = PacketLayout::xbox_ble();
        let result = decoder.decode(&buf);
        let Err(err) = result else {
            return Err(TestCaseError::fail("short buffer decoded without error"));
        };
        let DecodeError::TruncatedPacket { bytes_available, bytes_expected, .. } = &err;
        prop_assert_eq!(*bytes_available, buf.len());
        prop_assert_eq!(*bytes_expected, REPORT_SIZE);
        prop_assert_eq!(err.bytes_missing(), REPORT_SIZE - buf.len());

        let partial = err.partial();
        for field in layout.fields() {
            let fits = field.byte_offset + field.byte_width <= buf.len();
            prop_assert_eq!(
                partial.value(field.id).is_some(),
                fits,
                "field {} with {} bytes",
                field.name,
                buf.len()
            );
        }
    }

    /// Values packed into a report are decoded unchanged
    #[test]
    fn prop_round_trip(
        l_stick_x in any::<u16>(),
        l_stick_y in any::<u16>(),
        r_stick_x in any::<u16>(),
        r_stick_y in any::<u16>(),
        trigger_l in any::<u16>(),
        trigger_r in any::<u16>(),
        dpad_state in any::<u8>(),
        buttons in 0u32..=0xFF_FFFF,
    ) {
        let mut report = InputDataReport {
            l_stick_x,
            l_stick_y,
            r_stick_x,
            r_stick_y,
            trigger_l,
            trigger_r,
            dpad_state,
            ..Default::default()
        };
        report.set_button_state(ButtonSet::from_raw(buttons));
        let buf = report.pack().map_err(|e| TestCaseError::fail(e.to_string()))?;

        let decoded = Decoder::default()
            .decode(&buf)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(decoded.left_stick(), Some((l_stick_x, l_stick_y)));
        prop_assert_eq!(decoded.right_stick(), Some((r_stick_x, r_stick_y)));
        prop_assert_eq!(decoded.left_trigger, Some(trigger_l));
        prop_assert_eq!(decoded.right_trigger, Some(trigger_r));
        prop_assert_eq!(decoded.value(FieldId::DirectionalPad), Some(u32::from(dpad_state)));
        prop_assert_eq!(decoded.value(FieldId::Buttons), Some(buttons));
    }

    /// Codes 0-8 resolve to a direction, every other code is unknown
    #[test]
    fn prop_dpad_resolution(code in any::<u8>()) {
        let mut buf = [0u8; REPORT_SIZE];
        buf[12] = code;
        let decoded = Decoder::default()
            .decode(&buf)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let dpad = decoded.directional_pad.ok_or_else(|| TestCaseError::fail("missing dpad"))?;
        prop_assert_eq!(dpad.code, code);
        prop_assert_eq!(dpad.direction.is_some(), code <= 8);
        if let Some(direction) = dpad.direction {
            prop_assert_eq!(direction.code(), code);
        }
    }

    /// Pressed buttons are exactly the named bits set, reserved bits never
    /// contribute a flag
    #[test]
    fn prop_button_flags_independent(
        pressed in prop::collection::hash_set(arb_button(), 0..=6),
        reserved in any::<u32>(),
    ) {
        let pressed: Vec<Button> = pressed.into_iter().collect();
        let named = ButtonSet::from_buttons(&pressed).raw();
        let raw = named | (reserved & !BUTTON_MASK & 0xFF_FFFF);

        let mut buf = [0u8; REPORT_SIZE];
        buf[13..].copy_from_slice(&raw.to_be_bytes()[1..]);
        let decoded = Decoder::default()
            .decode(&buf)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let buttons = decoded.buttons.ok_or_else(|| TestCaseError::fail("missing buttons"))?;

        let expected: Vec<Button> = Button::ALL
            .into_iter()
            .filter(|button| pressed.contains(button))
            .collect();
        prop_assert_eq!(buttons.iter().collect::<Vec<_>>(), expected);
        prop_assert_eq!(buttons.raw(), raw);
    }
}

#[test]
fn test_reference_scenarios() -> Result<(), Box<dyn std::error::Error>> {
    let buf = [
        0x00, 0x64, 0xFF, 0x9C, 0x01, 0x2C, 0x03, 0xE8, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x01, 0x00,
        0x00,
    ];
    let decoder = Decoder::default();
    let report = decoder.decode(&buf)?;
    assert_eq!(report.left_stick(), Some((100, 65436)));
    assert_eq!(report.right_stick(), Some((300, 1000)));
    assert_eq!(report.left_trigger, Some(0));
    assert_eq!(report.right_trigger, Some(65535));
    assert_eq!(
        report.directional_pad.and_then(|d| d.direction),
        Some(DPadDirection::Right)
    );
    assert_eq!(
        report.buttons.map(|b| b.iter().collect::<Vec<_>>()),
        Some(vec![Button::A])
    );

    let err = decoder
        .decode(&buf[..8])
        .err()
        .ok_or("8 byte buffer should be truncated")?;
    let DecodeError::TruncatedPacket {
        bytes_available,
        bytes_expected,
        partial,
    } = err;
    assert_eq!((bytes_available, bytes_expected), (8, REPORT_SIZE));
    assert_eq!(partial.left_stick(), Some((100, 65436)));
    assert_eq!(partial.right_stick(), Some((300, 1000)));
    assert_eq!(partial.left_trigger, None);
    assert_eq!(partial.right_trigger, None);
    assert_eq!(partial.directional_pad, None);
    assert_eq!(partial.buttons, None);

    Ok(())
}
