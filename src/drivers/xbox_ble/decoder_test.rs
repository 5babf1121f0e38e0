use std::error::Error;
use std::sync::Arc;

use packed_struct::PackedStruct;

use crate::drivers::xbox_ble::{
    decoder::{DecodeError, DecodedReport, Decoder},
    hid_report::{Button, ButtonSet, DPadDirection, InputDataReport, REPORT_SIZE},
    layout::{FieldId, LayoutError, PacketLayout},
    router::AttRouter,
};

const SAMPLE: [u8; 16] = [
    0x00, 0x64, 0xFF, 0x9C, 0x01, 0x2C, 0x03, 0xE8, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x01, 0x00, 0x00,
];

#[tokio::test]
async fn test_decode_sample() -> Result<(), Box<dyn Error>> {
    let decoder = Decoder::default();
    let report = decoder.decode(&SAMPLE)?;

    assert_eq!(report.left_stick(), Some((100, 65436)));
    assert_eq!(report.right_stick(), Some((300, 1000)));
    assert_eq!(report.left_trigger, Some(0));
    assert_eq!(report.right_trigger, Some(65535));

    let dpad = report.directional_pad.ok_or("missing dpad")?;
    assert_eq!(dpad.code, 3);
    assert_eq!(dpad.direction, Some(DPadDirection::Right));
    assert_eq!(dpad.label(), "Right");

    let buttons = report.buttons.ok_or("missing buttons")?;
    assert_eq!(buttons.raw(), 0x010000);
    assert_eq!(buttons.iter().collect::<Vec<_>>(), vec![Button::A]);
    assert!(report.is_complete());

    Ok(())
}

#[tokio::test]
async fn test_decode_truncated() -> Result<(), Box<dyn Error>> {
    let decoder = Decoder::default();
    let Err(err) = decoder.decode(&SAMPLE[..8]) else {
        return Err("short buffer should fail".into());
    };

    let DecodeError::TruncatedPacket {
        bytes_available,
        bytes_expected,
        ..
    } = &err;
    assert_eq!(*bytes_available, 8);
    assert_eq!(*bytes_expected, REPORT_SIZE);
    assert_eq!(err.bytes_missing(), 8);

    let partial = err.into_partial();
    assert_eq!(partial.left_stick(), Some((100, 65436)));
    assert_eq!(partial.right_stick(), Some((300, 1000)));
    assert_eq!(partial.left_trigger, None);
    assert_eq!(partial.right_trigger, None);
    assert_eq!(partial.directional_pad, None);
    assert_eq!(partial.buttons, None);
    assert!(!partial.is_complete());

    Ok(())
}

#[tokio::test]
async fn test_decode_partial_field() -> Result<(), Box<dyn Error>> {
    let decoder = Decoder::default();

    // Half of the right stick Y axis is present and must not be decoded
    let err = decoder
        .decode(&SAMPLE[..7])
        .err()
        .ok_or("short buffer should fail")?;
    let partial = err.partial();
    assert_eq!(partial.right_stick_x, Some(300));
    assert_eq!(partial.right_stick_y, None);

    // Everything but the button field
    let err = decoder
        .decode(&SAMPLE[..15])
        .err()
        .ok_or("short buffer should fail")?;
    assert_eq!(err.bytes_missing(), 1);
    assert_eq!(err.partial().directional_pad.map(|d| d.code), Some(3));
    assert_eq!(err.partial().buttons, None);

    // Nothing at all
    let err = decoder.decode(&[]).err().ok_or("empty buffer should fail")?;
    assert_eq!(*err.partial(), DecodedReport::default());

    Ok(())
}

#[tokio::test]
async fn test_decode_ignores_trailing_bytes() -> Result<(), Box<dyn Error>> {
    let decoder = Decoder::default();
    let mut long = SAMPLE.to_vec();
    long.extend_from_slice(&[0xAA, 0xBB, 0xCC]);

    assert_eq!(decoder.decode(&long)?, decoder.decode(&SAMPLE)?);

    Ok(())
}

#[tokio::test]
async fn test_decode_unknown_dpad() -> Result<(), Box<dyn Error>> {
    let decoder = Decoder::default();
    let mut buf = SAMPLE;
    buf[12] = 0x0F;

    let report = decoder.decode(&buf)?;
    let dpad = report.directional_pad.ok_or("missing dpad")?;
    assert_eq!(dpad.code, 0x0F);
    assert_eq!(dpad.direction, None);
    assert!(!dpad.is_known());
    assert_eq!(dpad.label(), "Unknown");
    assert_eq!(report.value(FieldId::DirectionalPad), Some(0x0F));

    buf[12] = 0;
    let report = decoder.decode(&buf)?;
    assert_eq!(
        report.directional_pad.and_then(|d| d.direction),
        Some(DPadDirection::Centered)
    );

    Ok(())
}

#[tokio::test]
async fn test_decode_reserved_button_bits() -> Result<(), Box<dyn Error>> {
    let decoder = Decoder::default();
    let mut buf = SAMPLE;
    // Bits 1, 2 and 18 carry no named button
    buf[13] = 0x04;
    buf[14] = 0x00;
    buf[15] = 0x06;

    let report = decoder.decode(&buf)?;
    let buttons = report.buttons.ok_or("missing buttons")?;
    assert_eq!(buttons.raw(), 0x040006);
    assert_eq!(buttons.iter().count(), 0);

    Ok(())
}

#[tokio::test]
async fn test_decode_matches_packed_report() -> Result<(), Box<dyn Error>> {
    let mut report = InputDataReport {
        l_stick_x: 0x0102,
        l_stick_y: 0x0304,
        r_stick_x: 0x0506,
        r_stick_y: 0x0708,
        trigger_l: 0x090A,
        trigger_r: 0x0B0C,
        dpad_state: 0x07,
        ..Default::default()
    };
    report.set_button_state(ButtonSet::from_buttons(&[
        Button::BackLeft,
        Button::View,
        Button::JoyRightClick,
    ]));
    let buf = report.pack()?;

    let decoded = Decoder::default().decode(&buf)?;
    assert_eq!(decoded.value(FieldId::LeftStickX), Some(0x0102));
    assert_eq!(decoded.value(FieldId::LeftStickY), Some(0x0304));
    assert_eq!(decoded.value(FieldId::RightStickX), Some(0x0506));
    assert_eq!(decoded.value(FieldId::RightStickY), Some(0x0708));
    assert_eq!(decoded.value(FieldId::LeftTrigger), Some(0x090A));
    assert_eq!(decoded.value(FieldId::RightTrigger), Some(0x0B0C));
    assert_eq!(
        decoded.directional_pad.and_then(|d| d.direction),
        Some(DPadDirection::Left)
    );
    assert_eq!(
        decoded.buttons.map(|b| b.iter().collect::<Vec<_>>()),
        Some(vec![Button::BackLeft, Button::View, Button::JoyRightClick])
    );

    Ok(())
}

#[tokio::test]
async fn test_decode_concurrently() -> Result<(), Box<dyn Error>> {
    let decoder = Arc::new(Decoder::new(PacketLayout::xbox_ble())?);
    let expected = decoder.decode(&SAMPLE)?;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let decoder = decoder.clone();
            std::thread::spawn(move || {
                (0..100)
                    .map(|_| decoder.decode(&SAMPLE).ok())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        let results = handle.join().map_err(|_| "decode thread panicked")?;
        assert!(results.iter().all(|r| *r == Some(expected)));
    }

    Ok(())
}

#[tokio::test]
async fn test_router() -> Result<(), Box<dyn Error>> {
    let router = AttRouter::default();
    assert!(router.routes(0x001E));
    assert_eq!(router.handles().collect::<Vec<_>>(), vec![0x001E]);

    assert!(router.dispatch(0x0020, &SAMPLE).is_none());

    let report = router.dispatch(0x001E, &SAMPLE).ok_or("should route")??;
    assert_eq!(report.left_stick(), Some((100, 65436)));

    let result = router.dispatch(0x001E, &SAMPLE[..4]).ok_or("should route")?;
    assert!(matches!(result, Err(DecodeError::TruncatedPacket { .. })));

    Ok(())
}

#[tokio::test]
async fn test_decoder_rejects_invalid_layout() -> Result<(), Box<dyn Error>> {
    // Left stick X grown into the Y axis
    let mut fields = PacketLayout::xbox_ble().fields().to_vec();
    fields[0].byte_width = 3;
    let result = Decoder::new(PacketLayout::new(fields.clone(), REPORT_SIZE));
    assert!(matches!(
        result,
        Err(LayoutError::Overlap("left_stick_y", "left_stick_x"))
    ));

    // Left stick X widened without overlapping, its top byte would be lost
    for field in fields.iter_mut().skip(1) {
        field.byte_offset += 1;
    }
    let result = Decoder::new(PacketLayout::new(fields, REPORT_SIZE + 1));
    assert!(matches!(
        result,
        Err(LayoutError::WidthMismatch("left_stick_x", 3, 2))
    ));

    let decoder = Decoder::new(PacketLayout::xbox_ble())?;
    assert_eq!(decoder.decode(&SAMPLE)?.left_stick_x, Some(100));

    Ok(())
}
