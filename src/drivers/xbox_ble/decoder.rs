use std::fmt::Display;

use serde::Serialize;
use thiserror::Error;

use super::{
    hid_report::{ButtonSet, DPadDirection},
    layout::{FieldId, LayoutError, PacketLayout},
};

/// Raw D-pad code together with its resolved direction. Unknown codes keep
/// their value and resolve to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DPadState {
    pub code: u8,
    pub direction: Option<DPadDirection>,
}

impl DPadState {
    pub fn from_code(code: u8) -> Self {
        Self {
            code,
            direction: DPadDirection::from_code(code),
        }
    }

    pub fn is_known(&self) -> bool {
        self.direction.is_some()
    }

    pub fn label(&self) -> &'static str {
        match self.direction {
            Some(direction) => direction.label(),
            None => "Unknown",
        }
    }
}

impl Display for DPadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (0x{:02x})", self.label(), self.code)
    }
}

impl Serialize for DPadState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("DPadState", 2)?;
        state.serialize_field("code", &self.code)?;
        state.serialize_field("label", self.label())?;
        state.end()
    }
}

/// Controller state decoded from one input report. Fields that did not fit
/// in the received buffer are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct DecodedReport {
    pub left_stick_x: Option<u16>,
    pub left_stick_y: Option<u16>,
    pub right_stick_x: Option<u16>,
    pub right_stick_y: Option<u16>,
    pub left_trigger: Option<u16>,
    pub right_trigger: Option<u16>,
    pub directional_pad: Option<DPadState>,
    pub buttons: Option<ButtonSet>,
}

impl DecodedReport {
    /// Raw numeric value of the given field
    pub fn value(&self, id: FieldId) -> Option<u32> {
        match id {
            FieldId::LeftStickX => self.left_stick_x.map(u32::from),
            FieldId::LeftStickY => self.left_stick_y.map(u32::from),
            FieldId::RightStickX => self.right_stick_x.map(u32::from),
            FieldId::RightStickY => self.right_stick_y.map(u32::from),
            FieldId::LeftTrigger => self.left_trigger.map(u32::from),
            FieldId::RightTrigger => self.right_trigger.map(u32::from),
            FieldId::DirectionalPad => self.directional_pad.map(|dpad| u32::from(dpad.code)),
            FieldId::Buttons => self.buttons.map(|buttons| buttons.raw()),
        }
    }

    /// Left stick (x, y), if both axes were decoded
    pub fn left_stick(&self) -> Option<(u16, u16)> {
        Some((self.left_stick_x?, self.left_stick_y?))
    }

    /// Right stick (x, y), if both axes were decoded
    pub fn right_stick(&self) -> Option<(u16, u16)> {
        Some((self.right_stick_x?, self.right_stick_y?))
    }

    /// Returns true if every field of the report was decoded
    pub fn is_complete(&self) -> bool {
        self.buttons.is_some()
            && self.directional_pad.is_some()
            && self.left_stick().is_some()
            && self.right_stick().is_some()
            && self.left_trigger.is_some()
            && self.right_trigger.is_some()
    }

    fn set(&mut self, id: FieldId, value: u32) {
        match id {
            FieldId::LeftStickX => self.left_stick_x = Some(value as u16),
            FieldId::LeftStickY => self.left_stick_y = Some(value as u16),
            FieldId::RightStickX => self.right_stick_x = Some(value as u16),
            FieldId::RightStickY => self.right_stick_y = Some(value as u16),
            FieldId::LeftTrigger => self.left_trigger = Some(value as u16),
            FieldId::RightTrigger => self.right_trigger = Some(value as u16),
            FieldId::DirectionalPad => {
                self.directional_pad = Some(DPadState::from_code(value as u8))
            }
            FieldId::Buttons => self.buttons = Some(ButtonSet::from_raw(value)),
        }
    }
}

/// Errors that can occur while decoding an input report
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The buffer ended before the last field. Every field that fit is still
    /// available through [DecodeError::partial].
    #[error("Truncated packet: got {bytes_available} of {bytes_expected} bytes")]
    TruncatedPacket {
        bytes_available: usize,
        bytes_expected: usize,
        partial: DecodedReport,
    },
}

impl DecodeError {
    /// The fields that could be decoded before the error
    pub fn partial(&self) -> &DecodedReport {
        match self {
            DecodeError::TruncatedPacket { partial, .. } => partial,
        }
    }

    pub fn into_partial(self) -> DecodedReport {
        match self {
            DecodeError::TruncatedPacket { partial, .. } => partial,
        }
    }

    /// Number of bytes missing from the end of the report
    pub fn bytes_missing(&self) -> usize {
        match self {
            DecodeError::TruncatedPacket {
                bytes_available,
                bytes_expected,
                ..
            } => bytes_expected.saturating_sub(*bytes_available),
        }
    }
}

/// Decodes input reports using a [PacketLayout]. The decoder holds no state
/// between calls and can be shared between threads.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    layout: PacketLayout,
}

impl Decoder {
    /// Create a decoder for the given layout. Fails if the layout does not
    /// pass [PacketLayout::validate].
    pub fn new(layout: PacketLayout) -> Result<Self, LayoutError> {
        layout.validate()?;
        Ok(Self { layout })
    }

    pub fn layout(&self) -> &PacketLayout {
        &self.layout
    }

    /// Decode the input report at the start of the given buffer. Bytes past
    /// the end of the report are ignored.
    pub fn decode(&self, buf: &[u8]) -> Result<DecodedReport, DecodeError> {
        let mut report = DecodedReport::default();
        for field in self.layout.fields() {
            // Fields are ordered by offset, nothing after this one fits either
            let Some(value) = field.read(buf) else {
                break;
            };
            report.set(field.id, value);
        }

        let bytes_expected = self.layout.total_len();
        if buf.len() < bytes_expected {
            log::trace!("Short report: {} of {bytes_expected} bytes", buf.len());
            return Err(DecodeError::TruncatedPacket {
                bytes_available: buf.len(),
                bytes_expected,
                partial: report,
            });
        }

        log::trace!("Decoded report: {report:?}");
        Ok(report)
    }
}
