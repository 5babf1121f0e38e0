//! Byte layout of the input report, described as data so that reports can be
//! walked field by field even when only part of one arrived.
use std::fmt::Display;

use serde::Serialize;
use thiserror::Error;

use super::hid_report::{Button, REPORT_SIZE};

/// Byte order of a multi-byte field. The Xbox report is big-endian only,
/// little-endian fields are read for layouts built with [PacketLayout::new].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Endianness {
    Big,
    Little,
}

impl Display for Endianness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Endianness::Big => "big-endian",
            Endianness::Little => "little-endian",
        };
        write!(f, "{}", value)
    }
}

/// Identifies a field of the input report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    LeftStickX,
    LeftStickY,
    RightStickX,
    RightStickY,
    LeftTrigger,
    RightTrigger,
    DirectionalPad,
    Buttons,
}

impl FieldId {
    /// Width in bytes of the value the field decodes into
    pub fn value_width(&self) -> usize {
        match self {
            FieldId::DirectionalPad => 1,
            FieldId::Buttons => 3,
            _ => 2,
        }
    }
}

/// Location and encoding of a single field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub id: FieldId,
    pub name: &'static str,
    pub byte_offset: usize,
    pub byte_width: usize,
    pub endianness: Endianness,
    /// Named single-bit flags when the field is a packed boolean vector
    #[serde(skip)]
    pub bit_fields: Option<&'static [Button]>,
}

impl FieldSpec {
    const fn uint(id: FieldId, name: &'static str, byte_offset: usize, byte_width: usize) -> Self {
        Self {
            id,
            name,
            byte_offset,
            byte_width,
            endianness: Endianness::Big,
            bit_fields: None,
        }
    }

    /// Offset one past the last byte of the field
    pub fn end(&self) -> usize {
        self.byte_offset + self.byte_width
    }

    /// Read the field from the given buffer as an unsigned integer. Returns
    /// `None` if the buffer is too short to hold the whole field.
    pub fn read(&self, buf: &[u8]) -> Option<u32> {
        let bytes = buf.get(self.byte_offset..self.end())?;
        let value = match self.endianness {
            Endianness::Big => bytes
                .iter()
                .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte)),
            Endianness::Little => bytes
                .iter()
                .rev()
                .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte)),
        };
        Some(value)
    }
}

/// Problems found when validating a [PacketLayout]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Field '{0}' has unsupported width of {1} bytes")]
    UnsupportedWidth(&'static str, usize),
    #[error("Field '{0}' is {1} bytes wide but its value is {2} bytes")]
    WidthMismatch(&'static str, usize, usize),
    #[error("Field '{0}' starts before the end of the previous field '{1}'")]
    Overlap(&'static str, &'static str),
    #[error("Field '{0}' ends at byte {1}, past the report length of {2}")]
    OutOfBounds(&'static str, usize, usize),
    #[error("Field widths add up to {0} bytes but the report length is {1}")]
    LengthMismatch(usize, usize),
    #[error("Bit flag mask 0x{0:06x} on field '{1}' does not fit the field")]
    MaskOutOfRange(u32, &'static str),
}

/// Ordered description of every field in the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketLayout {
    fields: Vec<FieldSpec>,
    total_len: usize,
}

impl PacketLayout {
    /// Create a layout from the given fields. The layout is not checked here,
    /// [Decoder::new](super::decoder::Decoder::new) rejects it if
    /// [PacketLayout::validate] fails.
    pub fn new(fields: Vec<FieldSpec>, total_len: usize) -> Self {
        Self { fields, total_len }
    }

    /// Layout of the Xbox controller BLE input report
    pub fn xbox_ble() -> Self {
        let buttons = FieldSpec {
            bit_fields: Some(&Button::ALL),
            ..FieldSpec::uint(FieldId::Buttons, "buttons", 13, 3)
        };
        let fields = vec![
            FieldSpec::uint(FieldId::LeftStickX, "left_stick_x", 0, 2),
            FieldSpec::uint(FieldId::LeftStickY, "left_stick_y", 2, 2),
            FieldSpec::uint(FieldId::RightStickX, "right_stick_x", 4, 2),
            FieldSpec::uint(FieldId::RightStickY, "right_stick_y", 6, 2),
            FieldSpec::uint(FieldId::LeftTrigger, "left_trigger", 8, 2),
            FieldSpec::uint(FieldId::RightTrigger, "right_trigger", 10, 2),
            FieldSpec::uint(FieldId::DirectionalPad, "directional_pad", 12, 1),
            buttons,
        ];
        let layout = Self::new(fields, REPORT_SIZE);
        debug_assert_eq!(layout.validate(), Ok(()), "invalid packet layout");
        layout
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Declared length of a complete report
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    pub fn field(&self, id: FieldId) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.id == id)
    }

    /// Check that fields are ordered, do not overlap, fit in the report and
    /// cover it exactly.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let mut previous: Option<&FieldSpec> = None;
        let mut width_sum = 0;
        for field in self.fields.iter() {
            if !(1..=3).contains(&field.byte_width) {
                return Err(LayoutError::UnsupportedWidth(field.name, field.byte_width));
            }
            if field.byte_width != field.id.value_width() {
                return Err(LayoutError::WidthMismatch(
                    field.name,
                    field.byte_width,
                    field.id.value_width(),
                ));
            }
            if let Some(previous) = previous {
                if field.byte_offset < previous.end() {
                    return Err(LayoutError::Overlap(field.name, previous.name));
                }
            }
            if field.end() > self.total_len {
                return Err(LayoutError::OutOfBounds(
                    field.name,
                    field.end(),
                    self.total_len,
                ));
            }
            if let Some(flags) = field.bit_fields {
                let field_mask = (1u32 << (field.byte_width * 8)) - 1;
                for flag in flags {
                    if flag.mask() & !field_mask != 0 {
                        return Err(LayoutError::MaskOutOfRange(flag.mask(), field.name));
                    }
                }
            }
            width_sum += field.byte_width;
            previous = Some(field);
        }

        if width_sum != self.total_len {
            return Err(LayoutError::LengthMismatch(width_sum, self.total_len));
        }

        Ok(())
    }
}

impl Default for PacketLayout {
    fn default() -> Self {
        Self::xbox_ble()
    }
}
