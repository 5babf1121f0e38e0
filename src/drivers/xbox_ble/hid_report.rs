//! Wire image and symbol tables for the input report an Xbox Wireless
//! Controller notifies over its Bluetooth LE HID characteristic.
//!
//! Sample captures (ATT handle 0x001E):
//!
//! Idle, sticks centered
//! 80 00 80 00 80 00 80 00 00 00 00 00 00 00 00 00
//!
//! A pressed, D-pad right, right trigger fully pulled
//! 80 00 80 00 80 00 80 00 00 00 ff ff 03 01 00 00
use std::fmt::Display;

use packed_struct::prelude::*;
use packed_struct::types::{Integer, SizedInteger};
use serde::ser::SerializeStruct;
use serde::Serialize;

use super::tree::LabelStyle;

/// Size in bytes of a complete input report
pub const REPORT_SIZE: usize = 16;

/// Bits of the button field that carry a named button
pub const BUTTON_MASK: u32 = 0xDB7C01;

/// Directions reported by the D-pad byte. Codes go clockwise starting at "Top".
#[derive(PrimitiveEnum_u8, Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub enum DPadDirection {
    #[default]
    Centered = 0,
    Top = 1,
    TopRight = 2,
    Right = 3,
    BottomRight = 4,
    Bottom = 5,
    BottomLeft = 6,
    Left = 7,
    TopLeft = 8,
}

impl DPadDirection {
    /// Resolve a raw D-pad code. Returns `None` for codes outside 0-8.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::from_primitive(code)
    }

    pub fn code(&self) -> u8 {
        self.to_primitive()
    }

    /// Compass label for the direction
    pub fn label(&self) -> &'static str {
        match self {
            Self::Centered => "Centered",
            Self::Top => "Top",
            Self::TopRight => "Top-Right",
            Self::Right => "Right",
            Self::BottomRight => "Bottom-Right",
            Self::Bottom => "Bottom",
            Self::BottomLeft => "Bottom-Left",
            Self::Left => "Left",
            Self::TopLeft => "Top-Left",
        }
    }
}

impl Display for DPadDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Named buttons in the 24-bit button field
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Button {
    BackLeft,
    BackRight,
    Profile,
    View,
    Menu,
    Xbox,
    A,
    B,
    X,
    Y,
    JoyLeftClick,
    JoyRightClick,
}

impl Button {
    /// Every named button in the order flags are checked and reported
    pub const ALL: [Button; 12] = [
        Button::BackLeft,
        Button::BackRight,
        Button::Profile,
        Button::View,
        Button::Menu,
        Button::Xbox,
        Button::A,
        Button::B,
        Button::X,
        Button::Y,
        Button::JoyLeftClick,
        Button::JoyRightClick,
    ];

    /// Single-bit mask of the button within the 24-bit field
    pub fn mask(&self) -> u32 {
        match self {
            Button::Profile => 0x000001,
            Button::View => 0x000400,
            Button::Menu => 0x000800,
            Button::Xbox => 0x001000,
            Button::JoyLeftClick => 0x002000,
            Button::JoyRightClick => 0x004000,
            Button::A => 0x010000,
            Button::B => 0x020000,
            Button::X => 0x080000,
            Button::Y => 0x100000,
            Button::BackLeft => 0x400000,
            Button::BackRight => 0x800000,
        }
    }

    /// Identifier used in programmatic output (JSON, CLI arguments)
    pub fn name(&self) -> &'static str {
        match self {
            Button::BackLeft => "back_left",
            Button::BackRight => "back_right",
            Button::Profile => "profile",
            Button::View => "view",
            Button::Menu => "menu",
            Button::Xbox => "xbox",
            Button::A => "a",
            Button::B => "b",
            Button::X => "x",
            Button::Y => "y",
            Button::JoyLeftClick => "joy_left_click",
            Button::JoyRightClick => "joy_right_click",
        }
    }

    /// Look up a button by its [Button::name]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|button| button.name().eq_ignore_ascii_case(name))
    }

    /// Display label in the field tree
    pub fn label(&self, style: LabelStyle) -> &'static str {
        match self {
            Button::BackLeft => "Back Left",
            Button::BackRight => "Back Right",
            Button::Profile => "Profile",
            Button::View => "View",
            Button::Menu => "Menu",
            Button::Xbox => "Xbox",
            Button::A => "A",
            Button::B => "B",
            Button::X => "X",
            Button::Y => "Y",
            Button::JoyLeftClick => match style {
                LabelStyle::Legacy => "Joystic Left",
                LabelStyle::Corrected => "Joystick Left",
            },
            Button::JoyRightClick => "Joystick Right",
        }
    }

    /// Display filter key of the flag
    pub fn filter_key(&self) -> &'static str {
        match self {
            Button::BackLeft => "xbox.btn.bck.left",
            Button::BackRight => "xbox.btn.bck.right",
            Button::Profile => "xbox.btn.profile",
            Button::View => "xbox.btn.view",
            Button::Menu => "xbox.btn.menu",
            Button::Xbox => "xbox.btn.xbox",
            Button::A => "xbox.btn.a",
            Button::B => "xbox.btn.b",
            Button::X => "xbox.btn.x",
            Button::Y => "xbox.btn.y",
            Button::JoyLeftClick => "xbox.btn.joy.left",
            Button::JoyRightClick => "xbox.btn.joy.right",
        }
    }
}

impl Display for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The 24-bit button field viewed as a set of named flags. The raw value is
/// kept as-is, reserved bits included, but only named buttons are ever
/// reported as pressed.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct ButtonSet {
    raw: u32,
}

impl ButtonSet {
    pub fn from_raw(raw: u32) -> Self {
        Self {
            raw: raw & 0xFF_FFFF,
        }
    }

    /// Build a set with exactly the given buttons pressed
    pub fn from_buttons(buttons: &[Button]) -> Self {
        let raw = buttons.iter().fold(0, |acc, button| acc | button.mask());
        Self { raw }
    }

    pub fn raw(&self) -> u32 {
        self.raw
    }

    pub fn contains(&self, button: Button) -> bool {
        self.raw & button.mask() != 0
    }

    /// Pressed buttons in [Button::ALL] order
    pub fn iter(&self) -> impl Iterator<Item = Button> + '_ {
        Button::ALL
            .into_iter()
            .filter(move |button| self.contains(*button))
    }

    pub fn is_empty(&self) -> bool {
        self.raw & BUTTON_MASK == 0
    }

    /// Bits that are set but carry no named button
    pub fn reserved_bits(&self) -> u32 {
        self.raw & !BUTTON_MASK
    }
}

impl Serialize for ButtonSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let pressed: Vec<&'static str> = self.iter().map(|button| button.name()).collect();
        let mut state = serializer.serialize_struct("ButtonSet", 2)?;
        state.serialize_field("raw", &self.raw)?;
        state.serialize_field("pressed", &pressed)?;
        state.end()
    }
}

/// Input data report. All multi-byte values are big endian.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "16")]
pub struct InputDataReport {
    // Axes
    // BYTES 0-1
    #[packed_field(bytes = "0..=1", endian = "msb")]
    pub l_stick_x: u16,
    // BYTES 2-3
    #[packed_field(bytes = "2..=3", endian = "msb")]
    pub l_stick_y: u16,
    // BYTES 4-5
    #[packed_field(bytes = "4..=5", endian = "msb")]
    pub r_stick_x: u16,
    // BYTES 6-7
    #[packed_field(bytes = "6..=7", endian = "msb")]
    pub r_stick_y: u16,

    // Triggers
    // BYTES 8-9
    #[packed_field(bytes = "8..=9", endian = "msb")]
    pub trigger_l: u16,
    // BYTES 10-11
    #[packed_field(bytes = "10..=11", endian = "msb")]
    pub trigger_r: u16,

    // BYTE 12
    // Raw code, resolve with [DPadDirection::from_code]
    #[packed_field(bytes = "12")]
    pub dpad_state: u8,

    // Buttons
    // BYTES 13-15
    #[packed_field(bytes = "13..=15", endian = "msb")]
    pub buttons: Integer<u32, packed_bits::Bits<24>>,
}

impl InputDataReport {
    pub fn button_state(&self) -> ButtonSet {
        ButtonSet::from_raw(self.buttons.to_primitive())
    }

    pub fn set_button_state(&mut self, buttons: ButtonSet) {
        self.buttons = Integer::from_primitive(buttons.raw());
    }

    pub fn dpad_direction(&self) -> Option<DPadDirection> {
        DPadDirection::from_code(self.dpad_state)
    }

    pub fn set_dpad_direction(&mut self, direction: DPadDirection) {
        self.dpad_state = direction.code();
    }
}

impl Default for InputDataReport {
    fn default() -> Self {
        Self {
            l_stick_x: 0x8000,
            l_stick_y: 0x8000,
            r_stick_x: 0x8000,
            r_stick_y: 0x8000,
            trigger_l: Default::default(),
            trigger_r: Default::default(),
            dpad_state: Default::default(),
            buttons: Default::default(),
        }
    }
}
