use std::error::Error;

use clap::Args;
use packed_struct::PackedStruct;

use crate::drivers::xbox_ble::hid_report::{Button, ButtonSet, InputDataReport};

#[derive(Args, Debug, Clone)]
pub struct EncodeCommand {
    /// Left stick X axis
    #[arg(long, default_value_t = 0x8000)]
    pub left_x: u16,
    /// Left stick Y axis
    #[arg(long, default_value_t = 0x8000)]
    pub left_y: u16,
    /// Right stick X axis
    #[arg(long, default_value_t = 0x8000)]
    pub right_x: u16,
    /// Right stick Y axis
    #[arg(long, default_value_t = 0x8000)]
    pub right_y: u16,
    #[arg(long, default_value_t = 0)]
    pub left_trigger: u16,
    #[arg(long, default_value_t = 0)]
    pub right_trigger: u16,
    /// Raw D-pad code (0 = centered, 1-8 clockwise from top)
    #[arg(long, default_value_t = 0)]
    pub dpad: u8,
    /// Pressed buttons (e.g. "a", "back_left", "joy_right_click")
    #[arg(long = "button", short, value_parser = parse_button)]
    pub buttons: Vec<Button>,
}

fn parse_button(value: &str) -> Result<Button, String> {
    Button::from_name(value).ok_or_else(|| {
        let names: Vec<&str> = Button::ALL.iter().map(|b| b.name()).collect();
        format!("unknown button '{value}', expected one of: {}", names.join(", "))
    })
}

impl EncodeCommand {
    /// Build the input report described by the arguments
    pub fn to_report(&self) -> InputDataReport {
        let mut report = InputDataReport {
            l_stick_x: self.left_x,
            l_stick_y: self.left_y,
            r_stick_x: self.right_x,
            r_stick_y: self.right_y,
            trigger_l: self.left_trigger,
            trigger_r: self.right_trigger,
            dpad_state: self.dpad,
            ..Default::default()
        };
        report.set_button_state(ButtonSet::from_buttons(&self.buttons));
        report
    }
}

pub fn handle_encode(cmd: EncodeCommand) -> Result<(), Box<dyn Error>> {
    let report = cmd.to_report();
    log::trace!("Encoding report: {report:?}");
    let buf = report.pack()?;
    let bytes: Vec<String> = buf.iter().map(|b| format!("{b:02x}")).collect();
    println!("{}", bytes.join(" "));

    Ok(())
}
