use std::error::Error;

use clap::Args;
use tabled::settings::{Panel, Style};
use tabled::{Table, Tabled};

use crate::config::DecoderConfig;
use crate::constants::PROTOCOL_SHORT_NAME;
use crate::drivers::xbox_ble::hid_report::{DPadDirection, REPORT_SIZE};
use crate::drivers::xbox_ble::layout::PacketLayout;

#[derive(Args, Debug, Clone)]
pub struct LayoutCommand {
    /// Print the layout as JSON instead of tables
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    name: String,
    #[tabled(rename = "Offset")]
    offset: usize,
    #[tabled(rename = "Width")]
    width: usize,
    #[tabled(rename = "Encoding")]
    encoding: String,
}

#[derive(Tabled)]
struct ButtonRow {
    #[tabled(rename = "Button")]
    label: String,
    #[tabled(rename = "Mask")]
    mask: String,
    #[tabled(rename = "Filter")]
    filter_key: String,
}

#[derive(Tabled)]
struct DPadRow {
    #[tabled(rename = "Code")]
    code: u8,
    #[tabled(rename = "Direction")]
    label: String,
}

pub fn handle_layout(config: &DecoderConfig, cmd: LayoutCommand) -> Result<(), Box<dyn Error>> {
    let layout = PacketLayout::xbox_ble();
    layout.validate()?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(layout.fields())?);
        return Ok(());
    }

    let fields: Vec<FieldRow> = layout
        .fields()
        .iter()
        .map(|field| {
            let encoding = match field.bit_fields {
                Some(flags) => format!("uint, {}, {} flags", field.endianness, flags.len()),
                None if field.byte_width == 1 => "uint".to_string(),
                None => format!("uint, {}", field.endianness),
            };
            FieldRow {
                name: field.name.to_string(),
                offset: field.byte_offset,
                width: field.byte_width,
                encoding,
            }
        })
        .collect();
    let mut table = Table::new(fields);
    table
        .with(Style::modern_rounded())
        .with(Panel::header(format!("{PROTOCOL_SHORT_NAME} Input Report")));
    println!("{table}");
    println!("Report length: {REPORT_SIZE} bytes");

    let buttons: Vec<ButtonRow> = layout
        .fields()
        .iter()
        .filter_map(|field| field.bit_fields)
        .flatten()
        .map(|button| ButtonRow {
            label: button.label(config.labels).to_string(),
            mask: format!("0x{:06x}", button.mask()),
            filter_key: button.filter_key().to_string(),
        })
        .collect();
    let mut table = Table::new(buttons);
    table
        .with(Style::modern_rounded())
        .with(Panel::header("Buttons"));
    println!("{table}");

    let directions: Vec<DPadRow> = (0..=u8::MAX)
        .map_while(DPadDirection::from_code)
        .map(|direction| DPadRow {
            code: direction.code(),
            label: direction.label().to_string(),
        })
        .collect();
    let mut table = Table::new(directions);
    table
        .with(Style::modern_rounded())
        .with(Panel::header("Directional Pad"));
    println!("{table}");

    Ok(())
}
