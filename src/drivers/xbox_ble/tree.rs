//! Renders a [DecodedReport] as a labelled field tree and summary columns in
//! the style of a packet analyzer.
use std::fmt::Display;
use std::ops::Range;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::constants::{PROTOCOL_COLUMN, PROTOCOL_FILTER_NAME, PROTOCOL_NAME, SUMMARY_INFO};

use super::{
    decoder::DecodedReport,
    layout::{FieldId, PacketLayout},
};

/// Label set used when rendering the field tree
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStyle {
    /// Labels and filter keys as emitted by existing tooling, typos included
    #[default]
    Legacy,
    /// Spelling fixed and trigger filter keys un-swapped
    Corrected,
}

/// Content of the info column
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStyle {
    /// Always "XBOX action"
    #[default]
    Plain,
    /// Pressed buttons and D-pad direction appended
    Detailed,
}

/// Value shown next to a tree item label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum ItemValue {
    /// Grouping item without a value of its own
    None,
    Decimal(u32),
    /// Value shown as hexadecimal with the given number of digits
    Hex { value: u32, digits: usize },
    Enumerated { code: u32, label: String },
    /// Single flag within a bit vector field of the given width in bits
    Flag { mask: u32, bits: u32, set: bool },
}

/// One line in the field tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeItem {
    pub label: String,
    pub filter_key: &'static str,
    pub bytes: Range<usize>,
    pub value: ItemValue,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeItem>,
}

impl TreeItem {
    fn new(label: &str, filter_key: &'static str, bytes: Range<usize>, value: ItemValue) -> Self {
        Self {
            label: label.to_string(),
            filter_key,
            bytes,
            value,
            children: Vec::new(),
        }
    }

    /// Find an item in this subtree by its filter key
    pub fn find(&self, filter_key: &str) -> Option<&TreeItem> {
        if self.filter_key == filter_key {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find(filter_key))
    }

    fn write_indented(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        let indent = "    ".repeat(depth);
        match &self.value {
            ItemValue::None => writeln!(f, "{indent}{}", self.label)?,
            ItemValue::Decimal(value) => writeln!(f, "{indent}{}: {value}", self.label)?,
            ItemValue::Hex { value, digits } => {
                writeln!(f, "{indent}{}: 0x{value:0digits$x}", self.label)?
            }
            ItemValue::Enumerated { code, label } => {
                writeln!(f, "{indent}{}: {label} ({code:#04x})", self.label)?
            }
            ItemValue::Flag { mask, bits, set } => {
                let pattern = bit_pattern(*mask, *bits, *set);
                let state = if *set { "True" } else { "False" };
                writeln!(f, "{indent}{pattern} = {}: {state}", self.label)?
            }
        }
        for child in self.children.iter() {
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

/// Draw the bits of a flag like "0000 .... .... = " with only the masked
/// bits shown as digits.
fn bit_pattern(mask: u32, bits: u32, set: bool) -> String {
    let mut pattern = String::with_capacity((bits + bits / 4) as usize);
    for bit in (0..bits).rev() {
        if bit != bits - 1 && (bit + 1) % 4 == 0 {
            pattern.push(' ');
        }
        let c = if mask & (1 << bit) == 0 {
            '.'
        } else if set {
            '1'
        } else {
            '0'
        };
        pattern.push(c);
    }
    pattern
}

/// Protocol and info columns for one report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub protocol: &'static str,
    pub info: String,
}

impl Summary {
    pub fn new(report: &DecodedReport, style: SummaryStyle) -> Self {
        let info = match style {
            SummaryStyle::Plain => SUMMARY_INFO.to_string(),
            SummaryStyle::Detailed => detailed_info(report),
        };
        Self {
            protocol: PROTOCOL_COLUMN,
            info,
        }
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}  {}", self.protocol, self.info)
    }
}

fn detailed_info(report: &DecodedReport) -> String {
    let mut info = String::from(SUMMARY_INFO);
    let mut parts = Vec::new();
    if let Some(buttons) = report.buttons {
        let pressed: Vec<&str> = buttons
            .iter()
            .map(|button| button.label(LabelStyle::Corrected))
            .collect();
        if !pressed.is_empty() {
            parts.push(pressed.join(" "));
        }
    }
    if let Some(dpad) = report.directional_pad {
        if dpad.code != 0 {
            parts.push(format!("D-pad {}", dpad.label()));
        }
    }
    if !parts.is_empty() {
        info.push_str(": ");
        info.push_str(&parts.join(", "));
    }
    info
}

/// Field tree of one decoded report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTree {
    pub root: TreeItem,
    pub summary: Summary,
}

impl ReportTree {
    /// Build the field tree for a report. Only fields that were decoded get
    /// an item; groups whose fields are all missing are left out.
    pub fn new(
        report: &DecodedReport,
        layout: &PacketLayout,
        labels: LabelStyle,
        summary: SummaryStyle,
    ) -> Self {
        let mut root = TreeItem::new(
            PROTOCOL_NAME,
            PROTOCOL_FILTER_NAME,
            0..layout.total_len(),
            ItemValue::None,
        );

        let sticks = [
            (
                FieldId::LeftStickX,
                FieldId::LeftStickY,
                "xbox.joyleft",
                ["xbox.joyleft.x", "xbox.joyleft.y"],
                match labels {
                    LabelStyle::Legacy => "Joystic Left",
                    LabelStyle::Corrected => "Joystick Left",
                },
            ),
            (
                FieldId::RightStickX,
                FieldId::RightStickY,
                "xbox.joyright",
                ["xbox.joyright.x", "xbox.joyright.y"],
                match labels {
                    LabelStyle::Legacy => "Joystic Right",
                    LabelStyle::Corrected => "Joystick Right",
                },
            ),
        ];
        for (x_id, y_id, key, [x_key, y_key], label) in sticks {
            let mut children = Vec::new();
            for (id, axis_key, axis_label) in [(x_id, x_key, "X axis"), (y_id, y_key, "Y axis")] {
                if let Some(item) = value_item(report, layout, id, axis_label, axis_key) {
                    children.push(item);
                }
            }
            let (Some(first), Some(last)) = (children.first(), children.last()) else {
                continue;
            };
            let mut group = TreeItem::new(
                label,
                key,
                first.bytes.start..last.bytes.end,
                ItemValue::None,
            );
            group.children = children;
            root.children.push(group);
        }

        // Existing tooling filters the left trigger as "xbox.trgright" and
        // the right trigger as "xbox.trgleft".
        let (left_key, right_key) = match labels {
            LabelStyle::Legacy => ("xbox.trgright", "xbox.trgleft"),
            LabelStyle::Corrected => ("xbox.trgleft", "xbox.trgright"),
        };
        let triggers = [
            (FieldId::LeftTrigger, "Trigger Left", left_key),
            (FieldId::RightTrigger, "Trigger Right", right_key),
        ];
        for (id, label, key) in triggers {
            if let Some(item) = value_item(report, layout, id, label, key) {
                root.children.push(item);
            }
        }

        if let (Some(dpad), Some(spec)) = (
            report.directional_pad,
            layout.field(FieldId::DirectionalPad),
        ) {
            let value = ItemValue::Enumerated {
                code: u32::from(dpad.code),
                label: dpad.label().to_string(),
            };
            let bytes = spec.byte_offset..spec.end();
            root.children
                .push(TreeItem::new("Directional Pad", "xbox.dpad", bytes, value));
        }

        if let (Some(buttons), Some(spec)) = (report.buttons, layout.field(FieldId::Buttons)) {
            let bits = (spec.byte_width * 8) as u32;
            let bytes = spec.byte_offset..spec.end();
            let value = ItemValue::Hex {
                value: buttons.raw(),
                digits: spec.byte_width * 2,
            };
            let mut item = TreeItem::new("Button", "xbox.btn", bytes.clone(), value);
            for button in spec.bit_fields.unwrap_or_default() {
                let flag = ItemValue::Flag {
                    mask: button.mask(),
                    bits,
                    set: buttons.contains(*button),
                };
                item.children.push(TreeItem::new(
                    button.label(labels),
                    button.filter_key(),
                    bytes.clone(),
                    flag,
                ));
            }
            root.children.push(item);
        }

        Self {
            root,
            summary: Summary::new(report, summary),
        }
    }

    /// Find an item in the tree by its filter key
    pub fn find(&self, filter_key: &str) -> Option<&TreeItem> {
        self.root.find(filter_key)
    }

    /// Returns the labels of all flags that are set under the "Button" item
    pub fn pressed_labels(&self) -> Vec<&str> {
        let Some(buttons) = self.find("xbox.btn") else {
            return Vec::new();
        };
        buttons
            .children
            .iter()
            .filter(|child| matches!(child.value, ItemValue::Flag { set: true, .. }))
            .map(|child| child.label.as_str())
            .collect()
    }
}

impl Display for ReportTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.root.write_indented(f, 0)
    }
}

fn value_item(
    report: &DecodedReport,
    layout: &PacketLayout,
    id: FieldId,
    label: &str,
    key: &'static str,
) -> Option<TreeItem> {
    let value = report.value(id)?;
    let spec = layout.field(id)?;
    Some(TreeItem::new(
        label,
        key,
        spec.byte_offset..spec.end(),
        ItemValue::Decimal(value),
    ))
}
