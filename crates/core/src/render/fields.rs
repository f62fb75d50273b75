use std::fmt;

use crate::{
    format::format_time_range,
    types::{ContentBlock, Field},
};

/// Shown in place of a field whose value is absent or empty.
pub const MISSING_VALUE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteColor {
    pub name: &'static str,
    pub hex: &'static str,
    pub rgb: (u8, u8, u8),
    /// Closest xterm-256 index, for terminals.
    pub ansi256: u8,
}

pub const PALETTE: [PaletteColor; 5] = [
    PaletteColor {
        name: "blue",
        hex: "#1976d2",
        rgb: (0x19, 0x76, 0xd2),
        ansi256: 32,
    },
    PaletteColor {
        name: "red",
        hex: "#d32f2f",
        rgb: (0xd3, 0x2f, 0x2f),
        ansi256: 160,
    },
    PaletteColor {
        name: "green",
        hex: "#388e3c",
        rgb: (0x38, 0x8e, 0x3c),
        ansi256: 28,
    },
    PaletteColor {
        name: "orange",
        hex: "#f57c00",
        rgb: (0xf5, 0x7c, 0x00),
        ansi256: 208,
    },
    PaletteColor {
        name: "purple",
        hex: "#7b1fa2",
        rgb: (0x7b, 0x1f, 0xa2),
        ansi256: 91,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedField {
    pub name: String,
    pub value: String,
    pub color: PaletteColor,
}

impl fmt::Display for RenderedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// Presentation of the focused content block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockView {
    pub index: usize,
    pub title: String,
    pub fields: Vec<RenderedField>,
}

/// Palette slot for each name, assigned round-robin the first time a name is
/// seen. Later repeats of a name reuse its slot.
pub fn assign_colors<'a, I>(names: I) -> Vec<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let (_, slots) = names.into_iter().fold(
        (Vec::<(&str, usize)>::new(), Vec::new()),
        |(mut seen, mut slots), name| {
            let known = seen.iter().find(|(n, _)| *n == name).map(|(_, slot)| *slot);
            let slot = match known {
                Some(slot) => slot,
                None => {
                    let slot = seen.len() % PALETTE.len();
                    seen.push((name, slot));
                    slot
                }
            };
            slots.push(slot);
            (seen, slots)
        },
    );
    slots
}

fn display_value(field: &Field) -> String {
    match field.value.value_string.as_deref() {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => MISSING_VALUE.to_string(),
    }
}

/// Render a block's fields as colored `name: value` entries, in field order.
pub fn render_block(block: &ContentBlock) -> Vec<RenderedField> {
    let slots = assign_colors(block.fields.iter().map(|f| f.name.as_str()));

    block
        .fields
        .iter()
        .zip(slots)
        .map(|(field, slot)| RenderedField {
            name: field.name.clone(),
            value: display_value(field),
            color: PALETTE[slot],
        })
        .collect()
}

/// Selector label of a block: `Content 3`, or `Content 3 [00:10–00:25]` when
/// the block carries a time range.
pub fn block_title(index: usize, block: &ContentBlock) -> String {
    match format_time_range(block.start_time_ms, block.end_time_ms) {
        Some(range) => format!("Content {} {}", index + 1, range),
        None => format!("Content {}", index + 1),
    }
}

pub fn render_block_view(index: usize, block: &ContentBlock) -> BlockView {
    BlockView {
        index,
        title: block_title(index, block),
        fields: render_block(block),
    }
}
