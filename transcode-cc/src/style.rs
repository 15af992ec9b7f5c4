//! Caption colors and inline style markup.
//!
//! Both decoders serialize rows of character cells into text with inline
//! `<i>`, `<u>` and `<font color="#RRGGBB">` tags around each row's span.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Creates a new color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const CYAN: Color = Color::rgb(0, 255, 255);
    pub const MAGENTA: Color = Color::rgb(255, 0, 255);

    /// Decode a CEA-708 `RRGGBB` 6-bit color (two bits per component).
    pub fn from_dtvcc(value: u8) -> Self {
        let scale = |v: u8| (v & 0x03) * 85;
        Color::rgb(scale(value >> 4), scale(value >> 2), scale(value))
    }

    /// Formats the color as `#RRGGBB`.
    pub fn to_hex(self) -> String {
        self.to_string()
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// The seven foreground colors of the line-21 protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LegacyColor {
    #[default]
    White,
    Green,
    Blue,
    Cyan,
    Red,
    Yellow,
    Magenta,
}

impl LegacyColor {
    /// Parse from the 3-bit color field of a PAC or mid-row code.
    ///
    /// Returns `None` for 7, which selects italics instead of a color.
    pub fn from_code(code: u8) -> Option<Self> {
        match code & 0x07 {
            0 => Some(LegacyColor::White),
            1 => Some(LegacyColor::Green),
            2 => Some(LegacyColor::Blue),
            3 => Some(LegacyColor::Cyan),
            4 => Some(LegacyColor::Red),
            5 => Some(LegacyColor::Yellow),
            6 => Some(LegacyColor::Magenta),
            _ => None,
        }
    }

    /// Convert to an RGB color.
    pub fn to_color(self) -> Color {
        match self {
            LegacyColor::White => Color::WHITE,
            LegacyColor::Green => Color::GREEN,
            LegacyColor::Blue => Color::BLUE,
            LegacyColor::Cyan => Color::CYAN,
            LegacyColor::Red => Color::RED,
            LegacyColor::Yellow => Color::YELLOW,
            LegacyColor::Magenta => Color::MAGENTA,
        }
    }
}

/// Style applied to one serialized row span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpanStyle {
    pub italic: bool,
    pub underline: bool,
    /// Foreground color; `None` is the default (white).
    pub color: Option<Color>,
}

impl SpanStyle {
    /// Build a style, folding white into the default color.
    pub fn new(italic: bool, underline: bool, color: Color) -> Self {
        Self {
            italic,
            underline,
            color: (color != Color::WHITE).then_some(color),
        }
    }

    fn open(&self, out: &mut String) {
        if let Some(color) = self.color {
            out.push_str("<font color=\"");
            out.push_str(&color.to_hex());
            out.push_str("\">");
        }
        if self.underline {
            out.push_str("<u>");
        }
        if self.italic {
            out.push_str("<i>");
        }
    }

    fn close(&self, out: &mut String) {
        if self.italic {
            out.push_str("</i>");
        }
        if self.underline {
            out.push_str("</u>");
        }
        if self.color.is_some() {
            out.push_str("</font>");
        }
    }
}

/// Index range `[first, last]` of the non-blank cells in a row.
pub(crate) fn trimmed_span<T>(cells: &[T], is_blank: impl Fn(&T) -> bool) -> Option<(usize, usize)> {
    let first = cells.iter().position(|c| !is_blank(c))?;
    let last = cells.iter().rposition(|c| !is_blank(c))?;
    Some((first, last))
}

/// Append one styled row followed by a line terminator.
pub(crate) fn push_row(out: &mut String, style: &SpanStyle, glyphs: impl Iterator<Item = char>) {
    style.open(out);
    out.extend(glyphs);
    style.close(out);
    out.push('\n');
}
