//! DTVCC code groups and command decoding.
//!
//! | Range       | Group | Meaning                                   |
//! |-------------|-------|-------------------------------------------|
//! | 0x00-0x1F   | C0    | basic control, 1-3 bytes by sub-range      |
//! | 0x20-0x7F   | G0    | standard text (ASCII, 0x7F = music note)   |
//! | 0x80-0x9F   | C1    | window/pen commands                        |
//! | 0xA0-0xFF   | G1    | Latin-1 text                               |
//!
//! `EXT1` (0x10) escapes into C2/G2/C3/G3 for the following byte.

use crate::error::{CaptionError, Result};

/// Extended code set escape.
pub const EXT1: u8 = 0x10;

/// 16-bit character prefix.
pub const P16: u8 = 0x18;

/// Static description of a control code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInfo {
    pub code: u8,
    pub name: &'static str,
    /// Total length in bytes, including the code itself.
    pub length: usize,
}

const fn info(code: u8, name: &'static str, length: usize) -> CommandInfo {
    CommandInfo { code, name, length }
}

/// C0 table, indexed by code.
pub static C0_COMMANDS: [CommandInfo; 32] = [
    info(0x00, "NUL", 1),
    info(0x01, "reserved", 1),
    info(0x02, "reserved", 1),
    info(0x03, "ETX", 1),
    info(0x04, "reserved", 1),
    info(0x05, "reserved", 1),
    info(0x06, "reserved", 1),
    info(0x07, "reserved", 1),
    info(0x08, "BS", 1),
    info(0x09, "reserved", 1),
    info(0x0A, "reserved", 1),
    info(0x0B, "reserved", 1),
    info(0x0C, "FF", 1),
    info(0x0D, "CR", 1),
    info(0x0E, "HCR", 1),
    info(0x0F, "reserved", 1),
    info(0x10, "EXT1", 2),
    info(0x11, "reserved", 2),
    info(0x12, "reserved", 2),
    info(0x13, "reserved", 2),
    info(0x14, "reserved", 2),
    info(0x15, "reserved", 2),
    info(0x16, "reserved", 2),
    info(0x17, "reserved", 2),
    info(0x18, "P16", 3),
    info(0x19, "reserved", 3),
    info(0x1A, "reserved", 3),
    info(0x1B, "reserved", 3),
    info(0x1C, "reserved", 3),
    info(0x1D, "reserved", 3),
    info(0x1E, "reserved", 3),
    info(0x1F, "reserved", 3),
];

/// C1 table, indexed by `code - 0x80`.
pub static C1_COMMANDS: [CommandInfo; 32] = [
    info(0x80, "CW0", 1),
    info(0x81, "CW1", 1),
    info(0x82, "CW2", 1),
    info(0x83, "CW3", 1),
    info(0x84, "CW4", 1),
    info(0x85, "CW5", 1),
    info(0x86, "CW6", 1),
    info(0x87, "CW7", 1),
    info(0x88, "CLW", 2),
    info(0x89, "DSW", 2),
    info(0x8A, "HDW", 2),
    info(0x8B, "TGW", 2),
    info(0x8C, "DLW", 2),
    info(0x8D, "DLY", 2),
    info(0x8E, "DLC", 1),
    info(0x8F, "RST", 1),
    info(0x90, "SPA", 3),
    info(0x91, "SPC", 4),
    info(0x92, "SPL", 3),
    info(0x93, "reserved", 1),
    info(0x94, "reserved", 1),
    info(0x95, "reserved", 1),
    info(0x96, "reserved", 1),
    info(0x97, "SWA", 5),
    info(0x98, "DF0", 7),
    info(0x99, "DF1", 7),
    info(0x9A, "DF2", 7),
    info(0x9B, "DF3", 7),
    info(0x9C, "DF4", 7),
    info(0x9D, "DF5", 7),
    info(0x9E, "DF6", 7),
    info(0x9F, "DF7", 7),
];

/// G2 extended characters reachable through `EXT1`; everything else renders as a space.
fn g2_glyph(code: u8) -> char {
    match code {
        0x25 => '…',
        0x2A => 'Š',
        0x2C => 'Œ',
        0x30 => '█',
        0x31 => '‘',
        0x32 => '’',
        0x33 => '“',
        0x34 => '”',
        0x35 => '•',
        0x39 => '™',
        0x3A => 'š',
        0x3C => 'œ',
        0x3D => '℠',
        0x3F => 'Ÿ',
        0x76 => '⅛',
        0x77 => '⅜',
        0x78 => '⅝',
        0x79 => '⅞',
        0x7A => '│',
        0x7B => '┐',
        0x7C => '└',
        0x7D => '─',
        0x7E => '┘',
        0x7F => '┌',
        _ => ' ',
    }
}

/// Length of a C2 code (including the code byte), from its high bits.
fn c2_length(code: u8) -> usize {
    match code {
        0x00..=0x07 => 1,
        0x08..=0x0F => 2,
        0x10..=0x17 => 3,
        _ => 4,
    }
}

/// Length of a fixed-size C3 code (including the code byte).
fn c3_length(code: u8) -> Option<usize> {
    match code {
        0x80..=0x87 => Some(5),
        0x88..=0x8F => Some(6),
        _ => None,
    }
}

/// Window bitmap argument of CLW/DSW/HDW/TGW/DLW.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSet(pub u8);

impl WindowSet {
    /// Window indices in the set, ascending.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..8).filter(move |i| self.0 & (1 << i) != 0)
    }
}

/// A decoded service block command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// One symbol of text.
    Text(char),
    EndOfText,
    FormFeed,
    CarriageReturn,
    HorizontalCarriageReturn,
    /// A C0/C1/C2/C3 code without behaviour, skipped by its fixed length.
    Ignored(u8),
    SetCurrentWindow(u8),
    ClearWindows(WindowSet),
    DisplayWindows(WindowSet),
    HideWindows(WindowSet),
    ToggleWindows(WindowSet),
    DeleteWindows(WindowSet),
    /// Delay in tenths of a second.
    Delay(u8),
    DelayCancel,
    Reset,
    SetPenAttributes([u8; 2]),
    SetPenColor([u8; 3]),
    SetPenLocation { row: u8, column: u8 },
    SetWindowAttributes([u8; 4]),
    DefineWindow { window: u8, params: [u8; 6] },
}

impl Command {
    /// Decode the command at the start of `data`, returning it with the bytes consumed.
    ///
    /// `data` must not be empty.
    pub fn parse(data: &[u8]) -> Result<(Command, usize)> {
        let code = data[0];
        match code {
            EXT1 => Self::parse_extended(data),
            P16 => {
                let bytes = take::<3>(data)?;
                let symbol = u32::from(u16::from_be_bytes([bytes[1], bytes[2]]));
                Ok((Command::Text(char::from_u32(symbol).unwrap_or(' ')), 3))
            }
            0x00..=0x1F => {
                let length = C0_COMMANDS[usize::from(code)].length;
                require(data, length)?;
                let command = match code {
                    0x03 => Command::EndOfText,
                    0x0C => Command::FormFeed,
                    0x0D => Command::CarriageReturn,
                    0x0E => Command::HorizontalCarriageReturn,
                    _ => Command::Ignored(code),
                };
                Ok((command, length))
            }
            0x7F => Ok((Command::Text('♪'), 1)),
            0x20..=0x7E => Ok((Command::Text(char::from(code)), 1)),
            0x80..=0x9F => Self::parse_c1(data),
            0xA0..=0xFF => Ok((Command::Text(char::from(code)), 1)),
        }
    }

    fn parse_c1(data: &[u8]) -> Result<(Command, usize)> {
        let code = data[0];
        let length = C1_COMMANDS[usize::from(code - 0x80)].length;
        require(data, length)?;
        let p = &data[1..length];
        let command = match code {
            0x80..=0x87 => Command::SetCurrentWindow(code - 0x80),
            0x88 => Command::ClearWindows(WindowSet(p[0])),
            0x89 => Command::DisplayWindows(WindowSet(p[0])),
            0x8A => Command::HideWindows(WindowSet(p[0])),
            0x8B => Command::ToggleWindows(WindowSet(p[0])),
            0x8C => Command::DeleteWindows(WindowSet(p[0])),
            0x8D => Command::Delay(p[0]),
            0x8E => Command::DelayCancel,
            0x8F => Command::Reset,
            0x90 => Command::SetPenAttributes([p[0], p[1]]),
            0x91 => Command::SetPenColor([p[0], p[1], p[2]]),
            0x92 => Command::SetPenLocation {
                row: p[0] & 0x0F,
                column: p[1] & 0x3F,
            },
            0x97 => Command::SetWindowAttributes([p[0], p[1], p[2], p[3]]),
            0x98..=0x9F => Command::DefineWindow {
                window: code - 0x98,
                params: [p[0], p[1], p[2], p[3], p[4], p[5]],
            },
            _ => Command::Ignored(code),
        };
        Ok((command, length))
    }

    fn parse_extended(data: &[u8]) -> Result<(Command, usize)> {
        require(data, 2)?;
        let code = data[1];
        match code {
            0x00..=0x1F => {
                let length = 1 + c2_length(code);
                require(data, length)?;
                Ok((Command::Ignored(code), length))
            }
            0x20..=0x7F => Ok((Command::Text(g2_glyph(code)), 2)),
            0x80..=0x9F => {
                let length = 1 + c3_length(code).ok_or(CaptionError::UnsupportedCommand(code))?;
                require(data, length)?;
                Ok((Command::Ignored(code), length))
            }
            // G3 holds only the [CC] icon, which has no text rendering.
            0xA0..=0xFF => Ok((Command::Text(' '), 2)),
        }
    }
}

fn require(data: &[u8], needed: usize) -> Result<()> {
    if data.len() < needed {
        return Err(CaptionError::TruncatedCommand {
            code: data[0],
            needed,
            available: data.len(),
        });
    }
    Ok(())
}

fn take<const N: usize>(data: &[u8]) -> Result<[u8; N]> {
    require(data, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(&data[..N]);
    Ok(out)
}
