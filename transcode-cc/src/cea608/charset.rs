//! Line-21 character sets.
//!
//! Cells keep the raw code plus the set it came from; glyphs are resolved
//! only when a buffer is serialized.

/// Character set a cell code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    /// Standard characters 0x20-0x7F (ASCII with a few substitutions).
    #[default]
    Basic,
    /// Special North American characters, `0x11 0x30-0x3F`.
    SpecialAmerican,
    /// Extended Spanish/French/miscellaneous, `0x12 0x20-0x3F`.
    ExtendedSpanishFrenchMisc,
    /// Extended Portuguese/German/Danish, `0x13 0x20-0x3F`.
    ExtendedPortugueseGermanDanish,
}

const SPECIAL_AMERICAN: [char; 16] = [
    '®', '°', '½', '¿', '™', '¢', '£', '♪', 'à', ' ', 'è', 'â', 'ê', 'î', 'ô', 'û',
];

const SPANISH_FRENCH_MISC: [char; 32] = [
    'Á', 'É', 'Ó', 'Ú', 'Ü', 'ü', '‘', '¡', '*', '\'', '—', '©', '℠', '•', '“', '”',
    'À', 'Â', 'Ç', 'È', 'Ê', 'Ë', 'ë', 'Î', 'Ï', 'ï', 'Ô', 'Ù', 'ù', 'Û', '«', '»',
];

const PORTUGUESE_GERMAN_DANISH: [char; 32] = [
    'Ã', 'ã', 'Í', 'Ì', 'ì', 'Ò', 'ò', 'Õ', 'õ', '{', '}', '\\', '^', '_', '|', '~',
    'Ä', 'ä', 'Ö', 'ö', 'ß', '¥', '¤', '¦', 'Å', 'å', 'Ø', 'ø', '┌', '┐', '└', '┘',
];

impl Charset {
    /// Resolve a cell code to its display glyph. Unknown codes render as a space.
    pub fn glyph(self, code: u8) -> char {
        let code = code & 0x7F;
        match self {
            Charset::Basic => basic_glyph(code),
            Charset::SpecialAmerican => match code {
                0x30..=0x3F => SPECIAL_AMERICAN[usize::from(code - 0x30)],
                _ => ' ',
            },
            Charset::ExtendedSpanishFrenchMisc => match code {
                0x20..=0x3F => SPANISH_FRENCH_MISC[usize::from(code - 0x20)],
                _ => ' ',
            },
            Charset::ExtendedPortugueseGermanDanish => match code {
                0x20..=0x3F => PORTUGUESE_GERMAN_DANISH[usize::from(code - 0x20)],
                _ => ' ',
            },
        }
    }
}

fn basic_glyph(code: u8) -> char {
    match code {
        0x2A => 'á',
        0x5C => 'é',
        0x5E => 'í',
        0x5F => 'ó',
        0x60 => 'ú',
        0x7B => 'ç',
        0x7C => '÷',
        0x7D => 'Ñ',
        0x7E => 'ñ',
        0x7F => '█',
        0x20..=0x7E => char::from(code),
        _ => ' ',
    }
}

/// Odd parity check over all eight bits.
pub fn has_odd_parity(byte: u8) -> bool {
    byte.count_ones() % 2 == 1
}
