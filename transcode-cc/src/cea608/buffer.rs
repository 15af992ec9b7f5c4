//! Line-21 caption memory: cells, rows and 15x32 buffers.

use super::charset::Charset;
use crate::style::{push_row, trimmed_span, LegacyColor, SpanStyle};

/// Rows in a caption buffer.
pub const ROWS: usize = 15;

/// Columns in a caption row.
pub const COLUMNS: usize = 32;

/// Row receiving text before any PAC positions the cursor.
pub const BASE_ROW: usize = ROWS - 1;

/// Attributes set by a PAC or mid-row code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LegacyAttributes {
    pub italic: bool,
    pub underline: bool,
    pub foreground: LegacyColor,
}

impl LegacyAttributes {
    /// Decode the shared color/italic/underline bits of a PAC or mid-row code.
    ///
    /// Italics force the default foreground.
    pub fn from_style_bits(bits: u8) -> Self {
        let underline = bits & 0x01 != 0;
        match LegacyColor::from_code((bits & 0x0E) >> 1) {
            Some(foreground) => Self {
                italic: false,
                underline,
                foreground,
            },
            None => Self {
                italic: true,
                underline,
                foreground: LegacyColor::White,
            },
        }
    }

    fn span_style(&self) -> SpanStyle {
        if self.italic {
            SpanStyle::new(true, self.underline, LegacyColor::White.to_color())
        } else {
            SpanStyle::new(false, self.underline, self.foreground.to_color())
        }
    }
}

/// One character cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyCell {
    pub code: u8,
    pub charset: Charset,
    /// The cell starts a new attribute run.
    pub midrow_attr: bool,
    pub attributes: LegacyAttributes,
}

impl Default for LegacyCell {
    fn default() -> Self {
        Self {
            code: b' ',
            charset: Charset::Basic,
            midrow_attr: false,
            attributes: LegacyAttributes::default(),
        }
    }
}

impl LegacyCell {
    pub fn glyph(&self) -> char {
        self.charset.glyph(self.code)
    }

    pub fn is_blank(&self) -> bool {
        self.glyph() == ' '
    }
}

/// One row of cells with its write cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyRow {
    cells: [LegacyCell; COLUMNS],
    pos: usize,
    /// High-water mark of written cells.
    num_chars: usize,
    attr_chg: bool,
    pac_attr_chg: bool,
    pac_attr: LegacyAttributes,
}

impl Default for LegacyRow {
    fn default() -> Self {
        Self {
            cells: [LegacyCell::default(); COLUMNS],
            pos: 0,
            num_chars: 0,
            attr_chg: false,
            pac_attr_chg: false,
            pac_attr: LegacyAttributes::default(),
        }
    }
}

impl LegacyRow {
    pub fn cells(&self) -> &[LegacyCell] {
        &self.cells
    }

    /// Cursor column.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Number of cells written so far.
    pub fn num_chars(&self) -> usize {
        self.num_chars
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(LegacyCell::is_blank)
    }

    /// Write a character at the cursor and advance.
    ///
    /// A pending PAC attribute lands on this cell only if nothing displayable
    /// sits immediately to its left.
    pub fn add_char(&mut self, code: u8, charset: Charset) {
        let pos = self.pos;
        if pos >= COLUMNS {
            return;
        }
        let left_displayable = pos > 0 && pos <= self.num_chars;
        let cell = &mut self.cells[pos];
        if self.pac_attr_chg && !self.attr_chg && !left_displayable {
            self.attr_chg = true;
            cell.attributes = self.pac_attr;
        }
        cell.code = code;
        cell.charset = charset;
        cell.midrow_attr = self.attr_chg;
        self.pos += 1;
        self.num_chars = self.num_chars.max(self.pos);
        self.attr_chg = false;
        self.pac_attr_chg = false;
    }

    /// Position the cursor and stash the PAC attributes for the next character.
    pub fn set_pac(&mut self, pos: usize, attributes: LegacyAttributes) {
        self.pos = pos.min(COLUMNS - 1);
        self.pac_attr = attributes;
        self.pac_attr_chg = true;
        self.attr_chg = false;
    }

    /// Mid-row codes occupy one cell, shown as a space carrying the new attributes.
    pub fn set_midrow_attr(&mut self, attributes: LegacyAttributes) {
        if self.pos >= COLUMNS {
            return;
        }
        self.cells[self.pos].attributes = attributes;
        self.attr_chg = true;
        self.add_char(b' ', Charset::Basic);
    }

    pub fn backspace(&mut self) {
        if self.pos > 0 {
            self.pos -= 1;
            self.cells[self.pos] = LegacyCell::default();
        }
    }

    /// Step back one column without erasing, so the next character replaces it.
    pub fn step_back(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    pub fn delete_to_end(&mut self) {
        for cell in &mut self.cells[self.pos.min(COLUMNS)..] {
            *cell = LegacyCell::default();
        }
        self.num_chars = self.num_chars.min(self.pos);
    }

    pub fn tab(&mut self, columns: usize) {
        self.pos = (self.pos + columns).min(COLUMNS - 1);
    }

    /// Style of the row: the first attribute run found scanning left to right,
    /// with an italic run taking precedence over any color.
    pub fn dominant_style(&self, last: usize) -> SpanStyle {
        let mut style = LegacyAttributes::default();
        for cell in self.cells[..=last.min(COLUMNS - 1)]
            .iter()
            .filter(|cell| cell.midrow_attr)
        {
            style = cell.attributes;
            if style.italic {
                break;
            }
        }
        style.span_style()
    }
}

/// A 15x32 caption buffer with the row currently receiving text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyBuffer {
    rows: [LegacyRow; ROWS],
    rowpos: usize,
}

impl Default for LegacyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LegacyBuffer {
    pub fn new() -> Self {
        Self {
            rows: std::array::from_fn(|_| LegacyRow::default()),
            rowpos: BASE_ROW,
        }
    }

    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(LegacyRow::is_empty)
    }

    pub fn rows(&self) -> &[LegacyRow] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> &LegacyRow {
        &self.rows[row.min(ROWS - 1)]
    }

    /// Row receiving text.
    pub fn rowpos(&self) -> usize {
        self.rowpos
    }

    pub fn set_rowpos(&mut self, row: usize) {
        self.rowpos = row.min(ROWS - 1);
    }

    pub fn current_row_mut(&mut self) -> &mut LegacyRow {
        &mut self.rows[self.rowpos]
    }

    /// Scroll the `rows`-high roll-up window ending at the cursor row up by one.
    ///
    /// The cursor row is cleared and rows above the window are erased.
    pub fn roll_up(&mut self, rows: usize) {
        let base = self.rowpos;
        let top = (base + 1).saturating_sub(rows.max(1));
        for r in top..base {
            self.rows[r] = self.rows[r + 1].clone();
        }
        self.rows[base].clear();
        for row in &mut self.rows[..top] {
            row.clear();
        }
    }

    /// Serialize every non-empty row into `out`.
    pub fn serialize(&self, out: &mut String) {
        out.clear();
        for row in &self.rows {
            if let Some((first, last)) = trimmed_span(row.cells(), LegacyCell::is_blank) {
                let style = row.dominant_style(last);
                push_row(out, &style, row.cells()[first..=last].iter().map(LegacyCell::glyph));
            }
        }
    }
}
