//! DTVCC caption windows and pen state.

use crate::error::{CaptionError, Result};
use crate::style::{Color, SpanStyle};

/// Windows per service.
pub const MAX_WINDOWS: usize = 8;

/// Largest row count a DefineWindow can request.
pub const MAX_ROWS: usize = 16;

/// Largest column count a DefineWindow can request.
pub const MAX_COLUMNS: usize = 64;

/// Rows of the virtual screen windows are anchored on.
pub const SCREEN_ROWS: usize = 75;

/// Columns of the virtual screen (16:9 safe area).
pub const SCREEN_COLUMNS: usize = 210;

/// Window anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnchorPoint {
    #[default]
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl AnchorPoint {
    /// Parse from the 4-bit anchor id; values above 8 fall back to top-left.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => AnchorPoint::TopCenter,
            2 => AnchorPoint::TopRight,
            3 => AnchorPoint::MiddleLeft,
            4 => AnchorPoint::MiddleCenter,
            5 => AnchorPoint::MiddleRight,
            6 => AnchorPoint::BottomLeft,
            7 => AnchorPoint::BottomCenter,
            8 => AnchorPoint::BottomRight,
            _ => AnchorPoint::TopLeft,
        }
    }

    /// Distance from the window's top-left corner to its anchor.
    pub fn offset(self, rows: usize, cols: usize) -> (usize, usize) {
        let v = match self {
            AnchorPoint::TopLeft | AnchorPoint::TopCenter | AnchorPoint::TopRight => 0,
            AnchorPoint::MiddleLeft | AnchorPoint::MiddleCenter | AnchorPoint::MiddleRight => {
                rows / 2
            }
            AnchorPoint::BottomLeft | AnchorPoint::BottomCenter | AnchorPoint::BottomRight => rows,
        };
        let h = match self {
            AnchorPoint::TopLeft | AnchorPoint::MiddleLeft | AnchorPoint::BottomLeft => 0,
            AnchorPoint::TopCenter | AnchorPoint::MiddleCenter | AnchorPoint::BottomCenter => {
                cols / 2
            }
            AnchorPoint::TopRight | AnchorPoint::MiddleRight | AnchorPoint::BottomRight => cols,
        };
        (v, h)
    }

    /// Whether the anchor sits on the bottom edge of the window.
    pub fn is_bottom(self) -> bool {
        matches!(
            self,
            AnchorPoint::BottomLeft | AnchorPoint::BottomCenter | AnchorPoint::BottomRight
        )
    }
}

/// Window justification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justification {
    #[default]
    Left,
    Right,
    Center,
    Full,
}

impl Justification {
    /// Parse from 2-bit value
    pub fn from_u8(value: u8) -> Self {
        match value & 0x03 {
            0 => Justification::Left,
            1 => Justification::Right,
            2 => Justification::Center,
            _ => Justification::Full,
        }
    }
}

/// Direction the pen moves after each symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrintDirection {
    #[default]
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

impl PrintDirection {
    pub fn from_u8(value: u8) -> Self {
        match value & 0x03 {
            0 => PrintDirection::LeftToRight,
            1 => PrintDirection::RightToLeft,
            2 => PrintDirection::TopToBottom,
            _ => PrintDirection::BottomToTop,
        }
    }

    /// Whether text runs along rows.
    pub fn is_horizontal(self) -> bool {
        matches!(self, PrintDirection::LeftToRight | PrintDirection::RightToLeft)
    }
}

/// Scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    LeftToRight,
    RightToLeft,
    TopToBottom,
    #[default]
    BottomToTop,
}

impl ScrollDirection {
    pub fn from_u8(value: u8) -> Self {
        match value & 0x03 {
            0 => ScrollDirection::LeftToRight,
            1 => ScrollDirection::RightToLeft,
            2 => ScrollDirection::TopToBottom,
            _ => ScrollDirection::BottomToTop,
        }
    }
}

/// Window display effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayEffect {
    #[default]
    Snap,
    Fade,
    Wipe,
}

impl DisplayEffect {
    pub fn from_u8(value: u8) -> Self {
        match value & 0x03 {
            1 => DisplayEffect::Fade,
            2 => DisplayEffect::Wipe,
            _ => DisplayEffect::Snap,
        }
    }
}

/// Border type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderType {
    #[default]
    None,
    Raised,
    Depressed,
    Uniform,
    ShadowLeft,
    ShadowRight,
}

impl BorderType {
    /// Parse from 3-bit value
    pub fn from_u8(value: u8) -> Self {
        match value & 0x07 {
            1 => BorderType::Raised,
            2 => BorderType::Depressed,
            3 => BorderType::Uniform,
            4 => BorderType::ShadowLeft,
            5 => BorderType::ShadowRight,
            _ => BorderType::None,
        }
    }
}

/// Opacity of a pen or fill color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Opacity {
    #[default]
    Solid,
    Flash,
    Translucent,
    Transparent,
}

impl Opacity {
    pub fn from_u8(value: u8) -> Self {
        match value & 0x03 {
            0 => Opacity::Solid,
            1 => Opacity::Flash,
            2 => Opacity::Translucent,
            _ => Opacity::Transparent,
        }
    }
}

/// Pen style attributes (SetPenAttributes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenAttributes {
    /// Pen size (0=small, 1=standard, 2=large)
    pub pen_size: u8,
    /// Offset (0=subscript, 1=normal, 2=superscript)
    pub offset: u8,
    /// Text tag (0-15)
    pub text_tag: u8,
    /// Font style (0-7)
    pub font_style: u8,
    /// Edge type (0-7)
    pub edge_type: u8,
    pub italics: bool,
    pub underline: bool,
}

impl Default for PenAttributes {
    fn default() -> Self {
        Self {
            pen_size: 1,
            offset: 1,
            text_tag: 0,
            font_style: 0,
            edge_type: 0,
            italics: false,
            underline: false,
        }
    }
}

impl PenAttributes {
    /// Decode the two SetPenAttributes parameter bytes.
    pub fn from_params(params: [u8; 2]) -> Self {
        let [p0, p1] = params;
        Self {
            pen_size: p0 & 0x03,
            offset: (p0 >> 2) & 0x03,
            text_tag: p0 >> 4,
            font_style: p1 & 0x07,
            edge_type: (p1 >> 3) & 0x07,
            italics: p1 & 0x80 != 0,
            underline: p1 & 0x40 != 0,
        }
    }
}

/// Pen color attributes (SetPenColor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenColor {
    pub foreground: Color,
    pub fg_opacity: Opacity,
    pub background: Color,
    pub bg_opacity: Opacity,
    pub edge: Color,
}

impl Default for PenColor {
    fn default() -> Self {
        PenColor {
            foreground: Color::WHITE,
            fg_opacity: Opacity::Solid,
            background: Color::BLACK,
            bg_opacity: Opacity::Solid,
            edge: Color::BLACK,
        }
    }
}

impl PenColor {
    /// Decode the three SetPenColor parameter bytes.
    pub fn from_params(params: [u8; 3]) -> Self {
        let [p0, p1, p2] = params;
        Self {
            foreground: Color::from_dtvcc(p0),
            fg_opacity: Opacity::from_u8(p0 >> 6),
            background: Color::from_dtvcc(p1),
            bg_opacity: Opacity::from_u8(p1 >> 6),
            edge: Color::from_dtvcc(p2),
        }
    }
}

/// Window attributes (SetWindowAttributes and predefined window styles).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowAttributes {
    pub fill_color: Color,
    pub fill_opacity: Opacity,
    pub border_color: Color,
    pub border_type: BorderType,
    pub word_wrap: bool,
    pub print_direction: PrintDirection,
    pub scroll_direction: ScrollDirection,
    pub justify: Justification,
    pub effect: DisplayEffect,
    pub effect_direction: u8,
    /// Effect speed in units of 0.5 seconds.
    pub effect_speed: u8,
}

impl WindowAttributes {
    /// Decode the four SetWindowAttributes parameter bytes.
    pub fn from_params(params: [u8; 4]) -> Self {
        let [p0, p1, p2, p3] = params;
        Self {
            fill_color: Color::from_dtvcc(p0),
            fill_opacity: Opacity::from_u8(p0 >> 6),
            border_color: Color::from_dtvcc(p1),
            border_type: BorderType::from_u8(((p2 >> 7) << 2) | (p1 >> 6)),
            word_wrap: p2 & 0x40 != 0,
            print_direction: PrintDirection::from_u8(p2 >> 4),
            scroll_direction: ScrollDirection::from_u8(p2 >> 2),
            justify: Justification::from_u8(p2),
            effect_speed: p3 >> 4,
            effect_direction: (p3 >> 2) & 0x03,
            effect: DisplayEffect::from_u8(p3),
        }
    }

    /// One of the seven predefined window styles; 0 selects style 1.
    pub fn predefined(style: u8) -> Self {
        let base = Self {
            fill_color: Color::BLACK,
            ..Self::default()
        };
        match style {
            2 => Self {
                fill_opacity: Opacity::Transparent,
                ..base
            },
            3 => Self {
                justify: Justification::Center,
                ..base
            },
            4 => Self {
                word_wrap: true,
                ..base
            },
            5 => Self {
                fill_opacity: Opacity::Transparent,
                word_wrap: true,
                ..base
            },
            6 => Self {
                justify: Justification::Center,
                word_wrap: true,
                ..base
            },
            7 => Self {
                print_direction: PrintDirection::TopToBottom,
                scroll_direction: ScrollDirection::RightToLeft,
                ..base
            },
            _ => base,
        }
    }
}

/// Decoded DefineWindow parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDefinition {
    pub visible: bool,
    pub row_lock: bool,
    pub col_lock: bool,
    pub priority: u8,
    /// Anchor coordinates are percentages of the screen.
    pub relative: bool,
    pub anchor_v: u8,
    pub anchor_h: u8,
    pub anchor_point: AnchorPoint,
    pub row_count: usize,
    pub col_count: usize,
    pub window_style: u8,
    pub pen_style: u8,
}

impl WindowDefinition {
    pub fn from_params(params: [u8; 6]) -> Self {
        let [p0, p1, p2, p3, p4, p5] = params;
        Self {
            visible: p0 & 0x20 != 0,
            row_lock: p0 & 0x10 != 0,
            col_lock: p0 & 0x08 != 0,
            priority: p0 & 0x07,
            relative: p1 & 0x80 != 0,
            anchor_v: p1 & 0x7F,
            anchor_h: p2,
            anchor_point: AnchorPoint::from_u8(p3 >> 4),
            row_count: usize::from(p3 & 0x0F) + 1,
            col_count: usize::from(p4 & 0x3F) + 1,
            window_style: (p5 >> 3) & 0x07,
            pen_style: p5 & 0x07,
        }
    }

    /// Anchor as a `(row, column)` on the virtual screen.
    fn anchor(&self) -> (usize, usize) {
        if self.relative {
            (
                usize::from(self.anchor_v.min(100)) * SCREEN_ROWS / 100,
                usize::from(self.anchor_h.min(100)) * SCREEN_COLUMNS / 100,
            )
        } else {
            (usize::from(self.anchor_v), usize::from(self.anchor_h))
        }
    }
}

const BLANK: char = ' ';

/// One caption window.
///
/// The character grid is allocated at the largest definable size on the
/// first DefineWindow and reused by later definitions.
#[derive(Debug, Clone)]
pub struct Window {
    id: u8,
    defined: bool,
    visible: bool,
    priority: u8,
    anchor_point: AnchorPoint,
    anchor_row: usize,
    anchor_col: usize,
    row_count: usize,
    col_count: usize,
    attributes: WindowAttributes,
    pen_row: usize,
    pen_col: usize,
    grid: Vec<char>,
    row_pens: [PenAttributes; MAX_ROWS],
    row_colors: [PenColor; MAX_ROWS],
    define_params: Option<[u8; 6]>,
}

impl Window {
    /// An undefined window without storage.
    pub fn new(id: u8) -> Self {
        Self {
            id,
            defined: false,
            visible: false,
            priority: 0,
            anchor_point: AnchorPoint::TopLeft,
            anchor_row: 0,
            anchor_col: 0,
            row_count: 1,
            col_count: 1,
            attributes: WindowAttributes::predefined(1),
            pen_row: 0,
            pen_col: 0,
            grid: Vec::new(),
            row_pens: [PenAttributes::default(); MAX_ROWS],
            row_colors: [PenColor::default(); MAX_ROWS],
            define_params: None,
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn is_defined(&self) -> bool {
        self.defined
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn col_count(&self) -> usize {
        self.col_count
    }

    pub fn anchor_point(&self) -> AnchorPoint {
        self.anchor_point
    }

    /// Anchor `(row, column)` on the virtual screen.
    pub fn anchor(&self) -> (usize, usize) {
        (self.anchor_row, self.anchor_col)
    }

    pub fn attributes(&self) -> &WindowAttributes {
        &self.attributes
    }

    pub fn set_attributes(&mut self, attributes: WindowAttributes) {
        self.attributes = attributes;
    }

    /// Pen `(row, column)`.
    pub fn cursor(&self) -> (usize, usize) {
        (self.pen_row, self.pen_col)
    }

    /// Raw parameters of the last DefineWindow.
    pub fn define_params(&self) -> Option<[u8; 6]> {
        self.define_params
    }

    /// Top-left screen position implied by the anchor.
    pub fn origin(&self) -> (usize, usize) {
        let (dv, dh) = self.anchor_point.offset(self.row_count, self.col_count);
        (
            self.anchor_row.saturating_sub(dv),
            self.anchor_col.saturating_sub(dh),
        )
    }

    /// Apply a DefineWindow command.
    ///
    /// Returns `Ok(false)` when the window is already defined with identical
    /// parameters and nothing changed.
    pub fn define(&mut self, params: [u8; 6]) -> Result<bool> {
        if self.defined && self.define_params == Some(params) {
            return Ok(false);
        }

        if self.grid.is_empty() {
            let cells = MAX_ROWS * MAX_COLUMNS;
            if self.grid.try_reserve_exact(cells).is_err() {
                *self = Self::new(self.id);
                return Err(CaptionError::WindowAllocation {
                    window: self.id,
                    cells,
                });
            }
            self.grid.resize(cells, BLANK);
        }

        let def = WindowDefinition::from_params(params);
        let created = !self.defined;

        self.defined = true;
        self.visible = def.visible;
        self.priority = def.priority;
        self.anchor_point = def.anchor_point;
        self.row_count = def.row_count;
        self.col_count = def.col_count;

        let (anchor_row, anchor_col) = def.anchor();
        self.anchor_row = anchor_row;
        self.anchor_col = anchor_col;
        self.clamp_anchor();

        if created {
            let style = if def.window_style == 0 { 1 } else { def.window_style };
            self.attributes = WindowAttributes::predefined(style);
            self.pen_row = 0;
            self.pen_col = 0;
            self.row_pens = [PenAttributes::default(); MAX_ROWS];
            self.row_colors = [PenColor::default(); MAX_ROWS];
        } else {
            if def.window_style != 0 {
                self.attributes = WindowAttributes::predefined(def.window_style);
            }
            self.pen_row = self.pen_row.min(self.row_count - 1);
            self.pen_col = self.pen_col.min(self.col_count - 1);
        }
        self.clear();

        self.define_params = Some(params);
        Ok(true)
    }

    /// Move the anchor so the whole window lies on the virtual screen.
    fn clamp_anchor(&mut self) {
        let (dv, dh) = self.anchor_point.offset(self.row_count, self.col_count);
        let (top, left) = self.origin();
        let top = top.min(SCREEN_ROWS - self.row_count);
        let left = left.min(SCREEN_COLUMNS - self.col_count);
        self.anchor_row = top + dv;
        self.anchor_col = left + dh;
    }

    /// Undefine the window, keeping its storage.
    pub fn delete(&mut self) {
        self.defined = false;
        self.visible = false;
        self.define_params = None;
        self.clear();
    }

    /// Blank every cell; the pen stays where it is.
    pub fn clear(&mut self) {
        self.grid.fill(BLANK);
    }

    /// Symbol at `(row, col)`; blank outside the window.
    pub fn cell(&self, row: usize, col: usize) -> char {
        if row >= self.row_count || col >= self.col_count {
            return BLANK;
        }
        self.grid
            .get(row * MAX_COLUMNS + col)
            .copied()
            .unwrap_or(BLANK)
    }

    /// The symbols of one row.
    pub fn row(&self, row: usize) -> &[char] {
        if row >= self.row_count || self.grid.is_empty() {
            return &[];
        }
        let start = row * MAX_COLUMNS;
        &self.grid[start..start + self.col_count]
    }

    pub fn is_empty(&self) -> bool {
        (0..self.row_count).all(|r| self.row(r).iter().all(|&c| c == BLANK))
    }

    /// Style of a row for serialization.
    pub fn row_style(&self, row: usize) -> SpanStyle {
        let row = row.min(MAX_ROWS - 1);
        let pen = &self.row_pens[row];
        SpanStyle::new(pen.italics, pen.underline, self.row_colors[row].foreground)
    }

    /// Pen attributes in effect on the pen row.
    pub fn pen_attributes(&self) -> &PenAttributes {
        &self.row_pens[self.pen_row]
    }

    pub fn set_pen_attributes(&mut self, pen: PenAttributes) {
        self.row_pens[self.pen_row] = pen;
    }

    /// Pen color in effect on the pen row.
    pub fn pen_color(&self) -> &PenColor {
        &self.row_colors[self.pen_row]
    }

    pub fn set_pen_color(&mut self, color: PenColor) {
        self.row_colors[self.pen_row] = color;
    }

    /// Move the pen, clamped to the window.
    pub fn set_pen_location(&mut self, row: usize, col: usize) {
        self.pen_row = row.min(self.row_count - 1);
        self.pen_col = col.min(self.col_count - 1);
    }

    fn set_cell(&mut self, row: usize, col: usize, symbol: char) {
        if row < self.row_count && col < self.col_count {
            if let Some(cell) = self.grid.get_mut(row * MAX_COLUMNS + col) {
                *cell = symbol;
            }
        }
    }

    /// Store a symbol at the pen and advance it along the print direction.
    ///
    /// The pen stops at the window edge; nothing wraps or scrolls.
    pub fn write(&mut self, symbol: char) {
        self.set_cell(self.pen_row, self.pen_col, symbol);
        match self.attributes.print_direction {
            PrintDirection::LeftToRight => {
                if self.pen_col + 1 < self.col_count {
                    self.pen_col += 1;
                }
            }
            PrintDirection::RightToLeft => self.pen_col = self.pen_col.saturating_sub(1),
            PrintDirection::TopToBottom => {
                if self.pen_row + 1 < self.row_count {
                    self.pen_row += 1;
                }
            }
            PrintDirection::BottomToTop => self.pen_row = self.pen_row.saturating_sub(1),
        }
    }

    /// Move to the start of the next line, rolling the window at its last line.
    ///
    /// With `no_rollup` the last line is cleared instead of scrolled.
    pub fn carriage_return(&mut self, no_rollup: bool) {
        let direction = self.attributes.print_direction;
        if direction.is_horizontal() {
            self.pen_col = self.line_start_column();
            if self.pen_row + 1 < self.row_count {
                self.pen_row += 1;
            } else if no_rollup {
                self.clear_row(self.pen_row);
            } else {
                self.roll_rows();
            }
        } else {
            self.pen_row = match direction {
                PrintDirection::BottomToTop => self.row_count - 1,
                _ => 0,
            };
            if self.pen_col + 1 < self.col_count {
                self.pen_col += 1;
            } else if no_rollup {
                self.clear_column(self.pen_col);
            } else {
                self.roll_columns();
            }
        }
    }

    /// Clear the pen row and return the pen to where its text starts.
    pub fn horizontal_carriage_return(&mut self) {
        self.clear_row(self.pen_row);
        self.pen_col = self.line_start_column();
    }

    /// Column a line of text starts from in the current print direction.
    fn line_start_column(&self) -> usize {
        match self.attributes.print_direction {
            PrintDirection::RightToLeft => self.col_count.saturating_sub(1),
            _ => 0,
        }
    }

    /// Clear the pen row and home the pen.
    pub fn form_feed(&mut self) {
        self.clear_row(self.pen_row);
        self.pen_row = 0;
        self.pen_col = 0;
    }

    fn clear_row(&mut self, row: usize) {
        for col in 0..self.col_count {
            self.set_cell(row, col, BLANK);
        }
    }

    fn clear_column(&mut self, col: usize) {
        for row in 0..self.row_count {
            self.set_cell(row, col, BLANK);
        }
    }

    /// Shift every row up by one and blank the last.
    fn roll_rows(&mut self) {
        if self.grid.is_empty() {
            return;
        }
        let last = self.row_count - 1;
        self.grid.copy_within(MAX_COLUMNS..(last + 1) * MAX_COLUMNS, 0);
        self.row_pens.copy_within(1..=last, 0);
        self.row_colors.copy_within(1..=last, 0);
        self.clear_row(last);
    }

    /// Shift every column left by one and blank the last.
    fn roll_columns(&mut self) {
        let last = self.col_count - 1;
        for row in 0..self.row_count {
            for col in 0..last {
                let next = self.cell(row, col + 1);
                self.set_cell(row, col, next);
            }
        }
        self.clear_column(last);
    }
}
