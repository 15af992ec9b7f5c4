//! Composition of a service's windows onto the 75x210 virtual screen.

use super::window::{Window, SCREEN_COLUMNS, SCREEN_ROWS};
use crate::style::{push_row, trimmed_span, SpanStyle};

/// The virtual screen of one service.
#[derive(Debug, Clone)]
pub struct Screen {
    cells: Vec<char>,
    styles: [SpanStyle; SCREEN_ROWS],
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    pub fn new() -> Self {
        Self {
            cells: vec![' '; SCREEN_ROWS * SCREEN_COLUMNS],
            styles: [SpanStyle::default(); SCREEN_ROWS],
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(' ');
        self.styles = [SpanStyle::default(); SCREEN_ROWS];
    }

    /// Symbols of one screen row.
    pub fn row(&self, row: usize) -> &[char] {
        let start = row.min(SCREEN_ROWS - 1) * SCREEN_COLUMNS;
        &self.cells[start..start + SCREEN_COLUMNS]
    }

    /// Paint the visible, non-empty windows in ascending priority order.
    ///
    /// Windows of equal priority keep their index order, and a later window
    /// overwrites an earlier one where they overlap.
    pub fn compose(&mut self, windows: &[Window]) {
        self.clear();

        let mut order: Vec<&Window> = windows
            .iter()
            .filter(|w| w.is_defined() && w.is_visible() && !w.is_empty())
            .collect();
        order.sort_by_key(|w| w.priority());

        for window in order {
            let (top, left) = window.origin();
            let rows = window.row_count().min(SCREEN_ROWS.saturating_sub(top));
            let cols = window.col_count().min(SCREEN_COLUMNS.saturating_sub(left));
            if cols == 0 {
                continue;
            }
            for r in 0..rows {
                let start = (top + r) * SCREEN_COLUMNS + left;
                self.cells[start..start + cols].copy_from_slice(&window.row(r)[..cols]);
                self.styles[top + r] = window.row_style(r);
            }
        }
    }

    /// Serialize every non-blank row, trimmed and wrapped in its style tags.
    pub fn serialize(&self, out: &mut String) {
        out.clear();
        for (r, style) in self.styles.iter().enumerate() {
            let row = self.row(r);
            if let Some((first, last)) = trimmed_span(row, |c| *c == ' ') {
                push_row(out, style, row[first..=last].iter().copied());
            }
        }
    }
}
