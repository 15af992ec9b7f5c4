//! CEA-608 (line 21) closed caption decoder.
//!
//! Byte pairs arrive with odd parity on each byte. The first byte selects
//! between displayable characters (`c1 & 0x60`) and control codes or
//! special characters (`c1 & 0x10`, with bit `0x08` choosing data channel 2).
//!
//! Each data channel owns two 15x32 memories, one displayed and one not.
//! Pop-on captions are built off screen and swapped in by end-of-caption;
//! roll-up and paint-on captions write straight into displayed memory.

pub mod buffer;
pub mod charset;

pub use buffer::{LegacyAttributes, LegacyBuffer, LegacyCell, LegacyRow, BASE_ROW, COLUMNS, ROWS};
pub use charset::{has_odd_parity, Charset};

use crate::config::DecoderConfig;
use crate::sink::{CaptionSink, CaptionStream};
use tracing::{debug, trace};

/// Data channels per field.
pub const CHANNELS: usize = 2;

/// Maps `(c1 & 0x07) << 1 | (c2 & 0x20) >> 5` of a PAC to a row; `None` is reserved.
const PAC_ROWS: [Option<usize>; 16] = [
    Some(10),
    None,
    Some(0),
    Some(1),
    Some(2),
    Some(3),
    Some(11),
    Some(12),
    Some(13),
    Some(14),
    Some(4),
    Some(5),
    Some(6),
    Some(7),
    Some(8),
    Some(9),
];

/// Caption display style of a data channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegacyStyle {
    /// No mode command received yet.
    #[default]
    NotSet,
    /// Roll-up with the given number of rows (2-4).
    RollUp(u8),
    /// Paint-on: characters appear as they are received.
    PaintOn,
    /// Pop-on: built off screen, shown at end-of-caption.
    PopOn,
}

/// Miscellaneous control codes (`0x14`/`0x15` first byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCode {
    /// Resume caption loading
    RCL,
    /// Backspace
    BS,
    /// Alarm off
    AOF,
    /// Alarm on
    AON,
    /// Delete to end of row
    DER,
    /// Roll-up captions, 2-4 rows
    RollUp(u8),
    /// Flash on
    FON,
    /// Resume direct captioning
    RDC,
    /// Text restart
    TR,
    /// Resume text display
    RTD,
    /// Erase displayed memory
    EDM,
    /// Carriage return
    CR,
    /// Erase non-displayed memory
    ENM,
    /// End of caption (flip memories)
    EOC,
}

impl ControlCode {
    /// Parse the second byte of a miscellaneous control code.
    pub fn from_byte(b2: u8) -> Option<Self> {
        match b2 {
            0x20 => Some(ControlCode::RCL),
            0x21 => Some(ControlCode::BS),
            0x22 => Some(ControlCode::AOF),
            0x23 => Some(ControlCode::AON),
            0x24 => Some(ControlCode::DER),
            0x25..=0x27 => Some(ControlCode::RollUp(b2 - 0x23)),
            0x28 => Some(ControlCode::FON),
            0x29 => Some(ControlCode::RDC),
            0x2A => Some(ControlCode::TR),
            0x2B => Some(ControlCode::RTD),
            0x2C => Some(ControlCode::EDM),
            0x2D => Some(ControlCode::CR),
            0x2E => Some(ControlCode::ENM),
            0x2F => Some(ControlCode::EOC),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct ChannelState {
    style: LegacyStyle,
    /// Index of the displayed memory.
    displayed: usize,
    text: String,
}

impl ChannelState {
    /// Memory receiving writes for the current style.
    fn active(&self) -> usize {
        match self.style {
            LegacyStyle::RollUp(_) | LegacyStyle::PaintOn => self.displayed,
            LegacyStyle::PopOn | LegacyStyle::NotSet => 1 - self.displayed,
        }
    }
}

/// CEA-608 decoder.
#[derive(Debug, Clone)]
pub struct Cea608Decoder {
    /// Caption memories indexed by `[memory][channel]`.
    memory: [[LegacyBuffer; CHANNELS]; 2],
    channels: [ChannelState; CHANNELS],
    /// Data channel selected by the most recent control code.
    channel: usize,
    /// Last control or character pair, for coalescing repeated control codes.
    last_code: Option<(u8, u8)>,
    config: DecoderConfig,
}

impl Default for Cea608Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Cea608Decoder {
    /// Create a new decoder emitting output for both data channels.
    pub fn new() -> Self {
        Self::with_config(&DecoderConfig::default())
    }

    /// Create a decoder honouring the legacy channel filter of `config`.
    pub fn with_config(config: &DecoderConfig) -> Self {
        Self {
            memory: std::array::from_fn(|_| std::array::from_fn(|_| LegacyBuffer::new())),
            channels: std::array::from_fn(|_| ChannelState::default()),
            channel: 0,
            last_code: None,
            config: config.clone(),
        }
    }

    /// Only emit output for one data channel (1 or 2).
    pub fn set_output_channel(&mut self, channel: Option<u8>) {
        self.config.legacy_channel = channel;
    }

    /// Display style of a data channel (0-based).
    pub fn style(&self, channel: usize) -> LegacyStyle {
        self.channels[channel.min(CHANNELS - 1)].style
    }

    /// Data channel (0-based) addressed by the last control code.
    pub fn current_channel(&self) -> usize {
        self.channel
    }

    /// Buffer currently shown for a data channel.
    pub fn displayed(&self, channel: usize) -> &LegacyBuffer {
        let channel = channel.min(CHANNELS - 1);
        &self.memory[self.channels[channel].displayed][channel]
    }

    /// Buffer currently receiving writes for a data channel.
    pub fn active(&self, channel: usize) -> &LegacyBuffer {
        let channel = channel.min(CHANNELS - 1);
        &self.memory[self.channels[channel].active()][channel]
    }

    /// Cursor `(row, column)` of the active buffer of a data channel.
    pub fn cursor(&self, channel: usize) -> (usize, usize) {
        let buf = self.active(channel);
        (buf.rowpos(), buf.row(buf.rowpos()).pos())
    }

    /// Last serialized text of a data channel.
    pub fn text(&self, channel: usize) -> &str {
        &self.channels[channel.min(CHANNELS - 1)].text
    }

    /// Forget all captions and return to the initial state.
    pub fn reset(&mut self) {
        *self = Self::with_config(&self.config);
    }

    /// Process one byte pair. Returns `false` if the pair failed the parity check.
    pub fn process_pair(&mut self, b1: u8, b2: u8, sink: &mut dyn CaptionSink) -> bool {
        if !has_odd_parity(b1) || !has_odd_parity(b2) {
            trace!(b1, b2, "dropping pair with bad parity");
            return false;
        }

        let c1 = b1 & 0x7F;
        let c2 = b2 & 0x7F;

        if c1 & 0x60 != 0 {
            self.decode_standard_chars(c1, c2, sink);
        } else if c1 & 0x10 != 0 {
            if self.last_code == Some((c1, c2)) {
                trace!(c1, c2, "coalescing repeated control code");
            } else {
                self.channel = usize::from((c1 & 0x08) >> 3);
                self.decode_control(c1 & !0x08, c2, sink);
            }
        } else {
            // Padding and XDS pairs leave the coalescing state alone.
            return true;
        }

        self.last_code = Some((c1, c2));
        true
    }

    fn decode_control(&mut self, c1: u8, c2: u8, sink: &mut dyn CaptionSink) {
        if c2 & 0x40 != 0 {
            self.decode_pac(c1, c2);
            return;
        }
        match c1 {
            0x10 => debug!(c2, "ignoring background attribute code"),
            0x11 => {
                if c2 & 0x30 == 0x30 {
                    self.write_char(c2, Charset::SpecialAmerican, sink);
                } else if c2 & 0x20 != 0 {
                    let attributes = LegacyAttributes::from_style_bits(c2);
                    self.active_buffer_mut().current_row_mut().set_midrow_attr(attributes);
                    self.paint(sink);
                }
            }
            0x12 | 0x13 if c2 & 0x20 != 0 => {
                let charset = if c1 == 0x12 {
                    Charset::ExtendedSpanishFrenchMisc
                } else {
                    Charset::ExtendedPortugueseGermanDanish
                };
                // Extended characters replace the fallback character sent before them.
                self.active_buffer_mut().current_row_mut().step_back();
                self.write_char(c2, charset, sink);
            }
            0x14 | 0x15 => match ControlCode::from_byte(c2) {
                Some(code) => self.handle_control_code(code, sink),
                None => debug!(c1, c2, "unknown miscellaneous control code"),
            },
            0x17 if (0x21..=0x23).contains(&c2) => {
                self.active_buffer_mut()
                    .current_row_mut()
                    .tab(usize::from(c2 - 0x20));
            }
            _ => debug!(c1, c2, "unhandled control code"),
        }
    }

    fn decode_pac(&mut self, c1: u8, c2: u8) {
        let index = usize::from(((c1 & 0x07) << 1) | ((c2 & 0x20) >> 5));
        let Some(row) = PAC_ROWS[index] else {
            debug!(c1, c2, "reserved PAC row");
            return;
        };

        let (column, attributes) = if c2 & 0x10 != 0 {
            let indent = usize::from((c2 & 0x0E) >> 1) * 4;
            let attributes = LegacyAttributes {
                underline: c2 & 0x01 != 0,
                ..LegacyAttributes::default()
            };
            (indent, attributes)
        } else {
            (0, LegacyAttributes::from_style_bits(c2))
        };

        let buf = self.active_buffer_mut();
        buf.set_rowpos(row);
        buf.current_row_mut().set_pac(column, attributes);
    }

    fn handle_control_code(&mut self, code: ControlCode, sink: &mut dyn CaptionSink) {
        let channel = self.channel;
        match code {
            ControlCode::RCL => self.channels[channel].style = LegacyStyle::PopOn,
            ControlCode::RollUp(rows) => {
                if !matches!(self.channels[channel].style, LegacyStyle::RollUp(_)) {
                    let displayed = self.channels[channel].displayed;
                    let buf = &mut self.memory[displayed][channel];
                    buf.clear();
                    buf.set_rowpos(BASE_ROW);
                    self.hide(sink);
                }
                self.channels[channel].style = LegacyStyle::RollUp(rows);
            }
            ControlCode::RDC => self.channels[channel].style = LegacyStyle::PaintOn,
            ControlCode::BS => {
                self.active_buffer_mut().current_row_mut().backspace();
                self.paint(sink);
            }
            ControlCode::DER => {
                self.active_buffer_mut().current_row_mut().delete_to_end();
                self.paint(sink);
            }
            ControlCode::EDM => {
                let displayed = self.channels[channel].displayed;
                self.memory[displayed][channel].clear();
                self.hide(sink);
            }
            ControlCode::ENM => {
                let off = 1 - self.channels[channel].displayed;
                self.memory[off][channel].clear();
            }
            ControlCode::CR => {
                if let LegacyStyle::RollUp(rows) = self.channels[channel].style {
                    self.active_buffer_mut().roll_up(usize::from(rows));
                    self.show(sink);
                } else if self.channels[channel].style == LegacyStyle::PaintOn {
                    let buf = self.active_buffer_mut();
                    let next = (buf.rowpos() + 1).min(ROWS - 1);
                    buf.set_rowpos(next);
                    buf.current_row_mut().set_pac(0, LegacyAttributes::default());
                }
            }
            ControlCode::EOC => {
                let state = &mut self.channels[channel];
                state.displayed = 1 - state.displayed;
                state.style = LegacyStyle::PopOn;
                self.hide(sink);
                self.show(sink);
            }
            ControlCode::AOF
            | ControlCode::AON
            | ControlCode::FON
            | ControlCode::TR
            | ControlCode::RTD => debug!(?code, "ignoring control code"),
        }
    }

    fn decode_standard_chars(&mut self, c1: u8, c2: u8, sink: &mut dyn CaptionSink) {
        let row = self.active_buffer_mut().current_row_mut();
        row.add_char(c1, Charset::Basic);
        if c2 & 0x60 != 0 {
            row.add_char(c2, Charset::Basic);
        }
        self.paint(sink);
    }

    fn write_char(&mut self, code: u8, charset: Charset, sink: &mut dyn CaptionSink) {
        self.active_buffer_mut().current_row_mut().add_char(code, charset);
        self.paint(sink);
    }

    fn active_buffer_mut(&mut self) -> &mut LegacyBuffer {
        let active = self.channels[self.channel].active();
        &mut self.memory[active][self.channel]
    }

    /// Re-serialize after a write that is immediately visible.
    fn paint(&mut self, sink: &mut dyn CaptionSink) {
        if matches!(
            self.channels[self.channel].style,
            LegacyStyle::RollUp(_) | LegacyStyle::PaintOn
        ) {
            self.show(sink);
        }
    }

    fn stream(&self) -> Option<CaptionStream> {
        let channel = u8::try_from(self.channel + 1).ok()?;
        self.config
            .wants_legacy_channel(channel)
            .then_some(CaptionStream::Legacy { channel })
    }

    /// Serialize displayed memory; a caption erased down to nothing is hidden.
    fn show(&mut self, sink: &mut dyn CaptionSink) {
        let channel = self.channel;
        let displayed = self.channels[channel].displayed;
        let state = &mut self.channels[channel];
        let was_showing = !state.text.is_empty();
        self.memory[displayed][channel].serialize(&mut state.text);
        let Some(stream) = self.stream() else {
            return;
        };
        let text = &self.channels[channel].text;
        if !text.is_empty() {
            sink.show(stream, text);
        } else if was_showing {
            sink.hide(stream);
        }
    }

    fn hide(&mut self, sink: &mut dyn CaptionSink) {
        self.channels[self.channel].text.clear();
        if let Some(stream) = self.stream() {
            sink.hide(stream);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{CaptionEvent, CollectingSink};

    /// Set the parity bit so the byte has odd parity.
    fn p(byte: u8) -> u8 {
        if has_odd_parity(byte & 0x7F) {
            byte & 0x7F
        } else {
            byte | 0x80
        }
    }

    fn feed(dec: &mut Cea608Decoder, sink: &mut CollectingSink, pairs: &[(u8, u8)]) {
        for &(b1, b2) in pairs {
            assert!(dec.process_pair(p(b1), p(b2), sink));
        }
    }

    fn feed_text(dec: &mut Cea608Decoder, sink: &mut CollectingSink, text: &str) {
        for chunk in text.as_bytes().chunks(2) {
            let b2 = chunk.get(1).copied().unwrap_or(0);
            assert!(dec.process_pair(p(chunk[0]), p(b2), sink));
        }
    }

    const CC1: CaptionStream = CaptionStream::Legacy { channel: 1 };

    #[test]
    fn test_control_codes() {
        assert_eq!(ControlCode::from_byte(0x20), Some(ControlCode::RCL));
        assert_eq!(ControlCode::from_byte(0x25), Some(ControlCode::RollUp(2)));
        assert_eq!(ControlCode::from_byte(0x27), Some(ControlCode::RollUp(4)));
        assert_eq!(ControlCode::from_byte(0x2F), Some(ControlCode::EOC));
        assert_eq!(ControlCode::from_byte(0x30), None);
    }

    #[test]
    fn test_parity_failure_leaves_state() {
        let mut dec = Cea608Decoder::new();
        let mut sink = CollectingSink::new();
        feed(&mut dec, &mut sink, &[(0x14, 0x29)]);
        let before = dec.cursor(0);
        assert!(!dec.process_pair(0x48, 0x49, &mut sink));
        assert_eq!(dec.cursor(0), before);
        assert!(dec.displayed(0).is_empty());
    }

    #[test]
    fn test_pop_on_caption() {
        let mut dec = Cea608Decoder::new();
        let mut sink = CollectingSink::new();
        feed(&mut dec, &mut sink, &[(0x14, 0x20), (0x14, 0x20), (0x14, 0x70)]);
        feed_text(&mut dec, &mut sink, "HI");
        assert!(sink.events.is_empty());
        assert_eq!(dec.style(0), LegacyStyle::PopOn);

        feed(&mut dec, &mut sink, &[(0x14, 0x2F)]);
        assert_eq!(sink.last_shown(CC1), Some("HI\n"));
        assert_eq!(dec.text(0), "HI\n");
    }

    #[test]
    fn test_eoc_hides_previous_caption() {
        let mut dec = Cea608Decoder::new();
        let mut sink = CollectingSink::new();
        feed(&mut dec, &mut sink, &[(0x14, 0x20)]);
        feed_text(&mut dec, &mut sink, "ONE");
        feed(&mut dec, &mut sink, &[(0x14, 0x2F), (0x14, 0x2E), (0x14, 0x20)]);
        feed_text(&mut dec, &mut sink, "TWO");
        sink.take();
        feed(&mut dec, &mut sink, &[(0x14, 0x2F)]);
        assert_eq!(
            sink.events,
            vec![
                CaptionEvent::Hide { stream: CC1 },
                CaptionEvent::Show {
                    stream: CC1,
                    text: "TWO\n".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_roll_up_carriage_return() {
        let mut dec = Cea608Decoder::new();
        let mut sink = CollectingSink::new();
        feed(&mut dec, &mut sink, &[(0x14, 0x25), (0x14, 0x70)]);
        feed_text(&mut dec, &mut sink, "AB");
        assert_eq!(sink.last_shown(CC1), Some("AB\n"));

        feed(&mut dec, &mut sink, &[(0x14, 0x2D)]);
        assert_eq!(dec.displayed(0).row(13).cells()[0].code, b'A');
        assert!(dec.displayed(0).row(14).is_empty());

        feed_text(&mut dec, &mut sink, "CD");
        assert_eq!(sink.last_shown(CC1), Some("AB\nCD\n"));
    }

    #[test]
    fn test_backspace_to_blank_hides() {
        let mut dec = Cea608Decoder::new();
        let mut sink = CollectingSink::new();
        feed(&mut dec, &mut sink, &[(0x14, 0x29), (0x14, 0x70), (b'A', 0x00), (0x14, 0x21)]);
        assert_eq!(
            sink.events,
            vec![
                CaptionEvent::Show {
                    stream: CC1,
                    text: "A\n".to_string()
                },
                CaptionEvent::Hide { stream: CC1 },
            ]
        );
        assert_eq!(dec.text(0), "");

        // Nothing left to erase, nothing more to report.
        feed(&mut dec, &mut sink, &[(0x14, 0x24)]);
        assert_eq!(sink.hide_count(), 1);
    }

    #[test]
    fn test_delete_to_end_of_row_hides() {
        let mut dec = Cea608Decoder::new();
        let mut sink = CollectingSink::new();
        feed(&mut dec, &mut sink, &[(0x14, 0x29), (0x14, 0x70)]);
        feed_text(&mut dec, &mut sink, "AB");
        // Back to column 0, then erase the row.
        feed(&mut dec, &mut sink, &[(0x14, 0x70), (0x14, 0x24)]);
        assert_eq!(sink.events.last(), Some(&CaptionEvent::Hide { stream: CC1 }));
        assert_eq!(dec.text(0), "");
    }

    #[test]
    fn test_roll_up_scrolled_blank_hides() {
        let mut dec = Cea608Decoder::new();
        let mut sink = CollectingSink::new();
        feed(&mut dec, &mut sink, &[(0x14, 0x25), (0x14, 0x70)]);
        feed_text(&mut dec, &mut sink, "AB");
        // A PAC between the carriage returns keeps them from coalescing.
        feed(&mut dec, &mut sink, &[(0x14, 0x2D), (0x14, 0x70), (0x14, 0x2D)]);
        assert_eq!(sink.shown(CC1), vec!["AB\n", "AB\n"]);
        assert_eq!(sink.events.last(), Some(&CaptionEvent::Hide { stream: CC1 }));
        assert_eq!(dec.text(0), "");
    }

    #[test]
    fn test_padding_does_not_break_coalescing() {
        let mut dec = Cea608Decoder::new();
        let mut sink = CollectingSink::new();
        feed(&mut dec, &mut sink, &[(0x14, 0x20), (0x14, 0x70)]);
        feed_text(&mut dec, &mut sink, "HI");
        // EOC, padding, EOC: the repeat is still coalesced.
        feed(&mut dec, &mut sink, &[(0x14, 0x2F), (0x00, 0x00), (0x14, 0x2F)]);
        assert_eq!(dec.text(0), "HI\n");
        assert_eq!(sink.hide_count(), 1);
    }

    #[test]
    fn test_paint_on_shows_each_write() {
        let mut dec = Cea608Decoder::new();
        let mut sink = CollectingSink::new();
        feed(&mut dec, &mut sink, &[(0x14, 0x29), (0x14, 0x70)]);
        feed_text(&mut dec, &mut sink, "ABCD");
        assert_eq!(sink.shown(CC1), vec!["AB\n", "ABCD\n"]);
    }

    #[test]
    fn test_repeated_control_code_is_coalesced() {
        let mut dec = Cea608Decoder::new();
        let mut sink = CollectingSink::new();
        feed(&mut dec, &mut sink, &[(0x14, 0x29), (0x14, 0x70)]);
        feed_text(&mut dec, &mut sink, "ABC");
        feed(&mut dec, &mut sink, &[(0x14, 0x21), (0x14, 0x21)]);
        assert_eq!(dec.cursor(0), (14, 2));
    }

    #[test]
    fn test_repeated_characters_are_not_coalesced() {
        let mut dec = Cea608Decoder::new();
        let mut sink = CollectingSink::new();
        feed(&mut dec, &mut sink, &[(0x14, 0x29), (0x14, 0x70)]);
        feed_text(&mut dec, &mut sink, "ABAB");
        assert_eq!(dec.text(0), "ABAB\n");
    }

    #[test]
    fn test_pac_row_and_indent() {
        let mut dec = Cea608Decoder::new();
        let mut sink = CollectingSink::new();
        // Row 0, indent 8.
        feed(&mut dec, &mut sink, &[(0x14, 0x20), (0x11, 0x54)]);
        assert_eq!(dec.cursor(0), (0, 8));
        // Row 10 lives at the start of the table.
        feed(&mut dec, &mut sink, &[(0x10, 0x40)]);
        assert_eq!(dec.cursor(0), (10, 0));
        // Reserved code leaves the cursor alone.
        feed(&mut dec, &mut sink, &[(0x10, 0x60)]);
        assert_eq!(dec.cursor(0), (10, 0));
    }

    #[test]
    fn test_pac_color_style() {
        let mut dec = Cea608Decoder::new();
        let mut sink = CollectingSink::new();
        // Row 14, red, underlined.
        feed(&mut dec, &mut sink, &[(0x14, 0x29), (0x14, 0x69)]);
        feed_text(&mut dec, &mut sink, "RED");
        assert_eq!(
            sink.last_shown(CC1),
            Some("<font color=\"#FF0000\"><u>RED</u></font>\n")
        );
    }

    #[test]
    fn test_special_and_extended_characters() {
        let mut dec = Cea608Decoder::new();
        let mut sink = CollectingSink::new();
        feed(&mut dec, &mut sink, &[(0x14, 0x29), (0x14, 0x70)]);
        feed(&mut dec, &mut sink, &[(0x11, 0x37)]);
        feed_text(&mut dec, &mut sink, "E");
        // 'E' fallback replaced by 'É'.
        feed(&mut dec, &mut sink, &[(0x12, 0x21)]);
        assert_eq!(dec.text(0), "♪É\n");
    }

    #[test]
    fn test_second_channel() {
        let mut dec = Cea608Decoder::new();
        let mut sink = CollectingSink::new();
        feed(&mut dec, &mut sink, &[(0x1C, 0x29), (0x1C, 0x70)]);
        feed_text(&mut dec, &mut sink, "CC2");
        assert_eq!(dec.current_channel(), 1);
        assert_eq!(
            sink.last_shown(CaptionStream::Legacy { channel: 2 }),
            Some("CC2\n")
        );
        assert!(dec.displayed(0).is_empty());
    }

    #[test]
    fn test_output_channel_filter() {
        let mut dec = Cea608Decoder::new();
        dec.set_output_channel(Some(1));
        let mut sink = CollectingSink::new();
        feed(&mut dec, &mut sink, &[(0x1C, 0x29), (0x1C, 0x70)]);
        feed_text(&mut dec, &mut sink, "CC2");
        assert!(sink.events.is_empty());
        assert_eq!(dec.text(1), "CC2\n");
    }

    #[test]
    fn test_erase_displayed_memory() {
        let mut dec = Cea608Decoder::new();
        let mut sink = CollectingSink::new();
        feed(&mut dec, &mut sink, &[(0x14, 0x29)]);
        feed_text(&mut dec, &mut sink, "XY");
        feed(&mut dec, &mut sink, &[(0x14, 0x2C)]);
        assert!(dec.displayed(0).is_empty());
        assert_eq!(sink.hide_count(), 1);
        assert_eq!(dec.text(0), "");
    }
}
