//! Per-service command interpreter.

use super::command::{Command, WindowSet};
use super::screen::Screen;
use super::window::{PenAttributes, PenColor, Window, WindowAttributes, MAX_WINDOWS};
use crate::error::Result;
use crate::sink::{CaptionSink, CaptionStream};
use tracing::{debug, trace};

/// Window and screen state of one caption service.
#[derive(Debug, Clone)]
pub struct ServiceDecoder {
    service: u8,
    windows: [Window; MAX_WINDOWS],
    current: Option<usize>,
    no_rollup: bool,
    screen: Screen,
    text: String,
    dirty: bool,
}

impl ServiceDecoder {
    pub fn new(service: u8, no_rollup: bool) -> Self {
        Self {
            service,
            windows: std::array::from_fn(|i| Window::new(i as u8)),
            current: None,
            no_rollup,
            screen: Screen::new(),
            text: String::new(),
            dirty: false,
        }
    }

    pub fn service(&self) -> u8 {
        self.service
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn window(&self, id: usize) -> Option<&Window> {
        self.windows.get(id)
    }

    /// Index of the current window.
    pub fn current_window(&self) -> Option<usize> {
        self.current
    }

    /// Last rendered text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Undefine every window and release their storage.
    pub fn reset(&mut self) {
        let was_showing = !self.text.is_empty();
        self.windows = std::array::from_fn(|i| Window::new(i as u8));
        self.current = None;
        self.dirty = self.dirty || was_showing;
    }

    /// Interpret one service block, rendering once at its end if the screen changed.
    ///
    /// Stops at the first command that cannot be decoded or executed.
    pub fn process_block(&mut self, data: &[u8], sink: &mut dyn CaptionSink) -> Result<()> {
        let result = self.run_commands(data);
        self.render_if_dirty(sink);
        result
    }

    fn run_commands(&mut self, data: &[u8]) -> Result<()> {
        let mut pos = 0;
        while pos < data.len() {
            let (command, used) = Command::parse(&data[pos..])?;
            pos += used;
            self.execute(command)?;
        }
        Ok(())
    }

    /// Render and notify the sink if anything visible changed since the last render.
    pub fn render_if_dirty(&mut self, sink: &mut dyn CaptionSink) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        self.screen.compose(&self.windows);
        self.screen.serialize(&mut self.text);
        let stream = CaptionStream::Service(self.service);
        if self.text.is_empty() {
            sink.hide(stream);
        } else {
            sink.show(stream, &self.text);
        }
    }

    fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Text(symbol) => self.with_current("text", |w| w.write(symbol)),
            Command::CarriageReturn => {
                let no_rollup = self.no_rollup;
                self.with_current("CR", |w| w.carriage_return(no_rollup));
            }
            Command::HorizontalCarriageReturn => {
                self.with_current("HCR", |w| w.horizontal_carriage_return())
            }
            Command::FormFeed => self.with_current("FF", |w| w.form_feed()),
            Command::EndOfText => {}
            Command::Ignored(code) => debug!(service = self.service, code, "ignoring command"),
            Command::SetCurrentWindow(id) => {
                let id = usize::from(id);
                if !self.windows[id].is_defined() {
                    debug!(service = self.service, window = id, "selecting undefined window");
                }
                self.current = Some(id);
            }
            Command::ClearWindows(set) => self.for_windows(set, |w| {
                w.clear();
                w.is_visible()
            }),
            Command::DisplayWindows(set) => self.for_windows(set, |w| {
                w.set_visible(true);
                true
            }),
            Command::HideWindows(set) => self.for_windows(set, |w| {
                let was_visible = w.is_visible();
                w.set_visible(false);
                was_visible
            }),
            Command::ToggleWindows(set) => self.for_windows(set, |w| {
                w.set_visible(!w.is_visible());
                true
            }),
            Command::DeleteWindows(set) => {
                if let Some(current) = self.current {
                    if set.iter().any(|id| id == current) {
                        self.current = None;
                    }
                }
                self.for_windows(set, |w| {
                    let was_visible = w.is_visible();
                    w.delete();
                    was_visible
                });
            }
            Command::Delay(tenths) => {
                debug!(service = self.service, tenths, "delay not supported, ignoring")
            }
            Command::DelayCancel => debug!(service = self.service, "ignoring delay cancel"),
            Command::Reset => {
                debug!(service = self.service, "service reset command");
                self.reset();
            }
            Command::SetPenAttributes(params) => self.with_current("SPA", |w| {
                w.set_pen_attributes(PenAttributes::from_params(params))
            }),
            Command::SetPenColor(params) => self.with_current("SPC", |w| {
                w.set_pen_color(PenColor::from_params(params))
            }),
            Command::SetPenLocation { row, column } => self.with_current("SPL", |w| {
                w.set_pen_location(usize::from(row), usize::from(column))
            }),
            Command::SetWindowAttributes(params) => self.with_current("SWA", |w| {
                w.set_attributes(WindowAttributes::from_params(params))
            }),
            Command::DefineWindow { window, params } => return self.define_window(window, params),
        }
        Ok(())
    }

    fn define_window(&mut self, id: u8, params: [u8; 6]) -> Result<()> {
        let index = usize::from(id);
        let window = &mut self.windows[index];
        let was_visible = window.is_defined() && window.is_visible();
        match window.define(params) {
            Ok(changed) => {
                if changed {
                    trace!(service = self.service, window = id, "window defined");
                }
                self.dirty |= changed && (was_visible || window.is_visible());
                self.current = Some(index);
                Ok(())
            }
            Err(err) => {
                self.current = None;
                self.dirty |= was_visible;
                Err(err)
            }
        }
    }

    /// Run `f` on the current window if it is defined.
    ///
    /// Content changes on a visible window anchored at the bottom of the
    /// screen mark the service for rendering.
    fn with_current(&mut self, command: &str, f: impl FnOnce(&mut Window)) {
        let Some(id) = self.current else {
            debug!(service = self.service, command, "no current window");
            return;
        };
        let window = &mut self.windows[id];
        if !window.is_defined() {
            debug!(service = self.service, window = id, command, "current window undefined");
            return;
        }
        f(window);
        if window.is_visible() && window.anchor_point().is_bottom() {
            self.dirty = true;
        }
    }

    /// Apply `f` to each defined window of the set; `f` reports whether the screen changed.
    fn for_windows(&mut self, set: WindowSet, mut f: impl FnMut(&mut Window) -> bool) {
        for id in set.iter() {
            let window = &mut self.windows[id];
            if window.is_defined() {
                self.dirty |= f(window);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaptionError;
    use crate::sink::{CaptionEvent, CollectingSink};

    const SERVICE: CaptionStream = CaptionStream::Service(1);

    /// DefineWindow 0: visible, bottom-center, 2 rows x 10 columns.
    const DF0_VISIBLE: [u8; 7] = [0x98, 0x20, 74, 105, 0x71, 0x09, 0x00];

    /// DefineWindow 1: hidden, top-left, 1 row x 20 columns.
    const DF1_HIDDEN: [u8; 7] = [0x99, 0x00, 0, 0, 0x00, 0x13, 0x00];

    fn block(parts: &[&[u8]]) -> Vec<u8> {
        parts.concat()
    }

    #[test]
    fn test_text_into_bottom_window() {
        let mut svc = ServiceDecoder::new(1, false);
        let mut sink = CollectingSink::new();
        svc.process_block(&block(&[&DF0_VISIBLE, b"HI"]), &mut sink).unwrap();
        assert_eq!(
            sink.events,
            vec![CaptionEvent::Show {
                stream: SERVICE,
                text: "HI\n".into()
            }]
        );
        assert_eq!(svc.text(), "HI\n");
        assert_eq!(svc.current_window(), Some(0));
    }

    #[test]
    fn test_text_without_window_dropped() {
        let mut svc = ServiceDecoder::new(1, false);
        let mut sink = CollectingSink::new();
        svc.process_block(b"lost", &mut sink).unwrap();
        assert!(sink.events.is_empty());

        svc.process_block(&[0x82, b'x'], &mut sink).unwrap();
        assert_eq!(svc.current_window(), Some(2));
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_pop_on_with_hidden_window() {
        let mut svc = ServiceDecoder::new(1, false);
        let mut sink = CollectingSink::new();
        svc.process_block(&block(&[&DF1_HIDDEN, b"later"]), &mut sink).unwrap();
        assert!(sink.events.is_empty());

        // DSW window 1
        svc.process_block(&[0x89, 0x02], &mut sink).unwrap();
        assert_eq!(sink.last_shown(SERVICE), Some("later\n"));

        // HDW window 1
        svc.process_block(&[0x8A, 0x02], &mut sink).unwrap();
        assert_eq!(sink.events.last(), Some(&CaptionEvent::Hide { stream: SERVICE }));
        assert_eq!(svc.text(), "");
    }

    #[test]
    fn test_identical_define_keeps_content() {
        let mut svc = ServiceDecoder::new(1, false);
        let mut sink = CollectingSink::new();
        svc.process_block(&block(&[&DF0_VISIBLE, b"AB"]), &mut sink).unwrap();
        let cursor = svc.window(0).unwrap().cursor();
        sink.take();

        svc.process_block(&DF0_VISIBLE, &mut sink).unwrap();
        assert!(sink.events.is_empty());
        assert_eq!(svc.window(0).unwrap().cursor(), cursor);
        assert_eq!(svc.window(0).unwrap().cell(0, 1), 'B');
    }

    #[test]
    fn test_delete_clears_current() {
        let mut svc = ServiceDecoder::new(1, false);
        let mut sink = CollectingSink::new();
        svc.process_block(&block(&[&DF0_VISIBLE, b"X", &[0x8C, 0x01]]), &mut sink)
            .unwrap();
        assert_eq!(svc.current_window(), None);
        assert!(!svc.window(0).unwrap().is_defined());
        assert_eq!(sink.events, vec![CaptionEvent::Hide { stream: SERVICE }]);
    }

    #[test]
    fn test_reset_command_blanks_screen() {
        let mut svc = ServiceDecoder::new(1, false);
        let mut sink = CollectingSink::new();
        svc.process_block(&block(&[&DF0_VISIBLE, b"X"]), &mut sink).unwrap();
        svc.process_block(&[0x8F], &mut sink).unwrap();
        assert_eq!(sink.hide_count(), 1);
        assert!(svc.windows().iter().all(|w| !w.is_defined()));
    }

    #[test]
    fn test_pen_commands_need_window() {
        let mut svc = ServiceDecoder::new(1, false);
        let mut sink = CollectingSink::new();
        svc.process_block(&[0x90, 0x00, 0xC0, 0x92, 0x01, 0x02], &mut sink)
            .unwrap();
        assert_eq!(svc.current_window(), None);

        let spl_spa = [0x92, 0x01, 0x03, 0x90, 0x00, 0x80];
        svc.process_block(&block(&[&DF0_VISIBLE, &spl_spa, b"i"]), &mut sink)
            .unwrap();
        let window = svc.window(0).unwrap();
        assert_eq!(window.cursor(), (1, 4));
        assert!(window.row_style(1).italic);
        assert!(!window.row_style(0).italic);
        assert_eq!(sink.last_shown(SERVICE), Some("<i>i</i>\n"));
    }

    #[test]
    fn test_unsupported_command_stops_block() {
        let mut svc = ServiceDecoder::new(1, false);
        let mut sink = CollectingSink::new();
        let err = svc
            .process_block(&block(&[&DF0_VISIBLE, b"A", &[0x10, 0x95], b"B"]), &mut sink)
            .unwrap_err();
        assert_eq!(err, CaptionError::UnsupportedCommand(0x95));
        assert_eq!(sink.last_shown(SERVICE), Some("A\n"));
    }

    #[test]
    fn test_roll_up_window() {
        let mut svc = ServiceDecoder::new(1, false);
        let mut sink = CollectingSink::new();
        let data = block(&[&DF0_VISIBLE, b"one", &[0x0D], b"two", &[0x0D], b"3"]);
        svc.process_block(&data, &mut sink).unwrap();
        assert_eq!(svc.text(), "two\n3\n");
    }

    #[test]
    fn test_no_rollup_clears_last_row() {
        let mut svc = ServiceDecoder::new(1, true);
        let mut sink = CollectingSink::new();
        let data = block(&[&DF0_VISIBLE, b"one", &[0x0D], b"two", &[0x0D], b"3"]);
        svc.process_block(&data, &mut sink).unwrap();
        assert_eq!(svc.text(), "one\n3\n");
    }
}
