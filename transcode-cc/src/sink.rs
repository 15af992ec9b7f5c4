//! Output sink for decoded caption text.
//!
//! A decoder calls [`CaptionSink::show`] once per stream after any change to
//! the visible text, and [`CaptionSink::hide`] when previously shown text must
//! be cleared. The text passed to `show` is the decoder's current buffer for
//! that stream and stays readable through the decoder afterwards.

use serde::{Deserialize, Serialize};

/// Identifies which caption stream produced an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaptionStream {
    /// Line-21 data channel (1 or 2).
    Legacy { channel: u8 },
    /// DTVCC service number (1-63).
    Service(u8),
}

/// Receiver of caption updates.
pub trait CaptionSink {
    /// New text for `stream` is ready.
    fn show(&mut self, stream: CaptionStream, text: &str);

    /// Text previously shown for `stream` must be cleared.
    fn hide(&mut self, stream: CaptionStream);
}

/// Discards every update.
impl CaptionSink for () {
    fn show(&mut self, _stream: CaptionStream, _text: &str) {}
    fn hide(&mut self, _stream: CaptionStream) {}
}

/// A recorded sink callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptionEvent {
    Show { stream: CaptionStream, text: String },
    Hide { stream: CaptionStream },
}

/// A sink that records every callback in order.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    pub events: Vec<CaptionEvent>,
}

impl CollectingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the recorded events.
    pub fn take(&mut self) -> Vec<CaptionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Texts shown for a stream, oldest first.
    pub fn shown(&self, stream: CaptionStream) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                CaptionEvent::Show { stream: s, text } if *s == stream => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The most recent text shown for a stream.
    pub fn last_shown(&self, stream: CaptionStream) -> Option<&str> {
        self.shown(stream).last().copied()
    }

    /// Number of hide callbacks received.
    pub fn hide_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, CaptionEvent::Hide { .. }))
            .count()
    }
}

impl CaptionSink for CollectingSink {
    fn show(&mut self, stream: CaptionStream, text: &str) {
        self.events.push(CaptionEvent::Show {
            stream,
            text: text.to_string(),
        });
    }

    fn hide(&mut self, stream: CaptionStream) {
        self.events.push(CaptionEvent::Hide { stream });
    }
}
