//! # transcode-cc
//!
//! Closed caption decoding for the caption user data carried in video
//! elementary streams (ATSC A/53 `cc_data`).
//!
//! ## Features
//!
//! - CEA-608 (line 21) decoding: pop-on, roll-up and paint-on styles, both
//!   data channels, special and extended character sets, PAC and mid-row styling
//! - CEA-708 (DTVCC) decoding: packet reassembly with sequence checking,
//!   services 1-63, eight windows per service, pen and window attributes,
//!   priority-ordered composition onto a 75x210 screen
//! - Output through a [`CaptionSink`] as text with inline `<i>`, `<u>` and
//!   `<font color>` tags
//!
//! ## Quick Start
//!
//! ```rust
//! use transcode_cc::{CaptionStream, CcDecoder, CollectingSink, DecoderConfig};
//!
//! let mut decoder = CcDecoder::new(DecoderConfig::default());
//! let mut sink = CollectingSink::new();
//!
//! // Field 1 triplets: resume caption loading (sent twice), "HI", end of caption.
//! let cc_data = [
//!     0xFC, 0x94, 0x20,
//!     0xFC, 0x94, 0x20,
//!     0xFC, 0xC8, 0x49,
//!     0xFC, 0x94, 0x2F,
//! ];
//! decoder.decode(&cc_data, &mut sink).unwrap();
//!
//! let cc1 = CaptionStream::Legacy { channel: 1 };
//! assert_eq!(sink.last_shown(cc1), Some("HI\n"));
//! assert_eq!(decoder.text(cc1), "HI\n");
//! ```

pub mod cea608;
pub mod cea708;
pub mod config;
pub mod error;
pub mod sink;
pub mod style;
pub mod triplet;

pub use cea608::Cea608Decoder;
pub use cea708::Cea708Decoder;
pub use config::DecoderConfig;
pub use error::{CaptionError, Result};
pub use sink::{CaptionEvent, CaptionSink, CaptionStream, CollectingSink};
pub use style::{Color, LegacyColor};
pub use triplet::{triplets, CaptionTriplet, CcType, TRIPLET_SIZE};

use tracing::trace;

/// Prelude module for convenient imports.
///
/// ```rust
/// use transcode_cc::prelude::*;
/// ```
pub mod prelude {
    pub use crate::cea608::{Cea608Decoder, LegacyStyle};
    pub use crate::cea708::{Cea708Decoder, ServiceDecoder, Window};
    pub use crate::config::DecoderConfig;
    pub use crate::error::{CaptionError, Result};
    pub use crate::sink::{CaptionEvent, CaptionSink, CaptionStream, CollectingSink};
    pub use crate::style::Color;
    pub use crate::triplet::{CaptionTriplet, CcType};
    pub use crate::CcDecoder;
}

/// Front-end routing caption triplets to the line-21 and DTVCC decoders.
#[derive(Debug, Clone)]
pub struct CcDecoder {
    config: DecoderConfig,
    legacy: Cea608Decoder,
    dtvcc: Cea708Decoder,
}

impl Default for CcDecoder {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}

impl CcDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        let legacy = Cea608Decoder::with_config(&config);
        let dtvcc = Cea708Decoder::new(&config);
        Self {
            config,
            legacy,
            dtvcc,
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn legacy(&self) -> &Cea608Decoder {
        &self.legacy
    }

    pub fn dtvcc(&self) -> &Cea708Decoder {
        &self.dtvcc
    }

    /// Decode the caption triplets of one video frame.
    ///
    /// `data` holds whole triplets; a trailing partial triplet is ignored.
    /// Malformed input is dropped or answered with a decoder reset; the only
    /// error returned is a failed window allocation, after which decoding can
    /// continue with the next frame.
    pub fn decode(&mut self, data: &[u8], sink: &mut dyn CaptionSink) -> Result<()> {
        for triplet in triplets(data) {
            match triplet.cc_type {
                CcType::Field1 => self.decode_legacy(triplet, sink),
                CcType::Field2 => {
                    if self.config.field2_fallback && !self.dtvcc.is_active() {
                        self.decode_legacy(triplet, sink);
                    } else {
                        trace!("skipping field 2 pair");
                    }
                }
                CcType::DtvccStart | CcType::DtvccData => {
                    if self.config.dtvcc_enabled {
                        self.dtvcc.push_triplet(triplet, sink)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn decode_legacy(&mut self, triplet: CaptionTriplet, sink: &mut dyn CaptionSink) {
        if !self.config.legacy_enabled || !triplet.valid {
            return;
        }
        self.legacy.process_pair(triplet.byte1, triplet.byte2, sink);
    }

    /// Current text of a stream, as last passed to the sink.
    pub fn text(&self, stream: CaptionStream) -> &str {
        match stream {
            CaptionStream::Legacy { channel } => {
                self.legacy.text(usize::from(channel.saturating_sub(1)))
            }
            CaptionStream::Service(service) => self.dtvcc.text(service),
        }
    }

    /// Return both decoders to their initial state.
    pub fn reset(&mut self) {
        self.legacy.reset();
        self.dtvcc.reset();
    }
}
