#![no_main]

//! Fuzz target for the caption front-end.
//!
//! Feeds arbitrary per-frame `cc_data` buffers through `CcDecoder` with an
//! arbitrary configuration; decoding must never panic.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use transcode_cc::{CaptionEvent, CaptionStream, CcDecoder, CollectingSink, DecoderConfig};

#[derive(Arbitrary, Debug)]
struct CcInput {
    frames: Vec<Vec<u8>>,
    legacy_enabled: bool,
    dtvcc_enabled: bool,
    field2_fallback: bool,
    no_rollup: bool,
    services: Option<Vec<u8>>,
    legacy_channel: Option<u8>,
    reset_after: Option<u8>,
}

fuzz_target!(|input: CcInput| {
    // Limit input size
    if input.frames.len() > 256 {
        return;
    }

    let config = DecoderConfig {
        legacy_enabled: input.legacy_enabled,
        dtvcc_enabled: input.dtvcc_enabled,
        field2_fallback: input.field2_fallback,
        no_rollup: input.no_rollup,
        services: input.services,
        legacy_channel: input.legacy_channel,
    };
    let mut decoder = CcDecoder::new(config);
    let mut sink = CollectingSink::new();

    for (i, frame) in input.frames.iter().enumerate() {
        if frame.len() > 1024 {
            continue;
        }
        if let Err(err) = decoder.decode(frame, &mut sink) {
            assert!(!err.is_recoverable(), "recoverable error surfaced: {err}");
        }
        if input.reset_after.map(usize::from) == Some(i) {
            decoder.reset();
        }
    }

    let _ = decoder.text(CaptionStream::Legacy { channel: 1 });
    let _ = decoder.text(CaptionStream::Legacy { channel: 2 });
    for event in sink.take() {
        if let CaptionEvent::Show { text, .. } = event {
            assert!(!text.is_empty(), "show with empty text");
        }
    }
});
