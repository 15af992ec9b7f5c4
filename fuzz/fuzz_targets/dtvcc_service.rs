#![no_main]

//! Fuzz target for the DTVCC service interpreter.
//!
//! Runs arbitrary service blocks through one `ServiceDecoder` and checks the
//! window invariants after every block.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use transcode_cc::cea708::{ServiceDecoder, SCREEN_COLUMNS, SCREEN_ROWS};

#[derive(Arbitrary, Debug)]
struct ServiceInput {
    service: u8,
    no_rollup: bool,
    blocks: Vec<Vec<u8>>,
}

fuzz_target!(|input: ServiceInput| {
    if input.blocks.len() > 64 {
        return;
    }

    let mut decoder = ServiceDecoder::new(input.service & 0x3F, input.no_rollup);
    for block in &input.blocks {
        if block.len() > 31 {
            continue;
        }
        let _ = decoder.process_block(block, &mut ());

        for window in decoder.windows().iter().filter(|w| w.is_defined()) {
            let (row, col) = window.cursor();
            assert!(row < window.row_count());
            assert!(col < window.col_count());
            let (top, left) = window.origin();
            assert!(top + window.row_count() <= SCREEN_ROWS);
            assert!(left + window.col_count() <= SCREEN_COLUMNS);
        }
    }
});
