//! CEA-708 (DTVCC) closed caption decoder.
//!
//! CEA-708 is the digital closed caption standard for ATSC television. Packet
//! triplets are reassembled into DTVCC packets, split into service blocks and
//! interpreted per service:
//!
//! - Up to 63 caption services
//! - Eight windows per service, each with its own pen and attributes
//! - Windows composed onto a 75x210 virtual screen by priority
//!
//! Packet loss and malformed packets are answered by resetting every service,
//! so stale windows never stay on screen.

pub mod command;
pub mod packet;
pub mod screen;
pub mod service;
pub mod window;

pub use command::{Command, CommandInfo, WindowSet, C0_COMMANDS, C1_COMMANDS};
pub use packet::{PacketAssembler, ServiceBlock, ServiceBlocks, MAX_PACKET_SIZE};
pub use screen::Screen;
pub use service::ServiceDecoder;
pub use window::{
    AnchorPoint, BorderType, DisplayEffect, Justification, Opacity, PenAttributes, PenColor,
    PrintDirection, ScrollDirection, Window, WindowAttributes, WindowDefinition, MAX_COLUMNS,
    MAX_ROWS, MAX_WINDOWS, SCREEN_COLUMNS, SCREEN_ROWS,
};

use crate::config::DecoderConfig;
use crate::error::{CaptionError, Result};
use crate::sink::CaptionSink;
use crate::triplet::{CaptionTriplet, CcType};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// DTVCC decoder: packet reassembly plus one interpreter per service.
#[derive(Debug, Clone)]
pub struct Cea708Decoder {
    assembler: PacketAssembler,
    services: HashMap<u8, ServiceDecoder>,
    config: DecoderConfig,
    packets_seen: u64,
}

impl Default for Cea708Decoder {
    fn default() -> Self {
        Self::new(&DecoderConfig::default())
    }
}

impl Cea708Decoder {
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            assembler: PacketAssembler::new(),
            services: HashMap::new(),
            config: config.clone(),
            packets_seen: 0,
        }
    }

    /// Whether any packet start has been received.
    pub fn is_active(&self) -> bool {
        self.packets_seen > 0
    }

    /// Number of packet starts received.
    pub fn packets_seen(&self) -> u64 {
        self.packets_seen
    }

    pub fn assembler(&self) -> &PacketAssembler {
        &self.assembler
    }

    /// State of a service, once it has received a block.
    pub fn service(&self, service: u8) -> Option<&ServiceDecoder> {
        self.services.get(&service)
    }

    /// Last rendered text of a service.
    pub fn text(&self, service: u8) -> &str {
        self.services.get(&service).map_or("", ServiceDecoder::text)
    }

    /// Drop all services and any partial packet.
    pub fn reset(&mut self) {
        self.assembler.reset();
        self.services.clear();
        self.packets_seen = 0;
    }

    /// Feed one DTVCC triplet.
    ///
    /// Only a window allocation failure is returned; every other problem is
    /// logged and handled by skipping or resetting.
    pub fn push_triplet(&mut self, triplet: CaptionTriplet, sink: &mut dyn CaptionSink) -> Result<()> {
        if !triplet.valid {
            trace!(cc_type = ?triplet.cc_type, "skipping invalid triplet");
            return Ok(());
        }
        match triplet.cc_type {
            CcType::DtvccStart => {
                self.packets_seen += 1;
                if let Err(err) = self.assembler.start(triplet.payload()) {
                    self.abandon_packet(err, sink)?;
                }
            }
            CcType::DtvccData => {
                if !self.assembler.extend(triplet.payload()) {
                    trace!("packet data without a start, skipping");
                    return Ok(());
                }
            }
            CcType::Field1 | CcType::Field2 => return Ok(()),
        }

        match self.assembler.take_complete() {
            Some(packet) => self.process_packet(&packet, sink),
            None => Ok(()),
        }
    }

    /// Interpret one complete packet, header byte included.
    pub fn process_packet(&mut self, packet: &[u8], sink: &mut dyn CaptionSink) -> Result<()> {
        let Some(&header) = packet.first() else {
            return Ok(());
        };
        if let Err(err) = self.assembler.check_sequence(header) {
            return self.abandon_packet(err, sink);
        }

        for block in ServiceBlocks::new(packet) {
            let block = match block {
                Ok(block) => block,
                Err(err) => return self.abandon_packet(err, sink),
            };

            if !self.config.wants_service(block.service) {
                trace!(service = block.service, "skipping unselected service");
                continue;
            }

            let no_rollup = self.config.no_rollup;
            let decoder = self
                .services
                .entry(block.service)
                .or_insert_with(|| ServiceDecoder::new(block.service, no_rollup));

            match decoder.process_block(block.data, sink) {
                Ok(()) => {}
                Err(err @ CaptionError::TruncatedCommand { .. }) => {
                    debug!(service = block.service, %err, "service block cut short");
                }
                Err(err) => return self.abandon_packet(err, sink),
            }
        }
        Ok(())
    }

    /// Stop interpreting the current packet.
    ///
    /// Reset errors blank every service; a failed allocation is handed back.
    fn abandon_packet(&mut self, err: CaptionError, sink: &mut dyn CaptionSink) -> Result<()> {
        if !err.is_recoverable() {
            return Err(err);
        }
        if err.requires_reset() {
            warn!(%err, "abandoning packet, resetting services");
            self.reset_services(sink);
        } else {
            warn!(%err, "abandoning packet");
        }
        Ok(())
    }

    /// Undefine every window of every service, blanking whatever was shown.
    fn reset_services(&mut self, sink: &mut dyn CaptionSink) {
        for decoder in self.services.values_mut() {
            decoder.reset();
            decoder.render_if_dirty(sink);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{CaptionEvent, CaptionStream, CollectingSink};

    fn start(b1: u8, b2: u8) -> CaptionTriplet {
        CaptionTriplet::parse([0xFF, b1, b2])
    }

    fn data(b1: u8, b2: u8) -> CaptionTriplet {
        CaptionTriplet::parse([0xFE, b1, b2])
    }

    /// Packet with sequence `seq` carrying one service-1 block.
    fn build_packet(seq: u8, block: &[u8]) -> Vec<u8> {
        let mut body = vec![0x20 | block.len() as u8];
        body.extend_from_slice(block);
        if body.len() % 2 == 0 {
            body.push(0x00);
        }
        let size = (body.len() + 1) / 2;
        let mut packet = vec![(seq << 6) | size as u8];
        packet.extend_from_slice(&body);
        packet
    }

    fn feed(dec: &mut Cea708Decoder, sink: &mut CollectingSink, packet: &[u8]) {
        for (i, pair) in packet.chunks(2).enumerate() {
            let b2 = pair.get(1).copied().unwrap_or(0);
            let triplet = if i == 0 { start(pair[0], b2) } else { data(pair[0], b2) };
            dec.push_triplet(triplet, sink).unwrap();
        }
    }

    fn cat(parts: &[&[u8]]) -> Vec<u8> {
        parts.concat()
    }

    const DF0: [u8; 7] = [0x98, 0x20, 74, 105, 0x71, 0x09, 0x00];

    #[test]
    fn test_packet_helper_sizes() {
        let p = build_packet(0, b"HI");
        assert_eq!(p.len() % 2, 0);
        assert_eq!(packet::declared_size(p[0]), p.len());
    }

    #[test]
    fn test_decode_service_text() {
        let mut dec = Cea708Decoder::default();
        let mut sink = CollectingSink::new();
        feed(&mut dec, &mut sink, &build_packet(0, &cat(&[&DF0, b"HELLO"])));
        assert_eq!(sink.last_shown(CaptionStream::Service(1)), Some("HELLO\n"));
        assert_eq!(dec.text(1), "HELLO\n");
        assert!(dec.is_active());
    }

    #[test]
    fn test_incomplete_packet_not_processed() {
        let mut dec = Cea708Decoder::default();
        let mut sink = CollectingSink::new();
        // Declares 6 bytes, only 2 arrive.
        dec.push_triplet(start(0x03, 0x21), &mut sink).unwrap();
        assert!(dec.service(1).is_none());
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_invalid_start_never_completes() {
        let mut dec = Cea708Decoder::default();
        let mut sink = CollectingSink::new();
        dec.push_triplet(CaptionTriplet::parse([0xFB, 0x01, 0x21]), &mut sink)
            .unwrap();
        assert_eq!(dec.assembler().accumulated(), 0);
        assert!(dec.service(1).is_none());
    }

    #[test]
    fn test_sequence_gap_resets_windows() {
        let mut dec = Cea708Decoder::default();
        let mut sink = CollectingSink::new();
        feed(&mut dec, &mut sink, &build_packet(0, &cat(&[&DF0, b"A"])));
        feed(&mut dec, &mut sink, &build_packet(1, b"B"));
        assert!(dec.service(1).unwrap().window(0).unwrap().is_defined());

        sink.take();
        feed(&mut dec, &mut sink, &build_packet(3, &[0x88, 0x00]));
        let svc = dec.service(1).unwrap();
        assert!(svc.windows().iter().all(|w| !w.is_defined()));
        assert_eq!(
            sink.events,
            vec![CaptionEvent::Hide {
                stream: CaptionStream::Service(1)
            }]
        );
    }

    #[test]
    fn test_sequence_gap_drops_packet() {
        let mut dec = Cea708Decoder::default();
        let mut sink = CollectingSink::new();
        feed(&mut dec, &mut sink, &build_packet(1, b"A"));
        feed(&mut dec, &mut sink, &build_packet(0, &cat(&[&DF0, b"B"])));
        assert!(dec.service(1).unwrap().windows().iter().all(|w| !w.is_defined()));
        assert!(sink.events.is_empty());

        // Counting resumes from the dropped packet.
        feed(&mut dec, &mut sink, &build_packet(1, &cat(&[&DF0, b"C"])));
        assert_eq!(dec.text(1), "C\n");
    }

    #[test]
    fn test_restart_mid_packet_resets() {
        let mut dec = Cea708Decoder::default();
        let mut sink = CollectingSink::new();
        feed(&mut dec, &mut sink, &build_packet(0, &cat(&[&DF0, b"A"])));
        assert_eq!(dec.text(1), "A\n");

        // Sequence 1 declares 4 bytes; sequence 2 starts after only 2.
        dec.push_triplet(start(0x42, 0x21), &mut sink).unwrap();
        dec.push_triplet(start(0x82, 0x21), &mut sink).unwrap();
        assert!(!dec.service(1).unwrap().window(0).unwrap().is_defined());
        assert_eq!(
            sink.events.last(),
            Some(&CaptionEvent::Hide {
                stream: CaptionStream::Service(1)
            })
        );
        assert_eq!(dec.assembler().accumulated(), 2);
    }

    #[test]
    fn test_malformed_block_resets() {
        let mut dec = Cea708Decoder::default();
        let mut sink = CollectingSink::new();
        feed(&mut dec, &mut sink, &build_packet(0, &cat(&[&DF0, b"A"])));
        // Service 0 with a non-zero block size.
        feed(&mut dec, &mut sink, &[0x43, 0x02, b'x', b'y', 0x00, 0x00]);
        assert!(!dec.service(1).unwrap().window(0).unwrap().is_defined());
    }

    #[test]
    fn test_service_filter() {
        let config = DecoderConfig::new().with_services(vec![2]);
        let mut dec = Cea708Decoder::new(&config);
        let mut sink = CollectingSink::new();
        feed(&mut dec, &mut sink, &build_packet(0, &cat(&[&DF0, b"A"])));
        assert!(dec.service(1).is_none());
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_reset() {
        let mut dec = Cea708Decoder::default();
        let mut sink = CollectingSink::new();
        feed(&mut dec, &mut sink, &build_packet(0, &cat(&[&DF0, b"A"])));
        dec.reset();
        assert!(dec.service(1).is_none());
        assert_eq!(dec.text(1), "");
        assert_eq!(dec.assembler().last_sequence(), None);
    }
}
