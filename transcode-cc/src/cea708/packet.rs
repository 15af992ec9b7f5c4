//! DTVCC packet reassembly and service block splitting.
//!
//! A packet starts with a header byte `[sequence:2 | size:6]` where the
//! packet size is `size * 2` bytes (`0` meaning 128), header included. The
//! payload is a run of service blocks, each introduced by
//! `[service:3 | block_size:5]`, with service 7 taking its real number from
//! the low 6 bits of the following byte.

use crate::error::{CaptionError, Result};

/// Largest DTVCC packet in bytes.
pub const MAX_PACKET_SIZE: usize = 128;

/// Service number that announces an extended header byte.
const EXTENDED_SERVICE: u8 = 7;

/// Declared size of a packet from its header byte.
pub fn declared_size(header: u8) -> usize {
    match header & 0x3F {
        0 => MAX_PACKET_SIZE,
        n => usize::from(n) * 2,
    }
}

/// Sequence counter of a packet header byte.
pub fn sequence_number(header: u8) -> u8 {
    header >> 6
}

/// Accumulates packet payload pairs until the declared size is reached.
#[derive(Debug, Clone, Default)]
pub struct PacketAssembler {
    buffer: Vec<u8>,
    declared: Option<usize>,
    last_sequence: Option<u8>,
}

impl PacketAssembler {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(MAX_PACKET_SIZE),
            declared: None,
            last_sequence: None,
        }
    }

    /// Whether a packet start has been seen and not yet completed.
    pub fn in_progress(&self) -> bool {
        self.declared.is_some()
    }

    /// Bytes accumulated for the current packet.
    pub fn accumulated(&self) -> usize {
        self.buffer.len()
    }

    /// Sequence number of the last completed packet.
    pub fn last_sequence(&self) -> Option<u8> {
        self.last_sequence
    }

    /// Begin a new packet with its first payload pair.
    ///
    /// The new packet is always started. If a previous packet was still short
    /// of its declared size it is discarded and reported as a length mismatch.
    pub fn start(&mut self, payload: [u8; 2]) -> Result<()> {
        let discarded = self.declared.map(|declared| CaptionError::PacketLengthMismatch {
            declared,
            actual: self.buffer.len(),
        });
        self.buffer.clear();
        self.buffer.extend_from_slice(&payload);
        self.declared = Some(declared_size(payload[0]));
        match discarded {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Append a continuation pair. Returns `false` if no packet is in progress.
    pub fn extend(&mut self, payload: [u8; 2]) -> bool {
        if self.declared.is_none() {
            return false;
        }
        self.buffer.extend_from_slice(&payload);
        true
    }

    /// Hand off the packet once it has reached its declared size.
    pub fn take_complete(&mut self) -> Option<Vec<u8>> {
        let declared = self.declared?;
        if self.buffer.len() < declared {
            return None;
        }
        self.declared = None;
        let mut packet = std::mem::take(&mut self.buffer);
        packet.truncate(declared);
        self.buffer.reserve(MAX_PACKET_SIZE);
        Some(packet)
    }

    /// Record the sequence number of a completed packet.
    ///
    /// The first packet is always accepted; afterwards each packet must carry
    /// the previous number plus one, modulo 4.
    pub fn check_sequence(&mut self, header: u8) -> Result<()> {
        let got = sequence_number(header);
        let previous = self.last_sequence.replace(got);
        match previous {
            Some(last) if (last + 1) % 4 != got => Err(CaptionError::SequenceDiscontinuity {
                expected: (last + 1) % 4,
                got,
            }),
            _ => Ok(()),
        }
    }

    /// Drop any partial packet and forget the sequence counter.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.declared = None;
        self.last_sequence = None;
    }
}

/// One service block inside a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceBlock<'a> {
    pub service: u8,
    pub data: &'a [u8],
}

/// Iterator over the service blocks of a complete packet.
///
/// Yields one error for a malformed header and then stops.
#[derive(Debug, Clone)]
pub struct ServiceBlocks<'a> {
    packet: &'a [u8],
    pos: usize,
}

impl<'a> ServiceBlocks<'a> {
    /// Walk the blocks following the packet header byte.
    pub fn new(packet: &'a [u8]) -> Self {
        Self {
            packet,
            pos: packet.len().min(1),
        }
    }

    fn next_block(&mut self) -> Result<Option<ServiceBlock<'a>>> {
        loop {
            let Some(&header) = self.packet.get(self.pos) else {
                return Ok(None);
            };
            self.pos += 1;

            let mut service = header >> 5;
            let length = usize::from(header & 0x1F);

            if service == 0 {
                if length != 0 {
                    return Err(CaptionError::malformed(format!(
                        "null service with block size {length}"
                    )));
                }
                // Null block header: padding until the end of the packet.
                return Ok(None);
            }

            if service == EXTENDED_SERVICE {
                let Some(&extended) = self.packet.get(self.pos) else {
                    return Err(CaptionError::malformed("missing extended service number"));
                };
                self.pos += 1;
                service = extended & 0x3F;
                if service < EXTENDED_SERVICE {
                    return Err(CaptionError::malformed(format!(
                        "extended service number {service} below 7"
                    )));
                }
            }

            let end = self.pos + length;
            if end > self.packet.len() {
                return Err(CaptionError::malformed(format!(
                    "service {service} block of {length} bytes overruns packet"
                )));
            }
            let data = &self.packet[self.pos..end];
            self.pos = end;

            if !data.is_empty() {
                return Ok(Some(ServiceBlock { service, data }));
            }
        }
    }
}

impl<'a> Iterator for ServiceBlocks<'a> {
    type Item = Result<ServiceBlock<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_block() {
            Ok(block) => block.map(Ok),
            Err(err) => {
                self.pos = self.packet.len();
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_size() {
        assert_eq!(declared_size(0x00), 128);
        assert_eq!(declared_size(0x01), 2);
        assert_eq!(declared_size(0xC3), 6);
        assert_eq!(sequence_number(0xC3), 3);
    }

    #[test]
    fn test_reassembly() {
        let mut asm = PacketAssembler::new();
        asm.start([0x02, 0x21]).unwrap();
        assert!(asm.take_complete().is_none());
        assert!(asm.extend([0x41, 0x00]));
        let packet = asm.take_complete().unwrap();
        assert_eq!(packet, vec![0x02, 0x21, 0x41, 0x00]);
        assert!(!asm.in_progress());
        assert!(asm.take_complete().is_none());
    }

    #[test]
    fn test_data_without_start_is_rejected() {
        let mut asm = PacketAssembler::new();
        assert!(!asm.extend([0x01, 0x02]));
        assert_eq!(asm.accumulated(), 0);
    }

    #[test]
    fn test_restart_reports_mismatch() {
        let mut asm = PacketAssembler::new();
        asm.start([0x03, 0x21]).unwrap();
        let err = asm.start([0x41, 0x00]).unwrap_err();
        assert_eq!(
            err,
            CaptionError::PacketLengthMismatch {
                declared: 6,
                actual: 2
            }
        );
        // The new packet replaced the partial one.
        assert_eq!(asm.take_complete(), Some(vec![0x41, 0x00]));
    }

    #[test]
    fn test_sequence() {
        let mut asm = PacketAssembler::new();
        assert!(asm.check_sequence(0x80).is_ok());
        assert!(asm.check_sequence(0xC0).is_ok());
        assert!(asm.check_sequence(0x00).is_ok());
        assert_eq!(
            asm.check_sequence(0x80).unwrap_err(),
            CaptionError::SequenceDiscontinuity {
                expected: 1,
                got: 2
            }
        );
        assert_eq!(asm.last_sequence(), Some(2));
        assert!(asm.check_sequence(0xC0).is_ok());
    }

    #[test]
    fn test_split_blocks() {
        let packet = [0x04, 0x22, b'H', b'I', 0x41, b'X', 0x00, 0x00];
        let blocks: Vec<_> = ServiceBlocks::new(&packet).collect::<Result<_>>().unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], ServiceBlock { service: 1, data: b"HI" });
        assert_eq!(blocks[1], ServiceBlock { service: 2, data: b"X" });
    }

    #[test]
    fn test_extended_service() {
        let packet = [0x03, 0xE1, 0x0A, b'Z', 0x00];
        let blocks: Vec<_> = ServiceBlocks::new(&packet).collect::<Result<_>>().unwrap();
        assert_eq!(blocks, vec![ServiceBlock { service: 10, data: b"Z" }]);

        let packet = [0x02, 0xE1, 0x03, b'Z'];
        let mut blocks = ServiceBlocks::new(&packet);
        assert!(matches!(
            blocks.next(),
            Some(Err(CaptionError::MalformedServiceBlock(_)))
        ));
        assert!(blocks.next().is_none());
    }

    #[test]
    fn test_malformed_blocks() {
        let null_with_length = [0x02, 0x02, 0x00, 0x00];
        assert!(ServiceBlocks::new(&null_with_length).next().unwrap().is_err());

        let overrun = [0x02, 0x25, b'A', b'B'];
        assert!(ServiceBlocks::new(&overrun).next().unwrap().is_err());
    }
}
