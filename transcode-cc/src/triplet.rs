//! Caption byte-triplet extraction.
//!
//! The user data of each video frame carries `cc_count` triplets of the form
//! `[marker:5 | cc_valid:1 | cc_type:2] [cc_data_1] [cc_data_2]`.

/// Size of one caption triplet in bytes.
pub const TRIPLET_SIZE: usize = 3;

/// The 2-bit `cc_type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CcType {
    /// Line-21 field 1 byte pair.
    Field1,
    /// Line-21 field 2 byte pair.
    Field2,
    /// DTVCC packet continuation.
    DtvccData,
    /// DTVCC packet start.
    DtvccStart,
}

impl CcType {
    /// Parse from the low two bits of a triplet header byte.
    pub fn from_bits(value: u8) -> Self {
        match value & 0x03 {
            0 => CcType::Field1,
            1 => CcType::Field2,
            2 => CcType::DtvccData,
            _ => CcType::DtvccStart,
        }
    }
}

/// One classified caption unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptionTriplet {
    pub cc_type: CcType,
    pub valid: bool,
    pub byte1: u8,
    pub byte2: u8,
}

impl CaptionTriplet {
    /// Classify a 3-byte unit.
    pub fn parse(bytes: [u8; TRIPLET_SIZE]) -> Self {
        Self {
            cc_type: CcType::from_bits(bytes[0]),
            valid: bytes[0] & 0x04 != 0,
            byte1: bytes[1],
            byte2: bytes[2],
        }
    }

    /// The two payload bytes.
    pub fn payload(&self) -> [u8; 2] {
        [self.byte1, self.byte2]
    }
}

/// Iterate over the complete triplets of a buffer; a trailing partial triplet is ignored.
pub fn triplets(data: &[u8]) -> impl Iterator<Item = CaptionTriplet> + '_ {
    data.chunks_exact(TRIPLET_SIZE)
        .map(|chunk| CaptionTriplet::parse([chunk[0], chunk[1], chunk[2]]))
}
