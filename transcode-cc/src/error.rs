//! Error types for closed caption decoding.
//!
//! Most malformed input is handled inside the decoders (dropped, skipped or
//! answered with a state reset). The variants here describe why that happened
//! and are what the internal stages hand back to the front-ends.

use thiserror::Error;

/// Errors from caption decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptionError {
    /// Storage for a window's character grid could not be allocated.
    #[error("window {window}: failed to allocate {cells} cells")]
    WindowAllocation { window: u8, cells: usize },

    /// A service block header inside a DTVCC packet is malformed.
    #[error("malformed service block: {0}")]
    MalformedServiceBlock(String),

    /// The DTVCC packet sequence counter skipped or repeated a value.
    #[error("packet sequence discontinuity: expected {expected}, got {got}")]
    SequenceDiscontinuity { expected: u8, got: u8 },

    /// A new packet started before the previous one reached its declared size.
    #[error("packet length mismatch: declared {declared} bytes, accumulated {actual}")]
    PacketLengthMismatch { declared: usize, actual: usize },

    /// A command whose length cannot be determined (C3 variable-length codes).
    #[error("unsupported command 0x{0:02X}")]
    UnsupportedCommand(u8),

    /// A command ran past the end of its service block.
    #[error("command 0x{code:02X} needs {needed} bytes, {available} available")]
    TruncatedCommand {
        code: u8,
        needed: usize,
        available: usize,
    },
}

/// Result type for caption operations.
pub type Result<T> = std::result::Result<T, CaptionError>;

impl CaptionError {
    /// Create a malformed service block error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        CaptionError::MalformedServiceBlock(msg.into())
    }

    /// Whether the decoder answers this error with a state reset.
    #[must_use]
    pub fn requires_reset(&self) -> bool {
        matches!(
            self,
            CaptionError::MalformedServiceBlock(_)
                | CaptionError::SequenceDiscontinuity { .. }
                | CaptionError::PacketLengthMismatch { .. }
        )
    }

    /// Whether decoding can continue with the next input buffer.
    ///
    /// Only a failed window allocation is surfaced to the host as fatal.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, CaptionError::WindowAllocation { .. })
    }
}
