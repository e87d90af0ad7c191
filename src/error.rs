//! Error types for the codec.
//!
//! Every public operation returns [`Result`]; nothing in the library exits the
//! process. Capacity exhaustion is not an error: a full table simply stops
//! growing.

use crate::code::Code;
use thiserror::Error;

/// Top-level error type for encoding and decoding.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading the input or writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested maximum code width outside `(8, 24]`.
    #[error("max code bits {0} outside 9..=24")]
    InvalidMaxCodeBits(u32),

    /// Header carries a maximum code width outside `(8, 24]`.
    #[error("input file corrupted: header max code bits {max_code_bits} outside 9..=24")]
    InvalidHeader { max_code_bits: u32 },

    /// Window does not fit the 24-bit header field.
    #[error("window {0} does not fit in 24 bits")]
    WindowTooLarge(u32),

    /// Stream ended before the three header fields were read.
    #[error("input file corrupted: truncated header")]
    TruncatedHeader,

    /// Stream ended between an ESCAPE code and its raw symbol.
    #[error("input file corrupted: escape code without a symbol")]
    TruncatedEscape,

    /// A data code that is neither in the table nor the KwKwK successor of
    /// the previous code.
    #[error("input file corrupted: unresolvable code {code} (previous code {previous})")]
    UnresolvableCode { code: Code, previous: Code },

    /// INCR_NBITS would take the code width past the maximum.
    #[error("input file corrupted: code width {width} exceeds maximum {max}")]
    WidthOverflow { width: u8, max: u8 },
}

impl Error {
    /// Returns true if the error means the compressed stream is malformed,
    /// as opposed to an I/O or configuration failure.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::InvalidHeader { .. }
                | Error::TruncatedHeader
                | Error::TruncatedEscape
                | Error::UnresolvableCode { .. }
                | Error::WidthOverflow { .. }
        )
    }
}

/// Convenience type alias for Results with our Error type.
pub type Result<T> = std::result::Result<T, Error>;
