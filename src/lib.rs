//! # LZW - Adaptive Dictionary Compression
//!
//! A Rust implementation of LZW with three extensions over the textbook
//! algorithm:
//! 1. **Dynamic code width**: codes start narrow and widen by one bit as the
//!    dictionary grows, signalled in-stream
//! 2. **Escape mode**: the dictionary may start empty; each new byte value is
//!    sent raw after an ESCAPE code
//! 3. **Windowed pruning**: when the dictionary fills, entries not sent within
//!    the last `window` codes are dropped and the survivors renumbered
//!
//! The decoder needs nothing but the compressed stream: the options travel in
//! a small header and both sides evolve identical dictionaries.
//!
//! ## Example
//!
//! ```
//! use lzw_rs::{compress, decompress, Options};
//!
//! let options = Options::default()
//!     .with_max_code_bits(10)
//!     .unwrap()
//!     .with_window(256)
//!     .unwrap()
//!     .with_escape(true);
//!
//! let input = b"to be or not to be, that is the question".repeat(20);
//! let compressed = compress(&input, options).unwrap();
//! assert!(compressed.len() < input.len());
//!
//! assert_eq!(decompress(&compressed).unwrap(), input);
//! ```
//!
//! ## Stream format
//!
//! - Header: max code bits (8 bits), window (24 bits), escape flag (1 bit)
//! - Body: codes at the current width; 1 = ESCAPE (followed by an 8-bit
//!   symbol), 2 = PRUNE, 3 = INCR_NBITS, 4 and up = data codes
//! - Zero padding to the next byte boundary

pub mod bitio;
pub mod cli;
pub mod code;
mod decoder;
mod dictionary;
mod encoder;
mod error;
mod options;
mod stats;

#[cfg(test)]
mod tests;

pub use decoder::{decompress, Decoder};
pub use dictionary::{Chain, Dictionary, Entry};
pub use encoder::{compress, Encoder};
pub use error::{Error, Result};
pub use options::{Options, DEFAULT_MAX_CODE_BITS, MAX_CODE_BITS, MAX_WINDOW, MIN_CODE_BITS};
pub use stats::CodecStats;
