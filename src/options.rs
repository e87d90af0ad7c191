//! Per-run codec parameters and their in-stream header.
//!
//! The encoder writes the options at the head of the compressed stream, so
//! the decoder rebuilds identical dictionary behavior without any
//! out-of-band configuration.

use crate::bitio::{BitReader, BitWriter};
use crate::code::{HEADER_ESCAPE_WIDTH, HEADER_MAX_CODE_BITS_WIDTH, HEADER_WINDOW_WIDTH};
use crate::error::{Error, Result};
use std::io::{Read, Write};

/// Smallest accepted maximum code width.
pub const MIN_CODE_BITS: u8 = 9;

/// Largest accepted maximum code width.
pub const MAX_CODE_BITS: u8 = 24;

/// Maximum code width used when none is requested.
pub const DEFAULT_MAX_CODE_BITS: u8 = 12;

/// Largest window the header can carry.
pub const MAX_WINDOW: u32 = (1 << HEADER_WINDOW_WIDTH) - 1;

/// Codec parameters chosen once per stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    max_code_bits: u8,
    window: u32,
    escape: bool,
}

impl Options {
    /// Sets the maximum code width, which fixes the dictionary capacity at
    /// `2^max_code_bits` entries.
    pub fn with_max_code_bits(mut self, max_code_bits: u32) -> Result<Self> {
        if !(u32::from(MIN_CODE_BITS)..=u32::from(MAX_CODE_BITS)).contains(&max_code_bits) {
            return Err(Error::InvalidMaxCodeBits(max_code_bits));
        }
        self.max_code_bits = max_code_bits as u8;
        Ok(self)
    }

    /// Sets the pruning window in transmitted-code ticks. Zero disables pruning.
    pub fn with_window(mut self, window: u32) -> Result<Self> {
        if window > MAX_WINDOW {
            return Err(Error::WindowTooLarge(window));
        }
        self.window = window;
        Ok(self)
    }

    /// Starts the dictionary without single-symbol entries.
    pub fn with_escape(mut self, escape: bool) -> Self {
        self.escape = escape;
        self
    }

    pub fn max_code_bits(&self) -> u8 {
        self.max_code_bits
    }

    pub fn window(&self) -> u32 {
        self.window
    }

    pub fn escape(&self) -> bool {
        self.escape
    }

    pub fn pruning_enabled(&self) -> bool {
        self.window > 0
    }

    /// Number of codes, reserved ones included, a dictionary may hold.
    pub fn capacity(&self) -> usize {
        1 << self.max_code_bits
    }

    /// Writes the three header fields at their fixed widths.
    pub(crate) fn write_header<W: Write>(&self, writer: &mut BitWriter<W>) -> Result<()> {
        writer.write_bits(u32::from(self.max_code_bits), HEADER_MAX_CODE_BITS_WIDTH)?;
        writer.write_bits(self.window, HEADER_WINDOW_WIDTH)?;
        writer.write_bits(u32::from(self.escape), HEADER_ESCAPE_WIDTH)?;
        Ok(())
    }

    /// Reads and validates the header written by [`Options::write_header`].
    pub(crate) fn read_header<R: Read>(reader: &mut BitReader<R>) -> Result<Self> {
        let max_code_bits = reader
            .read_bits(HEADER_MAX_CODE_BITS_WIDTH)?
            .ok_or(Error::TruncatedHeader)?;
        let window = reader
            .read_bits(HEADER_WINDOW_WIDTH)?
            .ok_or(Error::TruncatedHeader)?;
        let escape = reader
            .read_bits(HEADER_ESCAPE_WIDTH)?
            .ok_or(Error::TruncatedHeader)?;

        let options = Options::default()
            .with_max_code_bits(max_code_bits)
            .map_err(|_| Error::InvalidHeader { max_code_bits })?
            .with_window(window)?
            .with_escape(escape == 1);
        Ok(options)
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_code_bits: DEFAULT_MAX_CODE_BITS,
            window: 0,
            escape: false,
        }
    }
}
