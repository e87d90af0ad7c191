//! Bit-level transport for variable-width codes.
//!
//! [`BitWriter`] and [`BitReader`] pack unsigned integers of 1 to 32 bits
//! MSB-first over a byte stream. Each is an owned object wrapping one
//! `Write`/`Read`, so independent streams never share buffer state.
//!
//! # Padding Rules
//! - `BitWriter`: the final partial byte is padded with zero bits.
//! - `BitReader`: reports end of stream only when a request cannot be
//!   satisfied after the underlying source is exhausted. Padding bits are
//!   returned like any other bits; callers decide what they mean.
//!
//! # Example
//! ```
//! use lzw_rs::bitio::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new(Vec::new());
//! writer.write_bits(0b101, 3).unwrap();
//! writer.write_bits(0b11, 2).unwrap();
//! let bytes = writer.finish().unwrap();
//! assert_eq!(bytes, vec![0b1011_1000]);
//!
//! let mut reader = BitReader::new(&bytes[..]);
//! assert_eq!(reader.read_bits(3).unwrap(), Some(0b101));
//! assert_eq!(reader.read_bits(2).unwrap(), Some(0b11));
//! assert_eq!(reader.read_bits(8).unwrap(), None);
//! ```

use crate::error::Result;
use std::io::{Bytes, Read, Write};

/// Largest width accepted by a single read or write.
pub const MAX_WIDTH: u8 = 32;

#[inline]
fn low_bits(width: u8) -> u64 {
    (1u64 << width) - 1
}

/// Writes codes MSB-first to an underlying writer.
///
/// # Invariants
/// - `pending < 8` between calls
/// - only the low `pending` bits of `buffer` are set
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    inner: W,
    buffer: u64,
    pending: u8,
    bytes_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Wraps a writer. Wrap files and sockets in a `BufWriter` first; output
    /// is produced a few bytes at a time.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: 0,
            pending: 0,
            bytes_written: 0,
        }
    }

    /// Appends the low `width` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u32, width: u8) -> Result<()> {
        debug_assert!(
            (1..=MAX_WIDTH).contains(&width),
            "bit width {} out of range",
            width
        );

        self.buffer = (self.buffer << width) | (u64::from(value) & low_bits(width));
        self.pending += width;

        let mut out = [0u8; 5];
        let mut len = 0;
        while self.pending >= 8 {
            self.pending -= 8;
            out[len] = (self.buffer >> self.pending) as u8;
            len += 1;
        }
        self.buffer &= low_bits(self.pending);

        if len > 0 {
            self.inner.write_all(&out[..len])?;
            self.bytes_written += len as u64;
        }
        Ok(())
    }

    /// Pads any partial trailing byte with zero bits and writes it out.
    pub fn flush(&mut self) -> Result<()> {
        if self.pending > 0 {
            let byte = (self.buffer << (8 - self.pending)) as u8;
            self.inner.write_all(&[byte])?;
            self.bytes_written += 1;
            self.buffer = 0;
            self.pending = 0;
        }
        self.inner.flush()?;
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.inner)
    }

    /// Number of complete bytes handed to the underlying writer.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

/// Reads codes MSB-first from an underlying reader.
///
/// # Invariants
/// - only the low `available` bits of `buffer` are set
#[derive(Debug)]
pub struct BitReader<R: Read> {
    bytes: Bytes<R>,
    buffer: u64,
    available: u8,
    bytes_read: u64,
}

impl<R: Read> BitReader<R> {
    /// Wraps a reader. The source is consumed one byte at a time, so wrap
    /// files and sockets in a `BufReader` first.
    pub fn new(inner: R) -> Self {
        Self {
            bytes: inner.bytes(),
            buffer: 0,
            available: 0,
            bytes_read: 0,
        }
    }

    /// Consumes exactly `width` bits.
    ///
    /// Returns `Ok(None)` when the source is exhausted before `width` bits
    /// are available. Bits already buffered stay buffered.
    pub fn read_bits(&mut self, width: u8) -> Result<Option<u32>> {
        debug_assert!(
            (1..=MAX_WIDTH).contains(&width),
            "bit width {} out of range",
            width
        );

        while self.available < width {
            match self.bytes.next() {
                Some(byte) => {
                    self.buffer = (self.buffer << 8) | u64::from(byte?);
                    self.available += 8;
                    self.bytes_read += 1;
                }
                None => return Ok(None),
            }
        }

        self.available -= width;
        let value = (self.buffer >> self.available) & low_bits(width);
        self.buffer &= low_bits(self.available);
        Ok(Some(value as u32))
    }

    /// Number of bytes pulled from the underlying reader.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}
