//! LZW encoder with dynamic code width, escape mode and windowed pruning.
//!
//! # Example
//!
//! ```
//! use lzw_rs::{decompress, Encoder, Options};
//!
//! let options = Options::default().with_window(64).unwrap();
//! let mut encoder = Encoder::new(options, Vec::new()).unwrap();
//! encoder.extend(b"abracadabra, abracadabra".iter().copied()).unwrap();
//! let compressed = encoder.finish().unwrap();
//!
//! assert_eq!(decompress(&compressed).unwrap(), b"abracadabra, abracadabra");
//! ```

use crate::bitio::BitWriter;
use crate::code::{
    bits_to_represent, initial_width, Code, EMPTY, ESCAPE, INCR_NBITS, PRUNE, SYMBOL_BITS,
};
use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::options::Options;
use crate::stats::CodecStats;
use log::{debug, trace};
use std::io::Write;

/// Outcome of one pass of the per-byte state machine.
enum Step {
    /// The byte is fully accounted for.
    Consumed,
    /// The byte must go through the state machine again with an empty prefix.
    Retry,
}

/// Streaming LZW encoder writing to `W`.
///
/// The header is written on construction; call [`finish`](Self::finish) to
/// emit the pending match and pad the last byte.
pub struct Encoder<W: Write> {
    writer: BitWriter<W>,
    options: Options,
    dictionary: Dictionary,
    /// Code of the longest match so far, or EMPTY
    prefix: Code,
    width: u8,
    /// Incremented once per transmitted data code
    timer: u64,
    stats: CodecStats,
}

impl<W: Write> Encoder<W> {
    /// Creates an encoder and writes the stream header.
    pub fn new(options: Options, writer: W) -> Result<Self> {
        let mut writer = BitWriter::new(writer);
        options.write_header(&mut writer)?;

        let width = initial_width(options.escape());
        Ok(Self {
            writer,
            options,
            dictionary: Dictionary::new(options.capacity(), options.escape()),
            prefix: EMPTY,
            width,
            timer: 1,
            stats: CodecStats {
                final_width: width,
                ..CodecStats::default()
            },
        })
    }

    /// Feeds one input byte.
    pub fn push(&mut self, byte: u8) -> Result<()> {
        self.stats.input_bytes += 1;
        loop {
            self.grow_width()?;
            match self.step(byte)? {
                Step::Consumed => return Ok(()),
                Step::Retry => continue,
            }
        }
    }

    /// Feeds every byte of `bytes`.
    pub fn extend<I: IntoIterator<Item = u8>>(&mut self, bytes: I) -> Result<()> {
        for byte in bytes {
            self.push(byte)?;
        }
        Ok(())
    }

    /// Emits the pending match, pads the final byte and returns the writer.
    pub fn finish(self) -> Result<W> {
        self.finish_with_stats().map(|(writer, _)| writer)
    }

    /// Like [`finish`](Self::finish), also returning the final counters.
    pub fn finish_with_stats(mut self) -> Result<(W, CodecStats)> {
        if self.prefix != EMPTY {
            self.send_data(self.prefix)?;
            self.prefix = EMPTY;
        }
        self.writer.flush()?;
        self.stats.output_bytes = self.writer.bytes_written();
        debug!("encoder finished: {:?}", self.stats);
        Ok((self.writer.finish()?, self.stats))
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Current body code width.
    pub fn width(&self) -> u8 {
        self.width
    }

    /// The live dictionary generation.
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Counters so far. `output_bytes` counts whole bytes written.
    pub fn stats(&self) -> CodecStats {
        CodecStats {
            output_bytes: self.writer.bytes_written(),
            ..self.stats
        }
    }

    /// Widens the code width once the next code to be assigned would no
    /// longer fit.
    fn grow_width(&mut self) -> Result<()> {
        if bits_to_represent(self.dictionary.len() + 1) > self.width
            && self.width < self.options.max_code_bits()
        {
            self.writer.write_bits(INCR_NBITS, self.width)?;
            self.width += 1;
            self.stats.width_increments += 1;
            self.stats.final_width = self.width;
            debug!("code width raised to {}", self.width);
        }
        Ok(())
    }

    fn step(&mut self, byte: u8) -> Result<Step> {
        if let Some(entry) = self.dictionary.lookup_extension(byte, self.prefix) {
            self.prefix = entry.code();
            return Ok(Step::Consumed);
        }

        if self.prefix == EMPTY {
            self.send_escape(byte)?;
            if !self.dictionary.is_full() {
                self.dictionary.insert(byte, EMPTY);
            } else if self.options.pruning_enabled() {
                self.prune()?;
            }
            return Ok(Step::Consumed);
        }

        let matched = self.prefix;
        self.send_data(matched)?;

        let Some(root) = self.dictionary.lookup_extension(byte, EMPTY).map(|e| e.code()) else {
            // the byte itself has never been seen: escape it next round
            self.prefix = EMPTY;
            return Ok(Step::Retry);
        };

        if !self.dictionary.is_full() {
            self.dictionary.insert(byte, matched);
            self.prefix = root;
        } else if self.options.pruning_enabled() {
            self.prune()?;
            match self.dictionary.lookup_extension(byte, EMPTY) {
                Some(entry) => self.prefix = entry.code(),
                None => {
                    self.prefix = EMPTY;
                    return Ok(Step::Retry);
                }
            }
        } else {
            self.prefix = root;
        }
        Ok(Step::Consumed)
    }

    fn send_data(&mut self, code: Code) -> Result<()> {
        self.writer.write_bits(code, self.width)?;
        self.dictionary.mark_used(code, self.timer);
        self.timer += 1;
        self.stats.data_codes += 1;
        Ok(())
    }

    fn send_escape(&mut self, byte: u8) -> Result<()> {
        self.writer.write_bits(ESCAPE, self.width)?;
        self.writer.write_bits(u32::from(byte), SYMBOL_BITS)?;
        self.stats.escapes += 1;
        trace!("escaped symbol {:#04x}", byte);
        Ok(())
    }

    fn prune(&mut self) -> Result<()> {
        self.dictionary = self.dictionary.prune(self.options.window(), self.timer);
        self.writer.write_bits(PRUNE, self.width)?;
        self.width = bits_to_represent(self.dictionary.len());
        self.stats.prunes += 1;
        self.stats.final_width = self.width;
        Ok(())
    }
}

/// Compresses a complete buffer.
pub fn compress(input: &[u8], options: Options) -> Result<Vec<u8>> {
    let mut encoder = Encoder::new(options, Vec::new())?;
    encoder.extend(input.iter().copied())?;
    encoder.finish()
}
