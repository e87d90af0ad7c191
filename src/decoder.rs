//! LZW decoder, the mirror image of [`Encoder`](crate::Encoder).
//!
//! The decoder rebuilds the encoder's dictionary from the codes alone. It
//! learns each entry one code late, which is why a code may arrive that is
//! not in the table yet (the KwKwK case): it can only be the string just
//! decoded followed by its own first symbol.

use crate::bitio::BitReader;
use crate::code::{
    bits_to_represent, initial_width, Code, EMPTY, ESCAPE, INCR_NBITS, PRUNE, SYMBOL_BITS,
};
use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::stats::CodecStats;
use log::{debug, trace};
use std::io::{Read, Write};

/// Streaming LZW decoder reading from `R`.
pub struct Decoder<R: Read> {
    reader: BitReader<R>,
    options: Options,
    dictionary: Dictionary,
    width: u8,
    /// Last data code decoded since the most recent escape, or EMPTY
    previous: Code,
    /// First symbol of the most recent output string
    first_symbol: u8,
    /// The next data code must not add an entry
    just_pruned: bool,
    /// Incremented once per received data code
    timer: u64,
    /// Symbols of the current string, leaf first
    pending: Vec<u8>,
    /// The current string in output order
    output: Vec<u8>,
    finished: bool,
    stats: CodecStats,
}

impl<R: Read> Decoder<R> {
    /// Reads and validates the stream header.
    pub fn new(reader: R) -> Result<Self> {
        let mut reader = BitReader::new(reader);
        let options = Options::read_header(&mut reader)?;
        let width = initial_width(options.escape());
        debug!("decoding stream with {:?}", options);

        Ok(Self {
            reader,
            options,
            dictionary: Dictionary::new(options.capacity(), options.escape()),
            width,
            previous: EMPTY,
            first_symbol: 0,
            just_pruned: false,
            timer: 1,
            pending: Vec::new(),
            output: Vec::new(),
            finished: false,
            stats: CodecStats {
                final_width: width,
                ..CodecStats::default()
            },
        })
    }

    /// Options recovered from the header.
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

    /// Counters so far. `input_bytes` counts whole bytes read.
    pub fn stats(&self) -> CodecStats {
        CodecStats {
            input_bytes: self.reader.bytes_read(),
            ..self.stats
        }
    }

    /// Decodes up to the next escape or data code and returns the bytes it
    /// stands for, or `None` at end of stream.
    pub fn next_string(&mut self) -> Result<Option<&[u8]>> {
        loop {
            if self.finished {
                return Ok(None);
            }

            let Some(code) = self.reader.read_bits(self.width)? else {
                self.finished = true;
                continue;
            };

            match code {
                // never sent by the encoder: the rest is padding
                EMPTY => self.finished = true,
                INCR_NBITS => self.grow_width()?,
                PRUNE => self.prune(),
                ESCAPE => {
                    self.escape()?;
                    return Ok(Some(self.output.as_slice()));
                }
                code => {
                    self.expand(code)?;
                    return Ok(Some(self.output.as_slice()));
                }
            }
        }
    }

    /// Decodes the rest of the stream into `out`.
    pub fn decode_into<W: Write>(mut self, out: &mut W) -> Result<CodecStats> {
        while let Some(bytes) = self.next_string()? {
            out.write_all(bytes)?;
        }
        out.flush()?;
        self.stats.input_bytes = self.reader.bytes_read();
        debug!("decoder finished: {:?}", self.stats);
        Ok(self.stats)
    }

    fn grow_width(&mut self) -> Result<()> {
        if self.width >= self.options.max_code_bits() {
            return Err(Error::WidthOverflow {
                width: self.width + 1,
                max: self.options.max_code_bits(),
            });
        }
        self.width += 1;
        self.stats.width_increments += 1;
        self.stats.final_width = self.width;
        debug!("code width raised to {}", self.width);
        Ok(())
    }

    fn prune(&mut self) {
        self.dictionary = self.dictionary.prune(self.options.window(), self.timer);
        self.width = bits_to_represent(self.dictionary.len());
        self.just_pruned = true;
        self.stats.prunes += 1;
        self.stats.final_width = self.width;
    }

    fn escape(&mut self) -> Result<()> {
        let symbol = self
            .reader
            .read_bits(SYMBOL_BITS)?
            .ok_or(Error::TruncatedEscape)? as u8;
        trace!("escaped symbol {:#04x}", symbol);

        self.output.clear();
        self.output.push(symbol);
        self.first_symbol = symbol;
        if !self.dictionary.is_full() {
            self.dictionary.insert(symbol, EMPTY);
        }
        self.previous = EMPTY;

        self.stats.escapes += 1;
        self.stats.output_bytes += 1;
        Ok(())
    }

    /// Rebuilds the string for a data code into `output` and learns the
    /// entry the encoder added when it sent the previous code.
    fn expand(&mut self, code: Code) -> Result<()> {
        let will_insert =
            self.previous != EMPTY && !self.dictionary.is_full() && !self.just_pruned;

        self.pending.clear();
        let start = if self.dictionary.lookup_code(code).is_some() {
            code
        } else if will_insert && code as usize == self.dictionary.len() {
            // KwKwK: previous string plus its own first symbol
            self.pending.push(self.first_symbol);
            self.previous
        } else {
            return Err(Error::UnresolvableCode {
                code,
                previous: self.previous,
            });
        };

        let mut root = None;
        for entry in self.dictionary.chain(start) {
            if entry.prefix() == EMPTY {
                root = Some(entry.symbol());
            } else {
                self.pending.push(entry.symbol());
            }
        }
        let Some(root) = root else {
            return Err(Error::UnresolvableCode {
                code,
                previous: self.previous,
            });
        };

        self.output.clear();
        self.output.push(root);
        self.output.extend(self.pending.drain(..).rev());
        self.first_symbol = root;

        if will_insert {
            self.dictionary.insert(root, self.previous);
        }
        self.dictionary.mark_used(code, self.timer);
        self.timer += 1;
        self.previous = code;
        self.just_pruned = false;

        self.stats.data_codes += 1;
        self.stats.output_bytes += self.output.len() as u64;
        Ok(())
    }
}

/// Decompresses a complete buffer.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    Decoder::new(input)?.decode_into(&mut output)?;
    Ok(output)
}
