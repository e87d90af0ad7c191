//! Command-line front end shared by the `encode` and `decode` binaries.
//!
//! Both filter standard input to standard output. Diagnostics and logs go to
//! standard error; set `RUST_LOG=debug` to trace prunes and width changes.

use crate::options::{Options, DEFAULT_MAX_CODE_BITS, MAX_CODE_BITS, MAX_WINDOW, MIN_CODE_BITS};
use crate::{CodecStats, Decoder, Encoder};
use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::io::{self, BufReader, BufWriter, Read, Write};

/// Which direction a binary runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encode,
    Decode,
}

/// Compress standard input to standard output.
#[derive(Debug, Parser)]
#[command(name = "encode", args_override_self = true, disable_help_flag = true)]
pub struct EncodeArgs {
    /// Maximum code width in bits; positive values outside 9..=24 fall back to 12
    #[arg(short = 'm', value_name = "MAXBITS", default_value_t = DEFAULT_MAX_CODE_BITS, value_parser = parse_max_bits)]
    pub max_bits: u8,

    /// Prune codes not sent within the last WINDOW codes once the table fills
    #[arg(short = 'p', value_name = "WINDOW", value_parser = parse_window)]
    pub window: Option<u32>,

    /// Start with an empty table and send each new byte value raw
    #[arg(short = 'e')]
    pub escape: bool,
}

impl EncodeArgs {
    pub fn options(&self) -> Result<Options> {
        let options = Options::default()
            .with_max_code_bits(u32::from(self.max_bits))?
            .with_window(self.window.unwrap_or(0))?
            .with_escape(self.escape);
        Ok(options)
    }
}

/// Decompress standard input to standard output.
#[derive(Debug, Parser)]
#[command(name = "decode", disable_help_flag = true)]
pub struct DecodeArgs {}

fn parse_max_bits(value: &str) -> std::result::Result<u8, String> {
    let bits: i64 = value
        .parse()
        .map_err(|_| "MAXBITS must be a positive integer".to_string())?;
    if bits <= 0 {
        return Err("MAXBITS must be a positive integer".to_string());
    }
    if (i64::from(MIN_CODE_BITS)..=i64::from(MAX_CODE_BITS)).contains(&bits) {
        Ok(bits as u8)
    } else {
        Ok(DEFAULT_MAX_CODE_BITS)
    }
}

fn parse_window(value: &str) -> std::result::Result<u32, String> {
    match value.parse::<u64>() {
        Ok(window) if window > 0 && window <= u64::from(MAX_WINDOW) => Ok(window as u32),
        Ok(window) if window > 0 => Err(format!("WINDOW must not exceed {}", MAX_WINDOW)),
        _ => Err("WINDOW must be a positive integer".to_string()),
    }
}

/// Parses arguments for `mode`, then filters stdin to stdout.
pub fn run(mode: Mode) -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    match mode {
        Mode::Encode => {
            let args = EncodeArgs::parse();
            let options = args.options()?;
            let stats = encode(options, stdin.lock(), stdout.lock())
                .context("failed to encode standard input")?;
            info!(
                "encoded {} bytes into {} ({:.2}%), {} prunes",
                stats.input_bytes,
                stats.output_bytes,
                stats.compression_ratio(),
                stats.prunes
            );
        }
        Mode::Decode => {
            DecodeArgs::parse();
            let stats = decode(stdin.lock(), stdout.lock())
                .context("failed to decode standard input")?;
            info!(
                "decoded {} bytes into {}, {} prunes",
                stats.input_bytes, stats.output_bytes, stats.prunes
            );
        }
    }
    Ok(())
}

/// Compresses all of `input` into `output`.
pub fn encode<R: Read, W: Write>(options: Options, input: R, output: W) -> Result<CodecStats> {
    let mut encoder = Encoder::new(options, BufWriter::new(output))?;
    for byte in BufReader::new(input).bytes() {
        encoder.push(byte?)?;
    }
    let (_, stats) = encoder.finish_with_stats()?;
    Ok(stats)
}

/// Decompresses all of `input` into `output`.
pub fn decode<R: Read, W: Write>(input: R, output: W) -> Result<CodecStats> {
    let decoder = Decoder::new(BufReader::new(input))?;
    let mut output = BufWriter::new(output);
    let stats = decoder.decode_into(&mut output)?;
    Ok(stats)
}
