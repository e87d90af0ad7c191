/// Counters collected over one encode or decode pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodecStats {
    /// Bytes consumed (raw bytes when encoding, compressed bytes when decoding)
    pub input_bytes: u64,
    /// Bytes produced
    pub output_bytes: u64,
    /// Data codes sent or received
    pub data_codes: u64,
    /// ESCAPE signals
    pub escapes: u64,
    /// PRUNE signals
    pub prunes: u64,
    /// INCR_NBITS signals
    pub width_increments: u64,
    /// Code width at the end of the pass
    pub final_width: u8,
}

impl CodecStats {
    /// Returns output size as a percentage of input size.
    pub fn compression_ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            0.0
        } else {
            (self.output_bytes as f64 / self.input_bytes as f64) * 100.0
        }
    }
}
