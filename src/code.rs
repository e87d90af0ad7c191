/// A dictionary code as it travels through the compressed stream.
pub type Code = u32;

/// Number of reserved control codes at the bottom of the code space.
pub const NUM_SPECIALS: Code = 4;

/// Sentinel prefix terminating every prefix chain. Never sent as a body code.
pub const EMPTY: Code = 0;

/// Next field is a raw symbol of [`SYMBOL_BITS`] bits.
pub const ESCAPE: Code = 1;

/// Both sides replace their dictionary with a pruned generation.
pub const PRUNE: Code = 2;

/// Both sides widen the body code width by one bit.
pub const INCR_NBITS: Code = 3;

/// Width of a raw symbol following [`ESCAPE`].
pub const SYMBOL_BITS: u8 = 8;

/// Number of distinct symbols.
pub const ALPHABET_SIZE: usize = 1 << SYMBOL_BITS;

/// Header field widths, in transmission order.
pub const HEADER_MAX_CODE_BITS_WIDTH: u8 = 8;
pub const HEADER_WINDOW_WIDTH: u8 = 24;
pub const HEADER_ESCAPE_WIDTH: u8 = 1;

/// Smallest `n >= 1` such that `2^n >= value`.
///
/// This is the width the codec switches to after a prune, computed from the
/// number of live entries in the new generation.
pub fn bits_to_represent(value: usize) -> u8 {
    let mut bits = 1u8;
    while (1usize << bits) < value {
        bits += 1;
    }
    bits
}

/// Body code width at the start of a stream.
///
/// Escape mode only has to express the reserved codes; otherwise the 256
/// preloaded single-symbol codes must fit as well.
pub fn initial_width(escape: bool) -> u8 {
    if escape {
        3
    } else {
        SYMBOL_BITS + 1
    }
}
