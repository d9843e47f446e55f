//! Letter-space symbol encoding
//!
//! Bases are carried through the mapper as small integers. Only 0..=3 are
//! usable in k-mers; [`INVALID_SYMBOL`] marks an ambiguous or unrepresentable base.

/// Symbol produced for any base outside ACGT
pub const INVALID_SYMBOL: u8 = 4;

/// Largest symbol value the packed store can hold
pub const MAX_SYMBOL: u8 = 15;

/// Encode a nucleotide to its symbol value
pub fn encode_base(base: u8) -> u8 {
    match base.to_ascii_uppercase() {
        b'A' => 0,
        b'C' => 1,
        b'G' => 2,
        b'T' | b'U' => 3,
        _ => INVALID_SYMBOL,
    }
}

/// Decode a symbol back to a printable base
pub fn decode_symbol(symbol: u8) -> char {
    match symbol {
        0 => 'A',
        1 => 'C',
        2 => 'G',
        3 => 'T',
        INVALID_SYMBOL => 'N',
        _ => '?',
    }
}

/// Whether a symbol fits in a 2-bit k-mer slot
#[inline]
pub fn is_valid_kmer_symbol(symbol: u8) -> bool {
    symbol < INVALID_SYMBOL
}
