//! Bit-packed symbol store
//!
//! Symbols (0..=15) are stored four bits apiece, eight to a `u32` word, with
//! the first symbol in the least significant nibble. The same store backs the
//! genome and every read.

use crate::alphabet::MAX_SYMBOL;

const BITS_PER_SYMBOL: usize = 4;
const SYMBOLS_PER_WORD: usize = 32 / BITS_PER_SYMBOL;
const SYMBOL_MASK: u32 = (1 << BITS_PER_SYMBOL) - 1;

/// Past this many packed bytes, growth slows from 2x to 4/3x
const SLOW_GROWTH_BYTES: usize = 64 * 1024 * 1024;

#[inline]
fn words_for(symbols: usize) -> usize {
    (symbols + SYMBOLS_PER_WORD - 1) / SYMBOLS_PER_WORD
}

/// Extract the symbol at `pos` from a packed word buffer.
///
/// No bounds checking beyond the slice index: callers guarantee `pos` lies
/// inside the logical sequence.
#[inline]
pub fn extract(words: &[u32], pos: usize) -> u8 {
    let shift = (pos % SYMBOLS_PER_WORD) * BITS_PER_SYMBOL;
    ((words[pos / SYMBOLS_PER_WORD] >> shift) & SYMBOL_MASK) as u8
}

/// Growable packed sequence of small-integer symbols
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedSeq {
    words: Vec<u32>,
    len: usize,
    /// Logical capacity in symbols; always a whole number of words
    capacity: usize,
}

impl PackedSeq {
    /// Start with one word's worth of room
    pub fn new() -> Self {
        Self::with_capacity(SYMBOLS_PER_WORD)
    }

    /// Pre-size for `symbols` symbols (rounded up to whole words)
    pub fn with_capacity(symbols: usize) -> Self {
        let words = words_for(symbols.max(1));
        Self {
            words: vec![0; words],
            len: 0,
            capacity: words * SYMBOLS_PER_WORD,
        }
    }

    pub fn from_symbols<I: IntoIterator<Item = u8>>(symbols: I) -> Self {
        let mut seq = Self::new();
        for symbol in symbols {
            seq.push(symbol);
        }
        seq
    }

    /// Append one symbol
    pub fn push(&mut self, symbol: u8) {
        debug_assert!(symbol <= MAX_SYMBOL, "symbol {} out of range", symbol);

        if self.len == self.capacity {
            self.grow();
        }

        let word = &mut self.words[self.len / SYMBOLS_PER_WORD];
        let shift = (self.len % SYMBOLS_PER_WORD) * BITS_PER_SYMBOL;
        *word &= !(SYMBOL_MASK << shift);
        *word |= (symbol as u32 & SYMBOL_MASK) << shift;
        self.len += 1;
    }

    fn grow(&mut self) {
        let bytes = self.words.len() * std::mem::size_of::<u32>();
        let target = if bytes > SLOW_GROWTH_BYTES {
            self.capacity * 4 / 3
        } else {
            self.capacity * 2
        };

        let words = words_for(target.max(self.capacity + 1));
        self.words.resize(words, 0);
        self.capacity = words * SYMBOLS_PER_WORD;
    }

    /// Symbol at `pos`; panics when `pos >= len`
    #[inline]
    pub fn get(&self, pos: usize) -> u8 {
        assert!(
            pos < self.len,
            "position {} out of range for sequence of length {}",
            pos,
            self.len
        );
        extract(&self.words, pos)
    }

    #[inline]
    pub fn try_get(&self, pos: usize) -> Option<u8> {
        if pos < self.len {
            Some(extract(&self.words, pos))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Raw packed words (the tail of the last word is zero)
    pub fn words(&self) -> &[u32] {
        &self.words[..words_for(self.len)]
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.len).map(move |pos| extract(&self.words, pos))
    }

    /// Expand `[offset, offset + len)` into one symbol per byte, replacing `out`
    pub fn unpack_range(&self, offset: usize, len: usize, out: &mut Vec<u8>) {
        let end = offset + len;
        assert!(
            end <= self.len,
            "range {}..{} out of range for sequence of length {}",
            offset,
            end,
            self.len
        );

        out.clear();
        out.extend((offset..end).map(|pos| extract(&self.words, pos)));
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.iter().collect()
    }
}

impl Default for PackedSeq {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn roundtrip(symbols: &[u8]) {
        let seq = PackedSeq::from_symbols(symbols.iter().copied());
        assert_eq!(seq.len(), symbols.len());
        for (pos, &symbol) in symbols.iter().enumerate() {
            assert_eq!(seq.get(pos), symbol, "mismatch at {}", pos);
        }
        assert_eq!(seq.to_vec(), symbols);
    }

    #[test]
    fn test_roundtrip_edge_lengths() {
        roundtrip(&[]);
        roundtrip(&[7]);
        roundtrip(&[0, 1, 2, 3, 4, 5, 6, 15]);
        let several: Vec<u8> = (0..43).map(|i| (i * 7 % 16) as u8).collect();
        roundtrip(&several);
    }

    #[test]
    fn test_empty_sequence() {
        let seq = PackedSeq::new();
        assert!(seq.is_empty());
        assert_eq!(seq.try_get(0), None);
        assert!(seq.words().is_empty());
    }

    #[test]
    fn test_growth_doubles_while_small() {
        let mut seq = PackedSeq::new();
        assert_eq!(seq.capacity(), 8);
        for i in 0..9 {
            seq.push(i % 4);
        }
        assert_eq!(seq.capacity(), 16);
        for i in 0..8 {
            seq.push(i % 4);
        }
        assert_eq!(seq.capacity(), 32);
    }

    #[test]
    fn test_with_capacity_rounds_to_words() {
        let seq = PackedSeq::with_capacity(13);
        assert_eq!(seq.capacity(), 16);
        assert_eq!(PackedSeq::with_capacity(0).capacity(), 8);
    }

    #[test]
    fn test_unpack_range() {
        let seq = PackedSeq::from_symbols([0, 1, 2, 3, 4, 3, 2, 1, 0, 1]);
        let mut out = vec![9; 3];
        seq.unpack_range(3, 5, &mut out);
        assert_eq!(out, vec![3, 4, 3, 2, 1]);
        seq.unpack_range(10, 0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_get_out_of_range_panics() {
        let seq = PackedSeq::from_symbols([1, 2]);
        seq.get(2);
    }

    #[test]
    fn test_extract_matches_get() {
        let seq = PackedSeq::from_symbols([3, 1, 4, 1, 5, 9, 2, 6, 5, 3]);
        for pos in 0..seq.len() {
            assert_eq!(extract(seq.words(), pos), seq.get(pos));
        }
    }

    proptest! {
        #[test]
        fn prop_roundtrip(symbols in proptest::collection::vec(0u8..=15, 0..200)) {
            let seq = PackedSeq::from_symbols(symbols.iter().copied());
            prop_assert_eq!(seq.to_vec(), symbols);
        }
    }
}
