//! Rolling 2-bit k-mer values
//!
//! Index building and the genome scan both feed symbols one at a time through
//! a [`KmerRoller`], so a k-mer value means the same thing on either side.

use crate::alphabet::is_valid_kmer_symbol;

/// Mask keeping the low `2k` bits
#[inline]
pub fn kmer_mask(k: u32) -> u32 {
    debug_assert!((1..=16).contains(&k));
    ((1u64 << (2 * k)) - 1) as u32
}

/// Number of distinct k-mer values for length `k`
#[inline]
pub fn kmer_space(k: u32) -> usize {
    1usize << (2 * k)
}

/// Rolling k-mer value over a symbol stream
#[derive(Debug, Clone)]
pub struct KmerRoller {
    k: u32,
    mask: u32,
    value: u32,
    filled: u32,
    skip: u32,
}

impl KmerRoller {
    pub fn new(k: u32) -> Self {
        Self {
            k,
            mask: kmer_mask(k),
            value: 0,
            filled: 0,
            skip: 0,
        }
    }

    /// Shift in `symbol`; returns the value of the k-mer ending here when the
    /// window is full and holds no invalid symbol.
    ///
    /// An invalid symbol suppresses the window it ends and the following
    /// `k - 1` windows, which are exactly the windows that contain it.
    #[inline]
    pub fn push(&mut self, symbol: u8) -> Option<u32> {
        self.value = ((self.value << 2) | (symbol as u32 & 0x3)) & self.mask;
        if self.filled < self.k {
            self.filled += 1;
        }

        if !is_valid_kmer_symbol(symbol) {
            self.skip = self.k;
        }

        if self.skip > 0 {
            self.skip -= 1;
            return None;
        }

        if self.filled < self.k {
            return None;
        }

        Some(self.value)
    }

    /// Forget all history (start of a new sequence)
    pub fn reset(&mut self) {
        self.value = 0;
        self.filled = 0;
        self.skip = 0;
    }

    pub fn k(&self) -> u32 {
        self.k
    }
}

/// All `(end_position, value)` pairs for a symbol slice
pub fn kmers_of(symbols: &[u8], k: u32) -> Vec<(usize, u32)> {
    let mut roller = KmerRoller::new(k);
    symbols
        .iter()
        .enumerate()
        .filter_map(|(pos, &symbol)| roller.push(symbol).map(|value| (pos, value)))
        .collect()
}
