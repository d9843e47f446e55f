//! Score-only local alignment in linear space

use std::cmp::max;

use super::{AlignStats, BoundedScorer};
use crate::packed::PackedSeq;
use crate::params::ScoringParams;

/// Keeps additions of two penalties away from overflow
const NEG_INF: i32 = i32::MIN / 4;

/// Affine-gap Smith-Waterman scorer with reusable buffers.
///
/// Rows walk the genome window, columns the read, so only `read_len + 1`
/// cells per matrix are kept. Each worker owns its own instance.
#[derive(Debug, Clone)]
pub struct LocalScorer {
    scoring: ScoringParams,
    window: Vec<u8>,
    read: Vec<u8>,
    /// Best score ending in each read column, previous then current row
    h: Vec<i32>,
    /// Best score ending in a reference gap, per read column
    e: Vec<i32>,
    stats: AlignStats,
}

impl LocalScorer {
    /// Size buffers for windows up to `max_window` and reads up to `max_read`
    pub fn new(scoring: ScoringParams, max_window: usize, max_read: usize) -> Self {
        Self {
            scoring,
            window: Vec::with_capacity(max_window),
            read: Vec::with_capacity(max_read),
            h: Vec::with_capacity(max_read + 1),
            e: Vec::with_capacity(max_read + 1),
            stats: AlignStats::default(),
        }
    }

    /// Score two unpacked symbol slices
    pub fn score_symbols(&mut self, window: &[u8], read: &[u8]) -> i32 {
        let m = read.len();
        let open = self.scoring.gap_open;
        let extend = self.scoring.gap_extend;

        self.h.clear();
        self.h.resize(m + 1, 0);
        self.e.clear();
        self.e.resize(m + 1, NEG_INF);

        let mut best = 0;

        for &g in window {
            let mut diag = 0;
            let mut left = 0;
            let mut f = NEG_INF;

            for j in 1..=m {
                let up = self.h[j];
                self.e[j] = max(self.e[j] + extend, up + open + extend);
                f = max(f + extend, left + open + extend);

                let h = max(
                    max(0, diag + self.scoring.substitution(g, read[j - 1])),
                    max(self.e[j], f),
                );

                diag = up;
                left = h;
                self.h[j] = h;
                best = max(best, h);
            }
        }

        self.stats.invocations += 1;
        self.stats.cells += (window.len() * m) as u64;
        best
    }
}

impl BoundedScorer for LocalScorer {
    fn score(&mut self, genome: &PackedSeq, offset: usize, len: usize, read: &PackedSeq) -> i32 {
        let mut window = std::mem::take(&mut self.window);
        let mut symbols = std::mem::take(&mut self.read);
        genome.unpack_range(offset, len, &mut window);
        read.unpack_range(0, read.len(), &mut symbols);

        let score = self.score_symbols(&window, &symbols);

        self.window = window;
        self.read = symbols;
        score
    }

    fn stats(&self) -> AlignStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::encode_base;

    fn encode(seq: &[u8]) -> Vec<u8> {
        seq.iter().map(|&b| encode_base(b)).collect()
    }

    fn scoring() -> ScoringParams {
        ScoringParams {
            match_value: 2,
            mismatch_value: -3,
            gap_open: -5,
            gap_extend: -2,
            threshold: 0,
        }
    }

    #[test]
    fn test_exact_match() {
        let mut scorer = LocalScorer::new(scoring(), 32, 8);
        let score = scorer.score_symbols(&encode(b"TTTTACGTACGTTTTT"), &encode(b"ACGTACGT"));
        assert_eq!(score, 16);
    }

    #[test]
    fn test_single_mismatch() {
        let mut scorer = LocalScorer::new(scoring(), 32, 9);
        // 4 matches, mismatch, 4 matches: 8 + (-3) + 8 = 13
        let score = scorer.score_symbols(&encode(b"GGACGTTACGTGG"), &encode(b"ACGTAACGT"));
        assert_eq!(score, 13);
    }

    #[test]
    fn test_gap() {
        let mut scorer = LocalScorer::new(scoring(), 32, 12);
        // Read has one extra base: 12 matches minus open + one extension
        let score = scorer.score_symbols(&encode(b"ACGTACTGCATG"), &encode(b"ACGTACATGCATG"));
        assert_eq!(score, 24 - 7);
    }

    #[test]
    fn test_unrelated_scores_low() {
        let mut scorer = LocalScorer::new(scoring(), 16, 8);
        let score = scorer.score_symbols(&encode(b"AAAAAAAA"), &encode(b"CCCCCCCC"));
        assert_eq!(score, 0);
    }

    #[test]
    fn test_packed_interface_and_stats() {
        let genome = PackedSeq::from_symbols(encode(b"CCCCACGTACGTCCCC"));
        let read = PackedSeq::from_symbols(encode(b"ACGTACGT"));
        let mut scorer = LocalScorer::new(scoring(), 16, 8);

        assert_eq!(scorer.score(&genome, 2, 12, &read), 16);
        assert_eq!(scorer.score(&genome, 0, 6, &read), 4);

        let stats = scorer.stats();
        assert_eq!(stats.invocations, 2);
        assert_eq!(stats.cells, (12 * 8 + 6 * 8) as u64);
    }
}
