//! Run parameters and their validation

use serde::{Deserialize, Serialize};
use crate::error::{MapError, MapResult};

/// Largest supported k-mer length: the rolling value is a `u32` and the
/// index is a direct-addressed table of 4^k slots
pub const MAX_KMER_LEN: u32 = 16;

/// Seeding and triggering parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanParams {
    /// K-mer (seed) length
    pub kmer_len: u32,
    /// Span within which `num_matches` seeds must cluster; also the minimum
    /// spacing between two triggers for the same read
    pub window_len: u32,
    /// Seeds required inside one window before scoring
    pub num_matches: u32,
    /// Seeds closer than this to the previous accepted seed are ignored
    pub taboo_len: u32,
    /// Scored positions retained per read
    pub max_outputs: u32,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            kmer_len: 8,
            window_len: 40,
            num_matches: 4,
            taboo_len: 4,
            max_outputs: 10,
        }
    }
}

impl ScanParams {
    pub fn validate(&self) -> MapResult<()> {
        if self.kmer_len < 1 || self.kmer_len > MAX_KMER_LEN {
            return Err(MapError::invalid_params(format!(
                "invalid kmer length {} (must be between 1 and {})",
                self.kmer_len, MAX_KMER_LEN
            )));
        }

        if self.window_len < self.kmer_len {
            return Err(MapError::invalid_params(format!(
                "invalid window length {} (must be at least the kmer length {})",
                self.window_len, self.kmer_len
            )));
        }

        if self.num_matches < 1 {
            return Err(MapError::invalid_params("invalid number of matches"));
        }

        if self.taboo_len > self.window_len {
            return Err(MapError::invalid_params(format!(
                "invalid taboo length {} (must not exceed window length {})",
                self.taboo_len, self.window_len
            )));
        }

        if self.max_outputs < 1 {
            return Err(MapError::invalid_params("invalid maximum hits per read"));
        }

        Ok(())
    }

    /// Genome window `(offset, len)` scored for a seed at `idx`: `window_len`
    /// either side, clamped to the genome
    pub fn score_window(&self, idx: u32, genome_len: usize) -> (usize, usize) {
        let window = self.window_len as usize;
        let offset = (idx as usize).saturating_sub(window).min(genome_len);
        let len = (window * 2).min(genome_len - offset);
        (offset, len)
    }
}

/// Scoring values shared by both alignment collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringParams {
    pub match_value: i32,
    pub mismatch_value: i32,
    /// Score of opening a gap (non-positive)
    pub gap_open: i32,
    /// Score of each gapped position (non-positive)
    pub gap_extend: i32,
    /// Minimum bounded-scorer result for a trigger to count
    pub threshold: i32,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            match_value: 10,
            mismatch_value: -15,
            gap_open: -33,
            gap_extend: -7,
            threshold: 150,
        }
    }
}

impl ScoringParams {
    pub fn validate(&self) -> MapResult<()> {
        if self.gap_open > 0 {
            return Err(MapError::invalid_params("invalid gap open penalty"));
        }

        if self.gap_extend > 0 {
            return Err(MapError::invalid_params("invalid gap extend penalty"));
        }

        Ok(())
    }

    /// Substitution score for a symbol pair
    #[inline]
    pub fn substitution(&self, a: u8, b: u8) -> i32 {
        if a == b {
            self.match_value
        } else {
            self.mismatch_value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ScanParams::default().validate().is_ok());
        assert!(ScoringParams::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_scan_params() {
        let bad = [
            ScanParams { kmer_len: 0, ..Default::default() },
            ScanParams { kmer_len: 17, ..Default::default() },
            ScanParams { kmer_len: 12, window_len: 11, ..Default::default() },
            ScanParams { num_matches: 0, ..Default::default() },
            ScanParams { taboo_len: 41, ..Default::default() },
            ScanParams { max_outputs: 0, ..Default::default() },
        ];
        for params in &bad {
            assert!(
                matches!(params.validate(), Err(MapError::InvalidParams(_))),
                "{:?} should be rejected",
                params
            );
        }
    }

    #[test]
    fn test_edge_scan_params_accepted() {
        let params = ScanParams {
            kmer_len: 16,
            window_len: 16,
            taboo_len: 16,
            num_matches: 1,
            max_outputs: 1,
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_invalid_gap_penalties() {
        let params = ScoringParams { gap_open: 1, ..Default::default() };
        assert!(params.validate().is_err());
        let params = ScoringParams { gap_extend: 2, ..Default::default() };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_score_window_clamping() {
        let params = ScanParams { window_len: 10, ..Default::default() };
        // Interior: centered on idx
        assert_eq!(params.score_window(50, 1000), (40, 20));
        // Near the start
        assert_eq!(params.score_window(3, 1000), (0, 20));
        // Near the end
        assert_eq!(params.score_window(995, 1000), (985, 15));
        // Genome shorter than the window
        assert_eq!(params.score_window(2, 12), (0, 12));
    }
}
