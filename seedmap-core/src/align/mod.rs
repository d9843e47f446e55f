//! Alignment collaborators
//!
//! The scan loop only needs a score for a genome window against a read
//! ([`BoundedScorer`]); reporting needs the full alignment ([`FullAligner`]).
//! Both use the same affine scoring, where a gap of length `L` scores
//! `gap_open + L * gap_extend`, so their scores agree.

pub mod full;
pub mod score;

use serde::Serialize;

use crate::packed::PackedSeq;

pub use full::TracebackAligner;
pub use score::LocalScorer;

/// Work counters for an aligner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlignStats {
    /// Number of alignments computed
    pub invocations: u64,
    /// Dynamic-programming cells filled
    pub cells: u64,
}

impl AlignStats {
    pub fn merge(&mut self, other: &AlignStats) {
        self.invocations += other.invocations;
        self.cells += other.cells;
    }
}

/// Fast score-only local alignment used while scanning
pub trait BoundedScorer {
    /// Best local score of `read` against `genome[offset..offset + len]`
    fn score(&mut self, genome: &PackedSeq, offset: usize, len: usize, read: &PackedSeq) -> i32;

    fn stats(&self) -> AlignStats;
}

/// Gapped alignment rows for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignmentStrings {
    /// Reference row, `-` for insertions
    pub reference: String,
    /// Read row, `-` for deletions
    pub read: String,
}

/// Result of a full local alignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FullAlignment {
    pub score: i32,
    /// Start of the alignment within the scored window
    pub genome_start: usize,
    /// First aligned read symbol
    pub read_start: usize,
    /// Read symbols covered by the alignment
    pub mapped: usize,
    pub matches: u32,
    pub mismatches: u32,
    /// Read symbols absent from the reference
    pub insertions: u32,
    /// Reference symbols absent from the read
    pub deletions: u32,
    pub strings: Option<AlignmentStrings>,
}

/// Exact local alignment with traceback, used for reporting only
pub trait FullAligner {
    /// Align `read` against `genome[offset..offset + len]`.
    ///
    /// `score` is the bounded scorer's result for the same window.
    fn align(
        &mut self,
        genome: &PackedSeq,
        offset: usize,
        len: usize,
        read: &PackedSeq,
        score: i32,
        with_strings: bool,
    ) -> FullAlignment;

    fn stats(&self) -> AlignStats;
}
