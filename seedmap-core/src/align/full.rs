//! Full local alignment with traceback, backed by rust-bio

use bio::alignment::pairwise::Aligner;
use bio::alignment::AlignmentOperation;

use super::{AlignStats, AlignmentStrings, FullAligner, FullAlignment};
use crate::alphabet::decode_symbol;
use crate::packed::PackedSeq;
use crate::params::ScoringParams;

/// Exact affine-gap local aligner producing counts and alignment rows
#[derive(Debug, Clone)]
pub struct TracebackAligner {
    scoring: ScoringParams,
    max_window: usize,
    max_read: usize,
    window: Vec<u8>,
    read: Vec<u8>,
    stats: AlignStats,
}

impl TracebackAligner {
    pub fn new(scoring: ScoringParams, max_window: usize, max_read: usize) -> Self {
        Self {
            scoring,
            max_window,
            max_read,
            window: Vec::with_capacity(max_window),
            read: Vec::with_capacity(max_read),
            stats: AlignStats::default(),
        }
    }

    /// Align two unpacked symbol slices; `read` is x, `window` is y
    pub fn align_symbols(&mut self, window: &[u8], read: &[u8], with_strings: bool) -> FullAlignment {
        let match_value = self.scoring.match_value;
        let mismatch_value = self.scoring.mismatch_value;
        let substitution = move |a: u8, b: u8| if a == b { match_value } else { mismatch_value };

        let mut aligner = Aligner::with_capacity(
            read.len().max(self.max_read),
            window.len().max(self.max_window),
            self.scoring.gap_open,
            self.scoring.gap_extend,
            substitution,
        );
        let alignment = aligner.local(read, window);

        self.stats.invocations += 1;
        self.stats.cells += (read.len() * window.len()) as u64;

        let mut result = FullAlignment {
            score: alignment.score,
            genome_start: alignment.ystart,
            read_start: alignment.xstart,
            mapped: alignment.xend - alignment.xstart,
            matches: 0,
            mismatches: 0,
            insertions: 0,
            deletions: 0,
            strings: None,
        };

        let mut reference_row = String::new();
        let mut read_row = String::new();
        let mut x = alignment.xstart;
        let mut y = alignment.ystart;

        for op in &alignment.operations {
            match op {
                AlignmentOperation::Match | AlignmentOperation::Subst => {
                    if matches!(op, AlignmentOperation::Match) {
                        result.matches += 1;
                    } else {
                        result.mismatches += 1;
                    }
                    if with_strings {
                        reference_row.push(decode_symbol(window[y]));
                        read_row.push(decode_symbol(read[x]));
                    }
                    x += 1;
                    y += 1;
                }
                AlignmentOperation::Ins => {
                    result.insertions += 1;
                    if with_strings {
                        reference_row.push('-');
                        read_row.push(decode_symbol(read[x]));
                    }
                    x += 1;
                }
                AlignmentOperation::Del => {
                    result.deletions += 1;
                    if with_strings {
                        reference_row.push(decode_symbol(window[y]));
                        read_row.push('-');
                    }
                    y += 1;
                }
                // Local alignments carry their offsets in xstart/ystart
                AlignmentOperation::Xclip(_) | AlignmentOperation::Yclip(_) => {}
            }
        }

        if with_strings {
            result.strings = Some(AlignmentStrings {
                reference: reference_row,
                read: read_row,
            });
        }

        result
    }
}

impl FullAligner for TracebackAligner {
    fn align(
        &mut self,
        genome: &PackedSeq,
        offset: usize,
        len: usize,
        read: &PackedSeq,
        score: i32,
        with_strings: bool,
    ) -> FullAlignment {
        let mut window = std::mem::take(&mut self.window);
        let mut symbols = std::mem::take(&mut self.read);
        genome.unpack_range(offset, len, &mut window);
        read.unpack_range(0, read.len(), &mut symbols);

        let result = self.align_symbols(&window, &symbols, with_strings);
        if result.score != score {
            log::debug!(
                "Full alignment score {} differs from scan score {} at window {}+{}",
                result.score,
                score,
                offset,
                len
            );
        }

        self.window = window;
        self.read = symbols;
        result
    }

    fn stats(&self) -> AlignStats {
        self.stats
    }
}
