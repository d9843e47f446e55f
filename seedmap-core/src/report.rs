//! Final per-read mapping records
//!
//! After the scan, each read's retained scores are ranked and re-aligned with
//! the full aligner over the same genome window the scan scored.

use serde::Serialize;

use crate::align::{AlignStats, FullAligner, TracebackAligner};
use crate::alphabet::decode_symbol;
use crate::genome::Genome;
use crate::params::{ScanParams, ScoringParams};
use crate::reads::{ReadId, ReadSet};
use crate::scan::ReadState;

/// Default reference bases shown either side of an alignment
pub const FLANK_LEN: usize = 4;

/// Display rows of one alignment, including reference flanks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignmentView {
    /// Reference row with flanking context each side
    pub reference: String,
    /// `|` under identical aligned bases
    pub markers: String,
    /// Read row, indented past the leading flank
    pub read: String,
}

/// One reported alignment of a read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingRecord {
    pub read_name: String,
    pub score: i32,
    /// Absolute genome position of the first aligned reference base
    pub genome_index: usize,
    pub read_start: usize,
    pub mapped: usize,
    pub matches: u32,
    pub mismatches: u32,
    pub insertions: u32,
    pub deletions: u32,
    pub alignment: Option<AlignmentView>,
}

impl MappingRecord {
    /// Last aligned read position (inclusive)
    pub fn read_end(&self) -> usize {
        (self.read_start + self.mapped).saturating_sub(1)
    }
}

/// All records of one read, best first
#[derive(Debug, Clone, Serialize)]
pub struct ReadMappings {
    pub read_id: ReadId,
    pub read_name: String,
    pub records: Vec<MappingRecord>,
}

/// Turns scan state into ranked, fully aligned records
pub struct Reporter<'a, A = TracebackAligner> {
    genome: &'a Genome,
    reads: &'a ReadSet,
    params: ScanParams,
    aligner: A,
    with_alignment: bool,
    flank: usize,
}

impl<'a> Reporter<'a, TracebackAligner> {
    pub fn new(
        genome: &'a Genome,
        reads: &'a ReadSet,
        params: ScanParams,
        scoring: &ScoringParams,
        with_alignment: bool,
    ) -> Self {
        let aligner = TracebackAligner::new(
            scoring.clone(),
            2 * params.window_len as usize,
            reads.max_read_len(),
        );
        Self::with_aligner(genome, reads, params, aligner, with_alignment)
    }
}

impl<'a, A: FullAligner> Reporter<'a, A> {
    pub fn with_aligner(
        genome: &'a Genome,
        reads: &'a ReadSet,
        params: ScanParams,
        aligner: A,
        with_alignment: bool,
    ) -> Self {
        Self {
            genome,
            reads,
            params,
            aligner,
            with_alignment,
            flank: FLANK_LEN,
        }
    }

    /// Reference context shown either side of alignment rows
    pub fn with_flank(mut self, flank: usize) -> Self {
        self.flank = flank;
        self
    }

    /// Records for every read with at least one accepted trigger, in read order
    pub fn report(&mut self, states: &[ReadState]) -> Vec<ReadMappings> {
        let reads = self.reads;
        let mut mapped = Vec::new();

        for (id, state) in states.iter().enumerate() {
            if state.tracker.triggers() == 0 {
                continue;
            }
            let id = id as ReadId;
            let read = reads.get(id);

            let records = state
                .top
                .ranked()
                .into_iter()
                .map(|entry| self.record(id, entry.score, entry.position))
                .collect();

            mapped.push(ReadMappings {
                read_id: id,
                read_name: read.name.clone(),
                records,
            });
        }

        log::debug!("{} of {} reads matched", mapped.len(), states.len());
        mapped
    }

    /// Re-align read `id` around scan position `idx`
    pub fn record(&mut self, id: ReadId, score: i32, idx: u32) -> MappingRecord {
        let reads = self.reads;
        let read = reads.get(id);
        let (offset, len) = self.params.score_window(idx, self.genome.len());
        let full = self
            .aligner
            .align(&self.genome.seq, offset, len, &read.seq, score, self.with_alignment);

        let genome_index = offset + full.genome_start;
        let alignment = full
            .strings
            .as_ref()
            .map(|rows| self.view(genome_index, &rows.reference, &rows.read));

        MappingRecord {
            read_name: read.name.clone(),
            score: full.score,
            genome_index,
            read_start: full.read_start,
            mapped: full.mapped,
            matches: full.matches,
            mismatches: full.mismatches,
            insertions: full.insertions,
            deletions: full.deletions,
            alignment,
        }
    }

    pub fn aligner_stats(&self) -> AlignStats {
        self.aligner.stats()
    }

    fn view(&self, start: usize, reference: &str, read: &str) -> AlignmentView {
        let genome = &self.genome.seq;
        let span = reference.bytes().filter(|&b| b != b'-').count();
        let lead = start.min(self.flank);
        let end = start + span;
        let trail = genome.len().saturating_sub(end).min(self.flank);

        let mut reference_row = String::with_capacity(lead + reference.len() + trail);
        reference_row.extend((start - lead..start).map(|pos| decode_symbol(genome.get(pos))));
        reference_row.push_str(reference);
        reference_row.extend((end..end + trail).map(|pos| decode_symbol(genome.get(pos))));

        let mut markers = " ".repeat(lead);
        markers.extend(reference.chars().zip(read.chars()).map(|(r, q)| {
            if r == q && r != '-' {
                '|'
            } else {
                ' '
            }
        }));

        AlignmentView {
            reference: reference_row,
            markers: markers.trim_end().to_string(),
            read: format!("{}{}", " ".repeat(lead), read),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::encode_base;
    use crate::packed::PackedSeq;
    use crate::topk::TopK;
    use crate::tracker::HitTracker;

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

    fn params() -> ScanParams {
        ScanParams {
            kmer_len: 4,
            window_len: 10,
            num_matches: 2,
            taboo_len: 1,
            max_outputs: 3,
        }
    }

    fn state_with(entries: &[(i32, u32)]) -> ReadState {
        let mut state = ReadState {
            tracker: HitTracker::new(2),
            top: TopK::new(3),
        };
        for &(score, idx) in entries {
            state.top.offer(score, idx);
            state.tracker.accept(idx);
        }
        state
    }

    #[test]
    fn test_records_ranked_and_aligned() {
        //                                  20      28
        let genome = Genome::new(
            "chr",
            PackedSeq::from_symbols(encode(b"CCCCCCCCCCCCCCCCCCCCACGTTGCACCCCCCCCCC")),
        );
        let reads = ReadSet::from_symbols(vec![("r1", encode(b"ACGTTGCA"))]).unwrap();
        let mut reporter = Reporter::new(&genome, &reads, params(), &scoring(), true);

        let states = vec![state_with(&[(16, 22), (16, 20)])];
        let mapped = reporter.report(&states);

        assert_eq!(mapped.len(), 1);
        let records = &mapped[0].records;
        assert_eq!(records.len(), 2);
        for record in records {
            assert_eq!(record.score, 16);
            assert_eq!(record.genome_index, 20);
            assert_eq!(record.read_start, 0);
            assert_eq!(record.mapped, 8);
            assert_eq!(record.read_end(), 7);
            assert_eq!(record.matches, 8);
        }

        let view = records[0].alignment.as_ref().unwrap();
        assert_eq!(view.reference, "CCCCACGTTGCACCCC");
        assert_eq!(view.markers, "    ||||||||");
        assert_eq!(view.read, "    ACGTTGCA");
        assert_eq!(reporter.aligner_stats().invocations, 2);
    }

    #[test]
    fn test_flanks_clamped_at_genome_edges() {
        let genome = Genome::new("chr", PackedSeq::from_symbols(encode(b"GATTACAT")));
        let reads = ReadSet::from_symbols(vec![("r1", encode(b"GATTACAT"))]).unwrap();
        let mut reporter = Reporter::new(&genome, &reads, params(), &scoring(), true);

        let record = reporter.record(0, 16, 0);
        let view = record.alignment.unwrap();
        assert_eq!(view.reference, "GATTACAT");
        assert_eq!(view.read, "GATTACAT");
    }

    #[test]
    fn test_custom_flank() {
        let genome = Genome::new("chr", PackedSeq::from_symbols(encode(b"TTTTTTGATTACATTTTTTT")));
        let reads = ReadSet::from_symbols(vec![("r1", encode(b"GATTACA"))]).unwrap();
        let mut reporter =
            Reporter::new(&genome, &reads, params(), &scoring(), true).with_flank(2);

        let view = reporter.record(0, 14, 6).alignment.unwrap();
        assert_eq!(view.reference, "TTGATTACATT");
        assert_eq!(view.read, "  GATTACA");
    }

    #[test]
    fn test_unmatched_reads_have_no_records() {
        let genome = Genome::new("chr", PackedSeq::from_symbols(encode(b"ACGTACGTACGT")));
        let reads = ReadSet::from_symbols(vec![
            ("hit", encode(b"ACGTACGT")),
            ("miss", encode(b"TTTTTTTT")),
        ])
        .unwrap();
        let mut reporter = Reporter::new(&genome, &reads, params(), &scoring(), false);

        let states = vec![state_with(&[(16, 4)]), state_with(&[])];
        let mapped = reporter.report(&states);

        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].read_name, "hit");
        assert!(mapped[0].records[0].alignment.is_none());
    }
}
