//! Genome scan
//!
//! Streams the genome once through a rolling k-mer, looks every valid k-mer up
//! in the [`KmerIndex`] and feeds the hit to the matching reads' trackers.
//! Triggered reads are scored over a clamped genome window and the result is
//! offered to the read's [`TopK`].
//!
//! Per-read state lives in an arena parallel to the [`ReadSet`]. The parallel
//! scan splits that arena into contiguous blocks of reads; every worker streams
//! the whole genome but only touches its own block, so each read sees exactly
//! the hit sequence a sequential scan would give it.

use std::ops::Range;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::align::{AlignStats, BoundedScorer, LocalScorer};
use crate::error::{MapError, MapResult};
use crate::genome::Genome;
use crate::index::KmerIndex;
use crate::kmer::KmerRoller;
use crate::params::{ScanParams, ScoringParams};
use crate::reads::{ReadId, ReadSet};
use crate::topk::TopK;
use crate::tracker::{HitTracker, Observation};

/// Genome positions between two progress callbacks
pub const PROGRESS_INTERVAL: u64 = 1 << 16;

/// Progress callback, called with the number of genome positions scanned
pub type ProgressFn<'a> = &'a (dyn Fn(u64) + Sync);

/// Mutable scan state of one read
#[derive(Debug, Clone)]
pub struct ReadState {
    pub tracker: HitTracker,
    pub top: TopK,
}

impl ReadState {
    pub fn new(params: &ScanParams) -> Self {
        Self {
            tracker: HitTracker::new(params.num_matches),
            top: TopK::new(params.max_outputs as usize),
        }
    }
}

/// Counters collected during a scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Genome positions streamed
    pub positions: u64,
    /// Valid genome k-mers looked up
    pub kmers: u64,
    /// (k-mer, read) hits fed to trackers
    pub seed_hits: u64,
    /// Hits discarded by the taboo rule
    pub taboo_skips: u64,
    /// Times a read's trigger condition held
    pub triggers: u64,
    /// Triggers whose score was retained
    pub accepted: u64,
    pub scorer: AlignStats,
}

impl ScanStats {
    /// Fold in the counters of a worker that scanned a different block of reads
    /// over the same genome
    fn merge_shard(&mut self, other: &ScanStats) {
        self.positions = self.positions.max(other.positions);
        self.kmers = self.kmers.max(other.kmers);
        self.seed_hits += other.seed_hits;
        self.taboo_skips += other.taboo_skips;
        self.triggers += other.triggers;
        self.accepted += other.accepted;
        self.scorer.merge(&other.scorer);
    }
}

/// Drives the scan of one genome against an indexed read set
pub struct Scanner<'a, S = LocalScorer> {
    genome: &'a Genome,
    reads: &'a ReadSet,
    index: &'a KmerIndex,
    params: ScanParams,
    threshold: i32,
    scorer: S,
    states: Vec<ReadState>,
    progress: Option<ProgressFn<'a>>,
}

impl<'a> Scanner<'a, LocalScorer> {
    /// Scanner with the built-in [`LocalScorer`]
    pub fn new(
        genome: &'a Genome,
        reads: &'a ReadSet,
        index: &'a KmerIndex,
        params: ScanParams,
        scoring: ScoringParams,
    ) -> MapResult<Self> {
        scoring.validate()?;
        let scorer = LocalScorer::new(
            scoring.clone(),
            2 * params.window_len as usize,
            reads.max_read_len(),
        );
        Self::with_scorer(genome, reads, index, params, scoring.threshold, scorer)
    }
}

impl<'a, S> Scanner<'a, S>
where
    S: BoundedScorer + Clone + Send + Sync,
{
    pub fn with_scorer(
        genome: &'a Genome,
        reads: &'a ReadSet,
        index: &'a KmerIndex,
        params: ScanParams,
        threshold: i32,
        scorer: S,
    ) -> MapResult<Self> {
        params.validate()?;

        if index.k() != params.kmer_len {
            return Err(MapError::invalid_params(format!(
                "index built with k={} but scanning with k={}",
                index.k(),
                params.kmer_len
            )));
        }

        if u32::try_from(genome.len()).is_err() {
            return Err(MapError::invalid_params(format!(
                "genome of {} symbols exceeds the supported length",
                genome.len()
            )));
        }

        let states = (0..reads.len()).map(|_| ReadState::new(&params)).collect();

        Ok(Self {
            genome,
            reads,
            index,
            params,
            threshold,
            scorer,
            states,
            progress: None,
        })
    }

    /// Report progress every [`PROGRESS_INTERVAL`] positions
    pub fn with_progress(mut self, progress: ProgressFn<'a>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Single sequential pass over the genome
    pub fn run(&mut self) -> ScanStats {
        let start = Instant::now();
        let ctx = self.context();
        let stats = ctx.scan(&mut self.scorer, &mut self.states, 0, self.progress);

        log::info!("Scan complete in {:.2}s", start.elapsed().as_secs_f64());
        stats
    }

    /// Scan with the reads split into `shards` contiguous blocks, run on the
    /// current rayon pool. Produces the same per-read results as [`run`].
    ///
    /// [`run`]: Scanner::run
    pub fn run_parallel(&mut self, shards: usize) -> ScanStats {
        if shards <= 1 || self.states.len() <= 1 {
            return self.run();
        }

        let start = Instant::now();
        let block = self.states.len().div_ceil(shards);
        let ctx = self.context();
        let scorer = &self.scorer;
        let progress = self.progress;

        log::debug!(
            "Scanning {} reads in blocks of {} on {} threads",
            self.states.len(),
            block,
            rayon::current_num_threads()
        );

        let shard_stats: Vec<ScanStats> = self
            .states
            .par_chunks_mut(block)
            .enumerate()
            .map(|(shard, states)| {
                let mut scorer = scorer.clone();
                let first = (shard * block) as ReadId;
                // One worker speaks for the whole scan
                let progress = if shard == 0 { progress } else { None };
                ctx.scan(&mut scorer, states, first, progress)
            })
            .collect();

        let mut stats = ScanStats::default();
        for shard in &shard_stats {
            stats.merge_shard(shard);
        }

        log::info!(
            "Scan complete in {:.2}s ({} shards)",
            start.elapsed().as_secs_f64(),
            shard_stats.len()
        );
        stats
    }

    /// Per-read state, indexed by [`ReadId`]
    pub fn states(&self) -> &[ReadState] {
        &self.states
    }

    pub fn into_states(self) -> Vec<ReadState> {
        self.states
    }

    pub fn params(&self) -> &ScanParams {
        &self.params
    }

    fn context(&self) -> ScanContext<'a> {
        ScanContext {
            genome: self.genome,
            reads: self.reads,
            index: self.index,
            params: self.params.clone(),
            threshold: self.threshold,
        }
    }
}

/// Read-only inputs shared by all workers
#[derive(Clone)]
struct ScanContext<'a> {
    genome: &'a Genome,
    reads: &'a ReadSet,
    index: &'a KmerIndex,
    params: ScanParams,
    threshold: i32,
}

impl ScanContext<'_> {
    /// Stream the genome over the reads `first..first + states.len()`
    fn scan<S: BoundedScorer>(
        &self,
        scorer: &mut S,
        states: &mut [ReadState],
        first: ReadId,
        progress: Option<ProgressFn<'_>>,
    ) -> ScanStats {
        let k = self.params.kmer_len;
        let genome_len = self.genome.len();
        let owned: Range<ReadId> = first..first + states.len() as ReadId;

        let mut stats = ScanStats::default();
        let mut roller = KmerRoller::new(k);

        for (i, symbol) in self.genome.seq.iter().enumerate() {
            let pos = i as u64 + 1;
            if pos % PROGRESS_INTERVAL == 0 {
                if let Some(report) = progress {
                    report(pos);
                }
            }

            let Some(kmer) = roller.push(symbol) else {
                continue;
            };
            stats.kmers += 1;

            // Start of the k-mer window
            let idx = i as u32 + 1 - k;

            // Slot entries are in ascending read order
            let hits = self.index.reads_for(kmer);
            let lo = hits.partition_point(|&id| id < owned.start);
            let hi = hits.partition_point(|&id| id < owned.end);

            for &id in &hits[lo..hi] {
                stats.seed_hits += 1;
                let state = &mut states[(id - first) as usize];

                match state.tracker.observe(idx, self.params.window_len, self.params.taboo_len) {
                    Observation::Taboo => stats.taboo_skips += 1,
                    Observation::Recorded => {}
                    Observation::Trigger => {
                        stats.triggers += 1;
                        let (offset, len) = self.params.score_window(idx, genome_len);
                        let read = &self.reads.get(id).seq;
                        let score = scorer.score(&self.genome.seq, offset, len, read);

                        if score >= self.threshold && state.top.offer(score, idx) {
                            state.tracker.accept(idx);
                            stats.accepted += 1;
                            log::trace!("Read {} scored {} at {}", id, score, idx);
                        }
                    }
                }
            }
        }

        stats.positions = genome_len as u64;
        if let Some(report) = progress {
            report(stats.positions);
        }
        stats.scorer = scorer.stats();
        stats
    }
}
