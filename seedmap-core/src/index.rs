//! K-mer to read index
//!
//! A direct-addressed table with one slot per possible k-mer value (4^k
//! slots). Slots are stored compactly: `offsets[v]..offsets[v + 1]` delimits
//! the ids of reads containing k-mer `v` inside one flat array. Each read
//! appears at most once per slot even when the k-mer repeats inside it.

use crate::error::{MapError, MapResult};
use crate::kmer::{kmer_space, KmerRoller};
use crate::params::MAX_KMER_LEN;
use crate::reads::{ReadId, ReadSet};

/// Direct-addressed k-mer → reads table
#[derive(Debug, Clone)]
pub struct KmerIndex {
    k: u32,
    offsets: Vec<u32>,
    entries: Vec<ReadId>,
}

impl KmerIndex {
    /// Index every read in `reads` by its distinct valid k-mers
    pub fn build(reads: &ReadSet, k: u32) -> MapResult<Self> {
        if k < 1 || k > MAX_KMER_LEN {
            return Err(MapError::invalid_params(format!("invalid kmer length {}", k)));
        }

        let seeds = distinct_seeds(reads, k);
        if seeds.len() > u32::MAX as usize {
            return Err(MapError::invalid_params(format!(
                "{} k-mers exceed the index capacity",
                seeds.len()
            )));
        }

        let slots = kmer_space(k);
        let mut offsets: Vec<u32> = Vec::new();
        offsets
            .try_reserve_exact(slots + 1)
            .map_err(|_| MapError::OutOfMemory {
                what: "k-mer index",
                bytes: (slots + 1) * std::mem::size_of::<u32>(),
            })?;
        offsets.resize(slots + 1, 0);

        // Counting sort by k-mer value; reads stay in id order inside a slot
        for &(kmer, _) in &seeds {
            offsets[kmer as usize + 1] += 1;
        }
        for slot in 1..=slots {
            offsets[slot] += offsets[slot - 1];
        }

        let mut cursor: Vec<u32> = offsets[..slots].to_vec();
        let mut entries = vec![0 as ReadId; seeds.len()];
        for &(kmer, id) in &seeds {
            let at = &mut cursor[kmer as usize];
            entries[*at as usize] = id;
            *at += 1;
        }

        log::info!(
            "Indexed {} distinct read k-mers (k={}, {} slots)",
            entries.len(),
            k,
            slots
        );

        Ok(Self { k, offsets, entries })
    }

    /// Ids of reads containing k-mer `kmer`
    #[inline]
    pub fn reads_for(&self, kmer: u32) -> &[ReadId] {
        let slot = kmer as usize;
        let start = self.offsets[slot] as usize;
        let end = self.offsets[slot + 1] as usize;
        &self.entries[start..end]
    }

    pub fn k(&self) -> u32 {
        self.k
    }

    pub fn num_slots(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Total (k-mer, read) references
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }
}

/// `(kmer, read)` pairs with per-read duplicates removed
fn distinct_seeds(reads: &ReadSet, k: u32) -> Vec<(u32, ReadId)> {
    let mut seeds = Vec::new();
    let mut seen: Vec<u32> = Vec::new();
    let mut roller = KmerRoller::new(k);

    for (id, read) in reads.iter() {
        // Reads are short, so a linear scan of the k-mers seen so far is cheap
        seen.clear();
        roller.reset();

        for symbol in read.seq.iter() {
            if let Some(kmer) = roller.push(symbol) {
                if !seen.contains(&kmer) {
                    seen.push(kmer);
                    seeds.push((kmer, id));
                }
            }
        }
    }

    seeds
}
