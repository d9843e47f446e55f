//! Read loading
//!
//! Reads live in an arena ([`ReadSet`]); everything else refers to them by
//! their `u32` id, which is their position in the input file.

use std::collections::HashSet;
use std::path::Path;

use crate::error::{MapError, MapResult};
use crate::io::fasta::{stream_file, BaseSink};
use crate::packed::PackedSeq;

/// Hard cap on read length in symbols
pub const MAX_READ_LEN: usize = 32;

/// Identifier of a read within its [`ReadSet`]
pub type ReadId = u32;

/// A single short read
#[derive(Debug, Clone)]
pub struct Read {
    pub name: String,
    pub seq: PackedSeq,
}

impl Read {
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }
}

/// All loaded reads, in input order
#[derive(Debug, Clone, Default)]
pub struct ReadSet {
    reads: Vec<Read>,
    max_read_len: usize,
    total_symbols: u64,
}

impl ReadSet {
    /// Load every entry of a FASTA/FASTQ file as a read
    pub fn load<P: AsRef<Path>>(path: P) -> MapResult<Self> {
        let mut loader = ReadLoader::new();
        stream_file(path, &mut loader)?;
        let reads = loader.into_reads();

        log::info!(
            "Loaded {} symbols in {} reads (longest {})",
            reads.total_symbols,
            reads.len(),
            reads.max_read_len
        );
        Ok(reads)
    }

    /// Build from in-memory symbol vectors
    pub fn from_symbols<I, S>(reads: I) -> MapResult<Self>
    where
        I: IntoIterator<Item = (S, Vec<u8>)>,
        S: Into<String>,
    {
        let mut loader = ReadLoader::new();
        let mut offset = 0u64;
        for (name, symbols) in reads {
            let name = name.into();
            loader.entry(&name)?;
            for symbol in symbols {
                loader.base(symbol, offset)?;
                offset += 1;
            }
        }
        Ok(loader.into_reads())
    }

    pub fn get(&self, id: ReadId) -> &Read {
        &self.reads[id as usize]
    }

    pub fn len(&self) -> usize {
        self.reads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ReadId, &Read)> {
        self.reads.iter().enumerate().map(|(i, r)| (i as ReadId, r))
    }

    /// Longest read seen; sizes the aligner buffers
    pub fn max_read_len(&self) -> usize {
        self.max_read_len
    }

    pub fn total_symbols(&self) -> u64 {
        self.total_symbols
    }
}

/// [`BaseSink`] collecting reads and enforcing the length cap and unique names
#[derive(Debug, Default)]
pub struct ReadLoader {
    set: ReadSet,
    names: HashSet<String>,
}

impl ReadLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_reads(self) -> ReadSet {
        self.set
    }
}

impl BaseSink for ReadLoader {
    fn entry(&mut self, name: &str) -> MapResult<()> {
        if !self.names.insert(name.to_string()) {
            return Err(MapError::DuplicateRead(name.to_string()));
        }

        if self.set.reads.len() > ReadId::MAX as usize {
            return Err(MapError::invalid_params("too many reads"));
        }

        self.set.reads.push(Read {
            name: name.to_string(),
            seq: PackedSeq::with_capacity(MAX_READ_LEN),
        });
        Ok(())
    }

    fn base(&mut self, symbol: u8, _offset: u64) -> MapResult<()> {
        let read = self.set.reads.last_mut().ok_or(MapError::OrphanBase)?;

        if read.seq.len() == MAX_READ_LEN {
            return Err(MapError::ReadTooLong {
                name: read.name.clone(),
                max: MAX_READ_LEN,
            });
        }

        read.seq.push(symbol);
        self.set.max_read_len = self.set.max_read_len.max(read.seq.len());
        self.set.total_symbols += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::fasta::stream_reader;
    use std::io::Cursor;

    fn load_str(data: &str) -> MapResult<ReadSet> {
        let mut loader = ReadLoader::new();
        stream_reader(Cursor::new(data.to_string()), Path::new("reads.fa"), 0, &mut loader)?;
        Ok(loader.into_reads())
    }

    #[test]
    fn test_load_reads() {
        let reads = load_str(">r1\nACGT\n>r2\nACGTACGTAC\n").unwrap();
        assert_eq!(reads.len(), 2);
        assert_eq!(reads.get(0).name, "r1");
        assert_eq!(reads.get(1).seq.to_vec(), vec![0, 1, 2, 3, 0, 1, 2, 3, 0, 1]);
        assert_eq!(reads.max_read_len(), 10);
        assert_eq!(reads.total_symbols(), 14);
    }

    #[test]
    fn test_read_at_cap_accepted() {
        let seq = "A".repeat(MAX_READ_LEN);
        let reads = load_str(&format!(">r1\n{}\n", seq)).unwrap();
        assert_eq!(reads.get(0).len(), MAX_READ_LEN);
    }

    #[test]
    fn test_oversized_read_rejected() {
        let seq = "A".repeat(MAX_READ_LEN + 1);
        let result = load_str(&format!(">ok\nACGT\n>long\n{}\n", seq));
        match result {
            Err(MapError::ReadTooLong { name, max }) => {
                assert_eq!(name, "long");
                assert_eq!(max, MAX_READ_LEN);
            }
            other => panic!("expected ReadTooLong, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = load_str(">r1\nACGT\n>r1\nTTTT\n");
        assert!(matches!(result, Err(MapError::DuplicateRead(_))));
    }

    #[test]
    fn test_from_symbols() {
        let reads = ReadSet::from_symbols(vec![("a", vec![0, 1]), ("b", vec![3])]).unwrap();
        let names: Vec<&str> = reads.iter().map(|(_, r)| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
