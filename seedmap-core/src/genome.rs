//! Reference genome loading
//!
//! Exactly one reference sequence is supported per run.

use std::path::Path;

use crate::error::{MapError, MapResult};
use crate::io::fasta::{stream_file, BaseSink};
use crate::packed::PackedSeq;

/// The packed reference sequence
#[derive(Debug, Clone)]
pub struct Genome {
    pub name: String,
    pub seq: PackedSeq,
}

impl Genome {
    pub fn new(name: impl Into<String>, seq: PackedSeq) -> Self {
        Self {
            name: name.into(),
            seq,
        }
    }

    /// Load a single-entry FASTA file
    pub fn load<P: AsRef<Path>>(path: P) -> MapResult<Self> {
        let path = path.as_ref();
        let mut loader = GenomeLoader::new();
        let symbols = stream_file(path, &mut loader)?;
        let genome = loader.into_genome(path)?;

        log::info!("Loaded {} symbols of genome [{}]", symbols, genome.name);
        Ok(genome)
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }
}

/// [`BaseSink`] that packs a single reference entry
#[derive(Debug, Default)]
pub struct GenomeLoader {
    name: Option<String>,
    seq: PackedSeq,
}

impl GenomeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish loading; `source` labels the error for an empty genome
    pub fn into_genome(self, source: &Path) -> MapResult<Genome> {
        match self.name {
            Some(name) if !self.seq.is_empty() => Ok(Genome::new(name, self.seq)),
            _ => Err(MapError::EmptyInput(source.to_path_buf())),
        }
    }
}

impl BaseSink for GenomeLoader {
    fn begin(&mut self, size_hint: usize) -> MapResult<()> {
        // The file size bounds the symbol count
        self.seq = PackedSeq::with_capacity(size_hint);
        Ok(())
    }

    fn entry(&mut self, name: &str) -> MapResult<()> {
        if self.name.is_some() {
            return Err(MapError::MultipleReferences(name.to_string()));
        }
        self.name = Some(name.to_string());
        Ok(())
    }

    fn base(&mut self, symbol: u8, _offset: u64) -> MapResult<()> {
        if self.name.is_none() {
            return Err(MapError::OrphanBase);
        }
        self.seq.push(symbol);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::fasta::stream_reader;
    use std::io::Cursor;

    fn load_str(data: &str) -> MapResult<Genome> {
        let mut loader = GenomeLoader::new();
        stream_reader(Cursor::new(data.to_string()), Path::new("genome.fa"), data.len(), &mut loader)?;
        loader.into_genome(Path::new("genome.fa"))
    }

    #[test]
    fn test_load_single_entry() {
        let genome = load_str(">chr1 test\nACGT\nNACG\n").unwrap();
        assert_eq!(genome.name, "chr1");
        assert_eq!(genome.len(), 8);
        assert_eq!(genome.seq.to_vec(), vec![0, 1, 2, 3, 4, 0, 1, 2]);
    }

    #[test]
    fn test_second_entry_rejected() {
        let result = load_str(">chr1\nACGT\n>chr2\nACGT\n");
        match result {
            Err(MapError::MultipleReferences(name)) => assert_eq!(name, "chr2"),
            other => panic!("expected MultipleReferences, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_sequence_rejected() {
        let mut loader = GenomeLoader::new();
        loader.entry("chr1").unwrap();
        let result = loader.into_genome(Path::new("genome.fa"));
        assert!(matches!(result, Err(MapError::EmptyInput(_))));
    }
}
