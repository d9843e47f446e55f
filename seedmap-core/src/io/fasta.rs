//! FASTA/FASTQ base stream
//!
//! Sequence files are parsed with needletail and replayed base by base into a
//! [`BaseSink`]. Loaders never see line structure or encodings, only entry
//! boundaries and symbols.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use needletail::errors::ParseErrorKind;
use needletail::parse_fastx_reader;

use crate::alphabet::encode_base;
use crate::error::{MapError, MapResult};

/// Receiver of a decoded base stream
pub trait BaseSink {
    /// Called once before any entry with an upper bound on the symbol count
    fn begin(&mut self, _size_hint: usize) -> MapResult<()> {
        Ok(())
    }

    /// Start of a new top-level record
    fn entry(&mut self, name: &str) -> MapResult<()>;

    /// One encoded symbol; `offset` counts symbols across the whole file
    fn base(&mut self, symbol: u8, offset: u64) -> MapResult<()>;

    /// Called once after the last symbol
    fn finish(&mut self) -> MapResult<()> {
        Ok(())
    }
}

/// Stream a FASTA/FASTQ file (optionally gzipped) into `sink`.
///
/// Returns the number of symbols delivered.
pub fn stream_file<P: AsRef<Path>, S: BaseSink>(path: P, sink: &mut S) -> MapResult<u64> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let size_hint = file.metadata()?.len() as usize;

    if path.to_string_lossy().ends_with(".gz") {
        let decoder = GzDecoder::new(file);
        stream_reader(BufReader::new(decoder), path, size_hint, sink)
    } else {
        stream_reader(BufReader::new(file), path, size_hint, sink)
    }
}

/// Stream FASTA/FASTQ data from any readable source into `sink`.
///
/// `source` only labels errors.
pub fn stream_reader<R: Read + Send, S: BaseSink>(
    reader: R,
    source: &Path,
    size_hint: usize,
    sink: &mut S,
) -> MapResult<u64> {
    let mut fastx_reader = match parse_fastx_reader(reader) {
        Ok(r) => r,
        Err(e) if matches!(e.kind, ParseErrorKind::EmptyFile) => {
            return Err(MapError::EmptyInput(source.to_path_buf()))
        }
        Err(e) => return Err(MapError::parse(source, e.to_string())),
    };

    sink.begin(size_hint)?;

    let mut offset = 0u64;
    let mut records = 0usize;

    while let Some(record) = fastx_reader.next() {
        let record = record.map_err(|e| MapError::parse(source, e.to_string()))?;
        let name = record_name(record.id());
        sink.entry(&name)?;
        records += 1;

        for &base in record.seq().iter() {
            sink.base(encode_base(base), offset)?;
            offset += 1;
        }
    }

    if records == 0 {
        return Err(MapError::EmptyInput(source.to_path_buf()));
    }

    sink.finish()?;
    log::debug!("Streamed {} records ({} symbols) from {}", records, offset, source.display());

    Ok(offset)
}

/// Record id up to the first whitespace
fn record_name(id: &[u8]) -> String {
    let id = String::from_utf8_lossy(id);
    id.split_whitespace().next().unwrap_or("").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[derive(Default)]
    struct Recorder {
        begun: bool,
        finished: bool,
        entries: Vec<(String, Vec<u8>)>,
        offsets: Vec<u64>,
    }

    impl BaseSink for Recorder {
        fn begin(&mut self, _size_hint: usize) -> MapResult<()> {
            self.begun = true;
            Ok(())
        }

        fn entry(&mut self, name: &str) -> MapResult<()> {
            self.entries.push((name.to_string(), Vec::new()));
            Ok(())
        }

        fn base(&mut self, symbol: u8, offset: u64) -> MapResult<()> {
            self.entries.last_mut().ok_or(MapError::OrphanBase)?.1.push(symbol);
            self.offsets.push(offset);
            Ok(())
        }

        fn finish(&mut self) -> MapResult<()> {
            self.finished = true;
            Ok(())
        }
    }

    #[test]
    fn test_stream_fasta() {
        let data = ">seq1 description\nACGT\nAC\n>seq2\nNNA\n";
        let mut sink = Recorder::default();
        let total = stream_reader(Cursor::new(data), Path::new("test.fa"), 0, &mut sink).unwrap();

        assert_eq!(total, 9);
        assert!(sink.begun && sink.finished);
        assert_eq!(sink.entries.len(), 2);
        assert_eq!(sink.entries[0].0, "seq1");
        assert_eq!(sink.entries[0].1, vec![0, 1, 2, 3, 0, 1]);
        assert_eq!(sink.entries[1].0, "seq2");
        assert_eq!(sink.entries[1].1, vec![4, 4, 0]);
        assert_eq!(sink.offsets, (0..9).collect::<Vec<u64>>());
    }

    #[test]
    fn test_stream_fastq() {
        let data = "@r1\nACGT\n+\nIIII\n@r2\nTTGG\n+\nIIII\n";
        let mut sink = Recorder::default();
        stream_reader(Cursor::new(data), Path::new("reads.fq"), 0, &mut sink).unwrap();
        assert_eq!(sink.entries.len(), 2);
        assert_eq!(sink.entries[1].1, vec![3, 3, 2, 2]);
    }

    #[test]
    fn test_empty_input() {
        let mut sink = Recorder::default();
        let result = stream_reader(Cursor::new(""), Path::new("empty.fa"), 0, &mut sink);
        assert!(matches!(result, Err(MapError::EmptyInput(_))));
        assert!(!sink.finished);
    }

    #[test]
    fn test_malformed_input() {
        let mut sink = Recorder::default();
        let result = stream_reader(Cursor::new("not a fasta file"), Path::new("bad.fa"), 0, &mut sink);
        assert!(matches!(result, Err(MapError::Parse { .. })));
    }

    #[test]
    fn test_stream_file_gz() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genome.fa.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b">chr\nACGTACGT\n").unwrap();
        encoder.finish().unwrap();

        let mut sink = Recorder::default();
        let total = stream_file(&path, &mut sink).unwrap();
        assert_eq!(total, 8);
        assert_eq!(sink.entries[0].0, "chr");
    }
}
