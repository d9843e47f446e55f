//! Sequence file input
//!
//! Turns FASTA/FASTQ files into a stream of encoded symbols with entry
//! boundaries; see [`fasta::BaseSink`].

pub mod fasta;

pub use fasta::{stream_file, stream_reader, BaseSink};
