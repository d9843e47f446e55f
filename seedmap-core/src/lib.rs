//! SeedMap Core Library
//!
//! K-mer seeded mapping of short reads against a single reference sequence:
//! packed sequence storage, read and genome loading, the k-mer index, the
//! genome scan with its per-read hit trackers and top-K scores, and the
//! alignment collaborators used to score and report hits.

pub mod error;
pub mod alphabet;
pub mod packed;
pub mod io;
pub mod genome;
pub mod reads;
pub mod kmer;
pub mod index;
pub mod tracker;
pub mod topk;
pub mod params;
pub mod align;
pub mod scan;
pub mod report;

// Re-export commonly used types and functions
pub use error::{MapError, MapResult};
pub use genome::Genome;
pub use reads::{Read, ReadId, ReadSet, MAX_READ_LEN};
pub use packed::PackedSeq;
pub use index::KmerIndex;
pub use params::{ScanParams, ScoringParams, MAX_KMER_LEN};
pub use align::{AlignStats, BoundedScorer, FullAligner, LocalScorer, TracebackAligner};
pub use scan::{ReadState, ScanStats, Scanner};
pub use report::{AlignmentView, MappingRecord, ReadMappings, Reporter};
pub use topk::{ScoreEntry, TopK};

/// Version information for the SeedMap core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
