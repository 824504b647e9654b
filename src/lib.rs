//! Benchmark and cross-check pairwise aligners on a shared corpus.
//!
//! A corpus of `<target> <query>` pairs is aligned end to end by each
//! selected back end under one two-piece affine scoring. The raw operations
//! of every alignment are compressed to a CIGAR, and the average time per
//! alignment is reported per back end.

pub mod aligners;
pub mod bench;
pub mod cigar;
pub mod cli;
pub mod corpus;
pub mod cost_model;
pub mod error;
pub mod generate;
pub mod util;

/// An owned sequence.
pub type Sequence = Vec<u8>;
/// A sequence slice.
pub type Seq<'a> = &'a [u8];

pub use aligners::{Aligner, AlignerType, AlignmentOutcome, Backend, BackendParams};
pub use bench::{BenchConfig, BenchmarkDriver, BenchmarkResult};
pub use cigar::{compress, CompressedCigar};
pub use corpus::{load_corpus, read_corpus, Corpus, SequencePair};
pub use cost_model::{Cost, ScoringConfig};
pub use error::{Error, Result};
