//! The errors that end a benchmark run.
//!
//! Every error is fatal: nothing is retried and nothing is downgraded to a
//! warning, since a partially completed sweep gives no comparable numbers.
use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The corpus file could not be opened.
    #[error("cannot open '{}' for reading", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The corpus file could be opened, but reading it failed halfway.
    #[error("failed to read corpus")]
    Read(#[from] io::Error),

    /// A corpus line does not consist of exactly two space separated tokens.
    #[error("'{line}' is not a valid target<space>query pair")]
    Format { line: String },

    /// The raw operations of an aligner are not one operation per column.
    #[error("'{0}' is not a valid unpacked CIGAR")]
    MalformedCigar(String),

    /// An aligner could not align a pair.
    #[error("{backend} failed: {reason}")]
    Backend {
        backend: &'static str,
        reason: String,
    },

    #[error("invalid scoring configuration: {0}")]
    Scoring(String),

    #[error("the number of rounds must be at least 1")]
    NoRounds,

    #[error("cannot write results to '{}'", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot serialize results")]
    Json(#[from] serde_json::Error),
}
