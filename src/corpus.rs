//! Loading the `<target> <query>` text corpus.
use std::{
    fmt,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
};

use itertools::Itertools;

use crate::{
    error::{Error, Result},
    Sequence,
};

/// One pair to align. Symbols are opaque bytes; no alphabet is enforced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequencePair {
    pub target: Sequence,
    pub query: Sequence,
}

/// All pairs of a run, in file order.
pub type Corpus = Vec<SequencePair>;

impl SequencePair {
    pub fn new(target: impl Into<Sequence>, query: impl Into<Sequence>) -> Self {
        Self {
            target: target.into(),
            query: query.into(),
        }
    }
}

/// Parses a single line. The line must split on `' '` into exactly two
/// tokens, so leading, trailing and doubled spaces are all rejected.
impl FromStr for SequencePair {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let Some((target, query)) = line.split(' ').collect_tuple() else {
            return Err(Error::Format {
                line: line.to_string(),
            });
        };
        Ok(SequencePair::new(target.as_bytes(), query.as_bytes()))
    }
}

/// Formats the pair as a corpus line.
impl fmt::Display for SequencePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            String::from_utf8_lossy(&self.target),
            String::from_utf8_lossy(&self.query)
        )
    }
}

/// Reads one pair per line. The first bad line aborts loading.
pub fn read_corpus(reader: impl BufRead) -> Result<Corpus> {
    reader
        .lines()
        .map(|line| line?.parse::<SequencePair>())
        .collect()
}

/// Opens and reads the corpus file at `path`.
pub fn load_corpus(path: &Path) -> Result<Corpus> {
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_corpus(BufReader::new(file))
}
