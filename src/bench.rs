//! Timing aligners over a corpus.
use derive_more::AddAssign;
use instant::Instant;
use log::{debug, info, log_enabled, trace, warn, Level};
use serde::{Deserialize, Serialize};

use crate::{
    aligners::{Aligner, AlignerType, BackendParams},
    cigar::compress,
    corpus::SequencePair,
    cost_model::ScoringConfig,
    error::{Error, Result},
    util::pretty_print_nanos,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Number of timed passes over the corpus. At least 1.
    pub rounds: u32,
    /// Do one untimed pass before timing.
    pub warmup: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            rounds: 1,
            warmup: false,
        }
    }
}

/// Where the driver is in benchmarking one aligner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Warming,
    Timing,
    Reporting,
    Done,
}

/// Totals of one timed sweep.
#[derive(Default, Clone, Copy, AddAssign, Debug)]
struct SweepTotals {
    alignments: u64,
    cigar_chars: u64,
}

/// Timing of one aligner over the whole corpus.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub backend: String,
    pub rounds: u32,
    /// `rounds * corpus.len()`.
    pub alignments: u64,
    /// Wall time of all rounds, including CIGAR compression.
    pub total_nanos: u64,
    /// Zero for an empty corpus.
    pub average_nanos_per_alignment: i64,
    /// Sum of the printed CIGAR lengths over all rounds.
    pub total_cigar_chars: i64,
}

pub struct BenchmarkDriver<'a> {
    corpus: &'a [SequencePair],
    cm: ScoringConfig,
    config: BenchConfig,
    phase: Phase,
}

impl<'a> BenchmarkDriver<'a> {
    pub fn new(corpus: &'a [SequencePair], cm: &ScoringConfig, config: BenchConfig) -> Result<Self> {
        if config.rounds == 0 {
            return Err(Error::NoRounds);
        }
        cm.validate()?;
        Ok(Self {
            corpus,
            cm: *cm,
            config,
            phase: Phase::Idle,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn enter(&mut self, name: &str, phase: Phase) {
        trace!("{name}: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    /// Benchmarks a single aligner. The first error aborts the run.
    pub fn run<A: Aligner>(&mut self, aligner: &mut A) -> Result<BenchmarkResult> {
        let name = aligner.name();
        self.enter(name, Phase::Idle);

        if self.config.warmup {
            self.enter(name, Phase::Warming);
            for pair in self.corpus {
                let outcome = aligner.align_global(&pair.target, &pair.query, &self.cm)?;
                compress(&outcome.ops)?;
            }
        }

        self.enter(name, Phase::Timing);
        let mut totals = SweepTotals::default();
        let start = Instant::now();
        for round in 0..self.config.rounds {
            for pair in self.corpus {
                let outcome = aligner.align_global(&pair.target, &pair.query, &self.cm)?;
                let cigar = compress(&outcome.ops)?;
                if round == 0 && log_enabled!(Level::Debug) {
                    match outcome.score {
                        Some(score) => debug!("{name} {score} {cigar}"),
                        None => debug!("{name} - {cigar}"),
                    }
                }
                totals += SweepTotals {
                    alignments: 1,
                    cigar_chars: cigar.char_len() as u64,
                };
            }
        }
        let total_nanos = start.elapsed().as_nanos() as u64;

        self.enter(name, Phase::Reporting);
        let average = if totals.alignments == 0 {
            warn!("{name}: the corpus is empty, nothing was timed");
            0
        } else {
            total_nanos / totals.alignments
        };
        info!("{name} time {}", pretty_print_nanos(average));
        debug!("{name} total CIGAR chars {}", totals.cigar_chars);

        self.enter(name, Phase::Done);
        Ok(BenchmarkResult {
            backend: name.to_string(),
            rounds: self.config.rounds,
            alignments: totals.alignments,
            total_nanos,
            average_nanos_per_alignment: average as i64,
            total_cigar_chars: totals.cigar_chars as i64,
        })
    }

    /// Benchmarks the given back ends one after the other.
    pub fn run_all(
        &mut self,
        backends: &[AlignerType],
        params: &BackendParams,
    ) -> Result<Vec<BenchmarkResult>> {
        backends
            .iter()
            .map(|t| self.run(&mut t.build(params)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{aligners::AlignmentOutcome, Seq};

    /// Returns fixed operations and counts calls.
    struct Fixed {
        ops: &'static [u8],
        calls: usize,
        fail_at: Option<usize>,
    }

    impl Fixed {
        fn new(ops: &'static [u8]) -> Self {
            Fixed {
                ops,
                calls: 0,
                fail_at: None,
            }
        }
    }

    impl Aligner for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn align_global(
            &mut self,
            _target: Seq,
            _query: Seq,
            _cm: &ScoringConfig,
        ) -> Result<AlignmentOutcome> {
            self.calls += 1;
            if self.fail_at == Some(self.calls) {
                return Err(Error::Backend {
                    backend: "fixed",
                    reason: "out of memory".into(),
                });
            }
            Ok(AlignmentOutcome {
                ops: self.ops.to_vec(),
                score: Some(0),
            })
        }
    }

    fn corpus(n: usize) -> Vec<SequencePair> {
        (0..n)
            .map(|_| SequencePair::new(*b"ACGT", *b"ACGT"))
            .collect()
    }

    fn driver(corpus: &[SequencePair], rounds: u32, warmup: bool) -> BenchmarkDriver<'_> {
        BenchmarkDriver::new(corpus, &ScoringConfig::default(), BenchConfig { rounds, warmup })
            .unwrap()
    }

    #[test]
    fn counts_calls_and_cigar_chars() {
        let corpus = corpus(3);
        let mut aligner = Fixed::new(b"MMMMMMMMMMMMIIXDD");
        let mut driver = driver(&corpus, 4, false);
        let result = driver.run(&mut aligner).unwrap();
        assert_eq!(aligner.calls, 12);
        assert_eq!(result.alignments, 12);
        // 12=2I1X2D
        assert_eq!(result.total_cigar_chars, 12 * 9);
        assert_eq!(result.backend, "fixed");
        assert_eq!(result.rounds, 4);
        assert_eq!(
            result.average_nanos_per_alignment,
            (result.total_nanos / 12) as i64
        );
        assert_eq!(driver.phase(), Phase::Done);
    }

    #[test]
    fn warmup_is_one_extra_pass() {
        let corpus = corpus(5);
        let mut aligner = Fixed::new(b"MM");
        let result = driver(&corpus, 2, true).run(&mut aligner).unwrap();
        assert_eq!(aligner.calls, 5 + 10);
        assert_eq!(result.alignments, 10);
    }

    #[test]
    fn malformed_cigar_aborts() {
        let corpus = corpus(3);
        let mut aligner = Fixed::new(b"M3I");
        let mut driver = driver(&corpus, 2, false);
        let err = driver.run(&mut aligner).unwrap_err();
        assert!(matches!(err, Error::MalformedCigar(_)));
        assert_eq!(aligner.calls, 1);
        assert_eq!(driver.phase(), Phase::Timing);
    }

    #[test]
    fn backend_error_aborts() {
        let corpus = corpus(3);
        let mut aligner = Fixed::new(b"MM");
        aligner.fail_at = Some(2);
        let err = driver(&corpus, 1, true).run(&mut aligner).unwrap_err();
        assert_eq!(err.to_string(), "fixed failed: out of memory");
        assert_eq!(aligner.calls, 2);
    }

    #[test]
    fn zero_rounds_is_rejected() {
        let corpus = corpus(1);
        let r = BenchmarkDriver::new(
            &corpus,
            &ScoringConfig::default(),
            BenchConfig {
                rounds: 0,
                warmup: false,
            },
        );
        assert!(matches!(r, Err(Error::NoRounds)));
    }

    #[test]
    fn negative_scoring_is_rejected() {
        let corpus = corpus(1);
        let cm = ScoringConfig {
            mismatch: -1,
            ..ScoringConfig::default()
        };
        let r = BenchmarkDriver::new(&corpus, &cm, BenchConfig::default());
        assert!(matches!(r, Err(Error::Scoring(_))));
    }

    #[test]
    fn empty_corpus_has_zero_average() {
        let mut aligner = Fixed::new(b"M");
        let result = driver(&[], 3, true).run(&mut aligner).unwrap();
        assert_eq!(aligner.calls, 0);
        assert_eq!(result.alignments, 0);
        assert_eq!(result.average_nanos_per_alignment, 0);
        assert_eq!(result.total_cigar_chars, 0);
    }

    #[test]
    fn all_backends_in_order() {
        let corpus = vec![
            SequencePair::new(*b"AACCGGTT", *b"AACCGTT"),
            SequencePair::new(*b"ACGTACGT", *b"ACGAACGT"),
        ];
        let results = driver(&corpus, 1, false)
            .run_all(&AlignerType::ALL, &BackendParams::default())
            .unwrap();
        assert_eq!(
            results.iter().map(|r| r.backend.as_str()).collect::<Vec<_>>(),
            ["MiniWFA", "WFA2-native", "WFA2-object", "Banded-DP"]
        );
        assert!(results.iter().all(|r| r.alignments == 2));
    }

    #[test]
    fn result_json() {
        let result = BenchmarkResult {
            backend: "MiniWFA".into(),
            rounds: 2,
            alignments: 4,
            total_nanos: 1000,
            average_nanos_per_alignment: 250,
            total_cigar_chars: 40,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"backend":"MiniWFA","rounds":2,"alignments":4,"total_nanos":1000,"average_nanos_per_alignment":250,"total_cigar_chars":40}"#
        );
        assert_eq!(serde_json::from_str::<BenchmarkResult>(&json).unwrap(), result);
    }
}
