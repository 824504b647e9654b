//! Command line arguments of `pa-bench`.
use std::{io::Write, path::PathBuf};

use clap::{value_parser, Parser};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::{
    aligners::{banded::DEFAULT_BANDWIDTH, AlignerType, BackendParams},
    bench::BenchConfig,
    cost_model::{Cost, ScoringConfig},
    error::Result,
};

#[derive(Parser, Serialize, Deserialize, Debug)]
#[clap(author, about)]
pub struct Cli {
    /// A .txt file with one `<target> <query>` pair per line.
    #[clap(value_parser = value_parser!(PathBuf))]
    pub input: PathBuf,

    /// Repeat the corpus this many times and report the average time.
    #[arg(short, long, default_value_t = 1, value_parser = value_parser!(u32).range(1..))]
    pub rounds: u32,

    /// Run each aligner once over the corpus before timing it.
    #[arg(long)]
    pub warmup: bool,

    /// Write the results as JSON.
    #[arg(short, long, value_parser = value_parser!(PathBuf))]
    pub output: Option<PathBuf>,

    /// Log more. Pass once for per-pair CIGARs, twice for everything.
    ///
    /// `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[clap(flatten)]
    pub aligners: AlignerArgs,

    #[clap(flatten)]
    pub scoring: ScoringArgs,
}

#[derive(Parser, Serialize, Deserialize, Debug)]
#[clap(next_help_heading = "Algorithms")]
pub struct AlignerArgs {
    /// Do not run MiniWFA.
    #[clap(long = "no-miniwfa", action = clap::ArgAction::SetFalse)]
    pub miniwfa: bool,

    /// Do not run WFA2 through its attribute interface.
    #[clap(long = "no-wfa2", action = clap::ArgAction::SetFalse)]
    pub wfa2: bool,

    /// Also run WFA2 through a per-pair aligner object.
    #[clap(long = "wfa2-object")]
    pub wfa2_object: bool,

    /// Do not run the banded DP.
    #[clap(long = "no-banded", action = clap::ArgAction::SetFalse)]
    pub banded: bool,

    /// Use the wf-adaptive heuristic for WFA2.
    #[clap(long)]
    pub adaptive: bool,

    /// Band width of the banded DP.
    #[clap(long, default_value_t = DEFAULT_BANDWIDTH)]
    pub bandwidth: usize,
}

impl AlignerArgs {
    /// The selected back ends, in benchmark order.
    pub fn selected(&self) -> Vec<AlignerType> {
        AlignerType::ALL
            .into_iter()
            .filter(|t| match t {
                AlignerType::MiniWfa => self.miniwfa,
                AlignerType::Wfa2Native => self.wfa2,
                AlignerType::Wfa2Object => self.wfa2_object,
                AlignerType::BandedDp => self.banded,
            })
            .collect()
    }

    pub fn params(&self) -> BackendParams {
        BackendParams {
            adaptive: self.adaptive,
            bandwidth: self.bandwidth,
        }
    }
}

#[derive(Parser, Serialize, Deserialize, Debug)]
#[clap(next_help_heading = "Scoring")]
pub struct ScoringArgs {
    #[clap(long, default_value_t = 4, allow_negative_numbers = true)]
    pub mismatch: Cost,
    #[clap(long, default_value_t = 6, allow_negative_numbers = true)]
    pub gap_open1: Cost,
    #[clap(long, default_value_t = 2, allow_negative_numbers = true)]
    pub gap_extend1: Cost,
    #[clap(long, default_value_t = 24, allow_negative_numbers = true)]
    pub gap_open2: Cost,
    #[clap(long, default_value_t = 1, allow_negative_numbers = true)]
    pub gap_extend2: Cost,
}

impl ScoringArgs {
    pub fn to_config(&self) -> Result<ScoringConfig> {
        ScoringConfig::new(
            self.mismatch,
            self.gap_open1,
            self.gap_extend1,
            self.gap_open2,
            self.gap_extend2,
        )
    }
}

impl Cli {
    pub fn bench_config(&self) -> BenchConfig {
        BenchConfig {
            rounds: self.rounds,
            warmup: self.warmup,
        }
    }
}

/// Logs to stdout as `| <timestamp> | <LEVEL> | <message>`.
///
/// The level is info, debug or trace for 0, 1 or 2+ `-v` flags, unless
/// `RUST_LOG` is set.
pub fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "| {} | {:<5} | {}",
                buf.timestamp_millis(),
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Stdout)
        .init();
}
