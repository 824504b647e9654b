//! Writes a random corpus of `<target> <query>` lines.
use std::{
    fs::File,
    io::{self, BufWriter},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use log::{error, info, LevelFilter};
use pa_bench::{
    generate::{generate_corpus, write_corpus, GenerateArgs},
    Error,
};
use rand::Rng;

#[derive(Parser)]
#[clap(next_line_help = false)]
struct Cli {
    /// Location of the output file. Stdout when omitted.
    #[clap(short, long)]
    output: Option<PathBuf>,

    #[clap(flatten)]
    generate_args: GenerateArgs,
}

fn main() -> ExitCode {
    let args = Cli::parse();
    // Stdout may carry the corpus, so log to stderr.
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .format_timestamp(None)
        .format_target(false)
        .init();

    let seed = args.generate_args.seed.unwrap_or_else(|| {
        let seed = rand::thread_rng().gen_range(0..1_000);
        info!("Seed: {seed}");
        seed
    });
    let pairs = generate_corpus(
        &args.generate_args.to_generate_options(),
        args.generate_args.cnt,
        seed,
    );

    let (path, written) = match &args.output {
        Some(path) => (
            path.clone(),
            File::create(path).and_then(|f| write_corpus(&pairs, BufWriter::new(f))),
        ),
        None => (
            PathBuf::from("<stdout>"),
            write_corpus(&pairs, io::stdout().lock()),
        ),
    };
    if let Err(source) = written {
        error!("{}", Error::Output { path, source });
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
