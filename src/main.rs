use std::{
    fs::File,
    io::{BufWriter, Write},
    process::ExitCode,
};

use clap::Parser;
use log::{error, info};
use pa_bench::{
    bench::BenchmarkResult,
    cli::{init_logger, Cli},
    load_corpus, BenchmarkDriver, Error, Result,
};

fn run(args: &Cli) -> Result<Vec<BenchmarkResult>> {
    let corpus = load_corpus(&args.input)?;
    info!("Number of sequence pairs : {}", corpus.len());

    let cm = args.scoring.to_config()?;
    let mut driver = BenchmarkDriver::new(&corpus, &cm, args.bench_config())?;
    let results = driver.run_all(&args.aligners.selected(), &args.aligners.params())?;

    if let Some(path) = &args.output {
        let output_err = |source| Error::Output {
            path: path.clone(),
            source,
        };
        let mut w = BufWriter::new(File::create(path).map_err(output_err)?);
        serde_json::to_writer_pretty(&mut w, &results)?;
        w.flush().map_err(output_err)?;
        info!("Wrote results to {}", path.display());
    }
    Ok(results)
}

fn main() -> ExitCode {
    let args = Cli::parse();
    init_logger(args.verbose);

    match run(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            let mut source = std::error::Error::source(&e);
            while let Some(s) = source {
                error!("  caused by: {s}");
                source = s.source();
            }
            ExitCode::FAILURE
        }
    }
}
