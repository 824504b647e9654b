use std::{path::PathBuf, process::Command};

use pa_bench::{
    compress,
    generate::{generate_corpus, write_corpus, ErrorModel, GenerateOptions},
    Aligner, AlignerType, BackendParams, BenchConfig, BenchmarkDriver, ScoringConfig,
    SequencePair,
};

fn temp_file(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("pa-bench-{}-{name}", std::process::id()));
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn every_backend_aligns_the_example() {
    let cm = ScoringConfig::new(4, 6, 2, 24, 1).unwrap();
    let pair = SequencePair::new(*b"AACCGGTT", *b"AACCGTT");
    for adaptive in [false, true] {
        let params = BackendParams {
            adaptive,
            ..BackendParams::default()
        };
        for t in AlignerType::ALL {
            let outcome = t
                .build(&params)
                .align_global(&pair.target, &pair.query, &cm)
                .unwrap();
            let cigar = compress(&outcome.ops).unwrap();
            assert_eq!(cigar.ref_len(), 8, "{} {cigar}", t.name());
            assert_eq!(cigar.query_len(), 7, "{} {cigar}", t.name());
            assert_eq!(outcome.score, Some(8), "{}", t.name());
        }
    }

    let corpus = vec![pair];
    let results = BenchmarkDriver::new(&corpus, &cm, BenchConfig::default())
        .unwrap()
        .run_all(&AlignerType::ALL, &BackendParams::default())
        .unwrap();
    assert_eq!(results.len(), 4);
    for r in results {
        assert!(r.average_nanos_per_alignment >= 0);
        assert_eq!(r.alignments, 1);
        assert!(r.total_cigar_chars > 0);
    }
}

#[test]
fn timing_scales_with_rounds() {
    let opt = GenerateOptions {
        length: 300,
        error_rate: 0.1,
        error_model: ErrorModel::Uniform,
    };
    let corpus = generate_corpus(&opt, 10, 31415);
    let cm = ScoringConfig::default();
    let avg = |rounds| {
        BenchmarkDriver::new(&corpus, &cm, BenchConfig { rounds, warmup: true })
            .unwrap()
            .run_all(&[AlignerType::MiniWfa], &BackendParams::default())
            .unwrap()[0]
            .clone()
    };
    let r = avg(3);
    let r2 = avg(6);
    assert_eq!(r2.alignments, 2 * r.alignments);
    assert_eq!(r2.total_cigar_chars, 2 * r.total_cigar_chars);
    // Averages are within noise of each other; the bound only catches a
    // missing division by the number of rounds.
    let (a, b) = (r.average_nanos_per_alignment, r2.average_nanos_per_alignment);
    let slack = 2_000_000;
    assert!(b <= 4 * a + slack, "{a} vs {b}");
    assert!(a <= 4 * b + slack, "{a} vs {b}");
}

#[test]
fn binary_succeeds_and_writes_json() {
    let opt = GenerateOptions {
        length: 100,
        error_rate: 0.05,
        error_model: ErrorModel::Uniform,
    };
    let mut text = vec![];
    write_corpus(&generate_corpus(&opt, 3, 1), &mut text).unwrap();
    let input = temp_file("ok.txt", std::str::from_utf8(&text).unwrap());
    let output = input.with_extension("json");

    let run = Command::new(env!("CARGO_BIN_EXE_pa-bench"))
        .arg(&input)
        .args(["-r", "2", "-v", "--wfa2-object", "-o"])
        .arg(&output)
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    assert!(run.status.success());
    let stdout = String::from_utf8_lossy(&run.stdout);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let backends = json
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["backend"].as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(
        backends,
        ["MiniWFA", "WFA2-native", "WFA2-object", "Banded-DP"]
    );
    assert!(json[0]["alignments"] == 6);

    // Every line is `| <timestamp> | <LEVEL> | <message>`.
    let messages = stdout
        .lines()
        .map(|line| {
            let fields = line.splitn(4, " | ").collect::<Vec<_>>();
            assert_eq!(fields.len(), 3, "{line}");
            (fields[1].trim(), fields[2])
        })
        .collect::<Vec<_>>();
    assert!(messages.contains(&("INFO", "Number of sequence pairs : 3")), "{stdout}");
    for (i, backend) in backends.iter().enumerate() {
        let time = format!("{backend} time ");
        assert!(
            messages
                .iter()
                .any(|&(level, msg)| level == "INFO" && msg.starts_with(&time)),
            "{stdout}"
        );
        let checksum = format!(
            "{backend} total CIGAR chars {}",
            json[i]["total_cigar_chars"]
        );
        assert!(messages.contains(&("DEBUG", checksum.as_str())), "{stdout}");
        // One `<backend> <score> <cigar>` line per pair of the first round.
        let prefix = format!("{backend} ");
        let per_pair = messages
            .iter()
            .filter(|&&(level, msg)| {
                level == "DEBUG"
                    && msg.strip_prefix(&prefix).map_or(false, |rest| {
                        rest.split(' ').count() == 2
                            && rest.split(' ').all(|f| !f.is_empty())
                            && rest.bytes().next().map_or(false, |c| c.is_ascii_digit())
                    })
            })
            .count();
        assert_eq!(per_pair, 3, "{backend}\n{stdout}");
    }

    std::fs::remove_file(input).unwrap();
    std::fs::remove_file(output).unwrap();
}

#[test]
fn binary_fails_on_bad_input() {
    let missing = std::env::temp_dir().join("pa-bench-does-not-exist.txt");
    let status = Command::new(env!("CARGO_BIN_EXE_pa-bench"))
        .arg(&missing)
        .status()
        .unwrap();
    assert!(!status.success());

    let malformed = temp_file("bad.txt", "ACGT ACGT\nACGT  ACGT\n");
    let output = Command::new(env!("CARGO_BIN_EXE_pa-bench"))
        .arg(&malformed)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("'ACGT  ACGT' is not a valid target<space>query pair"),
        "{stdout}"
    );
    std::fs::remove_file(malformed).unwrap();
}

#[test]
fn binary_rejects_zero_rounds() {
    let input = temp_file("rounds.txt", "ACGT ACGT\n");
    let status = Command::new(env!("CARGO_BIN_EXE_pa-bench"))
        .arg(&input)
        .args(["-r", "0"])
        .status()
        .unwrap();
    assert!(!status.success());
    std::fs::remove_file(input).unwrap();
}
