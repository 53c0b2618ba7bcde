// Main CLI entry point for qsfuzz
// Uses clap for argument parsing

use clap::{Arg, ArgAction, Command};
use qsfuzz::config::FuzzConfig;
use qsfuzz::engine::EnumerationEngine;
use qsfuzz::enumerator::RenderMode;
use qsfuzz::intake::deduplicate;
use qsfuzz::logging::{init_logging, Verbosity};
use qsfuzz::reporting::{default_report_name, write_candidates, CsvReport};
use std::io;
use std::path::PathBuf;

/// Where to write the CSV report, if anywhere. An explicit path wins over the
/// timestamped default.
fn report_path(output: Option<&String>, csv_report: bool) -> Option<PathBuf> {
    match output {
        Some(path) => Some(PathBuf::from(path)),
        None if csv_report => Some(PathBuf::from(default_report_name())),
        None => None,
    }
}


#[tokio::main]
async fn main() {
    let matches = Command::new("qsfuzz")
        .version(clap::crate_version!())
        .about("Query-string parameter fuzzer: injects rule payloads into URL parameters")
        .after_help("EXAMPLES:\n  cat urls.txt | qsfuzz -c rules.yaml\n  qsfuzz -c rules.json -d -w 50 --csv-report < urls.txt\n\nRule templates may use [[fullurl]], [[domain]] and [[path]] placeholders.")
        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .required(true)
            .num_args(1)
            .help("File path to config file (YAML or JSON), which contains fuzz rules"))
        .arg(Arg::new("decode")
            .short('d')
            .long("decode")
            .action(ArgAction::SetTrue)
            .help("Emit decoded query strings (this could cause many errors/bad requests)"))
        .arg(Arg::new("workers")
            .short('w')
            .long("workers")
            .num_args(1)
            .value_parser(clap::value_parser!(usize))
            .default_value("25")
            .help("Set the concurrency/worker count"))
        .arg(Arg::new("silent")
            .short('s')
            .long("silent")
            .action(ArgAction::SetTrue)
            .help("Only print candidate URLs (status updates go to stderr)"))
        .arg(Arg::new("debug")
            .long("debug")
            .action(ArgAction::SetTrue)
            .help("Debug/verbose mode to print more info for failed/malformed URLs"))
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .num_args(1)
            .help("Also write a CSV report (Rule,Param,Payload,URL) to this path"))
        .arg(Arg::new("csv_report")
            .long("csv-report")
            .action(ArgAction::SetTrue)
            .help("Write a CSV report with a timestamped filename"))
        .get_matches();

    let Some(config_path) = matches.get_one::<String>("config") else {
        eprintln!("config file flag is required");
        std::process::exit(2);
    };
    let mode = RenderMode::from_decode_flag(matches.get_flag("decode"));
    let workers = matches.get_one::<usize>("workers").copied().unwrap_or(25);
    let verbosity = Verbosity::from_flags(matches.get_flag("silent"), matches.get_flag("debug"));
    let report = report_path(matches.get_one::<String>("output"), matches.get_flag("csv_report"));

    init_logging(verbosity);

    let config = FuzzConfig::load(config_path).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {}", e);
        std::process::exit(1);
    });
    tracing::info!(
        "Loaded {} rules ({} injections) from {}",
        config.rules.len(),
        config.injection_count(),
        config_path
    );

    let urls = deduplicate(io::stdin().lock()).unwrap_or_else(|e| {
        eprintln!("Failed to read URLs from stdin: {}", e);
        std::process::exit(1);
    });
    tracing::info!("Fuzzing {} unique URLs with {} workers", urls.len(), workers);

    let mut csv = report.as_ref().map(|path| {
        CsvReport::create(path).unwrap_or_else(|e| {
            eprintln!("Failed to create CSV report {}: {}", path.display(), e);
            std::process::exit(1);
        })
    });

    let engine = EnumerationEngine::new(config, mode, workers);
    let mut batches = engine.stream(urls);
    let mut total = 0usize;

    while let Some(batch) = batches.recv().await {
        total += batch.len();
        if let Err(e) = write_candidates(&batch, io::stdout().lock()) {
            eprintln!("Failed to write candidates: {}", e);
            std::process::exit(1);
        }
        if let Some(csv) = csv.as_mut() {
            if let Err(e) = csv.append(&batch) {
                eprintln!("Failed to write CSV report: {}", e);
                std::process::exit(1);
            }
        }
    }
    tracing::info!("Generated {} candidate URLs", total);

    if let (Some(csv), Some(path)) = (csv, report) {
        match csv.finish() {
            Ok(()) => tracing::info!("CSV report written to {}", path.display()),
            Err(e) => {
                eprintln!("Failed to write CSV report {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }
}
