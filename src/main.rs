//! Command-line front end for the verification pipeline
//!
//! Thin by design: argument parsing, logging setup, report writing and
//! exit codes live here; everything else is the library.

use std::path::PathBuf;
use std::process;

use clap::{Arg, ArgAction, Command};
use tracing::{error, info};
use veridoc::{Pipeline, ReportFormat, VerdictClass, VerifierConfig};

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();

    init_logging(matches.get_count("verbose"));

    let input = PathBuf::from(matches.get_one::<String>("input").unwrap());
    let out = matches.get_one::<String>("out").map(PathBuf::from);
    let text_format = matches.get_flag("text");

    let mut config = VerifierConfig::new();
    if let Some(terms_path) = matches.get_one::<String>("terms") {
        match load_terms(terms_path) {
            Ok(terms) => config.text.suspicious_terms = terms,
            Err(e) => {
                error!("failed to load terms file: {e}");
                process::exit(2);
            }
        }
    }

    let pipeline = match Pipeline::with_detected_capabilities(config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!("invalid configuration: {e}");
            process::exit(2);
        }
    };

    let verdict = match pipeline.run(&input).await {
        Ok(verdict) => verdict,
        Err(e) => {
            error!("verification failed: {e}");
            process::exit(2);
        }
    };

    let format = if text_format {
        ReportFormat::PlainText
    } else {
        ReportFormat::Json
    };

    if let Some(out_path) = out {
        if let Err(e) = veridoc::report::write_report(&verdict, &out_path, format) {
            error!("failed to write report: {e}");
            process::exit(2);
        }
        info!("report written to {}", out_path.display());
        println!("{}", veridoc::report::render_summary(&verdict));
    } else {
        let rendered = match format {
            ReportFormat::Json => veridoc::report::to_json(&verdict).unwrap_or_default(),
            ReportFormat::PlainText => veridoc::report::render_summary(&verdict),
        };
        println!("{rendered}");
    }

    match verdict.classification {
        VerdictClass::Ok => process::exit(0),
        VerdictClass::Suspect => process::exit(1),
    }
}

fn build_cli() -> Command {
    Command::new("veridoc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("First-pass tampering triage for PDF and word-processing documents")
        .arg(
            Arg::new("input")
                .value_name("FILE")
                .help("Document to analyze (PDF or word package)")
                .required(true),
        )
        .arg(
            Arg::new("out")
                .short('o')
                .long("out")
                .value_name("FILE")
                .help("Write the report to this path"),
        )
        .arg(
            Arg::new("terms")
                .long("terms")
                .value_name("FILE")
                .help("Newline-separated suspicious-term list replacing the default"),
        )
        .arg(
            Arg::new("text")
                .long("text")
                .action(ArgAction::SetTrue)
                .help("Plain-text report instead of JSON"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase logging verbosity (-v, -vv)"),
        )
}

fn init_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbosity {
        0 => "veridoc=warn",
        1 => "veridoc=info",
        _ => "veridoc=debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .compact()
        .init();
}

fn load_terms(path: &str) -> std::io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect())
}
