//! CLI that reads HTML from a file or stdin and prints detected containers
//! and their records as JSON.
//!
//! Usage: `detect_patterns [--statistical] [--min-units N] [--threshold F] [--sequential] [FILE]`
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

use rs_patterns::{detect_bytes_with_options, Options, StrategyKind};
use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

const USAGE: &str =
    "usage: detect_patterns [--statistical] [--min-units N] [--threshold F] [--sequential] [FILE]";

struct Args {
    options: Options,
    path: Option<String>,
}

fn parse_args(raw: &[String]) -> Result<Args, Box<dyn Error>> {
    let mut options = if raw.iter().any(|a| a == "--statistical") {
        Options::statistical()
    } else {
        Options::fingerprint()
    };
    let mut path = None;

    let mut iter = raw.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--statistical" => {}
            "--sequential" => options.parallel = false,
            "--min-units" => {
                let value = iter.next().ok_or(USAGE)?;
                options.min_units = value.parse()?;
            }
            "--threshold" => {
                let value: f64 = iter.next().ok_or(USAGE)?.parse()?;
                match options.strategy {
                    StrategyKind::Fingerprint => options.frequency_threshold = value,
                    StrategyKind::Statistical => options.shared_threshold = value,
                }
            }
            "-h" | "--help" => return Err(USAGE.into()),
            other if other.starts_with('-') => return Err(format!("unknown flag {other}\n{USAGE}").into()),
            other => path = Some(other.to_string()),
        }
    }

    Ok(Args { options, path })
}

fn main() -> Result<(), Box<dyn Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    let raw: Vec<String> = env::args().skip(1).collect();
    let args = parse_args(&raw)?;

    // Read HTML content
    let html = if let Some(path) = &args.path {
        fs::read(path)?
    } else {
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer)?;
        buffer
    };

    let report = detect_bytes_with_options(&html, &args.options)?;
    for warning in &report.warnings {
        tracing::info!("{warning}");
    }

    let output = serde_json::json!({
        "containers": report.containers,
        "instances": report.instances,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
