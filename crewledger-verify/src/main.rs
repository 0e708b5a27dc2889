#![warn(clippy::uninlined_format_args)]

mod config;
mod export;
mod report;

use std::{borrow::Cow, env, fs, path::Path, process};

use config::VerifyConfig;
use export::TripExport;
use report::TripReport;
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Cow<'static, str>>;

fn main() {
    init_logging();

    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns whether every file verified cleanly.
fn run() -> CliResult<bool> {
    let config = VerifyConfig::from_env(env::args().skip(1));
    let files = config.export_files().map_err(|err| {
        format!(
            "Failed to scan '{}' for exports: {err}",
            config.export_dir.display()
        )
    })?;

    if files.is_empty() {
        return Err(format!(
            "No {}*.json exports found in '{}'",
            config.export_prefix,
            config.export_dir.display()
        )
        .into());
    }

    let mut all_clean = true;
    for path in &files {
        match verify_file(path, &config) {
            Ok(report) => {
                println!("{report}");
                all_clean &= !report.has_failures();
            }
            Err(err) => {
                eprintln!("Error: {err}");
                all_clean = false;
            }
        }
    }

    tracing::debug!(file_count = files.len(), all_clean, "Verification finished");
    Ok(all_clean)
}

fn verify_file(path: &Path, config: &VerifyConfig) -> CliResult<TripReport> {
    let source = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    let export = TripExport::from_json(&source)
        .map_err(|err| format!("{}: {err}", path.display()))?;
    let loaded = export
        .load()
        .map_err(|err| format!("{}: {err}", path.display()))?;

    let title = match export.trip_name() {
        Some(name) => format!("{name} ({})", path.display()),
        None => path.display().to_string(),
    };

    Ok(TripReport::verify(
        title,
        config.currency_symbol.as_str(),
        &export,
        &loaded,
    ))
}
