//! sqlreview CLI - SQL review advisor

use sqlreview_cli::cli;
use sqlreview_cli::config;
use sqlreview_cli::input;
use sqlreview_cli::output;

use anyhow::{Context, Result};
use clap::Parser;
use is_terminal::IsTerminal;
use sqlreview_core::{ReviewError, ReviewOptions, ReviewRequest, Reviewer};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use cli::{Args, OutputFormat};
use output::{format_json, format_report, FileReport};

/// Findings at or above the fail-on threshold, or a syntax error.
const EXIT_FAILURE: u8 = 1;
/// Usage or configuration error (bad arguments or rule set, unsupported rule or
/// dialect, unreadable input).
const EXIT_CONFIG_ERROR: u8 = 66;

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // Help and version go to stdout and are not errors.
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(EXIT_CONFIG_ERROR)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_logging(args.verbose);

    match run(args) {
        Ok(failed) => {
            if failed {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("sqlreview: error: {e:#}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .finish();
    // A subscriber may already be installed when embedded; keep the existing one.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Review errors that are not caused by configuration are engine failures.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<ReviewError>() {
        Some(review_err) if !review_err.is_config_error() => EXIT_FAILURE,
        _ => EXIT_CONFIG_ERROR,
    }
}

/// Review every input and write the report. Returns true when any file fails.
fn run(args: Args) -> Result<bool> {
    let started_at = Instant::now();

    let rule_set = config::load_rule_set(args.rules.as_deref())?;
    let sources = input::read_input(&args.files)?;
    let reviewer = Reviewer::builtin()?;
    let dialect = args.dialect.into();
    // A dialect without advisors would pass every script unchecked.
    if !reviewer.registry().supports_dialect(dialect) {
        return Err(ReviewError::UnsupportedDialect(dialect).into());
    }
    let options = ReviewOptions {
        unsupported_rules: args.unsupported.into(),
        max_workers: args.jobs,
        timeout_ms: args.timeout_ms,
        current_database: args.database.clone(),
    };
    debug!(
        files = sources.len(),
        rules = rule_set.rules.len(),
        "starting review"
    );

    let mut reports = Vec::with_capacity(sources.len());
    for source in sources {
        let request = ReviewRequest {
            sql: source.content,
            dialect,
            rules: rule_set.rules.clone(),
            options: options.clone(),
        };
        let report = reviewer
            .review(&request)
            .with_context(|| format!("Failed to review {}", source.name))?;
        reports.push(FileReport {
            file: source.name,
            report,
        });
    }

    let threshold = args.fail_on.threshold();
    let failed = reports.iter().any(|file| file.fails_at(threshold));

    let output_str = match args.format {
        OutputFormat::Json => format_json(&reports, args.compact)?,
        OutputFormat::Table => {
            let colored = args.output.is_none() && io::stdout().is_terminal();
            format_report(
                &reports,
                threshold,
                args.quiet,
                colored,
                started_at.elapsed(),
            )
        }
    };

    write_output(&args.output, &output_str)?;

    Ok(failed)
}

fn write_output(path: &Option<PathBuf>, content: &str) -> Result<()> {
    if let Some(path) = path {
        fs::write(path, content)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    } else {
        let mut stdout = io::stdout();
        stdout
            .write_all(content.as_bytes())
            .context("Failed to write to stdout")?;
        // Ensure newline at end for terminal output
        if !content.ends_with('\n') {
            writeln!(stdout).context("Failed to write to stdout")?;
        }
    }
    Ok(())
}
