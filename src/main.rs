//! questbook: load and check a quest data directory.
//!
//! ```bash
//! # Check a data directory once
//! questbook --data-dir plugins/Quests
//!
//! # Machine-readable report
//! questbook --data-dir plugins/Quests --format json
//!
//! # Keep running and re-check whenever a definition changes
//! questbook --data-dir plugins/Quests --watch
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

use questbook::{Questbook, ReloadEvent, ReloadReport, start_file_watcher};

#[derive(Parser)]
#[command(name = "questbook")]
#[command(version)]
#[command(about = "Load and validate quest definitions")]
struct Cli {
    /// Data directory holding config.toml, categories.toml, quests/ and items/
    #[arg(long, short = 'd', default_value = ".")]
    data_dir: PathBuf,

    /// Settings file (default: <data-dir>/config.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Report format
    #[arg(long, short = 'f', default_value = "text", value_enum)]
    format: OutputFormat,

    /// Reload and report again whenever a definition file changes
    #[arg(long, short = 'w')]
    watch: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

// ============================================================================
// Reporting
// ============================================================================

fn print_report(report: &ReloadReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize report: {}", e),
        },
        OutputFormat::Text => {
            for (path, problems) in report.settings_problems.iter().chain(&report.problems) {
                println!("{}", path);
                for problem in problems {
                    println!("  {}", problem);
                    if !problem.extended_description.is_empty() {
                        println!("      {}", problem.extended_description);
                    }
                }
            }
            println!(
                "{} quests, {} categories, {} items; {} files with problems",
                report.quests,
                report.categories,
                report.items,
                report.files_with_problems()
            );
        }
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("questbook=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let book = match Questbook::open(&cli.data_dir, cli.config.as_deref()) {
        Ok(book) => Arc::new(book),
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = book.reload();
    print_report(&report, cli.format);

    if !cli.watch {
        return if report.has_errors() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    let mut rx = match start_file_watcher(Arc::clone(&book)) {
        Ok(rx) => rx,
        Err(e) => {
            error!("Failed to start quest hot-reload: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("Quest hot-reload enabled, press Ctrl-C to stop");

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(ReloadEvent::Reloaded { trigger, report }) => {
                    info!("Quest hot-reload: {:?}", trigger);
                    print_report(&report, cli.format);
                }
                Some(ReloadEvent::Error(e)) => warn!("Quest hot-reload error: {}", e),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    ExitCode::SUCCESS
}
