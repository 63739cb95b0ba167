//! Command-line interface module for downtidy.
//!
//! This module handles:
//! - Argument parsing
//! - Resolving the target directory and filter configuration
//! - Driving the organizer and printing one line per file

use crate::config::{ConfigError, FilterConfig, Settings};
use crate::file_category::{CategoryTable, ClassifierError, ExtensionIndex};
use crate::file_organizer::{FileOrganizer, FileOutcome, OrganizeError, OrganizeReport, Organizer};
use crate::output::OutputFormatter;
use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;

/// Sort a downloads folder into category subfolders by file extension.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "downtidy", version, about, long_about = None)]
pub struct Cli {
    /// Directory to organize [default: your Downloads folder]
    pub directory: Option<PathBuf>,

    /// Show where files would go without creating folders or moving anything
    #[arg(long)]
    pub dry_run: bool,

    /// Filter configuration file (TOML) listing files to leave in place
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Problems that stop a run before any file is touched.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Invalid category table: {0}")]
    Classifier(#[from] ClassifierError),
    #[error(transparent)]
    Organize(#[from] OrganizeError),
}

/// Runs one organize pass as described by `cli`.
///
/// # Errors
///
/// Returns an error only for startup failures: no usable target directory, a
/// broken filter configuration, or an invalid category table. Files that fail
/// to move are reported and counted in the returned report instead.
///
/// # Examples
///
/// ```no_run
/// use downtidy::cli::{run_cli, Cli};
/// use std::path::PathBuf;
///
/// let cli = Cli {
///     directory: Some(PathBuf::from("/path/to/directory")),
///     dry_run: true,
///     ..Cli::default()
/// };
/// match run_cli(&cli) {
///     Ok(report) => println!("{} files would move", report.planned()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(cli: &Cli) -> Result<OrganizeReport, CliError> {
    let settings = Settings::resolve(cli.directory.clone())?.with_dry_run(cli.dry_run);
    let filters = FilterConfig::load(cli.config.as_deref())?.compile()?;
    let index = ExtensionIndex::build(&CategoryTable::standard())?;

    OutputFormatter::success(&format!(
        "Categories and extensions mapped ({} extensions).",
        index.len()
    ));
    OutputFormatter::info(&format!(
        "Processing files in: {}",
        settings.target_dir.display()
    ));
    if settings.dry_run {
        OutputFormatter::dry_run_notice("No folders will be created and no files moved.");
    }

    let entries = FileOrganizer::scan(&settings.target_dir)?;
    let file_count = entries.iter().filter(|entry| entry.is_file).count();
    let pb = OutputFormatter::create_progress_bar(file_count as u64);

    let report = Organizer::new(&index, &filters).process(&settings, entries, |outcome| {
        pb.suspend(|| print_outcome(outcome));
        pb.inc(1);
    });
    pb.finish_and_clear();

    print_completion(&settings, &report);
    Ok(report)
}

fn print_outcome(outcome: &FileOutcome) {
    match outcome {
        FileOutcome::Moved { destination, .. } => OutputFormatter::success(&format!(
            "Moved: {} -> {}",
            outcome.file_name(),
            destination.display()
        )),
        FileOutcome::Planned { destination, .. } => OutputFormatter::dry_run_notice(&format!(
            "Would move: {} -> {}",
            outcome.file_name(),
            destination.display()
        )),
        FileOutcome::Skipped { .. } => OutputFormatter::warning(&format!(
            "Skipped (excluded by filters): {}",
            outcome.file_name()
        )),
        FileOutcome::Failed { error, .. } => OutputFormatter::failure(&format!(
            "Error moving {}: {}",
            outcome.file_name(),
            error
        )),
    }
}

fn print_completion(settings: &Settings, report: &OrganizeReport) {
    if settings.dry_run {
        OutputFormatter::plain("\nDry run complete. No files were modified.");
    } else {
        OutputFormatter::plain("\nOrganization complete.");
    }

    let counts = report.counts_by_destination();
    if !counts.is_empty() {
        OutputFormatter::summary_table(&counts, report.moved() + report.planned());
    }

    if report.skipped() > 0 {
        OutputFormatter::warning(&format!(
            "{} file(s) left in place by filters.",
            report.skipped()
        ));
    }
    if !report.is_complete_success() {
        OutputFormatter::warning(&format!(
            "{} file(s) could not be organized. Please review errors above.",
            report.failed()
        ));
    }
}
