//! Command-line interface for filesort.
//!
//! This module handles:
//! - Argument parsing
//! - Configuration loading
//! - Running the sorter in the requested mode
//! - Presenting the results, as text or JSON

use crate::config::{ConfigError, SorterConfig};
use crate::file_organizer::{Mode, MoveEvent, SortError, Sorter};
use crate::output::OutputFormatter;
use clap::Parser;
use colored::Colorize;
use indicatif::ProgressBar;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Sort the files of a directory into sub-folders by file type.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about,
    after_help = "Examples:\n  filesort                                # Sort current directory\n  filesort --dry-run                      # Preview what would be sorted\n  filesort --list                         # List file types\n  filesort --source ~/Downloads --target ~/Organized"
)]
pub struct Cli {
    /// Source directory to sort
    #[arg(short, long, default_value = ".")]
    pub source: PathBuf,

    /// Target directory for sorted files (default: same as source)
    #[arg(short, long)]
    pub target: Option<PathBuf>,

    /// Preview changes without moving files
    #[arg(short, long, conflicts_with = "list")]
    pub dry_run: bool,

    /// List files and their detected categories
    #[arg(short, long)]
    pub list: bool,

    /// Configuration file (default: .filesortrc.toml, then ~/.config/filesort/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the category table and exit
    #[arg(long)]
    pub show_categories: bool,

    /// Print one line per file instead of a progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.list {
            Mode::List
        } else if self.dry_run {
            Mode::DryRun
        } else {
            Mode::Execute
        }
    }

    /// Installs the tracing subscriber. Logs go to stderr.
    pub fn setup_logging(&self) {
        let level = if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Errors that end a CLI invocation.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Error loading configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sort(#[from] SortError),

    #[error("Error writing JSON report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Runs the CLI with parsed arguments.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use filesort::cli::{Cli, run_cli};
///
/// let cli = Cli::parse_from(["filesort", "--source", "/path/to/directory", "--dry-run"]);
/// if let Err(e) = run_cli(&cli) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(cli: &Cli) -> Result<(), CliError> {
    let config = SorterConfig::load(cli.config.as_deref())?;
    let sorter = Sorter::new(config.compile()?);

    if cli.show_categories {
        OutputFormatter::category_table(sorter.classifier().table());
        return Ok(());
    }

    let source = absolute(&cli.source);
    let target = cli.target.as_deref().map(absolute);

    if cli.json {
        let report = sorter.run(&source, target.as_deref(), cli.mode())?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let target = target.as_deref().unwrap_or(&source);
    match cli.mode() {
        Mode::List => list_file_types(&sorter, &source),
        Mode::DryRun => preview_sort(&sorter, &source, target),
        Mode::Execute => sort_files(&sorter, &source, target, !cli.no_progress),
    }
}

fn absolute(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn list_file_types(sorter: &Sorter, source: &Path) -> Result<(), CliError> {
    OutputFormatter::info(&format!("File analysis for: {}", source.display()));
    OutputFormatter::rule();

    let listing = sorter.list(source)?;
    if listing.is_empty() {
        OutputFormatter::plain("No files found!");
        return Ok(());
    }

    OutputFormatter::listing(&listing);
    Ok(())
}

fn preview_sort(sorter: &Sorter, source: &Path, target: &Path) -> Result<(), CliError> {
    OutputFormatter::dry_run_notice(&format!("Sorting files in: {}", source.display()));
    OutputFormatter::plain(&format!("Target directory: {}", target.display()));
    OutputFormatter::rule();

    let plan = sorter.dry_run(source, Some(target))?;
    if plan.is_empty() {
        OutputFormatter::plain("No files to sort!");
        return Ok(());
    }

    OutputFormatter::plain(&format!("Found {} files to sort\n", plan.len()));
    OutputFormatter::preview(&plan);

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for planned in &plan {
        *counts.entry(planned.category.to_string()).or_insert(0) += 1;
    }
    OutputFormatter::summary_table(&counts.into_iter().collect::<Vec<_>>(), plan.len());

    println!();
    OutputFormatter::dry_run_notice("No files were modified.");
    Ok(())
}

fn sort_files(
    sorter: &Sorter,
    source: &Path,
    target: &Path,
    show_progress: bool,
) -> Result<(), CliError> {
    OutputFormatter::info(&format!("Sorting files in: {}", source.display()));
    OutputFormatter::plain(&format!("Target directory: {}", target.display()));
    OutputFormatter::rule();

    let mut progress: Option<ProgressBar> = None;
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();

    let stats = sorter.execute_with(source, Some(target), |event: MoveEvent<'_>| {
        if show_progress && progress.is_none() {
            progress = Some(OutputFormatter::create_progress_bar(event.total as u64));
        }

        let line = match event.result {
            Ok(_) => {
                *counts.entry(event.category.to_string()).or_insert(0) += 1;
                format!("{} Moved: {} → {}/", "✓".green(), event.entry.name, event.category)
            }
            Err(e) => format!("{} Error moving {}: {}", "✗".red(), event.entry.name, e),
        };

        match &progress {
            Some(pb) => {
                pb.println(line);
                pb.set_message(event.entry.name.clone());
                pb.inc(1);
            }
            None => println!("{}", line),
        }
    })?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    if stats.eligible == 0 {
        OutputFormatter::plain("No files to sort!");
        return Ok(());
    }

    OutputFormatter::summary_table(&counts.into_iter().collect::<Vec<_>>(), stats.moved);

    if !stats.failures.is_empty() {
        println!();
        OutputFormatter::warning("Some files could not be sorted:");
        for failure in &stats.failures {
            OutputFormatter::plain(&format!("  - {}: {}", failure.file_name, failure.error));
        }
    }

    let completed_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    OutputFormatter::run_summary(&stats, &completed_at);
    Ok(())
}
