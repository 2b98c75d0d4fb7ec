//! Output formatting and styling module.
//!
//! Every line the CLI prints goes through [`OutputFormatter`], so colors, symbols
//! and table layout live in one place.

use crate::file_category::CategoryTable;
use crate::file_organizer::{ListedFile, PlannedMove, RunStats, group_by_category};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling and formatting.
///
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Progress bars, listings and summary tables
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints an error message in red with an X mark, on stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    pub fn rule() {
        println!("{}", "-".repeat(50));
    }

    /// Creates a progress bar for `total` file moves.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use filesort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.inc(1);
    /// pb.finish_with_message("done");
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Prints the dry-run plan, one line per file.
    pub fn preview(plan: &[PlannedMove]) {
        for planned in plan {
            let renamed = planned
                .destination
                .file_name()
                .map(|name| name.to_string_lossy())
                .filter(|name| *name != planned.file_name);
            match renamed {
                Some(new_name) => println!(
                    "Would move: {} → {}/{}",
                    planned.file_name,
                    planned.category,
                    new_name.yellow()
                ),
                None => println!("Would move: {} → {}/", planned.file_name, planned.category),
            }
        }
    }

    /// Prints a listing grouped by category.
    pub fn listing(listing: &[ListedFile]) {
        let groups = group_by_category(listing);
        for (category, files) in &groups {
            println!("\n{}:", category.bold());
            for file in files {
                println!("  • {}", file);
            }
        }

        println!("\nTotal files: {}", listing.len());
        println!("Categories: {}", groups.len());
    }

    /// Prints a table of file counts per category.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use filesort::output::OutputFormatter;
    ///
    /// let counts = vec![("Documents".to_string(), 15), ("Images".to_string(), 8)];
    /// OutputFormatter::summary_table(&counts, 23);
    /// ```
    pub fn summary_table(category_counts: &[(String, usize)], total_files: usize) {
        Self::header("SUMMARY");

        let max_category_len = category_counts
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = max_category_len
        );
        println!("{}", "-".repeat(max_category_len + 10));

        for (category, count) in category_counts {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural(*count),
                width = max_category_len
            );
        }

        println!("{}", "-".repeat(max_category_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = max_category_len
        );
    }

    /// Prints the end-of-run statistics for an execute run.
    pub fn run_summary(stats: &RunStats, completed_at: &str) {
        println!("\n{}", "=".repeat(50));
        println!("{}", "SORTING COMPLETE!".bold());
        println!("{}", "=".repeat(50));
        println!("Files moved: {}", stats.moved.to_string().green());
        println!("Files skipped: {}", stats.skipped);
        if stats.errors > 0 {
            println!("Errors: {}", stats.errors.to_string().red());
        } else {
            println!("Errors: {}", stats.errors);
        }
        println!("Categories created: {}", stats.categories_used.len());
        if !stats.categories_used.is_empty() {
            println!("Categories: {}", stats.categories().join(", "));
        }
        println!("Completed at: {}", completed_at);
    }

    /// Prints the category table in its configured order.
    pub fn category_table(table: &CategoryTable) {
        Self::header("CATEGORIES");
        for (name, extensions) in table.iter() {
            let extensions: Vec<&str> = extensions.iter().map(String::as_str).collect();
            println!("{:<14} {}", name.bold(), extensions.join(" "));
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
