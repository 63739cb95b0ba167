//! Output formatting and styling module.
//!
//! Every user-facing line goes through [`OutputFormatter`], so styling can be
//! changed in one place. Progress lines go to stdout; fatal errors go to stderr.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Prints the run's progress lines with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// ```no_run
    /// use downtidy::output::OutputFormatter;
    /// OutputFormatter::success("Moved: photo.jpg -> Images/photo.jpg");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints a per-file failure in red. Goes to stdout with the other progress lines.
    pub fn failure(message: &str) {
        println!("{} {}", "✗".red(), message);
    }

    /// Prints a fatal error in red on stderr.
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

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar with one tick per file.
    ///
    /// The bar draws on stderr and stays hidden when that is not a terminal.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints a table of file counts per destination folder.
    ///
    /// ```no_run
    /// use downtidy::output::OutputFormatter;
    ///
    /// let counts = vec![("Documents/PDF".to_string(), 3), ("Images".to_string(), 8)];
    /// OutputFormatter::summary_table(&counts, 11);
    /// ```
    pub fn summary_table(counts: &[(String, usize)], total_files: usize) {
        Self::header("SUMMARY");

        let mut rows: Vec<&(String, usize)> = counts.iter().collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        let width = rows
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max("Folder".len());

        println!("{:<width$} | {}", "Folder".bold(), "Files".bold(), width = width);
        println!("{}", "-".repeat(width + 10));
        for (folder, count) in rows {
            println!(
                "{:<width$} | {} {}",
                folder,
                count.to_string().green(),
                plural(*count),
                width = width
            );
        }
        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = width
        );
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
