//! Terminal output.
//!
//! All user-facing messages go through [`OutputFormatter`] so that styling stays
//! consistent: coloured status lines, a spinner while a pass runs and a summary
//! table once it is done.

use crate::file_category::{Category, CategoryRegistry};
use crate::file_organizer::ArrangeReport;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Styled terminal output.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a green success line.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints a red error line to stderr.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use arrangify::output::OutputFormatter;
    /// OutputFormatter::error("Folder 'Docs' already exists");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a yellow warning line, for problems that do not stop the command.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints a bold section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a spinner shown while an arrangement runs in the background.
    pub fn create_spinner(message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }

    /// Formats the extension hint of a category, e.g. `(.zip, .rar, .7z)`.
    pub fn extension_hint(registry: &CategoryRegistry, category: Category) -> String {
        format!("({})", registry.extensions(category).join(", "))
    }

    /// Prints every category with its extension hint.
    pub fn category_table(registry: &CategoryRegistry) {
        Self::header("CATEGORIES");
        let width = Category::ALL
            .iter()
            .map(|c| c.id().len())
            .max()
            .unwrap_or(0);
        for category in Category::ALL {
            println!(
                "{:<width$}  {} {}",
                category.id().bold(),
                category.label(),
                Self::extension_hint(registry, category).dimmed(),
                width = width
            );
        }
    }

    /// Prints the outcome of a pass: files per destination folder and what stayed.
    pub fn summary_table(report: &ArrangeReport) {
        Self::header("SUMMARY");

        let counts = report.folder_counts();
        let mut folders: Vec<_> = counts.iter().collect();
        folders.sort_by_key(|&(name, _)| name);

        let width = folders
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max("Left in place".len());

        println!("{:<width$} | {}", "Folder".bold(), "Files".bold(), width = width);
        println!("{}", "-".repeat(width + 10));
        for (folder, count) in &folders {
            println!(
                "{:<width$} | {} {}",
                folder,
                count.to_string().green(),
                plural(**count),
                width = width
            );
        }
        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Moved".bold(),
            report.moved.len().to_string().green().bold(),
            plural(report.moved.len()),
            width = width
        );
        println!(
            "{:<width$} | {} {}",
            "Left in place",
            report.left_in_place.to_string().yellow(),
            plural(report.left_in_place),
            width = width
        );
        if !report.created_dirs.is_empty() {
            println!("\nCreated:");
            for dir in &report.created_dirs {
                println!("  {}", dir.display());
            }
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
