//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use std::collections::BTreeMap;

use serde::Serialize;
use shelf_core::Book;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single book with all of its details
    pub fn print_book(&self, book: &Book) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", book.id);
                println!("Title:    {}", book.title);
                println!("Author:   {}", or_dash(&book.author));
                println!("Category: {}", or_dash(&book.category));
                if let Some(year) = book.year() {
                    println!("Year:     {}", year);
                }
                if let Some(ref cover) = book.cover {
                    println!("Cover:    {}", cover);
                }

                if let Some(ref notes) = book.notes {
                    println!();
                    println!("── Notes ──");
                    println!("{}", notes);
                }
                if let Some(ref summary) = book.summary {
                    println!();
                    println!("── Summary ──");
                    println!("{}", summary);
                }
                if !book.quotes.is_empty() {
                    println!();
                    println!("── Quotes ({}) ──", book.quotes.len());
                    for quote in &book.quotes {
                        println!("  \"{}\"", quote);
                    }
                }

                let links = book.external_links();
                if !links.is_empty() {
                    println!();
                    for (label, url) in links {
                        println!("{} → {}", label, url);
                    }
                }
            }
            OutputFormat::Json => print_json(book),
            OutputFormat::Quiet => {
                println!("{}", book.id);
            }
        }
    }

    /// Print a list of books
    pub fn print_books(&self, books: &[Book]) {
        match self.format {
            OutputFormat::Human => {
                if books.is_empty() {
                    println!("No books found matching your filters.");
                    return;
                }
                for book in books {
                    let year = book
                        .year()
                        .map(|y| y.to_string())
                        .unwrap_or_else(|| "----".to_string());
                    println!(
                        "{:>6} | {} | {} | {}",
                        truncate(book.id.as_str(), 6),
                        year,
                        truncate(&book.title, 35),
                        truncate(&book.author, 25)
                    );
                }
                println!(
                    "\n{} {}",
                    books.len(),
                    if books.len() == 1 { "book" } else { "books" }
                );
            }
            OutputFormat::Json => print_json(&books),
            OutputFormat::Quiet => {
                for book in books {
                    println!("{}", book.id);
                }
            }
        }
    }

    /// Print categories with book counts
    pub fn print_categories(&self, counts: &BTreeMap<String, usize>, total: usize) {
        match self.format {
            OutputFormat::Human => {
                println!("All ({})", total);
                for (name, count) in counts {
                    println!("{} ({})", name, count);
                }
                println!("\n{} category(ies)", counts.len());
            }
            OutputFormat::Json => {
                let json: Vec<_> = counts
                    .iter()
                    .map(|(name, count)| serde_json::json!({"name": name, "count": count}))
                    .collect();
                print_json(&json);
            }
            OutputFormat::Quiet => {
                for name in counts.keys() {
                    println!("{}", name);
                }
            }
        }
    }

    /// Print the year list
    pub fn print_years(&self, years: &[i32]) {
        match self.format {
            OutputFormat::Human => {
                if years.is_empty() {
                    println!("No years found.");
                    return;
                }
                for year in years {
                    println!("{}", year);
                }
            }
            OutputFormat::Json => print_json(&years),
            OutputFormat::Quiet => {
                for year in years {
                    println!("{}", year);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

/// Truncate a string to max characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        assert_eq!(truncate("Città invisibili", 8), "Città...");
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(""), "-");
        assert_eq!(or_dash("Sci-Fi"), "Sci-Fi");
    }
}
