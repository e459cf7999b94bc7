//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use guestbook_core::{Book, Greeting, Tag};

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

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a single book (with its tag names and recent greetings)
    pub fn print_book(&self, book: &Book, tags: &[Tag], greetings: &[Greeting]) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:        {}", book.id);
                println!("Name:      {}", display_name(&book.name));
                println!("Greetings: {}", book.greeting_count);
                if !tags.is_empty() {
                    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
                    println!("Tags:      {}", names.join(", "));
                }
                println!("Created:   {}", book.created_at.format("%Y-%m-%d %H:%M"));

                // Show recent greetings
                if !greetings.is_empty() {
                    println!();
                    println!("── Greetings ({} shown) ──", greetings.len());
                    for greeting in greetings {
                        println!(
                            "{} | {} | {}",
                            greeting.id,
                            greeting.date.format("%Y-%m-%d %H:%M"),
                            truncate_line(&greeting.content, 60)
                        );
                    }
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "id": book.id,
                        "name": book.name,
                        "greeting_count": book.greeting_count,
                        "created_at": book.created_at,
                        "tags": tags,
                        "greetings": greetings,
                    }))
                    .unwrap()
                );
            }
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
                    println!("No books found.");
                    return;
                }
                for book in books {
                    println!(
                        "{} | {} | {} greeting(s)",
                        book.id,
                        truncate(display_name(&book.name), 40),
                        book.greeting_count
                    );
                }
                println!("\n{} book(s)", books.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(books).unwrap());
            }
            OutputFormat::Quiet => {
                for book in books {
                    println!("{}", book.id);
                }
            }
        }
    }

    /// Print a single greeting
    pub fn print_greeting(&self, greeting: &Greeting) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:   {}", greeting.id);
                println!("Book: {}", greeting.book_id);
                println!("Date: {}", greeting.date.format("%Y-%m-%d %H:%M"));
                println!();
                println!("{}", greeting.content);
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(greeting).unwrap());
            }
            OutputFormat::Quiet => {
                println!("{}", greeting.id);
            }
        }
    }

    /// Print a list of greetings
    pub fn print_greetings(&self, greetings: &[Greeting]) {
        match self.format {
            OutputFormat::Human => {
                if greetings.is_empty() {
                    println!("No greetings found.");
                    return;
                }
                for greeting in greetings {
                    println!(
                        "{} | {} | {}",
                        greeting.id,
                        greeting.date.format("%Y-%m-%d %H:%M"),
                        truncate_line(&greeting.content, 60)
                    );
                }
                println!("\n{} greeting(s)", greetings.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(greetings).unwrap());
            }
            OutputFormat::Quiet => {
                for greeting in greetings {
                    println!("{}", greeting.id);
                }
            }
        }
    }

    /// Print tags with the number of books carrying each
    pub fn print_tags(&self, tags: &[(String, i64)]) {
        match self.format {
            OutputFormat::Human => {
                if tags.is_empty() {
                    println!("No tags found.");
                    return;
                }
                for (name, count) in tags {
                    println!("{} | {} book(s)", name, count);
                }
                println!("\n{} tag(s)", tags.len());
            }
            OutputFormat::Json => {
                let json_tags: Vec<_> = tags
                    .iter()
                    .map(|(name, books)| serde_json::json!({"name": name, "books": books}))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&json_tags).unwrap());
            }
            OutputFormat::Quiet => {
                for (name, _) in tags {
                    println!("{}", name);
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

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }
}

/// Substitute a placeholder for empty book names
fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "(unnamed)"
    } else {
        name
    }
}

/// Truncate a string to max length, adding "..." if truncated
///
/// Counts chars, not bytes: greeting content is arbitrary text.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
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
    fn test_display_name() {
        assert_eq!(display_name("Visitors"), "Visitors");
        assert_eq!(display_name(""), "(unnamed)");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
    }

    #[test]
    fn test_truncate_line() {
        assert_eq!(truncate_line("single line", 20), "single line");
        assert_eq!(truncate_line("line one\nline two", 20), "line one");
        assert_eq!(
            truncate_line("very long single line here", 10),
            "very lo..."
        );
    }
}
