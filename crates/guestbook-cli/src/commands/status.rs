//! Status command handler

use anyhow::Result;

use guestbook_core::Guestbook;

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(guestbook: &Guestbook, output: &Output) -> Result<()> {
    let config = guestbook.config();

    let books = guestbook.list_books().unwrap_or_default();
    let book_count = books.len();
    let greeting_count: i64 = books.iter().map(|b| b.greeting_count).sum();
    let tag_count = guestbook.list_tags().map(|t| t.len()).unwrap_or(0);

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "database": config.sqlite_path(),
                    "fetch_limit": config.fetch_limit,
                    "counts": {
                        "books": book_count,
                        "greetings": greeting_count,
                        "tags": tag_count
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.sqlite_path().display());
        }
        OutputFormat::Human => {
            println!("Guestbook Status");
            println!("================");
            println!();
            println!("Storage:");
            println!("  Database: {}", config.sqlite_path().display());
            println!();
            println!("Settings:");
            println!("  Fetch limit: {}", config.fetch_limit);
            println!();
            println!("Contents:");
            println!("  Books:     {}", book_count);
            println!("  Greetings: {}", greeting_count);
            println!("  Tags:      {}", tag_count);
        }
    }

    Ok(())
}
