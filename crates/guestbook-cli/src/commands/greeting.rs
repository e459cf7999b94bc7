//! Greeting command handlers

use anyhow::{Context, Result};

use guestbook_core::{BookId, GreetingId, Guestbook};

use crate::output::Output;
use crate::prompt::confirm;

/// Sign a greeting into a book
pub fn create(
    guestbook: &mut Guestbook,
    book_id: String,
    content: String,
    output: &Output,
) -> Result<()> {
    let book_id: BookId = book_id.parse()?;

    let greeting = guestbook
        .add_greeting(book_id, &content)
        .context("Failed to add greeting")?;

    output.success(&format!(
        "Added greeting {} to book {}",
        greeting.id, book_id
    ));
    output.print_greeting(&greeting);

    Ok(())
}

/// List a book's greetings, newest first
pub fn list(
    guestbook: &Guestbook,
    book_id: String,
    limit: Option<usize>,
    output: &Output,
) -> Result<()> {
    let book_id: BookId = book_id.parse()?;

    let greetings = guestbook.list_greetings(book_id, limit)?;
    output.print_greetings(&greetings);

    Ok(())
}

/// Show a single greeting
pub fn show(guestbook: &Guestbook, book_id: String, id: String, output: &Output) -> Result<()> {
    let book_id: BookId = book_id.parse()?;
    let id: GreetingId = id.parse()?;

    let greeting = guestbook.fetch_greeting(book_id, id)?;
    output.print_greeting(&greeting);

    Ok(())
}

/// Delete a greeting from a book
pub fn delete(
    guestbook: &mut Guestbook,
    book_id: String,
    id: String,
    output: &Output,
) -> Result<()> {
    let book_id: BookId = book_id.parse()?;
    let id: GreetingId = id.parse()?;

    // Confirm deletion
    if output.should_prompt() {
        let greeting = guestbook.fetch_greeting(book_id, id)?;
        println!(
            "Delete greeting: {} - {}",
            greeting.id,
            greeting.content.lines().next().unwrap_or("")
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    guestbook
        .delete_greeting(book_id, id)
        .context("Failed to delete greeting")?;

    output.success(&format!("Deleted greeting {} from book {}", id, book_id));

    Ok(())
}
