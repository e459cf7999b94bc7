//! Book command handlers

use anyhow::{Context, Result};

use guestbook_core::{Book, BookId, Guestbook};

use crate::output::Output;

/// Create a new book
pub fn create(
    guestbook: &mut Guestbook,
    name: String,
    tags: Vec<String>,
    output: &Output,
) -> Result<()> {
    let mut book = guestbook
        .create_book(&name)
        .context("Failed to create book")?;

    for tag in &tags {
        book = guestbook
            .attach_tag(book.id, tag)
            .with_context(|| format!("Failed to attach tag '{}'", tag))?;
    }

    output.success(&format!("Created book: {}", book.id));
    print_book(guestbook, &book, output)
}

/// List all books
pub fn list(guestbook: &Guestbook, output: &Output) -> Result<()> {
    let books = guestbook.list_books()?;
    output.print_books(&books);
    Ok(())
}

/// Show a single book with its recent greetings
pub fn show(guestbook: &Guestbook, id: String, output: &Output) -> Result<()> {
    let id: BookId = id.parse()?;
    let book = guestbook.fetch_book(id)?;
    print_book(guestbook, &book, output)
}

/// Rename a book
pub fn rename(guestbook: &mut Guestbook, id: String, name: String, output: &Output) -> Result<()> {
    let id: BookId = id.parse()?;
    let book = guestbook
        .rename_book(id, &name)
        .context("Failed to rename book")?;

    output.success(&format!("Renamed book: {}", book.id));
    print_book(guestbook, &book, output)
}

/// Attach a tag to a book
pub fn tag(guestbook: &mut Guestbook, id: String, name: String, output: &Output) -> Result<()> {
    let id: BookId = id.parse()?;
    let book = guestbook
        .attach_tag(id, &name)
        .context("Failed to attach tag")?;

    output.success(&format!("Tagged book: {}", book.id));
    print_book(guestbook, &book, output)
}

/// Print a book along with its tag names and recent greetings
fn print_book(guestbook: &Guestbook, book: &Book, output: &Output) -> Result<()> {
    let tags = guestbook.book_tags(book.id)?;
    let greetings = guestbook.list_greetings(book.id, None)?;
    output.print_book(book, &tags, &greetings);
    Ok(())
}
