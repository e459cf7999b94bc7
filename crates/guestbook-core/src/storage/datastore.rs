//! SQLite datastore
//!
//! Typed persistence for books, greetings, and tags. Each book is the root
//! of a consistency group: every greeting operation names the owning book,
//! and greeting ids are allocated per book. Reads scoped to one book see
//! all writes previously acknowledged for that book. Global scans (books,
//! tags) carry no such guarantee and are allowed to lag behind writes.
//!
//! ## Tables
//!
//! - `books` - Book records plus group bookkeeping (greeting count, next id)
//! - `greetings` - Greeting records, keyed (book_id, id) within their book
//! - `tags` - Normalized tag names, at most one row per name
//! - `book_tags` - Book-to-tag junction, attach order in `position`

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};

use crate::config::{Config, ConfigError};
use crate::error::{GuestbookError, Result};
use crate::models::{Book, BookId, Greeting, GreetingId, Tag, TagId};
use crate::storage::schema::{init_schema, needs_init};

/// SQLite-backed datastore for guestbook records
pub struct Datastore {
    conn: Connection,
}

impl Datastore {
    /// Open or create the SQLite database
    pub fn open(config: &Config) -> Result<Self> {
        let path = config.sqlite_path();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(&path)?;

        // Enable foreign keys
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        // Initialize schema if needed
        if needs_init(&conn) {
            init_schema(&conn)?;
        }

        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ==================== Books ====================

    /// Insert a new book, assigning its id and creation time
    pub fn insert_book(&self, name: &str) -> Result<Book> {
        let created_at = Utc::now().timestamp_millis();

        self.conn.execute(
            "INSERT INTO books (name, created_at) VALUES (?, ?)",
            params![name, created_at],
        )?;

        Ok(Book {
            id: BookId(self.conn.last_insert_rowid()),
            name: name.to_string(),
            greeting_count: 0,
            tags: Vec::new(),
            created_at: millis_to_datetime(created_at),
        })
    }

    /// Get a book by id (includes its tag list)
    pub fn get_book(&self, id: BookId) -> Result<Option<Book>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, greeting_count, created_at FROM books WHERE id = ?",
                params![id.0],
                |row| {
                    Ok(BookRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        greeting_count: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()?;

        match row {
            Some(row) => Ok(Some(self.hydrate_book(row)?)),
            None => Ok(None),
        }
    }

    /// Get all books ordered by name
    ///
    /// Books sharing a name are ordered by id, so the scan order is stable.
    pub fn scan_books(&self) -> Result<Vec<Book>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, greeting_count, created_at FROM books ORDER BY name, id",
        )?;

        let book_rows = stmt.query_map([], |row| {
            Ok(BookRow {
                id: row.get(0)?,
                name: row.get(1)?,
                greeting_count: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;

        let mut books = Vec::new();
        for row in book_rows {
            let row = row?;
            let book = self.hydrate_book(row)?;
            books.push(book);
        }

        Ok(books)
    }

    /// Update a book's name
    ///
    /// Updating a book that doesn't exist is an error, not an upsert.
    pub fn update_book_name(&self, id: BookId, name: &str) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE books SET name = ? WHERE id = ?",
            params![name, id.0],
        )?;

        if affected == 0 {
            return Err(GuestbookError::BookNotFound { id });
        }
        Ok(())
    }

    /// Replace a book's tag list, preserving the given order
    pub fn set_book_tags(&mut self, id: BookId, tags: &[TagId]) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM book_tags WHERE book_id = ?", params![id.0])?;
        for (i, tag) in tags.iter().enumerate() {
            tx.execute(
                "INSERT INTO book_tags (book_id, tag_id, position) VALUES (?, ?, ?)",
                params![id.0, tag.0, i as i64],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Get the number of books
    pub fn book_count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))
            .map_err(Into::into)
    }

    // ==================== Greetings ====================

    /// Insert a greeting into a book's group
    ///
    /// Allocates the next greeting id for the book and bumps the book's
    /// denormalized greeting count, all in one transaction. Ids are never
    /// reused, even after deletes.
    pub fn insert_greeting(&mut self, book_id: BookId, content: &str) -> Result<Greeting> {
        let date = Utc::now().timestamp_millis();

        let tx = self.conn.transaction()?;

        let next_id: Option<i64> = tx
            .query_row(
                "SELECT next_greeting_id FROM books WHERE id = ?",
                params![book_id.0],
                |row| row.get(0),
            )
            .optional()?;
        let Some(id) = next_id else {
            return Err(GuestbookError::BookNotFound { id: book_id });
        };

        tx.execute(
            "INSERT INTO greetings (book_id, id, content, date) VALUES (?, ?, ?, ?)",
            params![book_id.0, id, content, date],
        )?;
        tx.execute(
            "UPDATE books SET greeting_count = greeting_count + 1, \
             next_greeting_id = next_greeting_id + 1 WHERE id = ?",
            params![book_id.0],
        )?;

        tx.commit()?;

        Ok(Greeting {
            id: GreetingId(id),
            book_id,
            content: content.to_string(),
            date: millis_to_datetime(date),
        })
    }

    /// Get a greeting by id within its owning book
    pub fn get_greeting(&self, book_id: BookId, id: GreetingId) -> Result<Option<Greeting>> {
        let row = self
            .conn
            .query_row(
                "SELECT book_id, id, content, date FROM greetings \
                 WHERE book_id = ? AND id = ?",
                params![book_id.0, id.0],
                |row| {
                    Ok(GreetingRow {
                        book_id: row.get(0)?,
                        id: row.get(1)?,
                        content: row.get(2)?,
                        date: row.get(3)?,
                    })
                },
            )
            .optional()?;

        Ok(row.map(greeting_from_row))
    }

    /// Get a book's greetings, newest first, capped at `limit`
    ///
    /// Greetings sharing a timestamp are ordered by descending id, so two
    /// greetings written in the same millisecond still come back newest
    /// first.
    pub fn scan_greetings(&self, book_id: BookId, limit: usize) -> Result<Vec<Greeting>> {
        let mut stmt = self.conn.prepare(
            "SELECT book_id, id, content, date FROM greetings \
             WHERE book_id = ? ORDER BY date DESC, id DESC LIMIT ?",
        )?;

        let rows = stmt.query_map(params![book_id.0, limit as i64], |row| {
            Ok(GreetingRow {
                book_id: row.get(0)?,
                id: row.get(1)?,
                content: row.get(2)?,
                date: row.get(3)?,
            })
        })?;

        let mut greetings = Vec::new();
        for row in rows {
            greetings.push(greeting_from_row(row?));
        }

        Ok(greetings)
    }

    /// Delete a greeting from a book's group
    ///
    /// Returns whether a greeting was actually removed. The book's
    /// denormalized count is only decremented when a row was deleted.
    pub fn delete_greeting(&mut self, book_id: BookId, id: GreetingId) -> Result<bool> {
        let tx = self.conn.transaction()?;

        let affected = tx.execute(
            "DELETE FROM greetings WHERE book_id = ? AND id = ?",
            params![book_id.0, id.0],
        )?;
        if affected > 0 {
            tx.execute(
                "UPDATE books SET greeting_count = greeting_count - 1 WHERE id = ?",
                params![book_id.0],
            )?;
        }

        tx.commit()?;
        Ok(affected > 0)
    }

    /// Get a book's stored greeting count
    ///
    /// Reads the denormalized counter, not COUNT(*): listing counts stays
    /// cheap no matter how many greetings a book holds.
    pub fn greeting_count(&self, book_id: BookId) -> Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT greeting_count FROM books WHERE id = ?",
                params![book_id.0],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    // ==================== Tags ====================

    /// Find a tag by exact name
    pub fn find_tag(&self, name: &str) -> Result<Option<Tag>> {
        self.conn
            .query_row(
                "SELECT id, name FROM tags WHERE name = ?",
                params![name],
                |row| {
                    Ok(Tag {
                        id: TagId(row.get(0)?),
                        name: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get the tag with the given name, creating it if absent
    pub fn resolve_tag(&mut self, name: &str) -> Result<Tag> {
        let tx = self.conn.transaction()?;
        let id = get_or_create_tag(&tx, name)?;
        tx.commit()?;

        Ok(Tag {
            id: TagId(id),
            name: name.to_string(),
        })
    }

    /// Get all tags ordered by name
    pub fn all_tags(&self) -> Result<Vec<Tag>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM tags ORDER BY name")?;
        let tags = stmt
            .query_map([], |row| {
                Ok(Tag {
                    id: TagId(row.get(0)?),
                    name: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<Tag>, _>>()?;
        Ok(tags)
    }

    /// Get a book's tags in first-attach order
    pub fn tags_for_book(&self, id: BookId) -> Result<Vec<Tag>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT t.id, t.name FROM tags t
            JOIN book_tags bt ON t.id = bt.tag_id
            WHERE bt.book_id = ?
            ORDER BY bt.position
            "#,
        )?;

        let tags = stmt
            .query_map(params![id.0], |row| {
                Ok(Tag {
                    id: TagId(row.get(0)?),
                    name: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<Tag>, _>>()?;
        Ok(tags)
    }

    /// Get tags with the number of books carrying each
    pub fn tags_with_counts(&self) -> Result<Vec<(String, i64)>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT t.name, COUNT(bt.book_id) as count
            FROM tags t
            LEFT JOIN book_tags bt ON t.id = bt.tag_id
            GROUP BY t.id
            ORDER BY count DESC, t.name
            "#,
        )?;

        let tags = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<(String, i64)>, _>>()?;
        Ok(tags)
    }

    // ==================== Private helpers ====================

    /// Hydrate a book with its tag list
    fn hydrate_book(&self, row: BookRow) -> Result<Book> {
        let tags = self.get_tag_ids_for_book(row.id)?;

        Ok(Book {
            id: BookId(row.id),
            name: row.name,
            greeting_count: row.greeting_count,
            tags,
            created_at: millis_to_datetime(row.created_at),
        })
    }

    fn get_tag_ids_for_book(&self, book_id: i64) -> Result<Vec<TagId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT tag_id FROM book_tags WHERE book_id = ? ORDER BY position")?;

        let tags = stmt
            .query_map(params![book_id], |row| Ok(TagId(row.get(0)?)))?
            .collect::<std::result::Result<Vec<TagId>, _>>()?;
        Ok(tags)
    }
}

// ==================== Internal structs ====================

struct BookRow {
    id: i64,
    name: String,
    greeting_count: i64,
    created_at: i64,
}

struct GreetingRow {
    book_id: i64,
    id: i64,
    content: String,
    date: i64,
}

fn greeting_from_row(row: GreetingRow) -> Greeting {
    Greeting {
        id: GreetingId(row.id),
        book_id: BookId(row.book_id),
        content: row.content,
        date: millis_to_datetime(row.date),
    }
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
}

// ==================== Transaction helpers ====================

/// Get or create a tag by name, returning its ID
///
/// The tags table has a UNIQUE constraint on name, so even a racing
/// caller cannot produce a second row for the same name; the loser's
/// insert fails instead of duplicating.
fn get_or_create_tag(tx: &Transaction, name: &str) -> Result<i64> {
    // Try to get existing tag
    let existing: Option<i64> = tx
        .query_row("SELECT id FROM tags WHERE name = ?", params![name], |row| {
            row.get(0)
        })
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    // Create new tag
    tx.execute("INSERT INTO tags (name) VALUES (?)", params![name])?;
    Ok(tx.last_insert_rowid())
}
