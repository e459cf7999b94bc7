//! Unified guestbook interface
//!
//! The `Guestbook` is the entry point for callers: it owns the datastore
//! and layers the service rules on top of it (input validation, typed
//! not-found errors, the greeting listing cap).
//!
//! ## Consistency
//!
//! Each book is a consistency group. A greeting listing scoped to one book
//! reflects every previously acknowledged write to that book. Global
//! listings (books, tags) make no such promise and may lag behind writes.
//!
//! ## Usage
//!
//! ```ignore
//! let mut guestbook = Guestbook::open()?;  // Creates or loads existing
//!
//! let book = guestbook.create_book("Visitors")?;
//! guestbook.add_greeting(book.id, "Hello!")?;
//!
//! // Newest first, capped at the configured fetch limit
//! let greetings = guestbook.list_greetings(book.id, None)?;
//! ```

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{GuestbookError, Result};
use crate::models::{Book, BookId, Greeting, GreetingId, Tag};
use crate::storage::Datastore;

/// Unified guestbook interface
///
/// Manages books, their greetings, and the shared tag records.
pub struct Guestbook {
    /// SQLite datastore
    store: Datastore,
    /// Configuration
    config: Config,
}

impl Guestbook {
    /// Open the guestbook, creating the database if none exists
    pub fn open() -> Result<Self> {
        let config = Config::load()?;
        Self::open_with_config(config)
    }

    /// Open the guestbook with a specific configuration
    pub fn open_with_config(config: Config) -> Result<Self> {
        let store = Datastore::open(&config)?;
        Ok(Self { store, config })
    }

    /// Open an in-memory guestbook (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            store: Datastore::open_in_memory()?,
            config: Config::default(),
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // ==================== Book Operations ====================

    /// Create a new book
    ///
    /// Names are free text: empty names are allowed, and two books may
    /// share a name while staying distinct records.
    pub fn create_book(&mut self, name: &str) -> Result<Book> {
        let book = self.store.insert_book(name)?;
        info!("Created book {}", book.id);
        Ok(book)
    }

    /// Get all books, ordered by name
    ///
    /// Each book carries its stored greeting count, so listing books never
    /// scans greetings.
    pub fn list_books(&self) -> Result<Vec<Book>> {
        self.store.scan_books()
    }

    /// Get a book by id
    ///
    /// Unlike the listing operations, a point lookup of a missing book is
    /// an error.
    pub fn fetch_book(&self, id: BookId) -> Result<Book> {
        self.store
            .get_book(id)?
            .ok_or(GuestbookError::BookNotFound { id })
    }

    /// Rename a book, returning the updated record
    ///
    /// Renaming never touches the book's greetings; they stay grouped
    /// under the same id.
    pub fn rename_book(&mut self, id: BookId, name: &str) -> Result<Book> {
        self.store.update_book_name(id, name)?;
        info!("Renamed book {}", id);
        self.fetch_book(id)
    }

    /// Get a book's tags in first-attach order
    ///
    /// A missing book yields an empty list, like any other scoped listing.
    pub fn book_tags(&self, id: BookId) -> Result<Vec<Tag>> {
        self.store.tags_for_book(id)
    }

    // ==================== Greeting Operations ====================

    /// Sign a greeting into a book
    ///
    /// Content is stored raw; escaping for display is the renderer's job.
    /// The greeting is immediately visible to listings scoped to this book.
    pub fn add_greeting(&mut self, book_id: BookId, content: &str) -> Result<Greeting> {
        let greeting = self.store.insert_greeting(book_id, content)?;
        info!("Added greeting {} to book {}", greeting.id, book_id);
        Ok(greeting)
    }

    /// Get a single greeting from a book
    pub fn fetch_greeting(&self, book_id: BookId, id: GreetingId) -> Result<Greeting> {
        self.store
            .get_greeting(book_id, id)?
            .ok_or(GuestbookError::GreetingNotFound { book_id, id })
    }

    /// Get a book's greetings, newest first
    ///
    /// Returns at most `limit` greetings; `None` falls back to the
    /// configured fetch limit. A missing book yields an empty list.
    pub fn list_greetings(&self, book_id: BookId, limit: Option<usize>) -> Result<Vec<Greeting>> {
        let limit = limit.unwrap_or(self.config.fetch_limit);
        self.store.scan_greetings(book_id, limit)
    }

    /// Remove a greeting from a book
    ///
    /// Deleting a greeting that doesn't exist is an error, and leaves the
    /// book's greeting count untouched.
    pub fn delete_greeting(&mut self, book_id: BookId, id: GreetingId) -> Result<()> {
        if !self.store.delete_greeting(book_id, id)? {
            return Err(GuestbookError::GreetingNotFound { book_id, id });
        }
        info!("Deleted greeting {} from book {}", id, book_id);
        Ok(())
    }

    /// Get a book's stored greeting count
    pub fn greeting_count(&self, book_id: BookId) -> Result<i64> {
        self.store
            .greeting_count(book_id)?
            .ok_or(GuestbookError::BookNotFound { id: book_id })
    }

    // ==================== Tag Operations ====================

    /// Attach a tag to a book, returning the updated book
    ///
    /// The tag record is created on first use and shared afterwards: for a
    /// given name at most one tag ever exists. Attaching an
    /// already-attached tag changes nothing; the book's tag list keeps
    /// first-attach order. Names are matched exactly after trimming
    /// surrounding whitespace.
    pub fn attach_tag(&mut self, id: BookId, name: &str) -> Result<Book> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GuestbookError::Validation {
                field: "tag name",
                reason: "must not be empty".to_string(),
            });
        }

        let mut book = self.fetch_book(id)?;
        let tag = self.store.resolve_tag(name)?;
        book.add_tag(tag.id);
        self.store.set_book_tags(id, &book.tags)?;

        debug!("Attached tag '{}' to book {}", tag.name, id);
        Ok(book)
    }

    /// Get all tags, ordered by name
    pub fn list_tags(&self) -> Result<Vec<Tag>> {
        self.store.all_tags()
    }

    /// Get tags with the number of books carrying each
    pub fn tag_usage(&self) -> Result<Vec<(String, i64)>> {
        self.store.tags_with_counts()
    }

    // ==================== Stats ====================

    /// Get count of books
    pub fn book_count(&self) -> Result<i64> {
        self.store.book_count()
    }

    // ==================== Advanced ====================

    /// Get access to the underlying datastore
    pub fn datastore(&self) -> &Datastore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            fetch_limit: 20,
        }
    }

    fn open_guestbook() -> Guestbook {
        Guestbook::open_in_memory().unwrap()
    }

    #[test]
    fn test_create_and_fetch_book() {
        let mut guestbook = open_guestbook();

        let book = guestbook.create_book("Visitors").unwrap();
        assert_eq!(book.name, "Visitors");
        assert_eq!(book.greeting_count, 0);

        let fetched = guestbook.fetch_book(book.id).unwrap();
        assert_eq!(fetched, book);
    }

    #[test]
    fn test_create_book_allows_duplicate_names() {
        let mut guestbook = open_guestbook();

        let first = guestbook.create_book("Visitors").unwrap();
        let second = guestbook.create_book("Visitors").unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(guestbook.book_count().unwrap(), 2);
    }

    #[test]
    fn test_create_book_allows_empty_name() {
        let mut guestbook = open_guestbook();

        let book = guestbook.create_book("").unwrap();
        assert_eq!(guestbook.fetch_book(book.id).unwrap().name, "");
    }

    #[test]
    fn test_fetch_missing_book() {
        let guestbook = open_guestbook();

        let err = guestbook.fetch_book(BookId(404)).unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(
            err,
            GuestbookError::BookNotFound { id: BookId(404) }
        ));
    }

    #[test]
    fn test_list_books_sorted_by_name() {
        let mut guestbook = open_guestbook();

        guestbook.create_book("mellow").unwrap();
        guestbook.create_book("alpha").unwrap();
        guestbook.create_book("zeal").unwrap();

        let names: Vec<String> = guestbook
            .list_books()
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["alpha", "mellow", "zeal"]);
    }

    #[test]
    fn test_list_books_carries_greeting_counts() {
        let mut guestbook = open_guestbook();

        let busy = guestbook.create_book("busy").unwrap();
        guestbook.create_book("quiet").unwrap();
        guestbook.add_greeting(busy.id, "one").unwrap();
        guestbook.add_greeting(busy.id, "two").unwrap();

        let books = guestbook.list_books().unwrap();
        let counts: Vec<(String, i64)> = books
            .into_iter()
            .map(|b| (b.name, b.greeting_count))
            .collect();
        assert_eq!(
            counts,
            vec![("busy".to_string(), 2), ("quiet".to_string(), 0)]
        );
    }

    #[test]
    fn test_rename_book_visible_in_listing() {
        let mut guestbook = open_guestbook();

        let book = guestbook.create_book("aardvark").unwrap();
        guestbook.create_book("beetle").unwrap();

        let renamed = guestbook.rename_book(book.id, "zebra").unwrap();
        assert_eq!(renamed.id, book.id);
        assert_eq!(renamed.name, "zebra");

        // The listing re-sorts under the new name
        let names: Vec<String> = guestbook
            .list_books()
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["beetle", "zebra"]);
    }

    #[test]
    fn test_rename_keeps_greetings_grouped() {
        let mut guestbook = open_guestbook();

        let book = guestbook.create_book("before").unwrap();
        guestbook.add_greeting(book.id, "hello").unwrap();

        guestbook.rename_book(book.id, "after").unwrap();

        let greetings = guestbook.list_greetings(book.id, None).unwrap();
        assert_eq!(greetings.len(), 1);
        assert_eq!(guestbook.greeting_count(book.id).unwrap(), 1);
    }

    #[test]
    fn test_rename_missing_book() {
        let mut guestbook = open_guestbook();

        let err = guestbook.rename_book(BookId(9), "anything").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_add_greeting_immediately_listed() {
        let mut guestbook = open_guestbook();

        let book = guestbook.create_book("guests").unwrap();
        let greeting = guestbook.add_greeting(book.id, "just signed").unwrap();

        // A listing scoped to the book sees the acknowledged write
        let greetings = guestbook.list_greetings(book.id, None).unwrap();
        assert_eq!(greetings, vec![greeting]);
    }

    #[test]
    fn test_add_greeting_missing_book() {
        let mut guestbook = open_guestbook();

        let err = guestbook.add_greeting(BookId(5), "hello").unwrap_err();
        assert!(matches!(err, GuestbookError::BookNotFound { id: BookId(5) }));
    }

    #[test]
    fn test_add_greeting_content_stored_raw() {
        let mut guestbook = open_guestbook();

        let book = guestbook.create_book("guests").unwrap();
        let content = "<script>alert('hi')</script> & 'quotes'";
        let greeting = guestbook.add_greeting(book.id, content).unwrap();

        let fetched = guestbook.fetch_greeting(book.id, greeting.id).unwrap();
        assert_eq!(fetched.content, content);
    }

    #[test]
    fn test_list_greetings_newest_first() {
        let mut guestbook = open_guestbook();

        let book = guestbook.create_book("guests").unwrap();
        guestbook.add_greeting(book.id, "first").unwrap();
        guestbook.add_greeting(book.id, "second").unwrap();
        guestbook.add_greeting(book.id, "third").unwrap();

        let contents: Vec<String> = guestbook
            .list_greetings(book.id, None)
            .unwrap()
            .into_iter()
            .map(|g| g.content)
            .collect();
        assert_eq!(contents, vec!["third", "second", "first"]);
    }

    #[test]
    fn test_list_greetings_ordered_by_date() {
        let mut guestbook = open_guestbook();

        let book = guestbook.create_book("guests").unwrap();
        let g1 = guestbook.add_greeting(book.id, "written first").unwrap();
        guestbook.add_greeting(book.id, "written second").unwrap();

        // Push the first write's date past the second; date ordering wins
        // over insertion order
        guestbook
            .datastore()
            .connection()
            .execute(
                "UPDATE greetings SET date = date + 60000 WHERE book_id = ? AND id = ?",
                params![book.id.0, g1.id.0],
            )
            .unwrap();

        let contents: Vec<String> = guestbook
            .list_greetings(book.id, None)
            .unwrap()
            .into_iter()
            .map(|g| g.content)
            .collect();
        assert_eq!(contents, vec!["written first", "written second"]);
    }

    #[test]
    fn test_list_greetings_caps_at_limit() {
        let mut guestbook = open_guestbook();

        let book = guestbook.create_book("guests").unwrap();
        for i in 0..25 {
            guestbook
                .add_greeting(book.id, &format!("entry {}", i))
                .unwrap();
        }

        // Default limit comes from the config
        assert_eq!(guestbook.list_greetings(book.id, None).unwrap().len(), 20);

        // An explicit limit overrides it, keeping newest first
        let two = guestbook.list_greetings(book.id, Some(2)).unwrap();
        assert_eq!(two.len(), 2);
        assert_eq!(two[0].content, "entry 24");
        assert_eq!(two[1].content, "entry 23");
    }

    #[test]
    fn test_list_greetings_limit_from_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            fetch_limit: 3,
            ..test_config(&temp_dir)
        };
        let mut guestbook = Guestbook::open_with_config(config).unwrap();

        let book = guestbook.create_book("guests").unwrap();
        for i in 0..5 {
            guestbook
                .add_greeting(book.id, &format!("entry {}", i))
                .unwrap();
        }

        assert_eq!(guestbook.list_greetings(book.id, None).unwrap().len(), 3);
    }

    #[test]
    fn test_list_greetings_missing_book_is_empty() {
        let guestbook = open_guestbook();
        assert!(guestbook
            .list_greetings(BookId(77), None)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_fetch_greeting_missing() {
        let mut guestbook = open_guestbook();

        let book = guestbook.create_book("guests").unwrap();
        let err = guestbook
            .fetch_greeting(book.id, GreetingId(1))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_greeting() {
        let mut guestbook = open_guestbook();

        let book = guestbook.create_book("guests").unwrap();
        let greeting = guestbook.add_greeting(book.id, "bye").unwrap();

        guestbook.delete_greeting(book.id, greeting.id).unwrap();

        assert!(guestbook.list_greetings(book.id, None).unwrap().is_empty());
        assert_eq!(guestbook.greeting_count(book.id).unwrap(), 0);
    }

    #[test]
    fn test_delete_missing_greeting_is_not_found() {
        let mut guestbook = open_guestbook();

        let book = guestbook.create_book("guests").unwrap();
        guestbook.add_greeting(book.id, "staying").unwrap();

        let err = guestbook
            .delete_greeting(book.id, GreetingId(42))
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(err, GuestbookError::GreetingNotFound { .. }));

        // The failed delete left the book untouched
        assert_eq!(guestbook.greeting_count(book.id).unwrap(), 1);
        assert_eq!(guestbook.list_greetings(book.id, None).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_is_scoped_to_the_book() {
        let mut guestbook = open_guestbook();

        let a = guestbook.create_book("a").unwrap();
        let b = guestbook.create_book("b").unwrap();
        let in_a = guestbook.add_greeting(a.id, "in a").unwrap();

        // Greeting 1 exists in book a, not in book b
        let err = guestbook.delete_greeting(b.id, in_a.id).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(guestbook.greeting_count(a.id).unwrap(), 1);
    }

    #[test]
    fn test_greeting_ids_independent_per_book() {
        let mut guestbook = open_guestbook();

        let a = guestbook.create_book("a").unwrap();
        let b = guestbook.create_book("b").unwrap();

        let ga = guestbook.add_greeting(a.id, "for a").unwrap();
        let gb = guestbook.add_greeting(b.id, "for b").unwrap();
        assert_eq!(ga.id, gb.id);

        assert_eq!(
            guestbook.fetch_greeting(a.id, ga.id).unwrap().content,
            "for a"
        );
        assert_eq!(
            guestbook.fetch_greeting(b.id, gb.id).unwrap().content,
            "for b"
        );
    }

    #[test]
    fn test_greeting_count_missing_book() {
        let guestbook = open_guestbook();
        let err = guestbook.greeting_count(BookId(3)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_attach_tag_creates_once() {
        let mut guestbook = open_guestbook();

        let first = guestbook.create_book("first").unwrap();
        let second = guestbook.create_book("second").unwrap();

        let first = guestbook.attach_tag(first.id, "family").unwrap();
        let second = guestbook.attach_tag(second.id, "family").unwrap();

        // Both books reference the same tag record
        assert_eq!(first.tags, second.tags);
        assert_eq!(guestbook.list_tags().unwrap().len(), 1);
    }

    #[test]
    fn test_attach_tag_duplicate_keeps_order() {
        let mut guestbook = open_guestbook();

        let book = guestbook.create_book("tagged").unwrap();
        guestbook.attach_tag(book.id, "summer").unwrap();
        guestbook.attach_tag(book.id, "beach").unwrap();
        let book = guestbook.attach_tag(book.id, "summer").unwrap();

        // Re-attaching keeps the first occurrence and its position
        let names: Vec<String> = guestbook
            .book_tags(book.id)
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["summer", "beach"]);
        assert_eq!(book.tags.len(), 2);
    }

    #[test]
    fn test_attach_tag_trims_whitespace() {
        let mut guestbook = open_guestbook();

        let book = guestbook.create_book("tagged").unwrap();
        guestbook.attach_tag(book.id, "  rust ").unwrap();
        let book = guestbook.attach_tag(book.id, "rust").unwrap();

        assert_eq!(book.tags.len(), 1);
        assert_eq!(guestbook.list_tags().unwrap()[0].name, "rust");
    }

    #[test]
    fn test_attach_tag_rejects_blank_names() {
        let mut guestbook = open_guestbook();

        let book = guestbook.create_book("tagged").unwrap();

        for name in ["", "   ", "\t\n"] {
            let err = guestbook.attach_tag(book.id, name).unwrap_err();
            assert!(matches!(err, GuestbookError::Validation { .. }));
        }

        // Nothing was stored
        assert!(guestbook.list_tags().unwrap().is_empty());
        assert!(guestbook.book_tags(book.id).unwrap().is_empty());
    }

    #[test]
    fn test_attach_tag_missing_book() {
        let mut guestbook = open_guestbook();

        let err = guestbook.attach_tag(BookId(8), "lost").unwrap_err();
        assert!(err.is_not_found());

        // The tag was not created for a book that doesn't exist
        assert!(guestbook.list_tags().unwrap().is_empty());
    }

    #[test]
    fn test_tag_usage() {
        let mut guestbook = open_guestbook();

        let a = guestbook.create_book("a").unwrap();
        let b = guestbook.create_book("b").unwrap();
        guestbook.attach_tag(a.id, "shared").unwrap();
        guestbook.attach_tag(b.id, "shared").unwrap();
        guestbook.attach_tag(a.id, "solo").unwrap();

        let usage = guestbook.tag_usage().unwrap();
        assert_eq!(
            usage,
            vec![("shared".to_string(), 2), ("solo".to_string(), 1)]
        );
    }

    #[test]
    fn test_list_tags_ordered_by_name() {
        let mut guestbook = open_guestbook();

        let book = guestbook.create_book("tagged").unwrap();
        guestbook.attach_tag(book.id, "wedding").unwrap();
        guestbook.attach_tag(book.id, "anniversary").unwrap();

        let names: Vec<String> = guestbook
            .list_tags()
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["anniversary", "wedding"]);
    }

    #[test]
    fn test_data_persists_across_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        // Create and add data
        let book_id;
        {
            let mut guestbook = Guestbook::open_with_config(config.clone()).unwrap();
            let book = guestbook.create_book("Persistent").unwrap();
            book_id = book.id;
            guestbook.add_greeting(book.id, "still here").unwrap();
            guestbook.attach_tag(book.id, "keeper").unwrap();
        }

        // Reopen and verify
        {
            let guestbook = Guestbook::open_with_config(config).unwrap();

            let book = guestbook.fetch_book(book_id).unwrap();
            assert_eq!(book.name, "Persistent");
            assert_eq!(book.greeting_count, 1);

            let greetings = guestbook.list_greetings(book_id, None).unwrap();
            assert_eq!(greetings[0].content, "still here");

            let tags = guestbook.book_tags(book_id).unwrap();
            assert_eq!(tags[0].name, "keeper");
        }
    }
}
