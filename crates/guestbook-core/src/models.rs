//! Data models for the guestbook
//!
//! Defines the core records: Book, Greeting, and Tag, plus the integer
//! identifier newtypes. Identifiers are store-assigned and cross the caller
//! boundary as decimal strings; inside the library they stay typed so a
//! greeting id can never be passed where a book id belongs.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GuestbookError;

/// Identifier of a Book, assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BookId(pub i64);

/// Identifier of a Greeting, unique within its owning book's group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GreetingId(pub i64);

/// Identifier of a Tag, assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TagId(pub i64);

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BookId {
    type Err = GuestbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_id(s, "book id").map(BookId)
    }
}

impl fmt::Display for GreetingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GreetingId {
    type Err = GuestbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_id(s, "greeting id").map(GreetingId)
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TagId {
    type Err = GuestbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_id(s, "tag id").map(TagId)
    }
}

/// Parse a decimal identifier, rejecting anything non-numeric
fn parse_id(s: &str, field: &'static str) -> Result<i64, GuestbookError> {
    s.trim()
        .parse::<i64>()
        .map_err(|_| GuestbookError::Validation {
            field,
            reason: format!("'{}' is not a numeric identifier", s),
        })
}

/// A named guestbook: the root of a consistency group for its greetings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    /// Unique identifier
    pub id: BookId,
    /// Display name (free text, empty allowed)
    pub name: String,
    /// Denormalized greeting count, maintained alongside every insert/delete
    pub greeting_count: i64,
    /// Attached tags in first-attach order, duplicates removed
    pub tags: Vec<TagId>,
    /// When this book was created
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// Add a tag id, keeping first-attach order and skipping duplicates
    pub fn add_tag(&mut self, tag: TagId) {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    /// Whether the given tag is attached to this book
    pub fn has_tag(&self, tag: TagId) -> bool {
        self.tags.contains(&tag)
    }
}

/// A timestamped message signed into one book
///
/// Greetings live inside their book's consistency group: the id is only
/// meaningful together with the owning book's id. Content is stored raw;
/// escaping for display is the renderer's job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Greeting {
    /// Identifier within the owning book's group
    pub id: GreetingId,
    /// The book this greeting belongs to
    pub book_id: BookId,
    /// Message text, raw and unescaped
    pub content: String,
    /// When this greeting was signed; never mutated
    pub date: DateTime<Utc>,
}

/// A label shared across books
///
/// For a given name at most one tag record exists; books reference tags by
/// id through their tag lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    /// Unique identifier
    pub id: TagId,
    /// Tag name, unique across all tags
    pub name: String,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(BookId(7).to_string(), "7");
        assert_eq!(GreetingId(12).to_string(), "12");
        assert_eq!(TagId(3).to_string(), "3");
    }

    #[test]
    fn test_id_parse() {
        assert_eq!("42".parse::<BookId>().unwrap(), BookId(42));
        assert_eq!(" 42 ".parse::<BookId>().unwrap(), BookId(42));
        assert_eq!("9".parse::<GreetingId>().unwrap(), GreetingId(9));
    }

    #[test]
    fn test_id_parse_rejects_non_numeric() {
        let err = "abc".parse::<BookId>().unwrap_err();
        assert!(matches!(err, GuestbookError::Validation { .. }));
        assert!(err.to_string().contains("abc"));

        assert!("".parse::<GreetingId>().is_err());
        assert!("12x".parse::<TagId>().is_err());
    }

    #[test]
    fn test_book_add_tag_dedups() {
        let mut book = Book {
            id: BookId(1),
            name: "Visitors".to_string(),
            greeting_count: 0,
            tags: Vec::new(),
            created_at: Utc::now(),
        };

        book.add_tag(TagId(1));
        book.add_tag(TagId(2));
        assert_eq!(book.tags, vec![TagId(1), TagId(2)]);

        // Adding a duplicate keeps the first occurrence and its position
        book.add_tag(TagId(1));
        assert_eq!(book.tags, vec![TagId(1), TagId(2)]);

        assert!(book.has_tag(TagId(2)));
        assert!(!book.has_tag(TagId(9)));
    }

    #[test]
    fn test_id_serialization_is_plain_integer() {
        let id = BookId(5);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "5");
        let back: BookId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
