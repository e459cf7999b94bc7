//! Guestbook Core Library
//!
//! This crate provides the core functionality for the guestbook: named
//! books holding timestamped greetings, with shared tags across books.
//!
//! # Architecture
//!
//! - **SQLite**: All records live in a single SQLite database
//!
//! Each book forms a consistency group for its greetings: reads scoped to
//! one book see every previously acknowledged write to that book, while
//! global listings may lag.
//!
//! # Quick Start
//!
//! ```text
//! let mut guestbook = Guestbook::open()?;
//!
//! // Create a book and sign it
//! let book = guestbook.create_book("Visitors")?;
//! guestbook.add_greeting(book.id, "Hello!")?;
//!
//! // Read it back, newest first
//! let greetings = guestbook.list_greetings(book.id, None)?;
//! ```
//!
//! # Modules
//!
//! - `service`: Unified guestbook interface (main entry point)
//! - `models`: Data structures for books, greetings, and tags
//! - `storage`: SQLite schema and datastore
//! - `config`: Application configuration
//! - `error`: The crate's error type

pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod storage;

pub use config::{Config, ConfigError};
pub use error::{GuestbookError, Result};
pub use models::{Book, BookId, Greeting, GreetingId, Tag, TagId};
pub use service::Guestbook;
pub use storage::Datastore;
