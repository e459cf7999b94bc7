//! Storage layer
//!
//! SQLite-backed persistence for guestbook records.
//!
//! ## Architecture
//!
//! - **schema**: Table definitions and version stamping
//! - **datastore**: Typed reads and writes over the tables
//!
//! Greetings are grouped under their owning book. The datastore keeps the
//! per-book bookkeeping (greeting count, greeting id allocation) in the
//! same transaction as the greeting writes themselves.

pub mod datastore;
pub mod schema;

pub use datastore::Datastore;
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
