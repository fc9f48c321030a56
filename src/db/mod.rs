//! Database module
//!
//! Read-only SQLite access and the hospital schema.

pub mod connection;
pub mod schema;

pub use connection::{Database, DbError, DbResult};
