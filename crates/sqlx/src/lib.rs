//! SQLx-based GrantStore and Directory implementations for PostgreSQL and
//! SQLite.
//!
//! Both backends share one migration set; the uniqueness invariant on the
//! grant tuple lives in the schema, not in engine logic.

mod common;

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use common::{datetime_to_string, string_to_datetime};

#[cfg(feature = "postgres")]
pub use postgres::PostgresBackend;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;
