//! sqlx-backed resource factories.
//!
//! Both adapters accept the `$N` placeholder syntax and `RETURNING` clauses
//! used by the DAO statements.

mod postgres;
mod sqlite;

pub use postgres::{PgHandle, PgResourceFactory};
pub use sqlite::{SqliteHandle, SqliteResourceFactory};
