//! An embeddable relational database engine: paged storage under write-ahead
//! logging and undo recovery, strict two-phase locking with a wait-cap
//! deadlock strategy, static-hash and B-tree indexes, and a hand-rolled SQL
//! lexer/parser/planner sitting on top of a SimpleDB-style scan algebra.
//!
//! [`Database`] is the entry point: `Database::open(dir)` bootstraps or
//! recovers a directory, [`Database::new_tx`] starts a unit of work, and
//! [`Database::execute_update`]/[`Database::create_query_plan`] run SQL
//! against it.

pub mod buffer;
pub mod concurrency;
pub mod db;
pub mod error;
pub mod file;
pub mod index;
pub mod metadata;
pub mod parse;
pub mod plan;
pub mod planner;
pub mod query;
pub mod record;
pub mod scan;
pub mod tx;
pub mod util;
pub mod wal;

#[cfg(test)]
pub(crate) mod test_support;

pub use db::{DbConfig, Database};
pub use error::{Error, Result};
pub use tx::{Transaction, TxHandle};
