//! SQLite backend for the CÁRIS consent store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Every link transition runs in
//! a single SQLite transaction that re-validates the current status before
//! writing, so a status update and its ledger append commit together or not
//! at all.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
