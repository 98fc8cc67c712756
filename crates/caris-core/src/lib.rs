//! Core types and trait definitions for the CÁRIS consent store.
//!
//! This crate owns the patient–professional link state machine, the access
//! gate, the consent ledger types, and the journal domain. It is
//! deliberately free of HTTP and database dependencies; all other crates
//! depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod consent;
pub mod error;
pub mod gate;
pub mod journal;
pub mod link;
pub mod principal;
pub mod store;

pub use error::{Error, Result};
