//! Relational persistence gateway for the emosense backend.
//!
//! Thin typed operations over SQLite: stimulus lookups, the evaluation log,
//! recording paths, and analysis results. Every operation is a single
//! auto-committed statement; callers decide what a failure means.

pub mod db;
pub mod error;

pub use db::Database;
pub use error::{DbError, DbResult};
