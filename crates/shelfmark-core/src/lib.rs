//! Core domain model for shelfmark.
//!
//! This crate defines the library catalog model (books, authors,
//! publishers, categories, members, staff, loans, reservations and fines),
//! the SQLite schema that enforces its integrity rules, and the
//! transactional operations that keep copy counts and fine balances in
//! step with circulation.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod schema;
pub mod seed;

pub use error::{ConstraintKind, Error, Result};
pub use schema::Database;
