//! # stanza-migrate
//!
//! Schema reconciliation driver: introspects a live MySQL or
//! PostgreSQL database, diffs it against a declared schema, and
//! applies the resulting DDL in order.

pub mod error;
pub mod executor;
pub mod introspect;
pub mod snapshot;

pub use error::{MigrateError, Result};
pub use executor::{plan, Reconciler};
