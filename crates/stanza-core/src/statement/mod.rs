//! Statement builders: thin composers over the expression primitives.
//!
//! Each builder assembles a fixed skeleton (`SELECT <cols> FROM <t>`,
//! `INSERT INTO <t> ...`) and defers every variable clause to
//! [`write_additions`](crate::addition::write_additions), so clause
//! order never depends on call order.

mod delete;
mod insert;
mod select;
mod update;
mod with;

pub use delete::{delete, Delete};
pub use insert::{insert, Insert};
pub use select::{select, select_all, Select};
pub use update::{update, Update};
pub use with::{with, Cte, With};
