//! # stanza-core
//!
//! Composable SQL expression trees and schema diffing.
//!
//! Everything that renders SQL implements one trait, [`SqlExpr`]: a
//! column, a condition, a whole SELECT and a clause fragment all
//! compose the same way, and a nil expression anywhere in the tree
//! simply disappears from the output. Values never land in the SQL
//! text; they travel alongside it as `?` placeholder arguments.
//!
//! ## Building statements
//!
//! ```rust
//! use stanza_core::schema::{bigint, col, table, varchar};
//! use stanza_core::statement::select_all;
//!
//! let t = table("t")
//!     .column(varchar("a", 64))
//!     .column(bigint("b"))
//!     .build()
//!     .unwrap();
//!
//! let (sql, _args) = select_all()
//!     .from(t)
//!     .where_clause(col("a").eq(1))
//!     .limit(5)
//!     .build();
//!
//! assert_eq!(sql, "SELECT * FROM t WHERE a = ? LIMIT 5");
//! ```
//!
//! ## Diffing schemas
//!
//! The same [`schema::Table`] type describes both a declared schema and
//! an introspected live one; [`schema::Table::diff`] compares the two
//! and asks a [`dialect::Dialect`] to phrase the DDL statements that
//! reconcile them.

pub mod addition;
pub mod cond;
pub mod dialect;
pub mod expr;
pub mod render;
pub mod schema;
pub mod statement;
pub mod value;

mod diff;

pub use cond::{and, or, xor, Cond};
pub use dialect::Dialect;
pub use expr::{expr, Arg, Ex, SqlExpr};
pub use render::RenderOptions;
pub use schema::{col, table, Column, Database, Key, SchemaError, Table};
pub use statement::{delete, insert, select, select_all, update, with};
pub use value::{ToValue, Value};
