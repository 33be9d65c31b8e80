//! Declarative schema metadata: tables, columns, keys, databases.
//!
//! This is the model consumed by both the statement builders (for
//! rendering `SELECT ... FROM t`) and the diff engine. Values are
//! immutable once built; the builder methods that look mutating return
//! modified copies.

mod column;
mod key;
mod table;

pub use column::{
    bigint, boolean, bytes, col, date, datetime, decimal, double, fixed_char, float, integer,
    json, smallint, text, time, timestamp, varchar, Column, ColumnKind, ColumnType,
};
pub use key::{Key, Keys};
pub use table::{table, Columns, Table, TableBuilder};

use serde::{Deserialize, Serialize};

/// Schema declaration errors, reported at table construction.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Two columns share a name (compared case-insensitively).
    #[error("table '{table}' declares column '{column}' more than once")]
    DuplicateColumn {
        /// Table being built.
        table: String,
        /// Offending column name.
        column: String,
    },

    /// More than one auto-increment column.
    #[error("table '{table}' declares a second auto-increment column '{column}'")]
    MultipleAutoIncrement {
        /// Table being built.
        table: String,
        /// Offending column name.
        column: String,
    },

    /// More than one primary key.
    #[error("table '{table}' declares more than one primary key")]
    MultiplePrimaryKeys {
        /// Table being built.
        table: String,
    },

    /// A key references a column the table does not declare.
    #[error("key '{key}' on table '{table}' references unknown column '{column}'")]
    UnknownKeyColumn {
        /// Table being built.
        table: String,
        /// Offending key name.
        key: String,
        /// The missing column.
        column: String,
    },
}

/// A named collection of tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    /// Database (or schema) name.
    pub name: String,
    /// Tables in declaration order.
    pub tables: Vec<Table>,
}

impl Database {
    /// Creates an empty database description.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: String::from(name),
            tables: Vec::new(),
        }
    }

    /// Adds a table.
    #[must_use]
    pub fn table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    /// Looks up a table by name, case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }
}
