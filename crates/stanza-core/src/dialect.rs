//! Dialect interface for DDL and dialect-sensitive rendering.
//!
//! The core never renders literal DDL for anything dialect-sensitive
//! (type names, quoting, AUTO_INCREMENT vs SERIAL, index syntax); it
//! hands metadata to this trait and composes the returned expressions.
//! Default methods cover the skeletons that are identical across
//! backends; everything else is per-dialect.

use crate::expr::Ex;
use crate::schema::{Column, ColumnType, Key, Table};

/// A database dialect: metadata in, literal DDL/DML text out.
pub trait Dialect {
    /// Returns the driver name (e.g. `mysql`, `postgres`).
    fn driver_name(&self) -> &'static str;

    /// Returns the canonical name under which this dialect reports a
    /// table's primary key (`PRIMARY` on MySQL, `<table>_pkey` on
    /// PostgreSQL).
    fn primary_key_name(&self, table: &Table) -> String;

    /// Whether the given SQLSTATE or vendor error code means "unknown
    /// database".
    fn is_unknown_database_error(&self, code: &str) -> bool;

    /// Whether the given SQLSTATE or vendor error code means a
    /// uniqueness conflict.
    fn is_conflict_error(&self, code: &str) -> bool;

    /// Returns the identifier quote character.
    fn quote_char(&self) -> char {
        '"'
    }

    /// Quotes an identifier.
    fn quote_identifier(&self, name: &str) -> String {
        let q = self.quote_char();
        format!("{q}{name}{q}")
    }

    /// Renders the dialect-specific data type of a column.
    fn data_type(&self, typ: &ColumnType) -> String;

    /// Renders a full column definition (name, type, constraints).
    fn column_definition(&self, column: &Column) -> String;

    /// `CREATE DATABASE`.
    fn create_database(&self, name: &str) -> Ex {
        Ex::raw(format!("CREATE DATABASE {}", self.quote_identifier(name)))
    }

    /// `CREATE SCHEMA`.
    fn create_schema(&self, name: &str) -> Ex {
        Ex::raw(format!("CREATE SCHEMA {}", self.quote_identifier(name)))
    }

    /// `DROP DATABASE`.
    fn drop_database(&self, name: &str) -> Ex {
        Ex::raw(format!("DROP DATABASE {}", self.quote_identifier(name)))
    }

    /// `CREATE TABLE IF NOT EXISTS` with columns and the primary key
    /// constraint. Secondary indexes are emitted separately through
    /// [`add_index`](Self::add_index).
    fn create_table_if_not_exists(&self, table: &Table) -> Ex {
        let mut sql = String::from("CREATE TABLE IF NOT EXISTS ");
        sql.push_str(&self.quote_identifier(&table.name));
        sql.push_str(" (\n");
        let column_defs: Vec<String> = table
            .columns()
            .iter()
            .map(|c| format!("    {}", self.column_definition(c)))
            .collect();
        sql.push_str(&column_defs.join(",\n"));
        if let Some(pk) = table.keys().primary() {
            sql.push_str(",\n    PRIMARY KEY (");
            let cols: Vec<String> = pk
                .columns
                .iter()
                .map(|c| self.quote_identifier(c))
                .collect();
            sql.push_str(&cols.join(", "));
            sql.push(')');
        }
        sql.push_str("\n)");
        Ex::raw(sql)
    }

    /// `DROP TABLE`.
    fn drop_table(&self, table: &Table) -> Ex {
        Ex::raw(format!(
            "DROP TABLE IF EXISTS {}",
            self.quote_identifier(&table.name)
        ))
    }

    /// `TRUNCATE TABLE`.
    fn truncate_table(&self, table: &Table) -> Ex {
        Ex::raw(format!(
            "TRUNCATE TABLE {}",
            self.quote_identifier(&table.name)
        ))
    }

    /// `ALTER TABLE .. ADD COLUMN`.
    fn add_column(&self, table: &Table, column: &Column) -> Ex {
        Ex::raw(format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.quote_identifier(&table.name),
            self.column_definition(column)
        ))
    }

    /// Re-asserts the shape of an existing column. The dialect decides
    /// whether anything changed; an unchanged column yields a nil
    /// expression the caller skips.
    fn modify_column(&self, table: &Table, column: &Column, previous: &Column) -> Ex;

    /// `ALTER TABLE .. DROP COLUMN`.
    fn drop_column(&self, table: &Table, column_name: &str) -> Ex {
        Ex::raw(format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.quote_identifier(&table.name),
            self.quote_identifier(column_name)
        ))
    }

    /// Creates an index (or the primary key) on a table.
    fn add_index(&self, table: &Table, key: &Key) -> Ex;

    /// Drops an index by name.
    fn drop_index(&self, table: &Table, key_name: &str) -> Ex;
}
