//! Table metadata and the fallible table builder.

use serde::{Deserialize, Serialize};

use super::column::Column;
use super::key::{Key, Keys};
use super::SchemaError;
use crate::expr::{Ex, SqlExpr};
use crate::render::RenderOptions;

/// The ordered, name-unique column collection of a table.
///
/// Uniqueness is case-insensitive. The backing vector is appended to
/// exactly once during table construction or schema introspection;
/// afterwards the structure is read-only (there is no deletion API).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Columns(pub(crate) Vec<Column>);

impl Columns {
    /// Returns the columns in declaration order.
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.0.iter()
    }

    /// Looks up a column by name, case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.0
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Columns {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A declared table: name, ordered columns, keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Optional table comment.
    pub comment: Option<String>,
    columns: Columns,
    keys: Keys,
}

impl Table {
    /// Returns the columns.
    #[must_use]
    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// Returns the keys.
    #[must_use]
    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    /// Looks up a column by name, case-insensitively.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }
}

impl SqlExpr for Table {
    fn is_nil(&self) -> bool {
        self.name.is_empty()
    }

    fn expr(&self, _opts: RenderOptions) -> Ex {
        Ex::raw(self.name.clone())
    }
}

/// Creates a table builder.
#[must_use]
pub fn table(name: &str) -> TableBuilder {
    TableBuilder {
        name: String::from(name),
        comment: None,
        columns: Vec::new(),
        keys: Vec::new(),
    }
}

/// Fluent builder for [`Table`].
///
/// Invariant violations (duplicate column names, a second
/// auto-increment column, a key referencing an undeclared column) are
/// programmer errors in the schema declaration and surface as
/// [`SchemaError`] from [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct TableBuilder {
    name: String,
    comment: Option<String>,
    columns: Vec<Column>,
    keys: Vec<Key>,
}

impl TableBuilder {
    /// Adds a column.
    #[must_use]
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds several columns.
    #[must_use]
    pub fn columns(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.columns.extend(columns);
        self
    }

    /// Adds a key.
    #[must_use]
    pub fn key(mut self, key: Key) -> Self {
        self.keys.push(key);
        self
    }

    /// Sets the table comment.
    #[must_use]
    pub fn comment(mut self, comment: &str) -> Self {
        self.comment = Some(String::from(comment));
        self
    }

    /// Validates the declaration and builds the table.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] for duplicate column names (compared
    /// case-insensitively), more than one auto-increment column, more
    /// than one primary key, or a key referencing an undeclared column.
    pub fn build(self) -> Result<Table, SchemaError> {
        let mut auto_increment: Option<&str> = None;
        for (i, column) in self.columns.iter().enumerate() {
            if self.columns[..i]
                .iter()
                .any(|other| other.name.eq_ignore_ascii_case(&column.name))
            {
                return Err(SchemaError::DuplicateColumn {
                    table: self.name,
                    column: column.name.clone(),
                });
            }
            if column.typ.auto_increment {
                if auto_increment.is_some() {
                    return Err(SchemaError::MultipleAutoIncrement {
                        table: self.name,
                        column: column.name.clone(),
                    });
                }
                auto_increment = Some(&column.name);
            }
        }

        let mut saw_primary = false;
        for key in &self.keys {
            if key.primary {
                if saw_primary {
                    return Err(SchemaError::MultiplePrimaryKeys { table: self.name });
                }
                saw_primary = true;
            }
            for column in &key.columns {
                if !self
                    .columns
                    .iter()
                    .any(|c| c.name.eq_ignore_ascii_case(column))
                {
                    return Err(SchemaError::UnknownKeyColumn {
                        table: self.name,
                        key: key.name.clone(),
                        column: column.clone(),
                    });
                }
            }
        }

        let columns = self
            .columns
            .into_iter()
            .map(|c| {
                let name = self.name.clone();
                c.on(&name)
            })
            .collect();

        Ok(Table {
            name: self.name,
            comment: self.comment,
            columns: Columns(columns),
            keys: Keys(self.keys),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::column::{bigint, col, varchar};

    #[test]
    fn test_build_stamps_table_name() {
        let t = table("t_user")
            .column(bigint("f_id"))
            .column(varchar("f_name", 64))
            .build()
            .unwrap();
        assert!(t.columns().iter().all(|c| c.table.as_deref() == Some("t_user")));
    }

    #[test]
    fn test_duplicate_column_is_rejected() {
        let err = table("t")
            .column(col("f_a"))
            .column(col("F_A"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_second_auto_increment_is_rejected() {
        let err = table("t")
            .column(bigint("f_id").auto_increment())
            .column(bigint("f_seq").auto_increment())
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::MultipleAutoIncrement { .. }));
    }

    #[test]
    fn test_key_must_reference_declared_columns() {
        let err = table("t")
            .column(col("f_a"))
            .key(Key::index("i_b", &["f_b"]))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownKeyColumn { .. }));
    }

    #[test]
    fn test_column_lookup_ignores_case() {
        let t = table("t").column(col("f_a")).build().unwrap();
        assert!(t.column("F_A").is_some());
    }
}
