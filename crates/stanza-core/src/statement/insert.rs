//! INSERT statement builder.

use crate::addition::{write_additions, Addition, OnConflict};
use crate::expr::{Ex, SqlExpr};
use crate::render::RenderOptions;
use crate::schema::{Column, Table};
use crate::statement::Select;
use crate::value::Value;

/// An INSERT statement: multi-row VALUES or insert-from-select.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    table: Table,
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
    select: Option<Select>,
    additions: Vec<Addition>,
}

/// Creates an INSERT into the given table, defaulting the column list
/// to the table's declared columns.
#[must_use]
pub fn insert(table: Table) -> Insert {
    let columns = table.columns().iter().cloned().collect();
    Insert {
        table,
        columns,
        rows: Vec::new(),
        select: None,
        additions: Vec::new(),
    }
}

impl Insert {
    /// Overrides the inserted column list.
    #[must_use]
    pub fn columns(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.columns = columns.into_iter().collect();
        self
    }

    /// Appends one VALUES row. Row length must match the column list;
    /// mismatches surface as a placeholder/argument imbalance caught
    /// by tests.
    #[must_use]
    pub fn row(mut self, values: Vec<Value>) -> Self {
        self.rows.push(values);
        self
    }

    /// Inserts from a subquery instead of VALUES rows.
    #[must_use]
    pub fn from_select(mut self, select: Select) -> Self {
        self.select = Some(select);
        self
    }

    /// Adds conflict resolution.
    #[must_use]
    pub fn on_conflict(mut self, on_conflict: OnConflict) -> Self {
        self.additions.push(Addition::OnConflict(on_conflict));
        self
    }

    /// Adds a trailing comment.
    #[must_use]
    pub fn comment(mut self, text: &str) -> Self {
        self.additions.push(Addition::Comment(String::from(text)));
        self
    }

    /// Renders, flattens and splits into SQL text and arguments.
    #[must_use]
    pub fn build(&self) -> (String, Vec<Value>) {
        self.expr(RenderOptions::new()).into_parts()
    }
}

impl SqlExpr for Insert {
    fn is_nil(&self) -> bool {
        self.rows.is_empty() && self.select.is_none()
    }

    fn expr(&self, opts: RenderOptions) -> Ex {
        // Column names render bare inside an INSERT, whatever the
        // surrounding statement does.
        let local = opts.merge(RenderOptions::new().qualify(false).alias(false));

        let mut e = Ex::new();
        e.push_sql("INSERT INTO ");
        e.write_expr(&self.table, local);
        e.push_sql(" ");
        e.write_group(|e| {
            for (i, column) in self.columns.iter().enumerate() {
                if i > 0 {
                    e.push_sql(", ");
                }
                e.write_expr(column, local);
            }
        });
        if let Some(select) = &self.select {
            e.push_sql(" ");
            e.write_expr(select, local);
        } else {
            e.push_sql(" VALUES ");
            for (i, row) in self.rows.iter().enumerate() {
                if i > 0 {
                    e.push_sql(", ");
                }
                e.write_group(|e| {
                    for (j, value) in row.iter().enumerate() {
                        if j > 0 {
                            e.push_sql(", ");
                        }
                        e.push_value(value.clone());
                    }
                });
            }
        }
        write_additions(&mut e, &self.additions, local);
        e
    }
}
