//! Schema diff: the ordered DDL needed to converge a live table onto
//! its declared shape.
//!
//! The algorithm is deliberately dialect-agnostic: it decides *which*
//! operations to emit and in what order, and delegates all literal SQL
//! (and the judgment of whether a modify is a no-op) to the dialect.

use crate::dialect::Dialect;
use crate::expr::Ex;
use crate::schema::{Key, Table};

/// Resolves the canonical name of a key: primary keys are reported
/// under a dialect-specific name, everything else under its own.
fn canonical_name(key: &Key, table: &Table, dialect: &dyn Dialect) -> String {
    if key.primary {
        dialect.primary_key_name(table)
    } else {
        key.name.clone()
    }
}

impl Table {
    /// Computes the ordered operations that converge `prev` (the
    /// previously introspected shape) onto `self` (the declared shape).
    ///
    /// Column operations precede index operations and additions precede
    /// drops, so a new column exists before an index references it.
    /// `skip_drop_column` suppresses the destructive step 4 for
    /// additive-only pipelines. The result may contain nil expressions
    /// (a dialect judging a modify to be a no-op); callers skip entries
    /// where [`Ex::is_nil`](crate::SqlExpr::is_nil) holds before
    /// execution. This method never errors.
    #[must_use]
    pub fn diff(&self, prev: &Self, dialect: &dyn Dialect, skip_drop_column: bool) -> Vec<Ex> {
        let mut operations = Vec::new();

        // 1. Declared columns, in declaration order: new columns are
        // added, existing ones re-asserted (the dialect renders a nil
        // expression when nothing changed).
        for column in self.columns() {
            match prev.column(&column.name) {
                None => operations.push(dialect.add_column(self, column)),
                Some(prev_column) => {
                    operations.push(dialect.modify_column(self, column, prev_column));
                }
            }
        }

        // 2. Declared keys: missing ones are created; an existing
        // non-primary key whose column list changed is dropped and
        // recreated — indexes are never modified in place.
        for key in self.keys() {
            let name = canonical_name(key, self, dialect);
            let previous = prev
                .keys()
                .iter()
                .find(|k| canonical_name(k, self, dialect).eq_ignore_ascii_case(&name));
            match previous {
                None => operations.push(dialect.add_index(self, key)),
                Some(prev_key) => {
                    if !key.primary && key.columns_text() != prev_key.columns_text() {
                        operations.push(dialect.drop_index(self, &prev_key.name));
                        operations.push(dialect.add_index(self, key));
                    }
                }
            }
        }

        // 3. Keys that exist only in the previous shape are dropped.
        for prev_key in prev.keys() {
            let prev_name = canonical_name(prev_key, self, dialect);
            let declared = self
                .keys()
                .iter()
                .any(|k| canonical_name(k, self, dialect).eq_ignore_ascii_case(&prev_name));
            if !declared {
                operations.push(dialect.drop_index(self, &prev_key.name));
            }
        }

        // 4. Columns that exist only in the previous shape are dropped,
        // unless the caller asked for additive-only output.
        if !skip_drop_column {
            for prev_column in prev.columns() {
                if self.column(&prev_column.name).is_none() {
                    operations.push(dialect.drop_column(self, &prev_column.name));
                }
            }
        }

        operations
    }
}
