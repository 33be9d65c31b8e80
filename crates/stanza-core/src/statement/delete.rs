//! DELETE statement builder.

use crate::addition::{write_additions, Addition};
use crate::cond::Cond;
use crate::expr::{Ex, SqlExpr};
use crate::render::RenderOptions;
use crate::schema::Table;
use crate::value::Value;

/// A DELETE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    table: Table,
    additions: Vec<Addition>,
}

/// Creates a DELETE from the given table.
#[must_use]
pub fn delete(table: Table) -> Delete {
    Delete {
        table,
        additions: Vec::new(),
    }
}

impl Delete {
    /// Adds a WHERE condition; successive calls are ANDed.
    #[must_use]
    pub fn where_clause(mut self, cond: Cond) -> Self {
        for addition in &mut self.additions {
            if let Addition::Where(existing) = addition {
                let merged = std::mem::take(existing).and(cond);
                *existing = merged;
                return self;
            }
        }
        self.additions.push(Addition::Where(cond));
        self
    }

    /// Adds an arbitrary addition.
    #[must_use]
    pub fn addition(mut self, addition: Addition) -> Self {
        self.additions.push(addition);
        self
    }

    /// Renders, flattens and splits into SQL text and arguments.
    #[must_use]
    pub fn build(&self) -> (String, Vec<Value>) {
        self.expr(RenderOptions::new()).into_parts()
    }
}

impl SqlExpr for Delete {
    fn expr(&self, opts: RenderOptions) -> Ex {
        let local = opts.merge(RenderOptions::new().qualify(false).alias(false));

        let mut e = Ex::new();
        e.push_sql("DELETE FROM ");
        e.write_expr(&self.table, local);
        write_additions(&mut e, &self.additions, local);
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addition::limit;
    use crate::schema::{bigint, col, table};

    fn t() -> Table {
        table("t_log").column(bigint("f_id")).build().unwrap()
    }

    #[test]
    fn test_delete_with_where() {
        let (sql, values) = delete(t()).where_clause(col("f_id").lt(100)).build();
        assert_eq!(sql, "DELETE FROM t_log WHERE f_id < ?");
        assert_eq!(values, vec![Value::Int(100)]);
    }

    #[test]
    fn test_delete_everything_renders_without_where() {
        let (sql, values) = delete(t()).where_clause(Cond::None).build();
        assert_eq!(sql, "DELETE FROM t_log");
        assert!(values.is_empty());
    }

    #[test]
    fn test_delete_with_limit_addition() {
        let (sql, _) = delete(t())
            .addition(limit(1000))
            .where_clause(col("f_id").lt(100))
            .build();
        assert_eq!(sql, "DELETE FROM t_log WHERE f_id < ? LIMIT 1000");
    }
}
