//! SELECT statement builder.

use crate::addition::{write_additions, Addition, Join, JoinKind, OrderTerm};
use crate::cond::{Cond, ColumnPredicate};
use crate::expr::{Ex, SqlExpr};
use crate::render::RenderOptions;
use crate::schema::{Column, Table};
use crate::value::Value;

/// A SELECT statement.
///
/// Supplying a JOIN addition switches the whole statement into
/// multi-table mode: bare column references anywhere in the statement
/// render table-qualified.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    columns: Vec<Column>,
    distinct: bool,
    from: Option<Table>,
    additions: Vec<Addition>,
}

/// Creates a SELECT over an explicit projection.
#[must_use]
pub fn select(columns: impl IntoIterator<Item = Column>) -> Select {
    Select {
        columns: columns.into_iter().collect(),
        distinct: false,
        from: None,
        additions: Vec::new(),
    }
}

/// Creates a `SELECT *`.
#[must_use]
pub fn select_all() -> Select {
    select([])
}

impl Select {
    /// Sets the FROM table.
    #[must_use]
    pub fn from(mut self, table: Table) -> Self {
        self.from = Some(table);
        self
    }

    /// Sets DISTINCT.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Adds a join.
    #[must_use]
    pub fn join(mut self, kind: JoinKind, table: &str, on: Cond) -> Self {
        self.additions.push(Addition::Join(Join {
            kind,
            table: String::from(table),
            on,
        }));
        self
    }

    /// Adds an INNER JOIN.
    #[must_use]
    pub fn inner_join(self, table: &str, on: Cond) -> Self {
        self.join(JoinKind::Inner, table, on)
    }

    /// Adds a LEFT JOIN.
    #[must_use]
    pub fn left_join(self, table: &str, on: Cond) -> Self {
        self.join(JoinKind::Left, table, on)
    }

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

    /// Adds a GROUP BY clause.
    #[must_use]
    pub fn group_by(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.additions.push(Addition::GroupBy {
            columns: columns.into_iter().collect(),
            having: Cond::None,
        });
        self
    }

    /// Sets the HAVING condition. Attaches to an existing GROUP BY
    /// clause, or renders as a bare HAVING when none was added.
    #[must_use]
    pub fn having(mut self, cond: Cond) -> Self {
        for addition in &mut self.additions {
            if let Addition::GroupBy { having, .. } = addition {
                *having = cond;
                return self;
            }
        }
        self.additions.push(Addition::GroupBy {
            columns: Vec::new(),
            having: cond,
        });
        self
    }

    /// Adds an ORDER BY clause.
    #[must_use]
    pub fn order_by(mut self, terms: impl IntoIterator<Item = OrderTerm>) -> Self {
        self.additions
            .push(Addition::OrderBy(terms.into_iter().collect()));
        self
    }

    /// Adds a LIMIT clause.
    #[must_use]
    pub fn limit(mut self, count: u64) -> Self {
        self.additions.push(Addition::Limit {
            count,
            offset: None,
        });
        self
    }

    /// Adds a LIMIT/OFFSET clause.
    #[must_use]
    pub fn limit_offset(mut self, count: u64, offset: u64) -> Self {
        self.additions.push(Addition::Limit {
            count,
            offset: Some(offset),
        });
        self
    }

    /// Adds a trailing comment.
    #[must_use]
    pub fn comment(mut self, text: &str) -> Self {
        self.additions.push(Addition::Comment(String::from(text)));
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

impl SqlExpr for Select {
    fn is_nil(&self) -> bool {
        self.from.is_none() && self.columns.is_empty()
    }

    fn expr(&self, opts: RenderOptions) -> Ex {
        let has_join = self
            .additions
            .iter()
            .any(|a| matches!(a, Addition::Join(_)));
        let opts = if has_join {
            opts.merge(RenderOptions::new().qualify(true))
        } else {
            opts
        };

        let mut e = Ex::new();
        e.push_sql("SELECT ");
        if self.distinct {
            e.push_sql("DISTINCT ");
        }
        if self.columns.is_empty() {
            e.push_sql("*");
        } else {
            let projection = opts.merge(RenderOptions::new().alias(true));
            for (i, column) in self.columns.iter().enumerate() {
                if i > 0 {
                    e.push_sql(", ");
                }
                e.write_expr(column, projection);
            }
        }
        if let Some(from) = &self.from {
            e.push_sql(" FROM ");
            e.write_expr(from, opts);
        }
        write_additions(&mut e, &self.additions, opts);
        e
    }
}

impl ColumnPredicate for Select {
    /// A subquery operand renders as `IN (<subquery>)`.
    fn predicate(self, col: Column) -> Cond {
        Cond::InExpr {
            col,
            sub: self.expr(RenderOptions::new()),
            negated: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addition::{desc, limit, where_};
    use crate::schema::{bigint, col, table, varchar};

    fn t() -> Table {
        table("t")
            .column(varchar("a", 64))
            .column(bigint("b"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_select_star_where_limit() {
        let (sql, values) = select_all()
            .from(t())
            .where_clause(col("a").eq(1))
            .limit(5)
            .build();
        assert_eq!(sql, "SELECT * FROM t WHERE a = ? LIMIT 5");
        assert_eq!(values, vec![Value::Int(1)]);
    }

    #[test]
    fn test_addition_order_is_caller_independent() {
        let forward = select_all()
            .from(t())
            .addition(where_(col("a").eq(1)))
            .addition(limit(5))
            .build();
        let reversed = select_all()
            .from(t())
            .addition(limit(5))
            .addition(where_(col("a").eq(1)))
            .build();
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_projection_renders_columns() {
        let (sql, _) = select([col("a"), col("b")]).from(t()).build();
        assert_eq!(sql, "SELECT a, b FROM t");
    }

    #[test]
    fn test_join_qualifies_all_columns() {
        let (sql, _) = select([col("a").on("t")])
            .from(t())
            .inner_join("t2", col("b").on("t").eq_col(col("b").on("t2")))
            .where_clause(col("a").on("t").eq(1))
            .build();
        assert_eq!(
            sql,
            "SELECT t.a AS a FROM t INNER JOIN t2 ON t.b = t2.b WHERE t.a = ?"
        );
    }

    #[test]
    fn test_nil_where_is_elided() {
        let (sql, values) = select_all().from(t()).where_clause(Cond::None).build();
        assert_eq!(sql, "SELECT * FROM t");
        assert!(values.is_empty());
    }

    #[test]
    fn test_group_by_having_order() {
        let (sql, _) = select([col("a")])
            .from(t())
            .order_by([desc(col("a"))])
            .group_by([col("a")])
            .having(col("b").gt(2))
            .build();
        assert_eq!(
            sql,
            "SELECT a FROM t GROUP BY a HAVING b > ? ORDER BY a DESC"
        );
    }

    #[test]
    fn test_having_without_group_by() {
        let (sql, values) = select([col("a")])
            .from(t())
            .having(col("b").gt(2))
            .build();
        assert_eq!(sql, "SELECT a FROM t HAVING b > ?");
        assert_eq!(values, vec![Value::Int(2)]);
    }

    #[test]
    fn test_select_as_subquery_operand() {
        let sub = select([col("b")]).from(t()).where_clause(col("a").eq(1));
        let c = col("id").in_one(sub);
        let (sql, values) = c.expr(RenderOptions::new()).into_parts();
        assert_eq!(sql, "id IN (SELECT b FROM t WHERE a = ?)");
        assert_eq!(values, vec![Value::Int(1)]);
    }

    #[test]
    fn test_successive_where_clauses_are_anded() {
        let (sql, _) = select_all()
            .from(t())
            .where_clause(col("a").eq(1))
            .where_clause(col("b").eq(2))
            .build();
        assert_eq!(sql, "SELECT * FROM t WHERE (a = ?) AND (b = ?)");
    }
}
