//! WITH (common table expression) statement builder.

use crate::expr::{Ex, SqlExpr};
use crate::render::RenderOptions;
use crate::statement::Select;
use crate::value::Value;

/// One common table expression: a named temporary table whose declared
/// column list must match its SELECT projection, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    /// Temporary table name.
    pub name: String,
    /// Declared column list, parenthesized in declaration order.
    pub columns: Vec<String>,
    /// The body producing the temporary table.
    pub body: Select,
}

/// A WITH statement wrapping a main query.
#[derive(Debug, Clone, PartialEq)]
pub struct With {
    recursive: bool,
    ctes: Vec<Cte>,
    query: Select,
}

/// Creates a WITH statement around the given main query.
#[must_use]
pub fn with(query: Select) -> With {
    With {
        recursive: false,
        ctes: Vec::new(),
        query,
    }
}

impl With {
    /// Marks the statement RECURSIVE.
    #[must_use]
    pub const fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    /// Adds a common table expression.
    #[must_use]
    pub fn cte(mut self, name: &str, columns: &[&str], body: Select) -> Self {
        self.ctes.push(Cte {
            name: String::from(name),
            columns: columns.iter().map(|c| String::from(*c)).collect(),
            body,
        });
        self
    }

    /// Renders, flattens and splits into SQL text and arguments.
    #[must_use]
    pub fn build(&self) -> (String, Vec<Value>) {
        self.expr(RenderOptions::new()).into_parts()
    }
}

impl SqlExpr for With {
    fn is_nil(&self) -> bool {
        self.ctes.is_empty() && self.query.is_nil()
    }

    fn expr(&self, opts: RenderOptions) -> Ex {
        let mut e = Ex::new();
        if self.ctes.is_empty() {
            e.write_expr(&self.query, opts);
            return e;
        }
        e.push_sql("WITH ");
        if self.recursive {
            e.push_sql("RECURSIVE ");
        }
        for (i, cte) in self.ctes.iter().enumerate() {
            if i > 0 {
                e.push_sql(", ");
            }
            e.push_sql(&cte.name);
            if !cte.columns.is_empty() {
                e.push_sql(" ");
                e.write_group(|e| e.push_sql(&cte.columns.join(", ")));
            }
            e.push_sql(" AS ");
            e.write_group(|e| e.write_expr(&cte.body, opts));
        }
        e.push_sql(" ");
        e.write_expr(&self.query, opts);
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{bigint, col, table, varchar, Table};
    use crate::statement::{select, select_all};

    fn t() -> Table {
        table("t_order")
            .column(bigint("f_id"))
            .column(varchar("f_state", 16))
            .build()
            .unwrap()
    }

    fn cte_table() -> Table {
        table("recent").column(bigint("f_id")).build().unwrap()
    }

    #[test]
    fn test_with_renders_declared_column_list() {
        let body = select([col("f_id"), col("f_state")])
            .from(t())
            .where_clause(col("f_state").eq("open"));
        let main = select_all().from(cte_table());
        let (sql, values) = with(main).cte("recent", &["f_id", "f_state"], body).build();
        assert_eq!(
            sql,
            "WITH recent (f_id, f_state) AS \
             (SELECT f_id, f_state FROM t_order WHERE f_state = ?) \
             SELECT * FROM recent"
        );
        assert_eq!(values, vec![Value::Text("open".into())]);
    }

    #[test]
    fn test_with_without_ctes_renders_query_alone() {
        let (sql, _) = with(select_all().from(t())).build();
        assert_eq!(sql, "SELECT * FROM t_order");
    }

    #[test]
    fn test_recursive_keyword() {
        let body = select([col("f_id")]).from(t());
        let (sql, _) = with(select_all().from(cte_table()))
            .recursive()
            .cte("recent", &["f_id"], body)
            .build();
        assert!(sql.starts_with("WITH RECURSIVE recent (f_id) AS "));
    }
}
