//! UPDATE statement builder.

use crate::addition::{write_additions, Addition, Assignment};
use crate::cond::Cond;
use crate::expr::{Ex, SqlExpr};
use crate::render::RenderOptions;
use crate::schema::{Column, Table};
use crate::value::{ToValue, Value};

/// An UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    table: Table,
    assignments: Vec<Assignment>,
    additions: Vec<Addition>,
}

/// Creates an UPDATE of the given table.
#[must_use]
pub fn update(table: Table) -> Update {
    Update {
        table,
        assignments: Vec::new(),
        additions: Vec::new(),
    }
}

impl Update {
    /// Adds a `col = ?` assignment.
    #[must_use]
    pub fn set(mut self, column: Column, value: impl ToValue) -> Self {
        self.assignments.push(Assignment::set(column, value));
        self
    }

    /// Adds an assignment binding a pre-built expression.
    #[must_use]
    pub fn set_expr(mut self, column: Column, value: Ex) -> Self {
        self.assignments.push(Assignment::set_expr(column, value));
        self
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

impl SqlExpr for Update {
    fn is_nil(&self) -> bool {
        self.assignments.is_empty()
    }

    fn expr(&self, opts: RenderOptions) -> Ex {
        let local = opts.merge(RenderOptions::new().qualify(false).alias(false));

        let mut e = Ex::new();
        e.push_sql("UPDATE ");
        e.write_expr(&self.table, local);
        e.push_sql(" SET ");
        for (i, assignment) in self.assignments.iter().enumerate() {
            if i > 0 {
                e.push_sql(", ");
            }
            e.write_expr(assignment, local);
        }
        write_additions(&mut e, &self.additions, local);
        e
    }
}
