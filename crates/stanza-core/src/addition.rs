//! Optional statement fragments and their fixed emission order.
//!
//! SQL syntax fixes the clause order regardless of how a caller
//! assembles a statement, so every fragment carries a weight and
//! [`write_additions`] emits survivors sorted ascending by weight. The
//! builder never depends on caller discipline to get the order right.

use crate::cond::Cond;
use crate::expr::{Arg, Ex, SqlExpr};
use crate::render::RenderOptions;
use crate::schema::Column;
use crate::value::ToValue;

/// Join flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `INNER JOIN`
    Inner,
    /// `LEFT JOIN`
    Left,
    /// `RIGHT JOIN`
    Right,
    /// `CROSS JOIN`
    Cross,
}

impl JoinKind {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }
}

/// A JOIN fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// Join flavor.
    pub kind: JoinKind,
    /// Joined table name.
    pub table: String,
    /// ON condition; nil for cross joins.
    pub on: Cond,
}

/// One term of an ORDER BY list.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTerm {
    /// Ordered column.
    pub col: Column,
    /// Descending when set.
    pub desc: bool,
}

/// An ascending order term.
#[must_use]
pub fn asc(col: Column) -> OrderTerm {
    OrderTerm { col, desc: false }
}

/// A descending order term.
#[must_use]
pub fn desc(col: Column) -> OrderTerm {
    OrderTerm { col, desc: true }
}

/// A `SET`-style assignment, shared by UPDATE and ON CONFLICT.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Assigned column.
    pub col: Column,
    /// Bound value.
    pub value: Arg,
}

impl Assignment {
    /// Creates an assignment binding a scalar value.
    pub fn set(col: Column, value: impl ToValue) -> Self {
        Self {
            col,
            value: Arg::value(value),
        }
    }

    /// Creates an assignment binding a pre-built expression.
    #[must_use]
    pub fn set_expr(col: Column, value: Ex) -> Self {
        Self {
            col,
            value: Arg::Expr(value),
        }
    }
}

impl SqlExpr for Assignment {
    fn expr(&self, opts: RenderOptions) -> Ex {
        let mut e = Ex::new();
        if opts.is_value_only() {
            e.push_sql("?");
            e.push_arg(self.value.clone());
            return e;
        }
        e.write_expr(&self.col, opts);
        e.push_sql(" = ?");
        e.push_arg(self.value.clone());
        e
    }
}

/// Conflict resolution for INSERT.
#[derive(Debug, Clone, PartialEq)]
pub enum OnConflict {
    /// `ON CONFLICT (cols) DO NOTHING`
    DoNothing {
        /// Conflict target columns.
        columns: Vec<String>,
    },
    /// `ON CONFLICT (cols) DO UPDATE SET ...`
    DoUpdate {
        /// Conflict target columns.
        columns: Vec<String>,
        /// Assignments applied on conflict.
        assignments: Vec<Assignment>,
    },
}

/// An optional statement fragment with a fixed emission weight.
#[derive(Debug, Clone, PartialEq)]
pub enum Addition {
    /// JOIN clause.
    Join(Join),
    /// WHERE clause.
    Where(Cond),
    /// GROUP BY clause with optional HAVING. Empty columns with a
    /// non-nil condition render a bare HAVING over the whole result.
    GroupBy {
        /// Grouping columns.
        columns: Vec<Column>,
        /// HAVING condition; nil for none.
        having: Cond,
    },
    /// ORDER BY clause.
    OrderBy(Vec<OrderTerm>),
    /// LIMIT clause with optional OFFSET.
    Limit {
        /// Row count.
        count: u64,
        /// Skipped rows.
        offset: Option<u64>,
    },
    /// ON CONFLICT clause.
    OnConflict(OnConflict),
    /// Free-form trailing fragment.
    Other(Ex),
    /// Trailing line comment.
    Comment(String),
}

/// Emission weight; SQL clause order, not caller order, decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Weight {
    /// JOIN clauses.
    Join,
    /// WHERE clause.
    Where,
    /// GROUP BY clause.
    GroupBy,
    /// ORDER BY clause.
    OrderBy,
    /// LIMIT clause.
    Limit,
    /// ON CONFLICT clause.
    OnConflict,
    /// Free-form fragments.
    Other,
    /// Trailing comments.
    Comment,
}

impl Addition {
    /// Returns the emission weight.
    #[must_use]
    pub const fn weight(&self) -> Weight {
        match self {
            Self::Join(_) => Weight::Join,
            Self::Where(_) => Weight::Where,
            Self::GroupBy { .. } => Weight::GroupBy,
            Self::OrderBy(_) => Weight::OrderBy,
            Self::Limit { .. } => Weight::Limit,
            Self::OnConflict(_) => Weight::OnConflict,
            Self::Other(_) => Weight::Other,
            Self::Comment(_) => Weight::Comment,
        }
    }
}

impl SqlExpr for Addition {
    fn is_nil(&self) -> bool {
        match self {
            Self::Join(_) | Self::Limit { .. } | Self::OnConflict(_) => false,
            Self::Where(cond) => cond.is_nil(),
            Self::GroupBy { columns, having } => columns.is_empty() && having.is_nil(),
            Self::OrderBy(terms) => terms.is_empty(),
            Self::Other(e) => e.is_nil(),
            Self::Comment(text) => text.is_empty(),
        }
    }

    fn expr(&self, opts: RenderOptions) -> Ex {
        let mut e = Ex::new();
        match self {
            Self::Join(join) => {
                e.push_sql(join.kind.sql());
                e.push_sql(" ");
                e.push_sql(&join.table);
                if !join.on.is_nil() {
                    e.push_sql(" ON ");
                    e.write_expr(&join.on, opts);
                }
            }
            Self::Where(cond) => {
                e.push_sql("WHERE ");
                e.write_expr(cond, opts);
            }
            Self::GroupBy { columns, having } => {
                if !columns.is_empty() {
                    e.push_sql("GROUP BY ");
                    for (i, col) in columns.iter().enumerate() {
                        if i > 0 {
                            e.push_sql(", ");
                        }
                        e.write_expr(col, opts);
                    }
                }
                if !having.is_nil() {
                    if !columns.is_empty() {
                        e.push_sql(" ");
                    }
                    e.push_sql("HAVING ");
                    e.write_expr(having, opts);
                }
            }
            Self::OrderBy(terms) => {
                e.push_sql("ORDER BY ");
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        e.push_sql(", ");
                    }
                    e.write_expr(&term.col, opts);
                    if term.desc {
                        e.push_sql(" DESC");
                    }
                }
            }
            Self::Limit { count, offset } => {
                e.push_sql(&format!("LIMIT {count}"));
                if let Some(offset) = offset {
                    e.push_sql(&format!(" OFFSET {offset}"));
                }
            }
            Self::OnConflict(on_conflict) => match on_conflict {
                OnConflict::DoNothing { columns } => {
                    e.push_sql("ON CONFLICT ");
                    e.write_group(|e| e.push_sql(&columns.join(", ")));
                    e.push_sql(" DO NOTHING");
                }
                OnConflict::DoUpdate {
                    columns,
                    assignments,
                } => {
                    e.push_sql("ON CONFLICT ");
                    e.write_group(|e| e.push_sql(&columns.join(", ")));
                    e.push_sql(" DO UPDATE SET ");
                    let inner = opts.merge(RenderOptions::new().qualify(false));
                    for (i, assignment) in assignments.iter().enumerate() {
                        if i > 0 {
                            e.push_sql(", ");
                        }
                        e.write_expr(assignment, inner);
                    }
                }
            },
            Self::Other(other) => return other.clone(),
            Self::Comment(text) => {
                e.push_sql(&format!("-- {text}"));
            }
        }
        e
    }
}

/// Writes additions into `e`: nil additions are filtered, survivors are
/// stable-sorted ascending by weight (ties keep input order) and each
/// is preceded by a single space.
pub fn write_additions(e: &mut Ex, additions: &[Addition], opts: RenderOptions) {
    let mut live: Vec<&Addition> = additions.iter().filter(|a| !a.is_nil()).collect();
    live.sort_by_key(|a| a.weight());
    for addition in live {
        e.push_sql(" ");
        e.write_expr(addition, opts);
    }
}

/// Shorthand for a WHERE addition.
#[must_use]
pub fn where_(cond: Cond) -> Addition {
    Addition::Where(cond)
}

/// Shorthand for a LIMIT addition.
#[must_use]
pub const fn limit(count: u64) -> Addition {
    Addition::Limit {
        count,
        offset: None,
    }
}

/// Shorthand for a LIMIT/OFFSET addition.
#[must_use]
pub const fn limit_offset(count: u64, offset: u64) -> Addition {
    Addition::Limit {
        count,
        offset: Some(offset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cond::Cond;
    use crate::schema::col;

    #[test]
    fn test_additions_sorted_by_weight() {
        let mut forward = Ex::new();
        write_additions(
            &mut forward,
            &[limit(1), where_(col("a").eq(1))],
            RenderOptions::new(),
        );

        let mut reversed = Ex::new();
        write_additions(
            &mut reversed,
            &[where_(col("a").eq(1)), limit(1)],
            RenderOptions::new(),
        );

        assert_eq!(forward, reversed);
        assert_eq!(forward.sql(), " WHERE a = ? LIMIT 1");
    }

    #[test]
    fn test_nil_additions_are_elided() {
        let mut e = Ex::new();
        write_additions(
            &mut e,
            &[where_(Cond::None), Addition::Comment(String::new())],
            RenderOptions::new(),
        );
        assert!(e.is_nil());
    }

    #[test]
    fn test_equal_weights_keep_input_order() {
        let mut e = Ex::new();
        write_additions(
            &mut e,
            &[
                Addition::Other(Ex::raw("FOR UPDATE")),
                Addition::Other(Ex::raw("SKIP LOCKED")),
            ],
            RenderOptions::new(),
        );
        assert_eq!(e.sql(), " FOR UPDATE SKIP LOCKED");
    }

    #[test]
    fn test_comment_renders_last() {
        let mut e = Ex::new();
        write_additions(
            &mut e,
            &[
                Addition::Comment(String::from("paginated")),
                limit_offset(10, 20),
                where_(col("a").is_not_null()),
            ],
            RenderOptions::new(),
        );
        assert_eq!(
            e.sql(),
            " WHERE a IS NOT NULL LIMIT 10 OFFSET 20 -- paginated"
        );
    }

    #[test]
    fn test_group_by_with_having() {
        let group = Addition::GroupBy {
            columns: vec![col("f_status")],
            having: col("cnt").gt(5),
        };
        let e = group.expr(RenderOptions::new());
        assert_eq!(e.sql(), "GROUP BY f_status HAVING cnt > ?");
    }

    #[test]
    fn test_having_without_grouping_columns() {
        let bare = Addition::GroupBy {
            columns: vec![],
            having: col("cnt").gt(5),
        };
        assert!(!bare.is_nil());
        assert_eq!(bare.expr(RenderOptions::new()).sql(), "HAVING cnt > ?");

        let empty = Addition::GroupBy {
            columns: vec![],
            having: Cond::None,
        };
        assert!(empty.is_nil());
    }
}
