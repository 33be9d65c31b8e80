//! Boolean condition algebra with nil-elision.
//!
//! Conditions form a tree. Composition filters nil operands before
//! rendering: zero survivors render to nothing, a single survivor
//! renders unwrapped, and two or more are each parenthesized and joined
//! by the operator keyword, so precedence is always explicit in the
//! rendered text.

use crate::expr::{Arg, Ex, SqlExpr};
use crate::render::RenderOptions;
use crate::schema::Column;
use crate::value::{ToValue, Value};

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `>=`
    Gte,
}

impl CmpOp {
    /// Returns the SQL token.
    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
        }
    }
}

/// Boolean combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    /// `AND`
    And,
    /// `OR`
    Or,
    /// `XOR`
    Xor,
}

impl BoolOp {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
        }
    }
}

/// A boolean predicate over columns and values.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cond {
    /// The absent condition: renders to nothing, elided everywhere.
    #[default]
    None,
    /// A raw pre-built fragment.
    Raw(Ex),
    /// `col <op> ?` with a bound argument.
    Cmp {
        /// Left-hand column.
        col: Column,
        /// Operator.
        op: CmpOp,
        /// Bound right-hand argument.
        value: Arg,
    },
    /// `col <op> col` between two columns.
    ColCmp {
        /// Left-hand column.
        left: Column,
        /// Operator.
        op: CmpOp,
        /// Right-hand column.
        right: Column,
    },
    /// `col IN (...)` over a value list. An empty list is nil.
    InList {
        /// Tested column.
        col: Column,
        /// Candidate values.
        values: Vec<Value>,
        /// `NOT IN` when set.
        negated: bool,
    },
    /// `col IN (<subquery>)`.
    InExpr {
        /// Tested column.
        col: Column,
        /// The subquery or fragment.
        sub: Ex,
        /// `NOT IN` when set.
        negated: bool,
    },
    /// `col IS [NOT] NULL`.
    Null {
        /// Tested column.
        col: Column,
        /// `IS NOT NULL` when set.
        negated: bool,
    },
    /// `col [NOT] LIKE ?`.
    Like {
        /// Tested column.
        col: Column,
        /// Pattern bound as an argument.
        pattern: String,
        /// `NOT LIKE` when set.
        negated: bool,
    },
    /// `col [NOT] BETWEEN ? AND ?`.
    Between {
        /// Tested column.
        col: Column,
        /// Lower bound.
        low: Value,
        /// Upper bound.
        high: Value,
        /// `NOT BETWEEN` when set.
        negated: bool,
    },
    /// `NOT (<cond>)`.
    Not(Box<Cond>),
    /// An AND/OR/XOR group over child conditions.
    Group {
        /// Combinator keyword.
        op: BoolOp,
        /// Child conditions; nil children are elided at render time.
        children: Vec<Cond>,
    },
}

/// Combines conditions with `AND`.
#[must_use]
pub fn and(conds: impl IntoIterator<Item = Cond>) -> Cond {
    Cond::Group {
        op: BoolOp::And,
        children: conds.into_iter().collect(),
    }
}

/// Combines conditions with `OR`.
#[must_use]
pub fn or(conds: impl IntoIterator<Item = Cond>) -> Cond {
    Cond::Group {
        op: BoolOp::Or,
        children: conds.into_iter().collect(),
    }
}

/// Combines conditions with `XOR`.
#[must_use]
pub fn xor(conds: impl IntoIterator<Item = Cond>) -> Cond {
    Cond::Group {
        op: BoolOp::Xor,
        children: conds.into_iter().collect(),
    }
}

impl Cond {
    /// Chains with `AND`. Sugar over [`and`]; a chained call on an
    /// existing AND group extends it, so the rendered output is
    /// identical to the free-function form of the same tree.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::Group {
                op: BoolOp::And,
                mut children,
            } => {
                children.push(other);
                Self::Group {
                    op: BoolOp::And,
                    children,
                }
            }
            _ => and([self, other]),
        }
    }

    /// Chains with `OR`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Group {
                op: BoolOp::Or,
                mut children,
            } => {
                children.push(other);
                Self::Group {
                    op: BoolOp::Or,
                    children,
                }
            }
            _ => or([self, other]),
        }
    }

    /// Chains with `XOR`.
    #[must_use]
    pub fn xor(self, other: Self) -> Self {
        match self {
            Self::Group {
                op: BoolOp::Xor,
                mut children,
            } => {
                children.push(other);
                Self::Group {
                    op: BoolOp::Xor,
                    children,
                }
            }
            _ => xor([self, other]),
        }
    }

    /// Negates the condition. Negating a nil condition stays nil.
    #[must_use]
    pub fn negate(self) -> Self {
        if self.is_nil() {
            Self::None
        } else {
            Self::Not(Box::new(self))
        }
    }
}

impl SqlExpr for Cond {
    fn is_nil(&self) -> bool {
        match self {
            Self::None => true,
            Self::Raw(e) => e.is_nil(),
            Self::InList { values, .. } => values.is_empty(),
            Self::InExpr { sub, .. } => sub.is_nil(),
            Self::Not(inner) => inner.is_nil(),
            Self::Group { children, .. } => children.iter().all(Self::is_nil),
            _ => false,
        }
    }

    fn expr(&self, opts: RenderOptions) -> Ex {
        let mut e = Ex::new();
        match self {
            Self::None => {}
            Self::Raw(raw) => return raw.clone(),
            Self::Cmp { col, op, value } => {
                e.write_expr(col, opts);
                e.push_sql(&format!(" {} ?", op.sql()));
                e.push_arg(value.clone());
            }
            Self::ColCmp { left, op, right } => {
                e.write_expr(left, opts);
                e.push_sql(&format!(" {} ", op.sql()));
                e.write_expr(right, opts);
            }
            Self::InList {
                col,
                values,
                negated,
            } => {
                if values.is_empty() {
                    return e;
                }
                e.write_expr(col, opts);
                e.push_sql(if *negated { " NOT IN (?)" } else { " IN (?)" });
                e.push_arg(Arg::List(values.clone()));
            }
            Self::InExpr { col, sub, negated } => {
                e.write_expr(col, opts);
                e.push_sql(if *negated { " NOT IN (?)" } else { " IN (?)" });
                e.push_arg(Arg::Expr(sub.clone()));
            }
            Self::Null { col, negated } => {
                e.write_expr(col, opts);
                e.push_sql(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Self::Like {
                col,
                pattern,
                negated,
            } => {
                e.write_expr(col, opts);
                e.push_sql(if *negated { " NOT LIKE ?" } else { " LIKE ?" });
                e.push_arg(Arg::value(pattern.clone()));
            }
            Self::Between {
                col,
                low,
                high,
                negated,
            } => {
                e.write_expr(col, opts);
                e.push_sql(if *negated {
                    " NOT BETWEEN ? AND ?"
                } else {
                    " BETWEEN ? AND ?"
                });
                e.push_arg(low.clone());
                e.push_arg(high.clone());
            }
            Self::Not(inner) => {
                if inner.is_nil() {
                    return e;
                }
                e.push_sql("NOT ");
                e.write_group(|e| e.write_expr(inner.as_ref(), opts));
            }
            Self::Group { op, children } => {
                let live: Vec<&Self> = children.iter().filter(|c| !c.is_nil()).collect();
                match live.as_slice() {
                    [] => {}
                    [only] => return only.expr(opts),
                    many => {
                        for (i, child) in many.iter().enumerate() {
                            if i > 0 {
                                e.push_sql(&format!(" {} ", op.keyword()));
                            }
                            e.write_group(|e| e.write_expr(*child, opts));
                        }
                    }
                }
            }
        }
        e
    }
}

/// Implemented by values that build their own predicate for a column.
///
/// [`Column::in_one`] with a single operand defers entirely to the
/// operand's predicate instead of emitting `IN`.
pub trait ColumnPredicate {
    /// Builds the predicate testing `col` against `self`.
    fn predicate(self, col: Column) -> Cond;
}

impl ColumnPredicate for Ex {
    fn predicate(self, col: Column) -> Cond {
        Cond::InExpr {
            col,
            sub: self,
            negated: false,
        }
    }
}

impl Column {
    /// `col = ?`
    #[must_use]
    pub fn eq(self, value: impl ToValue) -> Cond {
        Cond::Cmp {
            col: self,
            op: CmpOp::Eq,
            value: Arg::value(value),
        }
    }

    /// `col <> ?`
    #[must_use]
    pub fn ne(self, value: impl ToValue) -> Cond {
        Cond::Cmp {
            col: self,
            op: CmpOp::Ne,
            value: Arg::value(value),
        }
    }

    /// `col < ?`
    #[must_use]
    pub fn lt(self, value: impl ToValue) -> Cond {
        Cond::Cmp {
            col: self,
            op: CmpOp::Lt,
            value: Arg::value(value),
        }
    }

    /// `col <= ?`
    #[must_use]
    pub fn lte(self, value: impl ToValue) -> Cond {
        Cond::Cmp {
            col: self,
            op: CmpOp::Lte,
            value: Arg::value(value),
        }
    }

    /// `col > ?`
    #[must_use]
    pub fn gt(self, value: impl ToValue) -> Cond {
        Cond::Cmp {
            col: self,
            op: CmpOp::Gt,
            value: Arg::value(value),
        }
    }

    /// `col >= ?`
    #[must_use]
    pub fn gte(self, value: impl ToValue) -> Cond {
        Cond::Cmp {
            col: self,
            op: CmpOp::Gte,
            value: Arg::value(value),
        }
    }

    /// `col = other_col`
    #[must_use]
    pub fn eq_col(self, other: Self) -> Cond {
        Cond::ColCmp {
            left: self,
            op: CmpOp::Eq,
            right: other,
        }
    }

    /// `col IS NULL`
    #[must_use]
    pub fn is_null(self) -> Cond {
        Cond::Null {
            col: self,
            negated: false,
        }
    }

    /// `col IS NOT NULL`
    #[must_use]
    pub fn is_not_null(self) -> Cond {
        Cond::Null {
            col: self,
            negated: true,
        }
    }

    /// `col LIKE ?`
    #[must_use]
    pub fn like(self, pattern: &str) -> Cond {
        Cond::Like {
            col: self,
            pattern: String::from(pattern),
            negated: false,
        }
    }

    /// `col NOT LIKE ?`
    #[must_use]
    pub fn not_like(self, pattern: &str) -> Cond {
        Cond::Like {
            col: self,
            pattern: String::from(pattern),
            negated: true,
        }
    }

    /// `col BETWEEN ? AND ?`
    #[must_use]
    pub fn between(self, low: impl ToValue, high: impl ToValue) -> Cond {
        Cond::Between {
            col: self,
            low: low.to_value(),
            high: high.to_value(),
            negated: false,
        }
    }

    /// `col IN (?, ...)`. Zero values yield a nil condition, never the
    /// invalid `IN ()`.
    #[must_use]
    pub fn in_list<T: ToValue>(self, values: impl IntoIterator<Item = T>) -> Cond {
        let values: Vec<Value> = values.into_iter().map(ToValue::to_value).collect();
        if values.is_empty() {
            return Cond::None;
        }
        Cond::InList {
            col: self,
            values,
            negated: false,
        }
    }

    /// `col NOT IN (?, ...)`. Zero values yield a nil condition.
    #[must_use]
    pub fn not_in_list<T: ToValue>(self, values: impl IntoIterator<Item = T>) -> Cond {
        let values: Vec<Value> = values.into_iter().map(ToValue::to_value).collect();
        if values.is_empty() {
            return Cond::None;
        }
        Cond::InList {
            col: self,
            values,
            negated: true,
        }
    }

    /// `col IN (<subquery>)` over a pre-built expression.
    #[must_use]
    pub fn in_expr(self, sub: Ex) -> Cond {
        Cond::InExpr {
            col: self,
            sub,
            negated: false,
        }
    }

    /// Defers to the operand's own predicate for this column. An
    /// expression operand renders as `IN (<expr>)`; custom operand
    /// types may emit something else entirely.
    #[must_use]
    pub fn in_one(self, operand: impl ColumnPredicate) -> Cond {
        operand.predicate(self)
    }
}
