//! The expression primitive: query text plus positional arguments.
//!
//! An [`Ex`] is an ordered byte buffer of SQL text with `?` placeholders
//! and an argument list with one entry per placeholder, in left-to-right
//! order. Everything that renders to SQL implements [`SqlExpr`], and
//! composition happens by appending one expression's text and arguments
//! onto another — argument order is exactly placeholder order, so
//! positional binding survives arbitrary nesting.

use crate::render::RenderOptions;
use crate::value::{ToValue, Value};

/// The universal rendering contract.
///
/// An expression whose rendering would be empty must report
/// `is_nil() == true` so composers can elide it silently instead of
/// emitting malformed SQL (`WHERE` with no condition, `IN ()`).
pub trait SqlExpr {
    /// Whether this expression renders to nothing.
    fn is_nil(&self) -> bool {
        false
    }

    /// Renders the expression under the given options.
    fn expr(&self, opts: RenderOptions) -> Ex;
}

/// A positional argument.
///
/// Arguments are not always scalars: a slice expands to one placeholder
/// per element, a nested expression splices its own text in place of the
/// placeholder, and a value-expression substitutes a custom SQL fragment
/// while binding the original value. [`Ex::flatten`] resolves all of
/// these down to scalar [`Value`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// A scalar value, bound to exactly one placeholder.
    Value(Value),
    /// A list of scalars, expanded to one placeholder per element.
    /// Byte slices are [`Value::Bytes`], never lists.
    List(Vec<Value>),
    /// A nested expression whose text replaces the placeholder and
    /// whose arguments are spliced in.
    Expr(Ex),
    /// A custom fragment (e.g. `ST_GeomFromText(?)`) replacing the
    /// placeholder, with the value bound to the fragment's own `?`.
    ValueExpr {
        /// Fragment text containing a single `?`.
        template: String,
        /// The value bound to the fragment's placeholder.
        value: Value,
    },
}

impl Arg {
    /// Creates a scalar argument.
    pub fn value(v: impl ToValue) -> Self {
        Self::Value(v.to_value())
    }

    /// Creates a list argument.
    pub fn list<T: ToValue>(values: impl IntoIterator<Item = T>) -> Self {
        Self::List(values.into_iter().map(ToValue::to_value).collect())
    }

    /// Creates a value-expression argument.
    pub fn value_expr(template: impl Into<String>, value: impl ToValue) -> Self {
        Self::ValueExpr {
            template: template.into(),
            value: value.to_value(),
        }
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

impl From<Ex> for Arg {
    fn from(e: Ex) -> Self {
        Self::Expr(e)
    }
}

/// The concrete expression buffer: SQL text plus positional arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ex {
    sql: String,
    args: Vec<Arg>,
}

impl Ex {
    /// Creates an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sql: String::new(),
            args: Vec::new(),
        }
    }

    /// Creates a buffer from raw SQL with no arguments.
    ///
    /// **Warning**: only use for fragments that contain no user input.
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    /// Returns the SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the arguments.
    #[must_use]
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Appends raw SQL text.
    pub fn push_sql(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Appends an argument without touching the text. The caller is
    /// responsible for having written the matching placeholder.
    pub fn push_arg(&mut self, arg: impl Into<Arg>) {
        self.args.push(arg.into());
    }

    /// Appends a `?` placeholder and its scalar argument.
    pub fn push_value(&mut self, value: impl ToValue) {
        self.sql.push('?');
        self.args.push(Arg::Value(value.to_value()));
    }

    /// Appends another expression's rendered text and arguments.
    ///
    /// This is the single elision point: a nil expression is a no-op,
    /// which makes every higher composer nil-safe without re-checking.
    pub fn write_expr<E: SqlExpr + ?Sized>(&mut self, e: &E, opts: RenderOptions) {
        if e.is_nil() {
            return;
        }
        let ex = e.expr(opts);
        self.sql.push_str(&ex.sql);
        self.args.extend(ex.args);
    }

    /// Wraps the output of `f` in parentheses.
    pub fn write_group<F: FnOnce(&mut Self)>(&mut self, f: F) {
        self.sql.push('(');
        f(self);
        self.sql.push(')');
    }

    /// Counts unescaped `?` placeholders (`??` is an escaped literal).
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        let mut count = 0;
        let mut chars = self.sql.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '?' {
                if chars.peek() == Some(&'?') {
                    chars.next();
                } else {
                    count += 1;
                }
            }
        }
        count
    }

    /// Resolves lists, nested expressions and value-expressions down to
    /// scalar arguments, walking placeholders left to right.
    ///
    /// Idempotent: flattening an already-flat expression is a no-op.
    #[must_use]
    pub fn flatten(self) -> Self {
        let mut sql = String::with_capacity(self.sql.len());
        let mut args = Vec::with_capacity(self.args.len());
        let mut pending = self.args.into_iter();

        let mut chars = self.sql.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '?' {
                sql.push(c);
                continue;
            }
            if chars.peek() == Some(&'?') {
                chars.next();
                sql.push_str("??");
                continue;
            }
            match pending.next() {
                Some(Arg::Value(v)) => {
                    sql.push('?');
                    args.push(Arg::Value(v));
                }
                Some(Arg::List(values)) => {
                    for (i, v) in values.into_iter().enumerate() {
                        if i > 0 {
                            sql.push(',');
                        }
                        sql.push('?');
                        args.push(Arg::Value(v));
                    }
                }
                Some(Arg::Expr(inner)) => {
                    let flat = inner.flatten();
                    sql.push_str(&flat.sql);
                    args.extend(flat.args);
                }
                Some(Arg::ValueExpr { template, value }) => {
                    sql.push_str(&template);
                    args.push(Arg::Value(value));
                }
                // Placeholder without an argument: a caller bug, left
                // in place for tests to catch.
                None => sql.push('?'),
            }
        }
        args.extend(pending);

        Self { sql, args }
    }

    /// Flattens and splits into SQL text and scalar arguments.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<Value>) {
        let flat = self.flatten();
        let mut values = Vec::with_capacity(flat.args.len());
        for arg in flat.args {
            match arg {
                Arg::Value(v) | Arg::ValueExpr { value: v, .. } => values.push(v),
                Arg::List(vs) => values.extend(vs),
                Arg::Expr(inner) => {
                    let (_, inner_values) = inner.into_parts();
                    values.extend(inner_values);
                }
            }
        }
        (flat.sql, values)
    }
}

impl SqlExpr for Ex {
    fn is_nil(&self) -> bool {
        self.sql.is_empty() && self.args.is_empty()
    }

    fn expr(&self, _opts: RenderOptions) -> Ex {
        self.clone()
    }
}

/// Creates a leaf expression from a template and arguments.
///
/// The template may contain positional `?` placeholders and `#`-prefixed
/// identifier pseudo-placeholders. The latter are resolved (the marker
/// is stripped, leaving the identifier text) before arguments are
/// counted, so they never consume an argument. A `#` not followed by an
/// identifier character is consumed and emits nothing.
#[must_use]
pub fn expr(template: &str, args: Vec<Arg>) -> Ex {
    let mut sql = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '#' {
            sql.push(c);
            continue;
        }
        while let Some(&next) = chars.peek() {
            if next.is_ascii_alphanumeric() || next == '_' || next == '.' {
                sql.push(next);
                chars.next();
            } else {
                break;
            }
        }
    }
    Ex { sql, args }
}
