//! Column metadata and the value-style column builder.
//!
//! A [`Column`] is a reusable template: every "mutating" method takes
//! the receiver by value and returns a modified copy, so the same
//! declaration (`varchar("f_name", 128)`) can be attached to many
//! tables without shared state.

use serde::{Deserialize, Serialize};

use crate::expr::{Ex, SqlExpr};
use crate::render::RenderOptions;

/// The underlying scalar kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Boolean.
    Bool,
    /// 16-bit integer.
    SmallInt,
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    BigInt,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Fixed-point decimal.
    Decimal,
    /// Fixed-length character string.
    Char,
    /// Variable-length character string.
    Varchar,
    /// Unbounded text.
    Text,
    /// Binary blob.
    Bytes,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time without zone.
    DateTime,
    /// Date and time with zone.
    Timestamp,
    /// JSON document.
    Json,
}

/// The full type description of a column.
///
/// The rendered data-type text is never computed here; it is delegated
/// to the dialect at DDL-generation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnType {
    /// Underlying scalar kind.
    pub kind: ColumnKind,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Length for character/binary kinds.
    pub length: Option<u32>,
    /// Precision for decimal kinds.
    pub precision: Option<u8>,
    /// Scale for decimal kinds.
    pub scale: Option<u8>,
    /// Default value as a pre-rendered literal.
    pub default: Option<String>,
    /// ON UPDATE clause (e.g. `CURRENT_TIMESTAMP`).
    pub on_update: Option<String>,
    /// Whether the column auto-increments.
    pub auto_increment: bool,
    /// Deprecation marker: the previous name this column was renamed
    /// from.
    pub renamed_from: Option<String>,
}

impl ColumnType {
    /// Creates a type of the given kind with every option unset.
    #[must_use]
    pub const fn of(kind: ColumnKind) -> Self {
        Self {
            kind,
            nullable: true,
            length: None,
            precision: None,
            scale: None,
            default: None,
            on_update: None,
            auto_increment: false,
            renamed_from: None,
        }
    }
}

impl Default for ColumnType {
    fn default() -> Self {
        Self::of(ColumnKind::Varchar)
    }
}

/// A column reference plus its declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Owning table, stamped at table construction.
    pub table: Option<String>,
    /// Optional alias for projection positions.
    pub alias: Option<String>,
    /// Declared type.
    pub typ: ColumnType,
}

/// Creates a column reference with a default (VARCHAR) type.
#[must_use]
pub fn col(name: &str) -> Column {
    Column::of(name, ColumnType::default())
}

impl Column {
    /// Creates a column with an explicit type.
    #[must_use]
    pub fn of(name: &str, typ: ColumnType) -> Self {
        Self {
            name: String::from(name),
            table: None,
            alias: None,
            typ,
        }
    }

    /// Returns a copy attached to the given table.
    #[must_use]
    pub fn on(mut self, table: &str) -> Self {
        self.table = Some(String::from(table));
        self
    }

    /// Returns a copy with a projection alias.
    #[must_use]
    pub fn aliased(mut self, alias: &str) -> Self {
        self.alias = Some(String::from(alias));
        self
    }

    /// Returns a copy marked NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.typ.nullable = false;
        self
    }

    /// Returns a copy marked nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.typ.nullable = true;
        self
    }

    /// Returns a copy marked auto-increment.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.typ.auto_increment = true;
        self.typ.nullable = false;
        self
    }

    /// Returns a copy with the given length.
    #[must_use]
    pub fn length(mut self, length: u32) -> Self {
        self.typ.length = Some(length);
        self
    }

    /// Returns a copy with decimal precision and scale.
    #[must_use]
    pub fn decimal(mut self, precision: u8, scale: u8) -> Self {
        self.typ.precision = Some(precision);
        self.typ.scale = Some(scale);
        self
    }

    /// Returns a copy with a default-value literal.
    #[must_use]
    pub fn default_value(mut self, literal: &str) -> Self {
        self.typ.default = Some(String::from(literal));
        self
    }

    /// Returns a copy with an ON UPDATE clause.
    #[must_use]
    pub fn on_update(mut self, clause: &str) -> Self {
        self.typ.on_update = Some(String::from(clause));
        self
    }

    /// Returns a copy carrying a rename marker.
    #[must_use]
    pub fn renamed_from(mut self, previous: &str) -> Self {
        self.typ.renamed_from = Some(String::from(previous));
        self
    }

    /// Returns the qualified name under the given options.
    #[must_use]
    pub fn qualified_name(&self, opts: RenderOptions) -> String {
        match (&self.table, opts.is_qualified()) {
            (Some(t), true) => format!("{t}.{}", self.name),
            _ => self.name.clone(),
        }
    }
}

impl SqlExpr for Column {
    fn is_nil(&self) -> bool {
        self.name.is_empty()
    }

    fn expr(&self, opts: RenderOptions) -> Ex {
        let base = self.qualified_name(opts);
        if opts.is_aliased() {
            if let Some(alias) = &self.alias {
                return Ex::raw(format!("{base} AS {alias}"));
            }
            if opts.is_qualified() && self.table.is_some() {
                return Ex::raw(format!("{base} AS {}", self.name));
            }
        }
        Ex::raw(base)
    }
}

// Shorthand constructors, one per kind in common use.

/// Creates a BOOLEAN column.
#[must_use]
pub fn boolean(name: &str) -> Column {
    Column::of(name, ColumnType::of(ColumnKind::Bool))
}

/// Creates a SMALLINT column.
#[must_use]
pub fn smallint(name: &str) -> Column {
    Column::of(name, ColumnType::of(ColumnKind::SmallInt))
}

/// Creates an INT column.
#[must_use]
pub fn integer(name: &str) -> Column {
    Column::of(name, ColumnType::of(ColumnKind::Int))
}

/// Creates a BIGINT column.
#[must_use]
pub fn bigint(name: &str) -> Column {
    Column::of(name, ColumnType::of(ColumnKind::BigInt))
}

/// Creates a FLOAT column.
#[must_use]
pub fn float(name: &str) -> Column {
    Column::of(name, ColumnType::of(ColumnKind::Float))
}

/// Creates a DOUBLE column.
#[must_use]
pub fn double(name: &str) -> Column {
    Column::of(name, ColumnType::of(ColumnKind::Double))
}

/// Creates a DECIMAL column.
#[must_use]
pub fn decimal(name: &str, precision: u8, scale: u8) -> Column {
    Column::of(name, ColumnType::of(ColumnKind::Decimal)).decimal(precision, scale)
}

/// Creates a CHAR column.
#[must_use]
pub fn fixed_char(name: &str, length: u32) -> Column {
    Column::of(name, ColumnType::of(ColumnKind::Char)).length(length)
}

/// Creates a VARCHAR column.
#[must_use]
pub fn varchar(name: &str, length: u32) -> Column {
    Column::of(name, ColumnType::of(ColumnKind::Varchar)).length(length)
}

/// Creates a TEXT column.
#[must_use]
pub fn text(name: &str) -> Column {
    Column::of(name, ColumnType::of(ColumnKind::Text))
}

/// Creates a binary blob column.
#[must_use]
pub fn bytes(name: &str) -> Column {
    Column::of(name, ColumnType::of(ColumnKind::Bytes))
}

/// Creates a DATE column.
#[must_use]
pub fn date(name: &str) -> Column {
    Column::of(name, ColumnType::of(ColumnKind::Date))
}

/// Creates a TIME column.
#[must_use]
pub fn time(name: &str) -> Column {
    Column::of(name, ColumnType::of(ColumnKind::Time))
}

/// Creates a DATETIME column.
#[must_use]
pub fn datetime(name: &str) -> Column {
    Column::of(name, ColumnType::of(ColumnKind::DateTime))
}

/// Creates a TIMESTAMP column.
#[must_use]
pub fn timestamp(name: &str) -> Column {
    Column::of(name, ColumnType::of(ColumnKind::Timestamp))
}

/// Creates a JSON column.
#[must_use]
pub fn json(name: &str) -> Column {
    Column::of(name, ColumnType::of(ColumnKind::Json))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_reuse_is_copy_on_write() {
        let template = varchar("f_a", 64);
        let on_t1 = template.clone().on("t1");
        let on_t2 = template.clone().on("t2");
        assert_eq!(template.table, None);
        assert_eq!(on_t1.table.as_deref(), Some("t1"));
        assert_eq!(on_t2.table.as_deref(), Some("t2"));
    }

    #[test]
    fn test_bare_rendering() {
        let c = col("f_a").on("t");
        assert_eq!(c.expr(RenderOptions::new()).sql(), "f_a");
    }

    #[test]
    fn test_qualified_rendering() {
        let c = col("f_a").on("t");
        let opts = RenderOptions::new().qualify(true);
        assert_eq!(c.expr(opts).sql(), "t.f_a");
    }

    #[test]
    fn test_alias_rendering() {
        let c = col("f_a").on("t");
        let opts = RenderOptions::new().qualify(true).alias(true);
        assert_eq!(c.expr(opts).sql(), "t.f_a AS f_a");

        let aliased = col("f_a").on("t").aliased("a");
        assert_eq!(aliased.expr(opts).sql(), "t.f_a AS a");
    }

    #[test]
    fn test_auto_increment_implies_not_null() {
        let c = bigint("f_id").auto_increment();
        assert!(c.typ.auto_increment);
        assert!(!c.typ.nullable);
    }
}
