//! Render options threaded through every render call.
//!
//! The same [`Column`](crate::schema::Column) value renders differently
//! depending on where it sits: bare (`col`), table-qualified
//! (`table.col`), in an alias position (`table.col AS col`), or as the
//! value side of an assignment. Rather than ambient state, these toggles
//! travel as an explicit, copyable options value. Each field is
//! tri-state so a toggle set at an outer scope persists inward unless a
//! nesting level explicitly overrides it.

/// Rendering toggles, merged (never replaced) at each nesting level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Render bare columns as `table.col`. Auto-enabled for statements
    /// carrying a JOIN addition.
    pub qualify_columns: Option<bool>,
    /// Render columns in projection position as `table.col AS col`.
    pub use_alias: Option<bool>,
    /// Render assignments as the value alone (`?`) instead of
    /// `col = ?`, for VALUES lists.
    pub value_only: Option<bool>,
}

impl RenderOptions {
    /// Creates options with every toggle unset.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            qualify_columns: None,
            use_alias: None,
            value_only: None,
        }
    }

    /// Sets the column-qualification toggle.
    #[must_use]
    pub const fn qualify(mut self, on: bool) -> Self {
        self.qualify_columns = Some(on);
        self
    }

    /// Sets the alias toggle.
    #[must_use]
    pub const fn alias(mut self, on: bool) -> Self {
        self.use_alias = Some(on);
        self
    }

    /// Sets the value-only assignment toggle.
    #[must_use]
    pub const fn values_only(mut self, on: bool) -> Self {
        self.value_only = Some(on);
        self
    }

    /// Merges `inner` over `self`: toggles set in `inner` win, unset
    /// toggles inherit from `self`.
    #[must_use]
    pub const fn merge(self, inner: Self) -> Self {
        Self {
            qualify_columns: match inner.qualify_columns {
                Some(v) => Some(v),
                None => self.qualify_columns,
            },
            use_alias: match inner.use_alias {
                Some(v) => Some(v),
                None => self.use_alias,
            },
            value_only: match inner.value_only {
                Some(v) => Some(v),
                None => self.value_only,
            },
        }
    }

    /// Whether columns render table-qualified.
    #[must_use]
    pub fn is_qualified(&self) -> bool {
        self.qualify_columns.unwrap_or(false)
    }

    /// Whether columns render with an `AS` alias.
    #[must_use]
    pub fn is_aliased(&self) -> bool {
        self.use_alias.unwrap_or(false)
    }

    /// Whether assignments render the value side alone.
    #[must_use]
    pub fn is_value_only(&self) -> bool {
        self.value_only.unwrap_or(false)
    }
}
