//! Index and primary-key metadata.

use serde::{Deserialize, Serialize};

/// An index over one or more columns, including the primary key.
///
/// A primary key is unique by construction; there is no way to build a
/// primary [`Key`] with `unique == false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    /// Index name. For primary keys this is a placeholder; the
    /// canonical name is dialect-specific and resolved at diff time.
    pub name: String,
    /// Names of the covered columns, in index order.
    pub columns: Vec<String>,
    /// Whether the index is unique.
    pub unique: bool,
    /// Whether this is the primary key.
    pub primary: bool,
}

impl Key {
    /// Creates a plain (non-unique) index.
    #[must_use]
    pub fn index(name: &str, columns: &[&str]) -> Self {
        Self {
            name: String::from(name),
            columns: columns.iter().map(|c| String::from(*c)).collect(),
            unique: false,
            primary: false,
        }
    }

    /// Creates a unique index.
    #[must_use]
    pub fn unique(name: &str, columns: &[&str]) -> Self {
        Self {
            unique: true,
            ..Self::index(name, columns)
        }
    }

    /// Creates the primary key. Primary implies unique.
    #[must_use]
    pub fn primary(columns: &[&str]) -> Self {
        Self {
            primary: true,
            unique: true,
            ..Self::index("primary", columns)
        }
    }

    /// The covered column names joined for textual comparison.
    #[must_use]
    pub fn columns_text(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.to_lowercase())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// The index collection of a table. Appended to exactly once during
/// construction or introspection, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keys(pub(crate) Vec<Key>);

impl Keys {
    /// Returns the keys in declaration order.
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, Key> {
        self.0.iter()
    }

    /// Looks up a key by name, case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Key> {
        self.0
            .iter()
            .find(|k| k.name.eq_ignore_ascii_case(name))
    }

    /// Returns the primary key, if declared.
    #[must_use]
    pub fn primary(&self) -> Option<&Key> {
        self.0.iter().find(|k| k.primary)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Keys {
    type Item = &'a Key;
    type IntoIter = std::slice::Iter<'a, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
