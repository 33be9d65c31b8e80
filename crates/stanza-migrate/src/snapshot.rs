//! Schema snapshots: a [`Database`] serialized to a JSON file.
//!
//! A snapshot is the portable form of a schema. `introspect` writes
//! one from a live database; `plan` and `apply` read one as the
//! declared shape to converge onto.

use std::path::Path;

use stanza_core::Database;

use crate::error::{MigrateError, Result};

/// Reads a database description from a JSON snapshot file.
pub fn load(path: &Path) -> Result<Database> {
    if !path.exists() {
        return Err(MigrateError::SnapshotNotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Writes a database description to a JSON snapshot file.
pub fn store(path: &Path, database: &Database) -> Result<()> {
    let text = serde_json::to_string_pretty(database)?;
    std::fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stanza_core::schema::{bigint, table, varchar, Key};

    fn sample() -> Database {
        Database::new("app").table(
            table("t_user")
                .column(bigint("f_id").auto_increment())
                .column(varchar("f_name", 64).not_null())
                .key(Key::primary(&["f_id"]))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_round_trip_preserves_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");

        store(&path, &sample()).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        assert!(matches!(
            load(&path),
            Err(MigrateError::SnapshotNotFound(_))
        ));
    }
}
