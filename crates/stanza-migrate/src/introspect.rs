//! Live-schema introspection.
//!
//! Reads `information_schema` (and the PostgreSQL catalogs) back into
//! the same [`Database`] model a declared schema uses, so the diff
//! engine can compare the two shapes directly.

use sqlx::mysql::MySqlPool;
use sqlx::postgres::PgPool;
use sqlx::Row;

use stanza_core::schema::{Column, ColumnKind, ColumnType, Key};
use stanza_core::{table, Database};

use crate::error::{MigrateError, Result};

/// Maps a MySQL `DATA_TYPE` to a column kind.
fn mysql_kind(data_type: &str) -> Option<ColumnKind> {
    match data_type {
        "tinyint" => Some(ColumnKind::Bool),
        "smallint" => Some(ColumnKind::SmallInt),
        "int" | "mediumint" => Some(ColumnKind::Int),
        "bigint" => Some(ColumnKind::BigInt),
        "float" => Some(ColumnKind::Float),
        "double" => Some(ColumnKind::Double),
        "decimal" => Some(ColumnKind::Decimal),
        "char" => Some(ColumnKind::Char),
        "varchar" => Some(ColumnKind::Varchar),
        "text" | "tinytext" | "mediumtext" | "longtext" => Some(ColumnKind::Text),
        "binary" | "varbinary" | "blob" | "tinyblob" | "mediumblob" | "longblob" => {
            Some(ColumnKind::Bytes)
        }
        "date" => Some(ColumnKind::Date),
        "time" => Some(ColumnKind::Time),
        "datetime" => Some(ColumnKind::DateTime),
        "timestamp" => Some(ColumnKind::Timestamp),
        "json" => Some(ColumnKind::Json),
        _ => None,
    }
}

/// Maps a PostgreSQL `data_type` to a column kind.
fn postgres_kind(data_type: &str) -> Option<ColumnKind> {
    match data_type {
        "boolean" => Some(ColumnKind::Bool),
        "smallint" => Some(ColumnKind::SmallInt),
        "integer" => Some(ColumnKind::Int),
        "bigint" => Some(ColumnKind::BigInt),
        "real" => Some(ColumnKind::Float),
        "double precision" => Some(ColumnKind::Double),
        "numeric" => Some(ColumnKind::Decimal),
        "character" => Some(ColumnKind::Char),
        "character varying" => Some(ColumnKind::Varchar),
        "text" => Some(ColumnKind::Text),
        "bytea" => Some(ColumnKind::Bytes),
        "date" => Some(ColumnKind::Date),
        "time without time zone" => Some(ColumnKind::Time),
        "timestamp without time zone" => Some(ColumnKind::DateTime),
        "timestamp with time zone" => Some(ColumnKind::Timestamp),
        "json" | "jsonb" => Some(ColumnKind::Json),
        _ => None,
    }
}

/// Columns and keys accumulated per table while walking result rows.
#[derive(Default)]
struct RawTable {
    columns: Vec<Column>,
    keys: Vec<Key>,
}

/// Tables in first-seen order.
#[derive(Default)]
struct RawSchema(Vec<(String, RawTable)>);

impl RawSchema {
    fn entry(&mut self, name: &str) -> &mut RawTable {
        if let Some(i) = self.0.iter().position(|(n, _)| n == name) {
            return &mut self.0[i].1;
        }
        self.0.push((String::from(name), RawTable::default()));
        let last = self.0.len() - 1;
        &mut self.0[last].1
    }

    fn into_database(self, name: &str) -> Result<Database> {
        let mut database = Database::new(name);
        for (table_name, raw) in self.0 {
            let mut builder = table(&table_name).columns(raw.columns);
            for key in raw.keys {
                builder = builder.key(key);
            }
            database = database.table(builder.build()?);
        }
        Ok(database)
    }
}

/// Appends one index column to the key collection, creating the key on
/// first sight.
fn push_key_column(keys: &mut Vec<Key>, name: &str, column: &str, unique: bool, primary: bool) {
    if let Some(key) = keys.iter_mut().find(|k| k.name == name) {
        key.columns.push(String::from(column));
        return;
    }
    keys.push(Key {
        name: String::from(name),
        columns: vec![String::from(column)],
        unique,
        primary,
    });
}

/// Introspects a MySQL database into the declared-schema model.
pub async fn introspect_mysql(pool: &MySqlPool, database: &str) -> Result<Database> {
    let mut schema = RawSchema::default();

    let columns = sqlx::query(
        "SELECT TABLE_NAME AS table_name, COLUMN_NAME AS column_name, \
                DATA_TYPE AS data_type, IS_NULLABLE AS is_nullable, \
                CHARACTER_MAXIMUM_LENGTH AS max_length, \
                NUMERIC_PRECISION AS num_precision, NUMERIC_SCALE AS num_scale, \
                COLUMN_DEFAULT AS column_default, EXTRA AS extra \
         FROM information_schema.columns \
         WHERE TABLE_SCHEMA = ? \
         ORDER BY TABLE_NAME, ORDINAL_POSITION",
    )
    .bind(database)
    .fetch_all(pool)
    .await?;

    for row in &columns {
        let table_name: String = row.try_get("table_name")?;
        let column_name: String = row.try_get("column_name")?;
        let data_type: String = row.try_get("data_type")?;
        let is_nullable: String = row.try_get("is_nullable")?;
        let max_length: Option<u64> = row.try_get("max_length")?;
        let num_precision: Option<u64> = row.try_get("num_precision")?;
        let num_scale: Option<u64> = row.try_get("num_scale")?;
        let column_default: Option<String> = row.try_get("column_default")?;
        let extra: String = row.try_get("extra")?;

        let kind = mysql_kind(&data_type).ok_or_else(|| MigrateError::UnknownDataType {
            table: table_name.clone(),
            column: column_name.clone(),
            data_type: data_type.clone(),
        })?;

        let mut typ = ColumnType::of(kind);
        typ.nullable = is_nullable.eq_ignore_ascii_case("yes");
        typ.auto_increment = extra.to_ascii_lowercase().contains("auto_increment");
        if matches!(kind, ColumnKind::Char | ColumnKind::Varchar) {
            typ.length = max_length.map(|l| u32::try_from(l).unwrap_or(u32::MAX));
        }
        if kind == ColumnKind::Decimal {
            typ.precision = num_precision.map(|p| u8::try_from(p).unwrap_or(u8::MAX));
            typ.scale = num_scale.map(|s| u8::try_from(s).unwrap_or(u8::MAX));
        }
        typ.default = column_default;

        schema
            .entry(&table_name)
            .columns
            .push(Column::of(&column_name, typ));
    }

    let indexes = sqlx::query(
        "SELECT TABLE_NAME AS table_name, INDEX_NAME AS index_name, \
                COLUMN_NAME AS column_name, NON_UNIQUE AS non_unique \
         FROM information_schema.statistics \
         WHERE TABLE_SCHEMA = ? \
         ORDER BY TABLE_NAME, INDEX_NAME, SEQ_IN_INDEX",
    )
    .bind(database)
    .fetch_all(pool)
    .await?;

    for row in &indexes {
        let table_name: String = row.try_get("table_name")?;
        let index_name: String = row.try_get("index_name")?;
        let column_name: String = row.try_get("column_name")?;
        let non_unique: i64 = row.try_get("non_unique")?;

        let primary = index_name.eq_ignore_ascii_case("primary");
        push_key_column(
            &mut schema.entry(&table_name).keys,
            &index_name,
            &column_name,
            non_unique == 0,
            primary,
        );
    }

    schema.into_database(database)
}

/// Introspects the `public` schema of a PostgreSQL database.
pub async fn introspect_postgres(pool: &PgPool, database: &str) -> Result<Database> {
    let mut schema = RawSchema::default();

    let columns = sqlx::query(
        "SELECT table_name, column_name, data_type, is_nullable, \
                character_maximum_length, numeric_precision, numeric_scale, \
                column_default \
         FROM information_schema.columns \
         WHERE table_schema = 'public' \
         ORDER BY table_name, ordinal_position",
    )
    .fetch_all(pool)
    .await?;

    for row in &columns {
        let table_name: String = row.try_get("table_name")?;
        let column_name: String = row.try_get("column_name")?;
        let data_type: String = row.try_get("data_type")?;
        let is_nullable: String = row.try_get("is_nullable")?;
        let max_length: Option<i32> = row.try_get("character_maximum_length")?;
        let num_precision: Option<i32> = row.try_get("numeric_precision")?;
        let num_scale: Option<i32> = row.try_get("numeric_scale")?;
        let column_default: Option<String> = row.try_get("column_default")?;

        let kind = postgres_kind(&data_type).ok_or_else(|| MigrateError::UnknownDataType {
            table: table_name.clone(),
            column: column_name.clone(),
            data_type: data_type.clone(),
        })?;

        // A serial column reports itself as an integer with a
        // nextval() default.
        let auto_increment = column_default
            .as_deref()
            .is_some_and(|d| d.starts_with("nextval("));

        let mut typ = ColumnType::of(kind);
        typ.nullable = is_nullable.eq_ignore_ascii_case("yes");
        typ.auto_increment = auto_increment;
        if matches!(kind, ColumnKind::Char | ColumnKind::Varchar) {
            typ.length = max_length.map(|l| u32::try_from(l).unwrap_or(u32::MAX));
        }
        if kind == ColumnKind::Decimal {
            typ.precision = num_precision.map(|p| u8::try_from(p).unwrap_or(u8::MAX));
            typ.scale = num_scale.map(|s| u8::try_from(s).unwrap_or(u8::MAX));
        }
        if !auto_increment {
            typ.default = column_default;
        }

        schema
            .entry(&table_name)
            .columns
            .push(Column::of(&column_name, typ));
    }

    let indexes = sqlx::query(
        "SELECT t.relname AS table_name, i.relname AS index_name, \
                a.attname AS column_name, ix.indisunique AS is_unique, \
                ix.indisprimary AS is_primary \
         FROM pg_class t \
         JOIN pg_index ix ON t.oid = ix.indrelid \
         JOIN pg_class i ON i.oid = ix.indexrelid \
         JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = ANY(ix.indkey) \
         JOIN pg_namespace n ON n.oid = t.relnamespace \
         WHERE n.nspname = 'public' \
         ORDER BY t.relname, i.relname, a.attnum",
    )
    .fetch_all(pool)
    .await?;

    for row in &indexes {
        let table_name: String = row.try_get("table_name")?;
        let index_name: String = row.try_get("index_name")?;
        let column_name: String = row.try_get("column_name")?;
        let is_unique: bool = row.try_get("is_unique")?;
        let is_primary: bool = row.try_get("is_primary")?;

        push_key_column(
            &mut schema.entry(&table_name).keys,
            &index_name,
            &column_name,
            is_unique,
            is_primary,
        );
    }

    schema.into_database(database)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mysql_kind_mapping() {
        assert_eq!(mysql_kind("tinyint"), Some(ColumnKind::Bool));
        assert_eq!(mysql_kind("varchar"), Some(ColumnKind::Varchar));
        assert_eq!(mysql_kind("longtext"), Some(ColumnKind::Text));
        assert_eq!(mysql_kind("geometry"), None);
    }

    #[test]
    fn test_postgres_kind_mapping() {
        assert_eq!(postgres_kind("character varying"), Some(ColumnKind::Varchar));
        assert_eq!(
            postgres_kind("timestamp with time zone"),
            Some(ColumnKind::Timestamp)
        );
        assert_eq!(postgres_kind("jsonb"), Some(ColumnKind::Json));
        assert_eq!(postgres_kind("tsvector"), None);
    }

    #[test]
    fn test_key_columns_accumulate_in_order() {
        let mut keys = Vec::new();
        push_key_column(&mut keys, "i_ab", "f_a", false, false);
        push_key_column(&mut keys, "i_ab", "f_b", false, false);
        push_key_column(&mut keys, "PRIMARY", "f_id", true, true);

        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].columns, vec!["f_a", "f_b"]);
        assert!(keys[1].primary);
    }

    #[test]
    fn test_raw_schema_preserves_table_order() {
        let mut schema = RawSchema::default();
        schema.entry("t_b").columns.push(stanza_core::col("f_x"));
        schema.entry("t_a").columns.push(stanza_core::col("f_y"));
        schema.entry("t_b").keys.push(Key::index("i_x", &["f_x"]));

        let db = schema.into_database("app").unwrap();
        assert_eq!(db.tables[0].name, "t_b");
        assert_eq!(db.tables[1].name, "t_a");
        assert_eq!(db.tables[0].keys().len(), 1);
    }
}
