//! # stanza-postgres
//!
//! PostgreSQL dialect: double-quoted identifiers, `SERIAL` families,
//! clause-list `ALTER COLUMN`, and the `<table>_pkey` constraint naming.

use stanza_core::expr::Ex;
use stanza_core::schema::{Column, ColumnKind, ColumnType, Key, Table};
use stanza_core::Dialect;

/// The PostgreSQL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    fn key_columns(&self, key: &Key) -> String {
        key.columns
            .iter()
            .map(|c| self.quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The serial pseudo-type standing in for an auto-incrementing
    /// integer column of the given kind.
    fn serial_type(kind: ColumnKind) -> &'static str {
        match kind {
            ColumnKind::SmallInt => "SMALLSERIAL",
            ColumnKind::BigInt => "BIGSERIAL",
            _ => "SERIAL",
        }
    }
}

impl Dialect for PostgresDialect {
    fn driver_name(&self) -> &'static str {
        "postgres"
    }

    /// PostgreSQL names the primary key constraint after the table.
    fn primary_key_name(&self, table: &Table) -> String {
        format!("{}_pkey", table.name)
    }

    /// SQLSTATE 3D000: invalid_catalog_name.
    fn is_unknown_database_error(&self, code: &str) -> bool {
        code == "3D000"
    }

    /// SQLSTATE 23505: unique_violation.
    fn is_conflict_error(&self, code: &str) -> bool {
        code == "23505"
    }

    fn data_type(&self, typ: &ColumnType) -> String {
        match typ.kind {
            ColumnKind::Bool => String::from("BOOLEAN"),
            ColumnKind::SmallInt => String::from("SMALLINT"),
            ColumnKind::Int => String::from("INTEGER"),
            ColumnKind::BigInt => String::from("BIGINT"),
            ColumnKind::Float => String::from("REAL"),
            ColumnKind::Double => String::from("DOUBLE PRECISION"),
            ColumnKind::Decimal => format!(
                "NUMERIC({},{})",
                typ.precision.unwrap_or(10),
                typ.scale.unwrap_or(0)
            ),
            ColumnKind::Char => format!("CHAR({})", typ.length.unwrap_or(1)),
            ColumnKind::Varchar => format!("VARCHAR({})", typ.length.unwrap_or(255)),
            ColumnKind::Text => String::from("TEXT"),
            ColumnKind::Bytes => String::from("BYTEA"),
            ColumnKind::Date => String::from("DATE"),
            ColumnKind::Time => String::from("TIME"),
            ColumnKind::DateTime => String::from("TIMESTAMP"),
            ColumnKind::Timestamp => String::from("TIMESTAMPTZ"),
            ColumnKind::Json => String::from("JSONB"),
        }
    }

    fn column_definition(&self, column: &Column) -> String {
        let typ = &column.typ;
        let mut def = self.quote_identifier(&column.name);
        def.push(' ');
        if typ.auto_increment {
            def.push_str(Self::serial_type(typ.kind));
        } else {
            def.push_str(&self.data_type(typ));
        }
        if !typ.nullable && !typ.auto_increment {
            def.push_str(" NOT NULL");
        }
        if let Some(default) = &typ.default {
            def.push_str(" DEFAULT ");
            def.push_str(default);
        }
        // ON UPDATE has no DDL form here; it is done with triggers and
        // is out of scope for generated DDL.
        def
    }

    /// Emits one ALTER TABLE with a clause per difference (type,
    /// nullability, default). Equal shapes yield a nil expression.
    fn modify_column(&self, table: &Table, column: &Column, previous: &Column) -> Ex {
        let c = self.quote_identifier(&column.name);
        let mut clauses = Vec::new();

        let new_type = self.data_type(&column.typ);
        if new_type != self.data_type(&previous.typ) {
            clauses.push(format!("ALTER COLUMN {c} TYPE {new_type}"));
        }
        if column.typ.nullable != previous.typ.nullable {
            if column.typ.nullable {
                clauses.push(format!("ALTER COLUMN {c} DROP NOT NULL"));
            } else {
                clauses.push(format!("ALTER COLUMN {c} SET NOT NULL"));
            }
        }
        if column.typ.default != previous.typ.default {
            match &column.typ.default {
                Some(default) => {
                    clauses.push(format!("ALTER COLUMN {c} SET DEFAULT {default}"));
                }
                None => clauses.push(format!("ALTER COLUMN {c} DROP DEFAULT")),
            }
        }

        if clauses.is_empty() {
            return Ex::new();
        }
        Ex::raw(format!(
            "ALTER TABLE {} {}",
            self.quote_identifier(&table.name),
            clauses.join(", ")
        ))
    }

    fn add_index(&self, table: &Table, key: &Key) -> Ex {
        let t = self.quote_identifier(&table.name);
        let cols = self.key_columns(key);
        if key.primary {
            return Ex::raw(format!("ALTER TABLE {t} ADD PRIMARY KEY ({cols})"));
        }
        let unique = if key.unique { "UNIQUE " } else { "" };
        Ex::raw(format!(
            "CREATE {unique}INDEX {} ON {t} ({cols})",
            self.quote_identifier(&key.name)
        ))
    }

    fn drop_index(&self, table: &Table, key_name: &str) -> Ex {
        // The primary key is a constraint, not an index object.
        if key_name.eq_ignore_ascii_case(&self.primary_key_name(table))
            || key_name.eq_ignore_ascii_case("primary")
        {
            return Ex::raw(format!(
                "ALTER TABLE {} DROP CONSTRAINT {}",
                self.quote_identifier(&table.name),
                self.quote_identifier(&self.primary_key_name(table))
            ));
        }
        Ex::raw(format!(
            "DROP INDEX {}",
            self.quote_identifier(key_name)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stanza_core::schema::{bigint, json, table, timestamp, varchar};
    use stanza_core::SqlExpr;

    fn users() -> Table {
        table("t_user")
            .column(bigint("f_id").auto_increment())
            .column(varchar("f_name", 64).not_null())
            .column(timestamp("f_created").not_null().default_value("NOW()"))
            .key(Key::primary(&["f_id"]))
            .key(Key::index("i_name", &["f_name"]))
            .build()
            .unwrap()
    }

    #[test]
    fn test_data_types() {
        let d = PostgresDialect;
        assert_eq!(d.data_type(&json("c").typ), "JSONB");
        assert_eq!(d.data_type(&timestamp("c").typ), "TIMESTAMPTZ");
        assert_eq!(d.data_type(&varchar("c", 64).typ), "VARCHAR(64)");
    }

    #[test]
    fn test_auto_increment_renders_serial() {
        let d = PostgresDialect;
        assert_eq!(
            d.column_definition(&bigint("f_id").auto_increment()),
            "\"f_id\" BIGSERIAL"
        );
    }

    #[test]
    fn test_create_table() {
        let e = PostgresDialect.create_table_if_not_exists(&users());
        assert_eq!(
            e.sql(),
            "CREATE TABLE IF NOT EXISTS \"t_user\" (\n\
             \x20   \"f_id\" BIGSERIAL,\n\
             \x20   \"f_name\" VARCHAR(64) NOT NULL,\n\
             \x20   \"f_created\" TIMESTAMPTZ NOT NULL DEFAULT NOW(),\n\
             \x20   PRIMARY KEY (\"f_id\")\n)"
        );
    }

    #[test]
    fn test_modify_combines_clauses_in_one_statement() {
        let t = users();
        let declared = varchar("f_name", 128).nullable();
        let live = varchar("f_name", 64).not_null();
        let e = PostgresDialect.modify_column(&t, &declared, &live);
        assert_eq!(
            e.sql(),
            "ALTER TABLE \"t_user\" ALTER COLUMN \"f_name\" TYPE VARCHAR(128), \
             ALTER COLUMN \"f_name\" DROP NOT NULL"
        );
    }

    #[test]
    fn test_dropped_default_emits_drop_default() {
        let t = users();
        let declared = timestamp("f_created").not_null();
        let live = timestamp("f_created").not_null().default_value("NOW()");
        let e = PostgresDialect.modify_column(&t, &declared, &live);
        assert_eq!(
            e.sql(),
            "ALTER TABLE \"t_user\" ALTER COLUMN \"f_created\" DROP DEFAULT"
        );
    }

    #[test]
    fn test_unchanged_column_yields_nil_modify() {
        let t = users();
        let c = t.column("f_name").unwrap();
        assert!(PostgresDialect.modify_column(&t, c, c).is_nil());
    }

    #[test]
    fn test_primary_key_diffs_under_pkey_name() {
        // An introspected shape reports the constraint as t_user_pkey;
        // the declared shape calls it "primary". The diff must treat
        // those as the same key.
        let declared = users();
        let live = table("t_user")
            .column(bigint("f_id").auto_increment())
            .column(varchar("f_name", 64).not_null())
            .column(timestamp("f_created").not_null().default_value("NOW()"))
            .key(Key {
                name: String::from("t_user_pkey"),
                columns: vec![String::from("f_id")],
                unique: true,
                primary: true,
            })
            .key(Key::index("i_name", &["f_name"]))
            .build()
            .unwrap();

        let ops: Vec<_> = declared
            .diff(&live, &PostgresDialect, false)
            .into_iter()
            .filter(|e| !e.is_nil())
            .collect();
        assert!(ops.is_empty());
    }

    #[test]
    fn test_index_statements() {
        let d = PostgresDialect;
        let t = users();
        assert_eq!(
            d.add_index(&t, &Key::unique("u_name", &["f_name"])).sql(),
            "CREATE UNIQUE INDEX \"u_name\" ON \"t_user\" (\"f_name\")"
        );
        assert_eq!(d.drop_index(&t, "i_name").sql(), "DROP INDEX \"i_name\"");
        assert_eq!(
            d.drop_index(&t, "t_user_pkey").sql(),
            "ALTER TABLE \"t_user\" DROP CONSTRAINT \"t_user_pkey\""
        );
    }

    #[test]
    fn test_error_codes() {
        let d = PostgresDialect;
        assert!(d.is_unknown_database_error("3D000"));
        assert!(d.is_conflict_error("23505"));
        assert!(!d.is_conflict_error("1062"));
    }
}
