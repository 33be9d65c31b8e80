//! # stanza-mysql
//!
//! MySQL dialect: backtick quoting, `AUTO_INCREMENT`, in-place
//! `MODIFY COLUMN`, and the server's `PRIMARY` key naming.

use stanza_core::expr::Ex;
use stanza_core::schema::{Column, ColumnKind, ColumnType, Key, Table};
use stanza_core::Dialect;

/// The MySQL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlDialect;

/// Strips markers that carry declaration intent but never show up in an
/// introspected column, so declared and live types compare equal.
fn live_shape(typ: &ColumnType) -> ColumnType {
    let mut t = typ.clone();
    t.renamed_from = None;
    t
}

impl MysqlDialect {
    fn key_columns(&self, key: &Key) -> String {
        key.columns
            .iter()
            .map(|c| self.quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Dialect for MysqlDialect {
    fn driver_name(&self) -> &'static str {
        "mysql"
    }

    /// MySQL reports every primary key under the fixed name `PRIMARY`.
    fn primary_key_name(&self, _table: &Table) -> String {
        String::from("PRIMARY")
    }

    /// 1049 is ER_BAD_DB_ERROR.
    fn is_unknown_database_error(&self, code: &str) -> bool {
        code == "1049"
    }

    /// 1062 is ER_DUP_ENTRY.
    fn is_conflict_error(&self, code: &str) -> bool {
        code == "1062"
    }

    fn quote_char(&self) -> char {
        '`'
    }

    fn data_type(&self, typ: &ColumnType) -> String {
        match typ.kind {
            ColumnKind::Bool => String::from("TINYINT(1)"),
            ColumnKind::SmallInt => String::from("SMALLINT"),
            ColumnKind::Int => String::from("INT"),
            ColumnKind::BigInt => String::from("BIGINT"),
            ColumnKind::Float => String::from("FLOAT"),
            ColumnKind::Double => String::from("DOUBLE"),
            ColumnKind::Decimal => format!(
                "DECIMAL({},{})",
                typ.precision.unwrap_or(10),
                typ.scale.unwrap_or(0)
            ),
            ColumnKind::Char => format!("CHAR({})", typ.length.unwrap_or(1)),
            ColumnKind::Varchar => format!("VARCHAR({})", typ.length.unwrap_or(255)),
            ColumnKind::Text => String::from("LONGTEXT"),
            ColumnKind::Bytes => String::from("LONGBLOB"),
            ColumnKind::Date => String::from("DATE"),
            ColumnKind::Time => String::from("TIME"),
            ColumnKind::DateTime => String::from("DATETIME"),
            ColumnKind::Timestamp => String::from("TIMESTAMP"),
            ColumnKind::Json => String::from("JSON"),
        }
    }

    fn column_definition(&self, column: &Column) -> String {
        let mut def = format!(
            "{} {}",
            self.quote_identifier(&column.name),
            self.data_type(&column.typ)
        );
        if !column.typ.nullable {
            def.push_str(" NOT NULL");
        }
        if column.typ.auto_increment {
            def.push_str(" AUTO_INCREMENT");
        }
        if let Some(default) = &column.typ.default {
            def.push_str(" DEFAULT ");
            def.push_str(default);
        }
        if let Some(on_update) = &column.typ.on_update {
            def.push_str(" ON UPDATE ");
            def.push_str(on_update);
        }
        def
    }

    fn modify_column(&self, table: &Table, column: &Column, previous: &Column) -> Ex {
        if live_shape(&column.typ) == live_shape(&previous.typ) {
            return Ex::new();
        }
        Ex::raw(format!(
            "ALTER TABLE {} MODIFY COLUMN {}",
            self.quote_identifier(&table.name),
            self.column_definition(column)
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
            "ALTER TABLE {t} ADD {unique}INDEX {} ({cols})",
            self.quote_identifier(&key.name)
        ))
    }

    fn drop_index(&self, table: &Table, key_name: &str) -> Ex {
        let t = self.quote_identifier(&table.name);
        if key_name.eq_ignore_ascii_case("primary") {
            return Ex::raw(format!("ALTER TABLE {t} DROP PRIMARY KEY"));
        }
        Ex::raw(format!(
            "ALTER TABLE {t} DROP INDEX {}",
            self.quote_identifier(key_name)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stanza_core::schema::{bigint, decimal, table, timestamp, varchar};
    use stanza_core::SqlExpr;

    fn users() -> Table {
        table("t_user")
            .column(bigint("f_id").auto_increment())
            .column(varchar("f_name", 64).not_null())
            .column(
                timestamp("f_created")
                    .not_null()
                    .default_value("CURRENT_TIMESTAMP")
                    .on_update("CURRENT_TIMESTAMP"),
            )
            .key(Key::primary(&["f_id"]))
            .key(Key::index("i_name", &["f_name"]))
            .build()
            .unwrap()
    }

    #[test]
    fn test_data_types() {
        let d = MysqlDialect;
        assert_eq!(d.data_type(&varchar("c", 64).typ), "VARCHAR(64)");
        assert_eq!(d.data_type(&decimal("c", 12, 4).typ), "DECIMAL(12,4)");
        assert_eq!(d.data_type(&bigint("c").typ), "BIGINT");
    }

    #[test]
    fn test_column_definition() {
        let d = MysqlDialect;
        assert_eq!(
            d.column_definition(&bigint("f_id").auto_increment()),
            "`f_id` BIGINT NOT NULL AUTO_INCREMENT"
        );
        assert_eq!(
            d.column_definition(
                &timestamp("f_created")
                    .not_null()
                    .default_value("CURRENT_TIMESTAMP")
                    .on_update("CURRENT_TIMESTAMP")
            ),
            "`f_created` TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP \
             ON UPDATE CURRENT_TIMESTAMP"
        );
    }

    #[test]
    fn test_create_table() {
        let e = MysqlDialect.create_table_if_not_exists(&users());
        assert_eq!(
            e.sql(),
            "CREATE TABLE IF NOT EXISTS `t_user` (\n\
             \x20   `f_id` BIGINT NOT NULL AUTO_INCREMENT,\n\
             \x20   `f_name` VARCHAR(64) NOT NULL,\n\
             \x20   `f_created` TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP \
             ON UPDATE CURRENT_TIMESTAMP,\n\
             \x20   PRIMARY KEY (`f_id`)\n)"
        );
    }

    #[test]
    fn test_unchanged_column_yields_nil_modify() {
        let t = users();
        let c = t.column("f_name").unwrap();
        assert!(MysqlDialect.modify_column(&t, c, c).is_nil());
    }

    #[test]
    fn test_rename_marker_does_not_force_a_modify() {
        let t = users();
        let declared = varchar("f_name", 64).not_null().renamed_from("f_login");
        let live = varchar("f_name", 64).not_null();
        assert!(MysqlDialect.modify_column(&t, &declared, &live).is_nil());
    }

    #[test]
    fn test_widened_varchar_is_modified_in_place() {
        let declared = table("t_user")
            .column(bigint("f_id").auto_increment())
            .column(varchar("f_name", 128).not_null())
            .column(
                timestamp("f_created")
                    .not_null()
                    .default_value("CURRENT_TIMESTAMP")
                    .on_update("CURRENT_TIMESTAMP"),
            )
            .key(Key::primary(&["f_id"]))
            .key(Key::index("i_name", &["f_name"]))
            .build()
            .unwrap();

        let ops: Vec<String> = declared
            .diff(&users(), &MysqlDialect, false)
            .into_iter()
            .filter(|e| !e.is_nil())
            .map(|e| e.sql().to_string())
            .collect();
        assert_eq!(
            ops,
            vec!["ALTER TABLE `t_user` MODIFY COLUMN `f_name` VARCHAR(128) NOT NULL"]
        );
    }

    #[test]
    fn test_primary_key_diffs_under_server_name() {
        let t = users();
        let ops: Vec<_> = t
            .diff(&t.clone(), &MysqlDialect, false)
            .into_iter()
            .filter(|e| !e.is_nil())
            .collect();
        assert!(ops.is_empty());
    }

    #[test]
    fn test_index_statements() {
        let d = MysqlDialect;
        let t = users();
        assert_eq!(
            d.add_index(&t, &Key::unique("u_name", &["f_name"])).sql(),
            "ALTER TABLE `t_user` ADD UNIQUE INDEX `u_name` (`f_name`)"
        );
        assert_eq!(
            d.drop_index(&t, "i_name").sql(),
            "ALTER TABLE `t_user` DROP INDEX `i_name`"
        );
        assert_eq!(
            d.drop_index(&t, "PRIMARY").sql(),
            "ALTER TABLE `t_user` DROP PRIMARY KEY"
        );
    }

    #[test]
    fn test_error_codes() {
        let d = MysqlDialect;
        assert!(d.is_unknown_database_error("1049"));
        assert!(d.is_conflict_error("1062"));
        assert!(!d.is_conflict_error("23505"));
    }
}
