//! Plan and apply schema changes against a live database.

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info};

use stanza_core::expr::Ex;
use stanza_core::{Database, Dialect, SqlExpr, Value};
use stanza_mysql::MysqlDialect;
use stanza_postgres::PostgresDialect;

use crate::error::{MigrateError, Result};
use crate::introspect;

/// A connection pool to either supported backend.
pub enum AnyPool {
    /// MySQL pool.
    MySql(MySqlPool),
    /// PostgreSQL pool.
    Postgres(PgPool),
}

/// Extracts the database name from a connection URL.
pub fn database_name(url: &str) -> Result<String> {
    let without_query = url.split('?').next().unwrap_or(url);
    let name = without_query.rsplit('/').next().unwrap_or("");
    if name.is_empty() || name.contains(':') {
        return Err(MigrateError::MissingDatabaseName(String::from(url)));
    }
    Ok(String::from(name))
}

/// Rewrites `?` placeholders to the `$1, $2, ..` form PostgreSQL
/// expects. A doubled `??` is an escaped literal question mark.
pub fn numbered_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut n = 0usize;
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '?' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'?') {
            chars.next();
            out.push('?');
            continue;
        }
        n += 1;
        out.push('$');
        out.push_str(&n.to_string());
    }
    out
}

/// Computes the ordered statements that converge `live` onto
/// `declared`: missing tables are created (columns first, then
/// secondary indexes), existing tables are diffed. Tables present only
/// in the live schema are left alone. Nil expressions are already
/// filtered out.
#[must_use]
pub fn plan(
    declared: &Database,
    live: &Database,
    dialect: &dyn Dialect,
    skip_drop_column: bool,
) -> Vec<Ex> {
    let mut operations = Vec::new();
    for table in &declared.tables {
        match live.get(&table.name) {
            Some(prev) => operations.extend(table.diff(prev, dialect, skip_drop_column)),
            None => {
                operations.push(dialect.create_table_if_not_exists(table));
                for key in table.keys() {
                    if !key.primary {
                        operations.push(dialect.add_index(table, key));
                    }
                }
            }
        }
    }
    operations.retain(|e| !e.is_nil());
    operations
}

fn bind_mysql<'q>(
    mut query: sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments>,
    args: &'q [Value],
) -> sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments> {
    for value in args {
        query = match value {
            Value::Null => query.bind(None::<String>),
            Value::Bool(b) => query.bind(*b),
            Value::Int(i) => query.bind(*i),
            Value::Float(f) => query.bind(*f),
            Value::Text(s) => query.bind(s.as_str()),
            Value::Bytes(b) => query.bind(b.as_slice()),
        };
    }
    query
}

fn bind_postgres<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    args: &'q [Value],
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    for value in args {
        query = match value {
            Value::Null => query.bind(None::<String>),
            Value::Bool(b) => query.bind(*b),
            Value::Int(i) => query.bind(*i),
            Value::Float(f) => query.bind(*f),
            Value::Text(s) => query.bind(s.as_str()),
            Value::Bytes(b) => query.bind(b.as_slice()),
        };
    }
    query
}

/// Converges a live database onto a declared schema.
pub struct Reconciler {
    pool: AnyPool,
    dialect: Box<dyn Dialect + Send + Sync>,
    database: String,
    dry_run: bool,
}

impl Reconciler {
    /// Connects to the database named by the URL and selects the
    /// matching dialect from the scheme.
    pub async fn connect(url: &str) -> Result<Self> {
        let database = database_name(url)?;
        if url.starts_with("mysql:") {
            let pool = MySqlPoolOptions::new()
                .max_connections(5)
                .connect(url)
                .await?;
            return Ok(Self {
                pool: AnyPool::MySql(pool),
                dialect: Box::new(MysqlDialect),
                database,
                dry_run: false,
            });
        }
        if url.starts_with("postgres:") || url.starts_with("postgresql:") {
            let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
            return Ok(Self {
                pool: AnyPool::Postgres(pool),
                dialect: Box::new(PostgresDialect),
                database,
                dry_run: false,
            });
        }
        let scheme = url.split(':').next().unwrap_or(url);
        Err(MigrateError::UnsupportedScheme(String::from(scheme)))
    }

    /// Enables dry-run mode (SQL is printed but not executed).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Returns the dialect.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Reads the live schema.
    pub async fn introspect(&self) -> Result<Database> {
        match &self.pool {
            AnyPool::MySql(pool) => introspect::introspect_mysql(pool, &self.database).await,
            AnyPool::Postgres(pool) => {
                introspect::introspect_postgres(pool, &self.database).await
            }
        }
    }

    /// Introspects and plans in one step.
    pub async fn plan(&self, declared: &Database, skip_drop_column: bool) -> Result<Vec<Ex>> {
        let live = self.introspect().await?;
        Ok(plan(declared, &live, self.dialect.as_ref(), skip_drop_column))
    }

    /// Executes the planned statements in order, stopping at the first
    /// failure.
    pub async fn apply(&self, operations: &[Ex]) -> Result<()> {
        for operation in operations {
            let (sql, args) = operation.clone().into_parts();
            if self.dry_run {
                println!("{sql};");
                continue;
            }
            debug!(sql = %sql, "executing");
            self.execute(&sql, &args).await?;
        }
        info!(
            count = operations.len(),
            dry_run = self.dry_run,
            "schema changes applied"
        );
        Ok(())
    }

    async fn execute(&self, sql: &str, args: &[Value]) -> Result<()> {
        let outcome = match &self.pool {
            AnyPool::MySql(pool) => {
                bind_mysql(sqlx::query(sql), args)
                    .execute(pool)
                    .await
                    .map(drop)
            }
            AnyPool::Postgres(pool) => {
                let rewritten = numbered_placeholders(sql);
                bind_postgres(sqlx::query(&rewritten), args)
                    .execute(pool)
                    .await
                    .map(drop)
            }
        };
        outcome.map_err(|e| self.classify(e, sql))
    }

    /// Maps a driver error onto a reconciliation error using the
    /// dialect's error-code knowledge.
    fn classify(&self, err: sqlx::Error, statement: &str) -> MigrateError {
        if let sqlx::Error::Database(db) = &err {
            if let Some(code) = db.code() {
                if self.dialect.is_unknown_database_error(&code) {
                    return MigrateError::UnknownDatabase(self.database.clone());
                }
                if self.dialect.is_conflict_error(&code) {
                    return MigrateError::Conflict {
                        statement: String::from(statement),
                    };
                }
            }
        }
        MigrateError::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stanza_core::schema::{bigint, table, varchar, Key};

    #[test]
    fn test_database_name_extraction() {
        assert_eq!(
            database_name("mysql://root:pw@localhost:3306/app").unwrap(),
            "app"
        );
        assert_eq!(
            database_name("postgres://localhost/app?sslmode=disable").unwrap(),
            "app"
        );
        assert!(database_name("mysql://localhost:3306").is_err());
    }

    #[test]
    fn test_numbered_placeholders() {
        assert_eq!(
            numbered_placeholders("SELECT * FROM t WHERE a = ? AND b IN (?,?)"),
            "SELECT * FROM t WHERE a = $1 AND b IN ($2,$3)"
        );
        assert_eq!(
            numbered_placeholders("SELECT data ?? 'k' FROM t WHERE a = ?"),
            "SELECT data ? 'k' FROM t WHERE a = $1"
        );
    }

    fn users() -> stanza_core::Table {
        table("t_user")
            .column(bigint("f_id").auto_increment())
            .column(varchar("f_name", 64).not_null())
            .key(Key::primary(&["f_id"]))
            .key(Key::index("i_name", &["f_name"]))
            .build()
            .unwrap()
    }

    #[test]
    fn test_plan_creates_missing_table_before_indexes() {
        let declared = Database::new("app").table(users());
        let live = Database::new("app");

        let ops = plan(&declared, &live, &MysqlDialect, false);
        assert_eq!(ops.len(), 2);
        assert!(ops[0].sql().starts_with("CREATE TABLE IF NOT EXISTS `t_user`"));
        assert!(ops[1].sql().contains("ADD INDEX `i_name`"));
    }

    #[test]
    fn test_plan_for_identical_schemas_is_empty() {
        let declared = Database::new("app").table(users());
        let ops = plan(&declared, &declared.clone(), &MysqlDialect, false);
        assert!(ops.is_empty(), "spurious operations: {ops:?}");
    }

    #[test]
    fn test_plan_leaves_unknown_live_tables_alone() {
        let declared = Database::new("app");
        let live = Database::new("app").table(users());
        let ops = plan(&declared, &live, &MysqlDialect, false);
        assert!(ops.is_empty());
    }
}
