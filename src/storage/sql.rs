// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! SQL storage backend.
//!
//! One row per record, with the derived representation alongside the
//! source columns:
//! ```sql
//! CREATE TABLE user_records (
//!   user_id    VARCHAR(255) PRIMARY KEY,
//!   first_name VARCHAR(255) NOT NULL DEFAULT 'NA',
//!   last_name  VARCHAR(255) NOT NULL DEFAULT 'NA',
//!   email      VARCHAR(255) NOT NULL DEFAULT 'no-reply@none.com',
//!   phone      VARCHAR(255) NOT NULL DEFAULT '000-000-0000',
//!   active     BIGINT       NOT NULL DEFAULT 0,
//!   balance    VARCHAR(255) NOT NULL DEFAULT '0',
//!   string_rep TEXT         NOT NULL,  -- indexed (255-char prefix on MySQL)
//! )
//! ```
//!
//! Column defaults live in the schema, so an insert that omits a column
//! stores a value the caller never saw. The coordinator re-derives the
//! representation from the persisted row afterwards.
//!
//! ## sqlx Any Driver Quirks
//!
//! - `active` is an integer column: the `Any` driver cannot decode a SQLite
//!   or MySQL integer as `bool`.
//! - MySQL may hand back VARCHAR/TEXT as bytes, so text columns are read as
//!   `String` first and `Vec<u8>` second.
//! - Placeholders are written as `?` and renumbered to `$n` for Postgres.
//! - MySQL reports *changed* rather than *matched* rows for UPDATE, so a zero
//!   count is confirmed with an existence check.

use async_trait::async_trait;
use sqlx::any::{AnyArguments, AnyPoolOptions, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, AnyPool, Row};
use std::sync::Once;
use std::time::Duration;
use tracing::debug;

use crate::config::RepIndexConfig;
use crate::record::{FieldValue, IndexedUser, NewUser, UserColumn, UserPatch, UserRecord};
use crate::resilience::retry::{retry, retry_if, RetryConfig};
use crate::search::{Dialect, Predicate, SqlTranslator};
use super::traits::{RecordStore, StorageError, UpsertMode};

const STRING_REP_COLUMN: &str = "string_rep";
// Characters of `string_rep` covered by the MySQL index
const MYSQL_REP_INDEX_PREFIX: usize = 255;
const SELECT_COLUMNS: &str =
    "user_id, first_name, last_name, email, phone, active, balance, string_rep";

// SQLx `Any` driver requires runtime installation
static INSTALL_DRIVERS: Once = Once::new();

fn install_drivers() {
    INSTALL_DRIVERS.call_once(|| {
        sqlx::any::install_default_drivers();
    });
}

type AnyQuery<'q> = Query<'q, Any, AnyArguments<'q>>;

pub struct SqlStore {
    pool: AnyPool,
    dialect: Dialect,
    table: String,
}

impl SqlStore {
    /// Connect with default settings and create the schema if missing.
    pub async fn new(connection_string: &str) -> Result<Self, StorageError> {
        let config = RepIndexConfig {
            sql_url: Some(connection_string.to_string()),
            ..Default::default()
        };
        Self::with_config(&config).await
    }

    /// Connect using `config` (fails fast if the URL is wrong) and create the schema.
    pub async fn with_config(config: &RepIndexConfig) -> Result<Self, StorageError> {
        install_drivers();

        let url = config
            .sql_url
            .as_deref()
            .ok_or_else(|| StorageError::Backend("sql_url is not configured".into()))?;
        let dialect = Dialect::from_url(url)
            .ok_or_else(|| StorageError::Backend(format!("unsupported connection string: {}", url)))?;

        // Every connection to `sqlite::memory:` opens its own database
        let in_memory = dialect == Dialect::Sqlite
            && (url.contains(":memory:") || url.contains("mode=memory"));

        let pool = retry("sql_connect", &RetryConfig::startup(), || async {
            let options = AnyPoolOptions::new()
                .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs));
            let options = if in_memory {
                options
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
            } else {
                options.max_connections(config.max_connections)
            };
            options
                .connect(url)
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))
        })
        .await?;

        let store = Self { pool, dialect, table: config.table.clone() };

        if dialect == Dialect::Sqlite && !in_memory {
            store.enable_wal_mode().await?;
        }

        store.init_schema().await?;
        Ok(store)
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn pool(&self) -> AnyPool {
        self.pool.clone()
    }

    async fn enable_wal_mode(&self) -> Result<(), StorageError> {
        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(format!("Failed to enable WAL mode: {}", e)))?;
        Ok(())
    }

    async fn init_schema(&self) -> Result<(), StorageError> {
        for sql in schema_statements(self.dialect, &self.table) {
            retry("sql_init_schema", &RetryConfig::startup(), || async {
                sqlx::query(&sql)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| StorageError::Backend(e.to_string()))
            })
            .await?;
        }
        Ok(())
    }

    fn bind_value<'q>(query: AnyQuery<'q>, value: FieldValue<'_>) -> AnyQuery<'q> {
        match value {
            FieldValue::Flag(b) => query.bind(i64::from(b)),
            other => query.bind(other.canonical().into_owned()),
        }
    }

    /// `ON CONFLICT` / `ON DUPLICATE KEY` tail for an upsert.
    fn conflict_clause(&self, update: &[&str]) -> String {
        match (self.dialect, update.is_empty()) {
            (Dialect::MySql, true) => "ON DUPLICATE KEY UPDATE user_id = user_id".to_string(),
            (Dialect::MySql, false) => format!(
                "ON DUPLICATE KEY UPDATE {}",
                update
                    .iter()
                    .map(|c| format!("{} = VALUES({})", c, c))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            (_, true) => "ON CONFLICT(user_id) DO NOTHING".to_string(),
            (_, false) => format!(
                "ON CONFLICT(user_id) DO UPDATE SET {}",
                update
                    .iter()
                    .map(|c| format!("{} = excluded.{}", c, c))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }

    /// `INSERT` of the present columns plus the representation, with an optional tail.
    fn insert_statement(&self, user: &NewUser, tail: &str) -> String {
        let mut columns = vec!["user_id"];
        columns.extend(user.fields.present().iter().map(|(col, _)| col.as_str()));
        columns.push(STRING_REP_COLUMN);
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) {}",
            self.table,
            columns.join(", "),
            placeholders,
            tail
        );
        self.dialect.bind_markers(sql.trim_end())
    }

    async fn execute_insert(&self, sql: &str, user: &NewUser, string_rep: &str) -> Result<(), StorageError> {
        let mut query = sqlx::query(sql).bind(user.user_id.clone());
        for (_, value) in user.fields.present() {
            query = Self::bind_value(query, value);
        }
        query
            .bind(string_rep.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| match e.as_database_error() {
                Some(db) if db.is_unique_violation() => StorageError::Conflict(user.user_id.clone()),
                _ => StorageError::Backend(e.to_string()),
            })?;
        Ok(())
    }

    async fn exists(&self, id: &str) -> Result<bool, StorageError> {
        let sql = self.dialect.bind_markers(&format!(
            "SELECT 1 FROM {} WHERE user_id = ? LIMIT 1",
            self.table
        ));
        retry("sql_exists", &RetryConfig::query(), || async {
            let row = sqlx::query(&sql)
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))?;
            Ok(row.is_some())
        })
        .await
    }

    /// Treat zero affected rows as "missing" only after confirming the row is gone.
    async fn matched(&self, id: &str, rows_affected: u64) -> Result<bool, StorageError> {
        if rows_affected > 0 {
            Ok(true)
        } else {
            self.exists(id).await
        }
    }

    async fn fetch_users(&self, sql: &str, params: &[String], tail: &[i64]) -> Result<Vec<IndexedUser>, StorageError> {
        let op = if params.is_empty() { "sql_list" } else { "sql_search" };
        let run = || async {
            let mut query = sqlx::query(sql);
            for p in params {
                query = query.bind(p.clone());
            }
            for n in tail {
                query = query.bind(*n);
            }
            let rows = query
                .fetch_all(&self.pool)
                .await
                .map_err(map_query_error)?;
            rows.iter().map(row_to_user).collect()
        };
        // A malformed pattern fails the same way on every attempt
        retry_if(op, &RetryConfig::query(), run, |e| {
            !matches!(e, StorageError::InvalidPattern(_))
        })
        .await
    }
}

fn default_literal(col: UserColumn) -> String {
    match col.default_value() {
        FieldValue::Flag(b) => i64::from(b).to_string(),
        other => format!("'{}'", other.canonical().replace('\'', "''")),
    }
}

/// `CREATE TABLE` / `CREATE INDEX` statements for `table`.
///
/// MySQL caps a VARCHAR index key at 3072 bytes, and the representation of
/// seven 255-character fields can be longer than any VARCHAR that fits. So
/// MySQL stores it as TEXT (which cannot carry a DEFAULT) with a prefix index.
fn schema_statements(dialect: Dialect, table: &str) -> Vec<String> {
    let t = table;
    let text = match dialect {
        Dialect::Sqlite | Dialect::Postgres => "TEXT",
        Dialect::MySql => "VARCHAR(255)",
    };
    let int = match dialect {
        Dialect::Sqlite => "INTEGER",
        Dialect::MySql | Dialect::Postgres => "BIGINT",
    };

    let mut columns = vec![format!("user_id {} PRIMARY KEY", text)];
    for col in UserColumn::ALL {
        let ty = if col == UserColumn::Active { int } else { text };
        columns.push(format!(
            "{} {} NOT NULL DEFAULT {}",
            col.as_str(),
            ty,
            default_literal(col)
        ));
    }

    match dialect {
        Dialect::MySql => {
            columns.push(format!("{} TEXT NOT NULL", STRING_REP_COLUMN));
            columns.push(format!(
                "INDEX idx_{}_string_rep ({}({}))",
                t, STRING_REP_COLUMN, MYSQL_REP_INDEX_PREFIX
            ));
            vec![format!("CREATE TABLE IF NOT EXISTS {} ({})", t, columns.join(", "))]
        }
        Dialect::Sqlite | Dialect::Postgres => {
            columns.push(format!("{} TEXT NOT NULL DEFAULT ''", STRING_REP_COLUMN));
            vec![
                format!("CREATE TABLE IF NOT EXISTS {} ({})", t, columns.join(", ")),
                format!(
                    "CREATE INDEX IF NOT EXISTS idx_{}_string_rep ON {} ({})",
                    t, t, STRING_REP_COLUMN
                ),
            ]
        }
    }
}

fn map_query_error(e: sqlx::Error) -> StorageError {
    match e.as_database_error() {
        // Postgres: invalid_regular_expression; MySQL: ER_REGEXP_* (SQLSTATE HY000)
        Some(db)
            if db.code().as_deref() == Some("2201B")
                || db.message().contains("regular expression") =>
        {
            StorageError::InvalidPattern(db.message().to_string())
        }
        _ => StorageError::Backend(e.to_string()),
    }
}

fn text_column(row: &AnyRow, name: &str) -> Result<String, StorageError> {
    // Try String first (SQLite/Postgres), then bytes (MySQL)
    row.try_get::<String, _>(name)
        .or_else(|_| {
            row.try_get::<Vec<u8>, _>(name)
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        })
        .map_err(|e| StorageError::Backend(format!("column {}: {}", name, e)))
}

fn flag_column(row: &AnyRow, name: &str) -> Result<bool, StorageError> {
    row.try_get::<i64, _>(name)
        .map(|v| v != 0)
        .or_else(|_| row.try_get::<bool, _>(name))
        .map_err(|e| StorageError::Backend(format!("column {}: {}", name, e)))
}

fn row_to_user(row: &AnyRow) -> Result<IndexedUser, StorageError> {
    Ok(IndexedUser {
        record: UserRecord {
            user_id: text_column(row, "user_id")?,
            first_name: text_column(row, "first_name")?,
            last_name: text_column(row, "last_name")?,
            email: text_column(row, "email")?,
            phone: text_column(row, "phone")?,
            active: flag_column(row, "active")?,
            balance: text_column(row, "balance")?,
        },
        string_rep: text_column(row, STRING_REP_COLUMN)?,
    })
}

#[async_trait]
impl RecordStore for SqlStore {
    async fn get(&self, id: &str) -> Result<Option<IndexedUser>, StorageError> {
        let sql = self.dialect.bind_markers(&format!(
            "SELECT {} FROM {} WHERE user_id = ?",
            SELECT_COLUMNS, self.table
        ));

        retry("sql_get", &RetryConfig::query(), || async {
            let row = sqlx::query(&sql)
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))?;
            row.as_ref().map(row_to_user).transpose()
        })
        .await
    }

    async fn insert(&self, user: &NewUser, string_rep: &str) -> Result<(), StorageError> {
        let sql = self.insert_statement(user, "");
        self.execute_insert(&sql, user, string_rep).await
    }

    async fn upsert(&self, user: &NewUser, string_rep: &str, mode: &UpsertMode) -> Result<(), StorageError> {
        let mut update: Vec<&str> = mode
            .conflict_columns(user)
            .into_iter()
            .map(|c| c.as_str())
            .collect();
        if mode.writes_string_rep() {
            update.push(STRING_REP_COLUMN);
        }
        let sql = self.insert_statement(user, &self.conflict_clause(&update));
        self.execute_insert(&sql, user, string_rep).await
    }

    async fn update(&self, id: &str, patch: &UserPatch) -> Result<bool, StorageError> {
        let present = patch.present();
        if present.is_empty() {
            return self.exists(id).await;
        }

        let assignments: Vec<String> = present
            .iter()
            .map(|(col, _)| format!("{} = ?", col.as_str()))
            .collect();
        let sql = self.dialect.bind_markers(&format!(
            "UPDATE {} SET {} WHERE user_id = ?",
            self.table,
            assignments.join(", ")
        ));

        let mut query = sqlx::query(&sql);
        for (_, value) in present {
            query = Self::bind_value(query, value);
        }
        let result = query
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        self.matched(id, result.rows_affected()).await
    }

    async fn write_string_rep(&self, id: &str, string_rep: &str) -> Result<bool, StorageError> {
        let sql = self.dialect.bind_markers(&format!(
            "UPDATE {} SET {} = ? WHERE user_id = ?",
            self.table, STRING_REP_COLUMN
        ));
        let result = sqlx::query(&sql)
            .bind(string_rep.to_string())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        self.matched(id, result.rows_affected()).await
    }

    async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let sql = self
            .dialect
            .bind_markers(&format!("DELETE FROM {} WHERE user_id = ?", self.table));
        let result = sqlx::query(&sql)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    async fn search(&self, predicate: &Predicate, limit: usize) -> Result<Vec<IndexedUser>, StorageError> {
        let sql_query = SqlTranslator::translate(predicate, STRING_REP_COLUMN, self.dialect);
        debug!(
            clause = %SqlTranslator::translate_inline(predicate, STRING_REP_COLUMN, self.dialect),
            "SQL search"
        );

        let sql = self.dialect.bind_markers(&format!(
            "SELECT {} FROM {} WHERE {} ORDER BY user_id LIMIT ?",
            SELECT_COLUMNS, self.table, sql_query.clause
        ));
        self.fetch_users(&sql, &sql_query.params, &[limit as i64]).await
    }

    async fn list(&self, offset: u64, limit: usize) -> Result<Vec<IndexedUser>, StorageError> {
        let sql = self.dialect.bind_markers(&format!(
            "SELECT {} FROM {} ORDER BY user_id LIMIT ? OFFSET ?",
            SELECT_COLUMNS, self.table
        ));
        self.fetch_users(&sql, &[], &[limit as i64, offset as i64]).await
    }

    async fn count_all(&self) -> Result<u64, StorageError> {
        let sql = format!("SELECT COUNT(*) AS cnt FROM {}", self.table);
        let row = sqlx::query(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(count as u64)
    }
}
