use std::{fs, path::Path};

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

pub mod appointments;
pub mod barbers;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod services;
pub mod time_blocks;

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

pub fn ensure_sqlite_dir(db_url: &str) -> std::io::Result<()> {
    let path = if let Some(path) = db_url.strip_prefix("sqlite://") {
        Some(path)
    } else if let Some(path) = db_url.strip_prefix("sqlite:") {
        Some(path)
    } else {
        None
    };

    let Some(path) = path else {
        return Ok(());
    };

    let path = path.split('?').next().unwrap_or(path);
    if path == ":memory:" || path.is_empty() {
        return Ok(());
    }

    let path = path.strip_prefix("file:").unwrap_or(path);
    let db_path = Path::new(path);
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339()
}

/// Audit trail feeding the dashboard activity feed. Failures here must not
/// fail the request that triggered them.
pub async fn log_activity(pool: &SqlitePool, kind: &str, message: &str) {
    let _ = sqlx::query("INSERT INTO activities (kind, message, created_at) VALUES (?, ?, ?)")
        .bind(kind)
        .bind(message)
        .bind(now_timestamp())
        .execute(pool)
        .await;
}

/// Compiles a set of optional patch fields into one parameterized UPDATE.
/// Column names are fixed string literals supplied by the per-entity
/// modules; values only ever travel as bind parameters.
pub(crate) struct UpdateBuilder<'args> {
    qb: QueryBuilder<'args, Sqlite>,
    fields: usize,
}

impl<'args> UpdateBuilder<'args> {
    pub fn new(table: &str) -> Self {
        let mut qb = QueryBuilder::new("UPDATE ");
        qb.push(table).push(" SET ");
        Self { qb, fields: 0 }
    }

    pub fn set<T>(&mut self, column: &'static str, value: T)
    where
        T: 'args + sqlx::Encode<'args, Sqlite> + sqlx::Type<Sqlite>,
    {
        if self.fields > 0 {
            self.qb.push(", ");
        }
        self.qb.push(column).push(" = ").push_bind(value);
        self.fields += 1;
    }

    pub fn set_opt<T>(&mut self, column: &'static str, value: Option<T>)
    where
        T: 'args + sqlx::Encode<'args, Sqlite> + sqlx::Type<Sqlite>,
    {
        if let Some(value) = value {
            self.set(column, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields == 0
    }

    pub async fn execute<'e, E>(mut self, id: i64, executor: E) -> Result<u64, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        self.qb.push(" WHERE id = ").push_bind(id);
        let result = self.qb.build().execute(executor).await?;
        Ok(result.rows_affected())
    }
}
