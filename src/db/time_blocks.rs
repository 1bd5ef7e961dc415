use serde::Deserialize;
use sqlx::{QueryBuilder, SqlitePool};

use crate::models::TimeBlockRow;

use super::now_timestamp;

#[derive(Debug, Clone, Deserialize)]
pub struct NewTimeBlock {
    pub barber_id: i64,
    pub block_date: String,
    pub start_time: String,
    pub end_time: String,
    pub reason: Option<String>,
}

pub async fn list(
    pool: &SqlitePool,
    barber_id: Option<i64>,
    date: Option<&str>,
) -> Result<Vec<TimeBlockRow>, sqlx::Error> {
    let mut qb = QueryBuilder::new("SELECT * FROM time_blocks WHERE 1 = 1");
    if let Some(barber_id) = barber_id {
        qb.push(" AND barber_id = ").push_bind(barber_id);
    }
    if let Some(date) = date {
        qb.push(" AND block_date = ").push_bind(date.to_string());
    }
    qb.push(" ORDER BY block_date, start_time");
    qb.build_query_as::<TimeBlockRow>().fetch_all(pool).await
}

pub async fn create(pool: &SqlitePool, data: &NewTimeBlock) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"INSERT INTO time_blocks (barber_id, block_date, start_time, end_time, reason, created_at)
           VALUES (?, ?, ?, ?, ?, ?)"#,
    )
    .bind(data.barber_id)
    .bind(&data.block_date)
    .bind(&data.start_time)
    .bind(&data.end_time)
    .bind(&data.reason)
    .bind(now_timestamp())
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query("DELETE FROM time_blocks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(affected > 0)
}
