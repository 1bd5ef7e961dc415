use serde::Deserialize;
use sqlx::SqlitePool;

use crate::models::ServiceRow;

use super::{now_timestamp, UpdateBuilder};

#[derive(Debug, Clone, Deserialize)]
pub struct NewService {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub duration_minutes: i64,
    pub category: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServicePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub duration_minutes: Option<i64>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

pub async fn list(pool: &SqlitePool, category: Option<&str>) -> Result<Vec<ServiceRow>, sqlx::Error> {
    match category {
        Some(category) => {
            sqlx::query_as::<_, ServiceRow>(
                "SELECT * FROM services WHERE is_active = 1 AND category = ? ORDER BY name",
            )
            .bind(category)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, ServiceRow>("SELECT * FROM services WHERE is_active = 1 ORDER BY name")
                .fetch_all(pool)
                .await
        }
    }
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<Option<ServiceRow>, sqlx::Error> {
    sqlx::query_as::<_, ServiceRow>("SELECT * FROM services WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &SqlitePool, data: &NewService) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"INSERT INTO services (name, description, price, duration_minutes, category, image_url, is_active, created_at)
           VALUES (?, ?, ?, ?, ?, ?, 1, ?)"#,
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.duration_minutes)
    .bind(&data.category)
    .bind(&data.image_url)
    .bind(now_timestamp())
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update(pool: &SqlitePool, id: i64, patch: &ServicePatch) -> Result<bool, sqlx::Error> {
    let mut builder = UpdateBuilder::new("services");
    builder.set_opt("name", patch.name.clone());
    builder.set_opt("description", patch.description.clone());
    builder.set_opt("price", patch.price);
    builder.set_opt("duration_minutes", patch.duration_minutes);
    builder.set_opt("category", patch.category.clone());
    builder.set_opt("image_url", patch.image_url.clone());
    if builder.is_empty() {
        return Ok(false);
    }
    Ok(builder.execute(id, pool).await? > 0)
}

pub async fn soft_delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query("UPDATE services SET is_active = 0 WHERE id = ? AND is_active = 1")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(affected > 0)
}
