use serde::Deserialize;
use sqlx::SqlitePool;

use crate::models::BarberRow;

use super::{now_timestamp, UpdateBuilder};

#[derive(Debug, Clone, Deserialize)]
pub struct NewBarber {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BarberPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub is_available: Option<i64>,
}

pub async fn list(pool: &SqlitePool, include_inactive: bool) -> Result<Vec<BarberRow>, sqlx::Error> {
    let sql = if include_inactive {
        "SELECT * FROM barbers ORDER BY name"
    } else {
        "SELECT * FROM barbers WHERE is_active = 1 ORDER BY name"
    };
    sqlx::query_as::<_, BarberRow>(sql).fetch_all(pool).await
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<Option<BarberRow>, sqlx::Error> {
    sqlx::query_as::<_, BarberRow>("SELECT * FROM barbers WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &SqlitePool, data: &NewBarber) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"INSERT INTO barbers (name, email, phone, bio, image_url, is_available, is_active, created_at)
           VALUES (?, ?, ?, ?, ?, 1, 1, ?)"#,
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.bio)
    .bind(&data.image_url)
    .bind(now_timestamp())
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update(pool: &SqlitePool, id: i64, patch: &BarberPatch) -> Result<bool, sqlx::Error> {
    let mut builder = UpdateBuilder::new("barbers");
    builder.set_opt("name", patch.name.clone());
    builder.set_opt("email", patch.email.clone());
    builder.set_opt("phone", patch.phone.clone());
    builder.set_opt("bio", patch.bio.clone());
    builder.set_opt("image_url", patch.image_url.clone());
    builder.set_opt("is_available", patch.is_available);
    if builder.is_empty() {
        return Ok(false);
    }
    Ok(builder.execute(id, pool).await? > 0)
}

/// Barbers referenced by appointments are never hard-deleted; removal is a
/// soft-delete flag flip.
pub async fn soft_delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query("UPDATE barbers SET is_active = 0 WHERE id = ? AND is_active = 1")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(affected > 0)
}
