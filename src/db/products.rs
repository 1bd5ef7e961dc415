use serde::Deserialize;
use sqlx::{QueryBuilder, SqlitePool};

use crate::models::ProductRow;

use super::{now_timestamp, UpdateBuilder};

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub stock_quantity: i64,
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock_quantity: Option<i64>,
    pub image_url: Option<String>,
    pub is_active: Option<i64>,
    pub is_featured: Option<i64>,
}

pub async fn list(
    pool: &SqlitePool,
    featured_only: bool,
    include_inactive: bool,
) -> Result<Vec<ProductRow>, sqlx::Error> {
    let mut qb = QueryBuilder::new("SELECT * FROM products WHERE 1 = 1");
    if !include_inactive {
        qb.push(" AND is_active = 1");
    }
    if featured_only {
        qb.push(" AND is_featured = 1");
    }
    qb.push(" ORDER BY name");
    qb.build_query_as::<ProductRow>().fetch_all(pool).await
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<Option<ProductRow>, sqlx::Error> {
    sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &SqlitePool, data: &NewProduct) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"INSERT INTO products (name, description, price, stock_quantity, image_url, is_active, is_featured, created_at)
           VALUES (?, ?, ?, ?, ?, 1, ?, ?)"#,
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.stock_quantity)
    .bind(&data.image_url)
    .bind(data.is_featured as i64)
    .bind(now_timestamp())
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update(pool: &SqlitePool, id: i64, patch: &ProductPatch) -> Result<bool, sqlx::Error> {
    let mut builder = UpdateBuilder::new("products");
    builder.set_opt("name", patch.name.clone());
    builder.set_opt("description", patch.description.clone());
    builder.set_opt("price", patch.price);
    builder.set_opt("stock_quantity", patch.stock_quantity);
    builder.set_opt("image_url", patch.image_url.clone());
    builder.set_opt("is_active", patch.is_active);
    builder.set_opt("is_featured", patch.is_featured);
    if builder.is_empty() {
        return Ok(false);
    }
    Ok(builder.execute(id, pool).await? > 0)
}

pub async fn soft_delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query("UPDATE products SET is_active = 0 WHERE id = ? AND is_active = 1")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(affected > 0)
}
