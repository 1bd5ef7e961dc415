#![allow(dead_code)]

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use fadeworks::db;

/// One connection keeps every statement on the same in-memory database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    db::run_migrations(&pool).await.expect("migrations");
    pool
}

pub async fn seed_barber(pool: &SqlitePool, name: &str) -> i64 {
    db::barbers::create(
        pool,
        &db::barbers::NewBarber {
            name: name.to_string(),
            email: None,
            phone: None,
            bio: None,
            image_url: None,
        },
    )
    .await
    .expect("seed barber")
}

pub async fn seed_service(pool: &SqlitePool, name: &str, price: f64) -> i64 {
    db::services::create(
        pool,
        &db::services::NewService {
            name: name.to_string(),
            description: None,
            price,
            duration_minutes: 30,
            category: "haircut".to_string(),
            image_url: None,
        },
    )
    .await
    .expect("seed service")
}

pub async fn seed_product(pool: &SqlitePool, name: &str, price: f64, stock: i64) -> i64 {
    db::products::create(
        pool,
        &db::products::NewProduct {
            name: name.to_string(),
            description: None,
            price,
            stock_quantity: stock,
            image_url: None,
            is_featured: false,
        },
    )
    .await
    .expect("seed product")
}

pub async fn stock_of(pool: &SqlitePool, product_id: i64) -> i64 {
    sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = ?")
        .bind(product_id)
        .fetch_one(pool)
        .await
        .expect("stock")
}
