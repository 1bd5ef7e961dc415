use chrono::Local;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::models::{ActivityRow, ProductRow, STATUS_COMPLETED};

const LOW_STOCK_THRESHOLD: i64 = 5;

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub appointments_total: i64,
    pub appointments_today: i64,
    pub appointments_by_status: Vec<StatusCount>,
    pub orders_total: i64,
    pub appointment_revenue: f64,
    pub order_revenue: f64,
    pub top_services: Vec<TopService>,
    pub low_stock_products: Vec<ProductRow>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct TopService {
    pub id: i64,
    pub name: String,
    pub bookings: i64,
}

/// Read-only joins and aggregates; nothing here mutates.
pub async fn stats(pool: &SqlitePool) -> Result<DashboardStats, sqlx::Error> {
    let appointments_total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM appointments")
        .fetch_one(pool)
        .await?;

    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
    let appointments_today: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM appointments WHERE appointment_date = ?")
            .bind(&today)
            .fetch_one(pool)
            .await?;

    let appointments_by_status = sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS count FROM appointments GROUP BY status ORDER BY status",
    )
    .fetch_all(pool)
    .await?;

    let orders_total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await?;

    let appointment_revenue: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(total_amount + tip_amount), 0.0) FROM appointments WHERE status = ?",
    )
    .bind(STATUS_COMPLETED)
    .fetch_one(pool)
    .await?;

    let order_revenue: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(total_amount), 0.0) FROM orders WHERE status = 'delivered'",
    )
    .fetch_one(pool)
    .await?;

    let top_services = sqlx::query_as::<_, TopService>(
        r#"SELECT s.id, s.name, COUNT(*) AS bookings
           FROM appointment_services aps
           JOIN services s ON aps.service_id = s.id
           JOIN appointments a ON aps.appointment_id = a.id
           WHERE a.status != 'cancelled'
           GROUP BY s.id, s.name
           ORDER BY bookings DESC
           LIMIT 5"#,
    )
    .fetch_all(pool)
    .await?;

    let low_stock_products = sqlx::query_as::<_, ProductRow>(
        "SELECT * FROM products WHERE is_active = 1 AND stock_quantity < ? ORDER BY stock_quantity",
    )
    .bind(LOW_STOCK_THRESHOLD)
    .fetch_all(pool)
    .await?;

    Ok(DashboardStats {
        appointments_total,
        appointments_today,
        appointments_by_status,
        orders_total,
        appointment_revenue,
        order_revenue,
        top_services,
        low_stock_products,
    })
}

pub async fn recent_activity(pool: &SqlitePool, limit: i64) -> Result<Vec<ActivityRow>, sqlx::Error> {
    sqlx::query_as::<_, ActivityRow>(
        "SELECT kind, message, created_at FROM activities ORDER BY created_at DESC, id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
