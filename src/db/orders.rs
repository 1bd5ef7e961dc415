use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::models::{OrderItemRow, OrderRow, ORDER_STATUSES, TAX_RATE};

use super::now_timestamp;

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: i64,
    pub price: f64,
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: OrderRow,
    pub items: Vec<OrderItemRow>,
}

pub fn is_valid_status(status: &str) -> bool {
    ORDER_STATUSES.contains(&status)
}

/// Header, item rows, and stock decrements all share one transaction; a
/// failure anywhere undoes the whole order. Stock is decremented without a
/// floor, so overselling drives stock_quantity negative.
pub async fn create(pool: &SqlitePool, data: &NewOrder) -> Result<(i64, String), sqlx::Error> {
    // Millisecond resolution: two creates in the same millisecond collide
    // on the UNIQUE order_number and the second one fails.
    let order_number = format!("ORD-{}", Utc::now().timestamp_millis());
    let subtotal: f64 = data
        .items
        .iter()
        .map(|item| item.quantity as f64 * item.price)
        .sum();
    let tax_amount = subtotal * TAX_RATE;
    let total_amount = subtotal + tax_amount;

    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"INSERT INTO orders
           (order_number, customer_name, customer_email, customer_phone, shipping_address,
            billing_address, subtotal, tax_amount, total_amount, order_status, status, created_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'pending', 'pending', ?)"#,
    )
    .bind(&order_number)
    .bind(&data.customer_name)
    .bind(&data.customer_email)
    .bind(&data.customer_phone)
    .bind(&data.shipping_address)
    .bind(&data.billing_address)
    .bind(subtotal)
    .bind(tax_amount)
    .bind(total_amount)
    .bind(now_timestamp())
    .execute(&mut *tx)
    .await?;

    let order_id = result.last_insert_rowid();
    for item in &data.items {
        insert_item(&mut tx, order_id, item).await?;
    }

    tx.commit().await?;
    Ok((order_id, order_number))
}

async fn insert_item(
    tx: &mut Transaction<'_, Sqlite>,
    order_id: i64,
    item: &NewOrderItem,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"INSERT INTO order_items (order_id, product_id, quantity, unit_price, total_price)
           VALUES (?, ?, ?, ?, ?)"#,
    )
    .bind(order_id)
    .bind(item.product_id)
    .bind(item.quantity)
    .bind(item.price)
    .bind(item.quantity as f64 * item.price)
    .execute(&mut **tx)
    .await?;

    sqlx::query("UPDATE products SET stock_quantity = stock_quantity - ? WHERE id = ?")
        .bind(item.quantity)
        .bind(item.product_id)
        .execute(&mut **tx)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Rebuilds the order's money columns from the live item set. The
/// correlated subquery keeps the totals honest no matter which mutation
/// path touched the items.
async fn recompute_totals(
    tx: &mut Transaction<'_, Sqlite>,
    order_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"UPDATE orders SET
             subtotal = COALESCE((SELECT SUM(total_price) FROM order_items WHERE order_id = orders.id), 0.0),
             tax_amount = COALESCE((SELECT SUM(total_price) FROM order_items WHERE order_id = orders.id), 0.0) * ?,
             total_amount = COALESCE((SELECT SUM(total_price) FROM order_items WHERE order_id = orders.id), 0.0) * ?
           WHERE id = ?"#,
    )
    .bind(TAX_RATE)
    .bind(1.0 + TAX_RATE)
    .bind(order_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Returns None when the order does not exist.
pub async fn add_item(
    pool: &SqlitePool,
    order_id: i64,
    item: &NewOrderItem,
) -> Result<Option<i64>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM orders WHERE id = ?")
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Ok(None);
    }

    let item_id = insert_item(&mut tx, order_id, item).await?;
    recompute_totals(&mut tx, order_id).await?;

    tx.commit().await?;
    Ok(Some(item_id))
}

/// Changes an item's quantity, moving stock by the signed difference
/// between the new and old quantities.
pub async fn update_item(
    pool: &SqlitePool,
    item_id: i64,
    quantity: i64,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let existing: Option<(i64, i64, i64, f64)> = sqlx::query_as(
        "SELECT order_id, product_id, quantity, unit_price FROM order_items WHERE id = ?",
    )
    .bind(item_id)
    .fetch_optional(&mut *tx)
    .await?;
    let Some((order_id, product_id, old_quantity, unit_price)) = existing else {
        return Ok(false);
    };

    sqlx::query("UPDATE products SET stock_quantity = stock_quantity - ? WHERE id = ?")
        .bind(quantity - old_quantity)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE order_items SET quantity = ?, total_price = ? WHERE id = ?")
        .bind(quantity)
        .bind(quantity as f64 * unit_price)
        .bind(item_id)
        .execute(&mut *tx)
        .await?;

    recompute_totals(&mut tx, order_id).await?;

    tx.commit().await?;
    Ok(true)
}

/// Removes an item and returns its full quantity to the product's stock.
pub async fn delete_item(pool: &SqlitePool, item_id: i64) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let existing: Option<(i64, i64, i64)> =
        sqlx::query_as("SELECT order_id, product_id, quantity FROM order_items WHERE id = ?")
            .bind(item_id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some((order_id, product_id, quantity)) = existing else {
        return Ok(false);
    };

    sqlx::query("UPDATE products SET stock_quantity = stock_quantity + ? WHERE id = ?")
        .bind(quantity)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM order_items WHERE id = ?")
        .bind(item_id)
        .execute(&mut *tx)
        .await?;

    recompute_totals(&mut tx, order_id).await?;

    tx.commit().await?;
    Ok(true)
}

/// The legacy `status` column and the primary `order_status` column must
/// always move together.
pub async fn update_status(pool: &SqlitePool, id: i64, status: &str) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query("UPDATE orders SET order_status = ?, status = ? WHERE id = ?")
        .bind(status)
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(affected > 0)
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<OrderRow>, sqlx::Error> {
    sqlx::query_as::<_, OrderRow>("SELECT * FROM orders ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<Option<OrderDetail>, sqlx::Error> {
    let order = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    let Some(order) = order else {
        return Ok(None);
    };

    let items =
        sqlx::query_as::<_, OrderItemRow>("SELECT * FROM order_items WHERE order_id = ? ORDER BY id")
            .bind(id)
            .fetch_all(pool)
            .await?;

    Ok(Some(OrderDetail { order, items }))
}

pub async fn get_item(pool: &SqlitePool, item_id: i64) -> Result<Option<OrderItemRow>, sqlx::Error> {
    sqlx::query_as::<_, OrderItemRow>("SELECT * FROM order_items WHERE id = ?")
        .bind(item_id)
        .fetch_optional(pool)
        .await
}
