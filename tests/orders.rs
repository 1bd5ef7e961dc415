mod common;

use fadeworks::db::orders::{self, NewOrder, NewOrderItem};
use sqlx::SqlitePool;

const EPS: f64 = 1e-9;

fn order_with(items: Vec<NewOrderItem>) -> NewOrder {
    NewOrder {
        customer_name: "Dana Reeve".to_string(),
        customer_email: "dana@example.com".to_string(),
        customer_phone: Some("5557654321".to_string()),
        shipping_address: Some("12 Main St".to_string()),
        billing_address: None,
        items,
    }
}

fn item(product_id: i64, quantity: i64, price: f64) -> NewOrderItem {
    NewOrderItem {
        product_id,
        quantity,
        price,
    }
}

async fn assert_totals_consistent(pool: &SqlitePool, order_id: i64) {
    let detail = orders::get(pool, order_id).await.unwrap().unwrap();
    let item_sum: f64 = detail.items.iter().map(|i| i.total_price).sum();
    for line in &detail.items {
        assert!(
            (line.total_price - line.quantity as f64 * line.unit_price).abs() < EPS,
            "line total must equal quantity * unit price"
        );
    }
    assert!((detail.order.subtotal - item_sum).abs() < EPS);
    assert!((detail.order.tax_amount - item_sum * 0.0875).abs() < EPS);
    assert!((detail.order.total_amount - item_sum * 1.0875).abs() < EPS);
}

#[tokio::test]
async fn create_computes_totals_and_decrements_stock() {
    let pool = common::test_pool().await;
    let pomade = common::seed_product(&pool, "Pomade", 10.0, 8).await;

    let (order_id, order_number) = orders::create(&pool, &order_with(vec![item(pomade, 2, 10.0)]))
        .await
        .unwrap();
    assert!(order_number.starts_with("ORD-"));

    let detail = orders::get(&pool, order_id).await.unwrap().unwrap();
    assert!((detail.order.subtotal - 20.0).abs() < EPS);
    assert!((detail.order.tax_amount - 1.75).abs() < EPS);
    assert!((detail.order.total_amount - 21.75).abs() < EPS);
    assert_eq!(detail.order.order_status, "pending");
    assert_eq!(detail.order.status, "pending");
    assert_eq!(common::stock_of(&pool, pomade).await, 6);
}

#[tokio::test]
async fn create_rolls_back_everything_on_bad_product() {
    let pool = common::test_pool().await;
    let pomade = common::seed_product(&pool, "Pomade", 10.0, 8).await;

    let result = orders::create(
        &pool,
        &order_with(vec![item(pomade, 2, 10.0), item(9999, 1, 5.0)]),
    )
    .await;
    assert!(result.is_err());

    let orders_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(orders_count, 0);
    assert_eq!(
        common::stock_of(&pool, pomade).await,
        8,
        "stock decrement from the first item must roll back too"
    );
}

#[tokio::test]
async fn stock_may_go_negative_on_oversell() {
    let pool = common::test_pool().await;
    let comb = common::seed_product(&pool, "Comb", 4.0, 1).await;

    orders::create(&pool, &order_with(vec![item(comb, 3, 4.0)]))
        .await
        .unwrap();
    assert_eq!(common::stock_of(&pool, comb).await, -2);
}

#[tokio::test]
async fn item_mutations_keep_totals_and_stock_consistent() {
    let pool = common::test_pool().await;
    let pomade = common::seed_product(&pool, "Pomade", 10.0, 20).await;
    let oil = common::seed_product(&pool, "Beard Oil", 15.0, 20).await;

    let (order_id, _) = orders::create(&pool, &order_with(vec![item(pomade, 2, 10.0)]))
        .await
        .unwrap();
    assert_totals_consistent(&pool, order_id).await;

    // Add a second line.
    let oil_item = orders::add_item(&pool, order_id, &item(oil, 1, 15.0))
        .await
        .unwrap()
        .expect("order exists");
    assert_totals_consistent(&pool, order_id).await;
    assert_eq!(common::stock_of(&pool, oil).await, 19);

    // Grow it; stock moves by the delta only.
    assert!(orders::update_item(&pool, oil_item, 4).await.unwrap());
    assert_totals_consistent(&pool, order_id).await;
    assert_eq!(common::stock_of(&pool, oil).await, 16);

    // Shrink it back down.
    assert!(orders::update_item(&pool, oil_item, 2).await.unwrap());
    assert_totals_consistent(&pool, order_id).await;
    assert_eq!(common::stock_of(&pool, oil).await, 18);

    // Deleting restores exactly the remaining quantity.
    assert!(orders::delete_item(&pool, oil_item).await.unwrap());
    assert_totals_consistent(&pool, order_id).await;
    assert_eq!(common::stock_of(&pool, oil).await, 20);

    let detail = orders::get(&pool, order_id).await.unwrap().unwrap();
    assert_eq!(detail.items.len(), 1);
    assert!((detail.order.subtotal - 20.0).abs() < EPS);
}

#[tokio::test]
async fn deleting_the_last_item_zeroes_the_totals() {
    let pool = common::test_pool().await;
    let pomade = common::seed_product(&pool, "Pomade", 10.0, 20).await;

    let (order_id, _) = orders::create(&pool, &order_with(vec![item(pomade, 2, 10.0)]))
        .await
        .unwrap();
    let detail = orders::get(&pool, order_id).await.unwrap().unwrap();
    let only_item = detail.items[0].id;

    assert!(orders::delete_item(&pool, only_item).await.unwrap());
    let detail = orders::get(&pool, order_id).await.unwrap().unwrap();
    assert!(detail.items.is_empty());
    assert!(detail.order.subtotal.abs() < EPS);
    assert!(detail.order.total_amount.abs() < EPS);
}

#[tokio::test]
async fn add_item_to_missing_order_is_not_found() {
    let pool = common::test_pool().await;
    let pomade = common::seed_product(&pool, "Pomade", 10.0, 20).await;

    let result = orders::add_item(&pool, 42, &item(pomade, 1, 10.0))
        .await
        .unwrap();
    assert!(result.is_none());
    assert_eq!(common::stock_of(&pool, pomade).await, 20);
}

#[tokio::test]
async fn status_update_writes_both_columns() {
    let pool = common::test_pool().await;
    let pomade = common::seed_product(&pool, "Pomade", 10.0, 20).await;

    let (order_id, _) = orders::create(&pool, &order_with(vec![item(pomade, 1, 10.0)]))
        .await
        .unwrap();
    assert!(orders::update_status(&pool, order_id, "shipped").await.unwrap());

    let detail = orders::get(&pool, order_id).await.unwrap().unwrap();
    assert_eq!(detail.order.order_status, "shipped");
    assert_eq!(detail.order.status, "shipped");

    assert!(!orders::update_status(&pool, 42, "shipped").await.unwrap());
}

#[tokio::test]
async fn mutating_missing_items_reports_not_found() {
    let pool = common::test_pool().await;
    assert!(!orders::update_item(&pool, 42, 3).await.unwrap());
    assert!(!orders::delete_item(&pool, 42).await.unwrap());
    assert!(orders::get_item(&pool, 42).await.unwrap().is_none());
}
