mod common;

use actix_web::{test, web, App};
use chrono::{Duration, Local};
use serde_json::{json, Value};

use fadeworks::{routes, state::AppState};

macro_rules! spawn_app {
    ($pool:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new($pool)))
                .configure(routes::appointments::configure)
                .configure(routes::barbers::configure)
                .configure(routes::orders::configure),
        )
        .await
    };
}

fn day_offset(days: i64) -> String {
    (Local::now().date_naive() + Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

fn booking_payload(barber_id: i64, service_id: i64, date: &str) -> Value {
    json!({
        "customer_name": "Sam Carter",
        "customer_email": "sam@example.com",
        "customer_phone": "5551234567",
        "barber_id": barber_id,
        "appointment_date": date,
        "appointment_time": "10:00",
        "services": [service_id],
    })
}

#[actix_web::test]
async fn validation_failures_return_the_full_error_list() {
    let pool = common::test_pool().await;
    let app = spawn_app!(pool);

    let req = test::TestRequest::post()
        .uri("/api/appointments")
        .set_json(json!({
            "customer_name": "J",
            "customer_email": "not-an-email",
            "customer_phone": "123",
            "barber_id": 0,
            "appointment_date": "2020-01-01",
            "appointment_time": "9:00",
            "services": [],
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    let errors = body["errors"].as_array().expect("errors list");
    assert!(errors.len() >= 6, "every failed rule is reported: {errors:?}");
}

#[actix_web::test]
async fn booking_an_occupied_slot_is_a_tagged_conflict() {
    let pool = common::test_pool().await;
    let barber = common::seed_barber(&pool, "Marco").await;
    let cut = common::seed_service(&pool, "Cut", 30.0).await;
    let app = spawn_app!(pool);

    let date = day_offset(2);
    let req = test::TestRequest::post()
        .uri("/api/appointments")
        .set_json(booking_payload(barber, cut, &date))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert!(body["data"]["id"].as_i64().unwrap() > 0);

    // Same customer, same date: blocked before the slot is even checked.
    let req = test::TestRequest::post()
        .uri("/api/appointments")
        .set_json(booking_payload(barber, cut, &date))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 409);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["type"], "same_date");

    // Different customer, same slot: unavailable.
    let mut payload = booking_payload(barber, cut, &date);
    payload["customer_email"] = json!("zoe@example.com");
    payload["customer_phone"] = json!("5559999999");
    let req = test::TestRequest::post()
        .uri("/api/appointments")
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 409);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["type"], "slot_unavailable");
}

#[actix_web::test]
async fn missing_resources_are_404_with_envelope() {
    let pool = common::test_pool().await;
    let app = spawn_app!(pool);

    let req = test::TestRequest::get()
        .uri("/api/appointments/999")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Appointment not found");
}

#[actix_web::test]
async fn barber_delete_is_soft() {
    let pool = common::test_pool().await;
    let barber = common::seed_barber(&pool, "Marco").await;
    let app = spawn_app!(pool.clone());

    let req = test::TestRequest::delete()
        .uri(&format!("/api/barbers/{barber}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    // Row still exists, just inactive.
    let is_active: i64 = sqlx::query_scalar("SELECT is_active FROM barbers WHERE id = ?")
        .bind(barber)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(is_active, 0);

    // Default listing hides it.
    let req = test::TestRequest::get().uri("/api/barbers").to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn order_status_endpoint_rejects_unknown_statuses() {
    let pool = common::test_pool().await;
    let product = common::seed_product(&pool, "Pomade", 10.0, 5).await;
    let app = spawn_app!(pool);

    let req = test::TestRequest::post()
        .uri("/api/orders")
        .set_json(json!({
            "customer_name": "Dana Reeve",
            "customer_email": "dana@example.com",
            "items": [{ "product_id": product, "quantity": 1, "price": 10.0 }],
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    let order_id = body["data"]["id"].as_i64().unwrap();

    let req = test::TestRequest::put()
        .uri(&format!("/api/orders/{order_id}/status"))
        .set_json(json!({ "status": "teleported" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::put()
        .uri(&format!("/api/orders/{order_id}/status"))
        .set_json(json!({ "status": "processing" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}
