use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{
    db::{
        self,
        orders::{NewOrder, NewOrderItem},
    },
    error::ApiError,
    models::ORDER_STATUSES,
    response::ApiResponse,
    state::AppState,
    validate,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/orders")
            .service(
                web::resource("")
                    .route(web::get().to(list))
                    .route(web::post().to(create)),
            )
            .service(web::resource("/items/{item_id}")
                .route(web::put().to(update_item))
                .route(web::delete().to(delete_item)))
            .service(web::resource("/{id}").route(web::get().to(detail)))
            .service(web::resource("/{id}/status").route(web::put().to(update_status)))
            .service(web::resource("/{id}/items").route(web::post().to(add_item))),
    );
}

fn validate_items(errors: &mut Vec<String>, items: &[NewOrderItem]) {
    if items.is_empty() {
        errors.push("Order must contain at least one item".to_string());
    }
    for item in items {
        validate::check_id(errors, item.product_id, "Product id");
        validate::check_quantity(errors, item.quantity);
        validate::check_price(errors, item.price, "Item price");
    }
}

fn validate_new(data: &NewOrder) -> Vec<String> {
    let mut errors = Vec::new();
    validate::check_name(&mut errors, &data.customer_name, "Customer name");
    validate::check_email(&mut errors, &data.customer_email);
    if let Some(phone) = &data.customer_phone {
        validate::check_phone(&mut errors, phone);
    }
    validate_items(&mut errors, &data.items);
    errors
}

async fn list(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let rows = db::orders::list(&state.db).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(rows)))
}

async fn detail(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let detail = db::orders::get(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Order"))?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(detail)))
}

async fn create(
    state: web::Data<AppState>,
    payload: web::Json<NewOrder>,
) -> Result<HttpResponse, ApiError> {
    let data = payload.into_inner();
    let errors = validate_new(&data);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let (id, order_number) = db::orders::create(&state.db, &data).await?;
    db::log_activity(
        &state.db,
        "order_created",
        &format!("Order {order_number} placed by {}.", data.customer_name),
    )
    .await;
    Ok(HttpResponse::Created().json(ApiResponse::ok_with(
        "Order placed",
        json!({ "id": id, "order_number": order_number }),
    )))
}

#[derive(Deserialize)]
struct StatusUpdate {
    status: String,
}

async fn update_status(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    payload: web::Json<StatusUpdate>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let status = payload.into_inner().status;
    if !db::orders::is_valid_status(&status) {
        return Err(ApiError::Validation(vec![format!(
            "Status must be one of: {}",
            ORDER_STATUSES.join(", ")
        )]));
    }

    if !db::orders::update_status(&state.db, id, &status).await? {
        return Err(ApiError::NotFound("Order"));
    }
    db::log_activity(
        &state.db,
        "order_status_changed",
        &format!("Order #{id} moved to {status}."),
    )
    .await;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Order status updated")))
}

async fn add_item(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    payload: web::Json<NewOrderItem>,
) -> Result<HttpResponse, ApiError> {
    let order_id = path.into_inner();
    let item = payload.into_inner();

    let mut errors = Vec::new();
    validate::check_id(&mut errors, item.product_id, "Product id");
    validate::check_quantity(&mut errors, item.quantity);
    validate::check_price(&mut errors, item.price, "Item price");
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let item_id = db::orders::add_item(&state.db, order_id, &item)
        .await?
        .ok_or(ApiError::NotFound("Order"))?;
    Ok(HttpResponse::Created()
        .json(ApiResponse::ok_with("Item added", json!({ "id": item_id }))))
}

#[derive(Deserialize)]
struct ItemUpdate {
    quantity: i64,
}

async fn update_item(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    payload: web::Json<ItemUpdate>,
) -> Result<HttpResponse, ApiError> {
    let item_id = path.into_inner();
    let quantity = payload.into_inner().quantity;

    let mut errors = Vec::new();
    validate::check_quantity(&mut errors, quantity);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    if !db::orders::update_item(&state.db, item_id, quantity).await? {
        return Err(ApiError::NotFound("Order item"));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::message("Item updated")))
}

async fn delete_item(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let item_id = path.into_inner();
    if !db::orders::delete_item(&state.db, item_id).await? {
        return Err(ApiError::NotFound("Order item"));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::message("Item removed")))
}
