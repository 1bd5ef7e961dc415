use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{
    db::{
        self,
        products::{NewProduct, ProductPatch},
    },
    error::ApiError,
    response::ApiResponse,
    state::AppState,
    validate,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/products")
            .service(
                web::resource("")
                    .route(web::get().to(list))
                    .route(web::post().to(create)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(detail))
                    .route(web::put().to(update))
                    .route(web::delete().to(remove)),
            ),
    );
}

#[derive(Deserialize)]
struct ListFilter {
    #[serde(default)]
    featured: bool,
    #[serde(default)]
    include_inactive: bool,
}

async fn list(
    state: web::Data<AppState>,
    query: web::Query<ListFilter>,
) -> Result<HttpResponse, ApiError> {
    let rows = db::products::list(&state.db, query.featured, query.include_inactive).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(rows)))
}

async fn detail(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let product = db::products::get(&state.db, path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("Product"))?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(product)))
}

async fn create(
    state: web::Data<AppState>,
    payload: web::Json<NewProduct>,
) -> Result<HttpResponse, ApiError> {
    let data = payload.into_inner();
    let mut errors = Vec::new();
    validate::check_name(&mut errors, &data.name, "Name");
    validate::check_price(&mut errors, data.price, "Price");
    if data.stock_quantity < 0 {
        errors.push("Stock quantity must not be negative".to_string());
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let id = db::products::create(&state.db, &data).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok_with("Product created", json!({ "id": id }))))
}

async fn update(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    payload: web::Json<ProductPatch>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let patch = payload.into_inner();

    let mut errors = Vec::new();
    if let Some(name) = &patch.name {
        validate::check_name(&mut errors, name, "Name");
    }
    if let Some(price) = patch.price {
        validate::check_price(&mut errors, price, "Price");
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    if !db::products::update(&state.db, id, &patch).await? {
        return Err(ApiError::NotFound("Product"));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::message("Product updated")))
}

async fn remove(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if !db::products::soft_delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Product"));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::message("Product deactivated")))
}
