use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{
    db::{
        self,
        services::{NewService, ServicePatch},
    },
    error::ApiError,
    response::ApiResponse,
    state::AppState,
    validate,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/services")
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
    category: Option<String>,
}

async fn list(
    state: web::Data<AppState>,
    query: web::Query<ListFilter>,
) -> Result<HttpResponse, ApiError> {
    let rows = db::services::list(&state.db, query.category.as_deref()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(rows)))
}

async fn detail(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let service = db::services::get(&state.db, path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("Service"))?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(service)))
}

async fn create(
    state: web::Data<AppState>,
    payload: web::Json<NewService>,
) -> Result<HttpResponse, ApiError> {
    let data = payload.into_inner();
    let mut errors = Vec::new();
    validate::check_name(&mut errors, &data.name, "Name");
    validate::check_price(&mut errors, data.price, "Price");
    validate::check_category(&mut errors, &data.category);
    if data.duration_minutes <= 0 {
        errors.push("Duration must be a positive number of minutes".to_string());
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let id = db::services::create(&state.db, &data).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok_with("Service created", json!({ "id": id }))))
}

async fn update(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    payload: web::Json<ServicePatch>,
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
    if let Some(category) = &patch.category {
        validate::check_category(&mut errors, category);
    }
    if let Some(duration) = patch.duration_minutes {
        if duration <= 0 {
            errors.push("Duration must be a positive number of minutes".to_string());
        }
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    if !db::services::update(&state.db, id, &patch).await? {
        return Err(ApiError::NotFound("Service"));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::message("Service updated")))
}

async fn remove(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if !db::services::soft_delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Service"));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::message("Service deactivated")))
}
