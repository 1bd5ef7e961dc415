use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{
    db::{self, time_blocks::NewTimeBlock},
    error::ApiError,
    response::ApiResponse,
    state::AppState,
    validate,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/time-blocks")
            .service(
                web::resource("")
                    .route(web::get().to(list))
                    .route(web::post().to(create)),
            )
            .service(web::resource("/{id}").route(web::delete().to(remove))),
    );
}

#[derive(Deserialize)]
struct ListFilter {
    barber_id: Option<i64>,
    date: Option<String>,
}

async fn list(
    state: web::Data<AppState>,
    query: web::Query<ListFilter>,
) -> Result<HttpResponse, ApiError> {
    let rows = db::time_blocks::list(&state.db, query.barber_id, query.date.as_deref()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(rows)))
}

async fn create(
    state: web::Data<AppState>,
    payload: web::Json<NewTimeBlock>,
) -> Result<HttpResponse, ApiError> {
    let data = payload.into_inner();
    let mut errors = Vec::new();
    validate::check_id(&mut errors, data.barber_id, "Barber id");
    validate::check_date(&mut errors, &data.block_date);
    validate::check_time(&mut errors, &data.start_time);
    validate::check_time(&mut errors, &data.end_time);
    if data.start_time >= data.end_time {
        errors.push("End time must be after start time".to_string());
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let id = db::time_blocks::create(&state.db, &data).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok_with("Time block created", json!({ "id": id }))))
}

async fn remove(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if !db::time_blocks::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Time block"));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::message("Time block removed")))
}
