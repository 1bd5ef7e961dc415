use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{
    db::{
        self,
        barbers::{BarberPatch, NewBarber},
    },
    error::ApiError,
    response::ApiResponse,
    state::AppState,
    validate,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/barbers")
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
    include_inactive: bool,
}

async fn list(
    state: web::Data<AppState>,
    query: web::Query<ListFilter>,
) -> Result<HttpResponse, ApiError> {
    let rows = db::barbers::list(&state.db, query.include_inactive).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(rows)))
}

async fn detail(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let barber = db::barbers::get(&state.db, path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("Barber"))?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(barber)))
}

async fn create(
    state: web::Data<AppState>,
    payload: web::Json<NewBarber>,
) -> Result<HttpResponse, ApiError> {
    let data = payload.into_inner();
    let mut errors = Vec::new();
    validate::check_name(&mut errors, &data.name, "Name");
    if let Some(email) = &data.email {
        validate::check_email(&mut errors, email);
    }
    if let Some(phone) = &data.phone {
        validate::check_phone(&mut errors, phone);
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let id = db::barbers::create(&state.db, &data).await?;
    db::log_activity(
        &state.db,
        "barber_created",
        &format!("Barber {} added.", data.name),
    )
    .await;
    Ok(HttpResponse::Created().json(ApiResponse::ok_with("Barber created", json!({ "id": id }))))
}

async fn update(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    payload: web::Json<BarberPatch>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let patch = payload.into_inner();

    let mut errors = Vec::new();
    if let Some(name) = &patch.name {
        validate::check_name(&mut errors, name, "Name");
    }
    if let Some(email) = &patch.email {
        validate::check_email(&mut errors, email);
    }
    if let Some(phone) = &patch.phone {
        validate::check_phone(&mut errors, phone);
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    if !db::barbers::update(&state.db, id, &patch).await? {
        return Err(ApiError::NotFound("Barber"));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::message("Barber updated")))
}

async fn remove(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if !db::barbers::soft_delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Barber"));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::message("Barber deactivated")))
}
