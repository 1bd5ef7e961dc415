use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::{db, error::ApiError, response::ApiResponse, state::AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/dashboard")
            .service(web::resource("").route(web::get().to(stats)))
            .service(web::resource("/activity").route(web::get().to(activity))),
    );
}

async fn stats(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let stats = db::dashboard::stats(&state.db).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(stats)))
}

#[derive(Deserialize)]
struct ActivityFilter {
    limit: Option<i64>,
}

async fn activity(
    state: web::Data<AppState>,
    query: web::Query<ActivityFilter>,
) -> Result<HttpResponse, ApiError> {
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let rows = db::dashboard::recent_activity(&state.db, limit).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(rows)))
}
