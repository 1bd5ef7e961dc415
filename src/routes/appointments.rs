use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{
    db::{
        self,
        appointments::{AppointmentPatch, DuplicateKind, NewAppointment},
    },
    error::ApiError,
    models::APPOINTMENT_STATUSES,
    response::ApiResponse,
    state::AppState,
    validate,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/appointments")
            .service(
                web::resource("")
                    .route(web::get().to(list))
                    .route(web::post().to(create)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(detail))
                    .route(web::put().to(update))
                    .route(web::delete().to(cancel)),
            ),
    );
}

#[derive(Deserialize)]
struct ListFilter {
    status: Option<String>,
    date: Option<String>,
}

fn validate_new(data: &NewAppointment) -> Vec<String> {
    let mut errors = Vec::new();
    validate::check_name(&mut errors, &data.customer_name, "Customer name");
    validate::check_email(&mut errors, &data.customer_email);
    validate::check_phone(&mut errors, &data.customer_phone);
    validate::check_id(&mut errors, data.barber_id, "Barber id");
    validate::check_date(&mut errors, &data.appointment_date);
    validate::check_time(&mut errors, &data.appointment_time);
    validate::check_service_ids(&mut errors, &data.services);
    errors
}

fn validate_patch(patch: &AppointmentPatch) -> Vec<String> {
    let mut errors = Vec::new();
    if let Some(name) = &patch.customer_name {
        validate::check_name(&mut errors, name, "Customer name");
    }
    if let Some(email) = &patch.customer_email {
        validate::check_email(&mut errors, email);
    }
    if let Some(phone) = &patch.customer_phone {
        validate::check_phone(&mut errors, phone);
    }
    if let Some(barber_id) = patch.barber_id {
        validate::check_id(&mut errors, barber_id, "Barber id");
    }
    if let Some(date) = &patch.appointment_date {
        validate::check_date(&mut errors, date);
    }
    if let Some(time) = &patch.appointment_time {
        validate::check_time(&mut errors, time);
    }
    if let Some(status) = &patch.status {
        if !APPOINTMENT_STATUSES.contains(&status.as_str()) {
            errors.push(format!(
                "Status must be one of: {}",
                APPOINTMENT_STATUSES.join(", ")
            ));
        }
    }
    if let Some(services) = &patch.services {
        validate::check_service_ids(&mut errors, services);
    }
    errors
}

async fn list(
    state: web::Data<AppState>,
    query: web::Query<ListFilter>,
) -> Result<HttpResponse, ApiError> {
    let rows = db::appointments::list(&state.db, query.status.as_deref(), query.date.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(rows)))
}

async fn detail(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let detail = db::appointments::get(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Appointment"))?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(detail)))
}

async fn create(
    state: web::Data<AppState>,
    payload: web::Json<NewAppointment>,
) -> Result<HttpResponse, ApiError> {
    let data = payload.into_inner();
    let errors = validate_new(&data);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let duplicate = db::appointments::check_duplicate_booking(
        &state.db,
        &data.customer_phone,
        &data.customer_email,
        &data.appointment_date,
    )
    .await?;
    let mut warning = None;
    match duplicate.kind {
        Some(DuplicateKind::SameDate) => {
            return Err(ApiError::conflict(
                "same_date",
                "This customer already has an appointment on that date",
            ));
        }
        Some(DuplicateKind::Recent) => {
            warning = Some("this customer has another booking within 7 days");
        }
        None => {}
    }

    let available = db::appointments::check_availability(
        &state.db,
        data.barber_id,
        &data.appointment_date,
        &data.appointment_time,
    )
    .await?;
    if !available {
        return Err(ApiError::conflict(
            "slot_unavailable",
            "That time slot is already booked for this barber",
        ));
    }

    let id = db::appointments::create(&state.db, &data).await?;
    db::log_activity(
        &state.db,
        "appointment_created",
        &format!("Appointment #{id} booked for {}.", data.customer_name),
    )
    .await;

    let message = match warning {
        Some(warning) => format!("Appointment booked; note: {warning}"),
        None => "Appointment booked".to_string(),
    };
    Ok(HttpResponse::Created().json(ApiResponse::ok_with(message, json!({ "id": id }))))
}

async fn update(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    payload: web::Json<AppointmentPatch>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let patch = payload.into_inner();
    let errors = validate_patch(&patch);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    if !db::appointments::update(&state.db, id, &patch).await? {
        return Err(ApiError::NotFound("Appointment"));
    }
    db::log_activity(
        &state.db,
        "appointment_updated",
        &format!("Appointment #{id} updated."),
    )
    .await;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Appointment updated")))
}

async fn cancel(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if !db::appointments::cancel(&state.db, id).await? {
        return Err(ApiError::NotFound("Appointment"));
    }
    db::log_activity(
        &state.db,
        "appointment_cancelled",
        &format!("Appointment #{id} cancelled."),
    )
    .await;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Appointment cancelled")))
}
