use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, SqlitePool};

use crate::models::{
    AppointmentRow, ServiceRow, STATUS_ARCHIVED, STATUS_CANCELLED, STATUS_COMPLETED,
    STATUS_CONFIRMED, STATUS_PENDING,
};

use super::{now_timestamp, UpdateBuilder};

const APPOINTMENT_COLUMNS: &str = r#"a.id, a.customer_name, a.customer_email, a.customer_phone,
    a.barber_id, b.name AS barber_name, a.appointment_date, a.appointment_time,
    a.status, a.notes, a.tip_amount, a.total_amount, a.created_at"#;

#[derive(Debug, Clone, Deserialize)]
pub struct NewAppointment {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub barber_id: i64,
    pub appointment_date: String,
    pub appointment_time: String,
    pub notes: Option<String>,
    #[serde(default)]
    pub tip_amount: f64,
    #[serde(default)]
    pub total_amount: f64,
    pub services: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentPatch {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub barber_id: Option<i64>,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub tip_amount: Option<f64>,
    pub total_amount: Option<f64>,
    pub services: Option<Vec<i64>>,
}

#[derive(Debug, Serialize)]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: AppointmentRow,
    pub services: Vec<ServiceRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKind {
    SameDate,
    Recent,
}

#[derive(Debug, Clone, Serialize)]
pub struct DuplicateCheck {
    pub is_duplicate: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<DuplicateKind>,
}

impl DuplicateCheck {
    fn clear() -> Self {
        Self {
            is_duplicate: false,
            kind: None,
        }
    }

    fn flagged(kind: DuplicateKind) -> Self {
        Self {
            is_duplicate: true,
            kind: Some(kind),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ArchiveSweep {
    pub completed: u64,
    pub archived: u64,
}

/// Inserts the appointment and its service join rows as one unit; any
/// statement failure rolls the whole booking back.
pub async fn create(pool: &SqlitePool, data: &NewAppointment) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"INSERT INTO appointments
           (customer_name, customer_email, customer_phone, barber_id, appointment_date,
            appointment_time, status, notes, tip_amount, total_amount, created_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&data.customer_name)
    .bind(&data.customer_email)
    .bind(&data.customer_phone)
    .bind(data.barber_id)
    .bind(&data.appointment_date)
    .bind(&data.appointment_time)
    .bind(STATUS_PENDING)
    .bind(&data.notes)
    .bind(data.tip_amount)
    .bind(data.total_amount)
    .bind(now_timestamp())
    .execute(&mut *tx)
    .await?;

    let appointment_id = result.last_insert_rowid();
    for service_id in &data.services {
        sqlx::query("INSERT INTO appointment_services (appointment_id, service_id) VALUES (?, ?)")
            .bind(appointment_id)
            .bind(service_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(appointment_id)
}

/// Patch-based partial update. A supplied `services` list is treated as a
/// full replacement of the join rows, not a diff.
pub async fn update(pool: &SqlitePool, id: i64, patch: &AppointmentPatch) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM appointments WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Ok(false);
    }

    let mut builder = UpdateBuilder::new("appointments");
    builder.set_opt("customer_name", patch.customer_name.clone());
    builder.set_opt("customer_email", patch.customer_email.clone());
    builder.set_opt("customer_phone", patch.customer_phone.clone());
    builder.set_opt("barber_id", patch.barber_id);
    builder.set_opt("appointment_date", patch.appointment_date.clone());
    builder.set_opt("appointment_time", patch.appointment_time.clone());
    builder.set_opt("status", patch.status.clone());
    builder.set_opt("notes", patch.notes.clone());
    builder.set_opt("tip_amount", patch.tip_amount);
    builder.set_opt("total_amount", patch.total_amount);

    let mut touched = false;
    if !builder.is_empty() {
        touched = builder.execute(id, &mut *tx).await? > 0;
    }

    if let Some(services) = &patch.services {
        sqlx::query("DELETE FROM appointment_services WHERE appointment_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        for service_id in services {
            sqlx::query(
                "INSERT INTO appointment_services (appointment_id, service_id) VALUES (?, ?)",
            )
            .bind(id)
            .bind(service_id)
            .execute(&mut *tx)
            .await?;
        }
        touched = true;
    }

    tx.commit().await?;
    Ok(touched)
}

/// True iff no non-cancelled appointment holds the exact barber/date/time
/// triple. Granularity is an exact time-string match; overlapping slots of
/// different durations are not considered.
pub async fn check_availability(
    pool: &SqlitePool,
    barber_id: i64,
    date: &str,
    time: &str,
) -> Result<bool, sqlx::Error> {
    let taken: i64 = sqlx::query_scalar(
        r#"SELECT COUNT(*) FROM appointments
           WHERE barber_id = ? AND appointment_date = ? AND appointment_time = ?
             AND status != ?"#,
    )
    .bind(barber_id)
    .bind(date)
    .bind(time)
    .bind(STATUS_CANCELLED)
    .fetch_one(pool)
    .await?;
    Ok(taken == 0)
}

/// Scans the customer's 5 most recent pending/confirmed bookings. An exact
/// date match is a hard conflict; anything within 7 days by absolute day
/// difference (future bookings included) is a soft warning.
pub async fn check_duplicate_booking(
    pool: &SqlitePool,
    phone: &str,
    email: &str,
    date: &str,
) -> Result<DuplicateCheck, sqlx::Error> {
    let recent: Vec<(String,)> = sqlx::query_as(
        r#"SELECT appointment_date FROM appointments
           WHERE (customer_phone = ? OR customer_email = ?)
             AND status IN (?, ?)
           ORDER BY created_at DESC
           LIMIT 5"#,
    )
    .bind(phone)
    .bind(email)
    .bind(STATUS_PENDING)
    .bind(STATUS_CONFIRMED)
    .fetch_all(pool)
    .await?;

    if recent.iter().any(|(existing,)| existing == date) {
        return Ok(DuplicateCheck::flagged(DuplicateKind::SameDate));
    }

    if let Ok(requested) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        for (existing,) in &recent {
            if let Ok(existing) = NaiveDate::parse_from_str(existing, "%Y-%m-%d") {
                if (existing - requested).num_days().abs() <= 7 {
                    return Ok(DuplicateCheck::flagged(DuplicateKind::Recent));
                }
            }
        }
    }

    Ok(DuplicateCheck::clear())
}

/// Periodic sweep: past-dated pending appointments become completed, and
/// completed appointments older than 30 days become archived. Both updates
/// are idempotent, so overlapping sweeps are harmless.
pub async fn auto_archive_past(pool: &SqlitePool) -> Result<ArchiveSweep, sqlx::Error> {
    let now = Local::now();
    let now_stamp = now.format("%Y-%m-%d %H:%M").to_string();

    let completed = sqlx::query(
        r#"UPDATE appointments SET status = ?
           WHERE status = ? AND appointment_date || ' ' || appointment_time < ?"#,
    )
    .bind(STATUS_COMPLETED)
    .bind(STATUS_PENDING)
    .bind(&now_stamp)
    .execute(pool)
    .await?
    .rows_affected();

    let cutoff = (now.date_naive() - Duration::days(30))
        .format("%Y-%m-%d")
        .to_string();
    let archived = sqlx::query(
        "UPDATE appointments SET status = ? WHERE status = ? AND appointment_date < ?",
    )
    .bind(STATUS_ARCHIVED)
    .bind(STATUS_COMPLETED)
    .bind(&cutoff)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(ArchiveSweep {
        completed,
        archived,
    })
}

pub async fn list(
    pool: &SqlitePool,
    status: Option<&str>,
    date: Option<&str>,
) -> Result<Vec<AppointmentRow>, sqlx::Error> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments a JOIN barbers b ON a.barber_id = b.id WHERE 1 = 1"
    ));
    if let Some(status) = status {
        qb.push(" AND a.status = ").push_bind(status.to_string());
    }
    if let Some(date) = date {
        qb.push(" AND a.appointment_date = ").push_bind(date.to_string());
    }
    qb.push(" ORDER BY a.appointment_date DESC, a.appointment_time DESC");
    qb.build_query_as::<AppointmentRow>().fetch_all(pool).await
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<Option<AppointmentDetail>, sqlx::Error> {
    let appointment = sqlx::query_as::<_, AppointmentRow>(&format!(
        r#"SELECT {APPOINTMENT_COLUMNS}
           FROM appointments a JOIN barbers b ON a.barber_id = b.id
           WHERE a.id = ?"#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(appointment) = appointment else {
        return Ok(None);
    };

    let services = sqlx::query_as::<_, ServiceRow>(
        r#"SELECT s.id, s.name, s.description, s.price, s.duration_minutes, s.category,
                  s.image_url, s.is_active, s.created_at
           FROM appointment_services aps
           JOIN services s ON aps.service_id = s.id
           WHERE aps.appointment_id = ?"#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some(AppointmentDetail {
        appointment,
        services,
    }))
}

/// Cancellation keeps the row for history; there is no hard delete.
pub async fn cancel(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query("UPDATE appointments SET status = ? WHERE id = ? AND status != ?")
        .bind(STATUS_CANCELLED)
        .bind(id)
        .bind(STATUS_CANCELLED)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(affected > 0)
}
