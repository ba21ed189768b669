use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};

use crate::core::error::{AppError, Result};
use crate::features::appointments::models::{
    Appointment, AppointmentStatus, EditRequest, EditRequestStatus, NewAppointment,
};
use crate::features::appointments::store::AppointmentStore;

const COLUMNS: &str = "id, user_id, category_id, service_id, date, time, status, \
     edit_requested_category_id, edit_requested_service_id, edit_requested_date, \
     edit_requested_time, edit_request_status";

/// Postgres-backed appointment store.
///
/// Queries are runtime-checked; the schema lives in `migrations/`.
pub struct PgAppointmentStore {
    pool: PgPool,
}

impl PgAppointmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AppointmentRow {
    id: i64,
    user_id: i64,
    category_id: i64,
    service_id: i64,
    date: NaiveDate,
    time: String,
    status: String,
    edit_requested_category_id: Option<i64>,
    edit_requested_service_id: Option<i64>,
    edit_requested_date: Option<NaiveDate>,
    edit_requested_time: Option<String>,
    edit_request_status: Option<String>,
}

impl AppointmentRow {
    fn into_appointment(self) -> Result<Appointment> {
        let status = AppointmentStatus::parse(&self.status).ok_or_else(|| {
            AppError::Internal(format!("unknown appointment status '{}'", self.status))
        })?;

        let edit_request = match self.edit_request_status.as_deref() {
            None => None,
            Some(raw) => {
                let request_status = EditRequestStatus::parse(raw).ok_or_else(|| {
                    AppError::Internal(format!("unknown edit request status '{}'", raw))
                })?;
                Some(EditRequest {
                    // Legacy rows may miss the requested pair; fall back to the
                    // live identifiers, matching what approval would use
                    category_id: self.edit_requested_category_id.unwrap_or(self.category_id),
                    service_id: self.edit_requested_service_id.unwrap_or(self.service_id),
                    date: self.edit_requested_date,
                    time: self.edit_requested_time,
                    status: request_status,
                })
            }
        };

        Ok(Appointment {
            id: self.id,
            user_id: self.user_id,
            category_id: self.category_id,
            service_id: self.service_id,
            date: self.date,
            time: self.time,
            status,
            edit_request,
        })
    }
}

fn rows_into_appointments(rows: Vec<AppointmentRow>) -> Result<Vec<Appointment>> {
    rows.into_iter().map(AppointmentRow::into_appointment).collect()
}

#[async_trait]
impl AppointmentStore for PgAppointmentStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Appointment>> {
        let row = sqlx::query_as::<_, AppointmentRow>(&format!(
            "SELECT {COLUMNS} FROM appointments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AppointmentRow::into_appointment).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Appointment>> {
        let rows = sqlx::query_as::<_, AppointmentRow>(&format!(
            "SELECT {COLUMNS} FROM appointments ORDER BY date, time, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows_into_appointments(rows)
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Appointment>> {
        let rows = sqlx::query_as::<_, AppointmentRow>(&format!(
            "SELECT {COLUMNS} FROM appointments WHERE user_id = $1 ORDER BY date, time, id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows_into_appointments(rows)
    }

    async fn find_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>> {
        let rows = sqlx::query_as::<_, AppointmentRow>(&format!(
            "SELECT {COLUMNS} FROM appointments WHERE date = $1"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        rows_into_appointments(rows)
    }

    async fn insert(&self, new: NewAppointment) -> Result<Appointment> {
        let row = sqlx::query_as::<_, AppointmentRow>(&format!(
            "INSERT INTO appointments (user_id, category_id, service_id, date, time, status) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COLUMNS}"
        ))
        .bind(new.user_id)
        .bind(new.category_id)
        .bind(new.service_id)
        .bind(new.date)
        .bind(&new.time)
        .bind(new.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        row.into_appointment()
    }

    async fn update(&self, appointment: &Appointment) -> Result<Appointment> {
        let edit = appointment.edit_request.as_ref();

        let row = sqlx::query_as::<_, AppointmentRow>(&format!(
            "UPDATE appointments SET category_id = $2, service_id = $3, date = $4, time = $5, \
             status = $6, edit_requested_category_id = $7, edit_requested_service_id = $8, \
             edit_requested_date = $9, edit_requested_time = $10, edit_request_status = $11 \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(appointment.id)
        .bind(appointment.category_id)
        .bind(appointment.service_id)
        .bind(appointment.date)
        .bind(&appointment.time)
        .bind(appointment.status.as_str())
        .bind(edit.map(|e| e.category_id))
        .bind(edit.map(|e| e.service_id))
        .bind(edit.and_then(|e| e.date))
        .bind(edit.and_then(|e| e.time.clone()))
        .bind(edit.map(|e| e.status.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| AppError::NotFound("appointment not found".to_string()))?
            .into_appointment()
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("appointment not found".to_string()));
        }
        Ok(())
    }
}
