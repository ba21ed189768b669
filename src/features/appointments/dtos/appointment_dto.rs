use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::appointments::models::{Appointment, AppointmentStatus, EditRequestStatus};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub category_id: i64,
    pub service_id: i64,
    pub date: NaiveDate,
    /// Clock time; "8", "8:00" and "08:00" are all accepted
    pub time: String,
}

/// Patch for `PUT /api/appointments/{id}`.
///
/// Admins may change any field; owners may only propose date/time, which
/// lands as a pending edit request.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentRequest {
    pub category_id: Option<i64>,
    pub service_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlotsQuery {
    pub service_id: Option<i64>,
    pub category_id: Option<i64>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlotsDto {
    pub available_slots: Vec<String>,
}

/// Wire shape of an appointment, flat like the stored row.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponseDto {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub service_id: i64,
    pub date: NaiveDate,
    pub time: String,
    pub status: AppointmentStatus,
    pub edit_requested_category_id: Option<i64>,
    pub edit_requested_service_id: Option<i64>,
    pub edit_requested_date: Option<NaiveDate>,
    pub edit_requested_time: Option<String>,
    pub edit_request_status: Option<EditRequestStatus>,
}

impl From<Appointment> for AppointmentResponseDto {
    fn from(a: Appointment) -> Self {
        let edit = a.edit_request;
        Self {
            id: a.id,
            user_id: a.user_id,
            category_id: a.category_id,
            service_id: a.service_id,
            date: a.date,
            time: a.time,
            status: a.status,
            edit_requested_category_id: edit.as_ref().map(|e| e.category_id),
            edit_requested_service_id: edit.as_ref().map(|e| e.service_id),
            edit_requested_date: edit.as_ref().and_then(|e| e.date),
            edit_requested_time: edit.as_ref().and_then(|e| e.time.clone()),
            edit_request_status: edit.map(|e| e.status),
        }
    }
}
