use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::time::appointment_date_time;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "scheduled" => Some(AppointmentStatus::Scheduled),
            "cancelled" => Some(AppointmentStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EditRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl EditRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditRequestStatus::Pending => "pending",
            EditRequestStatus::Approved => "approved",
            EditRequestStatus::Rejected => "rejected",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "pending" => Some(EditRequestStatus::Pending),
            "approved" => Some(EditRequestStatus::Approved),
            "rejected" => Some(EditRequestStatus::Rejected),
            _ => None,
        }
    }
}

/// Owner-proposed change awaiting an admin decision.
///
/// The live appointment fields stay untouched until approval. Requested date
/// and time are optional only because legacy rows may hold partial data; the
/// approval path re-validates everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    pub category_id: i64,
    pub service_id: i64,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub status: EditRequestStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub service_id: i64,
    /// Calendar day, no timezone
    pub date: NaiveDate,
    /// Normalized `HH:MM`
    pub time: String,
    pub status: AppointmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_request: Option<EditRequest>,
}

impl Appointment {
    /// Start of the appointment as a naive datetime, `None` when the stored
    /// time does not parse.
    pub fn start_date_time(&self) -> Option<NaiveDateTime> {
        appointment_date_time(self.date, &self.time)
    }

    pub fn has_pending_edit(&self) -> bool {
        matches!(
            self.edit_request,
            Some(EditRequest {
                status: EditRequestStatus::Pending,
                ..
            })
        )
    }
}

/// Insert payload; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub user_id: i64,
    pub category_id: i64,
    pub service_id: i64,
    pub date: NaiveDate,
    pub time: String,
    pub status: AppointmentStatus,
}
