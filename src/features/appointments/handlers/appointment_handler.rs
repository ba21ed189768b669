use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::appointments::dtos::{
    AppointmentResponseDto, AvailableSlotsDto, AvailableSlotsQuery, CreateAppointmentRequest,
    UpdateAppointmentRequest,
};
use crate::features::appointments::services::SchedulingService;
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::types::{ApiResponse, Meta};

/// List every appointment (admin)
#[utoipa::path(
    get,
    path = "/api/appointments",
    responses(
        (status = 200, description = "All appointments ordered by date and time", body = ApiResponse<Vec<AppointmentResponseDto>>),
        (status = 403, description = "Admin access required")
    ),
    tag = "appointments"
)]
pub async fn list_appointments(
    State(scheduler): State<Arc<SchedulingService>>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<ApiResponse<Vec<AppointmentResponseDto>>>> {
    let appointments: Vec<AppointmentResponseDto> = scheduler
        .list_all()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let meta = Meta {
        total: appointments.len() as i64,
    };
    Ok(Json(ApiResponse::success(
        Some(appointments),
        None,
        Some(meta),
    )))
}

/// List the caller's own appointments
#[utoipa::path(
    get,
    path = "/api/appointments/my",
    responses(
        (status = 200, description = "Caller's appointments", body = ApiResponse<Vec<AppointmentResponseDto>>),
    ),
    tag = "appointments"
)]
pub async fn my_appointments(
    State(scheduler): State<Arc<SchedulingService>>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<AppointmentResponseDto>>>> {
    let appointments: Vec<AppointmentResponseDto> = scheduler
        .list_mine(user.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(ApiResponse::success(Some(appointments), None, None)))
}

/// Free start times for a service on a date
#[utoipa::path(
    get,
    path = "/api/appointments/available",
    params(
        ("serviceId" = i64, Query, description = "Service id"),
        ("categoryId" = Option<i64>, Query, description = "Category id; first matching category wins when omitted"),
        ("date" = String, Query, description = "Calendar day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Bookable start times, ascending", body = ApiResponse<AvailableSlotsDto>),
        (status = 400, description = "Missing serviceId or date"),
        (status = 404, description = "Service not found")
    ),
    tag = "appointments"
)]
pub async fn available_slots(
    State(scheduler): State<Arc<SchedulingService>>,
    _user: AuthenticatedUser,
    Query(query): Query<AvailableSlotsQuery>,
) -> Result<Json<ApiResponse<AvailableSlotsDto>>> {
    let (Some(service_id), Some(date)) = (query.service_id, query.date) else {
        return Err(AppError::MissingFields(
            "serviceId and date are required".to_string(),
        ));
    };
    let slots = scheduler
        .available_slots(service_id, query.category_id, date)
        .await?;
    Ok(Json(ApiResponse::success(
        Some(AvailableSlotsDto {
            available_slots: slots,
        }),
        None,
        None,
    )))
}

/// Book an appointment
#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = CreateAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked", body = ApiResponse<AppointmentResponseDto>),
        (status = 400, description = "Invalid time, past date, out of hours or misaligned slot"),
        (status = 404, description = "Service not found"),
        (status = 409, description = "Slot already booked")
    ),
    tag = "appointments"
)]
pub async fn create_appointment(
    State(scheduler): State<Arc<SchedulingService>>,
    user: AuthenticatedUser,
    AppJson(request): AppJson<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AppointmentResponseDto>>)> {
    let appointment = scheduler.create(&user, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(appointment.into()), None, None)),
    ))
}

/// Change an appointment
///
/// Admins edit directly; owners file a pending edit request.
#[utoipa::path(
    put,
    path = "/api/appointments/{id}",
    params(("id" = i64, Path, description = "Appointment id")),
    request_body = UpdateAppointmentRequest,
    responses(
        (status = 200, description = "Updated appointment, or the appointment with the pending request attached", body = ApiResponse<AppointmentResponseDto>),
        (status = 403, description = "Not the owner, past appointment, or owner changing service"),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Slot already booked or a request is already pending")
    ),
    tag = "appointments"
)]
pub async fn update_appointment(
    State(scheduler): State<Arc<SchedulingService>>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    AppJson(request): AppJson<UpdateAppointmentRequest>,
) -> Result<Json<ApiResponse<AppointmentResponseDto>>> {
    let appointment = scheduler.update(id, &user, request).await?;
    Ok(Json(ApiResponse::success(Some(appointment.into()), None, None)))
}

/// Approve a pending edit request (admin)
#[utoipa::path(
    put,
    path = "/api/appointments/{id}/approve-edit",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Requested change applied", body = ApiResponse<AppointmentResponseDto>),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "No pending request, or the requested slot was booked meanwhile")
    ),
    tag = "appointments"
)]
pub async fn approve_edit(
    State(scheduler): State<Arc<SchedulingService>>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<AppointmentResponseDto>>> {
    let appointment = scheduler.approve_edit(id).await?;
    Ok(Json(ApiResponse::success(Some(appointment.into()), None, None)))
}

/// Reject a pending edit request (admin)
#[utoipa::path(
    put,
    path = "/api/appointments/{id}/reject-edit",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Request rejected, live slot unchanged", body = ApiResponse<AppointmentResponseDto>),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "No pending request")
    ),
    tag = "appointments"
)]
pub async fn reject_edit(
    State(scheduler): State<Arc<SchedulingService>>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<AppointmentResponseDto>>> {
    let appointment = scheduler.reject_edit(id).await?;
    Ok(Json(ApiResponse::success(Some(appointment.into()), None, None)))
}

/// Cancel an appointment
#[utoipa::path(
    delete,
    path = "/api/appointments/{id}",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 204, description = "Appointment removed"),
        (status = 403, description = "Not the owner, past appointment, or less than 24 hours before start"),
        (status = 404, description = "Appointment not found")
    ),
    tag = "appointments"
)]
pub async fn delete_appointment(
    State(scheduler): State<Arc<SchedulingService>>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    scheduler.delete(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
