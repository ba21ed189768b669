use utoipa::{Modify, OpenApi};

use crate::features::appointments::{dtos as appointments_dtos, handlers as appointments_handlers};
use crate::features::appointments::models as appointments_models;
use crate::features::catalog::{
    dtos as catalog_dtos, handlers as catalog_handlers, models as catalog_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Catalog
        catalog_handlers::list_categories,
        catalog_handlers::create_category,
        catalog_handlers::update_category,
        catalog_handlers::delete_category,
        catalog_handlers::list_services,
        catalog_handlers::search_services,
        catalog_handlers::create_service,
        catalog_handlers::update_service,
        catalog_handlers::delete_service,
        // Appointments
        appointments_handlers::list_appointments,
        appointments_handlers::my_appointments,
        appointments_handlers::available_slots,
        appointments_handlers::create_appointment,
        appointments_handlers::update_appointment,
        appointments_handlers::approve_edit,
        appointments_handlers::reject_edit,
        appointments_handlers::delete_appointment,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Catalog
            catalog_models::Category,
            catalog_models::Service,
            catalog_dtos::CreateCategoryRequest,
            catalog_dtos::UpdateCategoryRequest,
            catalog_dtos::CreateServiceRequest,
            catalog_dtos::UpdateServiceRequest,
            ApiResponse<Vec<catalog_models::Category>>,
            ApiResponse<catalog_models::Category>,
            ApiResponse<Vec<catalog_models::Service>>,
            ApiResponse<catalog_models::Service>,
            // Appointments
            appointments_models::AppointmentStatus,
            appointments_models::EditRequestStatus,
            appointments_dtos::CreateAppointmentRequest,
            appointments_dtos::UpdateAppointmentRequest,
            appointments_dtos::AppointmentResponseDto,
            appointments_dtos::AvailableSlotsDto,
            ApiResponse<Vec<appointments_dtos::AppointmentResponseDto>>,
            ApiResponse<appointments_dtos::AppointmentResponseDto>,
            ApiResponse<appointments_dtos::AvailableSlotsDto>,
        )
    ),
    tags(
        (name = "catalog", description = "Service categories and services"),
        (name = "appointments", description = "Booking, availability and the edit-request workflow"),
    ),
    info(
        title = "Visit Booker API",
        version = "0.1.0",
        description = "API documentation for the appointment booking service",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
