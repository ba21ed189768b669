use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::catalog::dtos::{
    CreateCategoryRequest, CreateServiceRequest, SearchServicesQuery, UpdateCategoryRequest,
    UpdateServiceRequest,
};
use crate::features::catalog::models::{Category, Service};
use crate::features::catalog::services::CatalogService;
use crate::shared::types::ApiResponse;

/// List all categories with their services
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "List of categories", body = ApiResponse<Vec<Category>>),
    ),
    tag = "catalog"
)]
pub async fn list_categories(
    State(service): State<Arc<CatalogService>>,
    _user: AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<Category>>>> {
    let categories = service.list();
    Ok(Json(ApiResponse::success(Some(categories), None, None)))
}

/// List services of one category
#[utoipa::path(
    get,
    path = "/api/categories/{id}/services",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Services in the category", body = ApiResponse<Vec<Service>>),
        (status = 404, description = "Category not found")
    ),
    tag = "catalog"
)]
pub async fn list_services(
    State(service): State<Arc<CatalogService>>,
    _user: AuthenticatedUser,
    Path(category_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<Service>>>> {
    let services = service.services_of(category_id)?;
    Ok(Json(ApiResponse::success(Some(services), None, None)))
}

/// Search services of a category by name substring
#[utoipa::path(
    get,
    path = "/api/categories/{id}/services/search",
    params(
        ("id" = i64, Path, description = "Category id"),
        ("q" = String, Query, description = "Case-insensitive name fragment")
    ),
    responses(
        (status = 200, description = "Matching services", body = ApiResponse<Vec<Service>>),
        (status = 400, description = "Missing query"),
        (status = 404, description = "Category not found")
    ),
    tag = "catalog"
)]
pub async fn search_services(
    State(service): State<Arc<CatalogService>>,
    _user: AuthenticatedUser,
    Path(category_id): Path<i64>,
    Query(query): Query<SearchServicesQuery>,
) -> Result<Json<ApiResponse<Vec<Service>>>> {
    let q = query
        .q
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::MissingFields("query parameter 'q' is required".to_string()))?;
    let services = service.search_services(category_id, &q)?;
    Ok(Json(ApiResponse::success(Some(services), None, None)))
}

/// Create a category (admin)
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<Category>),
        (status = 403, description = "Admin access required")
    ),
    tag = "catalog"
)]
pub async fn create_category(
    State(service): State<Arc<CatalogService>>,
    RequireAdmin(_admin): RequireAdmin,
    AppJson(request): AppJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let category = service.create_category(&request.name);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(category), None, None)),
    ))
}

/// Rename a category (admin)
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<Category>),
        (status = 404, description = "Category not found")
    ),
    tag = "catalog"
)]
pub async fn update_category(
    State(service): State<Arc<CatalogService>>,
    RequireAdmin(_admin): RequireAdmin,
    Path(category_id): Path<i64>,
    AppJson(request): AppJson<UpdateCategoryRequest>,
) -> Result<Json<ApiResponse<Category>>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let category = service.update_category(category_id, request)?;
    Ok(Json(ApiResponse::success(Some(category), None, None)))
}

/// Delete a category (admin); blocked while it owns services
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category still owns services")
    ),
    tag = "catalog"
)]
pub async fn delete_category(
    State(service): State<Arc<CatalogService>>,
    RequireAdmin(_admin): RequireAdmin,
    Path(category_id): Path<i64>,
) -> Result<StatusCode> {
    service.delete_category(category_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a service to a category (admin)
#[utoipa::path(
    post,
    path = "/api/categories/{id}/services",
    params(("id" = i64, Path, description = "Category id")),
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Service created", body = ApiResponse<Service>),
        (status = 404, description = "Category not found")
    ),
    tag = "catalog"
)]
pub async fn create_service(
    State(service): State<Arc<CatalogService>>,
    RequireAdmin(_admin): RequireAdmin,
    Path(category_id): Path<i64>,
    AppJson(request): AppJson<CreateServiceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Service>>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let created = service.create_service(category_id, request)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(created), None, None)),
    ))
}

/// Update a service (admin)
#[utoipa::path(
    put,
    path = "/api/categories/{id}/services/{serviceId}",
    params(
        ("id" = i64, Path, description = "Category id"),
        ("serviceId" = i64, Path, description = "Service id")
    ),
    request_body = UpdateServiceRequest,
    responses(
        (status = 200, description = "Service updated", body = ApiResponse<Service>),
        (status = 404, description = "Category or service not found")
    ),
    tag = "catalog"
)]
pub async fn update_service(
    State(service): State<Arc<CatalogService>>,
    RequireAdmin(_admin): RequireAdmin,
    Path((category_id, service_id)): Path<(i64, i64)>,
    AppJson(request): AppJson<UpdateServiceRequest>,
) -> Result<Json<ApiResponse<Service>>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let updated = service.update_service(category_id, service_id, request)?;
    Ok(Json(ApiResponse::success(Some(updated), None, None)))
}

/// Remove a service from a category (admin)
#[utoipa::path(
    delete,
    path = "/api/categories/{id}/services/{serviceId}",
    params(
        ("id" = i64, Path, description = "Category id"),
        ("serviceId" = i64, Path, description = "Service id")
    ),
    responses(
        (status = 204, description = "Service deleted"),
        (status = 404, description = "Category or service not found")
    ),
    tag = "catalog"
)]
pub async fn delete_service(
    State(service): State<Arc<CatalogService>>,
    RequireAdmin(_admin): RequireAdmin,
    Path((category_id, service_id)): Path<(i64, i64)>,
) -> Result<StatusCode> {
    service.delete_service(category_id, service_id)?;
    Ok(StatusCode::NO_CONTENT)
}
