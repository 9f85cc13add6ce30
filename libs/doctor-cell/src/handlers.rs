use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    AvailableDoctorsQuery, BookableStartsQuery, DoctorSearchQuery, SpecializationAvailabilityQuery,
};
use crate::services::availability::AvailabilityService;
use crate::services::directory::DoctorDirectoryService;

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let directory = DoctorDirectoryService::new(&state);

    let doctor = directory
        .get_doctor(doctor_id, auth.token())
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Doctor not found".to_string()))?;

    Ok(Json(json!({ "doctor": doctor })))
}

#[axum::debug_handler]
pub async fn search_doctors(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<DoctorSearchQuery>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let directory = DoctorDirectoryService::new(&state);

    let doctors = directory
        .search_doctors(
            query.specialization.as_deref(),
            query.city.as_deref(),
            auth.token(),
        )
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    let total = doctors.len();
    Ok(Json(json!({
        "doctors": doctors,
        "total": total
    })))
}

#[axum::debug_handler]
pub async fn list_cities(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let directory = DoctorDirectoryService::new(&state);

    let cities = directory
        .list_cities(auth.token())
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(json!({ "cities": cities })))
}

#[axum::debug_handler]
pub async fn get_doctor_availability(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let availability = AvailabilityService::new(&state);

    let records = availability
        .get_doctor_availability(doctor_id, auth.token())
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(json!({ "availability": records })))
}

/// Availability records for a whole specialization, optionally narrowed to
/// a city, together with the doctors they belong to.
#[axum::debug_handler]
pub async fn get_specialization_availability(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<SpecializationAvailabilityQuery>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let availability = AvailabilityService::new(&state);

    let (doctors, records) = availability
        .get_availability_by_specialization(
            &query.specialization,
            query.city.as_deref(),
            auth.token(),
        )
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(json!({
        "doctors": doctors,
        "availability": records
    })))
}

#[axum::debug_handler]
pub async fn get_bookable_starts(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<BookableStartsQuery>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let availability = AvailabilityService::new(&state);

    let starts = availability
        .bookable_starts_for(doctor_id, query.date, query.duration_minutes, auth.token())
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(json!({
        "date": query.date,
        "bookable_starts": starts
    })))
}

#[axum::debug_handler]
pub async fn find_available_doctors(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<AvailableDoctorsQuery>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let availability = AvailabilityService::new(&state);

    let doctors = availability
        .doctors_free_at(
            query.date,
            query.time,
            query.specialization.as_deref(),
            query.city.as_deref(),
            auth.token(),
        )
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    let total = doctors.len();
    Ok(Json(json!({
        "doctors": doctors,
        "total": total
    })))
}
