use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    AppointmentCriteria, BookAppointmentRequest, BookingError, RescheduleAppointmentRequest,
    UpdateCommentRequest, UpdateStatusRequest,
};
use crate::services::booking::BookingService;

fn map_booking_error(err: BookingError) -> AppError {
    match err {
        BookingError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        BookingError::DoctorNotFound => AppError::NotFound("Doctor not found".to_string()),
        BookingError::SlotTaken => {
            AppError::Conflict("Appointment slot no longer available".to_string())
        }
        BookingError::SlotNotPublished => {
            AppError::BadRequest("Doctor does not offer this slot".to_string())
        }
        BookingError::AlreadyCancelled => {
            AppError::BadRequest("Appointment is already cancelled".to_string())
        }
        BookingError::AppointmentInPast => {
            AppError::BadRequest("Appointment is already in the past".to_string())
        }
        BookingError::UnknownAppointmentType(name) => {
            AppError::BadRequest(format!("Unknown appointment type: {}", name))
        }
        BookingError::ReferralRequired(name) => {
            AppError::BadRequest(format!("A referral document is required for {}", name))
        }
        BookingError::InvalidStatusTransition { from, to } => {
            AppError::BadRequest(format!("Status cannot change from {} to {}", from, to))
        }
        BookingError::Unauthorized => {
            AppError::Auth("Not authorized to modify this appointment".to_string())
        }
        BookingError::Validation(msg) => AppError::ValidationError(msg),
        BookingError::Database(msg) => AppError::ExternalService(msg),
    }
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
    Query(criteria): Query<AppointmentCriteria>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let (upcoming, past) = service
        .list_appointments(&user, &criteria, auth.token())
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "upcoming": upcoming,
        "past": past
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointment = service
        .get_appointment(appointment_id, auth.token())
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({ "appointment": appointment })))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointment = service
        .book_appointment(&user, request, auth.token())
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment booked successfully"
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointment = service
        .cancel_appointment(&user, appointment_id, auth.token())
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment cancelled"
    })))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointment = service
        .reschedule_appointment(&user, appointment_id, request, auth.token())
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment rescheduled"
    })))
}

#[axum::debug_handler]
pub async fn update_status(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointment = service
        .update_status(&user, appointment_id, request.status, auth.token())
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn update_comment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateCommentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointment = service
        .update_comment(&user, appointment_id, request.comments, auth.token())
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn get_catalog() -> Json<Value> {
    let entries: Vec<Value> = crate::catalog::CATALOG
        .iter()
        .map(|def| {
            json!({
                "name": def.name,
                "specialization": def.specialization,
                "price": def.price,
                "duration_minutes": def.duration_minutes,
                "referral_required": def.referral_required,
                "instructions": def.instructions
            })
        })
        .collect();

    Json(json!({ "appointment_types": entries }))
}
