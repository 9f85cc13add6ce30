use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{MonthQuery, SaveDayRequest, SaveSettingsRequest, TrackerError};
use crate::services::tracker::TrackerService;

fn map_tracker_error(err: TrackerError) -> AppError {
    match err {
        TrackerError::SettingsNotFound => {
            AppError::NotFound("Tracker settings not found".to_string())
        }
        TrackerError::Validation(msg) => AppError::ValidationError(msg),
        TrackerError::Database(msg) => AppError::ExternalService(msg),
    }
}

#[axum::debug_handler]
pub async fn get_settings(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = TrackerService::new(&state);

    let settings = service
        .get_settings(&user, auth.token())
        .await
        .map_err(map_tracker_error)?;

    Ok(Json(json!({ "settings": settings })))
}

#[axum::debug_handler]
pub async fn save_settings(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<SaveSettingsRequest>,
) -> Result<Json<Value>, AppError> {
    let service = TrackerService::new(&state);

    let settings = service
        .save_settings(&user, request, auth.token())
        .await
        .map_err(map_tracker_error)?;

    Ok(Json(json!({
        "success": true,
        "settings": settings
    })))
}

#[axum::debug_handler]
pub async fn get_month_days(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<MonthQuery>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = TrackerService::new(&state);

    let days = service
        .month_days(&user, &query, auth.token())
        .await
        .map_err(map_tracker_error)?;

    Ok(Json(json!({
        "year": query.year,
        "month": query.month,
        "days": days
    })))
}

#[axum::debug_handler]
pub async fn save_day(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<SaveDayRequest>,
) -> Result<Json<Value>, AppError> {
    let service = TrackerService::new(&state);

    let day = service
        .save_day(&user, request, auth.token())
        .await
        .map_err(map_tracker_error)?;

    Ok(Json(json!({
        "success": true,
        "day": day
    })))
}

#[axum::debug_handler]
pub async fn get_predictions(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = TrackerService::new(&state);

    let (period_starts, ovulation_days) = service
        .predictions(&user, auth.token())
        .await
        .map_err(map_tracker_error)?;

    Ok(Json(json!({
        "period_starts": period_starts,
        "ovulation_days": ovulation_days
    })))
}
