use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{ReferralError, UploadReferralRequest};
use crate::services::referral::ReferralService;

fn map_referral_error(err: ReferralError) -> AppError {
    match err {
        ReferralError::NotFound => AppError::NotFound("Referral not found".to_string()),
        ReferralError::Unauthorized => {
            AppError::Auth("Not authorized to modify this referral".to_string())
        }
        ReferralError::Validation(msg) => AppError::ValidationError(msg),
        ReferralError::Database(msg) => AppError::ExternalService(msg),
    }
}

// Upload progress has no client-facing channel here; it is traced so the
// fraction is observable in logs.
fn trace_progress(fraction: f32) {
    debug!("Referral upload progress: {:.0}%", fraction * 100.0);
}

#[axum::debug_handler]
pub async fn upload_referral(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UploadReferralRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ReferralService::new(&state);

    let referral = service
        .upload_referral(
            &user,
            &request.file_base64,
            &request.file_type,
            auth.token(),
            trace_progress,
        )
        .await
        .map_err(map_referral_error)?;

    Ok(Json(json!({
        "success": true,
        "referral": referral
    })))
}

#[axum::debug_handler]
pub async fn get_referral(
    State(state): State<Arc<AppConfig>>,
    Path(referral_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = ReferralService::new(&state);

    let referral = service
        .get_referral(referral_id, auth.token())
        .await
        .map_err(map_referral_error)?
        .ok_or_else(|| AppError::NotFound("Referral not found".to_string()))?;

    Ok(Json(json!({ "referral": referral })))
}

#[axum::debug_handler]
pub async fn replace_referral_file(
    State(state): State<Arc<AppConfig>>,
    Path(referral_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UploadReferralRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ReferralService::new(&state);

    let referral = service
        .replace_file(
            &user,
            referral_id,
            &request.file_base64,
            &request.file_type,
            auth.token(),
            trace_progress,
        )
        .await
        .map_err(map_referral_error)?;

    Ok(Json(json!({
        "success": true,
        "referral": referral
    })))
}
