use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::HeaderMap,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::{TokenResponse, User};
use shared_models::error::AppError;
use shared_utils::jwt::validate_token;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let auth_header = headers
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    auth_value
        .strip_prefix("Bearer ")
        .map(str::to_string)
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))
}

/// Validate the presented token and echo the session identity.
#[axum::debug_handler]
pub async fn validate_session(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating session token");

    let token = extract_bearer_token(&headers)?;
    let user = validate_token(&token, &config.supabase_jwt_secret).map_err(AppError::Auth)?;

    Ok(Json(TokenResponse {
        valid: true,
        user_id: user.id,
        email: user.email,
        role: user.role,
    }))
}

/// Current user's auth record plus their application profile row.
#[axum::debug_handler]
pub async fn get_profile(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    debug!("Getting profile for user: {}", user.id);

    let client = SupabaseClient::new(&config);

    let auth_profile: Value = client
        .request(Method::GET, "/auth/v1/user", Some(auth.token()), None)
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    let path = format!("/rest/v1/profiles?id=eq.{}", user.id);
    let rows: Vec<Value> = client
        .request(Method::GET, &path, Some(auth.token()), None)
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(json!({
        "user_id": user.id,
        "auth_profile": auth_profile,
        "profile": rows.into_iter().next()
    })))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Updating profile for user: {}", user.id);

    let mut update_data = serde_json::Map::new();
    if let Some(full_name) = request.full_name {
        update_data.insert("full_name".to_string(), json!(full_name));
    }
    if let Some(phone) = request.phone {
        update_data.insert("phone".to_string(), json!(phone));
    }
    if let Some(city) = request.city {
        update_data.insert("city".to_string(), json!(city));
    }

    if update_data.is_empty() {
        return Err(AppError::BadRequest("No profile fields to update".to_string()));
    }

    let client = SupabaseClient::new(&config);
    let path = format!("/rest/v1/profiles?id=eq.{}", user.id);

    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        "Prefer",
        reqwest::header::HeaderValue::from_static("return=representation"),
    );

    let rows: Vec<Value> = client
        .request_with_headers(
            Method::PATCH,
            &path,
            Some(auth.token()),
            Some(Value::Object(update_data)),
            Some(headers),
        )
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    let profile = rows
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "profile": profile
    })))
}

/// Revoke the current session on the auth backend.
#[axum::debug_handler]
pub async fn sign_out(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    debug!("Signing out user: {}", user.id);

    let client = SupabaseClient::new(&config);
    let _: Value = client
        .request(Method::POST, "/auth/v1/logout", Some(auth.token()), None)
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(json!({ "success": true })))
}
