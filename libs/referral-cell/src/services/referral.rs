use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::User;

use crate::models::{Referral, ReferralError};

pub struct ReferralService {
    supabase: SupabaseClient,
    bucket: String,
}

impl ReferralService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            bucket: config.referral_bucket.clone(),
        }
    }

    /// Upload a referral document and create its record. `on_progress`
    /// receives the fractional upload progress in [0, 1].
    pub async fn upload_referral<F>(
        &self,
        user: &User,
        file_base64: &str,
        file_type: &str,
        auth_token: &str,
        on_progress: F,
    ) -> Result<Referral, ReferralError>
    where
        F: FnMut(f32) + Send + 'static,
    {
        let patient_id = parse_user_id(user)?;
        let file_data = decode_base64_payload(file_base64)?;
        debug!(
            "Uploading referral for patient {} ({} bytes)",
            patient_id,
            file_data.len()
        );

        let object_path = object_path_for(patient_id, file_type);
        self.supabase
            .upload_object(
                &self.bucket,
                &object_path,
                file_data,
                file_type,
                auth_token,
                false,
                on_progress,
            )
            .await?;

        let file_url = self.supabase.public_object_url(&self.bucket, &object_path);

        let referral_data = json!({
            "patient_id": patient_id,
            "file_url": file_url,
            "file_type": file_type,
            "uploaded_at": Utc::now().to_rfc3339()
        });

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/referrals",
                Some(auth_token),
                Some(referral_data),
                Some(representation_headers()),
            )
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| ReferralError::Database("Failed to create referral record".to_string()))?;
        Ok(serde_json::from_value(row)?)
    }

    pub async fn get_referral(
        &self,
        referral_id: Uuid,
        auth_token: &str,
    ) -> Result<Option<Referral>, ReferralError> {
        let path = format!("/rest/v1/referrals?id=eq.{}", referral_id);
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    /// Replace the file behind an existing referral. The record keeps its
    /// id; only the object and file metadata change.
    pub async fn replace_file<F>(
        &self,
        user: &User,
        referral_id: Uuid,
        file_base64: &str,
        file_type: &str,
        auth_token: &str,
        on_progress: F,
    ) -> Result<Referral, ReferralError>
    where
        F: FnMut(f32) + Send + 'static,
    {
        let existing = self
            .get_referral(referral_id, auth_token)
            .await?
            .ok_or(ReferralError::NotFound)?;

        if existing.patient_id.to_string() != user.id {
            return Err(ReferralError::Unauthorized);
        }

        let file_data = decode_base64_payload(file_base64)?;
        debug!(
            "Replacing referral {} file ({} bytes)",
            referral_id,
            file_data.len()
        );

        let object_path = object_path_for(existing.patient_id, file_type);
        self.supabase
            .upload_object(
                &self.bucket,
                &object_path,
                file_data,
                file_type,
                auth_token,
                true,
                on_progress,
            )
            .await?;

        let file_url = self.supabase.public_object_url(&self.bucket, &object_path);

        let path = format!("/rest/v1/referrals?id=eq.{}", referral_id);
        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(json!({
                    "file_url": file_url,
                    "file_type": file_type,
                    "uploaded_at": Utc::now().to_rfc3339()
                })),
                Some(representation_headers()),
            )
            .await?;

        let row = rows.into_iter().next().ok_or(ReferralError::NotFound)?;
        Ok(serde_json::from_value(row)?)
    }
}

fn representation_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}

fn parse_user_id(user: &User) -> Result<Uuid, ReferralError> {
    Uuid::parse_str(&user.id).map_err(|_| ReferralError::Validation("Invalid user id".to_string()))
}

fn object_path_for(patient_id: Uuid, file_type: &str) -> String {
    let extension = file_type.rsplit('/').next().unwrap_or("bin");
    format!("{}/{}.{}", patient_id, Uuid::new_v4(), extension)
}

fn decode_base64_payload(payload: &str) -> Result<Vec<u8>, ReferralError> {
    // Accept both a bare base64 string and a data URL.
    let data = match payload.split_once(";base64,") {
        Some((_, encoded)) => encoded,
        None => payload,
    };
    BASE64
        .decode(data)
        .map_err(|e| ReferralError::Validation(format!("Failed to decode base64 data: {}", e)))
}
