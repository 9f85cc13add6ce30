use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_database::supabase::SupabaseError;

/// An uploaded referral document backing a booking that requires one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referral {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub file_url: String,
    pub file_type: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReferralRequest {
    /// Raw file content, base64-encoded; data-URL prefixes are accepted.
    pub file_base64: String,
    pub file_type: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ReferralError {
    #[error("Referral not found")]
    NotFound,

    #[error("Not authorized to modify this referral")]
    Unauthorized,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<SupabaseError> for ReferralError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::NotFound(_) => ReferralError::NotFound,
            other => ReferralError::Database(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ReferralError {
    fn from(err: serde_json::Error) -> Self {
        ReferralError::Database(err.to_string())
    }
}
