use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_database::supabase::SupabaseError;

use crate::services::prediction::PredictionError;

/// Per-user tracker configuration. One row per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodTrackerSettings {
    pub user_id: Uuid,
    pub average_period_length: i32,
    pub average_cycle_length: i32,
    pub last_period_start: NaiveDate,
}

pub const MIN_PERIOD_LENGTH: i32 = 1;
pub const MAX_PERIOD_LENGTH: i32 = 14;
pub const MIN_CYCLE_LENGTH: i32 = 21;
pub const MAX_CYCLE_LENGTH: i32 = 45;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSettingsRequest {
    pub average_period_length: i32,
    pub average_cycle_length: i32,
    pub last_period_start: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlowIntensity {
    Light,
    Medium,
    Heavy,
}

/// One calendar day of user-entered tracking data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPeriodData {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub is_period_day: bool,
    pub notes: Option<String>,
    pub mood: Option<String>,
    pub flow: Option<FlowIntensity>,
    #[serde(default)]
    pub symptoms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveDayRequest {
    pub date: NaiveDate,
    pub is_period_day: bool,
    pub notes: Option<String>,
    pub mood: Option<String>,
    pub flow: Option<FlowIntensity>,
    #[serde(default)]
    pub symptoms: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Tracker settings not found")]
    SettingsNotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<SupabaseError> for TrackerError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::NotFound(_) => TrackerError::SettingsNotFound,
            other => TrackerError::Database(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Database(err.to_string())
    }
}

impl From<PredictionError> for TrackerError {
    fn from(err: PredictionError) -> Self {
        TrackerError::Validation(err.to_string())
    }
}
