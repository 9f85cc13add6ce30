use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_database::supabase::SupabaseError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub appointment_type: String,
    pub status: AppointmentStatus,
    pub price: f64,
    pub address: String,
    pub doctor_name: String,
    pub patient_name: String,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// True when the appointment lies strictly after `now`. Same-date
    /// appointments compare on the time component.
    pub fn is_after(&self, now: NaiveDateTime) -> bool {
        self.date > now.date() || (self.date == now.date() && self.start_time > now.time())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub appointment_type: String,
    pub referral_id: Option<Uuid>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCommentRequest {
    pub comments: String,
}

/// Optional equality filters over an appointment list. Absent fields do not
/// constrain; supplied fields must all match exactly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentCriteria {
    pub specialization: Option<String>,
    pub doctor_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub appointment_type: Option<String>,
    pub patient_name: Option<String>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Appointment slot no longer available")]
    SlotTaken,

    #[error("Doctor does not offer this slot")]
    SlotNotPublished,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Appointment is already cancelled")]
    AlreadyCancelled,

    #[error("Appointment is already in the past")]
    AppointmentInPast,

    #[error("Unknown appointment type: {0}")]
    UnknownAppointmentType(String),

    #[error("A referral document is required for {0}")]
    ReferralRequired(String),

    #[error("Status cannot change from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Not authorized to modify this appointment")]
    Unauthorized,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<SupabaseError> for BookingError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::Conflict(_) => BookingError::SlotTaken,
            SupabaseError::NotFound(_) => BookingError::NotFound,
            other => BookingError::Database(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for BookingError {
    fn from(err: serde_json::Error) -> Self {
        BookingError::Database(err.to_string())
    }
}
