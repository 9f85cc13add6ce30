use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub full_name: String,
    pub specialization: String,
    pub city: String,
    pub address: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub bio: Option<String>,
}

/// Published schedule for one doctor on one date. `open_starts` holds the
/// start times the doctor still offers; booked times are removed by the
/// doctor-side scheduling tools, not by this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorAvailability {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub open_starts: Vec<NaiveTime>,
}

#[derive(Debug, Deserialize)]
pub struct DoctorSearchQuery {
    pub specialization: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BookableStartsQuery {
    pub date: NaiveDate,
    pub duration_minutes: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SpecializationAvailabilityQuery {
    pub specialization: String,
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvailableDoctorsQuery {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub specialization: Option<String>,
    pub city: Option<String>,
}
