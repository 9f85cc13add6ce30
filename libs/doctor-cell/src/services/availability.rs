use anyhow::Result;
use chrono::{NaiveDate, NaiveTime, Utc};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Doctor, DoctorAvailability};
use crate::services::directory::DoctorDirectoryService;
use crate::services::slots;

pub struct AvailabilityService {
    supabase: SupabaseClient,
    directory: DoctorDirectoryService,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            directory: DoctorDirectoryService::new(config),
        }
    }

    /// All published availability records for one doctor.
    pub async fn get_doctor_availability(
        &self,
        doctor_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<DoctorAvailability>> {
        debug!("Fetching availability for doctor: {}", doctor_id);

        let path = format!(
            "/rest/v1/doctor_availability?doctor_id=eq.{}&order=date.asc",
            doctor_id
        );
        self.fetch_records(&path, auth_token).await
    }

    /// Availability records for every doctor in a specialization,
    /// optionally narrowed to a city.
    pub async fn get_availability_by_specialization(
        &self,
        specialization: &str,
        city: Option<&str>,
        auth_token: &str,
    ) -> Result<(Vec<Doctor>, Vec<DoctorAvailability>)> {
        let doctors = self
            .directory
            .search_doctors(Some(specialization), city, auth_token)
            .await?;

        if doctors.is_empty() {
            return Ok((doctors, vec![]));
        }

        let id_list = doctors
            .iter()
            .map(|doctor| doctor.id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let path = format!(
            "/rest/v1/doctor_availability?doctor_id=in.({})&order=date.asc",
            id_list
        );

        let records = self.fetch_records(&path, auth_token).await?;
        Ok((doctors, records))
    }

    /// Bookable start times for one doctor on one date.
    pub async fn bookable_starts_for(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        duration_minutes: Option<i64>,
        auth_token: &str,
    ) -> Result<Vec<NaiveTime>> {
        let path = format!(
            "/rest/v1/doctor_availability?doctor_id=eq.{}&date=eq.{}",
            doctor_id, date
        );
        let records = self.fetch_records(&path, auth_token).await?;

        let now = Utc::now().naive_utc();
        Ok(slots::bookable_starts(date, &records, now, duration_minutes))
    }

    /// Doctors with the exact (date, time) slot still open, roster-ordered.
    pub async fn doctors_free_at(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        specialization: Option<&str>,
        city: Option<&str>,
        auth_token: &str,
    ) -> Result<Vec<Doctor>> {
        let doctors = self
            .directory
            .search_doctors(specialization, city, auth_token)
            .await?;

        if doctors.is_empty() {
            return Ok(vec![]);
        }

        let id_list = doctors
            .iter()
            .map(|doctor| doctor.id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let path = format!(
            "/rest/v1/doctor_availability?doctor_id=in.({})&date=eq.{}",
            id_list, date
        );
        let records = self.fetch_records(&path, auth_token).await?;

        Ok(slots::doctors_available_at(date, time, &doctors, &records))
    }

    async fn fetch_records(
        &self,
        path: &str,
        auth_token: &str,
    ) -> Result<Vec<DoctorAvailability>> {
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, path, Some(auth_token), None)
            .await?;

        let records: Vec<DoctorAvailability> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<DoctorAvailability>, _>>()?;

        Ok(records)
    }
}
