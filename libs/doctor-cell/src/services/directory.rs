use anyhow::Result;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::Doctor;

pub struct DoctorDirectoryService {
    supabase: SupabaseClient,
}

impl DoctorDirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get_doctor(&self, doctor_id: Uuid, auth_token: &str) -> Result<Option<Doctor>> {
        debug!("Fetching doctor: {}", doctor_id);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        match result.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    /// Doctors matching a specialization, optionally narrowed to a city.
    pub async fn search_doctors(
        &self,
        specialization: Option<&str>,
        city: Option<&str>,
        auth_token: &str,
    ) -> Result<Vec<Doctor>> {
        let mut path = "/rest/v1/doctors?order=full_name.asc".to_string();
        if let Some(specialization) = specialization {
            path.push_str(&format!("&specialization=eq.{}", specialization));
        }
        if let Some(city) = city {
            path.push_str(&format!("&city=eq.{}", city));
        }
        debug!("Searching doctors: {}", path);

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let doctors: Vec<Doctor> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Doctor>, _>>()?;

        Ok(doctors)
    }

    /// Distinct cities that have at least one doctor listed.
    pub async fn list_cities(&self, auth_token: &str) -> Result<Vec<String>> {
        debug!("Listing cities with available doctors");

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, "/rest/v1/doctors?select=city", Some(auth_token), None)
            .await?;

        let mut cities: Vec<String> = result
            .into_iter()
            .filter_map(|row| row["city"].as_str().map(str::to_string))
            .collect();

        cities.sort();
        cities.dedup();
        Ok(cities)
    }
}
