use std::collections::BTreeSet;

use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::User;

use crate::models::{
    DailyPeriodData, MonthQuery, PeriodTrackerSettings, SaveDayRequest, SaveSettingsRequest,
    TrackerError, MAX_CYCLE_LENGTH, MAX_PERIOD_LENGTH, MIN_CYCLE_LENGTH, MIN_PERIOD_LENGTH,
};
use crate::services::prediction;

pub struct TrackerService {
    supabase: SupabaseClient,
}

impl TrackerService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get_settings(
        &self,
        user: &User,
        auth_token: &str,
    ) -> Result<Option<PeriodTrackerSettings>, TrackerError> {
        let path = format!("/rest/v1/period_tracker_settings?user_id=eq.{}", user.id);
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    pub async fn save_settings(
        &self,
        user: &User,
        request: SaveSettingsRequest,
        auth_token: &str,
    ) -> Result<PeriodTrackerSettings, TrackerError> {
        if !(MIN_PERIOD_LENGTH..=MAX_PERIOD_LENGTH).contains(&request.average_period_length) {
            return Err(TrackerError::Validation(format!(
                "Average period length must be between {} and {} days",
                MIN_PERIOD_LENGTH, MAX_PERIOD_LENGTH
            )));
        }
        if !(MIN_CYCLE_LENGTH..=MAX_CYCLE_LENGTH).contains(&request.average_cycle_length) {
            return Err(TrackerError::Validation(format!(
                "Average cycle length must be between {} and {} days",
                MIN_CYCLE_LENGTH, MAX_CYCLE_LENGTH
            )));
        }

        let user_id = parse_user_id(user)?;
        debug!("Saving tracker settings for user: {}", user_id);

        let settings_data = json!({
            "user_id": user_id,
            "average_period_length": request.average_period_length,
            "average_cycle_length": request.average_cycle_length,
            "last_period_start": request.last_period_start
        });

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/period_tracker_settings?on_conflict=user_id",
                Some(auth_token),
                Some(settings_data),
                Some(upsert_headers()),
            )
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| TrackerError::Database("Failed to save settings".to_string()))?;
        Ok(serde_json::from_value(row)?)
    }

    /// All recorded days inside one calendar month.
    pub async fn month_days(
        &self,
        user: &User,
        query: &MonthQuery,
        auth_token: &str,
    ) -> Result<Vec<DailyPeriodData>, TrackerError> {
        let (first, last) = month_bounds(query.year, query.month)?;

        let path = format!(
            "/rest/v1/period_days?user_id=eq.{}&date=gte.{}&date=lte.{}&order=date.asc",
            user.id, first, last
        );
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let days: Vec<DailyPeriodData> = rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<DailyPeriodData>, _>>()?;

        Ok(days)
    }

    pub async fn save_day(
        &self,
        user: &User,
        request: SaveDayRequest,
        auth_token: &str,
    ) -> Result<DailyPeriodData, TrackerError> {
        let user_id = parse_user_id(user)?;
        debug!("Saving tracker day {} for user: {}", request.date, user_id);

        let day_data = json!({
            "user_id": user_id,
            "date": request.date,
            "is_period_day": request.is_period_day,
            "notes": request.notes,
            "mood": request.mood,
            "flow": request.flow,
            "symptoms": request.symptoms
        });

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/period_days?on_conflict=user_id,date",
                Some(auth_token),
                Some(day_data),
                Some(upsert_headers()),
            )
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| TrackerError::Database("Failed to save day".to_string()))?;
        Ok(serde_json::from_value(row)?)
    }

    /// Predicted period starts and ovulation days for the saved settings.
    pub async fn predictions(
        &self,
        user: &User,
        auth_token: &str,
    ) -> Result<(BTreeSet<NaiveDate>, BTreeSet<NaiveDate>), TrackerError> {
        let settings = self
            .get_settings(user, auth_token)
            .await?
            .ok_or(TrackerError::SettingsNotFound)?;

        let starts = prediction::predict_period_starts(
            settings.last_period_start,
            settings.average_cycle_length,
        )?;
        let ovulations = prediction::predict_ovulation_days(
            settings.last_period_start,
            settings.average_cycle_length,
        )?;

        Ok((starts, ovulations))
    }
}

fn parse_user_id(user: &User) -> Result<Uuid, TrackerError> {
    Uuid::parse_str(&user.id).map_err(|_| TrackerError::Validation("Invalid user id".to_string()))
}

fn upsert_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "Prefer",
        HeaderValue::from_static("resolution=merge-duplicates,return=representation"),
    );
    headers
}

fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), TrackerError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| TrackerError::Validation("Invalid year/month".to_string()))?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| TrackerError::Validation("Invalid year/month".to_string()))?;
    let last = next_first.pred_opt().unwrap_or(first);

    Ok((first, last))
}
