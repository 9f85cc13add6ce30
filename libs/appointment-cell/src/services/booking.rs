use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::services::availability::AvailabilityService;
use doctor_cell::services::directory::DoctorDirectoryService;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::User;

use crate::catalog;
use crate::models::{
    Appointment, AppointmentCriteria, AppointmentStatus, BookAppointmentRequest, BookingError,
    RescheduleAppointmentRequest,
};
use crate::services::schedule::{filter_appointments, partition_appointments};

pub struct BookingService {
    supabase: SupabaseClient,
    directory: DoctorDirectoryService,
    availability: AvailabilityService,
}

/// Legal external status transitions. Cancellation has its own path with
/// its own guards, so the only transition accepted here is a doctor
/// confirming a pending appointment.
pub fn validate_status_transition(
    from: AppointmentStatus,
    to: AppointmentStatus,
) -> Result<(), BookingError> {
    match (from, to) {
        (AppointmentStatus::Pending, AppointmentStatus::Confirmed) => Ok(()),
        (from, to) => Err(BookingError::InvalidStatusTransition { from, to }),
    }
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            directory: DoctorDirectoryService::new(config),
            availability: AvailabilityService::new(config),
        }
    }

    /// Appointments for the caller's role, filtered then split into
    /// (upcoming, past).
    pub async fn list_appointments(
        &self,
        user: &User,
        criteria: &AppointmentCriteria,
        auth_token: &str,
    ) -> Result<(Vec<Appointment>, Vec<Appointment>), BookingError> {
        let column = if user.is_doctor() { "doctor_id" } else { "patient_id" };
        let path = format!(
            "/rest/v1/appointments?{}=eq.{}&order=date.asc,start_time.asc",
            column, user.id
        );
        debug!("Listing appointments: {}", path);

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let appointments: Vec<Appointment> = rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()?;

        let filtered = filter_appointments(&appointments, criteria);
        Ok(partition_appointments(filtered, Utc::now().naive_utc()))
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, BookingError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let row = rows.into_iter().next().ok_or(BookingError::NotFound)?;
        Ok(serde_json::from_value(row)?)
    }

    /// Book a slot for the calling patient.
    ///
    /// This is the single write path for slot claims: the slot must still be
    /// published, and the insert relies on the store's uniqueness of
    /// (doctor_id, date, start_time). A duplicate claim comes back as a
    /// conflict and surfaces as `SlotTaken`.
    pub async fn book_appointment(
        &self,
        user: &User,
        request: BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, BookingError> {
        info!(
            "Booking {} with doctor {} on {} {}",
            request.appointment_type, request.doctor_id, request.date, request.start_time
        );

        let def = catalog::find(&request.appointment_type).ok_or_else(|| {
            BookingError::UnknownAppointmentType(request.appointment_type.clone())
        })?;

        if def.referral_required && request.referral_id.is_none() {
            return Err(BookingError::ReferralRequired(def.name.to_string()));
        }

        let patient_id = Uuid::parse_str(&user.id)
            .map_err(|_| BookingError::Validation("Invalid user id".to_string()))?;

        let now = Utc::now().naive_utc();
        if request.date < now.date()
            || (request.date == now.date() && request.start_time <= now.time())
        {
            return Err(BookingError::Validation(
                "Appointment time is in the past".to_string(),
            ));
        }

        let doctor = self
            .directory
            .get_doctor(request.doctor_id, auth_token)
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?
            .ok_or(BookingError::DoctorNotFound)?;

        let starts = self
            .availability
            .bookable_starts_for(
                request.doctor_id,
                request.date,
                Some(def.duration_minutes),
                auth_token,
            )
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;

        if !starts.contains(&request.start_time) {
            return Err(BookingError::SlotNotPublished);
        }

        let patient_name = self.patient_display_name(user, auth_token).await;

        let appointment_data = json!({
            "patient_id": patient_id,
            "doctor_id": request.doctor_id,
            "date": request.date,
            "start_time": request.start_time.format("%H:%M:%S").to_string(),
            "appointment_type": def.name,
            "status": AppointmentStatus::Pending,
            "price": def.price,
            "address": doctor.address,
            "doctor_name": doctor.full_name,
            "patient_name": patient_name,
            "comments": request.comments,
            "referral_id": request.referral_id,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(auth_token),
                Some(appointment_data),
                Some(headers),
            )
            .await?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| BookingError::Database("Failed to create appointment".to_string()))?;
        let appointment: Appointment = serde_json::from_value(row)?;

        info!("Appointment {} booked", appointment.id);
        Ok(appointment)
    }

    /// Cancel an appointment. Rejected when it is already past or already
    /// cancelled.
    pub async fn cancel_appointment(
        &self,
        user: &User,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, BookingError> {
        let appointment = self.get_appointment(appointment_id, auth_token).await?;
        self.ensure_patient_owner(user, &appointment)?;

        if appointment.status == AppointmentStatus::Cancelled {
            return Err(BookingError::AlreadyCancelled);
        }
        if !appointment.is_after(Utc::now().naive_utc()) {
            return Err(BookingError::AppointmentInPast);
        }

        let update = json!({ "status": AppointmentStatus::Cancelled });
        let updated = self
            .patch_appointment(appointment_id, update, auth_token)
            .await?;

        info!("Appointment {} cancelled", appointment_id);
        Ok(updated)
    }

    /// Move an appointment to a new (date, time). Only the slot changes;
    /// status, pricing and participants stay as they are.
    pub async fn reschedule_appointment(
        &self,
        user: &User,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, BookingError> {
        let appointment = self.get_appointment(appointment_id, auth_token).await?;
        self.ensure_patient_owner(user, &appointment)?;

        if appointment.status == AppointmentStatus::Cancelled {
            return Err(BookingError::AlreadyCancelled);
        }
        let now = Utc::now().naive_utc();
        if !appointment.is_after(now) {
            return Err(BookingError::AppointmentInPast);
        }
        if request.date < now.date()
            || (request.date == now.date() && request.start_time <= now.time())
        {
            return Err(BookingError::Validation(
                "New appointment time is in the past".to_string(),
            ));
        }

        // Doctor record and availability are independent reads: fan out,
        // await together.
        let (doctor_result, starts_result) = tokio::join!(
            self.directory.get_doctor(appointment.doctor_id, auth_token),
            self.availability.bookable_starts_for(
                appointment.doctor_id,
                request.date,
                None,
                auth_token,
            ),
        );

        let doctor = doctor_result
            .map_err(|e| BookingError::Database(e.to_string()))?
            .ok_or(BookingError::DoctorNotFound)?;
        let starts = starts_result.map_err(|e| BookingError::Database(e.to_string()))?;

        if !starts.contains(&request.start_time) {
            return Err(BookingError::SlotNotPublished);
        }

        debug!(
            "Rescheduling appointment {} with {} to {} {}",
            appointment_id, doctor.full_name, request.date, request.start_time
        );

        let update = json!({
            "date": request.date,
            "start_time": request.start_time.format("%H:%M:%S").to_string()
        });
        let updated = self
            .patch_appointment(appointment_id, update, auth_token)
            .await?;

        info!("Appointment {} rescheduled", appointment_id);
        Ok(updated)
    }

    /// Doctor-side confirmation of a pending appointment.
    pub async fn update_status(
        &self,
        user: &User,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
        auth_token: &str,
    ) -> Result<Appointment, BookingError> {
        if !(user.is_doctor() || user.is_admin()) {
            return Err(BookingError::Unauthorized);
        }

        let appointment = self.get_appointment(appointment_id, auth_token).await?;
        validate_status_transition(appointment.status, new_status)?;

        let update = json!({ "status": new_status });
        self.patch_appointment(appointment_id, update, auth_token)
            .await
    }

    pub async fn update_comment(
        &self,
        user: &User,
        appointment_id: Uuid,
        comments: String,
        auth_token: &str,
    ) -> Result<Appointment, BookingError> {
        let appointment = self.get_appointment(appointment_id, auth_token).await?;

        let is_doctor_on_it = appointment.doctor_id.to_string() == user.id;
        if appointment.patient_id.to_string() != user.id && !is_doctor_on_it && !user.is_admin() {
            return Err(BookingError::Unauthorized);
        }

        let update = json!({ "comments": comments });
        self.patch_appointment(appointment_id, update, auth_token)
            .await
    }

    // Private helpers

    fn ensure_patient_owner(
        &self,
        user: &User,
        appointment: &Appointment,
    ) -> Result<(), BookingError> {
        if appointment.patient_id.to_string() == user.id || user.is_admin() {
            Ok(())
        } else {
            Err(BookingError::Unauthorized)
        }
    }

    async fn patch_appointment(
        &self,
        appointment_id: Uuid,
        update: Value,
        auth_token: &str,
    ) -> Result<Appointment, BookingError> {
        let mut update_data = match update {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(Value::Object(update_data)),
                Some(headers),
            )
            .await?;

        let row = result.into_iter().next().ok_or(BookingError::NotFound)?;
        Ok(serde_json::from_value(row)?)
    }

    async fn patient_display_name(&self, user: &User, auth_token: &str) -> String {
        let path = format!("/rest/v1/profiles?id=eq.{}&select=full_name", user.id);
        match self
            .supabase
            .request::<Vec<Value>>(Method::GET, &path, Some(auth_token), None)
            .await
        {
            Ok(rows) => rows
                .first()
                .and_then(|row| row["full_name"].as_str())
                .map(str::to_string)
                .or_else(|| user.email.clone())
                .unwrap_or_default(),
            Err(e) => {
                warn!("Could not fetch patient profile: {}", e);
                user.email.clone().unwrap_or_default()
            }
        }
    }
}
