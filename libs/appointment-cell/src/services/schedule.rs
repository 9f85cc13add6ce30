use chrono::NaiveDateTime;

use crate::catalog;
use crate::models::{Appointment, AppointmentCriteria};

/// Split a flat appointment list into (upcoming, past) relative to `now`.
///
/// Upcoming is ascending by (date, time); past is ascending then reversed,
/// so the most recent past appointment comes first. The sort is stable:
/// appointments sharing an exact (date, time) keep the order the backend
/// returned them in.
pub fn partition_appointments(
    appointments: Vec<Appointment>,
    now: NaiveDateTime,
) -> (Vec<Appointment>, Vec<Appointment>) {
    let (mut upcoming, mut past): (Vec<Appointment>, Vec<Appointment>) = appointments
        .into_iter()
        .partition(|appointment| appointment.is_after(now));

    upcoming.sort_by_key(|appointment| (appointment.date, appointment.start_time));
    past.sort_by_key(|appointment| (appointment.date, appointment.start_time));
    past.reverse();

    (upcoming, past)
}

/// Apply every supplied criterion as an exact-equality conjunction.
/// Specialization is resolved through the service catalog from the
/// appointment's type.
pub fn filter_appointments(
    appointments: &[Appointment],
    criteria: &AppointmentCriteria,
) -> Vec<Appointment> {
    appointments
        .iter()
        .filter(|appointment| matches_criteria(appointment, criteria))
        .cloned()
        .collect()
}

fn matches_criteria(appointment: &Appointment, criteria: &AppointmentCriteria) -> bool {
    if let Some(specialization) = &criteria.specialization {
        match catalog::specialization_of(&appointment.appointment_type) {
            Some(s) if s == specialization => {}
            _ => return false,
        }
    }
    if let Some(doctor_name) = &criteria.doctor_name {
        if appointment.doctor_name != *doctor_name {
            return false;
        }
    }
    if let Some(date) = criteria.date {
        if appointment.date != date {
            return false;
        }
    }
    if let Some(appointment_type) = &criteria.appointment_type {
        if appointment.appointment_type != *appointment_type {
            return false;
        }
    }
    if let Some(patient_name) = &criteria.patient_name {
        if appointment.patient_name != *patient_name {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::AppointmentStatus;

    fn appointment(date: &str, time: &str) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            date: date.parse().unwrap(),
            start_time: time.parse().unwrap(),
            appointment_type: "General Consultation".to_string(),
            status: AppointmentStatus::Confirmed,
            price: 55.0,
            address: "14 Harbour Street".to_string(),
            doctor_name: "Dr. Maya Lindqvist".to_string(),
            patient_name: "Alex Moreau".to_string(),
            comments: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn now() -> NaiveDateTime {
        "2024-06-10T12:00:00".parse().unwrap()
    }

    #[test]
    fn partition_is_exhaustive_and_disjoint() {
        let appointments = vec![
            appointment("2024-06-09", "10:00:00"),
            appointment("2024-06-10", "11:59:00"),
            appointment("2024-06-10", "12:01:00"),
            appointment("2024-06-12", "09:00:00"),
        ];
        let all_ids: HashSet<Uuid> = appointments.iter().map(|a| a.id).collect();

        let (upcoming, past) = partition_appointments(appointments, now());

        let mut seen = HashSet::new();
        for a in upcoming.iter().chain(past.iter()) {
            assert!(seen.insert(a.id), "appointment placed in both partitions");
        }
        assert_eq!(seen, all_ids);
        assert_eq!(upcoming.len(), 2);
        assert_eq!(past.len(), 2);
    }

    #[test]
    fn same_date_splits_on_time() {
        let appointments = vec![
            appointment("2024-06-10", "12:00:00"),
            appointment("2024-06-10", "12:00:01"),
        ];

        let (upcoming, past) = partition_appointments(appointments, now());

        // Exactly-now is not strictly after now, so it lands in past.
        assert_eq!(past.len(), 1);
        assert_eq!(upcoming.len(), 1);
    }

    #[test]
    fn upcoming_ascending_past_descending() {
        let appointments = vec![
            appointment("2024-06-20", "09:00:00"),
            appointment("2024-06-11", "15:00:00"),
            appointment("2024-06-01", "10:00:00"),
            appointment("2024-06-09", "08:00:00"),
            appointment("2024-06-11", "09:00:00"),
        ];

        let (upcoming, past) = partition_appointments(appointments, now());

        let upcoming_keys: Vec<_> = upcoming.iter().map(|a| (a.date, a.start_time)).collect();
        let mut sorted = upcoming_keys.clone();
        sorted.sort();
        assert_eq!(upcoming_keys, sorted);

        let past_keys: Vec<_> = past.iter().map(|a| (a.date, a.start_time)).collect();
        let mut sorted = past_keys.clone();
        sorted.sort();
        sorted.reverse();
        assert_eq!(past_keys, sorted);
    }

    #[test]
    fn equal_slots_keep_backend_order() {
        let first = appointment("2024-06-12", "09:00:00");
        let second = appointment("2024-06-12", "09:00:00");
        let (first_id, second_id) = (first.id, second.id);

        let (upcoming, _) = partition_appointments(vec![first, second], now());

        assert_eq!(upcoming[0].id, first_id);
        assert_eq!(upcoming[1].id, second_id);
    }

    #[test]
    fn empty_criteria_matches_everything() {
        let appointments = vec![appointment("2024-06-12", "09:00:00")];
        let filtered = filter_appointments(&appointments, &AppointmentCriteria::default());
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn criteria_compose_with_and() {
        let mut a = appointment("2024-06-12", "09:00:00");
        a.doctor_name = "Dr. Omar Haddad".to_string();
        let b = appointment("2024-06-12", "09:00:00");

        let criteria = AppointmentCriteria {
            doctor_name: Some("Dr. Omar Haddad".to_string()),
            date: Some("2024-06-12".parse().unwrap()),
            ..Default::default()
        };

        let filtered = filter_appointments(&[a.clone(), b], &criteria);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, a.id);

        // Date mismatch defeats the doctor match.
        let criteria = AppointmentCriteria {
            doctor_name: Some("Dr. Omar Haddad".to_string()),
            date: Some("2024-06-13".parse().unwrap()),
            ..Default::default()
        };
        assert!(filter_appointments(&[a], &criteria).is_empty());
    }

    #[test]
    fn specialization_resolves_through_catalog() {
        let mut cardio = appointment("2024-06-12", "09:00:00");
        cardio.appointment_type = "Cardiology Consultation".to_string();
        let general = appointment("2024-06-12", "10:00:00");

        let criteria = AppointmentCriteria {
            specialization: Some("Cardiology".to_string()),
            ..Default::default()
        };

        let filtered = filter_appointments(&[cardio.clone(), general], &criteria);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, cardio.id);
    }

    #[test]
    fn filtering_is_idempotent() {
        let appointments = vec![
            appointment("2024-06-12", "09:00:00"),
            appointment("2024-06-13", "09:00:00"),
        ];
        let criteria = AppointmentCriteria {
            date: Some("2024-06-12".parse().unwrap()),
            ..Default::default()
        };

        let once = filter_appointments(&appointments, &criteria);
        let twice = filter_appointments(&once, &criteria);

        let once_ids: Vec<Uuid> = once.iter().map(|a| a.id).collect();
        let twice_ids: Vec<Uuid> = twice.iter().map(|a| a.id).collect();
        assert_eq!(once_ids, twice_ids);
    }
}
