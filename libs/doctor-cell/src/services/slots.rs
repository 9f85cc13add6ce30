use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use crate::models::{Doctor, DoctorAvailability};

/// Bookable start times for `date`, drawn from the published availability
/// records. When `date` is the current day, times not strictly after `now`
/// are dropped. Output is deduplicated and ascending.
///
/// `duration_minutes` is part of the request surface but does not take part
/// in overlap checks: published slots are already sliced per service length
/// by the scheduling side.
pub fn bookable_starts(
    date: NaiveDate,
    records: &[DoctorAvailability],
    now: NaiveDateTime,
    _duration_minutes: Option<i64>,
) -> Vec<NaiveTime> {
    let mut starts: Vec<NaiveTime> = records
        .iter()
        .filter(|record| record.date == date)
        .flat_map(|record| record.open_starts.iter().copied())
        .filter(|start| date != now.date() || *start > now.time())
        .collect();

    starts.sort();
    starts.dedup();
    starts
}

/// Doctors from `doctors` that still offer the exact (date, time) slot.
/// Output order follows the roster order, so stale availability records for
/// doctors no longer in the roster are dropped.
pub fn doctors_available_at(
    date: NaiveDate,
    time: NaiveTime,
    doctors: &[Doctor],
    records: &[DoctorAvailability],
) -> Vec<Doctor> {
    let open_doctor_ids: HashSet<Uuid> = records
        .iter()
        .filter(|record| record.date == date && record.open_starts.contains(&time))
        .map(|record| record.doctor_id)
        .collect();

    doctors
        .iter()
        .filter(|doctor| open_doctor_ids.contains(&doctor.id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(doctor_id: Uuid, date: &str, starts: &[&str]) -> DoctorAvailability {
        DoctorAvailability {
            id: Uuid::new_v4(),
            doctor_id,
            date: date.parse().unwrap(),
            open_starts: starts.iter().map(|s| s.parse().unwrap()).collect(),
        }
    }

    fn doctor(id: Uuid, name: &str) -> Doctor {
        Doctor {
            id,
            full_name: name.to_string(),
            specialization: "Cardiology".to_string(),
            city: "Lyon".to_string(),
            address: "1 Rue de la Paix".to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            photo_url: None,
            bio: None,
        }
    }

    #[test]
    fn drops_past_times_when_date_is_today() {
        let doctor_id = Uuid::new_v4();
        let records = vec![record(doctor_id, "2024-06-10", &["09:00:00", "09:30:00", "14:00:00"])];
        let now = "2024-06-10T10:00:00".parse().unwrap();

        let starts = bookable_starts("2024-06-10".parse().unwrap(), &records, now, None);

        assert_eq!(starts, vec!["14:00:00".parse::<NaiveTime>().unwrap()]);
    }

    #[test]
    fn keeps_all_times_for_a_future_date() {
        let doctor_id = Uuid::new_v4();
        let records = vec![record(doctor_id, "2024-06-11", &["09:00:00", "14:00:00"])];
        let now = "2024-06-10T23:00:00".parse().unwrap();

        let starts = bookable_starts("2024-06-11".parse().unwrap(), &records, now, None);

        assert_eq!(starts.len(), 2);
    }

    #[test]
    fn merges_sorts_and_dedupes_across_records() {
        let records = vec![
            record(Uuid::new_v4(), "2024-06-11", &["14:00:00", "09:00:00"]),
            record(Uuid::new_v4(), "2024-06-11", &["09:00:00", "11:15:00"]),
            record(Uuid::new_v4(), "2024-06-12", &["08:00:00"]),
        ];
        let now = "2024-06-01T00:00:00".parse().unwrap();

        let starts = bookable_starts("2024-06-11".parse().unwrap(), &records, now, None);

        let expected: Vec<NaiveTime> = ["09:00:00", "11:15:00", "14:00:00"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        assert_eq!(starts, expected);
    }

    #[test]
    fn no_records_for_date_yields_empty() {
        let now = "2024-06-01T00:00:00".parse().unwrap();
        let starts = bookable_starts("2024-06-11".parse().unwrap(), &[], now, Some(30));
        assert!(starts.is_empty());
    }

    #[test]
    fn all_slots_in_the_past_yields_empty() {
        let records = vec![record(Uuid::new_v4(), "2024-06-10", &["08:00:00", "09:59:00"])];
        let now = "2024-06-10T10:00:00".parse().unwrap();

        let starts = bookable_starts("2024-06-10".parse().unwrap(), &records, now, None);
        assert!(starts.is_empty());
    }

    #[test]
    fn matcher_preserves_roster_order() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let doctors = vec![doctor(a, "Anna Berg"), doctor(b, "Ben Cole"), doctor(c, "Cara Diaz")];
        // Availability listed in reverse roster order; b has no open slot.
        let records = vec![
            record(c, "2024-06-11", &["09:00:00"]),
            record(a, "2024-06-11", &["09:00:00", "10:00:00"]),
            record(b, "2024-06-11", &["10:00:00"]),
        ];

        let available = doctors_available_at(
            "2024-06-11".parse().unwrap(),
            "09:00:00".parse().unwrap(),
            &doctors,
            &records,
        );

        let ids: Vec<Uuid> = available.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn matcher_drops_stale_doctors_missing_from_roster() {
        let known = Uuid::new_v4();
        let removed = Uuid::new_v4();
        let doctors = vec![doctor(known, "Anna Berg")];
        let records = vec![
            record(known, "2024-06-11", &["09:00:00"]),
            record(removed, "2024-06-11", &["09:00:00"]),
        ];

        let available = doctors_available_at(
            "2024-06-11".parse().unwrap(),
            "09:00:00".parse().unwrap(),
            &doctors,
            &records,
        );

        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, known);
    }
}
