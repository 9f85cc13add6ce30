//! Fixed catalog of bookable service types. Entries are defined at build
//! time; prices and durations are not user-editable.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppointmentTypeDef {
    pub name: &'static str,
    pub specialization: &'static str,
    pub price: f64,
    pub duration_minutes: i64,
    pub referral_required: bool,
    pub instructions: &'static str,
}

pub const CATALOG: &[AppointmentTypeDef] = &[
    AppointmentTypeDef {
        name: "General Consultation",
        specialization: "General Practice",
        price: 55.0,
        duration_minutes: 30,
        referral_required: false,
        instructions: "Bring a list of current medications.",
    },
    AppointmentTypeDef {
        name: "Cardiology Consultation",
        specialization: "Cardiology",
        price: 120.0,
        duration_minutes: 45,
        referral_required: true,
        instructions: "Bring previous ECG results if available.",
    },
    AppointmentTypeDef {
        name: "Dermatology Consultation",
        specialization: "Dermatology",
        price: 95.0,
        duration_minutes: 30,
        referral_required: false,
        instructions: "Avoid applying creams to the affected area on the day.",
    },
    AppointmentTypeDef {
        name: "Gynecology Consultation",
        specialization: "Gynecology",
        price: 110.0,
        duration_minutes: 45,
        referral_required: false,
        instructions: "Bring the date of your last period if known.",
    },
    AppointmentTypeDef {
        name: "Pediatric Checkup",
        specialization: "Pediatrics",
        price: 65.0,
        duration_minutes: 30,
        referral_required: false,
        instructions: "Bring the child's vaccination booklet.",
    },
    AppointmentTypeDef {
        name: "Physiotherapy Session",
        specialization: "Physiotherapy",
        price: 70.0,
        duration_minutes: 60,
        referral_required: true,
        instructions: "Wear comfortable clothing.",
    },
    AppointmentTypeDef {
        name: "Mental Health Consultation",
        specialization: "Psychiatry",
        price: 130.0,
        duration_minutes: 50,
        referral_required: true,
        instructions: "A quiet, private space is recommended for follow-ups.",
    },
];

pub fn find(name: &str) -> Option<&'static AppointmentTypeDef> {
    CATALOG.iter().find(|def| def.name == name)
}

pub fn by_specialization(specialization: &str) -> Vec<&'static AppointmentTypeDef> {
    CATALOG
        .iter()
        .filter(|def| def.specialization == specialization)
        .collect()
}

pub fn specialization_of(name: &str) -> Option<&'static str> {
    find(name).map(|def| def.specialization)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_catalog_entry_by_name() {
        let def = find("Cardiology Consultation").unwrap();
        assert_eq!(def.specialization, "Cardiology");
        assert!(def.referral_required);
    }

    #[test]
    fn unknown_name_yields_none() {
        assert!(find("Astrology Consultation").is_none());
    }

    #[test]
    fn groups_by_specialization() {
        let defs = by_specialization("General Practice");
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "General Consultation");
    }

    #[test]
    fn names_are_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            for b in &CATALOG[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }
}
