pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Doctor, DoctorAvailability};
pub use services::slots::{bookable_starts, doctors_available_at};
