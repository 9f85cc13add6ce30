pub mod catalog;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Appointment, AppointmentCriteria, AppointmentStatus};
pub use services::schedule::{filter_appointments, partition_appointments};
