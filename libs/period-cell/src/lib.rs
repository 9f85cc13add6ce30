pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{DailyPeriodData, PeriodTrackerSettings};
pub use services::prediction::{predict_ovulation_days, predict_period_starts};
