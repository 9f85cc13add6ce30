use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use doctor_cell::router::doctor_routes;
use notification_cell::router::notification_routes;
use period_cell::router::period_routes;
use referral_cell::router::referral_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Carepoint API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/referrals", referral_routes(state.clone()))
        .nest("/notifications", notification_routes(state.clone()))
        .nest("/period-tracker", period_routes(state.clone()))
}
