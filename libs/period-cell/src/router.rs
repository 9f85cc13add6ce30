use std::sync::Arc;

use axum::{
    middleware,
    routing::get,
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn period_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/settings", get(handlers::get_settings).put(handlers::save_settings))
        .route("/days", get(handlers::get_month_days).put(handlers::save_day))
        .route("/predictions", get(handlers::get_predictions))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
