use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn referral_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::upload_referral))
        .route("/{referral_id}", get(handlers::get_referral))
        .route("/{referral_id}/file", put(handlers::replace_referral_file))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
