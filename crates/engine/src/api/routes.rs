use axum::{
    Router,
    routing::{get, post},
};

use super::handlers;
use super::server::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::health_check))
        .route("/chat", post(handlers::handle_chat))
        .route("/referral", post(handlers::handle_referral))
}
