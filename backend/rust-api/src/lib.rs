#![allow(dead_code)]

use axum::{
    http::{header, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod handlers;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use services::AppState;

pub fn create_router(app_state: std::sync::Arc<services::AppState>) -> Router {
    // The leaderboard surface is read-only
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any); // TODO: restrict to specific origins in production

    Router::new()
        // Public endpoints (no auth required)
        .route("/health", get(handlers::health_check))
        // Leaderboard endpoints (require a caller identity)
        .nest(
            "/api/v1",
            leaderboard_routes().layer(middleware::from_fn(
                middlewares::identity::identity_middleware,
            )),
        )
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn leaderboard_routes() -> Router<std::sync::Arc<services::AppState>> {
    Router::new()
        .route(
            "/leaderboard",
            get(handlers::leaderboard::get_global_leaderboard),
        )
        .route(
            "/leaderboard/rank/{user_id}",
            get(handlers::leaderboard::get_user_rank),
        )
        .route(
            "/quizzes/{quiz_id}/leaderboard",
            get(handlers::leaderboard::get_quiz_leaderboard),
        )
        .route(
            "/quizzes/{quiz_id}/leaderboard/rank/{user_id}",
            get(handlers::leaderboard::get_user_quiz_rank),
        )
        .route(
            "/quizzes/{quiz_id}/attempts/{user_id}",
            get(handlers::leaderboard::get_user_attempts),
        )
}
