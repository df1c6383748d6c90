/// API Routes definition

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

pub fn create_router(state: AppState, enable_cors: bool) -> Router {
    let mut app = Router::new()
        .route("/api/metrics", get(handlers::get_metrics))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/dashboard/network/:network", post(handlers::switch_network))
        .route("/api/dashboard/refresh", post(handlers::refresh_dashboard))
        .route("/api/networks", get(handlers::get_networks))
        .route("/api/health", get(handlers::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        app = app.layer(CorsLayer::permissive());
    }

    app
}
