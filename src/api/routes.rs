use axum::{http::Method, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::analytics::AnalyticsService;
use crate::config::FrontendConfig;

use super::analytics::get_analytics;
use super::handlers::{api_test, health_check, AppState};
use super::static_files::serve_static;

pub fn create_api_router(analytics: AnalyticsService, frontend: FrontendConfig) -> Router {
    let state = Arc::new(AppState {
        analytics,
        frontend,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    let api_routes = Router::new()
        .route("/analytics", get(get_analytics))
        .route("/test", get(api_test))
        .layer(cors);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .fallback(serve_static)
        .with_state(state)
}
