//! Analytics API handlers

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::analytics::AnalyticsOutcome;

use super::handlers::AppState;

const CACHE_REAL: &str = "public, max-age=300";
const CACHE_NONE: &str = "no-cache";

/// Status code and `Cache-Control` value for an outcome
pub fn response_policy(outcome: &AnalyticsOutcome) -> (StatusCode, &'static str) {
    match outcome {
        AnalyticsOutcome::Mock(_) => (StatusCode::OK, CACHE_NONE),
        AnalyticsOutcome::Real(_) => (StatusCode::OK, CACHE_REAL),
        AnalyticsOutcome::Failed(_) => (StatusCode::INTERNAL_SERVER_ERROR, CACHE_NONE),
    }
}

/// Visitor statistics for the stats widget
pub async fn get_analytics(State(state): State<Arc<AppState>>) -> Response {
    let outcome = state.analytics.report().await;
    let body = state.analytics.response_for(&outcome);
    let (status, cache_control) = response_policy(&outcome);

    (
        status,
        [(header::CACHE_CONTROL, HeaderValue::from_static(cache_control))],
        Json(body),
    )
        .into_response()
}
