use axum::{
    http::{header, HeaderValue},
    response::IntoResponse,
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::analytics::{mock::MOCK_TOTALS, AnalyticsService};
use crate::config::FrontendConfig;

pub struct AppState {
    pub analytics: AnalyticsService,
    pub frontend: FrontendConfig,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct PingResponse {
    pub message: String,
    pub timestamp: String,
    pub data: PingData,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingData {
    pub page_views: u64,
    pub unique_visitors: u64,
    pub countries: usize,
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}

/// Liveness probe for the frontend; answers with static sample numbers
pub async fn api_test() -> impl IntoResponse {
    let body = PingResponse {
        message: "API is working".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        data: PingData {
            page_views: MOCK_TOTALS.page_views,
            unique_visitors: MOCK_TOTALS.unique_visitors,
            countries: 6,
        },
    };

    (
        [(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"))],
        Json(body),
    )
}
