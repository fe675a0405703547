//! Integration tests for the visitor statistics endpoint
//!
//! The Cloudflare GraphQL API is replaced by a local mockito server so the
//! full path (router -> service -> HTTP client -> aggregation) is exercised.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Days, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use vista::analytics::{AnalyticsQuery, AnalyticsService};
use vista::config::{AnalyticsConfig, CloudflareConfig, FrontendConfig};

const ZONE_ID: &str = "0123456789abcdef0123456789abcdef";

/// Helper to build a router backed by the given upstream url
fn create_test_router(graphql_url: Option<String>) -> Router {
    let cloudflare = match graphql_url {
        Some(url) => CloudflareConfig {
            api_token: Some("test-token".to_string()),
            zone_id: Some(ZONE_ID.to_string()),
            graphql_url: url,
        },
        None => CloudflareConfig::default(),
    };

    let analytics = AnalyticsService::from_config(&cloudflare, AnalyticsConfig::default()).unwrap();
    vista::api::create_api_router(analytics, FrontendConfig::default())
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let cache_control = response
        .headers()
        .get(header::CACHE_CONTROL)
        .map(|v| v.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();

    (status, cache_control, json)
}

fn zone_payload() -> Value {
    json!({
        "data": {
            "viewer": {
                "zones": [{
                    "httpRequests1dGroups": [
                        {
                            "sum": { "pageViews": 90, "requests": 300 },
                            "uniq": { "uniques": 30 },
                            "dimensions": { "date": "2024-06-01" }
                        },
                        {
                            "sum": { "pageViews": 60, "requests": 200 },
                            "uniq": { "uniques": 20 },
                            "dimensions": { "date": "2024-06-02" }
                        }
                    ],
                    "countries": [
                        {
                            "sum": { "pageViews": 50, "requests": 80 },
                            "uniq": { "uniques": 10 },
                            "dimensions": { "country": "US" }
                        },
                        {
                            "sum": { "pageViews": 70, "requests": 90 },
                            "uniq": { "uniques": 15 },
                            "dimensions": { "country": "CN" }
                        },
                        {
                            "sum": { "pageViews": 30, "requests": 40 },
                            "uniq": { "uniques": 5 },
                            "dimensions": { "country": "CN" }
                        }
                    ]
                }]
            }
        },
        "errors": null
    })
}

#[tokio::test]
async fn test_mock_data_without_credentials() {
    let (status, cache_control, json) = get(create_test_router(None), "/api/analytics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache_control.as_deref(), Some("no-cache"));
    assert_eq!(json["isMockData"], true);
    assert_eq!(json["source"], "mock");
    assert_eq!(json["totals"]["pageViews"], 12847);
    assert_eq!(json["countryMap"].as_array().unwrap().len(), 6);
    assert_eq!(json["hasToken"], false);
    assert_eq!(json["zoneIdValue"], "not set");
    assert!(json.get("isRealData").is_none());
}

#[tokio::test]
async fn test_real_data_is_aggregated_and_ranked() {
    let mut server = mockito::Server::new_async().await;
    let upstream = server
        .mock("POST", "/client/v4/graphql")
        .match_header("authorization", "Bearer test-token")
        .match_body(mockito::Matcher::PartialJson(json!({
            "variables": { "zoneTag": ZONE_ID }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(zone_payload().to_string())
        .create_async()
        .await;

    let app = create_test_router(Some(format!("{}/client/v4/graphql", server.url())));
    let (status, cache_control, json) = get(app, "/api/analytics").await;

    upstream.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache_control.as_deref(), Some("public, max-age=300"));
    assert_eq!(json["isRealData"], true);
    assert_eq!(json["source"], "real");
    assert_eq!(
        json["totals"],
        json!({ "pageViews": 150, "uniqueVisitors": 50, "requests": 500 })
    );

    let countries = json["countryMap"].as_array().unwrap();
    assert_eq!(countries.len(), 2);
    assert_eq!(countries[0]["country"], "CN");
    assert_eq!(countries[0]["pageViews"], 100);
    assert_eq!(countries[0]["uniqueVisitors"], 20);
    assert_eq!(countries[0]["percentage"], 67);
    assert_eq!(countries[1]["country"], "US");

    // Token never leaks, zone id only as a prefix
    assert_eq!(json["hasToken"], true);
    assert_eq!(json["zoneIdValue"], "01234567...");
    assert!(!json.to_string().contains("test-token"));
}

#[tokio::test]
async fn test_upstream_forbidden_returns_zeroed_payload() {
    let mut server = mockito::Server::new_async().await;
    let _upstream = server
        .mock("POST", "/graphql")
        .with_status(403)
        .with_body("Authentication error")
        .create_async()
        .await;

    let app = create_test_router(Some(format!("{}/graphql", server.url())));
    let (status, cache_control, json) = get(app, "/api/analytics").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(cache_control.as_deref(), Some("no-cache"));
    assert_eq!(
        json["totals"],
        json!({ "pageViews": 0, "uniqueVisitors": 0, "requests": 0 })
    );
    assert_eq!(json["countryMap"], json!([]));
    assert_eq!(json["source"], "error");
    assert!(json["error"].as_str().unwrap().contains("403"));
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_graphql_errors_return_zeroed_payload() {
    let mut server = mockito::Server::new_async().await;
    let _upstream = server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_body(
            json!({
                "data": null,
                "errors": [{ "message": "zone does not have access to the dataset" }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let app = create_test_router(Some(format!("{}/graphql", server.url())));
    let (status, _, json) = get(app, "/api/analytics").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["countryMap"], json!([]));
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("zone does not have access"));
}

#[tokio::test]
async fn test_malformed_upstream_body_returns_zeroed_payload() {
    let mut server = mockito::Server::new_async().await;
    let _upstream = server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let app = create_test_router(Some(format!("{}/graphql", server.url())));
    let (status, _, json) = get(app, "/api/analytics").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["totals"]["pageViews"], 0);
    assert_eq!(json["countryMap"], json!([]));
}

#[tokio::test]
async fn test_missing_zone_returns_zeroed_payload() {
    let mut server = mockito::Server::new_async().await;
    let _upstream = server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_body(json!({ "data": { "viewer": { "zones": [] } } }).to_string())
        .create_async()
        .await;

    let app = create_test_router(Some(format!("{}/graphql", server.url())));
    let (status, _, json) = get(app, "/api/analytics").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "no data returned from GraphQL API");
}

#[tokio::test]
async fn test_unreachable_upstream_returns_zeroed_payload() {
    // Reserve a local port, then close it so the connection is refused
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let app = create_test_router(Some(format!("http://127.0.0.1:{}/graphql", port)));
    let (status, cache_control, json) = get(app, "/api/analytics").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(cache_control.as_deref(), Some("no-cache"));
    assert_eq!(
        json["totals"],
        json!({ "pageViews": 0, "uniqueVisitors": 0, "requests": 0 })
    );
    assert_eq!(json["countryMap"], json!([]));
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("failed to reach analytics API"));
}

#[tokio::test]
async fn test_country_rows_cover_the_whole_window() {
    let today = Utc::now().date_naive();
    let since = today - Days::new(29);

    // More distinct countries than the widget shows, plus a repeated code
    let mut rows: Vec<Value> = (0..25u64)
        .map(|i| {
            json!({
                "sum": { "pageViews": 100 - i, "requests": 200 },
                "uniq": { "uniques": 10 },
                "dimensions": { "country": format!("C{:02}", i) }
            })
        })
        .collect();
    rows.push(json!({
        "sum": { "pageViews": 50, "requests": 60 },
        "uniq": { "uniques": 5 },
        "dimensions": { "country": "C24" }
    }));

    let mut server = mockito::Server::new_async().await;
    let upstream = server
        .mock("POST", "/graphql")
        .match_body(mockito::Matcher::PartialJson(json!({
            "variables": {
                "sinceDate": since.format("%Y-%m-%d").to_string(),
                "untilDate": today.format("%Y-%m-%d").to_string(),
                "dailyLimit": 30,
                "countryLimit": AnalyticsQuery::COUNTRY_ROW_LIMIT
            }
        })))
        .with_status(200)
        .with_body(
            json!({
                "data": { "viewer": { "zones": [{
                    "httpRequests1dGroups": [],
                    "countries": rows
                }] } }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let app = create_test_router(Some(format!("{}/graphql", server.url())));
    let (status, _, json) = get(app, "/api/analytics").await;

    upstream.assert_async().await;
    assert_eq!(status, StatusCode::OK);

    let countries = json["countryMap"].as_array().unwrap();
    assert_eq!(countries.len(), 10);
    // C24 had 76 + 50 page views across its two rows
    assert_eq!(countries[0]["country"], "C24");
    assert_eq!(countries[0]["pageViews"], 126);
    assert_eq!(countries[1]["country"], "C00");
}

#[tokio::test]
async fn test_repeated_calls_are_identical() {
    let mut server = mockito::Server::new_async().await;
    let _upstream = server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_body(zone_payload().to_string())
        .expect(2)
        .create_async()
        .await;

    let url = format!("{}/graphql", server.url());
    let (_, _, first) = get(create_test_router(Some(url.clone())), "/api/analytics").await;
    let (_, _, second) = get(create_test_router(Some(url)), "/api/analytics").await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_ping_and_health_endpoints() {
    let (status, cache_control, json) = get(create_test_router(None), "/api/test").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache_control.as_deref(), Some("no-cache"));
    assert_eq!(json["data"]["pageViews"], 12847);
    assert_eq!(json["data"]["uniqueVisitors"], 4823);
    assert_eq!(json["data"]["countries"], 6);
    assert!(json["timestamp"].is_string());

    let (status, _, json) = get(create_test_router(None), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "OK");
}
