//! Errors raised while talking to the upstream analytics API

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The request never produced a response (DNS, TLS, timeout...)
    #[error("failed to reach analytics API: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("API error {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Response body was not the JSON we expected
    #[error("failed to decode analytics response: {0}")]
    Decode(#[from] serde_json::Error),

    /// GraphQL-level `errors` array in an otherwise successful response
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("no data returned from GraphQL API")]
    NoZoneData,
}
