//! Upstream analytics source backed by the Cloudflare GraphQL API

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::debug;

use crate::analytics::graphql::{GraphQlRequest, GraphQlResponse};
use crate::analytics::models::{AnalyticsQuery, ZoneAnalytics};
use crate::error::AnalyticsError;

/// Anything able to answer a zone analytics query
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    async fn fetch(&self, query: &AnalyticsQuery) -> Result<ZoneAnalytics, AnalyticsError>;
}

/// Cloudflare GraphQL Analytics API client
#[derive(Clone)]
pub struct CloudflareClient {
    endpoint: String,
    api_token: String,
    client: Client,
}

impl CloudflareClient {
    const USER_AGENT: &'static str = concat!("vista/", env!("CARGO_PKG_VERSION"));
    const TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(endpoint: impl Into<String>, api_token: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(Self::USER_AGENT)
            .timeout(Self::TIMEOUT)
            .build()
            .context("failed to build HTTP client for Cloudflare analytics")?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_token: api_token.into(),
            client,
        })
    }
}

#[async_trait]
impl AnalyticsSource for CloudflareClient {
    async fn fetch(&self, query: &AnalyticsQuery) -> Result<ZoneAnalytics, AnalyticsError> {
        debug!(
            "Querying Cloudflare analytics for {}..{}",
            query.since_date(),
            query.until_date()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&GraphQlRequest::zone_analytics(query))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AnalyticsError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GraphQlResponse = serde_json::from_str(&body)?;

        if let Some(errors) = parsed.error_summary() {
            return Err(AnalyticsError::GraphQl(errors));
        }

        parsed.into_zone().ok_or(AnalyticsError::NoZoneData)
    }
}
