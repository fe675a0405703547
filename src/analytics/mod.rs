//! Visitor statistics module
//!
//! Produces the summary rendered by the visitor-stats widget, either from
//! the Cloudflare GraphQL Analytics API or, when no credentials are
//! configured, from a fixed demo dataset.

pub mod aggregator;
pub mod client;
pub mod graphql;
pub mod mock;
pub mod models;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info};

pub use aggregator::summarize;
pub use client::{AnalyticsSource, CloudflareClient};
pub use models::{
    AnalyticsOutcome, AnalyticsQuery, AnalyticsResponse, AnalyticsSummary, CountryStats,
    CredentialStatus, DataSource, Totals, ZoneAnalytics,
};

use crate::config::{AnalyticsConfig, CloudflareConfig};

/// Upstream source bound to the zone it should query
#[derive(Clone)]
struct ZoneSource {
    zone_id: String,
    source: Arc<dyn AnalyticsSource>,
}

/// Turns configuration plus an optional upstream into per-request outcomes
#[derive(Clone)]
pub struct AnalyticsService {
    upstream: Option<ZoneSource>,
    settings: AnalyticsConfig,
    credentials: CredentialStatus,
}

impl AnalyticsService {
    /// Build the service from configuration, creating a Cloudflare client
    /// when both credentials are present.
    pub fn from_config(
        cloudflare: &CloudflareConfig,
        settings: AnalyticsConfig,
    ) -> anyhow::Result<Self> {
        let credentials = CredentialStatus::new(
            cloudflare.api_token.as_deref(),
            cloudflare.zone_id.as_deref(),
        );

        let upstream = match cloudflare.credentials() {
            Some((token, zone_id)) => Some(ZoneSource {
                zone_id: zone_id.to_string(),
                source: Arc::new(CloudflareClient::new(&cloudflare.graphql_url, token)?),
            }),
            None => None,
        };

        Ok(Self {
            upstream,
            settings,
            credentials,
        })
    }

    /// Service that always answers with the demo dataset
    pub fn mock(settings: AnalyticsConfig) -> Self {
        Self {
            upstream: None,
            settings,
            credentials: CredentialStatus::new(None, None),
        }
    }

    /// Service backed by an arbitrary source for `zone_id`.
    ///
    /// No API token is involved, so the diagnostics report `hasToken: false`.
    pub fn with_source(
        zone_id: impl Into<String>,
        source: Arc<dyn AnalyticsSource>,
        settings: AnalyticsConfig,
    ) -> Self {
        let zone_id = zone_id.into();
        Self {
            credentials: CredentialStatus::new(None, Some(zone_id.as_str())),
            upstream: Some(ZoneSource { zone_id, source }),
            settings,
        }
    }

    pub fn is_mock(&self) -> bool {
        self.upstream.is_none()
    }

    pub fn credentials(&self) -> &CredentialStatus {
        &self.credentials
    }

    /// Produce the outcome for one request at `now`.
    ///
    /// Upstream errors are logged and folded into [`AnalyticsOutcome::Failed`].
    pub async fn report_at(&self, now: DateTime<Utc>) -> AnalyticsOutcome {
        let Some(upstream) = self.upstream.as_ref() else {
            info!("Cloudflare credentials not configured, serving mock analytics");
            return AnalyticsOutcome::Mock(mock::mock_summary());
        };

        let query = AnalyticsQuery::trailing(upstream.zone_id.clone(), self.settings.window_days, now);

        match upstream.source.fetch(&query).await {
            Ok(zone) => AnalyticsOutcome::Real(summarize(&zone, self.settings.top_countries)),
            Err(e) => {
                error!("Analytics API error: {}", e);
                AnalyticsOutcome::Failed(e.to_string())
            }
        }
    }

    pub async fn report(&self) -> AnalyticsOutcome {
        self.report_at(Utc::now()).await
    }

    /// Outcome rendered as the JSON body served to the widget
    pub fn response_for(&self, outcome: &AnalyticsOutcome) -> AnalyticsResponse {
        AnalyticsResponse::from_outcome(outcome, self.credentials.clone())
    }
}
