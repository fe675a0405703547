//! Data models for visitor analytics

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel used when upstream does not attribute traffic to a country
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Parameters of one upstream analytics query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsQuery {
    /// Cloudflare zone tag
    pub zone_id: String,

    /// First calendar day of the window (inclusive)
    pub since: NaiveDate,

    /// Last calendar day of the window (inclusive)
    pub until: NaiveDate,

    /// Maximum number of daily buckets requested
    pub daily_limit: u32,

    /// Maximum number of per-country rows requested
    pub country_limit: u32,
}

impl AnalyticsQuery {
    /// Upper bound on country rows; well above the number of ISO countries
    pub const COUNTRY_ROW_LIMIT: u32 = 1000;

    /// Build a query covering the `window_days` calendar days ending with
    /// the (UTC) day of `now`, today included.
    pub fn trailing(zone_id: impl Into<String>, window_days: u32, now: DateTime<Utc>) -> Self {
        let window_days = window_days.max(1);
        let until = now.date_naive();
        Self {
            zone_id: zone_id.into(),
            since: until - Days::new(u64::from(window_days - 1)),
            until,
            daily_limit: window_days,
            country_limit: Self::COUNTRY_ROW_LIMIT,
        }
    }

    /// Number of calendar days matched by `since..=until`
    pub fn days_in_window(&self) -> u32 {
        u32::try_from((self.until - self.since).num_days() + 1).unwrap_or(0)
    }

    pub fn since_date(&self) -> String {
        self.since.format("%Y-%m-%d").to_string()
    }

    pub fn until_date(&self) -> String {
        self.until.format("%Y-%m-%d").to_string()
    }
}

/// Raw bucket from a `httpRequests1dGroups` selection.
///
/// Every field is optional upstream; missing numbers count as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrafficBucket {
    #[serde(default)]
    pub sum: Option<BucketSum>,
    #[serde(default)]
    pub uniq: Option<BucketUniq>,
    #[serde(default)]
    pub dimensions: Option<BucketDimensions>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketSum {
    #[serde(default)]
    pub page_views: Option<u64>,
    #[serde(default)]
    pub requests: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BucketUniq {
    #[serde(default)]
    pub uniques: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BucketDimensions {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl TrafficBucket {
    pub fn page_views(&self) -> u64 {
        self.sum.as_ref().and_then(|s| s.page_views).unwrap_or(0)
    }

    pub fn requests(&self) -> u64 {
        self.sum.as_ref().and_then(|s| s.requests).unwrap_or(0)
    }

    pub fn uniques(&self) -> u64 {
        self.uniq.as_ref().and_then(|u| u.uniques).unwrap_or(0)
    }

    /// Country code, collapsed to [`UNKNOWN_COUNTRY`] when missing or blank
    pub fn country(&self) -> &str {
        self.dimensions
            .as_ref()
            .and_then(|d| d.country.as_deref())
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(UNKNOWN_COUNTRY)
    }
}

/// Buckets returned for one zone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneAnalytics {
    #[serde(default, rename = "httpRequests1dGroups")]
    pub daily: Vec<TrafficBucket>,
    /// Same dataset grouped by country only, one row per country
    #[serde(default)]
    pub countries: Vec<TrafficBucket>,
}

/// Headline counters shown by the stats widget
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub page_views: u64,
    pub unique_visitors: u64,
    pub requests: u64,
}

/// One row of the per-country breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryStats {
    pub country: String,
    pub page_views: u64,
    pub unique_visitors: u64,
    /// Rounded share of page views across the breakdown, 0..=100
    pub percentage: u8,
}

/// Totals plus ranked country breakdown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub totals: Totals,
    pub country_map: Vec<CountryStats>,
}

/// Result of serving one analytics request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsOutcome {
    /// Credentials are not configured; fixed demo data
    Mock(AnalyticsSummary),
    /// Aggregated from the upstream API
    Real(AnalyticsSummary),
    /// Upstream call failed; carries the diagnostic message
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Mock,
    Real,
    Error,
}

impl AnalyticsOutcome {
    pub fn source(&self) -> DataSource {
        match self {
            Self::Mock(_) => DataSource::Mock,
            Self::Real(_) => DataSource::Real,
            Self::Failed(_) => DataSource::Error,
        }
    }

    pub fn summary(&self) -> AnalyticsSummary {
        match self {
            Self::Mock(summary) | Self::Real(summary) => summary.clone(),
            Self::Failed(_) => AnalyticsSummary::default(),
        }
    }
}

/// Which credentials are present, safe to expose to the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatus {
    pub has_token: bool,
    pub has_zone_id: bool,
    pub zone_id_value: String,
}

impl CredentialStatus {
    const ZONE_PREFIX_LEN: usize = 8;

    pub fn new(api_token: Option<&str>, zone_id: Option<&str>) -> Self {
        let zone_id_value = match zone_id {
            Some(zone) => {
                let prefix: String = zone.chars().take(Self::ZONE_PREFIX_LEN).collect();
                format!("{prefix}...")
            }
            None => "not set".to_string(),
        };

        Self {
            has_token: api_token.is_some(),
            has_zone_id: zone_id.is_some(),
            zone_id_value,
        }
    }
}

/// JSON body of `GET /api/analytics`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    #[serde(flatten)]
    pub credentials: CredentialStatus,
    pub source: DataSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_mock_data: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_real_data: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub totals: Totals,
    pub country_map: Vec<CountryStats>,
}

impl AnalyticsResponse {
    pub const MOCK_MESSAGE: &'static str =
        "Using mock data. Configure CF_API_TOKEN and CF_ZONE_ID for real data.";
    pub const FAILURE_MESSAGE: &'static str =
        "Failed to fetch Cloudflare Analytics. Check API token permissions.";

    pub fn from_outcome(outcome: &AnalyticsOutcome, credentials: CredentialStatus) -> Self {
        let summary = outcome.summary();
        let mut response = Self {
            credentials,
            source: outcome.source(),
            is_mock_data: None,
            is_real_data: None,
            error: None,
            message: None,
            totals: summary.totals,
            country_map: summary.country_map,
        };

        match outcome {
            AnalyticsOutcome::Mock(_) => {
                response.is_mock_data = Some(true);
                response.message = Some(Self::MOCK_MESSAGE.to_string());
            }
            AnalyticsOutcome::Real(_) => {
                response.is_real_data = Some(true);
            }
            AnalyticsOutcome::Failed(error) => {
                response.error = Some(error.clone());
                response.message = Some(Self::FAILURE_MESSAGE.to_string());
            }
        }

        response
    }
}
