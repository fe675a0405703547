//! GraphQL request and response envelopes for the Cloudflare Analytics API

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analytics::models::{AnalyticsQuery, ZoneAnalytics};

/// Daily totals plus the same window grouped by country only.
///
/// The `countries` selection has no time dimension, so each row covers the
/// whole window for one country and the row limit only bounds the number
/// of countries.
pub const ZONE_ANALYTICS_QUERY: &str = r#"
query GetZoneAnalytics(
  $zoneTag: string!,
  $sinceDate: Date!,
  $untilDate: Date!,
  $dailyLimit: uint64!,
  $countryLimit: uint64!
) {
  viewer {
    zones(filter: { zoneTag: $zoneTag }) {
      httpRequests1dGroups(
        limit: $dailyLimit,
        orderBy: [date_ASC],
        filter: { date_geq: $sinceDate, date_leq: $untilDate }
      ) {
        sum { pageViews requests }
        uniq { uniques }
        dimensions { date }
      }
      countries: httpRequests1dGroups(
        limit: $countryLimit,
        orderBy: [sum_pageViews_DESC],
        filter: { date_geq: $sinceDate, date_leq: $untilDate }
      ) {
        sum { pageViews requests }
        uniq { uniques }
        dimensions { country }
      }
    }
  }
}
"#;

#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest {
    pub query: &'static str,
    pub variables: QueryVariables,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryVariables {
    pub zone_tag: String,
    pub since_date: String,
    pub until_date: String,
    pub daily_limit: u32,
    pub country_limit: u32,
}

impl GraphQlRequest {
    pub fn zone_analytics(query: &AnalyticsQuery) -> Self {
        Self {
            query: ZONE_ANALYTICS_QUERY,
            variables: QueryVariables {
                zone_tag: query.zone_id.clone(),
                since_date: query.since_date(),
                until_date: query.until_date(),
                daily_limit: query.daily_limit,
                country_limit: query.country_limit,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<ViewerData>,
    #[serde(default)]
    pub errors: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
pub struct ViewerData {
    #[serde(default)]
    pub viewer: Option<Viewer>,
}

#[derive(Debug, Deserialize)]
pub struct Viewer {
    #[serde(default)]
    pub zones: Vec<ZoneAnalytics>,
}

impl GraphQlResponse {
    /// Errors reported in the body, if any. `errors: []` counts as none.
    pub fn error_summary(&self) -> Option<String> {
        let errors = self.errors.as_ref().filter(|e| !e.is_empty())?;
        let messages: Vec<String> = errors
            .iter()
            .map(|e| match e.get("message").and_then(Value::as_str) {
                Some(message) => message.to_string(),
                None => e.to_string(),
            })
            .collect();
        Some(messages.join("; "))
    }

    /// First zone in the response
    pub fn into_zone(self) -> Option<ZoneAnalytics> {
        self.data?.viewer?.zones.into_iter().next()
    }
}
