//! Folding upstream traffic buckets into the widget summary
//!
//! Totals come from the daily buckets; the country breakdown comes from
//! the rows grouped by country over the same window. Unique visitors are
//! summed per day, so a visitor returning on several days is counted once
//! for each of those days.

use std::collections::HashMap;

use tracing::debug;

use crate::analytics::models::{
    AnalyticsSummary, CountryStats, Totals, TrafficBucket, ZoneAnalytics, UNKNOWN_COUNTRY,
};

/// Running per-country counters
#[derive(Debug, Clone, Copy, Default)]
struct CountryValue {
    page_views: u64,
    unique_visitors: u64,
}

/// Sum page views, requests and daily uniques across all daily buckets
pub fn sum_totals(daily: &[TrafficBucket]) -> Totals {
    daily.iter().fold(Totals::default(), |acc, bucket| Totals {
        page_views: acc.page_views.saturating_add(bucket.page_views()),
        unique_visitors: acc.unique_visitors.saturating_add(bucket.uniques()),
        requests: acc.requests.saturating_add(bucket.requests()),
    })
}

/// Fold country rows by code and return the ranked top `limit`.
///
/// Rows sharing a code (including every blank one, as `"Unknown"`) are summed.
pub fn country_breakdown(rows: &[TrafficBucket], limit: usize) -> Vec<CountryStats> {
    let mut grouped: HashMap<&str, CountryValue> = HashMap::new();

    for bucket in rows {
        let value = grouped.entry(bucket.country()).or_default();
        value.page_views = value.page_views.saturating_add(bucket.page_views());
        value.unique_visitors = value.unique_visitors.saturating_add(bucket.uniques());
    }

    rank_countries(
        grouped
            .into_iter()
            .map(|(country, v)| (country.to_string(), v.page_views, v.unique_visitors)),
        limit,
    )
}

/// Turn `(country, page_views, unique_visitors)` rows into the ranked breakdown.
///
/// Percentages are shares of the page views of every row passed in,
/// computed before truncation. An all-zero `"Unknown"` row is dropped.
pub fn rank_countries<I>(rows: I, limit: usize) -> Vec<CountryStats>
where
    I: IntoIterator<Item = (String, u64, u64)>,
{
    let rows: Vec<(String, u64, u64)> = rows
        .into_iter()
        .filter(|(country, page_views, visitors)| {
            !(country == UNKNOWN_COUNTRY && *page_views == 0 && *visitors == 0)
        })
        .collect();

    let total_page_views: u64 = rows.iter().map(|(_, pv, _)| *pv).sum();

    let mut ranked: Vec<CountryStats> = rows
        .into_iter()
        .map(|(country, page_views, unique_visitors)| CountryStats {
            percentage: percentage_of(page_views, total_page_views),
            country,
            page_views,
            unique_visitors,
        })
        .collect();

    // Stable order for equal page views keeps repeated responses identical
    ranked.sort_by(|a, b| {
        b.page_views
            .cmp(&a.page_views)
            .then_with(|| a.country.cmp(&b.country))
    });
    ranked.truncate(limit);
    ranked
}

/// Integer percentage rounded half-up; zero when `total` is zero
pub fn percentage_of(part: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (u128::from(part) * 100 + u128::from(total) / 2) / u128::from(total);
    pct.min(100) as u8
}

/// Build the full summary for one zone
pub fn summarize(zone: &ZoneAnalytics, top_countries: usize) -> AnalyticsSummary {
    let totals = sum_totals(&zone.daily);
    let country_map = country_breakdown(&zone.countries, top_countries);

    debug!(
        "Aggregated {} daily buckets and {} country rows: {} page views, {} visitors, {} countries",
        zone.daily.len(),
        zone.countries.len(),
        totals.page_views,
        totals.unique_visitors,
        country_map.len()
    );

    AnalyticsSummary {
        totals,
        country_map,
    }
}
