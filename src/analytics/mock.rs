//! Fixed demo dataset served when no Cloudflare credentials are configured

use crate::analytics::aggregator::rank_countries;
use crate::analytics::models::{AnalyticsSummary, Totals};

pub const MOCK_TOTALS: Totals = Totals {
    page_views: 12847,
    unique_visitors: 4823,
    requests: 35621,
};

/// `(country, page_views, unique_visitors)`
const MOCK_COUNTRIES: [(&str, u64, u64); 6] = [
    ("CN", 5234, 2102),
    ("US", 2847, 923),
    ("AU", 1523, 487),
    ("JP", 982, 324),
    ("GB", 756, 289),
    ("DE", 505, 198),
];

pub fn mock_summary() -> AnalyticsSummary {
    AnalyticsSummary {
        totals: MOCK_TOTALS,
        country_map: rank_countries(
            MOCK_COUNTRIES
                .iter()
                .map(|(c, pv, uv)| (c.to_string(), *pv, *uv)),
            MOCK_COUNTRIES.len(),
        ),
    }
}
