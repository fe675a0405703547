use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const DEFAULT_GRAPHQL_URL: &str = "https://api.cloudflare.com/client/v4/graphql";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_server: ServerConfig,
    pub cloudflare: CloudflareConfig,
    pub analytics: AnalyticsConfig,
    pub frontend: FrontendConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Credentials for the Cloudflare GraphQL Analytics API.
///
/// Either value may be missing; the service then answers with mock data.
#[derive(Clone, Serialize, Deserialize)]
pub struct CloudflareConfig {
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    pub zone_id: Option<String>,
    pub graphql_url: String,
}

// The token must never reach logs.
impl std::fmt::Debug for CloudflareConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareConfig")
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("zone_id", &self.zone_id)
            .field("graphql_url", &self.graphql_url)
            .finish()
    }
}

impl CloudflareConfig {
    /// Returns `(token, zone_id)` when both are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.api_token.as_deref(), self.zone_id.as_deref()) {
            (Some(token), Some(zone)) => Some((token, zone)),
            _ => None,
        }
    }
}

impl Default for CloudflareConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            zone_id: None,
            graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Trailing window queried upstream, in days
    #[serde(default = "AnalyticsConfig::default_window_days")]
    pub window_days: u32,

    /// Number of countries kept in the breakdown
    #[serde(default = "AnalyticsConfig::default_top_countries")]
    pub top_countries: usize,
}

impl AnalyticsConfig {
    pub const MAX_WINDOW_DAYS: u32 = 364;
    pub const MAX_TOP_COUNTRIES: usize = 50;

    const fn default_window_days() -> u32 {
        30
    }

    const fn default_top_countries() -> usize {
        10
    }

    /// Clamp user-supplied values into the ranges the upstream accepts.
    pub fn new(window_days: u32, top_countries: usize) -> Self {
        Self {
            window_days: window_days.clamp(1, Self::MAX_WINDOW_DAYS),
            top_countries: top_countries.clamp(1, Self::MAX_TOP_COUNTRIES),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self::new(Self::default_window_days(), Self::default_top_countries())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Path to directory containing static frontend files
    /// If None, uses embedded frontend (if available)
    pub static_dir: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values are treated the same as unset ones.
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_host = read("API_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let api_port = read("API_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .context("API_PORT must be a valid port number")?;

        let api_token = read("CF_API_TOKEN").or_else(|| read("API_TOKEN"));
        let zone_id = read("CF_ZONE_ID").or_else(|| read("ZONE_ID"));
        let graphql_url = read("CF_GRAPHQL_URL").unwrap_or_else(|| DEFAULT_GRAPHQL_URL.to_string());

        let window_days = match read("ANALYTICS_WINDOW_DAYS") {
            Some(v) => v
                .parse::<u32>()
                .context("ANALYTICS_WINDOW_DAYS must be a positive integer")?,
            None => AnalyticsConfig::default_window_days(),
        };
        let top_countries = match read("ANALYTICS_TOP_COUNTRIES") {
            Some(v) => v
                .parse::<usize>()
                .context("ANALYTICS_TOP_COUNTRIES must be a positive integer")?,
            None => AnalyticsConfig::default_top_countries(),
        };

        if api_token.is_some() != zone_id.is_some() {
            tracing::warn!(
                "Only one of CF_API_TOKEN / CF_ZONE_ID is set; serving mock analytics until both are configured"
            );
        }

        Ok(Config {
            api_server: ServerConfig {
                host: api_host,
                port: api_port,
            },
            cloudflare: CloudflareConfig {
                api_token,
                zone_id,
                graphql_url,
            },
            analytics: AnalyticsConfig::new(window_days, top_countries),
            frontend: FrontendConfig {
                static_dir: read("FRONTEND_STATIC_DIR"),
            },
        })
    }
}
