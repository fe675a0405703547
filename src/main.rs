use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use vista::analytics::AnalyticsService;
use vista::api;
use vista::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    let analytics = AnalyticsService::from_config(&config.cloudflare, config.analytics.clone())?;

    if analytics.is_mock() {
        info!("📊 Cloudflare credentials missing - /api/analytics serves mock data");
    } else {
        info!(
            "📊 Cloudflare analytics enabled (zone: {}, window: {} days, top {} countries)",
            analytics.credentials().zone_id_value,
            config.analytics.window_days,
            config.analytics.top_countries
        );
    }

    // Log frontend configuration
    if let Some(ref static_dir) = config.frontend.static_dir {
        info!("🎨 Serving frontend from directory: {}", static_dir);
    } else {
        info!("🎨 Serving embedded frontend");
    }

    let router = api::create_api_router(analytics, config.frontend.clone());

    let api_addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind {}", api_addr))?;
    info!("🚀 API server listening on http://{}", api_addr);
    info!("   - Visitor statistics at http://{}/api/analytics", api_addr);
    info!("   - Frontend UI available at http://{}/", api_addr);

    axum::serve(listener, router).await?;

    Ok(())
}
