use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use vista::analytics::graphql::GraphQlRequest;
use vista::analytics::{AnalyticsOutcome, AnalyticsQuery, AnalyticsService};
use vista::config::{AnalyticsConfig, Config};

#[derive(Parser)]
#[command(name = "vista-cli")]
#[command(about = "Vista visitor statistics CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and aggregate statistics once, printing the API payload
    Snapshot {
        /// Trailing window in days (defaults to ANALYTICS_WINDOW_DAYS)
        #[arg(long)]
        days: Option<u32>,
        /// Number of countries to keep (defaults to ANALYTICS_TOP_COUNTRIES)
        #[arg(long)]
        top: Option<usize>,
    },
    /// Print the GraphQL request that would be sent upstream
    Query {
        /// Trailing window in days (defaults to ANALYTICS_WINDOW_DAYS)
        #[arg(long)]
        days: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Snapshot { days, top } => {
            let settings = AnalyticsConfig::new(
                days.unwrap_or(config.analytics.window_days),
                top.unwrap_or(config.analytics.top_countries),
            );
            let service = AnalyticsService::from_config(&config.cloudflare, settings)?;

            let outcome = service.report().await;
            let body = service.response_for(&outcome);
            println!("{}", serde_json::to_string_pretty(&body)?);

            if let AnalyticsOutcome::Failed(error) = outcome {
                bail!("analytics snapshot failed: {}", error);
            }
        }
        Commands::Query { days } => {
            let window_days = AnalyticsConfig::new(
                days.unwrap_or(config.analytics.window_days),
                config.analytics.top_countries,
            )
            .window_days;
            let zone_id = config
                .cloudflare
                .zone_id
                .clone()
                .unwrap_or_else(|| "<CF_ZONE_ID>".to_string());

            let query = AnalyticsQuery::trailing(zone_id, window_days, Utc::now());
            let request = GraphQlRequest::zone_analytics(&query);
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
    }

    Ok(())
}
