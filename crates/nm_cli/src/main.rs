use clap::{Parser, Subcommand};
use nm_core::FeedFilter;
use nm_enrich::{create_enricher, AiConfig, EnricherKind};
use nm_feed::NewsFeed;
use nm_ingest::IngestPipeline;
use nm_storage::create_store;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Clone)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                match c {
                    's' => total_seconds += num,
                    'm' => total_seconds += num * 60,
                    'h' => total_seconds += num * 3600,
                    'd' => total_seconds += num * 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                }
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A bare number is taken as seconds
        if !current_number.is_empty() {
            if let Ok(num) = current_number.parse::<u64>() {
                total_seconds += num;
                has_unit = true;
            } else {
                return Err("Invalid number in duration".to_string());
            }
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(name = "newsmap", author, version, about = "News ingestion with geographic enrichment", long_about = None)]
struct Cli {
    /// Storage backend to use. Available backends: memory (default), sqlite
    #[arg(long, default_value = "memory")]
    storage: String,
    /// Path of the sqlite database file
    #[arg(long)]
    db_path: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the ingestion pipeline once, or periodically with --interval
    Ingest {
        /// Enrichment strategy. Available strategies: random (default), ai
        #[arg(long, default_value = "random")]
        enricher: String,
        /// Country filter passed to the news feed
        #[arg(long, default_value = "us")]
        country: String,
        /// Maximum number of candidate articles per run
        #[arg(long, default_value_t = 10)]
        page_size: usize,
        /// Maximum number of articles processed at once
        #[arg(long, default_value_t = nm_ingest::DEFAULT_CONCURRENCY)]
        concurrency: usize,
        /// Run periodically with the given interval (e.g. 1h, 30m, 1h15m30s)
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// Serve the article read API and the authenticated preview lookup
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let store = create_store(&cli.storage, cli.db_path.as_deref()).await?;
    info!("storage initialized (using {})", cli.storage);

    match cli.command {
        Commands::Ingest { enricher, country, page_size, concurrency, interval } => {
            let feed = Arc::new(NewsFeed::new(std::env::var("NEWS_API_KEY").ok()));
            let kind = EnricherKind::from_str(&enricher)?;
            let enricher = create_enricher(kind, AiConfig::from_env())?;
            info!("enrichment strategy initialized (using {})", enricher.name());

            let pipeline =
                IngestPipeline::new(feed, enricher, store).with_concurrency(concurrency);
            let filter = FeedFilter::country(country);

            if let Some(interval) = interval {
                info!("running in periodic mode every {}s", interval.0.as_secs());
                loop {
                    if let Err(e) = pipeline.run(&filter, page_size).await {
                        error!("ingest run failed: {}", e);
                    }
                    tokio::time::sleep(interval.0).await;
                }
            } else {
                let report = pipeline.run(&filter, page_size).await?;
                info!(
                    inserted = report.inserted,
                    skipped = report.skipped,
                    failed = report.failed,
                    "run finished"
                );
            }
        }
        Commands::Serve { addr } => {
            let state = nm_web::AppState {
                store,
                http: reqwest::Client::new(),
                preview_token: std::env::var("PREVIEW_TOKEN").ok(),
            };
            let app = nm_web::create_app(state);

            info!("listening on {}", addr);
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_duration_parsing() {
        assert_eq!(HumanDuration::from_str("1h").unwrap().0.as_secs(), 3600);
        assert_eq!(HumanDuration::from_str("30m").unwrap().0.as_secs(), 1800);
        assert_eq!(HumanDuration::from_str("1h15m30s").unwrap().0.as_secs(), 4530);
        assert_eq!(HumanDuration::from_str("90").unwrap().0.as_secs(), 90);
        assert!(HumanDuration::from_str("1x").is_err());
        assert!(HumanDuration::from_str("").is_err());
    }
}
