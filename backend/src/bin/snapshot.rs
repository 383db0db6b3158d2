//! Collects one snapshot without touching the spreadsheet and saves it as JSON.

use anyhow::{anyhow, Result};
use channel_stats::config::{init_logger, load_environment, YouTubeConfig};
use channel_stats::services::aggregator::MetricsAggregator;
use channel_stats::services::sink::{log_snapshot_report, write_snapshot_file};
use channel_stats::services::youtube_service::YouTubeClient;
use chrono::Utc;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_SNAPSHOT_PATH: &str = "youtube-stats.json";

#[tokio::main]
async fn main() -> Result<()> {
    load_environment();
    init_logger();

    let config = YouTubeConfig::from_env()?;
    let path = env::var("STATS_JSON_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SNAPSHOT_PATH));

    let youtube = Arc::new(YouTubeClient::new(config.clone())?);
    let aggregator = MetricsAggregator::new(youtube.clone(), youtube.clone(), youtube);

    let snapshot = aggregator
        .collect_snapshot(&config.channel_id, Utc::now())
        .await
        .map_err(|e| anyhow!("failed to collect channel statistics: {e}"))?;

    write_snapshot_file(&path, &snapshot).await?;
    log_snapshot_report(&config.channel_id, &snapshot);
    Ok(())
}
