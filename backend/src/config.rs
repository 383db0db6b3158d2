use crate::error::ConfigError;
use crate::services::collector::StatsCollector;
use crate::services::sheets_service::SheetsClient;
use crate::services::youtube_service::YouTubeClient;
use crate::utils::unescape_private_key;
use crate::AppState;
use anyhow::Result;
use chrono::Utc;
use env_logger::Builder;
use log::{info, LevelFilter};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};

pub const DEFAULT_YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_SHEET_RANGE: &str = "Statistiques!A:F";
/// Evaluated in UTC by tokio-cron-scheduler, not in the host zone.
pub const DEFAULT_COLLECT_SCHEDULE: &str = "0 0 */6 * * *";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    pub api_key: String,
    pub channel_id: String,
    pub api_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub range: String,
    pub client_email: String,
    pub private_key: String,
    pub api_url: String,
    pub token_uri: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub youtube: YouTubeConfig,
    pub sheets: SheetsConfig,
    pub port: u16,
    pub collect_schedule: String,
    pub collect_on_startup: bool,
    pub stats_json_path: Option<PathBuf>,
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn http_timeout<F>(lookup: &F) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup("HTTP_TIMEOUT_SECS") {
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            Ok(_) => Err(ConfigError::Invalid {
                name: "HTTP_TIMEOUT_SECS",
                message: "must be greater than zero".to_string(),
            }),
            Err(e) => Err(ConfigError::Invalid {
                name: "HTTP_TIMEOUT_SECS",
                message: e.to_string(),
            }),
        },
        None => Ok(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)),
    }
}

fn optional<F>(lookup: &F, name: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl YouTubeConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(YouTubeConfig {
            api_key: required(lookup, "YOUTUBE_API_KEY")?,
            channel_id: required(lookup, "CHANNEL_ID")?,
            api_url: optional(lookup, "YOUTUBE_API_URL", DEFAULT_YOUTUBE_API_URL),
            timeout: http_timeout(lookup)?,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|name: &str| env::var(name).ok())
    }
}

impl SheetsConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(SheetsConfig {
            spreadsheet_id: required(lookup, "SPREADSHEET_ID")?,
            range: optional(lookup, "SHEET_RANGE", DEFAULT_SHEET_RANGE),
            client_email: required(lookup, "GOOGLE_CLIENT_EMAIL")?,
            private_key: unescape_private_key(&required(lookup, "GOOGLE_PRIVATE_KEY")?),
            api_url: optional(lookup, "SHEETS_API_URL", DEFAULT_SHEETS_API_URL),
            token_uri: optional(lookup, "GOOGLE_TOKEN_URI", DEFAULT_TOKEN_URI),
            timeout: http_timeout(lookup)?,
        })
    }
}

impl AppConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                message: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let collect_on_startup = match lookup("COLLECT_ON_STARTUP") {
            Some(raw) => raw.trim().parse::<bool>().map_err(|e| ConfigError::Invalid {
                name: "COLLECT_ON_STARTUP",
                message: e.to_string(),
            })?,
            None => true,
        };

        Ok(AppConfig {
            youtube: YouTubeConfig::from_lookup(&lookup)?,
            sheets: SheetsConfig::from_lookup(&lookup)?,
            port,
            collect_schedule: optional(&lookup, "COLLECT_SCHEDULE", DEFAULT_COLLECT_SCHEDULE),
            collect_on_startup,
            stats_json_path: lookup("STATS_JSON_PATH")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name: &str| env::var(name).ok())
    }
}

pub fn init_logger() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

pub fn create_stats_collector(config: &AppConfig) -> Result<StatsCollector> {
    let youtube = Arc::new(YouTubeClient::new(config.youtube.clone())?);
    let sheets = Arc::new(SheetsClient::new(config.sheets.clone())?);

    info!(
        "Collecting channel {} into spreadsheet {} ({})",
        config.youtube.channel_id, config.sheets.spreadsheet_id, config.sheets.range
    );

    Ok(StatsCollector::new(
        config.youtube.channel_id.clone(),
        youtube.clone(),
        youtube.clone(),
        youtube,
        sheets,
        config.stats_json_path.clone(),
    ))
}

pub fn create_app_state(config: &AppConfig) -> Result<AppState> {
    Ok(AppState {
        collector: Arc::new(create_stats_collector(config)?),
    })
}

/// Runs are fired without waiting for a previous one to finish.
pub async fn setup_collect_scheduler(
    collector: Arc<StatsCollector>,
    schedule: &str,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let collect_job = Job::new_async(schedule, move |_uuid, _l| {
        let collector = collector.clone();
        Box::pin(async move {
            info!("Scheduled collection triggered.");
            collector.collect(Utc::now()).await;
        })
    })?;

    scheduler.add(collect_job).await?;
    scheduler.start().await?;
    info!("Collection scheduler started ({schedule}, UTC).");

    Ok(scheduler)
}
