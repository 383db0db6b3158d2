use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One aggregated measurement of a channel, produced per collection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSnapshot {
    pub total_subscribers: u64,
    pub new_videos_last_15_days: u64,
    pub views_last_15_days: u64,
    pub likes_last_15_days: u64,
    #[serde(rename = "dateGenerated")]
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelStatistics {
    pub subscriber_count: u64,
}

/// Per-video counters fetched for the current window. Dropped after aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetric {
    pub id: String,
    pub view_count: u64,
    pub like_count: u64,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
