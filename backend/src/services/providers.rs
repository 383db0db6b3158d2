//! Seams between the collection pipeline and the remote APIs it talks to.
//!
//! The HTTP clients in [`youtube_service`](super::youtube_service) and
//! [`sheets_service`](super::sheets_service) implement these; tests swap in
//! in-memory fakes.

use crate::error::ProviderError;
use crate::models::{ChannelStatistics, VideoMetric};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;

/// Largest page the video search endpoint returns in one call.
pub const MAX_SEARCH_RESULTS: u32 = 50;

#[async_trait]
pub trait ChannelStatsProvider: Send + Sync {
    /// Fails with [`ProviderError::NotFound`] when the channel does not exist.
    async fn channel_statistics(&self, channel_id: &str) -> Result<ChannelStatistics, ProviderError>;
}

#[async_trait]
pub trait VideoSearchProvider: Send + Sync {
    /// Ids of the channel's videos published in `[published_after, published_before]`,
    /// newest first. Only one page of at most `max_results` ids is returned.
    async fn recent_video_ids(
        &self,
        channel_id: &str,
        published_after: DateTime<Utc>,
        published_before: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<String>, ProviderError>;
}

#[async_trait]
pub trait VideoStatsProvider: Send + Sync {
    /// Statistics keyed by video id. Ids unknown to the provider are simply absent.
    async fn video_statistics(
        &self,
        video_ids: &[String],
    ) -> Result<HashMap<String, VideoMetric>, ProviderError>;
}

#[async_trait]
pub trait AppendOnlyLogSink: Send + Sync {
    /// Append one row to the configured target.
    async fn append_row(&self, values: Vec<Value>) -> Result<(), ProviderError>;
}
