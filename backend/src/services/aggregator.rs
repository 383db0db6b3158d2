use crate::error::{AggregationError, ProviderError};
use crate::models::ChannelSnapshot;
use crate::services::providers::{
    ChannelStatsProvider, VideoSearchProvider, VideoStatsProvider, MAX_SEARCH_RESULTS,
};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use std::collections::HashSet;
use std::sync::Arc;

/// Length of the trailing activity window.
pub const WINDOW_DAYS: i64 = 15;

/// Start of the window ending at `now`. Exact duration, not rounded to midnight.
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(WINDOW_DAYS)
}

/// Drop repeated ids, keeping the first occurrence.
fn unique_in_order(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

/// Builds one [`ChannelSnapshot`] from the channel, search and video providers.
///
/// Holds no state between runs, so overlapping calls are fine.
pub struct MetricsAggregator {
    channels: Arc<dyn ChannelStatsProvider>,
    search: Arc<dyn VideoSearchProvider>,
    videos: Arc<dyn VideoStatsProvider>,
}

impl MetricsAggregator {
    pub fn new(
        channels: Arc<dyn ChannelStatsProvider>,
        search: Arc<dyn VideoSearchProvider>,
        videos: Arc<dyn VideoStatsProvider>,
    ) -> Self {
        MetricsAggregator {
            channels,
            search,
            videos,
        }
    }

    pub async fn collect_snapshot(
        &self,
        channel_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ChannelSnapshot, AggregationError> {
        let channel = self
            .channels
            .channel_statistics(channel_id)
            .await
            .map_err(|e| match e {
                ProviderError::NotFound(id) => AggregationError::ChannelNotFound(id),
                other => AggregationError::Transport(other),
            })?;

        let since = window_start(now);
        // Single page only: videos past MAX_SEARCH_RESULTS in the window are not counted.
        let video_ids = self
            .search
            .recent_video_ids(channel_id, since, now, MAX_SEARCH_RESULTS)
            .await
            .map_err(AggregationError::Transport)?;
        let video_ids = unique_in_order(video_ids);

        info!(
            "Channel {channel_id}: {} subscribers, {} videos since {since}",
            channel.subscriber_count,
            video_ids.len()
        );

        let (views, likes) = if video_ids.is_empty() {
            (0, 0)
        } else {
            let metrics = self
                .videos
                .video_statistics(&video_ids)
                .await
                .map_err(AggregationError::Transport)?;

            video_ids.iter().fold((0u64, 0u64), |(views, likes), id| match metrics.get(id) {
                Some(metric) => {
                    debug!(
                        "Video {id}: {} views, {} likes, published {:?}",
                        metric.view_count, metric.like_count, metric.published_at
                    );
                    (
                        views.saturating_add(metric.view_count),
                        likes.saturating_add(metric.like_count),
                    )
                }
                None => {
                    debug!("Video {id} missing from statistics response, counting zero");
                    (views, likes)
                }
            })
        };

        Ok(ChannelSnapshot {
            total_subscribers: channel.subscriber_count,
            new_videos_last_15_days: video_ids.len() as u64,
            views_last_15_days: views,
            likes_last_15_days: likes,
            generated_at: now,
        })
    }
}
