use crate::models::ChannelSnapshot;
use crate::services::aggregator::MetricsAggregator;
use crate::services::providers::{
    AppendOnlyLogSink, ChannelStatsProvider, VideoSearchProvider, VideoStatsProvider,
};
use crate::services::sink::{log_snapshot_report, write_snapshot_file, SnapshotSink};
use chrono::{DateTime, Utc};
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;

/// One collection run: aggregate, persist, hand the snapshot back.
pub struct StatsCollector {
    channel_id: String,
    aggregator: MetricsAggregator,
    sink: SnapshotSink,
    snapshot_path: Option<PathBuf>,
}

impl StatsCollector {
    pub fn new(
        channel_id: String,
        channels: Arc<dyn ChannelStatsProvider>,
        search: Arc<dyn VideoSearchProvider>,
        videos: Arc<dyn VideoStatsProvider>,
        log: Arc<dyn AppendOnlyLogSink>,
        snapshot_path: Option<PathBuf>,
    ) -> Self {
        StatsCollector {
            channel_id,
            aggregator: MetricsAggregator::new(channels, search, videos),
            sink: SnapshotSink::new(log),
            snapshot_path,
        }
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Returns `None` when aggregation failed. Persistence failures are logged
    /// and do not affect the returned snapshot.
    pub async fn collect(&self, now: DateTime<Utc>) -> Option<ChannelSnapshot> {
        info!("Starting stats collection for channel {}...", self.channel_id);

        let snapshot = match self.aggregator.collect_snapshot(&self.channel_id, now).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Stats collection failed for channel {}: {e}", self.channel_id);
                return None;
            }
        };
        log_snapshot_report(&self.channel_id, &snapshot);

        match self.sink.append(&snapshot).await {
            Ok(()) => info!("Snapshot appended to the stats sheet."),
            Err(e) => error!("Failed to append snapshot to the stats sheet: {e}"),
        }

        if let Some(path) = &self.snapshot_path {
            if let Err(e) = write_snapshot_file(path, &snapshot).await {
                error!("Failed to save snapshot to {}: {e}", path.display());
            }
        }

        Some(snapshot)
    }
}
