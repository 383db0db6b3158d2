use crate::error::SinkError;
use crate::models::ChannelSnapshot;
use crate::services::providers::AppendOnlyLogSink;
use crate::utils::{format_sheet_date, format_sheet_time};
use chrono::{Local, TimeZone};
use log::info;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

/// Cells of one stats row: date, time, subscribers, new videos, views, likes.
pub fn snapshot_row<Tz: TimeZone>(snapshot: &ChannelSnapshot, tz: &Tz) -> Vec<Value>
where
    Tz::Offset: std::fmt::Display,
{
    let at = snapshot.generated_at.with_timezone(tz);
    vec![
        json!(format_sheet_date(&at)),
        json!(format_sheet_time(&at)),
        json!(snapshot.total_subscribers),
        json!(snapshot.new_videos_last_15_days),
        json!(snapshot.views_last_15_days),
        json!(snapshot.likes_last_15_days),
    ]
}

/// Persists snapshots as rows of the append-only stats sheet.
pub struct SnapshotSink {
    log: Arc<dyn AppendOnlyLogSink>,
}

impl SnapshotSink {
    pub fn new(log: Arc<dyn AppendOnlyLogSink>) -> Self {
        SnapshotSink { log }
    }

    pub async fn append(&self, snapshot: &ChannelSnapshot) -> Result<(), SinkError> {
        let row = snapshot_row(snapshot, &Local);
        self.log.append_row(row).await?;
        Ok(())
    }
}

/// Overwrite `path` with the snapshot as pretty-printed JSON.
pub async fn write_snapshot_file(path: &Path, snapshot: &ChannelSnapshot) -> Result<(), SinkError> {
    let body = serde_json::to_string_pretty(snapshot)?;
    tokio::fs::write(path, body).await?;
    info!("Snapshot saved to {}", path.display());
    Ok(())
}

pub fn log_snapshot_report(channel_id: &str, snapshot: &ChannelSnapshot) {
    info!("Channel statistics for {channel_id}:");
    info!("  Total subscribers:           {}", snapshot.total_subscribers);
    info!("  New videos (last 15 days):   {}", snapshot.new_videos_last_15_days);
    info!("  Total views (last 15 days):  {}", snapshot.views_last_15_days);
    info!("  Total likes (last 15 days):  {}", snapshot.likes_last_15_days);
}
