//! In-memory providers and loopback HTTP stubs for exercising the pipeline in tests.

use crate::error::ProviderError;
use crate::models::{ChannelStatistics, VideoMetric};
use crate::services::providers::{
    AppendOnlyLogSink, ChannelStatsProvider, VideoSearchProvider, VideoStatsProvider,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Throwaway RSA key for building a real `SheetsClient` in tests.
pub const TEST_PRIVATE_KEY: &str = include_str!("../../testdata/service_account_key.pem");

#[derive(Debug, Clone)]
pub struct FakeVideo {
    pub id: String,
    pub published_at: DateTime<Utc>,
    pub views: u64,
    pub likes: u64,
}

impl FakeVideo {
    pub fn new(id: &str, published_at: DateTime<Utc>, views: u64, likes: u64) -> Self {
        FakeVideo {
            id: id.to_string(),
            published_at,
            views,
            likes,
        }
    }
}

fn unavailable() -> ProviderError {
    ProviderError::Api {
        status: 503,
        message: "backend unavailable".to_string(),
    }
}

/// Plays the channel, search and video endpoints from a fixed video list.
#[derive(Default)]
pub struct FakeYouTube {
    subscribers: u64,
    channel_missing: bool,
    channel_fails: bool,
    statistics_fail: bool,
    videos: Vec<FakeVideo>,
    hidden_statistics: HashSet<String>,
    channel_calls: AtomicUsize,
    search_calls: AtomicUsize,
    batches: Mutex<Vec<Vec<String>>>,
}

impl FakeYouTube {
    pub fn new(subscribers: u64) -> Self {
        FakeYouTube {
            subscribers,
            ..Default::default()
        }
    }

    pub fn with_videos(mut self, videos: Vec<FakeVideo>) -> Self {
        self.videos = videos;
        self
    }

    pub fn without_channel(mut self) -> Self {
        self.channel_missing = true;
        self
    }

    pub fn failing_channel(mut self) -> Self {
        self.channel_fails = true;
        self
    }

    pub fn failing_statistics(mut self) -> Self {
        self.statistics_fail = true;
        self
    }

    pub fn without_statistics_for(mut self, id: &str) -> Self {
        self.hidden_statistics.insert(id.to_string());
        self
    }

    pub fn channel_calls(&self) -> usize {
        self.channel_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn requested_batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelStatsProvider for FakeYouTube {
    async fn channel_statistics(&self, channel_id: &str) -> Result<ChannelStatistics, ProviderError> {
        self.channel_calls.fetch_add(1, Ordering::SeqCst);
        if self.channel_fails {
            return Err(unavailable());
        }
        if self.channel_missing {
            return Err(ProviderError::NotFound(channel_id.to_string()));
        }
        Ok(ChannelStatistics {
            subscriber_count: self.subscribers,
        })
    }
}

#[async_trait]
impl VideoSearchProvider for FakeYouTube {
    async fn recent_video_ids(
        &self,
        _channel_id: &str,
        published_after: DateTime<Utc>,
        published_before: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<String>, ProviderError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);

        let mut matching: Vec<&FakeVideo> = self
            .videos
            .iter()
            .filter(|v| v.published_at >= published_after && v.published_at <= published_before)
            .collect();
        matching.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        Ok(matching
            .into_iter()
            .take(max_results as usize)
            .map(|v| v.id.clone())
            .collect())
    }
}

#[async_trait]
impl VideoStatsProvider for FakeYouTube {
    async fn video_statistics(
        &self,
        video_ids: &[String],
    ) -> Result<HashMap<String, VideoMetric>, ProviderError> {
        self.batches.lock().unwrap().push(video_ids.to_vec());
        if self.statistics_fail {
            return Err(unavailable());
        }

        Ok(self
            .videos
            .iter()
            .filter(|v| video_ids.contains(&v.id) && !self.hidden_statistics.contains(&v.id))
            .map(|v| {
                (
                    v.id.clone(),
                    VideoMetric {
                        id: v.id.clone(),
                        view_count: v.views,
                        like_count: v.likes,
                        published_at: Some(v.published_at),
                    },
                )
            })
            .collect())
    }
}

/// Records appended rows, or fails every append.
#[derive(Default)]
pub struct FakeSheet {
    fails: bool,
    rows: Mutex<Vec<Vec<Value>>>,
    attempts: AtomicUsize,
}

impl FakeSheet {
    pub fn failing() -> Self {
        FakeSheet {
            fails: true,
            ..Default::default()
        }
    }

    pub fn rows(&self) -> Vec<Vec<Value>> {
        self.rows.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AppendOnlyLogSink for FakeSheet {
    async fn append_row(&self, values: Vec<Value>) -> Result<(), ProviderError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fails {
            return Err(ProviderError::Api {
                status: 403,
                message: "The caller does not have permission".to_string(),
            });
        }
        self.rows.lock().unwrap().push(values);
        Ok(())
    }
}

/// Accepts connections and never answers. Returns its base url.
pub async fn hanging_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}

/// Answers every request with `body` as JSON and records each request target
/// (path and query). Returns its base url and the recorded targets.
pub async fn json_server(body: Value) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let targets = Arc::new(Mutex::new(Vec::new()));
    let recorded = targets.clone();
    let body = body.to_string();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => head.extend_from_slice(&buf[..n]),
                }
            }

            let head = String::from_utf8_lossy(&head);
            if let Some(target) = head.split_whitespace().nth(1) {
                recorded.lock().unwrap().push(target.to_string());
            }

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{addr}"), targets)
}
