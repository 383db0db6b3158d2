use crate::config::YouTubeConfig;
use crate::error::ProviderError;
use crate::models::{ChannelStatistics, VideoMetric};
use crate::services::providers::{ChannelStatsProvider, VideoSearchProvider, VideoStatsProvider};
use crate::utils::{parse_count, parse_iso8601};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, warn};
use reqwest::{Client, Response};
use serde_json::Value;
use std::collections::HashMap;
use url::Url;

/// Client for the parts of the YouTube Data API v3 the collector needs.
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl YouTubeClient {
    pub fn new(config: YouTubeConfig) -> Result<Self, ProviderError> {
        let base_url = parse_base_url(&config.api_url)?;
        Ok(YouTubeClient {
            client: Client::builder().timeout(config.timeout).build()?,
            api_key: config.api_key,
            base_url,
        })
    }

    fn endpoint(&self, resource: &str) -> Result<Url, ProviderError> {
        self.base_url
            .join(resource)
            .map_err(|e| ProviderError::Malformed(format!("invalid endpoint {resource}: {e}")))
    }

    async fn get_json(&self, resource: &str, query: &[(&str, String)]) -> Result<Value, ProviderError> {
        let url = self.endpoint(resource)?;
        debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        read_json(response).await
    }
}

/// Base URLs need a trailing slash so `Url::join` appends instead of replacing.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ProviderError> {
    let normalized = format!("{}/", raw.trim_end_matches('/'));
    Url::parse(&normalized).map_err(|e| ProviderError::Malformed(format!("invalid base url {raw}: {e}")))
}

pub(crate) async fn read_json(response: Response) -> Result<Value, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message: api_error_message(&body),
        });
    }
    Ok(response.json::<Value>().await?)
}

/// Google APIs wrap failures as `{"error": {"message": ...}}`.
pub(crate) fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}

pub(crate) fn parse_channel_statistics(
    channel_id: &str,
    response: &Value,
) -> Result<ChannelStatistics, ProviderError> {
    let item = match response["items"].as_array().and_then(|items| items.first()) {
        Some(item) => item,
        None => return Err(ProviderError::NotFound(channel_id.to_string())),
    };

    Ok(ChannelStatistics {
        subscriber_count: parse_count(&item["statistics"]["subscriberCount"], "subscriberCount"),
    })
}

pub(crate) fn parse_search_video_ids(response: &Value) -> Result<Vec<String>, ProviderError> {
    let items = response["items"]
        .as_array()
        .ok_or_else(|| ProviderError::Malformed("search response has no items".to_string()))?;

    if let Some(token) = response["nextPageToken"].as_str() {
        warn!(
            "More videos than one page in the window (next page {token}); only the first {} are counted",
            items.len()
        );
    }

    Ok(items
        .iter()
        .filter_map(|item| item["id"]["videoId"].as_str())
        .map(String::from)
        .collect())
}

pub(crate) fn parse_video_statistics(response: &Value) -> Result<HashMap<String, VideoMetric>, ProviderError> {
    let items = response["items"]
        .as_array()
        .ok_or_else(|| ProviderError::Malformed("videos response has no items".to_string()))?;

    let mut metrics = HashMap::with_capacity(items.len());
    for item in items {
        let Some(id) = item["id"].as_str() else {
            warn!("Skipping video statistics entry without id");
            continue;
        };
        metrics.insert(
            id.to_string(),
            VideoMetric {
                id: id.to_string(),
                view_count: parse_count(&item["statistics"]["viewCount"], "viewCount"),
                like_count: parse_count(&item["statistics"]["likeCount"], "likeCount"),
                published_at: item["snippet"]["publishedAt"].as_str().and_then(parse_iso8601),
            },
        );
    }
    Ok(metrics)
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[async_trait]
impl ChannelStatsProvider for YouTubeClient {
    // Documentation: https://developers.google.com/youtube/v3/docs/channels/list
    async fn channel_statistics(&self, channel_id: &str) -> Result<ChannelStatistics, ProviderError> {
        let response = self
            .get_json(
                "channels",
                &[("part", "statistics".to_string()), ("id", channel_id.to_string())],
            )
            .await?;
        parse_channel_statistics(channel_id, &response)
    }
}

#[async_trait]
impl VideoSearchProvider for YouTubeClient {
    // Documentation: https://developers.google.com/youtube/v3/docs/search/list
    async fn recent_video_ids(
        &self,
        channel_id: &str,
        published_after: DateTime<Utc>,
        published_before: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<String>, ProviderError> {
        let response = self
            .get_json(
                "search",
                &[
                    ("part", "id".to_string()),
                    ("channelId", channel_id.to_string()),
                    ("order", "date".to_string()),
                    ("type", "video".to_string()),
                    ("publishedAfter", rfc3339(published_after)),
                    ("publishedBefore", rfc3339(published_before)),
                    ("maxResults", max_results.to_string()),
                ],
            )
            .await?;
        parse_search_video_ids(&response)
    }
}

#[async_trait]
impl VideoStatsProvider for YouTubeClient {
    // Documentation: https://developers.google.com/youtube/v3/docs/videos/list
    async fn video_statistics(
        &self,
        video_ids: &[String],
    ) -> Result<HashMap<String, VideoMetric>, ProviderError> {
        let response = self
            .get_json(
                "videos",
                &[
                    ("part", "snippet,statistics".to_string()),
                    ("id", video_ids.join(",")),
                ],
            )
            .await?;
        parse_video_statistics(&response)
    }
}
