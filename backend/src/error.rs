use thiserror::Error;

/// Failure reported by one of the remote providers (YouTube or Sheets).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested resource has no matching remote record.
    #[error("not found: {0}")]
    NotFound(String),

    /// Network or HTTP-level failure from reqwest.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("api returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Service-account authentication failed.
    #[error("authentication error: {0}")]
    Auth(String),
}

/// Errors that abort a collection run before a snapshot exists.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    #[error("transport error: {0}")]
    Transport(#[source] ProviderError),
}

/// Errors raised while persisting a snapshot. Never fatal to a run.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to append row: {0}")]
    Append(#[from] ProviderError),

    #[error("failed to write snapshot file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable must be set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },
}
