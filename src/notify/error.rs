use reqwest::header::InvalidHeaderValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("slack api error: {0}")]
    Api(String),

    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    #[error("thread reply needs a parent message id")]
    MissingThread,

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid bot token: {0}")]
    InvalidToken(#[from] InvalidHeaderValue),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
