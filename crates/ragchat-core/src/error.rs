use thiserror::Error;

/// Everything that can go wrong between submitting a question and holding
/// a decoded answer. The controller treats every variant the same way.
#[derive(Debug, Error)]
pub enum AskError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded with status {status}")]
    Status { status: reqwest::StatusCode },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

pub type AskResult<T> = std::result::Result<T, AskError>;
