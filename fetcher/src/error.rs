use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("could not read {url} as HTML or text: {reason}")]
    Parse { url: String, reason: String },
    #[error("{url} is not an image (content type {content_type})")]
    NotAnImage { url: String, content_type: String },
}

impl FetchError {
    /// Short machine-readable name, used in API error bodies and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::InvalidUrl { .. } => "invalid_url",
            FetchError::Client(_) => "client",
            FetchError::Timeout { .. } => "timeout",
            FetchError::Network { .. } => "network",
            FetchError::Status { .. } => "status",
            FetchError::Parse { .. } => "parse",
            FetchError::NotAnImage { .. } => "not_an_image",
        }
    }

    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout { url: url.to_string() }
        } else {
            FetchError::Network { url: url.to_string(), source: err }
        }
    }
}

/// Failure of one image fetch. Never aborts the other images or the page.
#[derive(Debug, Error)]
#[error("could not fetch image {url}: {source}")]
pub struct ImageFetchError {
    pub url: String,
    #[source]
    pub source: FetchError,
}
