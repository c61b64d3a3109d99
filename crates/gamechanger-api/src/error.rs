use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP {status} from {url}")]
    UnexpectedStatus { status: StatusCode, url: String },
}

impl ApiError {
    /// True when the API answered, but outside the success allow-list.
    ///
    /// The video endpoints use this to report an event with no streams (or no
    /// permission to view them), which callers treat as a re-prompt rather
    /// than a failure.
    pub fn is_unexpected_status(&self) -> bool {
        matches!(self, Self::UnexpectedStatus { .. })
    }
}
