use reqwest::StatusCode;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("store url cannot carry a path: {0}")]
    InvalidBaseUrl(Url),
    #[error("name '{0}' cannot be addressed in a URL path")]
    UnaddressableName(String),
    #[error("HTTP status {0}: {1}")]
    HttpStatus(StatusCode, String),
    #[error("failed to decode response body: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Status code of the response that caused this error, if one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            StoreError::HttpStatus(status, _) => Some(*status),
            StoreError::Reqwest(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}
