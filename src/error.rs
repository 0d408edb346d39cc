use thiserror::Error;

/// Failure of a single API call. Never retried.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed with status: {0}")]
    Status(reqwest::StatusCode),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    MissingData(&'static str),
}

/// Why the host could not provide a position.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("geolocation is not supported")]
    Unsupported,
    #[error("permission denied")]
    Denied,
    #[error("position unavailable: {0}")]
    Unavailable(String),
    #[error("timed out")]
    Timeout,
}

#[derive(Debug, Error)]
#[error("unknown {kind} unit '{value}'")]
pub struct UnknownUnit {
    pub kind: &'static str,
    pub value: String,
}
