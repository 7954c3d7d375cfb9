use thiserror::Error;

/// Everything that can go wrong while probing one endpoint.
///
/// None of these abort a run: the prober folds them into
/// [`ProbeResult`](crate::result::ProbeResult) fields so a report is always produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("timeout")]
    Timeout,

    #[error("connection error")]
    Connection,

    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("{0}")]
    JsonDecode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout
        } else if err.is_connect() {
            ProbeError::Connection
        } else {
            ProbeError::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProbeError {
    fn from(err: serde_json::Error) -> Self {
        ProbeError::JsonDecode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;
