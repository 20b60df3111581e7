use std::time::Duration;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to set up the HTTP transport")]
    Connect(#[source] BoxError),

    #[error("Network request failed for {url}")]
    Request {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("Request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus { url: String, status: u16 },
}

impl TransportError {
    /// The HTTP status code, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
