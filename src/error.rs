use crate::transport::error::TransportError;
use thiserror::Error;

/// Every failure surfaced by the client.
///
/// The three variants separate failures by what the caller should do about them:
///
/// * [`ZamgError::Transport`]: the round-trip to the service failed. Retrying later is safe.
/// * [`ZamgError::Data`]: the service answered but the payload did not have the expected
///   shape, or a requested parameter is not available. Retrying the same request will
///   usually fail again.
/// * [`ZamgError::Usage`]: the client was asked to do something that cannot work in its
///   current state (no default station, unknown station id, ...). Never caused by the network.
#[derive(Debug, Error)]
pub enum ZamgError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Usage(#[from] UsageError),
}

/// Coarse classification of a [`ZamgError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    Data,
    Usage,
}

impl ZamgError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ZamgError::Transport(_) => ErrorKind::Transport,
            ZamgError::Data(_) => ErrorKind::Data,
            ZamgError::Usage(_) => ErrorKind::Usage,
        }
    }

    /// Whether repeating the same call after a delay may succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("Failed to parse {what} payload")]
    Malformed {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Payload field '{field}' is empty")]
    Empty { field: &'static str },

    #[error("Invalid observation timestamp '{value}'")]
    InvalidTimestamp { value: String },

    #[error("Parameter '{parameter}' was requested but is missing from the response")]
    MissingParameter { parameter: String },

    #[error("Parameter '{parameter}' is not offered by the service")]
    UnknownParameter { parameter: String },

    #[error("No observations have been fetched for station '{station}'")]
    NoSnapshot { station: String },

    #[error("Parameter '{parameter}' is not part of the latest snapshot for station '{station}'")]
    ParameterNotInSnapshot { parameter: String, station: String },
}

#[derive(Debug, Error)]
pub enum UsageError {
    #[error("No station found near ({lat}, {lon})")]
    StationNotFound { lat: f64, lon: f64 },

    #[error("Station '{station}' is not known")]
    StationUnknown { station: String },

    #[error("No default station has been set")]
    NoDefaultStation,
}
