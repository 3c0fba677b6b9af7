use thiserror::Error;

/// Failure modes of the device geolocation provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Geolocation provider unavailable: {0}")]
    Unavailable(String),

    #[error("Geolocation permission denied")]
    PermissionDenied,

    #[error("Timed out waiting for a location fix")]
    Timeout,
}

#[derive(Error, Debug)]
pub enum MarkError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] eyre::Report),
}

pub type MarkResult<T> = Result<T, MarkError>;
