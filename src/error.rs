//! Error types for collage composition, export and storage

use thiserror::Error;

/// Result type alias for collage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while composing, exporting or persisting collages
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid collage composition or caller input
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Reorder index outside the image sequence
    #[error("Index {index} out of range for {len} images")]
    IndexOutOfRange { index: usize, len: usize },

    /// Export was triggered without a collage view
    #[error("No collage container found to export")]
    NoContainerFound,

    /// An image did not become ready within the readiness window
    #[error("Image load timed out after {timeout_ms}ms: {src}")]
    LoadTimeout { src: String, timeout_ms: u64 },

    /// An image failed to load or decode
    #[error("Failed to load image {src}: {reason}")]
    LoadFailure { src: String, reason: String },

    /// Rasterization failed
    #[error("Capture failed: {0}")]
    CaptureFailure(String),

    /// The download sink rejected the artifact
    #[error("Delivery failed: {0}")]
    DeliveryFailure(String),

    /// Another export is still running
    #[error("An export is already in progress")]
    ExportInProgress,

    /// Persistence mechanism is missing or has shut down
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A storage transaction failed
    #[error("Storage transaction failed: {0}")]
    StorageTransaction(String),

    /// Image source request failed
    #[error("Network error{}: {body}", .status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    Network { status: Option<u16>, body: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// JSON encoding failed
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// True for failures caused by invalid caller input, including reorder bounds.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::IndexOutOfRange { .. })
    }

    /// True for readiness-barrier failures.
    pub fn is_load_error(&self) -> bool {
        matches!(self, Error::LoadTimeout { .. } | Error::LoadFailure { .. })
    }

    /// True for persistence failures.
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::StorageUnavailable(_) | Error::StorageTransaction(_))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref e, _)
                if e.code == rusqlite::ErrorCode::CannotOpen
                    || e.code == rusqlite::ErrorCode::NotADatabase =>
            {
                Error::StorageUnavailable(err.to_string())
            }
            other => Error::StorageTransaction(other.to_string()),
        }
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network {
            status: err.status().map(|s| s.as_u16()),
            body: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_out_of_range_is_validation() {
        let e = Error::IndexOutOfRange { index: 5, len: 3 };
        assert!(e.is_validation());
        assert_eq!(e.to_string(), "Index 5 out of range for 3 images");
    }

    #[test]
    fn network_error_display_includes_status() {
        let e = Error::Network { status: Some(401), body: "unauthorized".into() };
        assert_eq!(e.to_string(), "Network error (401): unauthorized");
        let e = Error::Network { status: None, body: "connection refused".into() };
        assert_eq!(e.to_string(), "Network error: connection refused");
    }

    #[test]
    fn storage_classification() {
        assert!(Error::StorageUnavailable("gone".into()).is_storage_error());
        assert!(!Error::NoContainerFound.is_storage_error());
        assert!(Error::LoadTimeout { src: "a".into(), timeout_ms: 1 }.is_load_error());
    }
}
