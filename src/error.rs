//! Error types for the thumbnail export pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while composing or exporting a thumbnail
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to construct the pipeline (bad config, HTTP client build failure)
    #[error("Initialization failed: {0}")]
    InitializationError(String),

    /// A network fetch failed
    #[error("Network error: {0}")]
    NetworkError(String),

    /// An image source could not be decoded
    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    /// A single capture strategy failed (recoverable while other strategies remain)
    #[error("Capture failed: {0}")]
    CaptureError(String),

    /// Encoding the captured bitmap to the requested format failed
    #[error("Failed to encode output: {0}")]
    EncodeError(String),

    /// Writing the exported file failed
    #[error("Failed to write output file: {0}")]
    IoError(String),

    /// Every capture strategy was exhausted. This is the only error surfaced
    /// to the user; it carries the hint the editor shows in its alert.
    #[error("Export failed: {0}. Try enabling the image proxy or using a local image file instead.")]
    ExportFailed(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err.to_string())
    }
}
