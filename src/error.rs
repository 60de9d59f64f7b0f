//! Error types for rs-patterns.
//!
//! A detection run either completes with a (possibly empty) report or fails
//! as a whole with one of these errors. Finding no patterns is not an error.

/// Error type for detection operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The supplied options are out of range or contradictory.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// The detection run failed part-way; no partial results are returned.
    #[error("Detection failed: {0}")]
    DetectionFailed(String),
}

/// Result type alias for detection operations.
pub type Result<T> = std::result::Result<T, Error>;
