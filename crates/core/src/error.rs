//! Error types.

use thiserror::Error;

/// Error returned by a host progress callback.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by the placement optimizers.
///
/// Degenerate geometry (non-positive container radius, circles larger than
/// the container) is not an error: such inputs simply never produce a valid
/// configuration and score as negative infinity.
#[derive(Debug, Error)]
pub enum Error {
    /// A search configuration is unusable (e.g. an empty population).
    #[error("invalid search configuration: {0}")]
    InvalidConfig(String),

    /// The progress callback failed and the run was aborted.
    #[error("progress callback failed: {0}")]
    Callback(#[source] CallbackError),
}

/// Result type alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
