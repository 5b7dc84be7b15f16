//! Common error types for Inkpress.

use thiserror::Error;

/// Top-level error type for Inkpress operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Authorization-code exchange with the OAuth2 provider failed.
    #[error("Authorization exchange failed: {0}")]
    AuthExchange(String),

    /// No delegated credential is available for publishing.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The document failed to settle within the load timeout.
    #[error("Render timed out: {0}")]
    RenderTimeout(String),

    /// Rendering failed for a reason other than the load timeout.
    #[error("Render failed: {0}")]
    Render(String),

    /// Remote storage rejected or failed the upload.
    #[error("Upload failed: {0}")]
    Upload(String),

    /// The renderer pool refused admission within the queue timeout.
    #[error("Renderer overloaded: {0}")]
    Overloaded(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Network operation failed.
    #[error("Network error: {0}")]
    Network(String),
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
