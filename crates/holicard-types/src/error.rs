use thiserror::Error;

/// Errors from repository operations (used by trait definitions in holicard-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

/// Errors from image search backends.
///
/// Never surfaced to users: the image lookup turns every variant into an
/// empty result.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image search credentials are not configured")]
    MissingCredentials,

    #[error("image search rate limited")]
    RateLimited,

    #[error("image search timed out")]
    Timeout,

    #[error("image search returned status {0}")]
    Status(u16),

    #[error("image search request failed: {0}")]
    Request(String),

    #[error("invalid image search response: {0}")]
    Deserialization(String),
}

/// Errors from chat transports.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport request failed: {0}")]
    Request(String),

    #[error("transport rejected the call: {0}")]
    Rejected(String),

    #[error("invalid transport response: {0}")]
    Deserialization(String),

    #[error("transport closed")]
    Closed,
}
