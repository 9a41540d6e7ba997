use thiserror::Error;

/// Errors surfaced by wishlist mutations.
///
/// A failed mutation leaves the aggregate exactly as it was before the call;
/// none of these are retried internally.
#[derive(Debug, Error)]
pub enum WishlistError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("wishlist not found")]
    NotFound,

    #[error("wishlist belongs to another user")]
    Forbidden,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
