//! Error types for the token lifecycle

/// Errors from authorization, token exchange and token storage.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("token exchange failed: {0}")]
    AuthExchange(String),

    #[error("malformed stored token: {0}")]
    MalformedToken(String),

    #[error("no access token stored")]
    Missing,

    #[error("access token expired at {expires_at_ms}")]
    Expired { expires_at_ms: u64 },

    #[error("invalid auth configuration: {0}")]
    Config(String),

    #[error("token slot I/O error: {0}")]
    Io(String),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
