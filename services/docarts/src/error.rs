//! Service-specific error types
//!
//! Every route failure is folded into `Error` and rendered by
//! `routes::error_response`. Session loss is not an error page: the route
//! layer turns it into a redirect to the home URL.

use axum::http::StatusCode;
use dam_client::Error as DamError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The token is gone; the user must sign in again
    #[error("session ended: {0}")]
    Session(String),

    #[error("sign-in failed: {0}")]
    SignIn(String),

    /// DAM call failed (network, status, malformed payload)
    #[error("failed to load: {0}")]
    Upstream(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Session(_) => StatusCode::UNAUTHORIZED,
            Error::SignIn(_) | Error::Upstream(_) => StatusCode::BAD_GATEWAY,
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// `error.type` in JSON error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Session(_) => "session_ended",
            Error::SignIn(_) => "sign_in_failed",
            Error::Upstream(_) => "upstream_error",
            Error::InvalidRequest(_) => "invalid_request",
            Error::NotFound(_) => "not_found",
            Error::Internal(_) => "internal_error",
        }
    }
}

impl From<DamError> for Error {
    fn from(err: DamError) -> Self {
        match err {
            e if e.is_auth() => Error::Session(e.to_string()),
            DamError::InvalidRequest(msg) => Error::InvalidRequest(msg),
            DamError::Config(msg) => Error::Internal(msg),
            e => Error::Upstream(e.to_string()),
        }
    }
}

impl From<gallery::Error> for Error {
    fn from(err: gallery::Error) -> Self {
        match err {
            gallery::Error::Dam(e) => e.into(),
            e @ gallery::Error::ArtistOutOfRange { .. } => Error::NotFound(e.to_string()),
            gallery::Error::Config(msg) => Error::Internal(msg),
        }
    }
}

impl From<dam_auth::Error> for Error {
    fn from(err: dam_auth::Error) -> Self {
        match err {
            e @ (dam_auth::Error::AuthExchange(_) | dam_auth::Error::Http(_)) => {
                Error::SignIn(e.to_string())
            }
            e => Error::Internal(e.to_string()),
        }
    }
}

/// Result alias using service Error
pub type Result<T> = std::result::Result<T, Error>;
