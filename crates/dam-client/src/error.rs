//! Error types for authenticated DAM requests

use dam_auth::InvalidationCause;

/// Errors from DAM API and asset requests.
///
/// `SessionInvalidated` means the request was never sent; `Unauthorized`
/// means it was sent and rejected. Both have already invalidated the
/// token store by the time the caller sees them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no usable session ({}), request not sent", .0.label())]
    SessionInvalidated(InvalidationCause),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl Error {
    /// Whether the failure ended the session (caller should send the user
    /// back through sign-in rather than show a load error).
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::SessionInvalidated(_) | Error::Unauthorized(_))
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::SessionInvalidated(_) => "session_invalidated",
            Error::Unauthorized(_) => "unauthorized",
            Error::Network(_) => "network",
            Error::Status { .. } => "status",
            Error::MalformedResponse(_) => "malformed_response",
            Error::InvalidRequest(_) => "invalid_request",
            Error::Config(_) => "config",
        }
    }
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_are_flagged() {
        assert!(Error::SessionInvalidated(InvalidationCause::Missing).is_auth());
        assert!(Error::Unauthorized("401".into()).is_auth());
        assert!(!Error::Network("timeout".into()).is_auth());
        assert!(
            !Error::Status {
                status: 500,
                body: String::new()
            }
            .is_auth()
        );
    }

    #[test]
    fn session_invalidated_display_names_cause() {
        let err = Error::SessionInvalidated(InvalidationCause::Expired);
        assert_eq!(err.to_string(), "no usable session (expired), request not sent");
    }
}
