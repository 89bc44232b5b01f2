//! Error types for gallery views

/// Errors from building gallery views.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Dam(#[from] dam_client::Error),

    #[error("artist index {index} out of range ({len} artists)")]
    ArtistOutOfRange { index: usize, len: usize },

    #[error("invalid gallery setting: {0}")]
    Config(String),
}

impl Error {
    /// True when the session is gone and the caller should restart the
    /// authorization flow.
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Dam(e) if e.is_auth())
    }
}

/// Result alias for gallery operations.
pub type Result<T> = std::result::Result<T, Error>;
