//! Shared types for the DocArts workspace

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
