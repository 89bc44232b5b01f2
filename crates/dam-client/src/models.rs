//! Typed DAM payloads
//!
//! Every API response is an envelope `{"payload": ...}`. Decoding into these
//! records happens at the client boundary; a shape mismatch is reported as
//! `Error::MalformedResponse` instead of surfacing half-filled values.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub payload: T,
}

/// Payload of the asset listing endpoints. An empty category may omit
/// `assets` entirely.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetsPayload {
    #[serde(default)]
    pub assets: Vec<Asset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    pub media: Media,
}

impl Asset {
    /// Name shown to users: `name`, then `title`, then the id.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or(&self.id)
    }

    pub fn keywords(&self) -> &[String] {
        self.keywords.as_deref().unwrap_or_default()
    }
}

/// Rendition URLs of an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub small: String,
    pub large: String,
    #[serde(default)]
    pub thumb: Option<String>,
}

/// A folder (category) in the DAM tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
}
