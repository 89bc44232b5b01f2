//! Image payloads handed to views

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dam_client::{Asset, Blob};
use serde::Serialize;

/// Content type used when the DAM omits one.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Encode fetched bytes as a `data:` URI the view can embed directly.
pub fn data_uri(blob: &Blob) -> String {
    let content_type = blob
        .content_type
        .as_deref()
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim())
        .filter(|ct| !ct.is_empty())
        .unwrap_or(FALLBACK_CONTENT_TYPE);
    format!("data:{content_type};base64,{}", STANDARD.encode(&blob.bytes))
}

/// One tile on the wall or in an album, with the metadata shown on the
/// back of the card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tile {
    pub asset_id: String,
    pub name: String,
    pub description: Option<String>,
    pub large_url: String,
    pub image: String,
}

impl Tile {
    pub fn new(asset: &Asset, blob: &Blob) -> Self {
        Self {
            asset_id: asset.id.clone(),
            name: asset.display_name().to_string(),
            description: asset.description.clone(),
            large_url: asset.media.large.clone(),
            image: data_uri(blob),
        }
    }
}
