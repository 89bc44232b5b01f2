//! Typed DAM operations on top of the JSON and binary clients

use futures_util::future::try_join_all;
use tracing::debug;

use crate::client::{Blob, DamClient};
use crate::error::{Error, Result};
use crate::models::{Asset, AssetsPayload, Envelope, Folder};

/// Listing path for the full asset library.
pub const ASSETS_PATH: &str = "assets?includeSoftDeleted=false";

#[derive(Clone)]
pub struct DamApi {
    json: DamClient,
    binary: DamClient,
}

impl DamApi {
    pub fn new(json: DamClient, binary: DamClient) -> Self {
        Self { json, binary }
    }

    /// All live assets, in payload order.
    pub async fn list_assets(&self) -> Result<Vec<Asset>> {
        let envelope: Envelope<AssetsPayload> = self.json.get_json(ASSETS_PATH).await?;
        Ok(envelope.payload.assets)
    }

    pub async fn category_assets(&self, category_id: &str) -> Result<Vec<Asset>> {
        let id = path_segment(category_id)?;
        let envelope: Envelope<AssetsPayload> = self
            .json
            .get_json(&format!("categories/{id}/assets"))
            .await?;
        Ok(envelope.payload.assets)
    }

    pub async fn subfolders(&self, folder_id: &str) -> Result<Vec<Folder>> {
        let id = path_segment(folder_id)?;
        let envelope: Envelope<Vec<Folder>> = self
            .json
            .get_json(&format!("folders/{id}/subfolders"))
            .await?;
        Ok(envelope.payload)
    }

    pub async fn fetch_image(&self, url: &str) -> Result<Blob> {
        if url.trim().is_empty() {
            return Err(Error::InvalidRequest("empty image URL".into()));
        }
        self.binary.get_bytes(url).await
    }

    /// Fetch every URL concurrently. The result is ordered like `urls`; the
    /// first failure fails the whole batch.
    pub async fn fetch_images<S: AsRef<str>>(&self, urls: &[S]) -> Result<Vec<Blob>> {
        debug!(count = urls.len(), "fetching images");
        try_join_all(urls.iter().map(|url| self.fetch_image(url.as_ref()))).await
    }
}

/// Ids are interpolated into the request path, so they must stay one
/// segment. Dot segments are refused; everything else is percent-encoded.
fn path_segment(id: &str) -> Result<String> {
    let id = id.trim();
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '?', '#']) {
        return Err(Error::InvalidRequest(format!("invalid id: {id:?}")));
    }
    Ok(urlencoding::encode(id).into_owned())
}
