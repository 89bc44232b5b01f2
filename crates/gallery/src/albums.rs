//! Featured albums and album contents
//!
//! The featured root folder's subfolders are artists; each artist's
//! subfolders are albums. Loading fans out per artist and per album, keeping
//! DAM order at both levels. An album's cover is its first asset's small
//! rendition; an album with no assets simply has no cover.

use dam_client::{DamApi, Folder};
use futures_util::future::try_join_all;
use serde::Serialize;
use tracing::debug;

use crate::carousel::Window;
use crate::error::{Error, Result};
use crate::image::data_uri;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub asset_count: usize,
    /// `data:` URI of the first asset's small rendition
    pub cover: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub albums: Vec<Album>,
}

/// An artist row with only its visible albums.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistRow {
    pub name: String,
    pub window: Window,
    pub albums: Vec<Album>,
}

/// Entry of an album page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlbumAsset {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub small_url: String,
    pub large_url: String,
}

pub async fn featured_albums(api: &DamApi, root_folder: &str) -> Result<Vec<Artist>> {
    let artists = api.subfolders(root_folder).await?;
    debug!(artists = artists.len(), "loading featured albums");
    try_join_all(artists.into_iter().map(|artist| load_artist(api, artist))).await
}

async fn load_artist(api: &DamApi, artist: Folder) -> Result<Artist> {
    let albums = api.subfolders(&artist.id).await?;
    let albums = try_join_all(albums.into_iter().map(|album| load_album(api, album))).await?;
    Ok(Artist {
        id: artist.id,
        name: artist.name,
        albums,
    })
}

async fn load_album(api: &DamApi, album: Folder) -> Result<Album> {
    let assets = api.category_assets(&album.id).await?;
    let cover = match assets.first() {
        Some(first) => Some(data_uri(&api.fetch_image(&first.media.small).await?)),
        None => None,
    };
    Ok(Album {
        id: album.id,
        name: album.name,
        asset_count: assets.len(),
        cover,
    })
}

/// Cut every artist's albums down to one carousel page.
///
/// Rows start at 0 except `focus = (artist_index, start)`, which moves one
/// row. A focus past the last artist is an error.
pub fn carousel_rows(
    artists: &[Artist],
    page_size: usize,
    focus: Option<(usize, usize)>,
) -> Result<Vec<ArtistRow>> {
    if page_size == 0 {
        return Err(Error::Config("carousel page size must be > 0".into()));
    }
    if let Some((index, _)) = focus {
        if index >= artists.len() {
            return Err(Error::ArtistOutOfRange {
                index,
                len: artists.len(),
            });
        }
    }

    Ok(artists
        .iter()
        .enumerate()
        .map(|(i, artist)| {
            let start = match focus {
                Some((index, start)) if index == i => start,
                _ => 0,
            };
            let window = Window::new(start, artist.albums.len(), page_size);
            ArtistRow {
                name: artist.name.clone(),
                window,
                albums: window.slice(&artist.albums).to_vec(),
            }
        })
        .collect())
}

/// Assets of one album, in DAM order.
pub async fn album_assets(api: &DamApi, album_id: &str) -> Result<Vec<AlbumAsset>> {
    let assets = api.category_assets(album_id).await?;
    Ok(assets
        .into_iter()
        .map(|asset| AlbumAsset {
            name: asset.display_name().to_string(),
            id: asset.id,
            description: asset.description,
            small_url: asset.media.small,
            large_url: asset.media.large,
        })
        .collect())
}
