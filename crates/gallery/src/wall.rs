//! Randomized art wall
//!
//! The first load fetches the live asset listing once and caches it. Every
//! load shuffles the cached listing, takes `images_per_load` assets, fetches
//! their small renditions concurrently and appends the resulting tiles.
//! The cache mutex doubles as the loading guard: a load that finds another
//! one in flight returns `Load::InProgress` without touching the network.

use dam_client::{Asset, DamApi};
use rand::seq::SliceRandom;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::image::Tile;

/// Default number of images added per load.
pub const DEFAULT_IMAGES_PER_LOAD: usize = 30;

/// Outcome of `ArtWall::load_more`.
#[derive(Debug)]
pub enum Load {
    /// Tiles appended by this load, in wall order
    Appended(Vec<Tile>),
    /// Another load is running; nothing was requested
    InProgress,
}

pub struct ArtWall {
    api: DamApi,
    images_per_load: usize,
    library: Mutex<Option<Vec<Asset>>>,
    tiles: RwLock<Vec<Tile>>,
}

impl ArtWall {
    pub fn new(api: DamApi, images_per_load: usize) -> Result<Self> {
        if images_per_load == 0 {
            return Err(Error::Config("images_per_load must be > 0".into()));
        }
        Ok(Self {
            api,
            images_per_load,
            library: Mutex::new(None),
            tiles: RwLock::new(Vec::new()),
        })
    }

    /// Append the next random batch to the wall.
    pub async fn load_more(&self) -> Result<Load> {
        let Ok(mut library) = self.library.try_lock() else {
            debug!("wall load already in progress");
            return Ok(Load::InProgress);
        };

        if library.is_none() {
            let assets = self.api.list_assets().await?;
            info!(count = assets.len(), "asset library cached");
            *library = Some(assets);
        }
        let assets = library.as_deref().unwrap_or_default();

        let picks = pick(assets, self.images_per_load);
        let urls: Vec<&str> = picks.iter().map(|a| a.media.small.as_str()).collect();
        let blobs = self.api.fetch_images(&urls).await?;

        let batch: Vec<Tile> = picks
            .iter()
            .zip(&blobs)
            .map(|(asset, blob)| Tile::new(asset, blob))
            .collect();

        let mut tiles = self.tiles.write().await;
        tiles.extend(batch.iter().cloned());
        debug!(added = batch.len(), total = tiles.len(), "wall extended");
        Ok(Load::Appended(batch))
    }

    /// Every tile loaded so far.
    pub async fn tiles(&self) -> Vec<Tile> {
        self.tiles.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.tiles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop the cached listing and all tiles (used on sign-out).
    pub async fn reset(&self) {
        *self.library.lock().await = None;
        self.tiles.write().await.clear();
    }
}

/// Up to `count` distinct assets in random order.
fn pick(assets: &[Asset], count: usize) -> Vec<&Asset> {
    let mut picks: Vec<&Asset> = assets.iter().collect();
    picks.shuffle(&mut rand::rng());
    picks.truncate(count);
    picks
}
