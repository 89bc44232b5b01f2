//! Gallery views built on the DAM API
//!
//! - Art wall: a randomized, growing wall of images from the whole library
//! - Featured albums: artist rows of album covers with carousel paging
//! - Album pages and keyword search over asset metadata
//!
//! Images reach the view as `data:` URIs. Auth failures surface as
//! `Error::Dam` with `is_auth()` set; nothing here redirects.

pub mod albums;
pub mod carousel;
pub mod error;
pub mod image;
pub mod search;
pub mod wall;

#[cfg(test)]
mod test_support;

pub use albums::{
    Album, AlbumAsset, Artist, ArtistRow, album_assets, carousel_rows, featured_albums,
};
pub use carousel::{DEFAULT_PAGE_SIZE, Window};
pub use error::{Error, Result};
pub use image::{Tile, data_uri};
pub use search::filter_assets;
pub use wall::{ArtWall, DEFAULT_IMAGES_PER_LOAD, Load};
