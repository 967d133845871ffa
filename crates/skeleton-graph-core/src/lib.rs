//! Pixel-level foundation for skeleton graph extraction.
//!
//! This crate knows nothing about nodes or edges. It provides:
//! - [`PixelCoord`] and the 4/8-neighborhood predicates ([`Connectivity`]),
//! - the [`Island`] arena holding one connected pixel component,
//! - flood fill from binary views, predicates or coordinate lists,
//! - cleanup passes that repair common thinning artifacts.

mod binary;
mod cleanup;
mod connectivity;
mod flood_fill;
mod island;
mod logger;

pub use binary::{BinaryImage, BinaryImageView};
pub use cleanup::{
    cleanup_island, fill_single_holes, find_single_holes, is_orthogonal_stub, is_step_pixel,
    remove_steps, trim_orthogonal_stubs, CleanupParams, CleanupReport,
};
pub use connectivity::{Connectivity, PixelBounds, PixelCoord};
pub use flood_fill::{
    flood_fill_coords, flood_fill_predicate, flood_fill_view, FloodFillError, IslandList,
};
pub use island::{Island, IslandOrigin, NeighborTable, PixelId};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
