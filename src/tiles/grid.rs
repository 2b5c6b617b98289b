//! Request planning: which images cover the current view.
//!
//! A layer either asks for one image slightly larger than the view
//! (single-tile) or for a grid of fixed-size tiles anchored at the lower-left
//! corner of its max extent.

use crate::core::{
    bounds::Extent,
    geo::{Point, Size},
};
use serde::{Deserialize, Serialize};

/// How a layer splits the view into image requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TilingMode {
    /// One image per layer per refresh
    SingleTile,
    /// A grid of `tile_size` square images
    #[default]
    Tiled,
}

impl std::fmt::Display for TilingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TilingMode::SingleTile => write!(f, "single-tile"),
            TilingMode::Tiled => write!(f, "tiled"),
        }
    }
}

/// Position of a tile in the grid; rows count upward from the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub col: i64,
    pub row: i64,
    /// Ladder level closest to the planning resolution. After a fitted zoom
    /// the cell extent follows `ImageRequest::resolution`, not this level.
    pub level: usize,
}

/// A single GetMap image the host should fetch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRequest {
    pub layer_id: String,
    pub url: String,
    /// Region covered by the image, in map units
    pub extent: Extent,
    pub width: u32,
    pub height: u32,
    /// Map units per pixel of the image
    pub resolution: f64,
    /// Grid position for tiled layers
    pub cell: Option<GridCell>,
}

/// Regular tile grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGrid {
    pub origin: Point,
    pub tile_size: u32,
}

impl TileGrid {
    pub fn new(origin: Point, tile_size: u32) -> Self {
        Self {
            origin,
            tile_size: tile_size.max(1),
        }
    }

    /// Grid anchored at the lower-left corner of `extent`
    pub fn for_extent(extent: &Extent, tile_size: u32) -> Self {
        Self::new(Point::new(extent.min_x, extent.min_y), tile_size)
    }

    /// Width of one tile in map units
    pub fn tile_span(&self, resolution: f64) -> f64 {
        self.tile_size as f64 * resolution
    }

    /// Extent of a cell at `resolution`
    pub fn cell_extent(&self, col: i64, row: i64, resolution: f64) -> Extent {
        let span = self.tile_span(resolution);
        let min_x = self.origin.x + col as f64 * span;
        let min_y = self.origin.y + row as f64 * span;
        Extent::new(min_x, min_y, min_x + span, min_y + span)
    }

    /// Cells covering `view`, top row first and left to right.
    ///
    /// Cells that do not overlap `limit` are skipped.
    pub fn cells_for(
        &self,
        view: &Extent,
        resolution: f64,
        level: usize,
        limit: Option<&Extent>,
    ) -> Vec<(GridCell, Extent)> {
        let span = self.tile_span(resolution);
        if !span.is_finite() || span <= 0.0 || !view.is_finite() {
            return Vec::new();
        }

        let col_min = ((view.min_x - self.origin.x) / span).floor() as i64;
        let col_max = ((view.max_x - self.origin.x) / span).ceil() as i64 - 1;
        let row_min = ((view.min_y - self.origin.y) / span).floor() as i64;
        let row_max = ((view.max_y - self.origin.y) / span).ceil() as i64 - 1;

        let mut cells = Vec::new();
        for row in (row_min..=row_max).rev() {
            for col in col_min..=col_max {
                let extent = self.cell_extent(col, row, resolution);
                if limit.is_some_and(|limit| !limit.intersects(&extent)) {
                    continue;
                }
                cells.push((GridCell { col, row, level }, extent));
            }
        }
        cells
    }
}

/// Extent and pixel size of the single image covering `view`
pub fn single_tile_frame(view: &Extent, view_size: Size, ratio: f64) -> (Extent, u32, u32) {
    let ratio = ratio.max(1.0);
    let (width, height) = view_size.scaled(ratio).to_pixels();
    (view.scaled(ratio), width, height)
}
