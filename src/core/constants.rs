//! Core constants derived from classic WMS web-client defaults.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

use crate::core::bounds::Extent;

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Number of discrete zoom levels in the resolution ladder.
pub const DEFAULT_NUM_ZOOM_LEVELS: usize = 16;

/// Single-tile images cover the view scaled by this ratio.
pub const DEFAULT_SINGLE_TILE_RATIO: f64 = 1.5;

/// GetMap image format for opaque layers.
pub const DEFAULT_IMAGE_FORMAT: &str = "image/jpeg";

/// GetMap image format substituted for transparent layers.
pub const TRANSPARENT_IMAGE_FORMAT: &str = "image/png";

/// Coordinate reference system used when none is configured.
pub const DEFAULT_CRS: &str = "EPSG:4326";

/// Title shown for the imagery layer when none is configured.
pub const DEFAULT_LAYER_TITLE: &str = "WMS";

/// Whole-world extent in EPSG:4326 degrees.
pub const WORLD_EXTENT: Extent = Extent {
    min_x: -180.0,
    min_y: -90.0,
    max_x: 180.0,
    max_y: 90.0,
};

/// Pixels moved by one pan-zoom arrow click.
pub const PAN_SLIDE_FACTOR: f64 = 50.0;

/// Kinetic panning deceleration in px/ms².
pub const KINETIC_DECELERATION: f64 = 0.0035;

/// Kinetic panning animation step in milliseconds.
pub const KINETIC_INTERVAL_MS: f64 = 10.0;

/// Only drag samples this recent feed the release velocity.
pub const KINETIC_TIMEFRAME_MS: f64 = 100.0;

/// Release speeds above this (px/ms) are clamped before gliding.
pub const KINETIC_MAX_SPEED: f64 = 5.0;

/// Upper bound on the number of glide steps of one release.
pub const KINETIC_MAX_STEPS: usize = 500;

/// Separator between layer attributions.
pub const ATTRIBUTION_SEPARATOR: &str = ", ";

/// User agent for imagery fetches.
pub const USER_AGENT: &str = "wmsview/0.1";
