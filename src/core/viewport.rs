use crate::core::{
    bounds::Extent,
    constants::{DEFAULT_NUM_ZOOM_LEVELS, TILE_SIZE, WORLD_EXTENT},
    geo::{Point, Size},
};
use serde::{Deserialize, Serialize};

/// Manages the current view of the map: center, resolution, and screen dimensions
///
/// Zoom levels index a ladder of resolutions (map units per pixel) derived
/// from the max extent: level 0 fits the whole extent into one tile, each
/// deeper level halves the resolution. The current resolution may sit
/// between ladder entries after a fitted zoom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the view in map units
    pub center: Point,
    /// The size of the view in pixels
    pub size: Size,
    /// Map units per pixel
    resolution: f64,
    /// Full extent the view may show
    max_extent: Extent,
    /// Resolution per discrete zoom level, coarsest first
    resolutions: Vec<f64>,
    tile_size: u32,
}

impl Viewport {
    /// Creates a new viewport showing `max_extent` at zoom level 0
    pub fn new(max_extent: Extent, size: Size, tile_size: u32, num_zoom_levels: usize) -> Self {
        let resolutions = Self::resolutions_for(&max_extent, tile_size, num_zoom_levels);
        Self {
            center: max_extent.center(),
            size,
            resolution: resolutions[0],
            max_extent,
            resolutions,
            tile_size: tile_size.max(1),
        }
    }

    /// Builds the resolution ladder for an extent
    pub fn resolutions_for(extent: &Extent, tile_size: u32, num_zoom_levels: usize) -> Vec<f64> {
        let tile_size = tile_size.max(1) as f64;
        let max_resolution = (extent.width() / tile_size).max(extent.height() / tile_size);
        (0..num_zoom_levels.max(1))
            .map(|level| max_resolution / 2_f64.powi(level as i32))
            .collect()
    }

    /// Replaces the max extent and rebuilds the ladder
    pub fn set_max_extent(&mut self, max_extent: Extent) {
        self.resolutions =
            Self::resolutions_for(&max_extent, self.tile_size, self.resolutions.len());
        self.max_extent = max_extent;
        self.set_resolution(self.resolution);
        self.set_center(self.center);
    }

    pub fn max_extent(&self) -> &Extent {
        &self.max_extent
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Map units per pixel
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn resolutions(&self) -> &[f64] {
        &self.resolutions
    }

    pub fn num_zoom_levels(&self) -> usize {
        self.resolutions.len()
    }

    pub fn max_resolution(&self) -> f64 {
        self.resolutions[0]
    }

    pub fn min_resolution(&self) -> f64 {
        self.resolutions[self.resolutions.len() - 1]
    }

    /// Continuous zoom: 0 at the coarsest resolution, +1 per halving
    pub fn zoom(&self) -> f64 {
        (self.max_resolution() / self.resolution).log2()
    }

    /// Ladder level closest to the current resolution
    pub fn zoom_level(&self) -> usize {
        self.zoom_for_resolution(self.resolution, true)
    }

    /// Resolution of a ladder level, clamped to the deepest level
    pub fn resolution_for_zoom(&self, level: usize) -> f64 {
        self.resolutions[level.min(self.resolutions.len() - 1)]
    }

    /// Ladder level for a resolution.
    ///
    /// With `closest` the nearest entry wins; otherwise the deepest level whose
    /// resolution is still at least `resolution`, so nothing gets cropped.
    pub fn zoom_for_resolution(&self, resolution: f64, closest: bool) -> usize {
        if closest {
            let mut best = 0;
            let mut best_diff = f64::INFINITY;
            for (level, candidate) in self.resolutions.iter().enumerate() {
                let diff = (candidate - resolution).abs();
                if diff < best_diff {
                    best = level;
                    best_diff = diff;
                }
            }
            best
        } else {
            let tolerance = resolution * 1e-12;
            let mut best = 0;
            for (level, candidate) in self.resolutions.iter().enumerate() {
                if *candidate + tolerance >= resolution {
                    best = level;
                } else {
                    break;
                }
            }
            best
        }
    }

    /// Resolution at which `extent` exactly fits the view on its constraining axis
    pub fn ideal_resolution(&self, extent: &Extent) -> f64 {
        (extent.width() / self.size.width).max(extent.height() / self.size.height)
    }

    /// Ladder level at which `extent` is fully visible
    pub fn zoom_for_extent(&self, extent: &Extent, closest: bool) -> usize {
        self.zoom_for_resolution(self.ideal_resolution(extent), closest)
    }

    /// Sets the center, keeping it inside the max extent
    pub fn set_center(&mut self, center: Point) {
        self.center = self.max_extent.clamp(&center);
    }

    /// Sets the resolution, clamping to the ladder range
    pub fn set_resolution(&mut self, resolution: f64) {
        if !resolution.is_finite() || resolution <= 0.0 {
            log::warn!("ignoring invalid resolution {}", resolution);
            return;
        }
        self.resolution = resolution.clamp(self.min_resolution(), self.max_resolution());
    }

    /// Sets the viewport size
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Currently visible region in map units
    pub fn extent(&self) -> Extent {
        Extent::from_view(self.center, self.size, self.resolution)
    }

    /// Converts a container pixel to map coordinates
    pub fn pixel_to_map(&self, pixel: &Point) -> Point {
        let offset = pixel.subtract(&self.size.center());
        Point::new(
            self.center.x + offset.x * self.resolution,
            self.center.y - offset.y * self.resolution,
        )
    }

    /// Converts map coordinates to a container pixel
    pub fn map_to_pixel(&self, point: &Point) -> Point {
        let half = self.size.center();
        Point::new(
            half.x + (point.x - self.center.x) / self.resolution,
            half.y - (point.y - self.center.y) / self.resolution,
        )
    }

    /// Moves the view by a pixel offset: +x pans east, +y pans south
    pub fn pan_by(&mut self, pixels: Point) {
        let center = Point::new(
            self.center.x + pixels.x * self.resolution,
            self.center.y - pixels.y * self.resolution,
        );
        self.set_center(center);
    }

    /// Zooms to a ladder level, keeping the map point under `focus` in place
    pub fn zoom_to_level(&mut self, level: usize, focus: Option<Point>) {
        let resolution = self.resolution_for_zoom(level);

        match focus {
            Some(focus) => {
                let anchor = self.pixel_to_map(&focus);
                self.set_resolution(resolution);
                let offset = focus.subtract(&self.size.center());
                self.set_center(Point::new(
                    anchor.x - offset.x * self.resolution,
                    anchor.y + offset.y * self.resolution,
                ));
            }
            None => self.set_resolution(resolution),
        }
    }

    /// True when a fitted zoom left the view coarser than ladder level 0
    pub fn is_beyond_ladder(&self) -> bool {
        self.resolution > self.max_resolution()
    }

    pub fn zoom_in(&mut self, focus: Option<Point>) {
        let level = if self.is_beyond_ladder() {
            0
        } else {
            (self.zoom_level() + 1).min(self.num_zoom_levels() - 1)
        };
        self.zoom_to_level(level, focus);
    }

    pub fn zoom_out(&mut self, focus: Option<Point>) {
        if self.is_beyond_ladder() {
            return;
        }
        let level = self.zoom_level().saturating_sub(1);
        self.zoom_to_level(level, focus);
    }

    /// Centers on `extent` and zooms so it is fully visible.
    ///
    /// With `fit` the resolution is exactly the ideal one, even when that is
    /// coarser than ladder level 0; otherwise it snaps to the deepest ladder
    /// level that still shows the whole extent.
    pub fn zoom_to_extent(&mut self, extent: &Extent, fit: bool) {
        self.set_center(extent.center());
        if fit {
            // Small containers may need a coarser resolution than level 0
            let resolution = self.ideal_resolution(extent);
            if resolution.is_finite() && resolution > 0.0 {
                self.resolution = resolution.max(self.min_resolution());
            }
        } else {
            self.set_resolution(self.resolution_for_zoom(self.zoom_for_extent(extent, false)));
        }
    }

    /// Fits the whole max extent into the view
    pub fn zoom_to_max_extent(&mut self) {
        let max_extent = self.max_extent;
        self.zoom_to_extent(&max_extent, true);
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(
            WORLD_EXTENT,
            Size::default(),
            TILE_SIZE,
            DEFAULT_NUM_ZOOM_LEVELS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(width: f64, height: f64) -> Viewport {
        Viewport::new(WORLD_EXTENT, Size::new(width, height), 256, 16)
    }

    #[test]
    fn test_resolution_ladder() {
        let viewport = viewport(800.0, 600.0);
        assert_eq!(viewport.num_zoom_levels(), 16);
        assert_eq!(viewport.max_resolution(), 1.40625);
        assert_eq!(viewport.resolution_for_zoom(1), 0.703125);
        assert_eq!(viewport.zoom(), 0.0);
    }

    #[test]
    fn test_zoom_for_resolution() {
        let viewport = viewport(800.0, 600.0);
        // Between level 1 (0.703) and level 2 (0.352)
        assert_eq!(viewport.zoom_for_resolution(0.45, false), 1);
        assert_eq!(viewport.zoom_for_resolution(0.45, true), 2);
        // Coarser than the whole ladder
        assert_eq!(viewport.zoom_for_resolution(5.0, false), 0);
        // Exactly on a level
        assert_eq!(viewport.zoom_for_resolution(0.703125, false), 1);
    }

    #[test]
    fn test_fit_extent_contains_box() {
        let mut viewport = viewport(800.0, 600.0);
        let bbox = Extent::new(-94.50, 46.97, -92.98, 47.94);
        viewport.zoom_to_extent(&bbox, true);

        let visible = viewport.extent();
        assert!(visible.expanded(1e-9).contains_extent(&bbox));
        // Width is the constraining axis for this box in a 4:3 view
        assert!((visible.width() - bbox.width()).abs() < 1e-9);
        assert!((visible.width() / visible.height() - 800.0 / 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapped_extent_uses_ladder_level() {
        let mut viewport = viewport(800.0, 600.0);
        let bbox = Extent::new(-94.50, 46.97, -92.98, 47.94);
        viewport.zoom_to_extent(&bbox, false);

        assert_eq!(viewport.zoom_level(), 9);
        assert_eq!(viewport.resolution(), viewport.resolution_for_zoom(9));
        assert!(viewport.extent().contains_extent(&bbox));
    }

    #[test]
    fn test_zoom_to_max_extent_matching_aspect() {
        let mut viewport = viewport(720.0, 360.0);
        viewport.zoom_to_max_extent();
        let visible = viewport.extent();
        assert!((visible.min_x - -180.0).abs() < 1e-9);
        assert!((visible.max_y - 90.0).abs() < 1e-9);
        assert_eq!(viewport.resolution(), 0.5);
    }

    #[test]
    fn test_fit_exceeds_ladder_in_small_container() {
        let mut viewport = viewport(200.0, 100.0);
        viewport.zoom_to_max_extent();

        assert!((viewport.resolution() - 1.8).abs() < 1e-12);
        assert!(viewport.is_beyond_ladder());
        assert!(viewport.extent().expanded(1e-9).contains_extent(&WORLD_EXTENT));
        assert!((viewport.extent().width() - 360.0).abs() < 1e-9);

        // Zooming out stays put, zooming in enters the ladder at level 0
        viewport.zoom_out(None);
        assert!((viewport.resolution() - 1.8).abs() < 1e-12);
        viewport.zoom_in(None);
        assert_eq!(viewport.resolution(), viewport.resolution_for_zoom(0));
        assert!(!viewport.is_beyond_ladder());
    }

    #[test]
    fn test_pixel_round_trip_and_pan() {
        let mut viewport = viewport(800.0, 600.0);
        viewport.zoom_to_level(3, None);
        let pixel = Point::new(120.0, 40.0);
        let back = viewport.map_to_pixel(&viewport.pixel_to_map(&pixel));
        assert!((back.x - pixel.x).abs() < 1e-9);
        assert!((back.y - pixel.y).abs() < 1e-9);

        let before = viewport.center;
        viewport.pan_by(Point::new(50.0, 50.0));
        let res = viewport.resolution();
        assert!((viewport.center.x - (before.x + 50.0 * res)).abs() < 1e-9);
        assert!((viewport.center.y - (before.y - 50.0 * res)).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_keeps_focus_fixed() {
        let mut viewport = viewport(800.0, 600.0);
        viewport.zoom_to_level(4, None);
        let focus = Point::new(600.0, 150.0);
        let anchor = viewport.pixel_to_map(&focus);

        viewport.zoom_in(Some(focus));
        assert_eq!(viewport.zoom_level(), 5);
        let after = viewport.pixel_to_map(&focus);
        assert!((after.x - anchor.x).abs() < 1e-9);
        assert!((after.y - anchor.y).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_limits() {
        let mut viewport = viewport(800.0, 600.0);
        viewport.zoom_out(None);
        assert_eq!(viewport.zoom_level(), 0);

        viewport.zoom_to_level(40, None);
        assert_eq!(viewport.zoom_level(), 15);
        viewport.zoom_in(None);
        assert_eq!(viewport.zoom_level(), 15);
    }

    #[test]
    fn test_center_clamped_to_max_extent() {
        let mut viewport = viewport(800.0, 600.0);
        viewport.set_center(Point::new(500.0, -300.0));
        assert_eq!(viewport.center, Point::new(180.0, -90.0));
    }
}
