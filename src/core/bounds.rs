use crate::core::geo::{Point, Size};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// A rectangular region in map units (minX, minY, maxX, maxY).
///
/// Units follow the layer's coordinate reference system: degrees for
/// EPSG:4326, meters for projected systems. No reprojection happens here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    /// Creates an extent from individual coordinates
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Creates an extent and checks it is well formed
    pub fn checked(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        let extent = Self::new(min_x, min_y, max_x, max_y);
        if !extent.is_finite() {
            return Err(MapError::InvalidExtent(format!(
                "non-finite coordinate in {}",
                extent.to_bbox_string()
            )));
        }
        if !extent.is_valid() {
            return Err(MapError::InvalidExtent(format!(
                "min exceeds max in {}",
                extent.to_bbox_string()
            )));
        }
        Ok(extent)
    }

    /// Creates an extent from a `[minX, minY, maxX, maxY]` array
    pub fn from_array(coords: [f64; 4]) -> Self {
        Self::new(coords[0], coords[1], coords[2], coords[3])
    }

    /// Creates an extent from a center point and a size in map units
    pub fn from_center_and_size(center: Point, width: f64, height: f64) -> Self {
        let half_width = width / 2.0;
        let half_height = height / 2.0;
        Self::new(
            center.x - half_width,
            center.y - half_height,
            center.x + half_width,
            center.y + half_height,
        )
    }

    /// Extent covered by `size` pixels at `resolution` map units per pixel
    pub fn from_view(center: Point, size: Size, resolution: f64) -> Self {
        Self::from_center_and_size(center, size.width * resolution, size.height * resolution)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }

    /// Checks if the extent contains a point (edges included)
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    /// Checks if `other` lies entirely inside this extent (edges included)
    pub fn contains_extent(&self, other: &Extent) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// Checks if two extents overlap with a non-zero area
    pub fn intersects(&self, other: &Extent) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Gets the intersection of two extents
    pub fn intersection(&self, other: &Extent) -> Option<Extent> {
        if !self.intersects(other) {
            return None;
        }

        Some(Extent::new(
            self.min_x.max(other.min_x),
            self.min_y.max(other.min_y),
            self.max_x.min(other.max_x),
            self.max_y.min(other.max_y),
        ))
    }

    /// Returns the smallest extent covering both
    pub fn union(&self, other: &Extent) -> Extent {
        if !self.is_valid() {
            return *other;
        }
        if !other.is_valid() {
            return *self;
        }

        Extent::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Returns a new extent grown by `amount` on every side
    pub fn expanded(&self, amount: f64) -> Extent {
        Extent::new(
            self.min_x - amount,
            self.min_y - amount,
            self.max_x + amount,
            self.max_y + amount,
        )
    }

    /// Returns a new extent scaled by `ratio` around its center
    pub fn scaled(&self, ratio: f64) -> Extent {
        Extent::from_center_and_size(self.center(), self.width() * ratio, self.height() * ratio)
    }

    /// Checks if the extent is valid (min <= max)
    pub fn is_valid(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }

    pub fn is_finite(&self) -> bool {
        self.as_array().iter().all(|c| c.is_finite())
    }

    pub fn area(&self) -> f64 {
        if !self.is_valid() {
            0.0
        } else {
            self.width() * self.height()
        }
    }

    /// Clamps a point to be within the extent
    pub fn clamp(&self, point: &Point) -> Point {
        Point::new(
            point.x.clamp(self.min_x, self.max_x),
            point.y.clamp(self.min_y, self.max_y),
        )
    }

    /// Creates an empty extent that absorbs the first extent it is joined with
    pub fn empty() -> Self {
        Self::new(
            f64::INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        )
    }

    /// "minx,miny,maxx,maxy"
    pub fn to_bbox_string(&self) -> String {
        format!("{},{},{},{}", self.min_x, self.min_y, self.max_x, self.max_y)
    }

    /// "miny,minx,maxy,maxx", the lat/lon order of geographic CRSs in WMS 1.3.0
    pub fn to_bbox_string_yx(&self) -> String {
        format!("{},{},{},{}", self.min_y, self.min_x, self.max_y, self.max_x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_creation() {
        let extent = Extent::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(extent.width(), 20.0);
        assert_eq!(extent.height(), 20.0);
        assert_eq!(extent.center(), Point::new(20.0, 30.0));
    }

    #[test]
    fn test_checked_rejects_inverted() {
        assert!(Extent::checked(10.0, 0.0, 5.0, 1.0).is_err());
        assert!(Extent::checked(0.0, 0.0, f64::NAN, 1.0).is_err());
        assert!(Extent::checked(-94.50, 46.97, -92.98, 47.94).is_ok());
    }

    #[test]
    fn test_extent_intersection() {
        let a = Extent::new(0.0, 0.0, 10.0, 10.0);
        let b = Extent::new(5.0, 5.0, 15.0, 15.0);

        let intersection = a.intersection(&b).unwrap();
        assert_eq!(intersection, Extent::new(5.0, 5.0, 10.0, 10.0));
    }

    #[test]
    fn test_touching_extents_do_not_intersect() {
        let a = Extent::new(0.0, 0.0, 5.0, 5.0);
        let b = Extent::new(5.0, 0.0, 10.0, 5.0);
        assert!(!a.intersects(&b));
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn test_union_with_empty() {
        let a = Extent::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(Extent::empty().union(&a), a);

        let b = Extent::new(-1.0, 2.0, 0.5, 3.0);
        assert_eq!(a.union(&b), Extent::new(-1.0, 0.0, 1.0, 3.0));
    }

    #[test]
    fn test_scaled_keeps_center() {
        let extent = Extent::new(0.0, 0.0, 4.0, 2.0).scaled(1.5);
        assert_eq!(extent.center(), Point::new(2.0, 1.0));
        assert_eq!(extent.width(), 6.0);
        assert_eq!(extent.height(), 3.0);
    }

    #[test]
    fn test_bbox_strings() {
        let extent = Extent::new(-94.5, 46.97, -92.98, 47.94);
        assert_eq!(extent.to_bbox_string(), "-94.5,46.97,-92.98,47.94");
        assert_eq!(extent.to_bbox_string_yx(), "46.97,-94.5,47.94,-92.98");
    }
}
