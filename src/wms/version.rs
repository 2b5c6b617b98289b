//! WMS protocol versions and their axis-order rules.

use crate::MapError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// WMS protocol versions the client can speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WmsVersion {
    #[serde(rename = "1.1.1")]
    #[default]
    V1_1_1,
    #[serde(rename = "1.3.0")]
    V1_3_0,
}

/// Order of the coordinates in a BBOX parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrder {
    /// easting, northing (lon, lat)
    XY,
    /// northing, easting (lat, lon)
    LatLon,
}

impl WmsVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            WmsVersion::V1_1_1 => "1.1.1",
            WmsVersion::V1_3_0 => "1.3.0",
        }
    }

    /// Name of the coordinate reference system parameter.
    ///
    /// WMS 1.3.0 renamed `SRS` to `CRS`.
    pub fn crs_param(&self) -> &'static str {
        match self {
            WmsVersion::V1_1_1 => "SRS",
            WmsVersion::V1_3_0 => "CRS",
        }
    }

    /// Axis order of the BBOX parameter for `crs`.
    ///
    /// WMS 1.1.1 is always x,y. WMS 1.3.0 follows the natural order of the
    /// CRS, which is lat,lon for the geographic systems.
    pub fn axis_order(&self, crs: &str) -> AxisOrder {
        match self {
            WmsVersion::V1_1_1 => AxisOrder::XY,
            WmsVersion::V1_3_0 => {
                if is_geographic_crs(crs) {
                    AxisOrder::LatLon
                } else {
                    AxisOrder::XY
                }
            }
        }
    }
}

/// EPSG:4326 and EPSG:4269 are declared lat/lon; "CRS:84" is the lon/lat variant.
fn is_geographic_crs(crs: &str) -> bool {
    matches!(crs.to_uppercase().as_str(), "EPSG:4326" | "EPSG:4269")
}

impl fmt::Display for WmsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WmsVersion {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1.1.1" => Ok(WmsVersion::V1_1_1),
            "1.3.0" => Ok(WmsVersion::V1_3_0),
            other => Err(MapError::UnsupportedVersion(other.to_string())),
        }
    }
}
