//! Viewer configuration
//!
//! A `ViewerConfig` is the whole description of one embedded map view: where
//! the imagery comes from, which container it renders into, which controls
//! are shown and what is visible first. It can be written as a Rust literal,
//! assembled with [`ViewerConfigBuilder`](crate::core::builder::ViewerConfigBuilder)
//! or loaded from JSON.

use crate::{
    core::{
        bounds::Extent,
        constants::{
            DEFAULT_CRS, DEFAULT_IMAGE_FORMAT, DEFAULT_LAYER_TITLE, DEFAULT_NUM_ZOOM_LEVELS,
            DEFAULT_SINGLE_TILE_RATIO, TILE_SIZE, WORLD_EXTENT,
        },
    },
    tiles::grid::TilingMode,
    ui::controls::ControlKind,
    wms::{getmap::parse_service_url, version::WmsVersion},
    MapError, Result,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, path::Path};

/// What the view shows right after bootstrap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ViewportSpec", into = "ViewportSpec")]
pub enum InitialViewport {
    /// Fit the layers' full extent into the view
    MaxExtent,
    /// Show this box; with `fit` the zoom is exactly the one that makes the
    /// box touch the view, otherwise the nearest ladder level that contains it
    BoundingBox { extent: Extent, fit: bool },
}

impl InitialViewport {
    pub fn bounding_box(min_x: f64, min_y: f64, max_x: f64, max_y: f64, fit: bool) -> Self {
        InitialViewport::BoundingBox {
            extent: Extent::new(min_x, min_y, max_x, max_y),
            fit,
        }
    }

    /// Builds the variant from the two optional sources; exactly one must be set
    pub fn from_sources(bbox: Option<(Extent, bool)>, max_extent: bool) -> Result<Self> {
        match (bbox, max_extent) {
            (Some((extent, fit)), false) => Ok(InitialViewport::BoundingBox { extent, fit }),
            (None, true) => Ok(InitialViewport::MaxExtent),
            (Some(_), true) => Err(MapError::Config(
                "initial viewport has both a bounding box and max extent".to_string(),
            )),
            (None, false) => Err(MapError::Config(
                "initial viewport needs a bounding box or max extent".to_string(),
            )),
        }
    }
}

/// Serialized shape of [`InitialViewport`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ViewportSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bbox: Option<[f64; 4]>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    fit: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    max_extent: bool,
}

impl TryFrom<ViewportSpec> for InitialViewport {
    type Error = MapError;

    fn try_from(raw: ViewportSpec) -> Result<Self> {
        let bbox = raw.bbox.map(|coords| (Extent::from_array(coords), raw.fit));
        InitialViewport::from_sources(bbox, raw.max_extent)
    }
}

impl From<InitialViewport> for ViewportSpec {
    fn from(viewport: InitialViewport) -> Self {
        match viewport {
            InitialViewport::MaxExtent => ViewportSpec {
                max_extent: true,
                ..Default::default()
            },
            InitialViewport::BoundingBox { extent, fit } => ViewportSpec {
                bbox: Some(extent.as_array()),
                fit,
                max_extent: false,
            },
        }
    }
}

/// Layer and view settings that have sensible defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerOptions {
    /// Display name of the imagery layer
    pub layer_title: String,
    pub format: String,
    /// Transparent layers are overlays and default to PNG
    pub transparent: bool,
    pub crs: String,
    pub styles: Vec<String>,
    pub max_extent: Extent,
    pub tile_size: u32,
    pub num_zoom_levels: usize,
    /// Single-tile image size relative to the view
    pub single_tile_ratio: f64,
    pub attribution: Option<String>,
    /// Inertial drag panning
    pub kinetic: bool,
    /// Extra GetMap parameters, appended in order
    pub vendor_params: Vec<(String, String)>,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            layer_title: DEFAULT_LAYER_TITLE.to_string(),
            format: DEFAULT_IMAGE_FORMAT.to_string(),
            transparent: false,
            crs: DEFAULT_CRS.to_string(),
            styles: Vec::new(),
            max_extent: WORLD_EXTENT,
            tile_size: TILE_SIZE,
            num_zoom_levels: DEFAULT_NUM_ZOOM_LEVELS,
            single_tile_ratio: DEFAULT_SINGLE_TILE_RATIO,
            attribution: None,
            kinetic: true,
            vendor_params: Vec::new(),
        }
    }
}

impl ViewerOptions {
    pub fn validate(&self) -> Result<()> {
        if self.tile_size == 0 {
            return Err(MapError::Config("tile_size must be positive".to_string()));
        }
        if self.num_zoom_levels == 0 {
            return Err(MapError::Config(
                "num_zoom_levels must be positive".to_string(),
            ));
        }
        if !self.single_tile_ratio.is_finite() || self.single_tile_ratio < 1.0 {
            return Err(MapError::Config(format!(
                "single_tile_ratio must be at least 1, got {}",
                self.single_tile_ratio
            )));
        }
        if self.format.trim().is_empty() || self.crs.trim().is_empty() {
            return Err(MapError::Config("format and crs must be set".to_string()));
        }

        let extent = &self.max_extent;
        Extent::checked(extent.min_x, extent.min_y, extent.max_x, extent.max_y)?;
        if extent.width() <= 0.0 || extent.height() <= 0.0 {
            return Err(MapError::InvalidExtent(format!(
                "max extent {} has no area",
                extent.to_bbox_string()
            )));
        }
        Ok(())
    }
}

fn default_controls() -> BTreeSet<ControlKind> {
    [
        ControlKind::Navigation,
        ControlKind::PanZoom,
        ControlKind::Attribution,
    ]
    .into_iter()
    .collect()
}

/// Description of one embedded map view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// WMS endpoint, kept verbatim
    pub service_url: String,
    /// Requested layers in server draw order
    pub layer_names: Vec<String>,
    /// "1.1.1" or "1.3.0"; unset sends the client default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<String>,
    #[serde(default)]
    pub tiling_mode: TilingMode,
    pub container_id: String,
    #[serde(default = "default_controls")]
    pub controls: BTreeSet<ControlKind>,
    pub initial_viewport: InitialViewport,
    #[serde(default)]
    pub options: ViewerOptions,
}

impl ViewerConfig {
    /// Configuration with default controls, tiling and options
    pub fn new(
        service_url: impl Into<String>,
        layer_names: Vec<String>,
        container_id: impl Into<String>,
        initial_viewport: InitialViewport,
    ) -> Self {
        Self {
            service_url: service_url.into(),
            layer_names,
            protocol_version: None,
            tiling_mode: TilingMode::default(),
            container_id: container_id.into(),
            controls: default_controls(),
            initial_viewport,
            options: ViewerOptions::default(),
        }
    }

    /// Parses and validates a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ViewerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parsed protocol version, if one was given
    pub fn version(&self) -> Result<Option<WmsVersion>> {
        self.protocol_version
            .as_deref()
            .map(str::parse)
            .transpose()
    }

    /// Checks the record is well formed. Never contacts the service.
    pub fn validate(&self) -> Result<()> {
        if self.service_url.trim().is_empty() {
            return Err(MapError::Config("service_url is empty".to_string()));
        }
        parse_service_url(&self.service_url)?;

        if self.layer_names.is_empty() {
            return Err(MapError::Config("layer_names is empty".to_string()));
        }
        if self.layer_names.iter().any(|name| name.trim().is_empty()) {
            return Err(MapError::Config(
                "layer_names contains an empty name".to_string(),
            ));
        }
        if self.container_id.trim().is_empty() {
            return Err(MapError::Config("container_id is empty".to_string()));
        }

        self.version()?;

        if let InitialViewport::BoundingBox { extent, .. } = &self.initial_viewport {
            Extent::checked(extent.min_x, extent.min_y, extent.max_x, extent.max_y)?;
        }

        self.options.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ViewerConfig {
        ViewerConfig::new(
            "http://localhost/mapserver",
            vec!["city_poly".to_string()],
            "map",
            InitialViewport::MaxExtent,
        )
    }

    #[test]
    fn test_defaults() {
        let config = config();
        assert!(config.validate().is_ok());
        assert_eq!(config.tiling_mode, TilingMode::Tiled);
        assert_eq!(config.controls, default_controls());
        assert_eq!(config.options.format, "image/jpeg");
        assert_eq!(config.options.max_extent, WORLD_EXTENT);
        assert!(config.options.kinetic);
    }

    #[test]
    fn test_json_both_or_neither_viewport_rejected() {
        let both = r#"{
            "service_url": "http://localhost/mapserver",
            "layer_names": ["parcels"],
            "container_id": "map",
            "initial_viewport": {"bbox": [-94.5, 46.97, -92.98, 47.94], "max_extent": true}
        }"#;
        let neither = r#"{
            "service_url": "http://localhost/mapserver",
            "layer_names": ["parcels"],
            "container_id": "map",
            "initial_viewport": {"fit": true}
        }"#;

        assert!(ViewerConfig::from_json(both).is_err());
        assert!(ViewerConfig::from_json(neither).is_err());
        assert!(matches!(
            InitialViewport::from_sources(None, false),
            Err(MapError::Config(_))
        ));
    }

    #[test]
    fn test_json_full_config() {
        let json = r#"{
            "service_url": "http://localhost/cgi-bin/mapserv?map=duluth.map",
            "layer_names": ["city_poly", "county_borders"],
            "protocol_version": "1.3.0",
            "tiling_mode": "single-tile",
            "container_id": "map",
            "controls": ["navigation", "layer-switcher"],
            "initial_viewport": {"bbox": [-94.5, 46.97, -92.98, 47.94], "fit": true},
            "options": {"transparent": true, "attribution": "(c) County"}
        }"#;
        let config = ViewerConfig::from_json(json).unwrap();

        assert_eq!(config.version().unwrap(), Some(WmsVersion::V1_3_0));
        assert_eq!(config.tiling_mode, TilingMode::SingleTile);
        assert!(config.controls.contains(&ControlKind::LayerSwitcher));
        assert!(!config.controls.contains(&ControlKind::PanZoom));
        assert_eq!(
            config.initial_viewport,
            InitialViewport::bounding_box(-94.5, 46.97, -92.98, 47.94, true)
        );
        // Unset options keep their defaults
        assert_eq!(config.options.tile_size, 256);
        assert_eq!(config.options.attribution.as_deref(), Some("(c) County"));

        let reparsed = ViewerConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(reparsed, config);
    }

    #[test]
    fn test_validation_errors() {
        let mut bad_url = config();
        bad_url.service_url = "localhost/mapserver".to_string();
        assert!(matches!(bad_url.validate(), Err(MapError::InvalidUrl(_))));

        let mut no_layers = config();
        no_layers.layer_names.clear();
        assert!(matches!(no_layers.validate(), Err(MapError::Config(_))));

        let mut bad_version = config();
        bad_version.protocol_version = Some("1.0.0".to_string());
        assert!(matches!(
            bad_version.validate(),
            Err(MapError::UnsupportedVersion(_))
        ));

        let mut inverted = config();
        inverted.initial_viewport = InitialViewport::bounding_box(10.0, 0.0, -10.0, 5.0, false);
        assert!(matches!(
            inverted.validate(),
            Err(MapError::InvalidExtent(_))
        ));

        let mut ratio = config();
        ratio.options.single_tile_ratio = 0.5;
        assert!(matches!(ratio.validate(), Err(MapError::Config(_))));
    }
}
