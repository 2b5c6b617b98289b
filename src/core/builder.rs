//! Fluent viewer configuration and the bootstrap sequence
//!
//! [`ViewerConfigBuilder`] assembles a [`ViewerConfig`] step by step;
//! [`bootstrap`] turns a configuration into a live [`Map`] bound to a
//! container of a [`Document`].

use crate::{
    core::{
        bounds::Extent,
        config::{InitialViewport, ViewerConfig, ViewerOptions},
        map::Map,
        viewport::Viewport,
    },
    layers::wms::WmsLayer,
    tiles::{grid::TilingMode, loader::RequestSink},
    ui::{container::Document, controls::ControlKind},
    MapError, Result,
};
use std::collections::BTreeSet;

/// Builder for creating and validating viewer configurations
#[derive(Debug, Clone, Default)]
pub struct ViewerConfigBuilder {
    service_url: Option<String>,
    layer_names: Vec<String>,
    protocol_version: Option<String>,
    tiling_mode: TilingMode,
    container_id: Option<String>,
    controls: Option<BTreeSet<ControlKind>>,
    bbox: Option<(Extent, bool)>,
    max_extent: bool,
    options: ViewerOptions,
}

impl ViewerConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = Some(url.into());
        self
    }

    /// Set the requested layers, in server draw order
    pub fn with_layers<I, S>(mut self, layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layer_names = layers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = Some(version.into());
        self
    }

    pub fn with_tiling_mode(mut self, tiling_mode: TilingMode) -> Self {
        self.tiling_mode = tiling_mode;
        self
    }

    pub fn with_container(mut self, container_id: impl Into<String>) -> Self {
        self.container_id = Some(container_id.into());
        self
    }

    /// Replace the control set
    pub fn with_controls<I>(mut self, controls: I) -> Self
    where
        I: IntoIterator<Item = ControlKind>,
    {
        self.controls = Some(controls.into_iter().collect());
        self
    }

    /// Start from the given box
    pub fn with_bbox(mut self, extent: Extent, fit: bool) -> Self {
        self.bbox = Some((extent, fit));
        self
    }

    /// Start from the layers' full extent
    pub fn with_max_extent(mut self) -> Self {
        self.max_extent = true;
        self
    }

    pub fn with_options(mut self, options: ViewerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_layer_title(mut self, title: impl Into<String>) -> Self {
        self.options.layer_title = title.into();
        self
    }

    pub fn with_layer_extent(mut self, extent: Extent) -> Self {
        self.options.max_extent = extent;
        self
    }

    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.options.transparent = transparent;
        self
    }

    pub fn with_attribution(mut self, attribution: impl Into<String>) -> Self {
        self.options.attribution = Some(attribution.into());
        self
    }

    pub fn with_kinetic(mut self, kinetic: bool) -> Self {
        self.options.kinetic = kinetic;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<ViewerConfig> {
        let service_url = self
            .service_url
            .ok_or_else(|| MapError::Config("no service URL specified".to_string()))?;
        let container_id = self
            .container_id
            .ok_or_else(|| MapError::Config("no container specified".to_string()))?;
        let initial_viewport = InitialViewport::from_sources(self.bbox, self.max_extent)?;

        let mut config =
            ViewerConfig::new(service_url, self.layer_names, container_id, initial_viewport);
        config.protocol_version = self.protocol_version;
        config.tiling_mode = self.tiling_mode;
        if let Some(controls) = self.controls {
            config.controls = controls;
        }
        config.options = self.options;

        config.validate()?;
        Ok(config)
    }
}

/// Creates the imagery layer a configuration describes
pub fn wms_layer(config: &ViewerConfig) -> Result<WmsLayer> {
    let options = &config.options;
    let layer = WmsLayer::new(
        "wms".to_string(),
        options.layer_title.clone(),
        config.service_url.clone(),
        config.layer_names.clone(),
    )
    .with_version(config.version()?)
    .with_tiling(config.tiling_mode)
    .with_tile_size(options.tile_size)
    .with_single_tile_ratio(options.single_tile_ratio)
    .with_styles(options.styles.clone())
    .with_crs(options.crs.clone())
    .with_format(options.format.clone())
    .with_transparent(options.transparent)
    .with_max_extent(options.max_extent)
    .with_attribution(options.attribution.clone())
    .with_vendor_params(options.vendor_params.clone());
    Ok(layer)
}

/// Builds a map view from `config`, binds it to its container and issues
/// the first image requests.
///
/// Nothing here contacts the service: requests go to `sink`, which decides
/// whether and how they are fetched. The returned map is owned by the caller.
pub fn bootstrap(
    config: &ViewerConfig,
    document: &mut Document,
    sink: Box<dyn RequestSink>,
) -> Result<Map> {
    config.validate()?;

    let container = document
        .container(&config.container_id)
        .ok_or_else(|| MapError::ContainerNotFound(config.container_id.clone()))?;
    let size = container.size;

    let options = &config.options;
    let viewport = Viewport::new(
        options.max_extent,
        size,
        options.tile_size,
        options.num_zoom_levels,
    );
    let mut map = Map::new(config.container_id.clone(), viewport, sink);

    map.add_layer(Box::new(wms_layer(config)?))?;
    for kind in &config.controls {
        map.add_control(kind.create(options.kinetic));
    }

    match config.initial_viewport {
        InitialViewport::MaxExtent => map.zoom_to_max_extent()?,
        InitialViewport::BoundingBox { extent, fit } => map.zoom_to_extent(&extent, fit)?,
    }
    map.render(document)?;

    log::info!(
        "bootstrapped '{}' with {} layer(s) {:?} from {} ({}, {} request(s))",
        config.container_id,
        config.layer_names.len(),
        config.layer_names,
        config.service_url,
        config.tiling_mode,
        map.current_requests().len()
    );
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::geo::Size, tiles::loader::RequestLog};

    fn builder() -> ViewerConfigBuilder {
        ViewerConfigBuilder::new()
            .with_service_url("http://localhost/mapserver")
            .with_layers(["city_poly", "county_borders", "parcels"])
            .with_container("map")
    }

    #[test]
    fn test_builder_requires_one_viewport_source() {
        assert!(matches!(builder().build(), Err(MapError::Config(_))));
        assert!(matches!(
            builder()
                .with_max_extent()
                .with_bbox(Extent::new(0.0, 0.0, 1.0, 1.0), true)
                .build(),
            Err(MapError::Config(_))
        ));
        assert!(builder().with_max_extent().build().is_ok());
    }

    #[test]
    fn test_builder_requires_url_and_container() {
        let no_url = ViewerConfigBuilder::new()
            .with_layers(["a"])
            .with_container("map")
            .with_max_extent();
        assert!(no_url.build().is_err());

        let no_container = ViewerConfigBuilder::new()
            .with_service_url("http://localhost/wms")
            .with_layers(["a"])
            .with_max_extent();
        assert!(no_container.build().is_err());
    }

    #[test]
    fn test_wms_layer_from_config() {
        let config = builder()
            .with_max_extent()
            .with_protocol_version("1.3.0")
            .with_transparent(true)
            .build()
            .unwrap();
        let layer = wms_layer(&config).unwrap();

        assert_eq!(layer.service_url(), config.service_url);
        assert_eq!(layer.layer_names(), config.layer_names.as_slice());
        assert_eq!(layer.format(), "image/png");
    }

    #[test]
    fn test_bootstrap_missing_container() {
        let config = builder().with_max_extent().build().unwrap();
        let mut document = Document::new().with_container("other", Size::new(100.0, 100.0));
        let log = RequestLog::new();

        let result = bootstrap(&config, &mut document, Box::new(log.clone()));
        assert!(matches!(result, Err(MapError::ContainerNotFound(id)) if id == "map"));
        assert!(log.is_empty());
    }

    #[test]
    fn test_bootstrap_renders_into_container() {
        let config = builder().with_max_extent().build().unwrap();
        let mut document = Document::new().with_container("map", Size::new(800.0, 600.0));
        let log = RequestLog::new();

        let map = bootstrap(&config, &mut document, Box::new(log.clone())).unwrap();
        let container = document.container("map").unwrap();

        assert_eq!(container.children(), map.elements().as_slice());
        assert!(container.find("pan-zoom.zoomin").is_some());
        assert!(container.find("attribution").is_some());
        assert_eq!(log.len(), map.current_requests().len());
    }
}
