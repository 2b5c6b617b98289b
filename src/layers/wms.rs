use crate::{
    core::{
        bounds::Extent,
        constants::{
            DEFAULT_CRS, DEFAULT_IMAGE_FORMAT, DEFAULT_SINGLE_TILE_RATIO, TILE_SIZE,
            TRANSPARENT_IMAGE_FORMAT, WORLD_EXTENT,
        },
        viewport::Viewport,
    },
    layers::base::{LayerProperties, LayerTrait, LayerType},
    tiles::grid::{single_tile_frame, ImageRequest, TileGrid, TilingMode},
    wms::{getmap::GetMapRequest, version::WmsVersion},
    Result,
};

/// Remote imagery layer backed by a WMS GetMap endpoint.
///
/// The service URL, layer names and protocol version are kept exactly as
/// given; nothing is checked against the server.
pub struct WmsLayer {
    properties: LayerProperties,
    service_url: String,
    layer_names: Vec<String>,
    version: Option<WmsVersion>,
    styles: Vec<String>,
    crs: String,
    format: String,
    transparent: bool,
    tiling: TilingMode,
    tile_size: u32,
    ratio: f64,
    max_extent: Extent,
    attribution: Option<String>,
    vendor_params: Vec<(String, String)>,
}

impl WmsLayer {
    pub fn new(id: String, name: String, service_url: String, layer_names: Vec<String>) -> Self {
        let properties = LayerProperties::new(id, name, LayerType::Wms);
        Self {
            properties,
            service_url,
            layer_names,
            version: None,
            styles: Vec::new(),
            crs: DEFAULT_CRS.to_string(),
            format: DEFAULT_IMAGE_FORMAT.to_string(),
            transparent: false,
            tiling: TilingMode::default(),
            tile_size: TILE_SIZE,
            ratio: DEFAULT_SINGLE_TILE_RATIO,
            max_extent: WORLD_EXTENT,
            attribution: None,
            vendor_params: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: Option<WmsVersion>) -> Self {
        self.version = version;
        self
    }

    pub fn with_tiling(mut self, tiling: TilingMode) -> Self {
        self.tiling = tiling;
        self
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size.max(1);
        self
    }

    pub fn with_single_tile_ratio(mut self, ratio: f64) -> Self {
        self.ratio = ratio.max(1.0);
        self
    }

    pub fn with_styles(mut self, styles: Vec<String>) -> Self {
        self.styles = styles;
        self
    }

    pub fn with_crs(mut self, crs: String) -> Self {
        self.crs = crs;
        self
    }

    pub fn with_format(mut self, format: String) -> Self {
        self.format = format;
        self
    }

    /// Transparent layers are overlays; JPEG cannot carry alpha so it is
    /// swapped for PNG.
    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        if transparent && self.format == DEFAULT_IMAGE_FORMAT {
            self.format = TRANSPARENT_IMAGE_FORMAT.to_string();
        }
        self
    }

    pub fn with_max_extent(mut self, max_extent: Extent) -> Self {
        self.max_extent = max_extent;
        self
    }

    pub fn with_attribution(mut self, attribution: Option<String>) -> Self {
        self.attribution = attribution;
        self
    }

    pub fn with_vendor_params(mut self, params: Vec<(String, String)>) -> Self {
        self.vendor_params = params;
        self
    }

    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    pub fn layer_names(&self) -> &[String] {
        &self.layer_names
    }

    /// Version as configured; `None` means the client default is sent
    pub fn protocol_version(&self) -> Option<WmsVersion> {
        self.version
    }

    /// Version written into requests
    pub fn effective_version(&self) -> WmsVersion {
        self.version.unwrap_or_default()
    }

    pub fn tiling_mode(&self) -> TilingMode {
        self.tiling
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn crs(&self) -> &str {
        &self.crs
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// GetMap parameters for one image
    pub fn get_map_request(&self, bbox: Extent, width: u32, height: u32) -> GetMapRequest {
        GetMapRequest {
            version: self.effective_version(),
            layers: self.layer_names.clone(),
            styles: self.styles.clone(),
            crs: self.crs.clone(),
            bbox,
            width,
            height,
            format: self.format.clone(),
            transparent: self.transparent,
            vendor_params: self.vendor_params.clone(),
        }
    }

    /// GetMap URL for one image
    pub fn get_map_url(&self, bbox: Extent, width: u32, height: u32) -> Result<String> {
        self.get_map_request(bbox, width, height)
            .to_url(&self.service_url)
    }

    fn single_tile_requests(&self, viewport: &Viewport) -> Result<Vec<ImageRequest>> {
        let (extent, width, height) =
            single_tile_frame(&viewport.extent(), viewport.size, self.ratio);

        Ok(vec![ImageRequest {
            layer_id: self.properties.id.clone(),
            url: self.get_map_url(extent, width, height)?,
            extent,
            width,
            height,
            resolution: viewport.resolution(),
            cell: None,
        }])
    }

    fn tiled_requests(&self, viewport: &Viewport) -> Result<Vec<ImageRequest>> {
        let grid = TileGrid::for_extent(&self.max_extent, self.tile_size);
        let cells = grid.cells_for(
            &viewport.extent(),
            viewport.resolution(),
            viewport.zoom_level(),
            Some(&self.max_extent),
        );

        cells
            .into_iter()
            .map(|(cell, extent)| {
                Ok(ImageRequest {
                    layer_id: self.properties.id.clone(),
                    url: self.get_map_url(extent, self.tile_size, self.tile_size)?,
                    extent,
                    width: self.tile_size,
                    height: self.tile_size,
                    resolution: viewport.resolution(),
                    cell: Some(cell),
                })
            })
            .collect()
    }
}

impl LayerTrait for WmsLayer {
    crate::impl_layer_trait!(WmsLayer, properties);

    fn is_base_layer(&self) -> bool {
        !self.transparent
    }

    fn max_extent(&self) -> Option<Extent> {
        Some(self.max_extent)
    }

    fn attribution(&self) -> Option<&str> {
        self.attribution.as_deref()
    }

    fn image_requests(&self, viewport: &Viewport) -> Result<Vec<ImageRequest>> {
        if !self.is_visible() || viewport.size.is_empty() {
            return Ok(Vec::new());
        }

        let requests = match self.tiling {
            TilingMode::SingleTile => self.single_tile_requests(viewport)?,
            TilingMode::Tiled => self.tiled_requests(viewport)?,
        };
        log::debug!(
            "layer {} planned {} {} request(s) at resolution {}",
            self.properties.id,
            requests.len(),
            self.tiling,
            viewport.resolution()
        );
        Ok(requests)
    }

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "url": self.service_url,
            "layers": self.layer_names,
            "version": self.version.map(|v| v.to_string()),
            "styles": self.styles,
            "crs": self.crs,
            "format": self.format,
            "transparent": self.transparent,
            "tiling": self.tiling.to_string(),
            "tile_size": self.tile_size,
            "ratio": self.ratio,
            "max_extent": self.max_extent.as_array(),
            "attribution": self.attribution,
        })
    }
}
