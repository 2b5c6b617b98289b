use crate::{
    core::{bounds::Extent, viewport::Viewport},
    layers::base::{LayerSummary, LayerTrait},
    prelude::HashMap,
    tiles::grid::ImageRequest,
    Result,
};

/// Manages layers for the map, handling ordering and request planning
pub struct LayerManager {
    /// All layers indexed by ID
    layers: HashMap<String, Box<dyn LayerTrait>>,
    /// Layer IDs in draw order: base layers, then overlays
    render_order: Vec<String>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self {
            layers: HashMap::default(),
            render_order: Vec::new(),
        }
    }

    /// Adds a layer to the manager
    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        if self.layers.contains_key(&layer_id) {
            return Err(crate::MapError::Layer(format!(
                "layer '{}' already added",
                layer_id
            )));
        }
        // Base layers draw below every overlay
        let insert_pos = if layer.is_base_layer() {
            self.render_order
                .iter()
                .position(|id| self.layers.get(id).is_some_and(|l| !l.is_base_layer()))
                .unwrap_or(self.render_order.len())
        } else {
            self.render_order.len()
        };

        self.layers.insert(layer_id.clone(), layer);

        self.render_order.insert(insert_pos, layer_id);
        Ok(())
    }

    /// Gets a reference to a layer by ID
    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layers.get(layer_id).map(|l| l.as_ref())
    }

    /// Applies a function to a specific layer mutably
    pub fn with_layer_mut<F, R>(&mut self, layer_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn LayerTrait) -> R,
    {
        self.layers.get_mut(layer_id).map(|layer| f(layer.as_mut()))
    }

    /// Gets all layers in render order
    pub fn layers(&self) -> Vec<&dyn LayerTrait> {
        self.render_order
            .iter()
            .filter_map(|id| self.layers.get(id).map(|l| l.as_ref()))
            .collect()
    }

    /// Summaries in render order, for controls
    pub fn summaries(&self) -> Vec<LayerSummary> {
        self.layers()
            .into_iter()
            .map(LayerSummary::of)
            .collect()
    }

    /// Union of every layer's declared extent
    pub fn max_extent(&self) -> Option<Extent> {
        self.layers()
            .into_iter()
            .filter_map(|layer| layer.max_extent())
            .reduce(|acc, extent| acc.union(&extent))
    }

    /// Shows `layer_id` and hides every other base layer
    pub fn set_base_layer(&mut self, layer_id: &str) -> bool {
        if !self
            .layers
            .get(layer_id)
            .is_some_and(|layer| layer.is_base_layer())
        {
            return false;
        }
        for (id, layer) in self.layers.iter_mut() {
            if layer.is_base_layer() {
                layer.set_visible(id == layer_id);
            }
        }
        true
    }

    /// Image requests of all visible layers in render order
    pub fn image_requests(&self, viewport: &Viewport) -> Result<Vec<ImageRequest>> {
        let visible = viewport.extent();
        let mut requests = Vec::new();

        for layer in self.layers() {
            if layer.is_visible() && layer.intersects_bounds(&visible) {
                requests.extend(layer.image_requests(viewport)?);
            }
        }
        Ok(requests)
    }

    /// Gets the number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Checks if the manager is empty
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}
