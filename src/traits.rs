//! Shared trait abstractions for map layers

use crate::{
    core::{bounds::Extent, viewport::Viewport},
    layers::base::LayerType,
    tiles::grid::ImageRequest,
    Result,
};

/// Trait for layer-like objects
/// Unifies common layer operations
pub trait LayerOperations: Send + Sync {
    /// Get layer ID
    fn id(&self) -> &str;

    /// Get layer name
    fn name(&self) -> &str;

    /// Get layer type
    fn layer_type(&self) -> LayerType;

    /// Check if layer is visible
    fn is_visible(&self) -> bool;

    /// Set layer visibility
    fn set_visible(&mut self, visible: bool);

    /// Base layers are mutually exclusive, overlays stack on top
    fn is_base_layer(&self) -> bool {
        true
    }

    /// Full extent the layer declares data for
    fn max_extent(&self) -> Option<Extent> {
        None
    }

    /// Data-source credit text
    fn attribution(&self) -> Option<&str> {
        None
    }

    /// Check if layer intersects with given extent
    fn intersects_bounds(&self, extent: &Extent) -> bool {
        if let Some(layer_extent) = self.max_extent() {
            layer_extent.intersects(extent)
        } else {
            true
        }
    }

    /// Image requests needed to display the layer in `viewport`
    fn image_requests(&self, viewport: &Viewport) -> Result<Vec<ImageRequest>>;

    /// Get layer options
    fn options(&self) -> serde_json::Value;

    /// Dynamic casting support
    fn as_any(&self) -> &dyn std::any::Any;
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
