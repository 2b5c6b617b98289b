// LayerTrait is unified with LayerOperations in shared traits
pub use crate::traits::LayerOperations as LayerTrait;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerType {
    Wms,
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerType::Wms => write!(f, "wms"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayerProperties {
    pub id: String,
    pub name: String,
    pub layer_type: LayerType,
    pub visible: bool,
}

impl LayerProperties {
    pub fn new(id: String, name: String, layer_type: LayerType) -> Self {
        Self {
            id,
            name,
            layer_type,
            visible: true,
        }
    }
}

/// What the layer switcher and attribution controls need to know about a layer
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSummary {
    pub id: String,
    pub name: String,
    pub visible: bool,
    pub is_base_layer: bool,
    pub attribution: Option<String>,
}

impl LayerSummary {
    pub fn of(layer: &dyn LayerTrait) -> Self {
        Self {
            id: layer.id().to_string(),
            name: layer.name().to_string(),
            visible: layer.is_visible(),
            is_base_layer: layer.is_base_layer(),
            attribution: layer.attribution().map(str::to_string),
        }
    }
}
