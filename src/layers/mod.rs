#[macro_use]
pub mod macros;

pub mod base;
pub mod manager;
pub mod wms;

pub use base::{LayerProperties, LayerSummary, LayerTrait, LayerType};
pub use manager::LayerManager;
pub use wms::WmsLayer;
