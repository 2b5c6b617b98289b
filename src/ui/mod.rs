pub mod container;
pub mod controls;
pub mod elements;

pub use container::{Container, Document};
pub use controls::{
    AttributionControl, ControlContext, ControlKind, ControlManager, LayerSwitcher, MapControl,
    Navigation, PanZoom,
};
pub use elements::{ElementKind, Position, Rect, UiElement};
