use crate::core::{bounds::Extent, geo::Point};
use serde::{Deserialize, Serialize};

/// Pointer input delivered to the map by the host, in container pixels.
///
/// Drag events carry a timestamp in milliseconds so inertial panning can be
/// computed without a wall clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Single click/tap
    Click { position: Point },
    /// Double click/tap
    DoubleClick { position: Point },
    /// Start of drag operation
    DragStart { position: Point, time_ms: f64 },
    /// Drag in progress
    Drag { position: Point, time_ms: f64 },
    /// End of drag operation
    DragEnd { position: Point, time_ms: f64 },
    /// Scroll wheel; positive delta zooms in
    Scroll { delta: f64, position: Point },
}

impl InputEvent {
    /// Gets the pointer position associated with this event
    pub fn position(&self) -> Point {
        match self {
            InputEvent::Click { position }
            | InputEvent::DoubleClick { position }
            | InputEvent::DragStart { position, .. }
            | InputEvent::Drag { position, .. }
            | InputEvent::DragEnd { position, .. }
            | InputEvent::Scroll { position, .. } => *position,
        }
    }

    /// Checks if this event belongs to a drag gesture
    pub fn is_drag_event(&self) -> bool {
        matches!(
            self,
            InputEvent::DragStart { .. } | InputEvent::Drag { .. } | InputEvent::DragEnd { .. }
        )
    }
}

/// Map state changes requested by a control
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Pan by a pixel offset and refresh imagery
    Pan { delta: Point },
    /// Move the view during a drag; imagery is not refreshed
    DragPan { delta: Point },
    /// Drag finished; refresh imagery once
    DragEnd,
    /// Zoom in one level, keeping `focus` fixed
    ZoomIn { focus: Option<Point> },
    /// Zoom out one level, keeping `focus` fixed
    ZoomOut { focus: Option<Point> },
    /// Fit the layers' max extent into the view
    ZoomToMaxExtent,
    /// Show or hide an overlay
    ToggleLayer { layer_id: String },
    /// Make a base layer the only visible base layer
    SelectBaseLayer { layer_id: String },
}

impl Action {
    /// Whether the action changes which imagery is needed
    pub fn needs_refresh(&self) -> bool {
        !matches!(self, Action::DragPan { .. })
    }
}

/// Map event types that can be emitted by the map
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Map view has changed (center, resolution or size)
    ViewChanged {
        center: Point,
        resolution: f64,
        extent: Extent,
    },
    /// A pan or drag gesture finished
    MoveEnd { center: Point },
    /// Image requests were issued for the current view
    Refresh { requests: usize },
    /// Layer was added to the map
    LayerAdd { layer_id: String },
    /// Layer was shown or hidden
    LayerVisibilityChanged { layer_id: String, visible: bool },
}

impl MapEvent {
    /// Name listeners register under
    pub fn event_type(&self) -> &'static str {
        match self {
            MapEvent::ViewChanged { .. } => "viewchanged",
            MapEvent::MoveEnd { .. } => "moveend",
            MapEvent::Refresh { .. } => "refresh",
            MapEvent::LayerAdd { .. } => "layeradd",
            MapEvent::LayerVisibilityChanged { .. } => "layervisibilitychanged",
        }
    }
}
