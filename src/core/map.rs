use crate::{
    core::{bounds::Extent, geo::Point, viewport::Viewport},
    input::{
        events::{Action, InputEvent, MapEvent},
        handler::EventManager,
    },
    layers::{
        base::{LayerSummary, LayerTrait},
        manager::LayerManager,
    },
    tiles::{grid::ImageRequest, loader::RequestSink},
    ui::{
        container::Document,
        controls::{ControlContext, ControlKind, ControlManager, MapControl},
        elements::{ElementKind, Rect, UiElement},
    },
    MapError, Result,
};

/// A map view bound to one container.
///
/// Owns its viewport, layers, controls and event queue. Image requests go to
/// the sink it was created with and are never awaited.
pub struct Map {
    container_id: String,
    viewport: Viewport,
    layer_manager: LayerManager,
    controls: ControlManager,
    event_manager: EventManager,
    sink: Box<dyn RequestSink>,
    /// Requests issued by the latest refresh
    current_requests: Vec<ImageRequest>,
    refresh_count: usize,
}

impl Map {
    pub fn new(container_id: impl Into<String>, viewport: Viewport, sink: Box<dyn RequestSink>) -> Self {
        Self {
            container_id: container_id.into(),
            viewport,
            layer_manager: LayerManager::new(),
            controls: ControlManager::new(),
            event_manager: EventManager::new(),
            sink,
            current_requests: Vec::new(),
            refresh_count: 0,
        }
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Visible region in map units
    pub fn extent(&self) -> Extent {
        self.viewport.extent()
    }

    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        self.layer_manager.add_layer(layer)?;

        // The view may show what any layer covers
        if let Some(max_extent) = self.layer_manager.max_extent() {
            self.viewport.set_max_extent(max_extent);
        }
        self.event_manager.emit(MapEvent::LayerAdd { layer_id });
        Ok(())
    }

    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layer_manager.get_layer(layer_id)
    }

    pub fn with_layer_mut<F, R>(&mut self, layer_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn LayerTrait) -> R,
    {
        self.layer_manager.with_layer_mut(layer_id, f)
    }

    pub fn layers(&self) -> Vec<&dyn LayerTrait> {
        self.layer_manager.layers()
    }

    pub fn layer_summaries(&self) -> Vec<LayerSummary> {
        self.layer_manager.summaries()
    }

    /// Shows or hides a layer and refreshes
    pub fn set_layer_visible(&mut self, layer_id: &str, visible: bool) -> Result<()> {
        let changed = self
            .layer_manager
            .with_layer_mut(layer_id, |layer| {
                let changed = layer.is_visible() != visible;
                layer.set_visible(visible);
                changed
            })
            .ok_or_else(|| MapError::Layer(format!("no layer '{}'", layer_id)))?;

        if changed {
            self.event_manager.emit(MapEvent::LayerVisibilityChanged {
                layer_id: layer_id.to_string(),
                visible,
            });
            self.refresh()?;
        }
        Ok(())
    }

    /// Attaches a control on top of the existing ones
    pub fn add_control(&mut self, control: Box<dyn MapControl>) -> bool {
        let kind = control.kind();
        let added = self.controls.add(control);
        if added {
            log::debug!("attached {} control to '{}'", kind, self.container_id);
        }
        added
    }

    pub fn has_control(&self, kind: ControlKind) -> bool {
        self.controls.has(kind)
    }

    pub fn control_kinds(&self) -> Vec<ControlKind> {
        self.controls.kinds()
    }

    /// Union of the layers' extents, or the viewport's if there are none
    pub fn max_extent(&self) -> Extent {
        self.layer_manager
            .max_extent()
            .unwrap_or(*self.viewport.max_extent())
    }

    /// Centers on `extent` and zooms so it is fully visible, then refreshes
    pub fn zoom_to_extent(&mut self, extent: &Extent, fit: bool) -> Result<()> {
        let extent = Extent::checked(extent.min_x, extent.min_y, extent.max_x, extent.max_y)?;
        self.viewport.zoom_to_extent(&extent, fit);
        self.view_changed();
        self.refresh()?;
        Ok(())
    }

    /// Fits the full extent of all layers into the view, then refreshes
    pub fn zoom_to_max_extent(&mut self) -> Result<()> {
        let max_extent = self.max_extent();
        self.zoom_to_extent(&max_extent, true)
    }

    /// Plans image requests for the current view and hands them to the sink.
    /// Returns the number of requests issued.
    pub fn refresh(&mut self) -> Result<usize> {
        let requests = self.layer_manager.image_requests(&self.viewport)?;
        let count = requests.len();

        for request in &requests {
            self.sink.submit(request.clone());
        }
        self.current_requests = requests;
        self.refresh_count += 1;

        log::debug!(
            "refresh #{} of '{}': {} request(s) for {}",
            self.refresh_count,
            self.container_id,
            count,
            self.viewport.extent().to_bbox_string()
        );
        self.event_manager.emit(MapEvent::Refresh { requests: count });
        Ok(count)
    }

    /// Requests issued by the latest refresh
    pub fn current_requests(&self) -> &[ImageRequest] {
        &self.current_requests
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_count
    }

    /// Routes pointer input through the controls and applies what they ask
    /// for. Returns whether any control consumed the event.
    pub fn handle_input(&mut self, event: InputEvent) -> Result<bool> {
        let layers = self.layer_manager.summaries();
        let ctx = ControlContext {
            container: self.viewport.size,
            layers: &layers,
        };

        let Some(actions) = self.controls.handle_input(&event, &ctx) else {
            return Ok(false);
        };

        let needs_refresh = actions.iter().any(Action::needs_refresh);
        for action in actions {
            self.apply(action)?;
        }
        if needs_refresh {
            self.refresh()?;
        }
        Ok(true)
    }

    /// Applies one action without refreshing
    fn apply(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Pan { delta } => {
                self.viewport.pan_by(delta);
                self.view_changed();
                self.move_ended();
            }
            Action::DragPan { delta } => {
                self.viewport.pan_by(delta);
                self.view_changed();
            }
            Action::DragEnd => self.move_ended(),
            Action::ZoomIn { focus } => {
                self.viewport.zoom_in(focus);
                self.view_changed();
            }
            Action::ZoomOut { focus } => {
                self.viewport.zoom_out(focus);
                self.view_changed();
            }
            Action::ZoomToMaxExtent => {
                let max_extent = self.max_extent();
                self.viewport.zoom_to_extent(&max_extent, true);
                self.view_changed();
            }
            Action::ToggleLayer { layer_id } => {
                let visible = self
                    .layer_manager
                    .with_layer_mut(&layer_id, |layer| {
                        layer.set_visible(!layer.is_visible());
                        layer.is_visible()
                    })
                    .ok_or_else(|| MapError::Layer(format!("no layer '{}'", layer_id)))?;
                self.event_manager
                    .emit(MapEvent::LayerVisibilityChanged { layer_id, visible });
            }
            Action::SelectBaseLayer { layer_id } => {
                let before = self.layer_manager.summaries();
                if !self.layer_manager.set_base_layer(&layer_id) {
                    return Err(MapError::Layer(format!(
                        "'{}' is not a base layer",
                        layer_id
                    )));
                }
                for previous in before {
                    let visible = self
                        .layer_manager
                        .get_layer(&previous.id)
                        .is_some_and(|layer| layer.is_visible());
                    if visible != previous.visible {
                        self.event_manager.emit(MapEvent::LayerVisibilityChanged {
                            layer_id: previous.id,
                            visible,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn view_changed(&mut self) {
        self.event_manager.emit(MapEvent::ViewChanged {
            center: self.viewport.center,
            resolution: self.viewport.resolution(),
            extent: self.viewport.extent(),
        });
    }

    fn move_ended(&mut self) {
        self.event_manager.emit(MapEvent::MoveEnd {
            center: self.viewport.center,
        });
    }

    /// Element tree of the map: imagery of the latest refresh, then controls
    pub fn elements(&self) -> Vec<UiElement> {
        let mut elements: Vec<UiElement> = self
            .current_requests
            .iter()
            .enumerate()
            .map(|(index, request)| {
                let top_left = self
                    .viewport
                    .map_to_pixel(&Point::new(request.extent.min_x, request.extent.max_y));
                let bottom_right = self
                    .viewport
                    .map_to_pixel(&Point::new(request.extent.max_x, request.extent.min_y));
                UiElement::new(
                    format!("{}.image.{}", request.layer_id, index),
                    ElementKind::Image {
                        layer_id: request.layer_id.clone(),
                        url: request.url.clone(),
                    },
                    Rect::from_corners(top_left, bottom_right),
                )
            })
            .collect();

        let layers = self.layer_manager.summaries();
        let ctx = ControlContext {
            container: self.viewport.size,
            layers: &layers,
        };
        elements.extend(self.controls.draw(&ctx));
        elements
    }

    /// Writes the element tree into the bound container
    pub fn render(&self, document: &mut Document) -> Result<()> {
        let container = document
            .container_mut(&self.container_id)
            .ok_or_else(|| MapError::ContainerNotFound(self.container_id.clone()))?;
        container.set_children(self.elements());
        Ok(())
    }

    pub fn on<F>(&mut self, event_type: &str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.event_manager.on(event_type, callback);
    }

    pub fn process_events(&mut self) -> Vec<MapEvent> {
        self.event_manager.process_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{constants::WORLD_EXTENT, geo::Size},
        layers::wms::WmsLayer,
        tiles::{grid::TilingMode, loader::RequestLog},
    };

    fn map_with_log(tiling: TilingMode) -> (Map, RequestLog) {
        let log = RequestLog::new();
        let viewport = Viewport::new(WORLD_EXTENT, Size::new(512.0, 256.0), 256, 16);
        let mut map = Map::new("map", viewport, Box::new(log.clone()));
        map.add_layer(Box::new(
            WmsLayer::new(
                "wms".to_string(),
                "WMS".to_string(),
                "http://localhost/wms".to_string(),
                vec!["roads".to_string()],
            )
            .with_tiling(tiling),
        ))
        .unwrap();
        (map, log)
    }

    #[test]
    fn test_refresh_submits_to_sink() {
        let (mut map, log) = map_with_log(TilingMode::SingleTile);
        map.zoom_to_max_extent().unwrap();

        assert_eq!(log.len(), 1);
        assert_eq!(map.current_requests().len(), 1);
        assert_eq!(map.refresh_count(), 1);

        assert_eq!(map.refresh().unwrap(), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_zoom_to_extent_rejects_inverted_box() {
        let (mut map, log) = map_with_log(TilingMode::Tiled);
        let inverted = Extent::new(10.0, 0.0, 0.0, 10.0);
        assert!(map.zoom_to_extent(&inverted, true).is_err());
        assert!(log.is_empty());
    }

    #[test]
    fn test_hidden_layer_refresh_is_empty() {
        let (mut map, log) = map_with_log(TilingMode::Tiled);
        map.zoom_to_max_extent().unwrap();
        let before = log.len();
        assert!(before > 0);

        map.set_layer_visible("wms", false).unwrap();
        assert_eq!(log.len(), before);
        assert!(map.current_requests().is_empty());
        assert!(map.set_layer_visible("missing", true).is_err());
    }

    #[test]
    fn test_events_queue_until_processed() {
        let (mut map, _log) = map_with_log(TilingMode::SingleTile);
        map.zoom_to_max_extent().unwrap();

        let types: Vec<&str> = map
            .process_events()
            .iter()
            .map(MapEvent::event_type)
            .collect();
        assert_eq!(types, vec!["layeradd", "viewchanged", "refresh"]);
        assert!(map.process_events().is_empty());
    }

    #[test]
    fn test_image_elements_cover_requests() {
        let (mut map, _log) = map_with_log(TilingMode::SingleTile);
        map.zoom_to_max_extent().unwrap();

        let images: Vec<UiElement> = map.elements().into_iter().filter(|e| e.is_image()).collect();
        assert_eq!(images.len(), 1);
        // Single tile is 1.5x the view, centered on it
        let rect = images[0].rect;
        assert!((rect.width - 768.0).abs() < 1e-6);
        assert!((rect.x + 128.0).abs() < 1e-6);
    }

    #[test]
    fn test_input_without_controls_is_ignored() {
        let (mut map, log) = map_with_log(TilingMode::SingleTile);
        let handled = map
            .handle_input(InputEvent::DoubleClick {
                position: Point::new(10.0, 10.0),
            })
            .unwrap();
        assert!(!handled);
        assert!(log.is_empty());
    }
}
