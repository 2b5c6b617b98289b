use crate::{
    core::{
        constants::{ATTRIBUTION_SEPARATOR, PAN_SLIDE_FACTOR},
        geo::{Point, Size},
    },
    input::{
        events::{Action, InputEvent},
        kinetic::Kinetic,
    },
    layers::base::LayerSummary,
    ui::elements::{ElementKind, Position, Rect, UiElement},
};
use serde::{Deserialize, Serialize};

/// UI affordances a viewer can enable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlKind {
    Navigation,
    PanZoom,
    Attribution,
    LayerSwitcher,
}

impl ControlKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlKind::Navigation => "navigation",
            ControlKind::PanZoom => "pan-zoom",
            ControlKind::Attribution => "attribution",
            ControlKind::LayerSwitcher => "layer-switcher",
        }
    }

    /// Creates the control with its default settings
    pub fn create(self, kinetic: bool) -> Box<dyn MapControl> {
        match self {
            ControlKind::Navigation => Box::new(Navigation::new(kinetic)),
            ControlKind::PanZoom => Box::new(PanZoom::new()),
            ControlKind::Attribution => Box::new(AttributionControl::new()),
            ControlKind::LayerSwitcher => Box::new(LayerSwitcher::new()),
        }
    }
}

impl std::fmt::Display for ControlKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Container and layer state a control may read while drawing or handling input
pub struct ControlContext<'a> {
    pub container: Size,
    pub layers: &'a [LayerSummary],
}

/// A UI affordance attached to a map
pub trait MapControl: Send + Sync {
    fn kind(&self) -> ControlKind;

    /// Elements this control contributes to the container
    fn draw(&self, ctx: &ControlContext) -> Vec<UiElement>;

    /// `Some` when the control consumed the event, with the actions to apply
    fn handle_input(&mut self, event: &InputEvent, ctx: &ControlContext) -> Option<Vec<Action>>;
}

/// Drag panning, wheel and double-click zoom. Draws nothing.
pub struct Navigation {
    last_position: Option<Point>,
    kinetic: Option<Kinetic>,
}

impl Navigation {
    pub fn new(kinetic: bool) -> Self {
        Self {
            last_position: None,
            kinetic: kinetic.then(Kinetic::new),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.last_position.is_some()
    }

    pub fn is_kinetic(&self) -> bool {
        self.kinetic.is_some()
    }

    /// Pointer motion moves the map content, so the view pans the other way
    fn view_offset(from: Point, to: Point) -> Point {
        from.subtract(&to)
    }
}

impl MapControl for Navigation {
    fn kind(&self) -> ControlKind {
        ControlKind::Navigation
    }

    fn draw(&self, _ctx: &ControlContext) -> Vec<UiElement> {
        Vec::new()
    }

    fn handle_input(&mut self, event: &InputEvent, _ctx: &ControlContext) -> Option<Vec<Action>> {
        match *event {
            InputEvent::DragStart { position, time_ms } => {
                self.last_position = Some(position);
                if let Some(kinetic) = &mut self.kinetic {
                    kinetic.begin(position, time_ms);
                }
                Some(Vec::new())
            }
            InputEvent::Drag { position, time_ms } => {
                let last = self.last_position?;
                self.last_position = Some(position);
                if let Some(kinetic) = &mut self.kinetic {
                    kinetic.update(position, time_ms);
                }
                Some(vec![Action::DragPan {
                    delta: Self::view_offset(last, position),
                }])
            }
            InputEvent::DragEnd { position, time_ms } => {
                let last = self.last_position.take()?;
                let mut actions = vec![Action::DragPan {
                    delta: Self::view_offset(last, position),
                }];

                let movement = self
                    .kinetic
                    .as_mut()
                    .and_then(|kinetic| kinetic.end(position, time_ms));
                if let Some(movement) = movement {
                    log::debug!(
                        "kinetic pan at {:.3} px/ms over {:.0} ms",
                        movement.speed,
                        movement.duration_ms()
                    );
                    actions.extend(movement.steps().into_iter().map(|step| Action::DragPan {
                        delta: step.multiply(-1.0),
                    }));
                }

                actions.push(Action::DragEnd);
                Some(actions)
            }
            InputEvent::Scroll { delta, position } => {
                if delta > 0.0 {
                    Some(vec![Action::ZoomIn {
                        focus: Some(position),
                    }])
                } else if delta < 0.0 {
                    Some(vec![Action::ZoomOut {
                        focus: Some(position),
                    }])
                } else {
                    None
                }
            }
            InputEvent::DoubleClick { position } => Some(vec![Action::ZoomIn {
                focus: Some(position),
            }]),
            InputEvent::Click { .. } => None,
        }
    }
}

const PAN_ZOOM_ORIGIN: Point = Point { x: 4.0, y: 4.0 };
const PAN_ZOOM_BUTTON: Size = Size {
    width: 18.0,
    height: 18.0,
};

/// Pan arrows and zoom buttons in the top-left corner
pub struct PanZoom {
    origin: Point,
    slide_factor: f64,
}

impl PanZoom {
    pub fn new() -> Self {
        Self {
            origin: PAN_ZOOM_ORIGIN,
            slide_factor: PAN_SLIDE_FACTOR,
        }
    }

    /// Button ids, rectangles and the action each triggers
    fn buttons(&self) -> Vec<(&'static str, Rect, Action)> {
        let w = PAN_ZOOM_BUTTON.width;
        let h = PAN_ZOOM_BUTTON.height;
        let px = self.origin;
        let centered = Point::new(px.x + w / 2.0, px.y);
        let at = |x: f64, y: f64| Rect::from_min_size(Point::new(x, y), PAN_ZOOM_BUTTON);
        let step = self.slide_factor;

        vec![
            (
                "panup",
                at(centered.x, centered.y),
                Action::Pan {
                    delta: Point::new(0.0, -step),
                },
            ),
            (
                "panleft",
                at(px.x, centered.y + h),
                Action::Pan {
                    delta: Point::new(-step, 0.0),
                },
            ),
            (
                "panright",
                at(px.x + w, centered.y + h),
                Action::Pan {
                    delta: Point::new(step, 0.0),
                },
            ),
            (
                "pandown",
                at(centered.x, centered.y + h * 2.0),
                Action::Pan {
                    delta: Point::new(0.0, step),
                },
            ),
            (
                "zoomin",
                at(centered.x, centered.y + h * 3.0 + 5.0),
                Action::ZoomIn { focus: None },
            ),
            (
                "zoomworld",
                at(centered.x, centered.y + h * 4.0 + 5.0),
                Action::ZoomToMaxExtent,
            ),
            (
                "zoomout",
                at(centered.x, centered.y + h * 5.0 + 5.0),
                Action::ZoomOut { focus: None },
            ),
        ]
    }
}

impl Default for PanZoom {
    fn default() -> Self {
        Self::new()
    }
}

impl MapControl for PanZoom {
    fn kind(&self) -> ControlKind {
        ControlKind::PanZoom
    }

    fn draw(&self, _ctx: &ControlContext) -> Vec<UiElement> {
        self.buttons()
            .into_iter()
            .map(|(id, rect, _)| UiElement::button(format!("pan-zoom.{}", id), rect))
            .collect()
    }

    fn handle_input(&mut self, event: &InputEvent, _ctx: &ControlContext) -> Option<Vec<Action>> {
        let position = event.position();
        let (_, _, action) = self
            .buttons()
            .into_iter()
            .find(|(_, rect, _)| rect.contains(&position))?;

        match event {
            InputEvent::Click { .. } => Some(vec![action]),
            // Buttons swallow everything else that lands on them
            _ => Some(Vec::new()),
        }
    }
}

/// Credits of the visible layers, bottom-right
pub struct AttributionControl {
    separator: String,
}

impl AttributionControl {
    pub fn new() -> Self {
        Self {
            separator: ATTRIBUTION_SEPARATOR.to_string(),
        }
    }

    pub fn text(&self, layers: &[LayerSummary]) -> String {
        let mut credits: Vec<&str> = Vec::new();
        for layer in layers.iter().filter(|l| l.visible) {
            if let Some(attribution) = layer.attribution.as_deref() {
                if !attribution.is_empty() && !credits.contains(&attribution) {
                    credits.push(attribution);
                }
            }
        }
        credits.join(&self.separator)
    }
}

impl Default for AttributionControl {
    fn default() -> Self {
        Self::new()
    }
}

impl MapControl for AttributionControl {
    fn kind(&self) -> ControlKind {
        ControlKind::Attribution
    }

    fn draw(&self, ctx: &ControlContext) -> Vec<UiElement> {
        let text = self.text(ctx.layers);
        // Rough glyph metrics; the host decides the final layout
        let size = Size::new(text.chars().count() as f64 * 6.0, 14.0);
        let rect = Position::BottomRight.calculate_rect(ctx.container, size, 3.0);
        vec![UiElement::label("attribution", rect, text)]
    }

    fn handle_input(&mut self, _event: &InputEvent, _ctx: &ControlContext) -> Option<Vec<Action>> {
        None
    }
}

const SWITCHER_WIDTH: f64 = 200.0;
const SWITCHER_ROW: f64 = 20.0;
const SWITCHER_MARGIN: f64 = 10.0;

/// Panel listing every layer; base layers are exclusive, overlays toggle
pub struct LayerSwitcher;

impl LayerSwitcher {
    pub fn new() -> Self {
        Self
    }

    fn panel_rect(&self, ctx: &ControlContext) -> Rect {
        let size = Size::new(SWITCHER_WIDTH, SWITCHER_ROW * (ctx.layers.len() + 1) as f64);
        Position::TopRight.calculate_rect(ctx.container, size, SWITCHER_MARGIN)
    }

    fn entry_rects<'a>(
        &self,
        ctx: &ControlContext<'a>,
    ) -> impl Iterator<Item = (&'a LayerSummary, Rect)> {
        let panel = self.panel_rect(ctx);
        let layers: &'a [LayerSummary] = ctx.layers;
        layers.iter().enumerate().map(move |(row, layer)| {
            let rect = Rect::new(
                panel.x,
                panel.y + SWITCHER_ROW * (row + 1) as f64,
                panel.width,
                SWITCHER_ROW,
            );
            (layer, rect)
        })
    }
}

impl Default for LayerSwitcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MapControl for LayerSwitcher {
    fn kind(&self) -> ControlKind {
        ControlKind::LayerSwitcher
    }

    fn draw(&self, ctx: &ControlContext) -> Vec<UiElement> {
        let mut elements =
            vec![UiElement::new("layer-switcher", ElementKind::Panel, self.panel_rect(ctx))
                .with_text("Layers")];

        elements.extend(self.entry_rects(ctx).map(|(layer, rect)| {
            UiElement::new(
                format!("layer-switcher.{}", layer.id),
                ElementKind::LayerEntry {
                    layer_id: layer.id.clone(),
                    checked: layer.visible,
                    base_layer: layer.is_base_layer,
                },
                rect,
            )
            .with_text(layer.name.clone())
        }));
        elements
    }

    fn handle_input(&mut self, event: &InputEvent, ctx: &ControlContext) -> Option<Vec<Action>> {
        let position = event.position();
        if !self.panel_rect(ctx).contains(&position) {
            return None;
        }

        let InputEvent::Click { .. } = event else {
            return Some(Vec::new());
        };

        let actions = self
            .entry_rects(ctx)
            .find(|(_, rect)| rect.contains(&position))
            .map(|(layer, _)| {
                let layer_id = layer.id.clone();
                if layer.is_base_layer {
                    vec![Action::SelectBaseLayer { layer_id }]
                } else {
                    vec![Action::ToggleLayer { layer_id }]
                }
            })
            .unwrap_or_default();
        Some(actions)
    }
}

/// Control manager that holds the attached controls in attach order
#[derive(Default)]
pub struct ControlManager {
    controls: Vec<Box<dyn MapControl>>,
    /// Control that consumed the current gesture's `DragStart`
    drag_owner: Option<usize>,
}

impl ControlManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a control on top of the existing ones. A kind already
    /// attached is not added twice.
    pub fn add(&mut self, control: Box<dyn MapControl>) -> bool {
        if self.has(control.kind()) {
            return false;
        }
        self.controls.push(control);
        true
    }

    pub fn has(&self, kind: ControlKind) -> bool {
        self.controls.iter().any(|c| c.kind() == kind)
    }

    pub fn kinds(&self) -> Vec<ControlKind> {
        self.controls.iter().map(|c| c.kind()).collect()
    }

    /// Elements of all controls, bottom control first
    pub fn draw(&self, ctx: &ControlContext) -> Vec<UiElement> {
        self.controls.iter().flat_map(|c| c.draw(ctx)).collect()
    }

    /// Offers the event to the topmost control first; the first one that
    /// consumes it stops propagation.
    ///
    /// `Drag` and `DragEnd` go to the control that took the `DragStart`,
    /// wherever the pointer is when they arrive.
    pub fn handle_input(&mut self, event: &InputEvent, ctx: &ControlContext) -> Option<Vec<Action>> {
        if let InputEvent::Drag { .. } | InputEvent::DragEnd { .. } = event {
            if let Some(owner) = self.drag_owner {
                if let InputEvent::DragEnd { .. } = event {
                    self.drag_owner = None;
                }
                return self.controls.get_mut(owner)?.handle_input(event, ctx);
            }
        }

        let (index, actions) = self
            .controls
            .iter_mut()
            .enumerate()
            .rev()
            .find_map(|(index, control)| {
                control
                    .handle_input(event, ctx)
                    .map(|actions| (index, actions))
            })?;
        if let InputEvent::DragStart { .. } = event {
            self.drag_owner = Some(index);
        }
        Some(actions)
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, base: bool, attribution: Option<&str>) -> LayerSummary {
        LayerSummary {
            id: id.to_string(),
            name: id.to_uppercase(),
            visible: true,
            is_base_layer: base,
            attribution: attribution.map(str::to_string),
        }
    }

    fn click(x: f64, y: f64) -> InputEvent {
        InputEvent::Click {
            position: Point::new(x, y),
        }
    }

    #[test]
    fn test_control_kind_serde() {
        let kinds: Vec<ControlKind> =
            serde_json::from_str(r#"["navigation", "pan-zoom", "attribution", "layer-switcher"]"#)
                .unwrap();
        assert_eq!(
            kinds,
            vec![
                ControlKind::Navigation,
                ControlKind::PanZoom,
                ControlKind::Attribution,
                ControlKind::LayerSwitcher
            ]
        );
        assert_eq!(ControlKind::PanZoom.to_string(), "pan-zoom");
    }

    #[test]
    fn test_pan_zoom_layout() {
        let ctx = ControlContext {
            container: Size::new(800.0, 600.0),
            layers: &[],
        };
        let elements = PanZoom::new().draw(&ctx);
        let rect = |id: &str| {
            elements
                .iter()
                .find(|e| e.id == format!("pan-zoom.{}", id))
                .unwrap()
                .rect
        };

        assert_eq!(elements.len(), 7);
        assert_eq!(rect("panup"), Rect::new(13.0, 4.0, 18.0, 18.0));
        assert_eq!(rect("panleft"), Rect::new(4.0, 22.0, 18.0, 18.0));
        assert_eq!(rect("panright"), Rect::new(22.0, 22.0, 18.0, 18.0));
        assert_eq!(rect("zoomout"), Rect::new(13.0, 99.0, 18.0, 18.0));
    }

    #[test]
    fn test_pan_zoom_clicks() {
        let ctx = ControlContext {
            container: Size::new(800.0, 600.0),
            layers: &[],
        };
        let mut control = PanZoom::new();

        assert_eq!(
            control.handle_input(&click(20.0, 70.0), &ctx),
            Some(vec![Action::ZoomIn { focus: None }])
        );
        assert_eq!(
            control.handle_input(&click(30.0, 30.0), &ctx),
            Some(vec![Action::Pan {
                delta: Point::new(50.0, 0.0)
            }])
        );
        assert_eq!(control.handle_input(&click(400.0, 300.0), &ctx), None);
    }

    #[test]
    fn test_navigation_drag_without_kinetic() {
        let ctx = ControlContext {
            container: Size::new(800.0, 600.0),
            layers: &[],
        };
        let mut nav = Navigation::new(false);

        let start = InputEvent::DragStart {
            position: Point::new(100.0, 100.0),
            time_ms: 0.0,
        };
        assert_eq!(nav.handle_input(&start, &ctx), Some(vec![]));
        assert!(nav.is_dragging());

        let drag = InputEvent::Drag {
            position: Point::new(130.0, 90.0),
            time_ms: 20.0,
        };
        assert_eq!(
            nav.handle_input(&drag, &ctx),
            Some(vec![Action::DragPan {
                delta: Point::new(-30.0, 10.0)
            }])
        );

        let end = InputEvent::DragEnd {
            position: Point::new(140.0, 90.0),
            time_ms: 40.0,
        };
        assert_eq!(
            nav.handle_input(&end, &ctx),
            Some(vec![
                Action::DragPan {
                    delta: Point::new(-10.0, 0.0)
                },
                Action::DragEnd
            ])
        );
        assert!(!nav.is_dragging());
    }

    #[test]
    fn test_navigation_kinetic_continues_after_release() {
        let ctx = ControlContext {
            container: Size::new(800.0, 600.0),
            layers: &[],
        };
        let mut nav = Navigation::new(true);
        nav.handle_input(
            &InputEvent::DragStart {
                position: Point::new(0.0, 0.0),
                time_ms: 0.0,
            },
            &ctx,
        );
        nav.handle_input(
            &InputEvent::Drag {
                position: Point::new(20.0, 0.0),
                time_ms: 20.0,
            },
            &ctx,
        );
        let actions = nav
            .handle_input(
                &InputEvent::DragEnd {
                    position: Point::new(40.0, 0.0),
                    time_ms: 40.0,
                },
                &ctx,
            )
            .unwrap();

        assert!(actions.len() > 2);
        assert_eq!(actions.last(), Some(&Action::DragEnd));
        // Content keeps sliding right, so the view keeps moving west
        assert!(actions[1..actions.len() - 1].iter().all(|a| matches!(
            a,
            Action::DragPan { delta } if delta.x < 0.0
        )));
    }

    #[test]
    fn test_navigation_ignores_stray_drag() {
        let ctx = ControlContext {
            container: Size::new(800.0, 600.0),
            layers: &[],
        };
        let mut nav = Navigation::new(true);
        let drag = InputEvent::Drag {
            position: Point::new(1.0, 1.0),
            time_ms: 0.0,
        };
        assert_eq!(nav.handle_input(&drag, &ctx), None);
        assert_eq!(nav.handle_input(&click(1.0, 1.0), &ctx), None);
    }

    #[test]
    fn test_attribution_text() {
        let mut hidden = summary("c", true, Some("(c) Hidden"));
        hidden.visible = false;
        let layers = vec![
            summary("a", true, Some("(c) County GIS")),
            summary("b", false, Some("(c) City")),
            summary("d", false, Some("(c) City")),
            summary("e", false, None),
            hidden,
        ];
        assert_eq!(
            AttributionControl::new().text(&layers),
            "(c) County GIS, (c) City"
        );
    }

    #[test]
    fn test_layer_switcher_clicks() {
        let layers = vec![summary("base", true, None), summary("roads", false, None)];
        let ctx = ControlContext {
            container: Size::new(800.0, 600.0),
            layers: &layers,
        };
        let mut switcher = LayerSwitcher::new();
        let elements = switcher.draw(&ctx);
        assert_eq!(elements.len(), 3);

        let roads = elements
            .iter()
            .find(|e| e.id == "layer-switcher.roads")
            .unwrap()
            .rect;
        let center = Point::new(roads.x + 5.0, roads.y + 5.0);
        assert_eq!(
            switcher.handle_input(&InputEvent::Click { position: center }, &ctx),
            Some(vec![Action::ToggleLayer {
                layer_id: "roads".to_string()
            }])
        );
        assert_eq!(switcher.handle_input(&click(10.0, 500.0), &ctx), None);
    }

    #[test]
    fn test_manager_dispatches_topmost_first() {
        let ctx = ControlContext {
            container: Size::new(800.0, 600.0),
            layers: &[],
        };
        let mut manager = ControlManager::new();
        assert!(manager.add(ControlKind::Navigation.create(true)));
        assert!(manager.add(ControlKind::PanZoom.create(true)));
        assert!(!manager.add(ControlKind::PanZoom.create(true)));

        // Double-click on a button is swallowed by pan-zoom, not zoomed by navigation
        let on_button = InputEvent::DoubleClick {
            position: Point::new(20.0, 70.0),
        };
        assert_eq!(manager.handle_input(&on_button, &ctx), Some(vec![]));

        let on_map = InputEvent::DoubleClick {
            position: Point::new(400.0, 300.0),
        };
        assert_eq!(
            manager.handle_input(&on_map, &ctx),
            Some(vec![Action::ZoomIn {
                focus: Some(Point::new(400.0, 300.0))
            }])
        );
    }

    #[test]
    fn test_manager_routes_drag_to_its_starter() {
        let ctx = ControlContext {
            container: Size::new(800.0, 600.0),
            layers: &[],
        };
        let mut manager = ControlManager::new();
        manager.add(ControlKind::Navigation.create(false));
        manager.add(ControlKind::PanZoom.create(false));

        manager.handle_input(
            &InputEvent::DragStart {
                position: Point::new(300.0, 300.0),
                time_ms: 0.0,
            },
            &ctx,
        );
        // Released on the zoom-in button: navigation still finishes the drag
        let end = manager.handle_input(
            &InputEvent::DragEnd {
                position: Point::new(20.0, 70.0),
                time_ms: 40.0,
            },
            &ctx,
        );
        assert_eq!(
            end,
            Some(vec![
                Action::DragPan {
                    delta: Point::new(280.0, 230.0)
                },
                Action::DragEnd
            ])
        );

        // A drag begun on a button stays with pan-zoom and pans nothing
        let on_button = Point::new(20.0, 70.0);
        manager.handle_input(
            &InputEvent::DragStart {
                position: on_button,
                time_ms: 100.0,
            },
            &ctx,
        );
        let drag = manager.handle_input(
            &InputEvent::Drag {
                position: Point::new(400.0, 300.0),
                time_ms: 120.0,
            },
            &ctx,
        );
        assert_eq!(drag, None);
    }
}
