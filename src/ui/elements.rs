use crate::core::geo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in container pixels, origin at the top-left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_min_size(min: Point, size: Size) -> Self {
        Self::new(min.x, min.y, size.width, size.height)
    }

    /// Rectangle spanned by two corners in any order
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::new(
            a.x.min(b.x),
            a.y.min(b.y),
            (a.x - b.x).abs(),
            (a.y - b.y).abs(),
        )
    }

    pub fn min(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn max(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    /// Edges included on the top-left, excluded on the bottom-right
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }
}

/// Simple position type for UI elements
#[derive(Debug, Clone, PartialEq)]
pub enum Position {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Position {
    pub fn calculate_rect(&self, container: Size, size: Size, margin: f64) -> Rect {
        let min = match self {
            Position::TopLeft => Point::new(margin, margin),
            Position::TopRight => Point::new(container.width - margin - size.width, margin),
            Position::BottomLeft => Point::new(margin, container.height - margin - size.height),
            Position::BottomRight => Point::new(
                container.width - margin - size.width,
                container.height - margin - size.height,
            ),
        };
        Rect::from_min_size(min, size)
    }
}

/// What a rendered element is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    /// Placeholder for a requested image
    Image { layer_id: String, url: String },
    /// Clickable button
    Button,
    /// Text label
    Label,
    /// Container for other elements
    Panel,
    /// Layer switcher row
    LayerEntry {
        layer_id: String,
        checked: bool,
        base_layer: bool,
    },
}

/// Headless stand-in for a DOM node written into a container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiElement {
    pub id: String,
    pub kind: ElementKind,
    pub rect: Rect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl UiElement {
    pub fn new(id: impl Into<String>, kind: ElementKind, rect: Rect) -> Self {
        Self {
            id: id.into(),
            kind,
            rect,
            text: None,
        }
    }

    pub fn button(id: impl Into<String>, rect: Rect) -> Self {
        Self::new(id, ElementKind::Button, rect)
    }

    pub fn label(id: impl Into<String>, rect: Rect, text: impl Into<String>) -> Self {
        Self::new(id, ElementKind::Label, rect).with_text(text)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, ElementKind::Image { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_rects() {
        let container = Size::new(800.0, 600.0);
        let size = Size::new(100.0, 20.0);

        assert_eq!(
            Position::TopLeft.calculate_rect(container, size, 4.0),
            Rect::new(4.0, 4.0, 100.0, 20.0)
        );
        assert_eq!(
            Position::BottomRight.calculate_rect(container, size, 4.0),
            Rect::new(696.0, 576.0, 100.0, 20.0)
        );
        assert_eq!(
            Position::TopRight.calculate_rect(container, size, 0.0),
            Rect::new(700.0, 0.0, 100.0, 20.0)
        );
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(10.0, 10.0, 18.0, 18.0);
        assert!(rect.contains(&Point::new(10.0, 10.0)));
        assert!(rect.contains(&Point::new(27.9, 27.9)));
        assert!(!rect.contains(&Point::new(28.0, 20.0)));
        assert!(!rect.contains(&Point::new(5.0, 20.0)));
    }

    #[test]
    fn test_rect_from_corners() {
        let rect = Rect::from_corners(Point::new(50.0, 10.0), Point::new(20.0, 40.0));
        assert_eq!(rect, Rect::new(20.0, 10.0, 30.0, 30.0));
    }

    #[test]
    fn test_element_json_shape() {
        let element = UiElement::label("attribution", Rect::new(0.0, 0.0, 10.0, 10.0), "(c) City");
        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["kind"]["type"], "label");
        assert_eq!(json["text"], "(c) City");

        let button = UiElement::button("zoomin", Rect::new(0.0, 0.0, 18.0, 18.0));
        assert!(serde_json::to_value(&button).unwrap().get("text").is_none());
    }
}
