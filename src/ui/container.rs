use crate::{core::geo::Size, prelude::HashMap, ui::elements::UiElement};

/// Named region of the host page a map renders into
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub id: String,
    pub size: Size,
    children: Vec<UiElement>,
}

impl Container {
    pub fn new(id: impl Into<String>, size: Size) -> Self {
        Self {
            id: id.into(),
            size,
            children: Vec::new(),
        }
    }

    pub fn children(&self) -> &[UiElement] {
        &self.children
    }

    /// Replaces the rendered content
    pub fn set_children(&mut self, children: Vec<UiElement>) {
        self.children = children;
    }

    pub fn find(&self, id: &str) -> Option<&UiElement> {
        self.children.iter().find(|element| element.id == id)
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }
}

/// Headless page: the set of containers a map can be bound to
#[derive(Debug, Clone, Default)]
pub struct Document {
    containers: HashMap<String, Container>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a container, replacing any with the same id
    pub fn add_container(&mut self, id: impl Into<String>, size: Size) -> &mut Container {
        let id = id.into();
        let slot = self
            .containers
            .entry(id.clone())
            .or_insert_with(|| Container::new(id.clone(), size));
        *slot = Container::new(id, size);
        slot
    }

    pub fn with_container(mut self, id: impl Into<String>, size: Size) -> Self {
        self.add_container(id, size);
        self
    }

    pub fn container(&self, id: &str) -> Option<&Container> {
        self.containers.get(id)
    }

    pub fn container_mut(&mut self, id: &str) -> Option<&mut Container> {
        self.containers.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}
