use crate::{FINAL_MARKER_ID, TEMPORARY_MARKER_ID};

/// Handle to an element owned by a [`Surface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Circle,
    Text,
    TextPath,
    Path,
}

impl ElementKind {
    pub fn tag(self) -> &'static str {
        match self {
            ElementKind::Circle => "circle",
            ElementKind::Text => "text",
            ElementKind::TextPath => "textPath",
            ElementKind::Path => "path",
        }
    }
}

/// Shared arrowhead definitions referenced by directed edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArrowMarker {
    /// Shown while an edge is still being drawn.
    Temporary,
    Final,
}

impl ArrowMarker {
    pub fn id(self) -> &'static str {
        match self {
            ArrowMarker::Temporary => TEMPORARY_MARKER_ID,
            ArrowMarker::Final => FINAL_MARKER_ID,
        }
    }

    pub fn reference(self) -> String {
        format!("url(#{})", self.id())
    }
}

/// Retained-mode drawing target the diagram writes its visuals to.
///
/// Operations on elements that were already removed are ignored.
pub trait Surface {
    /// Creates a top-level group.
    fn create_group(&mut self, class: &str) -> ElementId;

    fn create_element(&mut self, parent: ElementId, kind: ElementKind) -> ElementId;

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str);

    fn remove_attribute(&mut self, element: ElementId, name: &str);

    fn set_text(&mut self, element: ElementId, text: &str);

    fn add_class(&mut self, element: ElementId, class: &str);

    fn remove_class(&mut self, element: ElementId, class: &str);

    /// Makes sure the shared definition for `marker` exists.
    fn use_marker(&mut self, marker: ArrowMarker);

    /// Removes `element` together with its children.
    fn remove(&mut self, element: ElementId);
}
