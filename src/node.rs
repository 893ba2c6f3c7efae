use log::{debug, trace};
use std::collections::{BTreeSet, HashMap};

use crate::geometry::Point;
use crate::ids::{EdgeId, IdAllocator, NodeId};
use crate::surface::{ElementId, ElementKind, Surface};
use crate::{GRABBED_CLASS, NODE_CLASS, NODE_GROUP_CLASS, NODE_LABEL_OFFSET, Result};

/// Read access to node positions by id.
pub trait NodePositions {
    fn position_of(&self, id: &NodeId) -> Option<Point>;
}

impl NodePositions for HashMap<NodeId, Node> {
    fn position_of(&self, id: &NodeId) -> Option<Point> {
        self.get(id).map(Node::position)
    }
}

#[derive(Debug, Clone, Copy)]
struct NodeVisual {
    group: ElementId,
    circle: ElementId,
    label: ElementId,
}

/// A draggable, labelled point.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    label: String,
    position: Point,
    grabbed: bool,
    edges: BTreeSet<EdgeId>,
    visual: NodeVisual,
}

impl Node {
    /// Creates a node at `(x, y)`. An empty or missing `name` falls back to
    /// the allocator's sequence number.
    pub fn create<S: Surface>(
        surface: &mut S,
        ids: &mut IdAllocator,
        x: f32,
        y: f32,
        name: Option<&str>,
    ) -> Result<Self> {
        let identity = ids.allocate_node(name)?;
        let position = Point::new(x, y);

        let group = surface.create_group(NODE_GROUP_CLASS);
        let circle = surface.create_element(group, ElementKind::Circle);
        surface.add_class(circle, NODE_CLASS);
        surface.set_attribute(circle, "id", identity.id.as_str());

        let label = surface.create_element(group, ElementKind::Text);
        surface.set_attribute(label, "alignment-baseline", "after-edge");
        surface.set_attribute(label, "for-node", &identity.label);
        surface.set_text(label, &identity.label);

        let node = Self {
            id: identity.id,
            label: identity.label,
            position,
            grabbed: false,
            edges: BTreeSet::new(),
            visual: NodeVisual {
                group,
                circle,
                label,
            },
        };
        node.draw(surface);

        debug!("created node '{}' at ({x}, {y})", node.id);
        Ok(node)
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Where the name label is drawn.
    pub fn label_position(&self) -> Point {
        Point::new(self.position.x, self.position.y - NODE_LABEL_OFFSET)
    }

    pub fn is_grabbed(&self) -> bool {
        self.grabbed
    }

    pub fn incident_edges(&self) -> impl Iterator<Item = &EdgeId> + '_ {
        self.edges.iter()
    }

    pub fn group_element(&self) -> ElementId {
        self.visual.group
    }

    pub fn circle_element(&self) -> ElementId {
        self.visual.circle
    }

    pub fn label_element(&self) -> ElementId {
        self.visual.label
    }

    pub fn begin_drag<S: Surface>(&mut self, surface: &mut S) {
        self.grabbed = true;
        surface.add_class(self.visual.circle, GRABBED_CLASS);
    }

    pub fn move_to<S: Surface>(&mut self, surface: &mut S, x: f32, y: f32) {
        self.position = Point::new(x, y);
        self.draw(surface);
        trace!("node '{}' moved to ({x}, {y})", self.id);
    }

    pub fn end_drag<S: Surface>(&mut self, surface: &mut S) {
        self.grabbed = false;
        surface.remove_class(self.visual.circle, GRABBED_CLASS);
    }

    pub(crate) fn attach_edge(&mut self, edge: EdgeId) {
        self.edges.insert(edge);
    }

    pub(crate) fn detach_edge(&mut self, edge: &EdgeId) {
        self.edges.remove(edge);
    }

    pub fn undraw<S: Surface>(self, surface: &mut S, ids: &mut IdAllocator) {
        surface.remove(self.visual.group);
        ids.release_node(&self.id);
        debug!("removed node '{}'", self.id);
    }

    fn draw<S: Surface>(&self, surface: &mut S) {
        let label = self.label_position();
        surface.set_attribute(self.visual.circle, "cx", &self.position.x.to_string());
        surface.set_attribute(self.visual.circle, "cy", &self.position.y.to_string());
        surface.set_attribute(self.visual.label, "x", &label.x.to_string());
        surface.set_attribute(self.visual.label, "y", &label.y.to_string());
    }
}
