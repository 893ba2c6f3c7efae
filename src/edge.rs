use log::{debug, trace};

use crate::geometry::{EdgePath, LabelOrientation, Offset, Point, format_weight};
use crate::ids::{EdgeId, IdAllocator, NodeId};
use crate::node::{Node, NodePositions};
use crate::surface::{ArrowMarker, ElementId, ElementKind, Surface};
use crate::{
    EDGE_CLASS, EDGE_GROUP_CLASS, Error, Result, SELECTING_CLASS, VISITED_CLASS,
    WEIGHT_LABEL_START_OFFSET,
};

/// Where an edge currently ends.
#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    /// Still being drawn; the end follows the pointer.
    Pending(Point),
    Bound(NodeId),
}

/// Which side of the path baseline the weight label sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Baseline {
    #[default]
    AfterEdge,
    BeforeEdge,
}

impl Baseline {
    fn for_lowered(lowered: bool) -> Self {
        if lowered {
            Baseline::BeforeEdge
        } else {
            Baseline::AfterEdge
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Baseline::AfterEdge => "text-after-edge",
            Baseline::BeforeEdge => "text-before-edge",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightLabel {
    pub weight: f64,
    pub orientation: LabelOrientation,
    pub baseline: Baseline,
}

impl WeightLabel {
    /// Text as drawn, reversed when the label is flipped.
    pub fn text(&self) -> String {
        self.orientation.apply(&format_weight(self.weight))
    }

    pub fn rotation(&self) -> u16 {
        self.orientation.rotation()
    }
}

#[derive(Debug, Clone, Copy)]
struct EdgeVisual {
    group: ElementId,
    path: ElementId,
    text: ElementId,
    text_path: ElementId,
}

/// Connection between two nodes, or a node and itself.
///
/// An edge starts out pending and is finished exactly once, which binds its
/// destination and freezes its weight.
#[derive(Debug, Clone)]
pub struct Edge {
    id: EdgeId,
    from: NodeId,
    to: Destination,
    directed: bool,
    lowered: bool,
    offset: Offset,
    selected: bool,
    visited: bool,
    path: Option<EdgePath>,
    marker: Option<ArrowMarker>,
    label: Option<WeightLabel>,
    visual: EdgeVisual,
}

impl Edge {
    pub fn create<S: Surface>(
        surface: &mut S,
        ids: &mut IdAllocator,
        from: &Node,
        directed: bool,
    ) -> Self {
        let id = ids.allocate_edge();

        let group = surface.create_group(EDGE_GROUP_CLASS);
        let path = surface.create_element(group, ElementKind::Path);
        surface.add_class(path, EDGE_CLASS);
        surface.set_attribute(path, "id", id.as_str());
        surface.set_attribute(path, "from-node", from.id().as_str());

        let marker = directed.then_some(ArrowMarker::Temporary);
        if let Some(marker) = marker {
            surface.use_marker(marker);
            surface.set_attribute(path, "marker-end", &marker.reference());
        }

        let text = surface.create_element(group, ElementKind::Text);
        let text_path = surface.create_element(text, ElementKind::TextPath);

        debug!("started edge '{id}' from '{}' (directed: {directed})", from.id());

        Self {
            id,
            from: from.id().clone(),
            to: Destination::Pending(from.position()),
            directed,
            lowered: false,
            offset: Offset::ZERO,
            selected: false,
            visited: false,
            path: None,
            marker,
            label: None,
            visual: EdgeVisual {
                group,
                path,
                text,
                text_path,
            },
        }
    }

    pub fn id(&self) -> &EdgeId {
        &self.id
    }

    pub fn from(&self) -> &NodeId {
        &self.from
    }

    pub fn to(&self) -> &Destination {
        &self.to
    }

    /// Bound destination, if the edge is finished.
    pub fn to_node(&self) -> Option<&NodeId> {
        match &self.to {
            Destination::Bound(id) => Some(id),
            Destination::Pending(_) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.to, Destination::Pending(_))
    }

    pub fn is_finished(&self) -> bool {
        !self.is_pending()
    }

    pub fn is_self_loop(&self) -> bool {
        self.to_node() == Some(&self.from)
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn is_weighted(&self) -> bool {
        self.label.is_some()
    }

    pub fn weight(&self) -> Option<f64> {
        self.label.as_ref().map(|label| label.weight)
    }

    pub fn is_lowered(&self) -> bool {
        self.lowered
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_visited(&self) -> bool {
        self.visited
    }

    pub fn path(&self) -> Option<&EdgePath> {
        self.path.as_ref()
    }

    pub fn marker(&self) -> Option<ArrowMarker> {
        self.marker
    }

    pub fn label(&self) -> Option<&WeightLabel> {
        self.label.as_ref()
    }

    pub fn group_element(&self) -> ElementId {
        self.visual.group
    }

    pub fn path_element(&self) -> ElementId {
        self.visual.path
    }

    pub fn text_element(&self) -> ElementId {
        self.visual.text
    }

    pub fn text_path_element(&self) -> ElementId {
        self.visual.text_path
    }

    /// Redraws the edge while its origin is at the live point `(x, y)`.
    pub fn move_from<S: Surface, P: NodePositions + ?Sized>(
        &mut self,
        surface: &mut S,
        nodes: &P,
        x: f32,
        y: f32,
        offset: Offset,
    ) -> Result<()> {
        if self.is_self_loop() {
            let anchor = self.from_position(nodes)?;
            self.offset = offset;
            self.set_path(surface, EdgePath::self_loop(anchor));
            return Ok(());
        }

        let start = Point::new(x, y);
        let end = self.to_position(nodes)?;
        self.offset = offset;
        self.set_path(
            surface,
            EdgePath::line(start, end, offset.effective(self.lowered)),
        );
        self.set_orientation(surface, LabelOrientation::for_segment(start, end));
        trace!("edge '{}' origin dragged to ({x}, {y})", self.id);
        Ok(())
    }

    /// Redraws the edge while its destination is at the live point `(x, y)`.
    /// A pending edge also remembers the point as its destination.
    pub fn move_to<S: Surface, P: NodePositions + ?Sized>(
        &mut self,
        surface: &mut S,
        nodes: &P,
        x: f32,
        y: f32,
        offset: Offset,
    ) -> Result<()> {
        let start = self.from_position(nodes)?;
        self.offset = offset;

        if self.is_self_loop() {
            self.set_path(surface, EdgePath::self_loop(start));
            return Ok(());
        }

        let end = Point::new(x, y);
        if self.is_pending() {
            self.to = Destination::Pending(end);
        }
        self.set_path(
            surface,
            EdgePath::line(start, end, offset.effective(self.lowered)),
        );
        self.set_orientation(surface, LabelOrientation::for_segment(start, end));
        trace!("edge '{}' destination dragged to ({x}, {y})", self.id);
        Ok(())
    }

    /// Binds the destination and freezes the weight. Only valid once.
    pub fn finish<S: Surface, P: NodePositions + ?Sized>(
        &mut self,
        surface: &mut S,
        nodes: &P,
        to: &NodeId,
        weighted: bool,
        weight: f64,
        offset: Offset,
    ) -> Result<()> {
        if self.is_finished() {
            return Err(Error::invalid_state(&self.id, "edge is already finished"));
        }
        let start = self.from_position(nodes)?;
        let end = nodes
            .position_of(to)
            .ok_or_else(|| Error::invalid_state(to, "destination node does not exist"))?;

        self.to = Destination::Bound(to.clone());
        self.offset = offset;
        surface.set_attribute(self.visual.path, "to-node", to.as_str());

        if self.is_self_loop() {
            self.set_path(surface, EdgePath::self_loop(start));
            if self.directed {
                self.marker = None;
                surface.remove_attribute(self.visual.path, "marker-end");
            }
        } else {
            self.set_path(
                surface,
                EdgePath::line(start, end, offset.effective(self.lowered)),
            );
            if self.directed {
                let marker = ArrowMarker::Final;
                self.marker = Some(marker);
                surface.use_marker(marker);
                surface.set_attribute(self.visual.path, "marker-end", &marker.reference());
            }
        }

        if weighted {
            let baseline = Baseline::for_lowered(self.lowered);
            self.label = Some(WeightLabel {
                weight,
                orientation: LabelOrientation::for_segment(start, end),
                baseline,
            });
            let text_path = self.visual.text_path;
            surface.set_attribute(text_path, "href", &format!("#{}", self.id));
            surface.set_attribute(text_path, "startOffset", WEIGHT_LABEL_START_OFFSET);
            surface.set_attribute(text_path, "alignment-baseline", baseline.as_str());
            self.draw_label(surface);
        }

        debug!(
            "finished edge '{}' from '{}' to '{to}' (weight: {:?})",
            self.id,
            self.from,
            self.weight()
        );
        Ok(())
    }

    /// Switches to the lowered rendering, drawn with the mirrored `offset`.
    pub fn lower<S: Surface, P: NodePositions + ?Sized>(
        &mut self,
        surface: &mut S,
        nodes: &P,
        offset: Offset,
    ) -> Result<()> {
        let path = self.stored_path(nodes, offset.effective(true))?;
        self.lowered = true;
        self.offset = offset;
        self.set_baseline(surface, Baseline::BeforeEdge);
        self.set_path(surface, path);
        Ok(())
    }

    pub fn raise<S: Surface, P: NodePositions + ?Sized>(
        &mut self,
        surface: &mut S,
        nodes: &P,
    ) -> Result<()> {
        let path = self.stored_path(nodes, Offset::ZERO)?;
        self.lowered = false;
        self.offset = Offset::ZERO;
        self.set_baseline(surface, Baseline::AfterEdge);
        self.set_path(surface, path);
        Ok(())
    }

    pub fn select<S: Surface>(&mut self, surface: &mut S) {
        self.selected = true;
        surface.add_class(self.visual.path, SELECTING_CLASS);
    }

    pub fn unselect<S: Surface>(&mut self, surface: &mut S) {
        self.selected = false;
        surface.remove_class(self.visual.path, SELECTING_CLASS);
    }

    pub fn set_visited<S: Surface>(&mut self, surface: &mut S) {
        self.visited = true;
        surface.add_class(self.visual.path, VISITED_CLASS);
    }

    pub fn set_unvisited<S: Surface>(&mut self, surface: &mut S) {
        self.visited = false;
        surface.remove_class(self.visual.path, VISITED_CLASS);
    }

    pub fn undraw<S: Surface>(self, surface: &mut S, ids: &mut IdAllocator) {
        surface.remove(self.visual.group);
        ids.release_edge();
        debug!("removed edge '{}'", self.id);
    }

    fn from_position<P: NodePositions + ?Sized>(&self, nodes: &P) -> Result<Point> {
        nodes
            .position_of(&self.from)
            .ok_or_else(|| Error::invalid_state(&self.id, "origin node no longer exists"))
    }

    fn to_position<P: NodePositions + ?Sized>(&self, nodes: &P) -> Result<Point> {
        match &self.to {
            Destination::Pending(point) => Ok(*point),
            Destination::Bound(id) => nodes
                .position_of(id)
                .ok_or_else(|| Error::invalid_state(&self.id, "destination node no longer exists")),
        }
    }

    /// Path between the stored endpoint positions.
    fn stored_path<P: NodePositions + ?Sized>(
        &self,
        nodes: &P,
        offset: Offset,
    ) -> Result<EdgePath> {
        let start = self.from_position(nodes)?;
        if self.is_self_loop() {
            return Ok(EdgePath::self_loop(start));
        }
        let end = self.to_position(nodes)?;
        Ok(EdgePath::line(start, end, offset))
    }

    fn set_path<S: Surface>(&mut self, surface: &mut S, path: EdgePath) {
        surface.set_attribute(self.visual.path, "d", &path.to_string());
        self.path = Some(path);
    }

    fn set_orientation<S: Surface>(&mut self, surface: &mut S, orientation: LabelOrientation) {
        if let Some(label) = self.label.as_mut() {
            label.orientation = orientation;
            self.draw_label(surface);
        }
    }

    fn set_baseline<S: Surface>(&mut self, surface: &mut S, baseline: Baseline) {
        if let Some(label) = self.label.as_mut() {
            label.baseline = baseline;
            surface.set_attribute(self.visual.text_path, "alignment-baseline", baseline.as_str());
        }
    }

    fn draw_label<S: Surface>(&self, surface: &mut S) {
        if let Some(label) = &self.label {
            surface.set_text(self.visual.text_path, &label.text());
            surface.set_attribute(self.visual.text, "rotate", &label.rotation().to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SvgScene;
    use std::collections::HashMap;

    struct Fixture {
        scene: SvgScene,
        ids: IdAllocator,
        nodes: HashMap<NodeId, Node>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                scene: SvgScene::new(),
                ids: IdAllocator::new(),
                nodes: HashMap::new(),
            }
        }

        fn node(&mut self, name: &str, x: f32, y: f32) -> NodeId {
            let node = Node::create(&mut self.scene, &mut self.ids, x, y, Some(name)).unwrap();
            let id = node.id().clone();
            self.nodes.insert(id.clone(), node);
            id
        }

        fn edge(&mut self, from: &NodeId, directed: bool) -> Edge {
            Edge::create(&mut self.scene, &mut self.ids, &self.nodes[from], directed)
        }
    }

    #[test]
    fn pending_directed_edge_uses_temporary_marker() {
        let mut fx = Fixture::new();
        let a = fx.node("A", 0.0, 0.0);
        let edge = fx.edge(&a, true);

        assert!(edge.is_pending());
        assert_eq!(edge.id().as_str(), "edge_1");
        assert_eq!(edge.marker(), Some(ArrowMarker::Temporary));
        assert_eq!(
            fx.scene.attribute(edge.path_element(), "marker-end"),
            Some("url(#arrowhead_temp)")
        );
        assert_eq!(fx.scene.attribute(edge.path_element(), "from-node"), Some("node_A"));
    }

    #[test]
    fn dragging_pending_edge_tracks_pointer() {
        let mut fx = Fixture::new();
        let a = fx.node("A", 10.0, 10.0);
        let mut edge = fx.edge(&a, false);

        edge.move_to(&mut fx.scene, &fx.nodes, 50.0, 80.0, Offset::ZERO).unwrap();

        assert_eq!(edge.to(), &Destination::Pending(Point::new(50.0, 80.0)));
        assert_eq!(
            fx.scene.attribute(edge.path_element(), "d"),
            Some("M 10,10 L 50,80")
        );
    }

    #[test]
    fn finish_binds_destination_and_orients_label() {
        let mut fx = Fixture::new();
        let a = fx.node("A", 0.0, 0.0);
        let b = fx.node("B", 100.0, 0.0);
        let mut edge = fx.edge(&a, true);

        edge.finish(&mut fx.scene, &fx.nodes, &b, true, 42.0, Offset::ZERO).unwrap();

        assert_eq!(edge.to_node(), Some(&b));
        assert_eq!(edge.marker(), Some(ArrowMarker::Final));
        assert_eq!(
            fx.scene.attribute(edge.path_element(), "marker-end"),
            Some("url(#arrowhead)")
        );
        assert_eq!(fx.scene.attribute(edge.path_element(), "d"), Some("M 0,0 L 100,0"));
        assert_eq!(fx.scene.attribute(edge.path_element(), "to-node"), Some("node_B"));
        let label = edge.label().unwrap();
        assert_eq!(label.text(), "42");
        assert_eq!(label.rotation(), 0);
        assert_eq!(fx.scene.text(edge.text_path_element()), Some("42"));
        assert_eq!(fx.scene.attribute(edge.text_path_element(), "href"), Some("#edge_1"));
        assert_eq!(
            fx.scene.attribute(edge.text_path_element(), "startOffset"),
            Some("50%")
        );
        assert_eq!(fx.scene.attribute(edge.text_element(), "rotate"), Some("0"));
    }

    #[test]
    fn finishing_twice_is_rejected_without_side_effects() {
        let mut fx = Fixture::new();
        let a = fx.node("A", 0.0, 0.0);
        let b = fx.node("B", 100.0, 0.0);
        let c = fx.node("C", -100.0, 0.0);
        let mut edge = fx.edge(&a, false);
        edge.finish(&mut fx.scene, &fx.nodes, &b, true, 7.0, Offset::ZERO).unwrap();

        let err = edge
            .finish(&mut fx.scene, &fx.nodes, &c, true, 9.0, Offset::ZERO)
            .unwrap_err();

        assert_eq!(err.kind(), crate::ErrorKind::InvalidState);
        assert_eq!(edge.to_node(), Some(&b));
        assert_eq!(edge.weight(), Some(7.0));
    }

    #[test]
    fn finishing_onto_missing_node_keeps_edge_pending() {
        let mut fx = Fixture::new();
        let a = fx.node("A", 0.0, 0.0);
        let mut edge = fx.edge(&a, false);

        let ghost = NodeId::new("node_ghost");
        assert!(
            edge.finish(&mut fx.scene, &fx.nodes, &ghost, false, 0.0, Offset::ZERO)
                .is_err()
        );
        assert!(edge.is_pending());
    }

    #[test]
    fn self_loop_drops_marker_and_ignores_offsets() {
        let mut fx = Fixture::new();
        let a = fx.node("A", 10.0, 100.0);
        let mut edge = fx.edge(&a, true);

        edge.finish(&mut fx.scene, &fx.nodes, &a, true, 5.0, Offset::new(3.0, 3.0)).unwrap();
        assert!(edge.is_self_loop());
        assert_eq!(edge.marker(), None);
        assert_eq!(fx.scene.attribute(edge.path_element(), "marker-end"), None);

        let expected = "M 10,100 C -60.000,25.000 80.000,25.000 10,100 M 10,100";
        assert_eq!(fx.scene.attribute(edge.path_element(), "d"), Some(expected));

        edge.lower(&mut fx.scene, &fx.nodes, Offset::new(8.0, 8.0)).unwrap();
        assert_eq!(fx.scene.attribute(edge.path_element(), "d"), Some(expected));
        edge.move_from(&mut fx.scene, &fx.nodes, 500.0, 500.0, Offset::new(1.0, 1.0)).unwrap();
        assert_eq!(fx.scene.attribute(edge.path_element(), "d"), Some(expected));
    }

    #[test]
    fn provisional_moves_pin_orientation_to_the_stationary_end() {
        let mut fx = Fixture::new();
        let a = fx.node("A", 0.0, 0.0);
        let b = fx.node("B", 100.0, 0.0);
        let mut edge = fx.edge(&a, false);
        edge.finish(&mut fx.scene, &fx.nodes, &b, true, 123.0, Offset::ZERO).unwrap();

        edge.move_from(&mut fx.scene, &fx.nodes, 150.0, 0.0, Offset::ZERO).unwrap();
        assert_eq!(edge.label().unwrap().text(), "321");
        assert_eq!(fx.scene.attribute(edge.text_element(), "rotate"), Some("180"));

        edge.move_to(&mut fx.scene, &fx.nodes, 0.0, 20.0, Offset::ZERO).unwrap();
        assert_eq!(
            edge.label().unwrap().text(),
            "123",
            "equal x keeps the label upright"
        );

        edge.move_to(&mut fx.scene, &fx.nodes, -5.0, 20.0, Offset::ZERO).unwrap();
        assert_eq!(edge.label().unwrap().orientation, LabelOrientation::Flipped);
    }

    #[test]
    fn lowered_edges_mirror_offsets() {
        let mut fx = Fixture::new();
        let a = fx.node("A", 0.0, 0.0);
        let b = fx.node("B", 100.0, 0.0);
        let mut edge = fx.edge(&a, false);
        edge.finish(&mut fx.scene, &fx.nodes, &b, false, 0.0, Offset::ZERO).unwrap();

        let offset = Offset::new(5.0, 10.0);
        edge.move_to(&mut fx.scene, &fx.nodes, 100.0, 0.0, offset).unwrap();
        assert_eq!(
            fx.scene.attribute(edge.path_element(), "d"),
            Some("M 5,-10 L 105,-10")
        );

        edge.lower(&mut fx.scene, &fx.nodes, offset).unwrap();
        assert!(edge.is_lowered());
        assert_eq!(
            fx.scene.attribute(edge.path_element(), "d"),
            Some("M -5,10 L 95,10")
        );

        edge.move_from(&mut fx.scene, &fx.nodes, 0.0, 0.0, offset).unwrap();
        assert_eq!(
            fx.scene.attribute(edge.path_element(), "d"),
            Some("M -5,10 L 95,10")
        );

        edge.raise(&mut fx.scene, &fx.nodes).unwrap();
        assert!(!edge.is_lowered());
        assert_eq!(fx.scene.attribute(edge.path_element(), "d"), Some("M 0,0 L 100,0"));
    }

    #[test]
    fn lowering_changes_baseline_but_not_orientation() {
        let mut fx = Fixture::new();
        let a = fx.node("A", 0.0, 0.0);
        let b = fx.node("B", -100.0, 0.0);
        let mut edge = fx.edge(&a, false);
        edge.finish(&mut fx.scene, &fx.nodes, &b, true, 42.0, Offset::ZERO).unwrap();
        assert_eq!(edge.label().unwrap().text(), "24");

        edge.lower(&mut fx.scene, &fx.nodes, Offset::new(0.0, 6.0)).unwrap();
        let label = edge.label().unwrap();
        assert_eq!(label.baseline, Baseline::BeforeEdge);
        assert_eq!(label.text(), "24");
        assert_eq!(label.rotation(), 180);
        assert_eq!(
            fx.scene.attribute(edge.text_path_element(), "alignment-baseline"),
            Some("text-before-edge")
        );

        edge.raise(&mut fx.scene, &fx.nodes).unwrap();
        let label = edge.label().unwrap();
        assert_eq!(label.baseline, Baseline::AfterEdge);
        assert_eq!(label.rotation(), 180);
    }

    #[test]
    fn selection_and_visit_flags_toggle_classes() {
        let mut fx = Fixture::new();
        let a = fx.node("A", 0.0, 0.0);
        let mut edge = fx.edge(&a, false);

        edge.select(&mut fx.scene);
        edge.set_visited(&mut fx.scene);
        assert!(fx.scene.has_class(edge.path_element(), SELECTING_CLASS));
        assert!(fx.scene.has_class(edge.path_element(), VISITED_CLASS));

        edge.unselect(&mut fx.scene);
        edge.set_unvisited(&mut fx.scene);
        edge.set_unvisited(&mut fx.scene);
        assert!(!edge.is_selected());
        assert!(!edge.is_visited());
        assert!(fx.scene.has_class(edge.path_element(), EDGE_CLASS));
        assert!(!fx.scene.has_class(edge.path_element(), VISITED_CLASS));
    }

    #[test]
    fn undraw_releases_edge_only() {
        let mut fx = Fixture::new();
        let a = fx.node("A", 0.0, 0.0);
        let edge = fx.edge(&a, true);
        let group = edge.group_element();
        assert_eq!(fx.ids.live_edges(), 1);

        edge.undraw(&mut fx.scene, &mut fx.ids);

        assert_eq!(fx.ids.live_edges(), 0);
        assert_eq!(fx.ids.live_nodes(), 1);
        assert!(!fx.scene.contains(group));
    }
}
