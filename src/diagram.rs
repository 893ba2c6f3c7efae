use log::debug;
use std::collections::HashMap;

use crate::edge::Edge;
use crate::geometry::Offset;
use crate::ids::{EdgeId, IdAllocator, NodeId};
use crate::node::Node;
use crate::surface::Surface;
use crate::{Error, Result};

fn unknown_node(id: &NodeId) -> Error {
    Error::invalid_state(id, "node does not exist")
}

fn unknown_edge(id: &EdgeId) -> Error {
    Error::invalid_state(id, "edge does not exist")
}

/// Owns the nodes and edges of one diagram along with the surface they are
/// drawn on.
///
/// Every node knows its incident edges, so dragging a node redraws exactly
/// the edges attached to it.
#[derive(Debug)]
pub struct Diagram<S: Surface> {
    surface: S,
    ids: IdAllocator,
    nodes: HashMap<NodeId, Node>,
    node_order: Vec<NodeId>,
    edges: HashMap<EdgeId, Edge>,
    edge_order: Vec<EdgeId>,
    dragged: Option<NodeId>,
}

impl<S: Surface + Default> Default for Diagram<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: Surface> Diagram<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            ids: IdAllocator::new(),
            nodes: HashMap::new(),
            node_order: Vec::new(),
            edges: HashMap::new(),
            edge_order: Vec::new(),
            dragged: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Edges in creation order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edge_order.iter().filter_map(|id| self.edges.get(id))
    }

    pub fn incident_edges(&self, node: &NodeId) -> Result<Vec<EdgeId>> {
        let node = self.nodes.get(node).ok_or_else(|| unknown_node(node))?;
        Ok(node.incident_edges().cloned().collect())
    }

    pub fn dragged_node(&self) -> Option<&NodeId> {
        self.dragged.as_ref()
    }

    pub fn add_node(&mut self, x: f32, y: f32, name: Option<&str>) -> Result<NodeId> {
        let node = Node::create(&mut self.surface, &mut self.ids, x, y, name)?;
        let id = node.id().clone();
        self.nodes.insert(id.clone(), node);
        self.node_order.push(id.clone());
        Ok(id)
    }

    /// Removes a node and every edge attached to it.
    pub fn remove_node(&mut self, id: &NodeId) -> Result<()> {
        let incident = self.incident_edges(id)?;
        for edge in &incident {
            self.remove_edge(edge)?;
        }

        let node = self.nodes.remove(id).ok_or_else(|| unknown_node(id))?;
        self.node_order.retain(|existing| existing != id);
        if self.dragged.as_ref() == Some(id) {
            self.dragged = None;
        }
        node.undraw(&mut self.surface, &mut self.ids);
        debug!("node '{id}' removed along with {} edges", incident.len());
        Ok(())
    }

    /// Grabs a node. Only one node is dragged at a time, so a previously
    /// grabbed node is released first.
    pub fn begin_node_drag(&mut self, id: &NodeId) -> Result<()> {
        if !self.nodes.contains_key(id) {
            return Err(unknown_node(id));
        }
        if let Some(previous) = self.dragged.take() {
            if let Some(node) = self.nodes.get_mut(&previous) {
                node.end_drag(&mut self.surface);
            }
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.begin_drag(&mut self.surface);
        }
        self.dragged = Some(id.clone());
        Ok(())
    }

    /// Moves a node and redraws its incident edges.
    pub fn drag_node(&mut self, id: &NodeId, x: f32, y: f32) -> Result<()> {
        let node = self.nodes.get_mut(id).ok_or_else(|| unknown_node(id))?;
        node.move_to(&mut self.surface, x, y);
        let incident: Vec<EdgeId> = node.incident_edges().cloned().collect();

        for edge_id in incident {
            let Some(edge) = self.edges.get_mut(&edge_id) else {
                continue;
            };
            let offset = edge.offset();
            if edge.from() == id {
                edge.move_from(&mut self.surface, &self.nodes, x, y, offset)?;
            } else {
                edge.move_to(&mut self.surface, &self.nodes, x, y, offset)?;
            }
        }
        Ok(())
    }

    pub fn end_node_drag(&mut self, id: &NodeId) -> Result<()> {
        let node = self.nodes.get_mut(id).ok_or_else(|| unknown_node(id))?;
        node.end_drag(&mut self.surface);
        if self.dragged.as_ref() == Some(id) {
            self.dragged = None;
        }
        Ok(())
    }

    /// Starts drawing an edge out of `from`.
    pub fn begin_edge(&mut self, from: &NodeId, directed: bool) -> Result<EdgeId> {
        let node = self.nodes.get_mut(from).ok_or_else(|| unknown_node(from))?;
        let edge = Edge::create(&mut self.surface, &mut self.ids, node, directed);
        let id = edge.id().clone();
        node.attach_edge(id.clone());
        self.edges.insert(id.clone(), edge);
        self.edge_order.push(id.clone());
        Ok(id)
    }

    /// Moves the loose end of a pending edge to the pointer.
    pub fn drag_pending_edge(&mut self, id: &EdgeId, x: f32, y: f32) -> Result<()> {
        let edge = self.edges.get_mut(id).ok_or_else(|| unknown_edge(id))?;
        if edge.is_finished() {
            return Err(Error::invalid_state(id, "edge is already finished"));
        }
        let offset = edge.offset();
        edge.move_to(&mut self.surface, &self.nodes, x, y, offset)
    }

    pub fn finish_edge(
        &mut self,
        id: &EdgeId,
        to: &NodeId,
        weighted: bool,
        weight: f64,
        offset: Offset,
    ) -> Result<()> {
        let edge = self.edges.get_mut(id).ok_or_else(|| unknown_edge(id))?;
        edge.finish(&mut self.surface, &self.nodes, to, weighted, weight, offset)?;
        if let Some(node) = self.nodes.get_mut(to) {
            node.attach_edge(id.clone());
        }
        Ok(())
    }

    pub fn remove_edge(&mut self, id: &EdgeId) -> Result<()> {
        let edge = self.edges.remove(id).ok_or_else(|| unknown_edge(id))?;
        self.edge_order.retain(|existing| existing != id);

        if let Some(node) = self.nodes.get_mut(edge.from()) {
            node.detach_edge(id);
        }
        if let Some(node) = edge.to_node().and_then(|to| self.nodes.get_mut(to)) {
            node.detach_edge(id);
        }
        edge.undraw(&mut self.surface, &mut self.ids);
        Ok(())
    }

    pub fn lower_edge(&mut self, id: &EdgeId, offset: Offset) -> Result<()> {
        let edge = self.edges.get_mut(id).ok_or_else(|| unknown_edge(id))?;
        edge.lower(&mut self.surface, &self.nodes, offset)
    }

    pub fn raise_edge(&mut self, id: &EdgeId) -> Result<()> {
        let edge = self.edges.get_mut(id).ok_or_else(|| unknown_edge(id))?;
        edge.raise(&mut self.surface, &self.nodes)
    }

    pub fn select_edge(&mut self, id: &EdgeId) -> Result<()> {
        let edge = self.edges.get_mut(id).ok_or_else(|| unknown_edge(id))?;
        edge.select(&mut self.surface);
        Ok(())
    }

    pub fn unselect_edge(&mut self, id: &EdgeId) -> Result<()> {
        let edge = self.edges.get_mut(id).ok_or_else(|| unknown_edge(id))?;
        edge.unselect(&mut self.surface);
        Ok(())
    }

    pub fn set_edge_visited(&mut self, id: &EdgeId) -> Result<()> {
        let edge = self.edges.get_mut(id).ok_or_else(|| unknown_edge(id))?;
        edge.set_visited(&mut self.surface);
        Ok(())
    }

    pub fn set_edge_unvisited(&mut self, id: &EdgeId) -> Result<()> {
        let edge = self.edges.get_mut(id).ok_or_else(|| unknown_edge(id))?;
        edge.set_unvisited(&mut self.surface);
        Ok(())
    }
}
