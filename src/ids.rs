use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::{EDGE_ID_PREFIX, Error, NODE_ID_PREFIX, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl EdgeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity for a freshly allocated node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    pub id: NodeId,
    pub label: String,
}

/// Diagram-scoped identity source.
///
/// Sequences only grow, so an id is never handed out twice by the same
/// allocator. The live counters track how many entities currently exist.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    node_sequence: u64,
    edge_sequence: u64,
    live_node_ids: HashSet<NodeId>,
    live_edges: usize,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a node identity, named when `name` is non-empty.
    ///
    /// Every successful allocation advances the node sequence, named or not.
    pub fn allocate_node(&mut self, name: Option<&str>) -> Result<NodeIdentity> {
        let identity = match name.filter(|name| !name.is_empty()) {
            Some(name) => {
                let id = NodeId(format!("{NODE_ID_PREFIX}{name}"));
                if self.live_node_ids.contains(&id) {
                    return Err(Error::InvalidIdentity { id: id.0 });
                }
                self.node_sequence += 1;
                NodeIdentity {
                    id,
                    label: name.to_string(),
                }
            }
            None => loop {
                self.node_sequence += 1;
                let label = self.node_sequence.to_string();
                let id = NodeId(format!("{NODE_ID_PREFIX}{label}"));
                if !self.live_node_ids.contains(&id) {
                    break NodeIdentity { id, label };
                }
            },
        };

        self.live_node_ids.insert(identity.id.clone());
        Ok(identity)
    }

    pub fn allocate_edge(&mut self) -> EdgeId {
        self.edge_sequence += 1;
        self.live_edges += 1;
        EdgeId(format!("{EDGE_ID_PREFIX}{}", self.edge_sequence))
    }

    pub fn release_node(&mut self, id: &NodeId) {
        self.live_node_ids.remove(id);
    }

    pub fn release_edge(&mut self) {
        self.live_edges = self.live_edges.saturating_sub(1);
    }

    pub fn is_node_live(&self, id: &NodeId) -> bool {
        self.live_node_ids.contains(id)
    }

    pub fn live_nodes(&self) -> usize {
        self.live_node_ids.len()
    }

    pub fn live_edges(&self) -> usize {
        self.live_edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unnamed_nodes_use_sequence_for_id_and_label() {
        let mut ids = IdAllocator::new();
        let first = ids.allocate_node(None).unwrap();
        let second = ids.allocate_node(Some("")).unwrap();

        assert_eq!(first.id.as_str(), "node_1");
        assert_eq!(first.label, "1");
        assert_eq!(second.id.as_str(), "node_2");
        assert_eq!(ids.live_nodes(), 2);
    }

    #[test]
    fn named_nodes_must_be_unique_while_live() {
        let mut ids = IdAllocator::new();
        let a = ids.allocate_node(Some("A")).unwrap();
        assert_eq!(a.id.as_str(), "node_A");
        assert_eq!(a.label, "A");

        let err = ids.allocate_node(Some("A")).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidIdentity);

        ids.release_node(&a.id);
        assert!(ids.allocate_node(Some("A")).is_ok(), "released names are reusable");
    }

    #[test]
    fn named_nodes_advance_the_sequence() {
        let mut ids = IdAllocator::new();
        ids.allocate_node(Some("A")).unwrap();
        ids.allocate_node(Some("B")).unwrap();
        let third = ids.allocate_node(None).unwrap();
        assert_eq!(third.id.as_str(), "node_3");
        assert_eq!(third.label, "3");
    }

    #[test]
    fn rejected_names_do_not_advance_the_sequence() {
        let mut ids = IdAllocator::new();
        ids.allocate_node(Some("A")).unwrap();
        assert!(ids.allocate_node(Some("A")).is_err());
        assert_eq!(ids.allocate_node(None).unwrap().id.as_str(), "node_2");
    }

    #[test]
    fn sequence_skips_ids_taken_by_names() {
        let mut ids = IdAllocator::new();
        ids.allocate_node(Some("2")).unwrap();
        let next = ids.allocate_node(None).unwrap();
        assert_eq!(next.id.as_str(), "node_3");
        assert_eq!(next.label, "3");
        assert!(ids.is_node_live(&NodeId::new("node_2")));
        assert!(ids.is_node_live(&next.id));
    }

    #[test]
    fn sequences_never_reuse_released_ids() {
        let mut ids = IdAllocator::new();
        let node = ids.allocate_node(None).unwrap();
        ids.release_node(&node.id);
        assert!(!ids.is_node_live(&node.id));
        assert_eq!(ids.allocate_node(None).unwrap().id.as_str(), "node_2");

        let edge = ids.allocate_edge();
        ids.release_edge();
        assert_eq!(edge.as_str(), "edge_1");
        assert_eq!(ids.allocate_edge().as_str(), "edge_2");
        assert_eq!(ids.live_edges(), 1);
    }
}
