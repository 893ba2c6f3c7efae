//! Replays host interaction events against a [`Diagram`].
//!
//! A script is a JSON document listing the calls a pointer controller would
//! make, in order:
//!
//! ```json
//! { "commands": [
//!     { "op": "add_node", "x": 0, "y": 0, "name": "A" },
//!     { "op": "begin_edge", "from": "node_A", "directed": true }
//! ] }
//! ```

use log::warn;
use serde::{Deserialize, Serialize};

use crate::diagram::Diagram;
use crate::geometry::Offset;
use crate::ids::{EdgeId, NodeId};
use crate::surface::Surface;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    AddNode {
        x: f32,
        y: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    RemoveNode {
        node: NodeId,
    },
    GrabNode {
        node: NodeId,
    },
    DragNode {
        node: NodeId,
        x: f32,
        y: f32,
    },
    ReleaseNode {
        node: NodeId,
    },
    BeginEdge {
        from: NodeId,
        #[serde(default)]
        directed: bool,
    },
    DragEdge {
        edge: EdgeId,
        x: f32,
        y: f32,
    },
    FinishEdge {
        edge: EdgeId,
        to: NodeId,
        #[serde(default)]
        weighted: bool,
        #[serde(default)]
        weight: f64,
        #[serde(flatten)]
        offset: Offset,
    },
    RemoveEdge {
        edge: EdgeId,
    },
    LowerEdge {
        edge: EdgeId,
        #[serde(flatten)]
        offset: Offset,
    },
    RaiseEdge {
        edge: EdgeId,
    },
    SelectEdge {
        edge: EdgeId,
    },
    UnselectEdge {
        edge: EdgeId,
    },
    VisitEdge {
        edge: EdgeId,
    },
    UnvisitEdge {
        edge: EdgeId,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub commands: Vec<Command>,
}

impl Script {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplayMode {
    /// Stop at the first rejected command.
    #[default]
    Strict,
    /// Skip rejected commands and keep going.
    KeepGoing,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayReport {
    pub applied: usize,
    /// Rejected commands with their position in the script.
    pub rejected: Vec<(usize, Error)>,
}

impl Command {
    pub fn apply<S: Surface>(&self, diagram: &mut Diagram<S>) -> Result<()> {
        match self {
            Command::AddNode { x, y, name } => {
                diagram.add_node(*x, *y, name.as_deref())?;
            }
            Command::RemoveNode { node } => diagram.remove_node(node)?,
            Command::GrabNode { node } => diagram.begin_node_drag(node)?,
            Command::DragNode { node, x, y } => diagram.drag_node(node, *x, *y)?,
            Command::ReleaseNode { node } => diagram.end_node_drag(node)?,
            Command::BeginEdge { from, directed } => {
                diagram.begin_edge(from, *directed)?;
            }
            Command::DragEdge { edge, x, y } => diagram.drag_pending_edge(edge, *x, *y)?,
            Command::FinishEdge {
                edge,
                to,
                weighted,
                weight,
                offset,
            } => diagram.finish_edge(edge, to, *weighted, *weight, *offset)?,
            Command::RemoveEdge { edge } => diagram.remove_edge(edge)?,
            Command::LowerEdge { edge, offset } => diagram.lower_edge(edge, *offset)?,
            Command::RaiseEdge { edge } => diagram.raise_edge(edge)?,
            Command::SelectEdge { edge } => diagram.select_edge(edge)?,
            Command::UnselectEdge { edge } => diagram.unselect_edge(edge)?,
            Command::VisitEdge { edge } => diagram.set_edge_visited(edge)?,
            Command::UnvisitEdge { edge } => diagram.set_edge_unvisited(edge)?,
        }
        Ok(())
    }
}

pub fn replay<S: Surface>(
    diagram: &mut Diagram<S>,
    script: &Script,
    mode: ReplayMode,
) -> Result<ReplayReport> {
    let mut report = ReplayReport::default();
    for (index, command) in script.commands.iter().enumerate() {
        match command.apply(diagram) {
            Ok(()) => report.applied += 1,
            Err(err) if mode == ReplayMode::KeepGoing => {
                warn!("skipping command #{index}: {err}");
                report.rejected.push((index, err));
            }
            Err(err) => return Err(err),
        }
    }
    Ok(report)
}
