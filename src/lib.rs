//! Geometry and state engine for interactive graph-diagram editors.
//!
//! Nodes and edges keep their visual representation on a [`Surface`] in sync
//! while a host drags nodes around or draws new edges.

pub mod config;
pub mod diagram;
pub mod edge;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod node;
pub mod script;
pub mod surface;
pub mod svg;

pub use config::SceneConfig;
pub use diagram::Diagram;
pub use edge::{Baseline, Destination, Edge, WeightLabel};
pub use error::{Error, ErrorKind, Result};
pub use geometry::{EdgePath, LabelOrientation, Offset, Point};
pub use ids::{EdgeId, IdAllocator, NodeId};
pub use node::{Node, NodePositions};
pub use script::{Command, ReplayMode, ReplayReport, Script, replay};
pub use surface::{ArrowMarker, ElementId, ElementKind, Surface};
pub use svg::{SvgScene, escape_xml};

/// Vertical distance between a node and its name label.
pub const NODE_LABEL_OFFSET: f32 = 22.0;
/// Horizontal distance of a self-loop's control points from the node.
pub const LOOP_CONTROL_SPREAD: f32 = 70.0;
/// Height of a self-loop's control points above the node.
pub const LOOP_CONTROL_HEIGHT: f32 = 75.0;
pub const WEIGHT_LABEL_START_OFFSET: &str = "50%";
pub const NODE_ID_PREFIX: &str = "node_";
pub const EDGE_ID_PREFIX: &str = "edge_";
pub const TEMPORARY_MARKER_ID: &str = "arrowhead_temp";
pub const FINAL_MARKER_ID: &str = "arrowhead";

pub const NODE_GROUP_CLASS: &str = "full-node";
pub const NODE_CLASS: &str = "node";
pub const EDGE_GROUP_CLASS: &str = "full-edge";
pub const EDGE_CLASS: &str = "edge";
pub const GRABBED_CLASS: &str = "grabbed";
pub const SELECTING_CLASS: &str = "selecting";
pub const VISITED_CLASS: &str = "visited";
