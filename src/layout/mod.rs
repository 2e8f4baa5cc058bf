//! Topology layout algorithms.
//!
//! Every algorithm shares one contract: read a node subset (plus the edges
//! between them), produce a mapping from node id to new position, and leave
//! the model untouched. Callers apply the mapping through a single composite
//! move command so an entire re-arrangement is one undo step. Selections
//! below an algorithm's minimum count are "not applicable" and yield `None`.

mod align;
mod arrange;
mod force;
mod layered;
mod templates;
mod tree;

use std::collections::BTreeMap;

use log::debug;

use crate::command::Command;
use crate::config::LayoutConfig;
use crate::model::{Edge, Node, NodeId, Point, Rect, Topology};

pub use align::{AlignEdge, Axis};
pub use templates::TemplateKind;

/// Which placement algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Align(AlignEdge),
    Distribute(Axis),
    Grid,
    Circle,
    Star,
    Bus,
    Tree,
    ConnectivityLayers,
    SnapOrthogonal,
    ForceDirected,
    Template(TemplateKind),
}

impl LayoutKind {
    /// Smallest selection the algorithm applies to.
    pub fn min_nodes(&self) -> usize {
        match self {
            LayoutKind::Distribute(_) => 3,
            LayoutKind::Grid | LayoutKind::ConnectivityLayers => 4,
            _ => 2,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LayoutKind::Align(AlignEdge::Left) => "Align left",
            LayoutKind::Align(AlignEdge::Right) => "Align right",
            LayoutKind::Align(AlignEdge::Top) => "Align top",
            LayoutKind::Align(AlignEdge::Bottom) => "Align bottom",
            LayoutKind::Align(AlignEdge::CenterH) => "Align horizontal centers",
            LayoutKind::Align(AlignEdge::CenterV) => "Align vertical centers",
            LayoutKind::Distribute(Axis::Horizontal) => "Distribute horizontally",
            LayoutKind::Distribute(Axis::Vertical) => "Distribute vertically",
            LayoutKind::Grid => "Grid layout",
            LayoutKind::Circle => "Circle layout",
            LayoutKind::Star => "Star layout",
            LayoutKind::Bus => "Bus layout",
            LayoutKind::Tree => "Hierarchical layout",
            LayoutKind::ConnectivityLayers => "Layered layout",
            LayoutKind::SnapOrthogonal => "Snap rows and columns",
            LayoutKind::ForceDirected => "Force-directed layout",
            LayoutKind::Template(TemplateKind::Dmz) => "DMZ template",
            LayoutKind::Template(TemplateKind::DefenseInDepth) => "Defense-in-depth template",
            LayoutKind::Template(TemplateKind::Segmented) => "Segmented template",
            LayoutKind::Template(TemplateKind::ZeroTrust) => "Zero-trust template",
            LayoutKind::Template(TemplateKind::IcsZones) => "ICS zones template",
        }
    }
}

/// Compute new positions for `ids`, or `None` when the selection is below
/// the algorithm's minimum.
pub fn compute_layout(
    kind: LayoutKind,
    topology: &Topology,
    ids: &[NodeId],
    config: &LayoutConfig,
) -> Option<BTreeMap<NodeId, Point>> {
    let nodes: Vec<&Node> = ids.iter().filter_map(|id| topology.node(*id)).collect();
    if nodes.len() < kind.min_nodes() {
        return None;
    }
    let live_ids: Vec<NodeId> = nodes.iter().map(|n| n.id).collect();
    let edges: Vec<&Edge> = topology.edges_within(&live_ids);

    let positions = match kind {
        LayoutKind::Align(edge) => align::align_positions(&nodes, edge),
        LayoutKind::Distribute(axis) => {
            align::distribute_positions(&nodes, axis, &config.distribute)
        }
        LayoutKind::Grid => arrange::grid_positions(&nodes, &config.grid),
        LayoutKind::Circle => arrange::circle_positions(&nodes, &config.circle),
        LayoutKind::Star => arrange::star_positions(&nodes, &edges, &config.circle),
        LayoutKind::Bus => arrange::bus_positions(&nodes, &config.bus),
        LayoutKind::Tree => tree::tree_positions(&nodes, &edges, &config.tree),
        LayoutKind::ConnectivityLayers => {
            layered::layer_positions(&nodes, &edges, &config.layers)
        }
        LayoutKind::SnapOrthogonal => layered::snap_positions(&nodes, &config.snap),
        LayoutKind::ForceDirected => {
            if edges.is_empty() {
                debug!("force-directed layout without edges; falling back to grid");
                arrange::grid_positions(&nodes, &config.grid)
            } else {
                force::force_positions(&nodes, &edges, &config.force)
            }
        }
        LayoutKind::Template(template) => {
            templates::template_positions(&nodes, template, &config.templates)
        }
    };
    Some(positions)
}

/// Wrap a computed layout in one composite move command. Nodes that did not
/// move (beyond a hair of float noise) are skipped; `None` when nothing
/// moves or the layout is not applicable.
pub fn layout_command(
    kind: LayoutKind,
    topology: &Topology,
    ids: &[NodeId],
    config: &LayoutConfig,
) -> Option<Command> {
    const MOVED_EPSILON: f32 = 1e-3;

    let positions = compute_layout(kind, topology, ids, config)?;
    let mut commands = Vec::new();
    for (id, to) in positions {
        let Some(node) = topology.node(id) else {
            continue;
        };
        let from = node.position;
        if (to.x - from.x).abs() > MOVED_EPSILON || (to.y - from.y).abs() > MOVED_EPSILON {
            commands.push(Command::MoveNode { id, from, to });
        }
    }
    if commands.is_empty() {
        return None;
    }
    Some(Command::Batch {
        description: kind.description().to_string(),
        commands,
    })
}

// ── Shared geometry helpers ─────────────────────────────────────────

/// Mean of the node anchor positions.
pub(crate) fn centroid(nodes: &[&Node]) -> Point {
    let n = nodes.len().max(1) as f32;
    let mut x = 0.0;
    let mut y = 0.0;
    for node in nodes {
        x += node.position.x;
        y += node.position.y;
    }
    Point::new(x / n, y / n)
}

/// Mean of each node's (width + height) / 2.
pub(crate) fn average_dimension(nodes: &[&Node]) -> f32 {
    let n = nodes.len().max(1) as f32;
    let total: f32 = nodes
        .iter()
        .map(|node| (node.size.width + node.size.height) / 2.0)
        .sum();
    total / n
}

/// Bounding box of the selection's node rectangles.
pub(crate) fn selection_bounds(nodes: &[&Node]) -> Rect {
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for node in nodes {
        let rect = node.rect();
        min_x = min_x.min(rect.x);
        min_y = min_y.min(rect.y);
        max_x = max_x.max(rect.right());
        max_y = max_y.max(rect.bottom());
    }
    Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
}

/// Reading order: top-to-bottom, then left-to-right, id as tie-break.
pub(crate) fn sort_reading_order<'a>(nodes: &mut Vec<&'a Node>) {
    nodes.sort_by(|a, b| {
        a.position
            .y
            .partial_cmp(&b.position.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                a.position
                    .x
                    .partial_cmp(&b.position.x)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then(a.id.cmp(&b.id))
    });
}
