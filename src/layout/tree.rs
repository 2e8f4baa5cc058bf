//! Hierarchical tree placement driven by selection connectivity.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::TreeConfig;
use crate::model::{Edge, Node, NodeId, Point};

use super::selection_bounds;

/// Place the selection as one or more downward trees. Each connected
/// component is rooted at its most-connected node and laid out depth-first;
/// siblings spread symmetrically under their parent, and the spread widens
/// with depth so deep branches do not collapse onto each other. Components
/// after the first shift right of everything placed so far.
pub(super) fn tree_positions(
    nodes: &[&Node],
    edges: &[&Edge],
    config: &TreeConfig,
) -> BTreeMap<NodeId, Point> {
    let mut adjacency: BTreeMap<NodeId, BTreeSet<NodeId>> =
        nodes.iter().map(|n| (n.id, BTreeSet::new())).collect();
    for edge in edges {
        if let Some(peers) = adjacency.get_mut(&edge.source) {
            peers.insert(edge.target);
        }
        if let Some(peers) = adjacency.get_mut(&edge.target) {
            peers.insert(edge.source);
        }
    }

    // Highest degree first, lowest id breaking ties, so the busiest node of
    // each component becomes its root.
    let mut root_order: Vec<NodeId> = adjacency.keys().copied().collect();
    root_order.sort_by(|a, b| {
        adjacency[b]
            .len()
            .cmp(&adjacency[a].len())
            .then(a.cmp(b))
    });

    let bounds = selection_bounds(nodes);
    let mut positions = BTreeMap::new();
    let mut visited = BTreeSet::new();
    let mut next_root_x = bounds.x;

    for root in root_order {
        if visited.contains(&root) {
            continue;
        }
        visited.insert(root);
        let root_at = Point::new(next_root_x, bounds.y);
        positions.insert(root, root_at);
        place_children(root, root_at, 1, &adjacency, &mut visited, &mut positions, config);

        // Next component starts right of everything placed so far.
        let rightmost = positions.values().map(|p| p.x).fold(f32::MIN, f32::max);
        next_root_x = rightmost + config.sibling_spacing * 2.0;
    }
    positions
}

fn place_children(
    parent: NodeId,
    parent_at: Point,
    depth: usize,
    adjacency: &BTreeMap<NodeId, BTreeSet<NodeId>>,
    visited: &mut BTreeSet<NodeId>,
    positions: &mut BTreeMap<NodeId, Point>,
    config: &TreeConfig,
) {
    let children: Vec<NodeId> = adjacency[&parent]
        .iter()
        .copied()
        .filter(|id| visited.insert(*id))
        .collect();
    if children.is_empty() {
        return;
    }

    let spacing = config.sibling_spacing + config.depth_spread * depth as f32;
    let spread = spacing * (children.len() - 1) as f32;
    let y = parent_at.y + config.level_spacing;
    for (i, child) in children.iter().enumerate() {
        let at = Point::new(parent_at.x - spread / 2.0 + i as f32 * spacing, y);
        positions.insert(*child, at);
        place_children(*child, at, depth + 1, adjacency, visited, positions, config);
    }
}
