//! Connectivity-layer rows and row/column snapping.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::{LayerConfig, SnapConfig};
use crate::model::{Edge, Node, NodeId, Point};

use super::{centroid, selection_bounds};

/// Stack the selection into horizontal rows by connectivity. The row at the
/// top holds the most-connected node plus everything whose degree comes
/// close to it; each following row is the breadth-first frontier of the one
/// above. Nodes still unassigned when the layer cap is reached (isolated
/// nodes included) sweep into the final row.
pub(super) fn layer_positions(
    nodes: &[&Node],
    edges: &[&Edge],
    config: &LayerConfig,
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
    let degree = |id: &NodeId| adjacency[id].len();

    let top_degree = adjacency.keys().map(degree).max().unwrap_or(0);
    let threshold = (top_degree as f32 * config.affinity_ratio).ceil() as usize;

    let mut assigned = BTreeSet::new();
    let mut layers: Vec<Vec<NodeId>> = Vec::new();

    // Layer 0: the hub row, everything within reach of the top degree.
    let hubs: Vec<NodeId> = adjacency
        .keys()
        .copied()
        .filter(|id| top_degree > 0 && degree(id) >= threshold.max(1))
        .collect();
    assigned.extend(hubs.iter().copied());
    layers.push(hubs);

    // Breadth-first frontiers below, up to the cap.
    while layers.len() < config.max_layers {
        let previous = &layers[layers.len() - 1];
        let mut frontier: Vec<NodeId> = previous
            .iter()
            .flat_map(|id| adjacency[id].iter().copied())
            .filter(|id| !assigned.contains(id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if frontier.is_empty() {
            break;
        }
        frontier.sort();
        assigned.extend(frontier.iter().copied());
        layers.push(frontier);
    }

    // Sweep leftovers into the final row.
    let leftovers: Vec<NodeId> = adjacency
        .keys()
        .copied()
        .filter(|id| !assigned.contains(id))
        .collect();
    if !leftovers.is_empty() {
        if layers.len() < config.max_layers {
            layers.push(leftovers);
        } else if let Some(last) = layers.last_mut() {
            last.extend(leftovers);
        }
    }
    layers.retain(|layer| !layer.is_empty());

    let center_x = centroid(nodes).x;
    let top = selection_bounds(nodes).y;

    let mut positions = BTreeMap::new();
    for (layer_index, layer) in layers.iter().enumerate() {
        let mut row: Vec<NodeId> = layer.clone();
        row.sort_by(|a, b| degree(b).cmp(&degree(a)).then(a.cmp(b)));

        let y = top + layer_index as f32 * config.layer_spacing;
        for (i, id) in row.iter().enumerate() {
            // Center-out: busiest in the middle, the rest alternating sides.
            let step = ((i + 1) / 2) as f32;
            let side = if i % 2 == 1 { 1.0 } else { -1.0 };
            let x = center_x + side * step * config.node_spacing;
            positions.insert(*id, Point::new(x, y));
        }
    }
    positions
}

/// Snap near-aligned nodes onto exact shared rows and columns. Nodes whose
/// y coordinates fall within the tolerance band form a row sharing the band
/// mean and re-spaced at a uniform horizontal gap; a second pass does the
/// same clustering on x so columns line up too.
pub(super) fn snap_positions(nodes: &[&Node], config: &SnapConfig) -> BTreeMap<NodeId, Point> {
    let mut positions: BTreeMap<NodeId, Point> =
        nodes.iter().map(|n| (n.id, n.position)).collect();

    // Row pass: shared y, uniform gaps from the row's leftmost node.
    for band in bands(&positions, |p| p.y, config.tolerance) {
        let mean_y = band.iter().map(|(_, p)| p.y).sum::<f32>() / band.len() as f32;
        let mut row = band;
        row.sort_by(|(a_id, a), (b_id, b)| {
            a.x.partial_cmp(&b.x)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a_id.cmp(b_id))
        });
        let left = row[0].1.x;
        for (i, (id, _)) in row.iter().enumerate() {
            positions.insert(*id, Point::new(left + i as f32 * config.row_gap, mean_y));
        }
    }

    // Column pass: shared x for anything that now nearly lines up.
    for band in bands(&positions, |p| p.x, config.tolerance) {
        let mean_x = band.iter().map(|(_, p)| p.x).sum::<f32>() / band.len() as f32;
        for (id, p) in band {
            positions.insert(id, Point::new(mean_x, p.y));
        }
    }
    positions
}

/// Greedy 1-d clustering: sort by the axis value and open a new band
/// whenever a node falls more than `tolerance` from the band's first member.
fn bands(
    positions: &BTreeMap<NodeId, Point>,
    axis: fn(&Point) -> f32,
    tolerance: f32,
) -> Vec<Vec<(NodeId, Point)>> {
    let mut ordered: Vec<(NodeId, Point)> = positions.iter().map(|(id, p)| (*id, *p)).collect();
    ordered.sort_by(|(a_id, a), (b_id, b)| {
        axis(a)
            .partial_cmp(&axis(b))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a_id.cmp(b_id))
    });

    let mut bands: Vec<Vec<(NodeId, Point)>> = Vec::new();
    for (id, p) in ordered {
        match bands.last_mut() {
            Some(band) if (axis(&p) - axis(&band[0].1)).abs() <= tolerance => {
                band.push((id, p));
            }
            _ => bands.push(vec![(id, p)]),
        }
    }
    bands
}
