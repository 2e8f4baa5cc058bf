//! Geometric arrangements: grid, circle, star, bus.

use std::collections::BTreeMap;
use std::f32::consts::TAU;

use crate::config::{BusConfig, CircleConfig, GridConfig};
use crate::model::{Edge, Node, NodeId, Point};

use super::{average_dimension, centroid, selection_bounds, sort_reading_order};

/// Row-major grid anchored at the selection's original top-left corner.
/// Column count ≈ ⌈√n⌉ (at least 2); cell spacing scales with node size.
pub(super) fn grid_positions(nodes: &[&Node], config: &GridConfig) -> BTreeMap<NodeId, Point> {
    let mut ordered: Vec<&Node> = nodes.to_vec();
    sort_reading_order(&mut ordered);

    let n = ordered.len();
    let cols = ((n as f32).sqrt().ceil() as usize).max(2);
    let spacing = (average_dimension(&ordered) * config.spacing_factor).max(config.min_spacing);
    let origin = selection_bounds(&ordered);

    let mut positions = BTreeMap::new();
    for (i, node) in ordered.iter().enumerate() {
        let col = (i % cols) as f32;
        let row = (i / cols) as f32;
        positions.insert(
            node.id,
            Point::new(origin.x + col * spacing, origin.y + row * spacing),
        );
    }
    positions
}

/// Equal angular steps around the selection centroid; radius grows with the
/// node count so neighbors do not overlap.
pub(super) fn circle_positions(nodes: &[&Node], config: &CircleConfig) -> BTreeMap<NodeId, Point> {
    let center = centroid(nodes);
    let radius = circle_radius(nodes.len(), average_dimension(nodes), config);

    let mut ordered: Vec<&Node> = nodes.to_vec();
    ordered.sort_by(|a, b| a.id.cmp(&b.id));

    ring_positions(&ordered, center, radius)
}

/// One hub in the middle, everyone else on a ring. The hub is the node with
/// the highest degree inside the selection, or the node nearest the
/// centroid when the selection has no edges.
pub(super) fn star_positions(
    nodes: &[&Node],
    edges: &[&Edge],
    config: &CircleConfig,
) -> BTreeMap<NodeId, Point> {
    let center = centroid(nodes);

    let mut degree: BTreeMap<NodeId, usize> = BTreeMap::new();
    for edge in edges {
        *degree.entry(edge.source).or_default() += 1;
        *degree.entry(edge.target).or_default() += 1;
    }
    let hub = if edges.is_empty() {
        nodes
            .iter()
            .min_by(|a, b| {
                a.position
                    .distance_to(center)
                    .partial_cmp(&b.position.distance_to(center))
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.id.cmp(&b.id))
            })
            .map(|n| n.id)
    } else {
        nodes
            .iter()
            .max_by(|a, b| {
                degree
                    .get(&a.id)
                    .unwrap_or(&0)
                    .cmp(degree.get(&b.id).unwrap_or(&0))
                    .then(b.id.cmp(&a.id))
            })
            .map(|n| n.id)
    };
    let Some(hub) = hub else {
        return BTreeMap::new();
    };

    let mut spokes: Vec<&Node> = nodes.iter().copied().filter(|n| n.id != hub).collect();
    spokes.sort_by(|a, b| a.id.cmp(&b.id));
    let radius = circle_radius(spokes.len().max(1), average_dimension(nodes), config);

    let mut positions = ring_positions(&spokes, center, radius);
    positions.insert(hub, center);
    positions
}

/// Two parallel columns flanking an implied vertical backbone through the
/// selection centroid, one row per pair; the longer half keeps going alone.
pub(super) fn bus_positions(nodes: &[&Node], config: &BusConfig) -> BTreeMap<NodeId, Point> {
    let mut ordered: Vec<&Node> = nodes.to_vec();
    sort_reading_order(&mut ordered);

    let center = centroid(&ordered);
    let top = selection_bounds(&ordered).y;
    let half = ordered.len().div_ceil(2);
    let (left, right) = ordered.split_at(half);

    let mut positions = BTreeMap::new();
    for (row, node) in left.iter().enumerate() {
        positions.insert(
            node.id,
            Point::new(
                center.x - config.lane_offset,
                top + row as f32 * config.row_spacing,
            ),
        );
    }
    for (row, node) in right.iter().enumerate() {
        positions.insert(
            node.id,
            Point::new(
                center.x + config.lane_offset,
                top + row as f32 * config.row_spacing,
            ),
        );
    }
    positions
}

fn circle_radius(count: usize, avg_dimension: f32, config: &CircleConfig) -> f32 {
    (count as f32 * avg_dimension / TAU).max(config.min_radius)
}

fn ring_positions(ordered: &[&Node], center: Point, radius: f32) -> BTreeMap<NodeId, Point> {
    let step = TAU / ordered.len().max(1) as f32;
    let mut positions = BTreeMap::new();
    for (i, node) in ordered.iter().enumerate() {
        let angle = i as f32 * step;
        positions.insert(
            node.id,
            Point::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            ),
        );
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeviceKind, LinkKind, RouteStyle, Topology};

    fn seeded(count: usize) -> (Topology, Vec<NodeId>) {
        let mut t = Topology::new();
        let mut ids = Vec::new();
        for i in 0..count {
            let node = t.new_node(
                &format!("n{i}"),
                DeviceKind::Generic,
                Point::new((i % 3) as f32 * 150.0, (i / 3) as f32 * 90.0),
            );
            ids.push(node.id);
            t.insert_node(node).unwrap();
        }
        (t, ids)
    }

    fn refs<'a>(t: &'a Topology, ids: &[NodeId]) -> Vec<&'a Node> {
        ids.iter().map(|id| t.node(*id).unwrap()).collect()
    }

    #[test]
    fn grid_uses_sqrt_columns_row_major() {
        let (t, ids) = seeded(9);
        let nodes = refs(&t, &ids);
        let positions = grid_positions(&nodes, &GridConfig::default());
        let xs: std::collections::BTreeSet<i64> =
            positions.values().map(|p| p.x.round() as i64).collect();
        let ys: std::collections::BTreeSet<i64> =
            positions.values().map(|p| p.y.round() as i64).collect();
        // 9 nodes: 3 columns by 3 rows.
        assert_eq!(xs.len(), 3);
        assert_eq!(ys.len(), 3);
    }

    #[test]
    fn grid_anchors_at_selection_top_left() {
        let (t, ids) = seeded(4);
        let nodes = refs(&t, &ids);
        let positions = grid_positions(&nodes, &GridConfig::default());
        let min_x = positions.values().map(|p| p.x).fold(f32::MAX, f32::min);
        let min_y = positions.values().map(|p| p.y).fold(f32::MAX, f32::min);
        assert_eq!(min_x, 0.0);
        assert_eq!(min_y, 0.0);
    }

    #[test]
    fn circle_keeps_nodes_equidistant_from_centroid() {
        let (t, ids) = seeded(6);
        let nodes = refs(&t, &ids);
        let center = centroid(&nodes);
        let positions = circle_positions(&nodes, &CircleConfig::default());
        for p in positions.values() {
            let r = p.distance_to(center);
            assert!((r - 120.0).abs() < 1.0, "expected min radius, got {r}");
        }
    }

    #[test]
    fn star_places_highest_degree_at_centroid() {
        let (mut t, ids) = seeded(5);
        // Make ids[2] the hub with three edges.
        for other in [0usize, 1, 3] {
            let e = t
                .new_edge(ids[2], ids[other], LinkKind::Ethernet, RouteStyle::Straight)
                .unwrap();
            t.insert_edge(e).unwrap();
        }
        let nodes = refs(&t, &ids);
        let edge_refs: Vec<&Edge> = t.edges_within(&ids);
        let center = centroid(&nodes);
        let positions = star_positions(&nodes, &edge_refs, &CircleConfig::default());
        assert_eq!(positions[&ids[2]], center);
        for (id, p) in &positions {
            if *id != ids[2] {
                assert!(p.distance_to(center) > 1.0);
            }
        }
    }

    #[test]
    fn bus_builds_two_lanes() {
        let (t, ids) = seeded(6);
        let nodes = refs(&t, &ids);
        let positions = bus_positions(&nodes, &BusConfig::default());
        let xs: std::collections::BTreeSet<i64> =
            positions.values().map(|p| p.x.round() as i64).collect();
        assert_eq!(xs.len(), 2);
        let gap = xs.iter().max().unwrap() - xs.iter().min().unwrap();
        assert_eq!(gap, 280);
    }

    #[test]
    fn bus_odd_count_continues_longer_half() {
        let (t, ids) = seeded(5);
        let nodes = refs(&t, &ids);
        let positions = bus_positions(&nodes, &BusConfig::default());
        assert_eq!(positions.len(), 5);
    }
}
