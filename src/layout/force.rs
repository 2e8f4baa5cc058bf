//! Force-directed refinement with simulated-annealing style cooling.

use std::collections::BTreeMap;

use crate::config::ForceConfig;
use crate::model::{Edge, Node, NodeId, Point};

use super::centroid;

/// Run a fixed number of spring iterations over the selection. All pairs
/// repel with strength falling off as 1/d², connected pairs attract in
/// proportion to their distance, and per-iteration movement is capped by a
/// temperature that cools geometrically. The result is translated so the
/// selection centroid lands exactly where it started.
pub(super) fn force_positions(
    nodes: &[&Node],
    edges: &[&Edge],
    config: &ForceConfig,
) -> BTreeMap<NodeId, Point> {
    let original_center = centroid(nodes);
    let ids: Vec<NodeId> = nodes.iter().map(|n| n.id).collect();
    let mut positions: BTreeMap<NodeId, Point> =
        nodes.iter().map(|n| (n.id, n.position)).collect();

    let ideal_sq = config.ideal_distance * config.ideal_distance;
    let mut temperature = config.initial_temperature;

    for _ in 0..config.iterations {
        let mut displacement: BTreeMap<NodeId, Point> =
            ids.iter().map(|id| (*id, Point::new(0.0, 0.0))).collect();

        // Pairwise repulsion.
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                let pa = positions[a];
                let pb = positions[b];
                let (ux, uy, d) = unit_between(pb, pa, config.min_distance);
                let magnitude = ideal_sq / (d * d);
                nudge(&mut displacement, *a, ux * magnitude, uy * magnitude);
                nudge(&mut displacement, *b, -ux * magnitude, -uy * magnitude);
            }
        }

        // Attraction along edges.
        for edge in edges {
            let pa = positions[&edge.source];
            let pb = positions[&edge.target];
            let (ux, uy, d) = unit_between(pa, pb, config.min_distance);
            let magnitude = d / config.ideal_distance;
            nudge(&mut displacement, edge.source, ux * magnitude, uy * magnitude);
            nudge(&mut displacement, edge.target, -ux * magnitude, -uy * magnitude);
        }

        // Apply, capped by the current temperature.
        for id in &ids {
            let d = displacement[id];
            let length = (d.x * d.x + d.y * d.y).sqrt().max(config.min_distance);
            let scale = length.min(temperature) / length;
            let p = positions[id];
            positions.insert(*id, Point::new(p.x + d.x * scale, p.y + d.y * scale));
        }
        temperature *= config.cooling;
    }

    // Restore the original centroid so the cluster does not drift.
    let moved: Vec<&Point> = positions.values().collect();
    let n = moved.len().max(1) as f32;
    let cx = moved.iter().map(|p| p.x).sum::<f32>() / n;
    let cy = moved.iter().map(|p| p.y).sum::<f32>() / n;
    let dx = original_center.x - cx;
    let dy = original_center.y - cy;
    positions
        .into_iter()
        .map(|(id, p)| (id, Point::new(p.x + dx, p.y + dy)))
        .collect()
}

/// Unit vector pointing from `from` toward `to`, plus the floored distance.
fn unit_between(from: Point, to: Point, min_distance: f32) -> (f32, f32, f32) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let d = (dx * dx + dy * dy).sqrt().max(min_distance);
    (dx / d, dy / d, d)
}

fn nudge(displacement: &mut BTreeMap<NodeId, Point>, id: NodeId, dx: f32, dy: f32) {
    if let Some(d) = displacement.get_mut(&id) {
        d.x += dx;
        d.y += dy;
    }
}
