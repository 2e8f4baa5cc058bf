//! Alignment and even distribution.

use std::collections::BTreeMap;

use crate::config::DistributeConfig;
use crate::model::{Node, NodeId, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignEdge {
    Left,
    Right,
    Top,
    Bottom,
    /// Share one center x.
    CenterH,
    /// Share one center y.
    CenterV,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Align every node to one shared coordinate on the aligned axis, leaving
/// the other axis untouched. Right/bottom alignment lines up the far edge,
/// so node sizes participate, not just the anchor corner.
pub(super) fn align_positions(nodes: &[&Node], edge: AlignEdge) -> BTreeMap<NodeId, Point> {
    let mut positions = BTreeMap::new();
    match edge {
        AlignEdge::Left => {
            let anchor = fold_min(nodes.iter().map(|n| n.position.x));
            for node in nodes {
                positions.insert(node.id, Point::new(anchor, node.position.y));
            }
        }
        AlignEdge::Right => {
            let anchor = fold_max(nodes.iter().map(|n| n.rect().right()));
            for node in nodes {
                positions.insert(
                    node.id,
                    Point::new(anchor - node.size.width, node.position.y),
                );
            }
        }
        AlignEdge::Top => {
            let anchor = fold_min(nodes.iter().map(|n| n.position.y));
            for node in nodes {
                positions.insert(node.id, Point::new(node.position.x, anchor));
            }
        }
        AlignEdge::Bottom => {
            let anchor = fold_max(nodes.iter().map(|n| n.rect().bottom()));
            for node in nodes {
                positions.insert(
                    node.id,
                    Point::new(node.position.x, anchor - node.size.height),
                );
            }
        }
        AlignEdge::CenterH => {
            let anchor = mean(nodes.iter().map(|n| n.rect().center().x));
            for node in nodes {
                positions.insert(
                    node.id,
                    Point::new(anchor - node.size.width / 2.0, node.position.y),
                );
            }
        }
        AlignEdge::CenterV => {
            let anchor = mean(nodes.iter().map(|n| n.rect().center().y));
            for node in nodes {
                positions.insert(
                    node.id,
                    Point::new(node.position.x, anchor - node.size.height / 2.0),
                );
            }
        }
    }
    positions
}

/// Space interior nodes so gaps between bounding boxes are equal. The first
/// and last node on the axis stay fixed; the gap never shrinks below the
/// configured floor.
pub(super) fn distribute_positions(
    nodes: &[&Node],
    axis: Axis,
    config: &DistributeConfig,
) -> BTreeMap<NodeId, Point> {
    let mut ordered: Vec<&Node> = nodes.to_vec();
    match axis {
        Axis::Horizontal => ordered.sort_by(|a, b| {
            a.position
                .x
                .partial_cmp(&b.position.x)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        }),
        Axis::Vertical => ordered.sort_by(|a, b| {
            a.position
                .y
                .partial_cmp(&b.position.y)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        }),
    }

    let mut positions = BTreeMap::new();
    let first = ordered[0];
    let last = ordered[ordered.len() - 1];
    positions.insert(first.id, first.position);
    positions.insert(last.id, last.position);

    let (span_start, span_end, extent): (f32, f32, fn(&Node) -> f32) = match axis {
        Axis::Horizontal => (
            first.rect().right(),
            last.position.x,
            |n: &Node| n.size.width,
        ),
        Axis::Vertical => (
            first.rect().bottom(),
            last.position.y,
            |n: &Node| n.size.height,
        ),
    };
    let interior = &ordered[1..ordered.len() - 1];
    let interior_extent: f32 = interior.iter().map(|n| extent(n)).sum();
    let gap_count = (interior.len() + 1) as f32;
    let gap = ((span_end - span_start - interior_extent) / gap_count).max(config.min_gap);

    let mut cursor = span_start + gap;
    for node in interior {
        match axis {
            Axis::Horizontal => {
                positions.insert(node.id, Point::new(cursor, node.position.y));
            }
            Axis::Vertical => {
                positions.insert(node.id, Point::new(node.position.x, cursor));
            }
        }
        cursor += extent(node) + gap;
    }
    positions
}

fn fold_min(values: impl Iterator<Item = f32>) -> f32 {
    values.fold(f32::MAX, f32::min)
}

fn fold_max(values: impl Iterator<Item = f32>) -> f32 {
    values.fold(f32::MIN, f32::max)
}

fn mean(values: impl Iterator<Item = f32>) -> f32 {
    let mut total = 0.0;
    let mut count = 0usize;
    for v in values {
        total += v;
        count += 1;
    }
    total / count.max(1) as f32
}
