//! Security-zone arrangement templates.
//!
//! Each template partitions the selection into zones and gives every zone a
//! fixed place in a recognizable shape. Zone membership comes from a node
//! property when every selected node carries one; otherwise the selection is
//! split evenly in reading order.

use std::collections::BTreeMap;
use std::f32::consts::TAU;

use crate::config::TemplateConfig;
use crate::model::{Node, NodeId, Point, PropertyValue};

use super::{centroid, selection_bounds, sort_reading_order};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Outside, DMZ, internal: three columns left to right.
    Dmz,
    /// Concentric rings, most exposed on the outermost ring.
    DefenseInDepth,
    /// Four side-by-side segments.
    Segmented,
    /// Small clusters spread on a ring, no implied perimeter.
    ZeroTrust,
    /// Purdue-style stacked bands, enterprise at the top.
    IcsZones,
}

impl TemplateKind {
    fn zone_count(&self, node_count: usize) -> usize {
        match self {
            TemplateKind::Dmz => 3,
            TemplateKind::DefenseInDepth => 4,
            TemplateKind::Segmented => 4,
            TemplateKind::ZeroTrust => node_count.div_ceil(3).max(1),
            TemplateKind::IcsZones => 4,
        }
    }
}

pub(super) fn template_positions(
    nodes: &[&Node],
    template: TemplateKind,
    config: &TemplateConfig,
) -> BTreeMap<NodeId, Point> {
    let zone_count = template.zone_count(nodes.len());
    let zones = assign_zones(nodes, zone_count, config);

    let center = centroid(nodes);
    let origin = selection_bounds(nodes);

    let mut positions = BTreeMap::new();
    for (zone, members) in zones.iter().enumerate() {
        if members.is_empty() {
            continue;
        }
        let anchor = match template {
            TemplateKind::Dmz | TemplateKind::Segmented => Point::new(
                origin.x + zone as f32 * config.zone_spacing,
                origin.y,
            ),
            TemplateKind::IcsZones => Point::new(
                origin.x,
                origin.y + zone as f32 * config.zone_spacing,
            ),
            TemplateKind::DefenseInDepth | TemplateKind::ZeroTrust => center,
        };
        match template {
            TemplateKind::DefenseInDepth => {
                place_on_ring(
                    &mut positions,
                    members,
                    center,
                    zone as f32 * config.ring_spacing,
                );
            }
            TemplateKind::ZeroTrust => {
                // Cluster centers sit on one ring, members on a small ring
                // of their own around each center.
                let angle = zone as f32 * TAU / zone_count as f32;
                let cluster = Point::new(
                    center.x + config.ring_spacing * angle.cos(),
                    center.y + config.ring_spacing * angle.sin(),
                );
                place_on_ring(&mut positions, members, cluster, config.member_spacing);
            }
            _ => place_in_grid(&mut positions, members, anchor, config.member_spacing),
        }
    }
    positions
}

/// Partition into zones. The property route only engages when every node
/// carries a usable value under the configured key; a mixed or absent
/// labeling falls back to an even positional split so the template is never
/// half driven by data and half by guesswork.
fn assign_zones(
    nodes: &[&Node],
    zone_count: usize,
    config: &TemplateConfig,
) -> Vec<Vec<NodeId>> {
    let mut zones = vec![Vec::new(); zone_count];

    if let Some(labels) = property_labels(nodes, &config.zone_key, zone_count) {
        for (node, zone) in nodes.iter().zip(labels) {
            zones[zone].push(node.id);
        }
    } else {
        let mut ordered: Vec<&Node> = nodes.to_vec();
        sort_reading_order(&mut ordered);
        for (i, node) in ordered.iter().enumerate() {
            zones[i * zone_count / ordered.len()].push(node.id);
        }
    }
    for members in &mut zones {
        members.sort();
    }
    zones
}

/// Zone index per node from the zone property, in `nodes` order. Integers
/// clamp into range; strings map to indices by sorted distinct value. `None`
/// when any node lacks a usable value.
fn property_labels(nodes: &[&Node], key: &str, zone_count: usize) -> Option<Vec<usize>> {
    let values: Vec<&PropertyValue> = nodes
        .iter()
        .map(|n| n.properties.get(key))
        .collect::<Option<Vec<_>>>()?;

    let mut names: Vec<&str> = values
        .iter()
        .filter_map(|v| match v {
            PropertyValue::Str(s) => Some(s.as_str()),
            _ => None,
        })
        .collect();
    names.sort();
    names.dedup();

    values
        .iter()
        .map(|value| match value {
            PropertyValue::Int(i) => Some((*i).clamp(0, zone_count as i64 - 1) as usize),
            PropertyValue::Str(s) => {
                let index = names.iter().position(|n| *n == s.as_str())?;
                Some(index.min(zone_count - 1))
            }
            _ => None,
        })
        .collect()
}

/// Members in a compact near-square grid hanging right and down from
/// `anchor`.
fn place_in_grid(
    positions: &mut BTreeMap<NodeId, Point>,
    members: &[NodeId],
    anchor: Point,
    spacing: f32,
) {
    let cols = ((members.len() as f32).sqrt().ceil() as usize).max(1);
    for (i, id) in members.iter().enumerate() {
        let col = (i % cols) as f32;
        let row = (i / cols) as f32;
        positions.insert(*id, Point::new(anchor.x + col * spacing, anchor.y + row * spacing));
    }
}

/// Members at equal angles on a ring; a zero radius collapses to the center.
fn place_on_ring(
    positions: &mut BTreeMap<NodeId, Point>,
    members: &[NodeId],
    center: Point,
    radius: f32,
) {
    let step = TAU / members.len() as f32;
    for (i, id) in members.iter().enumerate() {
        let angle = i as f32 * step;
        positions.insert(
            *id,
            Point::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            ),
        );
    }
}
