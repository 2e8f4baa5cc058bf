//! Selection tracking and multi-item drag sessions.

use std::collections::BTreeSet;

use crate::command::Command;
use crate::model::{NodeId, Point, Rect, RegionId, Topology};

/// Anything that can be selected on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SelectableId {
    Node(NodeId),
    Region(RegionId),
}

/// The active selection, with O(log n) membership checks.
#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    selected: BTreeSet<SelectableId>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: SelectableId) -> bool {
        self.selected.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn replace(&mut self, items: impl IntoIterator<Item = SelectableId>) {
        self.selected = items.into_iter().collect();
    }

    /// Click semantics: additive clicks toggle membership; plain clicks
    /// replace the selection unless the item is already selected (so a
    /// drag of an existing multi-selection is not collapsed to one item).
    pub fn handle_click(&mut self, id: SelectableId, additive: bool) {
        if additive {
            if !self.selected.remove(&id) {
                self.selected.insert(id);
            }
        } else if !self.selected.contains(&id) {
            self.selected.clear();
            self.selected.insert(id);
        }
    }

    pub fn select_all(&mut self, topology: &Topology) {
        self.selected = topology
            .nodes()
            .map(|n| SelectableId::Node(n.id))
            .chain(topology.regions().map(|r| SelectableId::Region(r.id)))
            .collect();
    }

    /// Add every node and region whose shape intersects `rect`; replaces
    /// the selection unless `additive`.
    pub fn apply_box(&mut self, topology: &Topology, rect: Rect, additive: bool) {
        if !additive {
            self.selected.clear();
        }
        for node in topology.nodes() {
            if rect.intersects(&node.rect()) {
                self.selected.insert(SelectableId::Node(node.id));
            }
        }
        for region in topology.regions() {
            if rect.intersects(&region.rect) {
                self.selected.insert(SelectableId::Region(region.id));
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = SelectableId> + '_ {
        self.selected.iter().copied()
    }

    pub fn nodes(&self) -> Vec<NodeId> {
        self.selected
            .iter()
            .filter_map(|id| match id {
                SelectableId::Node(n) => Some(*n),
                SelectableId::Region(_) => None,
            })
            .collect()
    }

    pub fn regions(&self) -> Vec<RegionId> {
        self.selected
            .iter()
            .filter_map(|id| match id {
                SelectableId::Region(r) => Some(*r),
                SelectableId::Node(_) => None,
            })
            .collect()
    }
}

/// Coordinates a multi-item drag: start geometry is captured up front, the
/// model is moved live, and one composite move command is produced at the
/// end if anything actually moved.
#[derive(Debug, Clone)]
pub struct DragSession {
    anchor: Point,
    start_nodes: Vec<(NodeId, Point)>,
    start_regions: Vec<(RegionId, Rect)>,
}

impl DragSession {
    pub fn begin(topology: &Topology, selection: &SelectionManager, anchor: Point) -> Self {
        let start_nodes = selection
            .nodes()
            .into_iter()
            .filter_map(|id| topology.node(id).map(|n| (id, n.position)))
            .collect();
        let start_regions = selection
            .regions()
            .into_iter()
            .filter_map(|id| topology.region(id).map(|r| (id, r.rect)))
            .collect();
        Self {
            anchor,
            start_nodes,
            start_regions,
        }
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Live update: place every dragged item at its start geometry plus the
    /// pointer delta. Positions are written directly; the reversible command
    /// is only built when the drag finishes.
    pub fn update(&self, topology: &mut Topology, pointer: Point) {
        let dx = pointer.x - self.anchor.x;
        let dy = pointer.y - self.anchor.y;
        for (id, start) in &self.start_nodes {
            topology.set_node_position(*id, Point::new(start.x + dx, start.y + dy));
        }
        for (id, start) in &self.start_regions {
            let rect = Rect::new(start.x + dx, start.y + dy, start.width, start.height);
            topology.set_region_rect(*id, rect);
        }
    }

    /// Compare final positions against start positions; beyond `epsilon`
    /// the whole gesture becomes one composite move command capturing the
    /// start geometry as the undo state.
    pub fn finish(&self, topology: &Topology, epsilon: f32) -> Option<Command> {
        let mut commands = Vec::new();
        for (id, start) in &self.start_nodes {
            let Some(node) = topology.node(*id) else {
                continue;
            };
            let current = node.position;
            if (current.x - start.x).abs() > epsilon || (current.y - start.y).abs() > epsilon {
                commands.push(Command::MoveNode {
                    id: *id,
                    from: *start,
                    to: current,
                });
            }
        }
        for (id, start) in &self.start_regions {
            let Some(region) = topology.region(*id) else {
                continue;
            };
            let current = region.rect;
            if (current.x - start.x).abs() > epsilon || (current.y - start.y).abs() > epsilon {
                commands.push(Command::MoveRegion {
                    id: *id,
                    from: *start,
                    to: current,
                });
            }
        }
        match commands.len() {
            0 => None,
            1 => commands.pop(),
            n => Some(Command::Batch {
                description: format!("Move {n} items"),
                commands,
            }),
        }
    }
}
