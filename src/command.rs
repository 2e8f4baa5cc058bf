//! Reversible editing commands and the bounded undo/redo history.
//!
//! Every model mutation flows through a [`Command`]. Each variant captures
//! enough state at construction time to reverse itself; composites group
//! sub-commands into one history entry. Applying or reverting a command
//! returns the [`ModelEvent`]s it produced, which the host drains and
//! dispatches instead of the core holding registered callbacks.

use log::{debug, warn};

use crate::model::{
    Edge, EdgeId, LinkKind, Node, NodeId, Point, PropertyValue, Rect, Region, RegionId,
    RouteStyle, Topology,
};

/// Notification produced by command execution, drained by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    NodeAdded(NodeId),
    NodeRemoved(NodeId),
    NodeMoved(NodeId),
    NodeRenamed(NodeId),
    NodePropertyChanged(NodeId, String),
    NodeDisplayChanged(NodeId, String),
    EdgeAdded(EdgeId),
    EdgeRemoved(EdgeId),
    EdgeStyleChanged(EdgeId),
    EdgePropertyChanged(EdgeId, String),
    RegionAdded(RegionId),
    RegionRemoved(RegionId),
    RegionMoved(RegionId),
    /// Fired after every push/undo/redo so the shell can refresh menu state.
    HistoryChanged,
}

/// A single undoable editing operation.
///
/// Closed sum type: dispatch happens through one match in `apply`/`revert`,
/// no runtime registration.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddNode {
        node: Box<Node>,
    },
    /// Deletes a node; `edges` holds the incident edges captured at
    /// construction so undo can restore them after the node.
    RemoveNode {
        node: Box<Node>,
        edges: Vec<Edge>,
    },
    MoveNode {
        id: NodeId,
        from: Point,
        to: Point,
    },
    RenameNode {
        id: NodeId,
        old: String,
        new: String,
    },
    SetNodeProperty {
        id: NodeId,
        key: String,
        old: Option<PropertyValue>,
        new: Option<PropertyValue>,
    },
    SetDisplayedProperty {
        id: NodeId,
        key: String,
        old: bool,
        new: bool,
    },
    AddEdge {
        edge: Box<Edge>,
    },
    RemoveEdge {
        edge: Box<Edge>,
    },
    SetEdgeStyle {
        id: EdgeId,
        old: RouteStyle,
        new: RouteStyle,
    },
    SetEdgeProperty {
        id: EdgeId,
        key: String,
        old: Option<PropertyValue>,
        new: Option<PropertyValue>,
    },
    AddRegion {
        region: Box<Region>,
    },
    RemoveRegion {
        region: Box<Region>,
    },
    MoveRegion {
        id: RegionId,
        from: Rect,
        to: Rect,
    },
    /// Ordered group applied front-to-back and reverted back-to-front.
    Batch {
        description: String,
        commands: Vec<Command>,
    },
}

impl Command {
    /// Capture a move command from the node's current position.
    pub fn move_node(topology: &Topology, id: NodeId, to: Point) -> Option<Command> {
        let from = topology.node(id)?.position;
        Some(Command::MoveNode { id, from, to })
    }

    pub fn rename_node(topology: &Topology, id: NodeId, new: &str) -> Option<Command> {
        let old = topology.node(id)?.name.clone();
        Some(Command::RenameNode {
            id,
            old,
            new: new.to_string(),
        })
    }

    pub fn set_node_property(
        topology: &Topology,
        id: NodeId,
        key: &str,
        new: Option<PropertyValue>,
    ) -> Option<Command> {
        let old = topology.node(id)?.properties.get(key).cloned();
        Some(Command::SetNodeProperty {
            id,
            key: key.to_string(),
            old,
            new,
        })
    }

    pub fn set_edge_style(topology: &Topology, id: EdgeId, new: RouteStyle) -> Option<Command> {
        let old = topology.edge(id)?.style;
        Some(Command::SetEdgeStyle { id, old, new })
    }

    pub fn set_edge_property(
        topology: &Topology,
        id: EdgeId,
        key: &str,
        new: Option<PropertyValue>,
    ) -> Option<Command> {
        let old = topology.edge(id)?.properties.get(key).cloned();
        Some(Command::SetEdgeProperty {
            id,
            key: key.to_string(),
            old,
            new,
        })
    }

    /// Full-snapshot delete for a single node, including its incident edges.
    pub fn remove_node(topology: &Topology, id: NodeId) -> Option<Command> {
        let node = topology.node(id)?.clone();
        let edges = node
            .incident_edges()
            .filter_map(|eid| topology.edge(eid).cloned())
            .collect();
        Some(Command::RemoveNode {
            node: Box::new(node),
            edges,
        })
    }

    pub fn move_region(topology: &Topology, id: RegionId, to: Rect) -> Option<Command> {
        let from = topology.region(id)?.rect;
        Some(Command::MoveRegion { id, from, to })
    }

    /// Atomic delete of a mixed selection. Edges are removed first so no
    /// sub-command ever sees a dangling endpoint, during apply or during
    /// undo replay (which runs in reverse: regions, nodes, then edges back).
    pub fn delete_items(
        topology: &Topology,
        nodes: &[NodeId],
        regions: &[RegionId],
    ) -> Option<Command> {
        let mut commands = Vec::new();
        let mut seen_edges = std::collections::BTreeSet::new();
        for &id in nodes {
            let Some(node) = topology.node(id) else {
                continue;
            };
            for eid in node.incident_edges() {
                if seen_edges.insert(eid) {
                    if let Some(edge) = topology.edge(eid) {
                        commands.push(Command::RemoveEdge {
                            edge: Box::new(edge.clone()),
                        });
                    }
                }
            }
        }
        for &id in nodes {
            if let Some(node) = topology.node(id) {
                // Incident edges are handled by the RemoveEdge sub-commands.
                commands.push(Command::RemoveNode {
                    node: Box::new(node.clone()),
                    edges: Vec::new(),
                });
            }
        }
        for &id in regions {
            if let Some(region) = topology.region(id) {
                commands.push(Command::RemoveRegion {
                    region: Box::new(region.clone()),
                });
            }
        }
        if commands.is_empty() {
            return None;
        }
        let count = commands.len();
        Some(Command::Batch {
            description: format!("Delete {count} item(s)"),
            commands,
        })
    }

    /// Mesh gesture: one composite linking every still-unconnected pair.
    /// Pairs that already share an edge in either direction are skipped;
    /// `None` when nothing new would be added.
    pub fn connect_all(
        topology: &mut Topology,
        ids: &[NodeId],
        kind: LinkKind,
        style: RouteStyle,
    ) -> Option<Command> {
        let mut commands = Vec::new();
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                if a == b || topology.edge_between(a, b).is_some() {
                    continue;
                }
                let Ok(edge) = topology.new_edge(a, b, kind, style) else {
                    continue;
                };
                commands.push(Command::AddEdge {
                    edge: Box::new(edge),
                });
            }
        }
        if commands.is_empty() {
            return None;
        }
        let count = commands.len();
        Some(Command::Batch {
            description: format!("Connect {count} pair(s)"),
            commands,
        })
    }

    /// Human-readable label for undo/redo menus.
    pub fn description(&self) -> String {
        match self {
            Command::AddNode { node } => format!("Add {}", node.name),
            Command::RemoveNode { node, .. } => format!("Delete {}", node.name),
            Command::MoveNode { .. } => "Move node".to_string(),
            Command::RenameNode { new, .. } => format!("Rename to {new}"),
            Command::SetNodeProperty { key, .. } => format!("Set {key}"),
            Command::SetDisplayedProperty { key, .. } => format!("Toggle {key} label"),
            Command::AddEdge { .. } => "Add connection".to_string(),
            Command::RemoveEdge { .. } => "Delete connection".to_string(),
            Command::SetEdgeStyle { .. } => "Change connection style".to_string(),
            Command::SetEdgeProperty { key, .. } => format!("Set connection {key}"),
            Command::AddRegion { region } => format!("Add region {}", region.name),
            Command::RemoveRegion { region } => format!("Delete region {}", region.name),
            Command::MoveRegion { .. } => "Move region".to_string(),
            Command::Batch { description, .. } => description.clone(),
        }
    }

    pub(crate) fn apply(&self, topology: &mut Topology) -> Vec<ModelEvent> {
        let mut events = Vec::new();
        self.apply_into(topology, &mut events);
        events
    }

    pub(crate) fn revert(&self, topology: &mut Topology) -> Vec<ModelEvent> {
        let mut events = Vec::new();
        self.revert_into(topology, &mut events);
        events
    }

    fn apply_into(&self, topology: &mut Topology, events: &mut Vec<ModelEvent>) {
        match self {
            Command::AddNode { node } => {
                let id = node.id;
                let mut fresh = (**node).clone();
                fresh.incident.clear();
                match topology.insert_node(fresh) {
                    Ok(()) => events.push(ModelEvent::NodeAdded(id)),
                    Err(err) => warn!("AddNode skipped: {err}"),
                }
            }
            Command::RemoveNode { node, .. } => {
                if topology.remove_node_cascade(node.id).is_some() {
                    events.push(ModelEvent::NodeRemoved(node.id));
                } else {
                    warn!("RemoveNode skipped: node {} missing", node.id);
                }
            }
            Command::MoveNode { id, to, .. } => {
                if topology.set_node_position(*id, *to) {
                    events.push(ModelEvent::NodeMoved(*id));
                } else {
                    warn!("MoveNode skipped: node {id} missing");
                }
            }
            Command::RenameNode { id, new, .. } => {
                if topology.set_node_name(*id, new) {
                    events.push(ModelEvent::NodeRenamed(*id));
                }
            }
            Command::SetNodeProperty { id, key, new, .. } => {
                if topology.set_node_property(*id, key, new.clone()).is_some() {
                    events.push(ModelEvent::NodePropertyChanged(*id, key.clone()));
                }
            }
            Command::SetDisplayedProperty { id, key, new, .. } => {
                if topology.set_displayed_property(*id, key, *new) {
                    events.push(ModelEvent::NodeDisplayChanged(*id, key.clone()));
                }
            }
            Command::AddEdge { edge } => match topology.insert_edge((**edge).clone()) {
                Ok(()) => events.push(ModelEvent::EdgeAdded(edge.id)),
                Err(err) => warn!("AddEdge skipped: {err}"),
            },
            Command::RemoveEdge { edge } => {
                if topology.remove_edge(edge.id).is_some() {
                    events.push(ModelEvent::EdgeRemoved(edge.id));
                } else {
                    warn!("RemoveEdge skipped: edge {} missing", edge.id);
                }
            }
            Command::SetEdgeStyle { id, new, .. } => {
                if topology.set_edge_style(*id, *new) {
                    events.push(ModelEvent::EdgeStyleChanged(*id));
                }
            }
            Command::SetEdgeProperty { id, key, new, .. } => {
                if topology.set_edge_property(*id, key, new.clone()).is_some() {
                    events.push(ModelEvent::EdgePropertyChanged(*id, key.clone()));
                }
            }
            Command::AddRegion { region } => {
                topology.insert_region((**region).clone());
                events.push(ModelEvent::RegionAdded(region.id));
            }
            Command::RemoveRegion { region } => {
                if topology.remove_region(region.id).is_some() {
                    events.push(ModelEvent::RegionRemoved(region.id));
                }
            }
            Command::MoveRegion { id, to, .. } => {
                if topology.set_region_rect(*id, *to) {
                    events.push(ModelEvent::RegionMoved(*id));
                }
            }
            Command::Batch { commands, .. } => {
                for command in commands {
                    command.apply_into(topology, events);
                }
            }
        }
    }

    fn revert_into(&self, topology: &mut Topology, events: &mut Vec<ModelEvent>) {
        match self {
            Command::AddNode { node } => {
                if topology.remove_node_cascade(node.id).is_some() {
                    events.push(ModelEvent::NodeRemoved(node.id));
                }
            }
            Command::RemoveNode { node, edges } => {
                let mut restored = (**node).clone();
                restored.incident.clear();
                match topology.insert_node(restored) {
                    Ok(()) => events.push(ModelEvent::NodeAdded(node.id)),
                    Err(err) => warn!("RemoveNode undo skipped: {err}"),
                }
                for edge in edges {
                    match topology.insert_edge(edge.clone()) {
                        Ok(()) => events.push(ModelEvent::EdgeAdded(edge.id)),
                        Err(err) => warn!("RemoveNode undo: edge {} skipped: {err}", edge.id),
                    }
                }
            }
            Command::MoveNode { id, from, .. } => {
                if topology.set_node_position(*id, *from) {
                    events.push(ModelEvent::NodeMoved(*id));
                }
            }
            Command::RenameNode { id, old, .. } => {
                if topology.set_node_name(*id, old) {
                    events.push(ModelEvent::NodeRenamed(*id));
                }
            }
            Command::SetNodeProperty { id, key, old, .. } => {
                if topology.set_node_property(*id, key, old.clone()).is_some() {
                    events.push(ModelEvent::NodePropertyChanged(*id, key.clone()));
                }
            }
            Command::SetDisplayedProperty { id, key, old, .. } => {
                if topology.set_displayed_property(*id, key, *old) {
                    events.push(ModelEvent::NodeDisplayChanged(*id, key.clone()));
                }
            }
            Command::AddEdge { edge } => {
                if topology.remove_edge(edge.id).is_some() {
                    events.push(ModelEvent::EdgeRemoved(edge.id));
                }
            }
            Command::RemoveEdge { edge } => match topology.insert_edge((**edge).clone()) {
                Ok(()) => events.push(ModelEvent::EdgeAdded(edge.id)),
                Err(err) => warn!("RemoveEdge undo skipped: {err}"),
            },
            Command::SetEdgeStyle { id, old, .. } => {
                if topology.set_edge_style(*id, *old) {
                    events.push(ModelEvent::EdgeStyleChanged(*id));
                }
            }
            Command::SetEdgeProperty { id, key, old, .. } => {
                if topology.set_edge_property(*id, key, old.clone()).is_some() {
                    events.push(ModelEvent::EdgePropertyChanged(*id, key.clone()));
                }
            }
            Command::AddRegion { region } => {
                if topology.remove_region(region.id).is_some() {
                    events.push(ModelEvent::RegionRemoved(region.id));
                }
            }
            Command::RemoveRegion { region } => {
                topology.insert_region((**region).clone());
                events.push(ModelEvent::RegionAdded(region.id));
            }
            Command::MoveRegion { id, from, .. } => {
                if topology.set_region_rect(*id, *from) {
                    events.push(ModelEvent::RegionMoved(*id));
                }
            }
            Command::Batch { commands, .. } => {
                for command in commands.iter().rev() {
                    command.revert_into(topology, events);
                }
            }
        }
    }
}

/// Bounded undo/redo history.
///
/// `push` clears the redo stack, applies the command, and evicts the oldest
/// entry past capacity. A replay guard is held for the scope of `undo` and
/// `redo` and exposed through [`CommandHistory::is_replaying`] so host code
/// reacting to drained events can tell a replay from a fresh user edit.
#[derive(Debug)]
pub struct CommandHistory {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    capacity: usize,
    replaying: bool,
}

impl CommandHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            capacity: capacity.max(1),
            replaying: false,
        }
    }

    /// Execute `command` against the model and record it, returning the
    /// events it produced plus a trailing `HistoryChanged`.
    pub fn push(&mut self, topology: &mut Topology, command: Command) -> Vec<ModelEvent> {
        self.redo_stack.clear();
        let mut events = command.apply(topology);
        self.undo_stack.push(command);
        if self.undo_stack.len() > self.capacity {
            let evicted = self.undo_stack.remove(0);
            debug!("history capacity reached; evicting '{}'", evicted.description());
        }
        events.push(ModelEvent::HistoryChanged);
        events
    }

    /// Revert the most recent command. Returns `None` on an empty stack.
    /// The command moves to the redo stack even if parts of its revert were
    /// skipped, so a damaged entry cannot wedge the history.
    pub fn undo(&mut self, topology: &mut Topology) -> Option<Vec<ModelEvent>> {
        let command = self.undo_stack.pop()?;
        self.replaying = true;
        let mut events = command.revert(topology);
        self.replaying = false;
        self.redo_stack.push(command);
        events.push(ModelEvent::HistoryChanged);
        Some(events)
    }

    /// Re-apply the most recently undone command (redo = execute again).
    pub fn redo(&mut self, topology: &mut Topology) -> Option<Vec<ModelEvent>> {
        let command = self.redo_stack.pop()?;
        self.replaying = true;
        let mut events = command.apply(topology);
        self.replaying = false;
        self.undo_stack.push(command);
        events.push(ModelEvent::HistoryChanged);
        Some(events)
    }

    /// True while an undo/redo replay is executing. Host code that turns
    /// drained events into follow-up commands must check this first.
    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.last().map(Command::description)
    }

    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(Command::description)
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeviceKind, LinkKind};

    fn seeded() -> (Topology, CommandHistory, NodeId, NodeId) {
        let mut t = Topology::new();
        let a = t.new_node("a", DeviceKind::Router, Point::new(0.0, 0.0));
        let b = t.new_node("b", DeviceKind::Switch, Point::new(100.0, 0.0));
        let (a_id, b_id) = (a.id, b.id);
        t.insert_node(a).unwrap();
        t.insert_node(b).unwrap();
        (t, CommandHistory::new(100), a_id, b_id)
    }

    #[test]
    fn push_executes_and_clears_redo() {
        let (mut t, mut history, a, _) = seeded();
        let first = Command::move_node(&t, a, Point::new(50.0, 50.0)).unwrap();
        history.push(&mut t, first);
        history.undo(&mut t).unwrap();
        assert!(history.can_redo());
        let second = Command::move_node(&t, a, Point::new(9.0, 9.0)).unwrap();
        history.push(&mut t, second);
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_redo_restores_state() {
        let (mut t, mut history, a, b) = seeded();
        let before = t.clone();
        let edge = t.new_edge(a, b, LinkKind::Ethernet, RouteStyle::Straight).unwrap();
        history.push(&mut t, Command::AddEdge { edge: Box::new(edge) });
        let move_cmd = Command::move_node(&t, a, Point::new(42.0, 7.0)).unwrap();
        history.push(&mut t, move_cmd);
        let after = t.clone();

        history.undo(&mut t).unwrap();
        history.undo(&mut t).unwrap();
        assert_eq!(t, before);

        history.redo(&mut t).unwrap();
        history.redo(&mut t).unwrap();
        assert_eq!(t, after);
    }

    #[test]
    fn empty_stacks_are_no_ops() {
        let (mut t, mut history, _, _) = seeded();
        assert!(history.undo(&mut t).is_none());
        assert!(history.redo(&mut t).is_none());
    }

    #[test]
    fn composite_is_one_history_entry() {
        let (mut t, mut history, a, b) = seeded();
        let cmd = Command::Batch {
            description: "Arrange".to_string(),
            commands: vec![
                Command::move_node(&t, a, Point::new(10.0, 0.0)).unwrap(),
                Command::move_node(&t, b, Point::new(20.0, 0.0)).unwrap(),
                Command::rename_node(&t, a, "renamed").unwrap(),
            ],
        };
        let before = t.clone();
        history.push(&mut t, cmd);
        assert_eq!(history.undo_depth(), 1);

        history.undo(&mut t).unwrap();
        assert_eq!(t, before);
        assert_eq!(t.node(a).unwrap().name, "a");
    }

    #[test]
    fn bounded_history_evicts_oldest() {
        let (mut t, _, a, _) = seeded();
        let mut history = CommandHistory::new(100);
        for i in 0..150 {
            let cmd = Command::move_node(&t, a, Point::new(i as f32, 0.0)).unwrap();
            history.push(&mut t, cmd);
        }
        assert_eq!(history.undo_depth(), 100);
        let mut undone = 0;
        while history.undo(&mut t).is_some() {
            undone += 1;
        }
        assert_eq!(undone, 100);
        // The oldest 50 moves are gone; position settles at move 49's target.
        assert_eq!(t.node(a).unwrap().position, Point::new(49.0, 0.0));
    }

    #[test]
    fn delete_items_removes_edges_before_nodes() {
        let (mut t, mut history, a, b) = seeded();
        let edge = t.new_edge(a, b, LinkKind::Ethernet, RouteStyle::Straight).unwrap();
        history.push(&mut t, Command::AddEdge { edge: Box::new(edge) });

        let before = t.clone();
        let delete = Command::delete_items(&t, &[a, b], &[]).unwrap();
        if let Command::Batch { commands, .. } = &delete {
            assert!(matches!(commands[0], Command::RemoveEdge { .. }));
            assert!(matches!(commands[1], Command::RemoveNode { .. }));
        } else {
            panic!("expected composite");
        }
        history.push(&mut t, delete);
        assert_eq!(t.node_count(), 0);
        assert_eq!(t.edge_count(), 0);

        history.undo(&mut t).unwrap();
        assert_eq!(t, before);
    }

    #[test]
    fn connect_all_skips_existing_pairs() {
        let (mut t, mut history, a, b) = seeded();
        let c = t.new_node("c", DeviceKind::Server, Point::new(0.0, 100.0));
        let c_id = c.id;
        t.insert_node(c).unwrap();
        let edge = t.new_edge(a, b, LinkKind::Ethernet, RouteStyle::Straight).unwrap();
        history.push(&mut t, Command::AddEdge { edge: Box::new(edge) });

        let mesh =
            Command::connect_all(&mut t, &[a, b, c_id], LinkKind::Ethernet, RouteStyle::Straight)
                .unwrap();
        history.push(&mut t, mesh);
        assert_eq!(t.edge_count(), 3);
        assert!(t.edge_between(a, c_id).is_some());
        assert!(t.edge_between(c_id, b).is_some());

        history.undo(&mut t).unwrap();
        assert_eq!(t.edge_count(), 1);

        // A complete mesh yields nothing further to add.
        history.redo(&mut t).unwrap();
        assert!(
            Command::connect_all(&mut t, &[a, b, c_id], LinkKind::Ethernet, RouteStyle::Straight)
                .is_none()
        );
    }

    #[test]
    fn replay_guard_clears_after_undo() {
        let (mut t, mut history, a, _) = seeded();
        let cmd = Command::move_node(&t, a, Point::new(5.0, 5.0)).unwrap();
        history.push(&mut t, cmd);
        assert!(!history.is_replaying());
        history.undo(&mut t).unwrap();
        assert!(!history.is_replaying());
    }
}
