//! Interaction modes and the editor facade.
//!
//! The editor owns the model, the history, and the selection; input arrives
//! as pre-hit-tested pointer and key events and leaves as two outboxes. One
//! carries [`ModelEvent`]s from executed commands, the other carries
//! [`Intent`]s: creation requests the shell completes (naming the node,
//! picking a link kind) before calling back into the `create_*` methods.

use log::{debug, warn};
use thiserror::Error;

use crate::command::{Command, CommandHistory, ModelEvent};
use crate::config::EditorConfig;
use crate::layout::{LayoutKind, layout_command};
use crate::model::{
    DeviceKind, EdgeId, LinkKind, NodeId, Point, Rect, RegionId, RouteStyle, Topology,
    TopologyError,
};
use crate::routing::nearest_port;
use crate::selection::{DragSession, SelectableId, SelectionManager};

/// Crate-level error for rejected editor requests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error("unknown mode '{0}'")]
    UnknownMode(String),
    #[error("region {0}x{1} is below the minimum size")]
    DegenerateRegion(f32, f32),
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

/// What the pointer landed on, resolved by the shell's hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Node(NodeId),
    Edge(EdgeId),
    Region(RegionId),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

impl Modifiers {
    fn additive(&self) -> bool {
        self.shift || self.ctrl
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: Point,
    pub hit: Option<HitTarget>,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Delete,
    Char(char),
}

/// Creation request emitted by a mode gesture and completed by the shell.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    CreateNodeAt { kind: DeviceKind, position: Point },
    CreateEdge { source: NodeId, target: NodeId },
    CreateRegion { rect: Rect },
}

/// Cursor the shell should show for the active mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    Arrow,
    Crosshair,
    Remove,
}

/// Two-click edge creation: pick a source, then pick a distinct target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddEdgeState {
    Idle,
    SourceChosen { source: NodeId },
}

/// The active interaction mode. In-progress gesture state lives inside the
/// variant so leaving the mode discards it wholesale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    Select,
    AddNode { kind: DeviceKind },
    AddEdge(AddEdgeState),
    AddRegion { anchor: Option<Point> },
    Delete,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Select => "select",
            Mode::AddNode { .. } => "add-node",
            Mode::AddEdge(_) => "add-edge",
            Mode::AddRegion { .. } => "add-region",
            Mode::Delete => "delete",
        }
    }

    pub fn cursor_hint(&self) -> CursorHint {
        match self {
            Mode::Select => CursorHint::Arrow,
            Mode::AddNode { .. } | Mode::AddEdge(_) | Mode::AddRegion { .. } => {
                CursorHint::Crosshair
            }
            Mode::Delete => CursorHint::Remove,
        }
    }
}

/// The editor core: topology, history, selection, and the mode machine.
pub struct Editor {
    topology: Topology,
    history: CommandHistory,
    selection: SelectionManager,
    mode: Mode,
    config: EditorConfig,
    drag: Option<DragSession>,
    box_anchor: Option<Point>,
    hover: Option<PointerEvent>,
    intents: Vec<Intent>,
    events: Vec<ModelEvent>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            topology: Topology::new(),
            history: CommandHistory::new(config.interaction.history_capacity),
            selection: SelectionManager::new(),
            mode: Mode::Select,
            config,
            drag: None,
            box_anchor: None,
            hover: None,
            intents: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Switch modes, abandoning any gesture in progress.
    pub fn set_mode(&mut self, mode: Mode) {
        self.cancel_gesture();
        self.mode = mode;
    }

    /// Parse a toolbar mode token. `add-node` takes an optional device kind
    /// suffix (`add-node:router`); `delete-selected` is a one-shot that
    /// deletes the selection and leaves the editor in select mode.
    pub fn set_mode_by_name(&mut self, name: &str) -> Result<(), EditorError> {
        let mode = match name {
            "select" => Mode::Select,
            "add-node" => Mode::AddNode {
                kind: DeviceKind::Generic,
            },
            "add-edge" => Mode::AddEdge(AddEdgeState::Idle),
            "add-region" => Mode::AddRegion { anchor: None },
            "delete" => Mode::Delete,
            "delete-selected" => {
                self.set_mode(Mode::Select);
                self.delete_selection();
                return Ok(());
            }
            other => {
                if let Some(token) = other.strip_prefix("add-node:") {
                    match DeviceKind::from_token(token) {
                        Some(kind) => Mode::AddNode { kind },
                        None => {
                            warn!("rejected unknown mode name '{other}'");
                            return Err(EditorError::UnknownMode(other.to_string()));
                        }
                    }
                } else {
                    warn!("rejected unknown mode name '{other}'");
                    return Err(EditorError::UnknownMode(other.to_string()));
                }
            }
        };
        self.set_mode(mode);
        Ok(())
    }

    // ── Input dispatch ──────────────────────────────────────────

    pub fn pointer_down(&mut self, event: PointerEvent) -> bool {
        self.hover = Some(event);
        match self.mode {
            Mode::Select => self.select_pointer_down(event),
            Mode::AddNode { kind } => {
                self.intents.push(Intent::CreateNodeAt {
                    kind,
                    position: event.position,
                });
                true
            }
            Mode::AddEdge(state) => self.add_edge_pointer_down(state, event),
            Mode::AddRegion { .. } => {
                self.mode = Mode::AddRegion {
                    anchor: Some(event.position),
                };
                true
            }
            Mode::Delete => self.delete_pointer_down(event),
        }
    }

    pub fn pointer_move(&mut self, event: PointerEvent) -> bool {
        self.hover = Some(event);
        match self.mode {
            Mode::Select => {
                if let Some(drag) = &self.drag {
                    drag.update(&mut self.topology, event.position);
                    true
                } else {
                    self.box_anchor.is_some()
                }
            }
            Mode::AddEdge(AddEdgeState::SourceChosen { .. }) => true,
            Mode::AddRegion { anchor } => anchor.is_some(),
            _ => false,
        }
    }

    pub fn pointer_up(&mut self, event: PointerEvent) -> bool {
        self.hover = Some(event);
        match self.mode {
            Mode::Select => {
                if let Some(drag) = self.drag.take() {
                    let epsilon = self.config.interaction.drag_epsilon;
                    if let Some(command) = drag.finish(&self.topology, epsilon) {
                        self.push(command);
                    }
                    true
                } else if let Some(anchor) = self.box_anchor.take() {
                    let rect = Rect::from_corners(anchor, event.position);
                    self.selection
                        .apply_box(&self.topology, rect, event.modifiers.additive());
                    true
                } else {
                    false
                }
            }
            Mode::AddRegion {
                anchor: Some(anchor),
            } => {
                self.mode = Mode::AddRegion { anchor: None };
                let rect = Rect::from_corners(anchor, event.position);
                let min = self.config.interaction.min_region_size;
                if rect.width < min || rect.height < min {
                    debug!(
                        "region {}x{} below minimum size; ignoring",
                        rect.width, rect.height
                    );
                } else {
                    self.intents.push(Intent::CreateRegion { rect });
                }
                true
            }
            _ => false,
        }
    }

    pub fn key_down(&mut self, key: Key, modifiers: Modifiers) -> bool {
        match key {
            Key::Escape => {
                if self.gesture_in_progress() {
                    self.cancel_gesture();
                    true
                } else if self.mode != Mode::Select {
                    self.set_mode(Mode::Select);
                    true
                } else if !self.selection.is_empty() {
                    self.selection.clear();
                    true
                } else {
                    false
                }
            }
            Key::Delete if self.mode == Mode::Select => self.delete_selection(),
            Key::Char('a') if modifiers.ctrl && self.mode == Mode::Select => {
                self.selection.select_all(&self.topology);
                true
            }
            _ => false,
        }
    }

    // ── Creation requests (shell callbacks after draining intents) ──

    pub fn create_node(&mut self, name: &str, kind: DeviceKind, position: Point) -> NodeId {
        let node = self.topology.new_node(name, kind, position);
        let id = node.id;
        self.push(Command::AddNode {
            node: Box::new(node),
        });
        id
    }

    pub fn create_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        kind: LinkKind,
        style: RouteStyle,
    ) -> Result<EdgeId, EditorError> {
        let edge = self.topology.new_edge(source, target, kind, style)?;
        let id = edge.id;
        self.push(Command::AddEdge {
            edge: Box::new(edge),
        });
        Ok(id)
    }

    pub fn create_region(&mut self, name: &str, rect: Rect) -> Result<RegionId, EditorError> {
        let min = self.config.interaction.min_region_size;
        if rect.width < min || rect.height < min {
            return Err(EditorError::DegenerateRegion(rect.width, rect.height));
        }
        let region = self.topology.new_region(name, rect);
        let id = region.id;
        self.push(Command::AddRegion {
            region: Box::new(region),
        });
        Ok(id)
    }

    /// Run a layout over the selected nodes as one undo step. `false` when
    /// the layout is not applicable to the selection or nothing moved.
    pub fn apply_layout(&mut self, kind: LayoutKind) -> bool {
        let ids = self.selection.nodes();
        let Some(command) = layout_command(kind, &self.topology, &ids, &self.config.layout) else {
            return false;
        };
        self.push(command);
        true
    }

    /// Mesh the selected nodes: one composite edge-add per unconnected pair.
    pub fn connect_selection(&mut self, kind: LinkKind, style: RouteStyle) -> bool {
        let ids = self.selection.nodes();
        let Some(command) = Command::connect_all(&mut self.topology, &ids, kind, style) else {
            return false;
        };
        self.push(command);
        true
    }

    /// Delete the current selection as one undo step.
    pub fn delete_selection(&mut self) -> bool {
        let nodes = self.selection.nodes();
        let regions = self.selection.regions();
        let Some(command) = Command::delete_items(&self.topology, &nodes, &regions) else {
            return false;
        };
        self.selection.clear();
        self.push(command);
        true
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo(&mut self.topology) {
            Some(events) => {
                self.events.extend(events);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(&mut self.topology) {
            Some(events) => {
                self.events.extend(events);
                true
            }
            None => false,
        }
    }

    // ── Outboxes and previews ───────────────────────────────────

    pub fn drain_intents(&mut self) -> Vec<Intent> {
        std::mem::take(&mut self.intents)
    }

    pub fn drain_events(&mut self) -> Vec<ModelEvent> {
        std::mem::take(&mut self.events)
    }

    /// Live edge preview while a source is chosen: anchored at the source
    /// port facing the pointer, snapping to the hovered node's facing port.
    pub fn edge_preview(&self) -> Option<(Point, Point)> {
        let Mode::AddEdge(AddEdgeState::SourceChosen { source }) = self.mode else {
            return None;
        };
        let hover = self.hover?;
        let source_rect = self.topology.node(source)?.rect();
        if let Some(HitTarget::Node(id)) = hover.hit {
            if id != source {
                if let Some(target) = self.topology.node(id) {
                    let (_, start) = nearest_port(&source_rect, target.rect().center());
                    let (_, end) = nearest_port(&target.rect(), source_rect.center());
                    return Some((start, end));
                }
            }
        }
        let (_, start) = nearest_port(&source_rect, hover.position);
        Some((start, hover.position))
    }

    /// Rubber-band region rectangle while the anchor is held.
    pub fn region_preview(&self) -> Option<Rect> {
        let Mode::AddRegion {
            anchor: Some(anchor),
        } = self.mode
        else {
            return None;
        };
        Some(Rect::from_corners(anchor, self.hover?.position))
    }

    /// Rubber-band box-selection rectangle in select mode.
    pub fn box_preview(&self) -> Option<Rect> {
        let anchor = self.box_anchor?;
        Some(Rect::from_corners(anchor, self.hover?.position))
    }

    // ── Mode internals ──────────────────────────────────────────

    fn select_pointer_down(&mut self, event: PointerEvent) -> bool {
        match event.hit {
            Some(HitTarget::Node(id)) => {
                self.selection
                    .handle_click(SelectableId::Node(id), event.modifiers.additive());
                self.drag = Some(DragSession::begin(
                    &self.topology,
                    &self.selection,
                    event.position,
                ));
                true
            }
            Some(HitTarget::Region(id)) => {
                self.selection
                    .handle_click(SelectableId::Region(id), event.modifiers.additive());
                self.drag = Some(DragSession::begin(
                    &self.topology,
                    &self.selection,
                    event.position,
                ));
                true
            }
            // Edges are not selectable; treat like empty space without
            // starting a box.
            Some(HitTarget::Edge(_)) => {
                if !event.modifiers.additive() {
                    self.selection.clear();
                }
                true
            }
            None => {
                if !event.modifiers.additive() {
                    self.selection.clear();
                }
                self.box_anchor = Some(event.position);
                true
            }
        }
    }

    fn add_edge_pointer_down(&mut self, state: AddEdgeState, event: PointerEvent) -> bool {
        match (state, event.hit) {
            (AddEdgeState::Idle, Some(HitTarget::Node(id))) => {
                self.mode = Mode::AddEdge(AddEdgeState::SourceChosen { source: id });
                true
            }
            (AddEdgeState::Idle, _) => false,
            (AddEdgeState::SourceChosen { source }, Some(HitTarget::Node(id))) => {
                if id != source {
                    self.intents.push(Intent::CreateEdge { source, target: id });
                }
                self.mode = Mode::AddEdge(AddEdgeState::Idle);
                true
            }
            // Anything else cancels the pending source.
            (AddEdgeState::SourceChosen { .. }, _) => {
                self.mode = Mode::AddEdge(AddEdgeState::Idle);
                true
            }
        }
    }

    fn delete_pointer_down(&mut self, event: PointerEvent) -> bool {
        let command = match event.hit {
            Some(HitTarget::Node(id)) => {
                self.deselect(SelectableId::Node(id));
                Command::remove_node(&self.topology, id)
            }
            Some(HitTarget::Edge(id)) => self.topology.edge(id).map(|edge| Command::RemoveEdge {
                edge: Box::new(edge.clone()),
            }),
            Some(HitTarget::Region(id)) => {
                self.deselect(SelectableId::Region(id));
                self.topology.region(id).map(|region| Command::RemoveRegion {
                    region: Box::new(region.clone()),
                })
            }
            None => None,
        };
        match command {
            Some(command) => {
                self.push(command);
                true
            }
            None => false,
        }
    }

    fn deselect(&mut self, id: SelectableId) {
        if self.selection.contains(id) {
            let keep: Vec<SelectableId> = self.selection.iter().filter(|s| *s != id).collect();
            self.selection.replace(keep);
        }
    }

    fn gesture_in_progress(&self) -> bool {
        self.drag.is_some()
            || self.box_anchor.is_some()
            || matches!(self.mode, Mode::AddEdge(AddEdgeState::SourceChosen { .. }))
            || matches!(self.mode, Mode::AddRegion { anchor: Some(_) })
    }

    /// Abandon whatever gesture is mid-flight, restoring dragged geometry.
    fn cancel_gesture(&mut self) {
        if let Some(drag) = self.drag.take() {
            drag.update(&mut self.topology, drag.anchor());
        }
        self.box_anchor = None;
        match &mut self.mode {
            Mode::AddEdge(state) => *state = AddEdgeState::Idle,
            Mode::AddRegion { anchor } => *anchor = None,
            _ => {}
        }
    }

    fn push(&mut self, command: Command) {
        let events = self.history.push(&mut self.topology, command);
        self.events.extend(events);
    }
}
