use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Geometry primitives ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_finite(&self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Axis-aligned rectangle spanning two arbitrary corner points.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x,
            y,
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// True when `other` lies fully inside this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }
}

// ── Identifiers ─────────────────────────────────────────────────────

macro_rules! id_type {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(NodeId);
id_type!(EdgeId);
id_type!(RegionId);

// ── Tags and property values ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Router,
    Switch,
    Firewall,
    Server,
    Cloud,
    Workstation,
    Generic,
    Custom,
}

impl DeviceKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "router" => Some(Self::Router),
            "switch" => Some(Self::Switch),
            "firewall" => Some(Self::Firewall),
            "server" => Some(Self::Server),
            "cloud" => Some(Self::Cloud),
            "workstation" => Some(Self::Workstation),
            "generic" => Some(Self::Generic),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Ethernet,
    Fiber,
    Wireless,
    Vpn,
    Serial,
    Generic,
}

impl LinkKind {
    /// Default stroke weight used by the shell when no override is set.
    pub fn default_weight(&self) -> f32 {
        match self {
            Self::Fiber => 3.0,
            Self::Ethernet => 2.0,
            Self::Vpn => 2.0,
            Self::Wireless => 1.5,
            Self::Serial => 1.0,
            Self::Generic => 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStyle {
    Straight,
    Orthogonal,
    Curved,
}

/// Primitive property value attached to nodes and edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

// ── Elements ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: DeviceKind,
    pub position: Point,
    pub size: Size,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
    /// Property keys rendered as labels next to the node.
    #[serde(default)]
    pub displayed: BTreeSet<String>,
    /// Incident edge keys; derived state, rebuilt on load.
    #[serde(skip)]
    pub(crate) incident: BTreeSet<EdgeId>,
}

impl Node {
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.size.width,
            self.size.height,
        )
    }

    pub fn incident_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.incident.iter().copied()
    }

    pub fn degree(&self) -> usize {
        self.incident.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub style: RouteStyle,
    pub kind: LinkKind,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl Edge {
    /// The endpoint opposite to `node`, if `node` is an endpoint at all.
    pub fn other_endpoint(&self, node: NodeId) -> Option<NodeId> {
        if self.source == node {
            Some(self.target)
        } else if self.target == node {
            Some(self.source)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    pub rect: Rect,
    pub fill: String,
    pub stroke: String,
}

// ── Device defaults ─────────────────────────────────────────────────

struct DeviceTemplate {
    size: Size,
    properties: &'static [(&'static str, &'static str)],
}

static DEVICE_TEMPLATES: Lazy<BTreeMap<DeviceKind, DeviceTemplate>> = Lazy::new(|| {
    let mut map = BTreeMap::new();
    map.insert(
        DeviceKind::Router,
        DeviceTemplate {
            size: Size::new(64.0, 64.0),
            properties: &[("ip_address", ""), ("routing_protocol", "static")],
        },
    );
    map.insert(
        DeviceKind::Switch,
        DeviceTemplate {
            size: Size::new(64.0, 48.0),
            properties: &[("port_count", "24"), ("managed", "true")],
        },
    );
    map.insert(
        DeviceKind::Firewall,
        DeviceTemplate {
            size: Size::new(64.0, 64.0),
            properties: &[("policy", "deny-all"), ("zone", "")],
        },
    );
    map.insert(
        DeviceKind::Server,
        DeviceTemplate {
            size: Size::new(56.0, 72.0),
            properties: &[("os", ""), ("role", "")],
        },
    );
    map.insert(
        DeviceKind::Cloud,
        DeviceTemplate {
            size: Size::new(96.0, 64.0),
            properties: &[("provider", "")],
        },
    );
    map.insert(
        DeviceKind::Workstation,
        DeviceTemplate {
            size: Size::new(56.0, 56.0),
            properties: &[("os", "")],
        },
    );
    map.insert(
        DeviceKind::Generic,
        DeviceTemplate {
            size: Size::new(64.0, 64.0),
            properties: &[],
        },
    );
    map.insert(
        DeviceKind::Custom,
        DeviceTemplate {
            size: Size::new(64.0, 64.0),
            properties: &[],
        },
    );
    map
});

pub fn default_size_for(kind: DeviceKind) -> Size {
    DEVICE_TEMPLATES
        .get(&kind)
        .map(|t| t.size)
        .unwrap_or(Size::new(64.0, 64.0))
}

fn default_properties_for(kind: DeviceKind) -> BTreeMap<String, PropertyValue> {
    DEVICE_TEMPLATES
        .get(&kind)
        .map(|t| {
            t.properties
                .iter()
                .map(|(k, v)| (k.to_string(), PropertyValue::Str(v.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("edge endpoints must be two distinct nodes")]
    SelfLoop,
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    #[error("unknown edge {0}")]
    UnknownEdge(EdgeId),
    #[error("unknown region {0}")]
    UnknownRegion(RegionId),
    #[error("node {0} has non-finite position or size")]
    NonFiniteGeometry(NodeId),
    #[error("duplicate id {0} in document")]
    DuplicateId(u64),
}

// ── Topology arena ──────────────────────────────────────────────────

/// The graph model: node, edge, and region tables keyed by small integer
/// ids. Edges store endpoint keys and nodes store incident-edge keys, so
/// there are no owning references in either direction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Topology {
    nodes: BTreeMap<NodeId, Node>,
    edges: BTreeMap<EdgeId, Edge>,
    regions: BTreeMap<RegionId, Region>,
    next_id: u64,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    // ── Construction helpers ────────────────────────────────────

    /// Build a node with a fresh id and the kind's default size and
    /// property template. The node is not inserted; commands own it first.
    pub fn new_node(&mut self, name: &str, kind: DeviceKind, position: Point) -> Node {
        Node {
            id: NodeId(self.alloc_id()),
            name: name.to_string(),
            kind,
            position,
            size: default_size_for(kind),
            properties: default_properties_for(kind),
            displayed: BTreeSet::new(),
            incident: BTreeSet::new(),
        }
    }

    /// Build an edge with a fresh id after validating both endpoints.
    pub fn new_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        kind: LinkKind,
        style: RouteStyle,
    ) -> Result<Edge, TopologyError> {
        self.validate_endpoints(source, target)?;
        Ok(Edge {
            id: EdgeId(self.alloc_id()),
            source,
            target,
            style,
            kind,
            properties: BTreeMap::new(),
        })
    }

    pub fn new_region(&mut self, name: &str, rect: Rect) -> Region {
        Region {
            id: RegionId(self.alloc_id()),
            name: name.to_string(),
            rect,
            fill: "#e8eef7".to_string(),
            stroke: "#5b7a9d".to_string(),
        }
    }

    pub fn validate_endpoints(&self, source: NodeId, target: NodeId) -> Result<(), TopologyError> {
        if source == target {
            return Err(TopologyError::SelfLoop);
        }
        if !self.nodes.contains_key(&source) {
            return Err(TopologyError::UnknownNode(source));
        }
        if !self.nodes.contains_key(&target) {
            return Err(TopologyError::UnknownNode(target));
        }
        Ok(())
    }

    // ── Mutation primitives ─────────────────────────────────────

    pub fn insert_node(&mut self, node: Node) -> Result<(), TopologyError> {
        if !node.position.is_finite() || !node.size.is_finite() {
            return Err(TopologyError::NonFiniteGeometry(node.id));
        }
        self.next_id = self.next_id.max(node.id.0);
        self.nodes.insert(node.id, node);
        Ok(())
    }

    /// Remove a node and every incident edge. Returns the removed node and
    /// edges so the caller can capture them for undo.
    pub fn remove_node_cascade(&mut self, id: NodeId) -> Option<(Node, Vec<Edge>)> {
        let node = self.nodes.remove(&id)?;
        let mut removed = Vec::new();
        for edge_id in node.incident.iter().copied().collect::<Vec<_>>() {
            if let Some(edge) = self.remove_edge(edge_id) {
                removed.push(edge);
            }
        }
        Some((node, removed))
    }

    pub fn insert_edge(&mut self, edge: Edge) -> Result<(), TopologyError> {
        self.validate_endpoints(edge.source, edge.target)?;
        self.next_id = self.next_id.max(edge.id.0);
        if let Some(node) = self.nodes.get_mut(&edge.source) {
            node.incident.insert(edge.id);
        }
        if let Some(node) = self.nodes.get_mut(&edge.target) {
            node.incident.insert(edge.id);
        }
        self.edges.insert(edge.id, edge);
        Ok(())
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(&id)?;
        if let Some(node) = self.nodes.get_mut(&edge.source) {
            node.incident.remove(&id);
        }
        if let Some(node) = self.nodes.get_mut(&edge.target) {
            node.incident.remove(&id);
        }
        Some(edge)
    }

    pub fn insert_region(&mut self, region: Region) {
        self.next_id = self.next_id.max(region.id.0);
        self.regions.insert(region.id, region);
    }

    pub fn remove_region(&mut self, id: RegionId) -> Option<Region> {
        self.regions.remove(&id)
    }

    pub fn set_node_position(&mut self, id: NodeId, position: Point) -> bool {
        if !position.is_finite() {
            return false;
        }
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    pub fn set_node_name(&mut self, id: NodeId, name: &str) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Set or clear (`None`) a node property, returning the prior value.
    pub fn set_node_property(
        &mut self,
        id: NodeId,
        key: &str,
        value: Option<PropertyValue>,
    ) -> Option<Option<PropertyValue>> {
        let node = self.nodes.get_mut(&id)?;
        let old = match value {
            Some(v) => node.properties.insert(key.to_string(), v),
            None => node.properties.remove(key),
        };
        Some(old)
    }

    pub fn set_displayed_property(&mut self, id: NodeId, key: &str, shown: bool) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                if shown {
                    node.displayed.insert(key.to_string());
                } else {
                    node.displayed.remove(key);
                }
                true
            }
            None => false,
        }
    }

    pub fn set_edge_style(&mut self, id: EdgeId, style: RouteStyle) -> bool {
        match self.edges.get_mut(&id) {
            Some(edge) => {
                edge.style = style;
                true
            }
            None => false,
        }
    }

    pub fn set_edge_property(
        &mut self,
        id: EdgeId,
        key: &str,
        value: Option<PropertyValue>,
    ) -> Option<Option<PropertyValue>> {
        let edge = self.edges.get_mut(&id)?;
        let old = match value {
            Some(v) => edge.properties.insert(key.to_string(), v),
            None => edge.properties.remove(key),
        };
        Some(old)
    }

    pub fn set_region_rect(&mut self, id: RegionId, rect: Rect) -> bool {
        if !rect.is_finite() {
            return false;
        }
        match self.regions.get_mut(&id) {
            Some(region) => {
                region.rect = rect;
                true
            }
            None => false,
        }
    }

    // ── Queries ─────────────────────────────────────────────────

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.nodes.get(&id).map(|n| n.incident.len()).unwrap_or(0)
    }

    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let Some(node) = self.nodes.get(&id) else {
            return Vec::new();
        };
        node.incident
            .iter()
            .filter_map(|edge_id| self.edges.get(edge_id))
            .filter_map(|edge| edge.other_endpoint(id))
            .collect()
    }

    /// The edge joining `a` and `b` in either direction, if one exists.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        let node = self.nodes.get(&a)?;
        node.incident.iter().copied().find(|edge_id| {
            self.edges
                .get(edge_id)
                .and_then(|e| e.other_endpoint(a))
                .is_some_and(|other| other == b)
        })
    }

    /// Edges whose both endpoints are in `ids`.
    pub fn edges_within(&self, ids: &[NodeId]) -> Vec<&Edge> {
        let set: BTreeSet<NodeId> = ids.iter().copied().collect();
        self.edges
            .values()
            .filter(|e| set.contains(&e.source) && set.contains(&e.target))
            .collect()
    }

    /// Spatial containment is derived, not stored: a node is in a region
    /// when its bounding box lies fully inside the region rectangle.
    pub fn nodes_in_region(&self, region_id: RegionId) -> Vec<NodeId> {
        let Some(region) = self.regions.get(&region_id) else {
            return Vec::new();
        };
        self.nodes
            .values()
            .filter(|n| region.rect.contains_rect(&n.rect()))
            .map(|n| n.id)
            .collect()
    }

    // ── Persistence boundary ────────────────────────────────────

    pub fn to_doc(&self) -> TopologyDoc {
        TopologyDoc {
            nodes: self.nodes.values().cloned().collect(),
            edges: self.edges.values().cloned().collect(),
            regions: self.regions.values().cloned().collect(),
            next_id: self.next_id,
        }
    }

    /// Rebuild a topology from its plain document form, reconstructing
    /// incidence sets and validating edge endpoint references.
    pub fn from_doc(doc: TopologyDoc) -> Result<Self, TopologyError> {
        let mut topology = Topology {
            next_id: doc.next_id,
            ..Topology::default()
        };
        for node in doc.nodes {
            if topology.nodes.contains_key(&node.id) {
                return Err(TopologyError::DuplicateId(node.id.0));
            }
            let mut node = node;
            node.incident.clear();
            topology.insert_node(node)?;
        }
        for edge in doc.edges {
            if topology.edges.contains_key(&edge.id) {
                return Err(TopologyError::DuplicateId(edge.id.0));
            }
            topology.insert_edge(edge)?;
        }
        for region in doc.regions {
            if topology.regions.contains_key(&region.id) {
                return Err(TopologyError::DuplicateId(region.id.0));
            }
            topology.insert_region(region);
        }
        Ok(topology)
    }
}

/// Plain serializable form of the whole model (persistence boundary).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyDoc {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub regions: Vec<Region>,
    #[serde(default)]
    pub next_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology_with_pair() -> (Topology, NodeId, NodeId) {
        let mut t = Topology::new();
        let a = t.new_node("core", DeviceKind::Router, Point::new(0.0, 0.0));
        let b = t.new_node("edge", DeviceKind::Switch, Point::new(200.0, 0.0));
        let (a_id, b_id) = (a.id, b.id);
        t.insert_node(a).unwrap();
        t.insert_node(b).unwrap();
        (t, a_id, b_id)
    }

    #[test]
    fn edge_updates_incidence_on_both_endpoints() {
        let (mut t, a, b) = topology_with_pair();
        let edge = t
            .new_edge(a, b, LinkKind::Ethernet, RouteStyle::Straight)
            .unwrap();
        let edge_id = edge.id;
        t.insert_edge(edge).unwrap();
        assert_eq!(t.degree(a), 1);
        assert_eq!(t.degree(b), 1);
        assert_eq!(t.neighbors(a), vec![b]);

        t.remove_edge(edge_id).unwrap();
        assert_eq!(t.degree(a), 0);
        assert_eq!(t.degree(b), 0);
    }

    #[test]
    fn self_loop_rejected_before_mutation() {
        let (mut t, a, _) = topology_with_pair();
        let err = t
            .new_edge(a, a, LinkKind::Ethernet, RouteStyle::Straight)
            .unwrap_err();
        assert_eq!(err, TopologyError::SelfLoop);
        assert_eq!(t.edge_count(), 0);
    }

    #[test]
    fn unknown_endpoint_rejected() {
        let (mut t, a, _) = topology_with_pair();
        let ghost = NodeId(9999);
        let err = t
            .new_edge(a, ghost, LinkKind::Ethernet, RouteStyle::Straight)
            .unwrap_err();
        assert_eq!(err, TopologyError::UnknownNode(ghost));
    }

    #[test]
    fn cascade_removal_takes_incident_edges() {
        let (mut t, a, b) = topology_with_pair();
        let c = t.new_node("dmz", DeviceKind::Firewall, Point::new(100.0, 100.0));
        let c_id = c.id;
        t.insert_node(c).unwrap();
        for (s, d) in [(a, b), (a, c_id)] {
            let e = t.new_edge(s, d, LinkKind::Ethernet, RouteStyle::Straight).unwrap();
            t.insert_edge(e).unwrap();
        }

        let (node, edges) = t.remove_node_cascade(a).unwrap();
        assert_eq!(node.id, a);
        assert_eq!(edges.len(), 2);
        assert_eq!(t.edge_count(), 0);
        assert_eq!(t.degree(b), 0);
        assert_eq!(t.degree(c_id), 0);
    }

    #[test]
    fn region_containment_is_derived() {
        let (mut t, a, b) = topology_with_pair();
        let region = t.new_region("lan", Rect::new(-20.0, -20.0, 120.0, 120.0));
        let region_id = region.id;
        t.insert_region(region);

        let inside = t.nodes_in_region(region_id);
        assert!(inside.contains(&a));
        assert!(!inside.contains(&b));
    }

    #[test]
    fn document_round_trip_preserves_structure() {
        let (mut t, a, b) = topology_with_pair();
        let edge = t
            .new_edge(a, b, LinkKind::Fiber, RouteStyle::Curved)
            .unwrap();
        t.insert_edge(edge).unwrap();
        t.set_node_property(a, "ip_address", Some("10.0.0.1".into()));
        t.set_node_property(a, "mtu", Some(PropertyValue::Int(9000)));
        t.set_node_property(a, "uplink", Some(PropertyValue::Bool(true)));
        t.set_displayed_property(a, "ip_address", true);
        let region = t.new_region("core", Rect::new(0.0, 0.0, 400.0, 300.0));
        t.insert_region(region);

        let json = serde_json::to_string(&t.to_doc()).unwrap();
        let doc: TopologyDoc = serde_json::from_str(&json).unwrap();
        let restored = Topology::from_doc(doc).unwrap();
        assert_eq!(restored, t);
    }

    #[test]
    fn document_with_dangling_edge_rejected() {
        let (t, a, _) = topology_with_pair();
        let mut doc = t.to_doc();
        doc.edges.push(Edge {
            id: EdgeId(77),
            source: a,
            target: NodeId(12345),
            style: RouteStyle::Straight,
            kind: LinkKind::Generic,
            properties: BTreeMap::new(),
        });
        assert!(Topology::from_doc(doc).is_err());
    }

    #[test]
    fn non_finite_geometry_rejected() {
        let mut t = Topology::new();
        let mut node = t.new_node("bad", DeviceKind::Generic, Point::new(0.0, 0.0));
        node.position.x = f32::NAN;
        assert!(t.insert_node(node).is_err());
    }
}
