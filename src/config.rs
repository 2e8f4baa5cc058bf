use serde::{Deserialize, Serialize};

/// Spacing and sizing knobs for grid arrangement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Cell spacing as a multiple of the average node dimension.
    pub spacing_factor: f32,
    /// Lower bound on cell spacing regardless of node sizes.
    pub min_spacing: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            spacing_factor: 1.5,
            min_spacing: 80.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircleConfig {
    /// Radius floor so small selections stay readable.
    pub min_radius: f32,
}

impl Default for CircleConfig {
    fn default() -> Self {
        Self { min_radius: 120.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributeConfig {
    /// Smallest gap allowed between bounding boxes when spacing evenly.
    pub min_gap: f32,
}

impl Default for DistributeConfig {
    fn default() -> Self {
        Self { min_gap: 20.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    /// Horizontal distance from the backbone line to each flanking column.
    pub lane_offset: f32,
    /// Vertical spacing between rows along the backbone.
    pub row_spacing: f32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            lane_offset: 140.0,
            row_spacing: 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Vertical distance between a parent and its children.
    pub level_spacing: f32,
    /// Base horizontal spread for siblings.
    pub sibling_spacing: f32,
    /// Extra spread added per level of depth.
    pub depth_spread: f32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            level_spacing: 110.0,
            sibling_spacing: 90.0,
            depth_spread: 30.0,
        }
    }
}

/// Connectivity-layer assignment heuristics.
///
/// The ratio and cap reproduce observed editor behavior; they are policy
/// knobs, not invariants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerConfig {
    /// A node joins layer 0 when its degree is at least this fraction of
    /// the most-connected node's degree.
    pub affinity_ratio: f32,
    /// Hard cap on breadth-first layers; unassigned nodes sweep into a
    /// final layer.
    pub max_layers: usize,
    /// Vertical offset between consecutive layers.
    pub layer_spacing: f32,
    /// Horizontal spacing within a layer row.
    pub node_spacing: f32,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            affinity_ratio: 0.8,
            max_layers: 5,
            layer_spacing: 130.0,
            node_spacing: 110.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapConfig {
    /// Nodes within this distance on one axis fall into the same row or
    /// column band.
    pub tolerance: f32,
    /// Uniform horizontal gap applied when re-spacing a row.
    pub row_gap: f32,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            tolerance: 30.0,
            row_gap: 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceConfig {
    pub iterations: usize,
    /// Temperature multiplier applied each iteration.
    pub cooling: f32,
    /// Initial per-iteration displacement cap.
    pub initial_temperature: f32,
    /// Distance floor guarding the 1/d² repulsion term.
    pub min_distance: f32,
    /// Ideal edge length for the attraction term.
    pub ideal_distance: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            iterations: 50,
            cooling: 0.95,
            initial_temperature: 100.0,
            min_distance: 0.1,
            ideal_distance: 120.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Property key consulted for explicit zone membership.
    pub zone_key: String,
    /// Spacing between members inside a zone cluster.
    pub member_spacing: f32,
    /// Spacing between zone clusters.
    pub zone_spacing: f32,
    /// Ring step for concentric templates.
    pub ring_spacing: f32,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            zone_key: "zone".to_string(),
            member_spacing: 90.0,
            zone_spacing: 260.0,
            ring_spacing: 170.0,
        }
    }
}

/// Aggregate layout tuning, one sub-config per algorithm family.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub grid: GridConfig,
    pub circle: CircleConfig,
    pub distribute: DistributeConfig,
    pub bus: BusConfig,
    pub tree: TreeConfig,
    pub layers: LayerConfig,
    pub snap: SnapConfig,
    pub force: ForceConfig,
    pub templates: TemplateConfig,
}

/// Interaction-level policy: history depth, drag thresholds, region minimums.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// Maximum retained undo steps; the oldest entry is evicted past this.
    pub history_capacity: usize,
    /// A drag shorter than this on both axes produces no move command.
    pub drag_epsilon: f32,
    /// Regions smaller than this on either axis are rejected as degenerate.
    pub min_region_size: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            history_capacity: 100,
            drag_epsilon: 0.5,
            min_region_size: 16.0,
        }
    }
}

/// Top-level configuration for the editor core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorConfig {
    pub layout: LayoutConfig,
    pub interaction: InteractionConfig,
}
