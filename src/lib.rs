pub mod command;
pub mod config;
pub mod layout;
pub mod model;
pub mod modes;
pub mod routing;
pub mod selection;

pub use command::{Command, CommandHistory, ModelEvent};
pub use layout::{LayoutKind, compute_layout, layout_command};
pub use config::EditorConfig;
pub use model::{Topology, TopologyError};
pub use modes::{Editor, EditorError, Intent, Mode};
