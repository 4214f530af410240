//! Agent motion: wandering, docking against screen edges, drag handling.
//!
//! ```text
//! Idle -> Walking -> Idle
//! Idle | Walking | Interacting -> Docked -> Idle | Interacting
//! Idle | Walking -> Interacting -> Idle
//! ```

mod controller;
mod docking;

use serde::{Deserialize, Serialize};

pub use controller::{pick_walk_target, MotionController, MotionEffect};
pub use docking::{nearest_edge, push_back, snap_origin};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionState {
    Idle,
    Walking,
    /// A message with buttons is waiting for the user.
    Interacting,
    Docked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DockEdge {
    #[default]
    None,
    Left,
    Right,
    Top,
    Bottom,
}

impl DockEdge {
    pub fn is_none(self) -> bool {
        self == DockEdge::None
    }
}
