// ABOUTME: Axis orientation shared by splitviews and grid branches.
// ABOUTME: Maps between (width, height) pairs and (size, orthogonal size) pairs.

use serde::{Deserialize, Serialize};

/// Direction along which a splitview lays out its panels.
///
/// `Horizontal` places panels left to right, so a panel's size is its width.
/// `Vertical` stacks them top to bottom, so a panel's size is its height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn orthogonal(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }

    /// Split a (width, height) pair into (size, orthogonal size) for this axis
    pub fn split(self, width: f64, height: f64) -> (f64, f64) {
        match self {
            Orientation::Horizontal => (width, height),
            Orientation::Vertical => (height, width),
        }
    }

    /// Inverse of [`Orientation::split`]
    pub fn join(self, size: f64, orthogonal_size: f64) -> (f64, f64) {
        match self {
            Orientation::Horizontal => (size, orthogonal_size),
            Orientation::Vertical => (orthogonal_size, size),
        }
    }
}
