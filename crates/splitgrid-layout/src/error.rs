// ABOUTME: Error type for rejected layout operations.
// ABOUTME: Distribution problems are reported through Fit instead and never abort an operation.

use crate::panel::PanelId;

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Index {index} out of range for {len} views")]
    InvalidIndex { index: usize, len: usize },

    #[error("No node at path {0:?}")]
    InvalidPath(Vec<usize>),

    #[error("Panel id already in use: {0}")]
    DuplicatePanelId(PanelId),

    #[error("Unknown panel: {0}")]
    UnknownPanel(PanelId),

    #[error("No component registered as {0:?}")]
    UnknownComponent(String),

    #[error("Minimum sizes exceed available space by {shortfall:.1}")]
    LayoutInfeasible { shortfall: f64 },

    #[error("Structural invariant violated: {0}")]
    StructuralInvariantViolation(String),

    #[error("Invalid serialized layout: {0}")]
    InvalidState(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
