// ABOUTME: Panel layout engine: constraint distribution, splitviews and grid trees.
// ABOUTME: Exposes the low-level building blocks and the host-facing components.

pub mod api;
pub mod constraint;
pub mod distributor;
mod error;
pub mod gridview;
mod gridview_component;
pub mod panel;
mod paneview_component;
pub mod serialization;
mod sizing;
pub mod splitview;
mod splitview_component;

pub use api::{ActiveChange, DimensionsChange, FocusChange, PanelApi, State, VisibilityChange};
pub use constraint::{LayoutPriority, SizeConstraint};
pub use distributor::{Fit, Slot};
pub use error::LayoutError;
pub use gridview::{Direction, Gridview, NodeId, Rect};
pub use gridview_component::{GridEvent, GridviewComponent, Position};
pub use panel::{
    ComponentRegistry, EmptyContent, Panel, PanelConstraints, PanelContent, PanelId, PanelOptions,
};
pub use paneview_component::{Pane, PaneOptions, PaneviewComponent, DEFAULT_HEADER_SIZE};
pub use serialization::{
    PanelState, SerializedGridview, SerializedNode, SerializedPane, SerializedPaneview,
    SerializedSplitview, SerializedView,
};
pub use sizing::Sizing;
pub use splitview::{Splitview, SplitviewEvent};
pub use splitview_component::SplitviewComponent;

pub use splitgrid_core::{Emitter, LayoutOptions, Orientation, Parameters, Subscription};
