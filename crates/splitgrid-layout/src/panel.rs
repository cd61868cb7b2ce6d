// ABOUTME: Panels: identity, constraints and the host-provided content they render.
// ABOUTME: Content is a capability trait so the engine never depends on a render technology.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use splitgrid_core::{Orientation, Parameters};

use crate::api::PanelApi;
use crate::constraint::{LayoutPriority, SizeConstraint};
use crate::error::LayoutError;
use crate::gridview::NodeId;
use crate::serialization::PanelState;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelId(String);

impl PanelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PanelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PanelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Width and height bounds; a missing maximum means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PanelConstraints {
    pub minimum_width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_width: Option<f64>,
    pub minimum_height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_height: Option<f64>,
}

impl PanelConstraints {
    /// Same bounds on both axes
    pub fn uniform(minimum: f64, maximum: Option<f64>) -> Self {
        Self {
            minimum_width: minimum,
            maximum_width: maximum,
            minimum_height: minimum,
            maximum_height: maximum,
        }
    }

    /// (minimum, maximum) along the axis of `orientation`
    pub fn along(&self, orientation: Orientation) -> (f64, f64) {
        match orientation {
            Orientation::Horizontal => (
                self.minimum_width,
                self.maximum_width.unwrap_or(f64::INFINITY),
            ),
            Orientation::Vertical => (
                self.minimum_height,
                self.maximum_height.unwrap_or(f64::INFINITY),
            ),
        }
    }

    pub fn size_constraint(&self, orientation: Orientation, current: f64) -> SizeConstraint {
        let (minimum, maximum) = self.along(orientation);
        SizeConstraint::new(minimum, maximum, current)
    }

    pub fn is_unbounded(&self) -> bool {
        *self == Self::default()
    }
}

/// What a host implements to put something inside a panel
pub trait PanelContent {
    fn init(&mut self, _params: &Parameters) {}

    fn update(&mut self, _params: &Parameters) {}

    fn layout(&mut self, _width: f64, _height: f64) {}

    fn focus(&mut self) {}

    /// Content-specific data stored with the panel
    fn to_json(&self) -> Option<Value> {
        None
    }

    /// Receives what `to_json` produced when a layout is restored
    fn restore(&mut self, _view: &Value) {}

    fn dispose(&mut self) {}
}

/// Content that renders nothing; useful for geometry-only hosts
#[derive(Debug, Default)]
pub struct EmptyContent;

impl PanelContent for EmptyContent {}

type Factory = Box<dyn Fn() -> Box<dyn PanelContent>>;

/// Maps component names to content factories
#[derive(Default)]
pub struct ComponentRegistry {
    factories: HashMap<String, Factory>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Box<dyn PanelContent> + 'static,
    ) {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn PanelContent>, LayoutError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| LayoutError::UnknownComponent(name.to_string()))
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ComponentRegistry")
            .field("components", &names)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PanelOptions {
    pub id: PanelId,
    pub component: String,
    pub params: Parameters,
    pub constraints: PanelConstraints,
    pub priority: LayoutPriority,
}

impl PanelOptions {
    pub fn new(id: impl Into<PanelId>, component: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            component: component.into(),
            ..Self::default()
        }
    }

    pub fn with_params(self, params: Parameters) -> Self {
        Self { params, ..self }
    }

    pub fn with_constraints(self, constraints: PanelConstraints) -> Self {
        Self {
            constraints,
            ..self
        }
    }

    pub fn with_priority(self, priority: LayoutPriority) -> Self {
        Self { priority, ..self }
    }
}

pub struct Panel {
    id: PanelId,
    component: String,
    params: Parameters,
    constraints: PanelConstraints,
    priority: LayoutPriority,
    width: f64,
    height: f64,
    visible: bool,
    active: bool,
    parent: Option<NodeId>,
    api: PanelApi,
    content: Box<dyn PanelContent>,
    disposed: bool,
}

impl Panel {
    pub fn new(options: PanelOptions, mut content: Box<dyn PanelContent>) -> Self {
        content.init(&options.params);
        Self {
            id: options.id,
            component: options.component,
            params: options.params,
            constraints: options.constraints,
            priority: options.priority,
            width: 0.0,
            height: 0.0,
            visible: true,
            active: false,
            parent: None,
            api: PanelApi::new(),
            content,
            disposed: false,
        }
    }

    pub fn id(&self) -> &PanelId {
        &self.id
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn constraints(&self) -> PanelConstraints {
        self.constraints
    }

    pub fn priority(&self) -> LayoutPriority {
        self.priority
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the owning component treats this panel as the active one,
    /// independent of visibility
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Branch the panel currently sits in, when it lives in a grid
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn api(&self) -> &PanelApi {
        &self.api
    }

    pub fn api_mut(&mut self) -> &mut PanelApi {
        &mut self.api
    }

    pub fn content(&self) -> &dyn PanelContent {
        self.content.as_ref()
    }

    pub fn layout(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.api.fire_dimensions(width, height);
        self.content.layout(width, height);
    }

    pub fn focus(&mut self) {
        self.api.fire_focus(true);
        self.content.focus();
    }

    pub fn blur(&mut self) {
        if self.api.is_focused() {
            self.api.fire_focus(false);
        }
    }

    /// Merge `patch` over the current params and hand the result to the content
    pub fn update(&mut self, patch: &Parameters) {
        self.params = self.params.merged(patch);
        self.content.update(&self.params);
    }

    pub fn to_json(&self) -> PanelState {
        let state = self.api.state();
        PanelState {
            id: self.id.clone(),
            component_name: self.component.clone(),
            params: self.params.clone(),
            state: (!state.is_empty()).then(|| state.clone()),
            constraints: self.constraints,
            priority: self.priority,
            view: self.content.to_json(),
        }
    }

    pub fn update_parent(&mut self, parent: Option<NodeId>, is_active: bool) {
        self.parent = parent;
        self.active = is_active;
        self.api.fire_active(is_active && self.visible);
        self.api.fire_visibility(self.visible);
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.api.fire_visibility(visible);
            if self.active {
                self.api.fire_active(visible);
            }
        }
    }

    pub(crate) fn restore_view(&mut self, view: &Value) {
        self.content.restore(view);
    }

    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.content.dispose();
        self.api.dispose();
    }
}

impl Drop for Panel {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panel")
            .field("id", &self.id)
            .field("component", &self.component)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("visible", &self.visible)
            .field("active", &self.active)
            .finish()
    }
}
