// ABOUTME: Per-panel event channels and key/value state exposed to panel content.
// ABOUTME: Dimension, focus, active and visibility channels replay their last value.

use serde_json::{Map, Value};
use splitgrid_core::Emitter;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionsChange {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusChange {
    pub is_focused: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveChange {
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityChange {
    pub is_visible: bool,
}

/// Free-form state a panel keeps across serialization
pub type State = Map<String, Value>;

#[derive(Debug)]
pub struct PanelApi {
    state: State,
    on_did_dimensions_change: Emitter<DimensionsChange>,
    on_did_focus_change: Emitter<FocusChange>,
    on_did_state_change: Emitter<()>,
    on_did_active_change: Emitter<ActiveChange>,
    on_did_visibility_change: Emitter<VisibilityChange>,
}

impl PanelApi {
    pub fn new() -> Self {
        Self {
            state: State::new(),
            on_did_dimensions_change: Emitter::with_last_value(),
            on_did_focus_change: Emitter::with_last_value(),
            on_did_state_change: Emitter::new(),
            on_did_active_change: Emitter::with_last_value(),
            on_did_visibility_change: Emitter::with_last_value(),
        }
    }

    pub fn on_did_dimensions_change(&self) -> &Emitter<DimensionsChange> {
        &self.on_did_dimensions_change
    }

    pub fn on_did_focus_change(&self) -> &Emitter<FocusChange> {
        &self.on_did_focus_change
    }

    pub fn on_did_state_change(&self) -> &Emitter<()> {
        &self.on_did_state_change
    }

    pub fn on_did_active_change(&self) -> &Emitter<ActiveChange> {
        &self.on_did_active_change
    }

    pub fn on_did_visibility_change(&self) -> &Emitter<VisibilityChange> {
        &self.on_did_visibility_change
    }

    pub fn is_focused(&self) -> bool {
        self.on_did_focus_change
            .last_value()
            .is_some_and(|change| change.is_focused)
    }

    pub fn is_active(&self) -> bool {
        self.on_did_active_change
            .last_value()
            .is_some_and(|change| change.is_active)
    }

    /// Last dimensions the panel was laid out at
    pub fn dimensions(&self) -> Option<DimensionsChange> {
        self.on_did_dimensions_change.last_value()
    }

    /// Replace the whole state
    pub fn set_state(&mut self, state: State) {
        self.state = state;
        self.on_did_state_change.fire(());
    }

    pub fn set_state_key(&mut self, key: impl Into<String>, value: Value) {
        self.state.insert(key.into(), value);
        self.on_did_state_change.fire(());
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_key(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }

    pub(crate) fn fire_dimensions(&self, width: f64, height: f64) {
        self.on_did_dimensions_change
            .fire(DimensionsChange { width, height });
    }

    pub(crate) fn fire_focus(&self, is_focused: bool) {
        self.on_did_focus_change.fire(FocusChange { is_focused });
    }

    pub(crate) fn fire_active(&self, is_active: bool) {
        self.on_did_active_change.fire(ActiveChange { is_active });
    }

    pub(crate) fn fire_visibility(&self, is_visible: bool) {
        self.on_did_visibility_change
            .fire(VisibilityChange { is_visible });
    }

    pub fn dispose(&self) {
        self.on_did_dimensions_change.dispose();
        self.on_did_focus_change.dispose();
        self.on_did_state_change.dispose();
        self.on_did_active_change.dispose();
        self.on_did_visibility_change.dispose();
    }
}

impl Default for PanelApi {
    fn default() -> Self {
        Self::new()
    }
}
