// ABOUTME: Vertical stack of collapsible panes, each a header above a panel body.
// ABOUTME: A collapsed pane is pinned to its header height; expanding restores its last size.

use std::collections::HashSet;

use splitgrid_core::{Emitter, LayoutOptions, Orientation};

use crate::constraint::SizeConstraint;
use crate::distributor::{Fit, Slot};
use crate::error::LayoutError;
use crate::panel::{ComponentRegistry, Panel, PanelId, PanelOptions};
use crate::serialization::{self, SerializedPane, SerializedPaneview};
use crate::sizing::Sizing;
use crate::splitview::Splitview;

pub const DEFAULT_HEADER_SIZE: f64 = 22.0;

#[derive(Debug, Clone)]
pub struct PaneOptions {
    pub panel: PanelOptions,
    pub header_size: f64,
    pub expanded: bool,
}

impl PaneOptions {
    pub fn new(id: impl Into<PanelId>, component: impl Into<String>) -> Self {
        Self::from_panel(PanelOptions::new(id, component))
    }

    pub fn from_panel(panel: PanelOptions) -> Self {
        Self {
            panel,
            header_size: DEFAULT_HEADER_SIZE,
            expanded: true,
        }
    }

    pub fn with_header_size(self, header_size: f64) -> Self {
        Self {
            header_size,
            ..self
        }
    }

    /// Start with only the header showing
    pub fn collapsed(self) -> Self {
        Self {
            expanded: false,
            ..self
        }
    }
}

#[derive(Debug)]
pub struct Pane {
    panel: Panel,
    header_size: f64,
    expanded: bool,
    expanded_size: Option<f64>,
}

impl Pane {
    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut Panel {
        &mut self.panel
    }

    pub fn header_size(&self) -> f64 {
        self.header_size
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Size the pane had when it was last collapsed
    pub fn expanded_size(&self) -> Option<f64> {
        self.expanded_size
    }

    /// Header plus the body's height bounds, or just the header when collapsed
    fn bounds(&self) -> (f64, f64) {
        if !self.expanded {
            return (self.header_size, self.header_size);
        }
        let (minimum, maximum) = self.panel.constraints().along(Orientation::Vertical);
        (self.header_size + minimum, self.header_size + maximum)
    }

    fn size_constraint(&self, current: f64) -> SizeConstraint {
        let (minimum, maximum) = self.bounds();
        SizeConstraint::new(minimum, maximum, current)
    }
}

#[derive(Debug)]
pub struct PaneviewComponent {
    splitview: Splitview<Pane>,
    registry: ComponentRegistry,
    options: LayoutOptions,
    width: f64,
    height: f64,
    laid_out: bool,
    active: Option<PanelId>,
    on_did_layout_change: Emitter<()>,
}

impl PaneviewComponent {
    /// Panes always stack vertically; the orientation in `options` is ignored
    pub fn new(options: LayoutOptions, registry: ComponentRegistry) -> Self {
        Self {
            splitview: Splitview::new(Orientation::Vertical, options.proportional_layout),
            registry,
            options: LayoutOptions {
                orientation: Orientation::Vertical,
                ..options
            },
            width: 0.0,
            height: 0.0,
            laid_out: false,
            active: None,
            on_did_layout_change: Emitter::new(),
        }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn length(&self) -> usize {
        self.splitview.len()
    }

    pub fn minimum_size(&self) -> f64 {
        self.splitview.minimum_size()
    }

    pub fn maximum_size(&self) -> f64 {
        self.splitview.maximum_size()
    }

    /// Pane heights, headers included
    pub fn sizes(&self) -> Vec<f64> {
        self.splitview.sizes()
    }

    pub fn on_did_layout_change(&self) -> &Emitter<()> {
        &self.on_did_layout_change
    }

    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    fn index_of(&self, id: &PanelId) -> Result<usize, LayoutError> {
        self.splitview
            .views()
            .iter()
            .position(|pane| pane.panel.id() == id)
            .ok_or_else(|| LayoutError::UnknownPanel(id.clone()))
    }

    pub fn get_pane(&self, id: &PanelId) -> Option<&Pane> {
        self.splitview.views().iter().find(|pane| pane.panel.id() == id)
    }

    pub fn get_panel(&self, id: &PanelId) -> Option<&Panel> {
        self.get_pane(id).map(Pane::panel)
    }

    pub fn get_panel_mut(&mut self, id: &PanelId) -> Option<&mut Panel> {
        let index = self.index_of(id).ok()?;
        self.splitview.view_mut(index).map(Pane::panel_mut)
    }

    pub fn panes(&self) -> &[Pane] {
        self.splitview.views()
    }

    pub fn active_panel(&self) -> Option<&PanelId> {
        self.active.as_ref()
    }

    /// Create a pane and insert it at `index` (appended when `None`).
    /// Panes cannot start hidden, so `Sizing::Invisible` is rejected.
    pub fn add_panel(&mut self, options: PaneOptions, index: Option<usize>, sizing: Sizing) -> Result<usize, LayoutError> {
        if self.get_pane(&options.panel.id).is_some() {
            return Err(LayoutError::DuplicatePanelId(options.panel.id));
        }
        let index = index.unwrap_or(self.splitview.len());
        let len = self.splitview.len();
        if index > len {
            return Err(LayoutError::InvalidIndex { index, len });
        }
        if matches!(sizing, Sizing::Invisible) {
            return Err(LayoutError::InvalidState(format!(
                "pane {} cannot be added hidden",
                options.panel.id
            )));
        }
        let header_size = serialization::check_size(options.header_size)?;

        let content = self.registry.create(&options.panel.component)?;
        let mut panel = Panel::new(options.panel, content);
        panel.set_visible(options.expanded);
        panel.update_parent(None, false);
        let pane = Pane {
            panel,
            header_size,
            expanded: options.expanded,
            expanded_size: None,
        };
        let constraint = pane.size_constraint(0.0);
        let priority = pane.panel.priority();

        let fit = self
            .splitview
            .add_view(pane, constraint, priority, index, sizing)?;
        if let Err(err) = fit.check() {
            tracing::warn!("Pane added without enough room: {}", err);
        }
        self.layout_panes();
        self.on_did_layout_change.fire(());
        Ok(index)
    }

    pub fn remove_panel(&mut self, id: &PanelId, sizing: Sizing) -> Result<(), LayoutError> {
        let index = self.index_of(id)?;
        let (mut pane, _) = self.splitview.remove_view(index, sizing)?;
        pane.panel.dispose();
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        self.layout_panes();
        self.on_did_layout_change.fire(());
        Ok(())
    }

    pub fn move_panel(&mut self, from: usize, to: usize) -> Result<(), LayoutError> {
        self.splitview.move_view(from, to)?;
        self.layout_panes();
        self.on_did_layout_change.fire(());
        Ok(())
    }

    pub fn is_expanded(&self, id: &PanelId) -> Result<bool, LayoutError> {
        let index = self.index_of(id)?;
        Ok(self.splitview.views()[index].expanded)
    }

    /// Collapse a pane to its header, or expand it back to the size it had
    pub fn set_expanded(&mut self, id: &PanelId, expanded: bool) -> Result<Fit, LayoutError> {
        let index = self.index_of(id)?;
        let current = self.splitview.view_size(index).unwrap_or(0.0);
        let share = self.splitview.size() / self.splitview.len() as f64;
        let Some(pane) = self.splitview.view_mut(index) else {
            return Err(LayoutError::UnknownPanel(id.clone()));
        };
        if pane.expanded == expanded {
            return Ok(Fit::Exact);
        }

        let target = if expanded {
            pane.expanded_size.unwrap_or(share)
        } else {
            pane.expanded_size = Some(current);
            pane.header_size
        };
        pane.expanded = expanded;
        pane.panel.set_visible(expanded);
        let (minimum, maximum) = pane.bounds();

        let fit = self.splitview.set_view_bounds(index, minimum, maximum, target)?;
        tracing::debug!("Pane {} expanded={} size={:.1}", id, expanded, target);
        self.layout_panes();
        self.on_did_layout_change.fire(());
        Ok(fit)
    }

    pub fn toggle_expanded(&mut self, id: &PanelId) -> Result<bool, LayoutError> {
        let expanded = !self.is_expanded(id)?;
        let _ = self.set_expanded(id, expanded)?;
        Ok(expanded)
    }

    pub fn layout(&mut self, width: f64, height: f64) -> Fit {
        self.width = width;
        self.height = height;
        self.laid_out = true;
        let fit = self.splitview.layout(height, width);
        self.layout_panes();
        self.on_did_layout_change.fire(());
        fit
    }

    pub fn resize_to_fit(&mut self) -> Fit {
        self.layout(self.width, self.height)
    }

    /// Follow the host container; ignored when auto-resizing is disabled
    pub fn container_resized(&mut self, width: f64, height: f64) -> bool {
        if self.options.disable_auto_resizing {
            return false;
        }
        let _ = self.layout(width, height);
        true
    }

    /// Bodies of expanded panes get what is left below their header
    fn layout_panes(&mut self) {
        let width = self.splitview.orthogonal_size();
        let sizes = self.splitview.sizes();
        for (index, size) in sizes.into_iter().enumerate() {
            if let Some(pane) = self.splitview.view_mut(index) {
                if pane.expanded {
                    let body = (size - pane.header_size).max(0.0);
                    pane.panel.layout(width, body);
                }
            }
        }
    }

    pub fn set_active(&mut self, id: &PanelId) -> Result<(), LayoutError> {
        let index = self.index_of(id)?;
        if self.active.as_ref() == Some(id) {
            return Ok(());
        }
        if let Some(previous) = self.active.take() {
            if let Some(panel) = self.get_panel_mut(&previous) {
                panel.blur();
                panel.update_parent(None, false);
            }
        }
        if let Some(pane) = self.splitview.view_mut(index) {
            pane.panel.update_parent(None, true);
        }
        self.active = Some(id.clone());
        Ok(())
    }

    pub fn focus(&mut self) {
        let Some(active) = self.active.clone() else {
            return;
        };
        if let Some(panel) = self.get_panel_mut(&active) {
            panel.focus();
        }
    }

    pub fn to_json(&self) -> SerializedPaneview {
        SerializedPaneview {
            size: self.splitview.size(),
            views: self
                .splitview
                .views()
                .iter()
                .zip(self.splitview.slots())
                .map(|(pane, slot)| SerializedPane {
                    size: slot.size(),
                    data: pane.panel.to_json(),
                    expanded: pane.expanded,
                    header_size: pane.header_size,
                    expanded_size: pane.expanded_size,
                })
                .collect(),
            active_view: self.active.clone(),
        }
    }

    /// Replace every pane with the serialized ones; on error nothing changes
    pub fn from_json(&mut self, data: &SerializedPaneview) -> Result<(), LayoutError> {
        serialization::check_size(data.size)?;
        let mut seen = HashSet::new();
        let mut entries: Vec<(Pane, Slot)> = Vec::with_capacity(data.views.len());
        for view in &data.views {
            let size = serialization::check_size(view.size)?;
            let header_size = serialization::check_size(view.header_size)?;
            if let Some(expanded_size) = view.expanded_size {
                serialization::check_size(expanded_size)?;
            }
            if !seen.insert(view.data.id.clone()) {
                return Err(LayoutError::DuplicatePanelId(view.data.id.clone()));
            }
            let mut panel = serialization::restore_panel(&view.data, &self.registry)?;
            panel.set_visible(view.expanded);
            let pane = Pane {
                panel,
                header_size,
                expanded: view.expanded,
                expanded_size: view.expanded_size,
            };
            let slot = Slot::new(pane.size_constraint(size), pane.panel.priority());
            entries.push((pane, slot));
        }

        let restored = Splitview::from_views(Orientation::Vertical, self.options.proportional_layout, entries);
        let previous = std::mem::replace(&mut self.splitview, restored);
        drop(previous);
        self.active = None;

        let (width, height) = if self.laid_out {
            (self.width, self.height)
        } else {
            (0.0, data.size)
        };
        let _ = self.layout(width, height);

        if let Some(active) = &data.active_view {
            if self.get_pane(active).is_some() {
                self.set_active(active)?;
            }
        }
        tracing::debug!("Restored paneview with {} panes", self.length());
        Ok(())
    }

    pub fn clear(&mut self) {
        for (mut pane, _) in self.splitview.drain() {
            pane.panel.dispose();
        }
        self.active = None;
        self.on_did_layout_change.fire(());
    }
}
