// ABOUTME: Host-facing two-dimensional panel container built on the grid tree.
// ABOUTME: Adds placement by reference panel, focus tracking and grid change events.

use std::collections::HashMap;

use splitgrid_core::{Emitter, LayoutOptions, Orientation};

use crate::distributor::Fit;
use crate::error::LayoutError;
use crate::gridview::{Direction, Gridview, Rect};
use crate::panel::{ComponentRegistry, Panel, PanelId, PanelOptions};
use crate::serialization::SerializedGridview;
use crate::sizing::Sizing;

/// Where a new panel goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    /// Child-index path; a leaf in the parent position is split
    Path(Vec<usize>),
    /// Next to an existing panel
    Relative {
        reference: PanelId,
        direction: Direction,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    Added(PanelId),
    Removed(PanelId),
    /// A panel changed place; sent instead of a remove and an add
    Moved(PanelId),
    Activated(PanelId),
    VisibilityChanged { id: PanelId, visible: bool },
    Restored,
    Cleared,
}

#[derive(Debug)]
pub struct GridviewComponent {
    grid: Gridview,
    registry: ComponentRegistry,
    options: LayoutOptions,
    active: Option<PanelId>,
    on_did_layout_change: Emitter<()>,
    on_grid_event: Emitter<GridEvent>,
}

impl GridviewComponent {
    pub fn new(options: LayoutOptions, registry: ComponentRegistry) -> Self {
        Self {
            grid: Gridview::new(options.orientation, options.proportional_layout),
            registry,
            options,
            active: None,
            on_did_layout_change: Emitter::new(),
            on_grid_event: Emitter::new(),
        }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn grid(&self) -> &Gridview {
        &self.grid
    }

    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    pub fn on_did_layout_change(&self) -> &Emitter<()> {
        &self.on_did_layout_change
    }

    pub fn on_grid_event(&self) -> &Emitter<GridEvent> {
        &self.on_grid_event
    }

    pub fn orientation(&self) -> Orientation {
        self.grid.orientation()
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.grid.set_orientation(orientation);
        self.options.orientation = orientation;
        self.on_did_layout_change.fire(());
    }

    pub fn width(&self) -> f64 {
        self.grid.width()
    }

    pub fn height(&self) -> f64 {
        self.grid.height()
    }

    pub fn minimum_width(&self) -> f64 {
        self.grid.minimum_width()
    }

    pub fn maximum_width(&self) -> f64 {
        self.grid.maximum_width()
    }

    pub fn minimum_height(&self) -> f64 {
        self.grid.minimum_height()
    }

    pub fn maximum_height(&self) -> f64 {
        self.grid.maximum_height()
    }

    /// Number of panels
    pub fn total_panels(&self) -> usize {
        self.grid.len()
    }

    pub fn get_panel(&self, id: &PanelId) -> Option<&Panel> {
        self.grid.panel(id)
    }

    pub fn get_panel_mut(&mut self, id: &PanelId) -> Option<&mut Panel> {
        self.grid.panel_mut(id)
    }

    pub fn panels(&self) -> Vec<&Panel> {
        self.grid.panels()
    }

    pub fn panel_rects(&self) -> HashMap<PanelId, Rect> {
        self.grid.panel_rects()
    }

    pub fn active_panel(&self) -> Option<&PanelId> {
        self.active.as_ref()
    }

    fn resolve(&self, position: Option<&Position>) -> Result<Vec<usize>, LayoutError> {
        match position {
            None => {
                let root = self.grid.root();
                let len = self.grid.node(root).and_then(|n| n.as_branch()).map_or(0, |b| b.len());
                Ok(vec![len])
            }
            Some(Position::Path(path)) => Ok(path.clone()),
            Some(Position::Relative {
                reference,
                direction,
            }) => self.grid.location_of(reference, *direction),
        }
    }

    /// Create a panel, place it and make it the active one
    pub fn add_panel(&mut self, options: PanelOptions, position: Option<Position>, sizing: Sizing) -> Result<(), LayoutError> {
        if self.grid.contains(&options.id) {
            return Err(LayoutError::DuplicatePanelId(options.id));
        }
        let path = self.resolve(position.as_ref())?;
        let content = self.registry.create(&options.component)?;
        let id = options.id.clone();

        self.grid.add_panel(Panel::new(options, content), &path, sizing)?;
        tracing::debug!("Added panel {} at {:?}", id, self.grid.path_of_panel(&id)?);
        self.on_grid_event.fire(GridEvent::Added(id.clone()));
        self.set_active(&id)?;
        self.on_did_layout_change.fire(());
        Ok(())
    }

    /// Remove and dispose a panel; focus moves to a neighbour if it was active
    pub fn remove_panel(&mut self, id: &PanelId, sizing: Sizing) -> Result<(), LayoutError> {
        let order = self.grid.panel_ids();
        let position = order
            .iter()
            .position(|p| p == id)
            .ok_or_else(|| LayoutError::UnknownPanel(id.clone()))?;
        let neighbour = order
            .get(position + 1)
            .or_else(|| position.checked_sub(1).and_then(|i| order.get(i)))
            .cloned();

        let mut panel = self.grid.remove_panel_by_id(id, sizing)?;
        panel.dispose();
        self.on_grid_event.fire(GridEvent::Removed(id.clone()));

        if self.active.as_ref() == Some(id) {
            self.active = None;
            if let Some(next) = neighbour {
                self.set_active(&next)?;
            }
        }
        self.on_did_layout_change.fire(());
        Ok(())
    }

    /// Move a panel next to `reference` as one change; moving a panel next to
    /// itself changes nothing and sends nothing
    pub fn move_panel(&mut self, id: &PanelId, reference: &PanelId, direction: Direction, sizing: Sizing) -> Result<(), LayoutError> {
        if self.grid.move_panel(id, reference, direction, sizing)?.is_none() {
            return Ok(());
        }
        self.on_grid_event.fire(GridEvent::Moved(id.clone()));
        self.on_did_layout_change.fire(());
        Ok(())
    }

    /// Move a panel to `path`, resolved after the panel has been taken out.
    /// A rejected path leaves the layout as it was.
    pub fn move_panel_to(&mut self, id: &PanelId, path: &[usize], sizing: Sizing) -> Result<(), LayoutError> {
        self.grid.move_panel_to(id, path, sizing)?;
        self.on_grid_event.fire(GridEvent::Moved(id.clone()));
        self.on_did_layout_change.fire(());
        Ok(())
    }

    pub fn is_visible(&self, id: &PanelId) -> Result<bool, LayoutError> {
        self.grid.is_visible(id)
    }

    pub fn set_visible(&mut self, id: &PanelId, visible: bool) -> Result<(), LayoutError> {
        if self.grid.is_visible(id)? == visible {
            return Ok(());
        }
        let fit = self.grid.set_visible(id, visible)?;
        if let Err(err) = fit.check() {
            tracing::warn!("Grid does not fit after visibility change: {}", err);
        }
        self.on_grid_event.fire(GridEvent::VisibilityChanged {
            id: id.clone(),
            visible,
        });
        self.on_did_layout_change.fire(());
        Ok(())
    }

    /// Flip a panel's visibility, returning the new state
    pub fn toggle_visibility(&mut self, id: &PanelId) -> Result<bool, LayoutError> {
        let visible = !self.grid.is_visible(id)?;
        self.set_visible(id, visible)?;
        Ok(visible)
    }

    pub fn layout(&mut self, width: f64, height: f64) -> Fit {
        let fit = self.grid.layout(width, height);
        self.on_did_layout_change.fire(());
        fit
    }

    pub fn resize_to_fit(&mut self) -> Fit {
        self.layout(self.grid.width(), self.grid.height())
    }

    /// Follow the host container; ignored when auto-resizing is disabled
    pub fn container_resized(&mut self, width: f64, height: f64) -> bool {
        if self.options.disable_auto_resizing {
            return false;
        }
        let _ = self.layout(width, height);
        true
    }

    pub fn set_active(&mut self, id: &PanelId) -> Result<(), LayoutError> {
        if !self.grid.contains(id) {
            return Err(LayoutError::UnknownPanel(id.clone()));
        }
        if self.active.as_ref() == Some(id) {
            return Ok(());
        }
        if let Some(previous) = self.active.take() {
            if let Some(panel) = self.grid.panel_mut(&previous) {
                let parent = panel.parent();
                panel.blur();
                panel.update_parent(parent, false);
            }
        }
        if let Some(panel) = self.grid.panel_mut(id) {
            let parent = panel.parent();
            panel.update_parent(parent, true);
        }
        self.active = Some(id.clone());
        self.on_grid_event.fire(GridEvent::Activated(id.clone()));
        Ok(())
    }

    /// Focus the active panel
    pub fn focus(&mut self) {
        let Some(active) = self.active.clone() else {
            return;
        };
        if let Some(panel) = self.grid.panel_mut(&active) {
            panel.focus();
        }
    }

    /// Start dragging sash `sash` of the branch at `branch_path`
    pub fn begin_drag(&mut self, branch_path: &[usize], sash: usize, position: f64) -> Result<(), LayoutError> {
        self.grid.begin_drag(branch_path, sash, position)
    }

    pub fn drag_to(&mut self, position: f64) -> f64 {
        self.grid.drag_to(position)
    }

    pub fn flush_frame(&mut self) -> bool {
        let flushed = self.grid.flush_frame();
        if flushed {
            self.on_did_layout_change.fire(());
        }
        flushed
    }

    pub fn end_drag(&mut self) -> bool {
        let ended = self.grid.end_drag();
        if ended {
            self.on_did_layout_change.fire(());
        }
        ended
    }

    pub fn cancel_drag(&mut self) -> bool {
        self.grid.cancel_drag()
    }

    pub fn to_json(&self) -> SerializedGridview {
        SerializedGridview {
            active_panel: self.active.clone(),
            ..self.grid.to_serialized()
        }
    }

    /// Replace the whole layout; on error the current one is untouched
    pub fn from_json(&mut self, data: &SerializedGridview) -> Result<(), LayoutError> {
        let grid = Gridview::from_serialized(data, &self.registry, self.options.proportional_layout)?;
        let previous = std::mem::replace(&mut self.grid, grid);
        drop(previous);
        self.options.orientation = data.orientation;
        self.active = None;

        self.on_grid_event.fire(GridEvent::Restored);
        if let Some(active) = &data.active_panel {
            if self.grid.contains(active) {
                self.set_active(active)?;
            }
        }
        self.on_did_layout_change.fire(());
        Ok(())
    }

    /// Dispose every panel, keeping dimensions and orientation
    pub fn clear(&mut self) {
        for mut panel in self.grid.clear() {
            panel.dispose();
        }
        self.active = None;
        self.on_grid_event.fire(GridEvent::Cleared);
        self.on_did_layout_change.fire(());
    }
}
