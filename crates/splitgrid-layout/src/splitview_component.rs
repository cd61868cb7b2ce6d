// ABOUTME: Host-facing one-dimensional panel container built on a splitview.
// ABOUTME: Creates panels through the registry, lays them out and persists them.

use std::collections::HashSet;

use splitgrid_core::{Emitter, LayoutOptions, Orientation};

use crate::distributor::{Fit, Slot};
use crate::error::LayoutError;
use crate::panel::{ComponentRegistry, Panel, PanelId, PanelOptions};
use crate::serialization::{self, SerializedSplitview, SerializedView};
use crate::sizing::Sizing;
use crate::splitview::Splitview;

#[derive(Debug)]
pub struct SplitviewComponent {
    splitview: Splitview<Panel>,
    registry: ComponentRegistry,
    options: LayoutOptions,
    width: f64,
    height: f64,
    laid_out: bool,
    active: Option<PanelId>,
    on_did_layout_change: Emitter<()>,
}

impl SplitviewComponent {
    pub fn new(options: LayoutOptions, registry: ComponentRegistry) -> Self {
        Self {
            splitview: Splitview::new(options.orientation, options.proportional_layout),
            registry,
            options,
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

    pub fn orientation(&self) -> Orientation {
        self.splitview.orientation()
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Number of panels
    pub fn length(&self) -> usize {
        self.splitview.len()
    }

    pub fn minimum_size(&self) -> f64 {
        self.splitview.minimum_size()
    }

    pub fn maximum_size(&self) -> f64 {
        self.splitview.maximum_size()
    }

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
            .position(|panel| panel.id() == id)
            .ok_or_else(|| LayoutError::UnknownPanel(id.clone()))
    }

    pub fn get_panel(&self, id: &PanelId) -> Option<&Panel> {
        self.splitview.views().iter().find(|panel| panel.id() == id)
    }

    pub fn get_panel_mut(&mut self, id: &PanelId) -> Option<&mut Panel> {
        let index = self.index_of(id).ok()?;
        self.splitview.view_mut(index)
    }

    pub fn panels(&self) -> &[Panel] {
        self.splitview.views()
    }

    pub fn active_panel(&self) -> Option<&PanelId> {
        self.active.as_ref()
    }

    /// Create a panel and insert it at `index` (appended when `None`)
    pub fn add_panel(&mut self, options: PanelOptions, index: Option<usize>, sizing: Sizing) -> Result<usize, LayoutError> {
        if self.get_panel(&options.id).is_some() {
            return Err(LayoutError::DuplicatePanelId(options.id));
        }
        let index = index.unwrap_or(self.splitview.len());
        let len = self.splitview.len();
        if index > len {
            return Err(LayoutError::InvalidIndex { index, len });
        }

        let content = self.registry.create(&options.component)?;
        let mut panel = Panel::new(options, content);
        let constraint = panel.constraints().size_constraint(self.orientation(), 0.0);
        let priority = panel.priority();
        panel.set_visible(!matches!(sizing, Sizing::Invisible));
        panel.update_parent(None, false);

        let fit = self
            .splitview
            .add_view(panel, constraint, priority, index, sizing)?;
        if let Err(err) = fit.check() {
            tracing::warn!("Panel added without enough room: {}", err);
        }
        self.layout_panels();
        self.on_did_layout_change.fire(());
        Ok(index)
    }

    pub fn remove_panel(&mut self, id: &PanelId, sizing: Sizing) -> Result<(), LayoutError> {
        let index = self.index_of(id)?;
        let (mut panel, _) = self.splitview.remove_view(index, sizing)?;
        panel.dispose();
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        self.layout_panels();
        self.on_did_layout_change.fire(());
        Ok(())
    }

    /// Move the panel at `from` so it ends up at `to`
    pub fn move_panel(&mut self, from: usize, to: usize) -> Result<(), LayoutError> {
        self.splitview.move_view(from, to)?;
        self.layout_panels();
        self.on_did_layout_change.fire(());
        Ok(())
    }

    pub fn set_visible(&mut self, id: &PanelId, visible: bool) -> Result<(), LayoutError> {
        let index = self.index_of(id)?;
        let _ = self.splitview.set_view_visible(index, visible)?;
        if let Some(panel) = self.splitview.view_mut(index) {
            panel.set_visible(visible);
        }
        self.layout_panels();
        self.on_did_layout_change.fire(());
        Ok(())
    }

    pub fn is_visible(&self, id: &PanelId) -> Result<bool, LayoutError> {
        let index = self.index_of(id)?;
        Ok(self.splitview.is_view_visible(index).unwrap_or(false))
    }

    pub fn layout(&mut self, width: f64, height: f64) -> Fit {
        self.width = width;
        self.height = height;
        self.laid_out = true;
        let (size, orthogonal) = self.orientation().split(width, height);
        let fit = self.splitview.layout(size, orthogonal);
        self.layout_panels();
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

    pub fn distribute_view_sizes(&mut self) -> Fit {
        let fit = self.splitview.distribute_view_sizes();
        self.layout_panels();
        self.on_did_layout_change.fire(());
        fit
    }

    fn layout_panels(&mut self) {
        let orientation = self.orientation();
        let orthogonal = self.splitview.orthogonal_size();
        let sizes: Vec<Option<f64>> = self
            .splitview
            .slots()
            .iter()
            .map(|slot| slot.is_visible().then(|| slot.size()))
            .collect();
        for (index, size) in sizes.into_iter().enumerate() {
            if let (Some(size), Some(panel)) = (size, self.splitview.view_mut(index)) {
                let (width, height) = orientation.join(size, orthogonal);
                panel.layout(width, height);
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
        if let Some(panel) = self.splitview.view_mut(index) {
            panel.update_parent(None, true);
        }
        self.active = Some(id.clone());
        Ok(())
    }

    /// Focus the active panel
    pub fn focus(&mut self) {
        let Some(active) = self.active.clone() else {
            return;
        };
        if let Some(panel) = self.get_panel_mut(&active) {
            panel.focus();
        }
    }

    pub fn begin_drag(&mut self, sash: usize, position: f64) -> Result<(), LayoutError> {
        self.splitview.begin_drag(sash, position)
    }

    pub fn drag_to(&mut self, position: f64) -> f64 {
        let applied = self.splitview.drag_to(position);
        self.layout_panels();
        applied
    }

    /// Once per animation frame while dragging
    pub fn flush_frame(&mut self) -> bool {
        let flushed = self.splitview.flush_frame();
        if flushed {
            self.on_did_layout_change.fire(());
        }
        flushed
    }

    pub fn end_drag(&mut self) -> bool {
        let ended = self.splitview.end_drag();
        if ended {
            self.on_did_layout_change.fire(());
        }
        ended
    }

    pub fn cancel_drag(&mut self) -> bool {
        let cancelled = self.splitview.cancel_drag();
        self.layout_panels();
        cancelled
    }

    pub fn to_json(&self) -> SerializedSplitview {
        SerializedSplitview {
            orientation: self.orientation(),
            size: self.splitview.size(),
            views: self
                .splitview
                .views()
                .iter()
                .zip(self.splitview.slots())
                .map(|(panel, slot)| SerializedView {
                    size: if slot.is_visible() {
                        slot.size()
                    } else {
                        slot.cached_size()
                    },
                    data: panel.to_json(),
                    visible: slot.is_visible(),
                })
                .collect(),
            active_view: self.active.clone(),
        }
    }

    /// Replace every panel with the serialized ones; on error nothing changes
    pub fn from_json(&mut self, data: &SerializedSplitview) -> Result<(), LayoutError> {
        serialization::check_size(data.size)?;
        let mut seen = HashSet::new();
        let mut entries: Vec<(Panel, Slot)> = Vec::with_capacity(data.views.len());
        for view in &data.views {
            let size = serialization::check_size(view.size)?;
            if !seen.insert(view.data.id.clone()) {
                return Err(LayoutError::DuplicatePanelId(view.data.id.clone()));
            }
            let mut panel = serialization::restore_panel(&view.data, &self.registry)?;
            panel.set_visible(view.visible);
            let slot = serialization::restored_slot(&panel, data.orientation, size, view.visible);
            entries.push((panel, slot));
        }

        let restored = Splitview::from_views(data.orientation, self.options.proportional_layout, entries);
        let previous = std::mem::replace(&mut self.splitview, restored);
        drop(previous);
        self.options.orientation = data.orientation;
        self.active = None;

        let (width, height) = if self.laid_out {
            (self.width, self.height)
        } else {
            data.orientation.join(data.size, 0.0)
        };
        let _ = self.layout(width, height);

        if let Some(active) = &data.active_view {
            if self.get_panel(active).is_some() {
                self.set_active(active)?;
            }
        }
        tracing::debug!("Restored splitview with {} panels", self.length());
        Ok(())
    }

    /// Dispose every panel
    pub fn clear(&mut self) {
        for (mut panel, _) in self.splitview.drain() {
            panel.dispose();
        }
        self.active = None;
        self.on_did_layout_change.fire(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{EmptyContent, PanelConstraints};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn component() -> SplitviewComponent {
        let mut registry = ComponentRegistry::new();
        registry.register("default", || Box::new(EmptyContent));
        SplitviewComponent::new(LayoutOptions::default(), registry)
    }

    fn min50(id: &str) -> PanelOptions {
        PanelOptions::new(id, "default").with_constraints(PanelConstraints::uniform(50.0, None))
    }

    fn approx(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-6, "{actual:?} vs {expected:?}");
        }
    }

    fn three() -> SplitviewComponent {
        let mut c = component();
        c.layout(300.0, 100.0);
        for id in ["a", "b", "c"] {
            c.add_panel(min50(id), None, Sizing::Distribute).unwrap();
        }
        c
    }

    #[test]
    fn panels_get_equal_shares_and_dimensions() {
        let c = three();
        approx(&c.sizes(), &[100.0, 100.0, 100.0]);
        let b = c.get_panel(&"b".into()).unwrap();
        assert!((b.width() - 100.0).abs() < 1e-6);
        assert!((b.height() - 100.0).abs() < 1e-6);
        assert_eq!(c.minimum_size(), 150.0);
    }

    #[test]
    fn unknown_component_and_duplicates_are_rejected() {
        let mut c = three();
        assert!(matches!(
            c.add_panel(PanelOptions::new("x", "missing"), None, Sizing::Distribute),
            Err(LayoutError::UnknownComponent(_))
        ));
        assert!(matches!(
            c.add_panel(min50("a"), None, Sizing::Distribute),
            Err(LayoutError::DuplicatePanelId(_))
        ));
        assert_eq!(c.length(), 3);
    }

    #[test]
    fn remove_spreads_space_and_clears_active() {
        let mut c = three();
        c.set_active(&"b".into()).unwrap();
        c.remove_panel(&"b".into(), Sizing::Distribute).unwrap();
        approx(&c.sizes(), &[150.0, 150.0]);
        assert_eq!(c.active_panel(), None);
        assert!(c.remove_panel(&"b".into(), Sizing::Distribute).is_err());
    }

    #[test]
    fn container_resize_can_be_disabled() {
        let mut registry = ComponentRegistry::new();
        registry.register("default", || Box::new(EmptyContent));
        let options = LayoutOptions::default().with_disable_auto_resizing(true);
        let mut c = SplitviewComponent::new(options, registry);
        c.layout(300.0, 100.0);
        assert!(!c.container_resized(600.0, 100.0));
        assert_eq!(c.width(), 300.0);
    }

    #[test]
    fn drag_notifies_layout_change_on_frame_and_end() {
        let mut c = three();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let _sub = c.on_did_layout_change().subscribe(move |_| *sink.borrow_mut() += 1);

        c.begin_drag(0, 100.0).unwrap();
        c.drag_to(110.0);
        c.drag_to(130.0);
        assert!(c.flush_frame());
        assert!(c.end_drag());
        approx(&c.sizes(), &[130.0, 70.0, 100.0]);
        assert_eq!(*count.borrow(), 2);
        let a = c.get_panel(&"a".into()).unwrap();
        assert!((a.width() - 130.0).abs() < 1e-6);
    }

    #[test]
    fn json_round_trip() {
        let mut c = three();
        c.set_visible(&"c".into(), false).unwrap();
        c.set_active(&"a".into()).unwrap();
        let data = c.to_json();

        let mut restored = component();
        restored.from_json(&data).unwrap();
        assert_eq!(restored.length(), 3);
        assert!(!restored.is_visible(&"c".into()).unwrap());
        assert_eq!(restored.active_panel(), Some(&PanelId::from("a")));
        approx(&restored.sizes(), &c.sizes());
    }

    #[test]
    fn failed_restore_keeps_current_panels() {
        let mut c = three();
        let mut data = c.to_json();
        data.views[1].data.component_name = "missing".to_string();
        assert!(c.from_json(&data).is_err());
        assert_eq!(c.length(), 3);
        approx(&c.sizes(), &[100.0, 100.0, 100.0]);
    }
}
