// ABOUTME: Ordered run of views along one axis with drag-to-resize sashes.
// ABOUTME: Wraps the distributor with view identity, a drag state machine and frame batching.

use splitgrid_core::{Emitter, Orientation};

use crate::constraint::{LayoutPriority, SizeConstraint};
use crate::distributor::{self, Fit, Slot};
use crate::error::LayoutError;
use crate::sizing::Sizing;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SplitviewEvent {
    /// Sizes changed during a drag; at most one per flushed frame
    Frame,
    /// A drag gesture was committed
    DragEnd,
}

#[derive(Debug, Clone)]
enum DragState {
    Idle,
    Dragging {
        sash: usize,
        start: f64,
        start_slots: Vec<Slot>,
    },
}

/// One-dimensional container of views of type `V`.
///
/// Until the first `layout` call the splitview has no fixed length; views keep
/// the size they were added with and `size()` tracks their sum.
#[derive(Debug)]
pub struct Splitview<V> {
    orientation: Orientation,
    size: f64,
    orthogonal_size: f64,
    views: Vec<V>,
    slots: Vec<Slot>,
    proportional_layout: bool,
    laid_out: bool,
    drag: DragState,
    frame_dirty: bool,
    on_did_change: Emitter<SplitviewEvent>,
}

impl<V> Splitview<V> {
    pub fn new(orientation: Orientation, proportional_layout: bool) -> Self {
        Self {
            orientation,
            size: 0.0,
            orthogonal_size: 0.0,
            views: Vec::new(),
            slots: Vec::new(),
            proportional_layout,
            laid_out: false,
            drag: DragState::Idle,
            frame_dirty: false,
            on_did_change: Emitter::new(),
        }
    }

    /// Rebuild from stored views and sizes; the total becomes the sum of the
    /// visible sizes until the next `layout` rescales it.
    pub fn from_views(
        orientation: Orientation,
        proportional_layout: bool,
        entries: Vec<(V, Slot)>,
    ) -> Self {
        let mut splitview = Self::new(orientation, proportional_layout);
        for (view, slot) in entries {
            splitview.views.push(view);
            splitview.slots.push(slot);
        }
        splitview.size = distributor::content_size(&splitview.slots);
        splitview.laid_out = true;
        splitview
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn orthogonal_size(&self) -> f64 {
        self.orthogonal_size
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn views(&self) -> &[V] {
        &self.views
    }

    pub fn view(&self, index: usize) -> Option<&V> {
        self.views.get(index)
    }

    pub fn view_mut(&mut self, index: usize) -> Option<&mut V> {
        self.views.get_mut(index)
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn sizes(&self) -> Vec<f64> {
        self.slots.iter().map(Slot::size).collect()
    }

    pub fn view_size(&self, index: usize) -> Option<f64> {
        self.slots.get(index).map(Slot::size)
    }

    pub fn is_view_visible(&self, index: usize) -> Option<bool> {
        self.slots.get(index).map(Slot::is_visible)
    }

    /// Start offset of each view along the axis
    pub fn offsets(&self) -> Vec<f64> {
        let mut offset = 0.0;
        self.slots
            .iter()
            .map(|slot| {
                let start = offset;
                offset += slot.size();
                start
            })
            .collect()
    }

    pub fn minimum_size(&self) -> f64 {
        distributor::minimum_size(&self.slots)
    }

    pub fn maximum_size(&self) -> f64 {
        distributor::maximum_size(&self.slots)
    }

    pub fn proportional_layout(&self) -> bool {
        self.proportional_layout
    }

    pub fn on_did_change(&self) -> &Emitter<SplitviewEvent> {
        &self.on_did_change
    }

    /// Replace a view's bounds, keeping its current size
    pub fn set_view_constraint(&mut self, index: usize, minimum: f64, maximum: f64) -> Result<(), LayoutError> {
        let len = self.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(LayoutError::InvalidIndex { index, len })?;
        slot.constraint = SizeConstraint::new(minimum, maximum, slot.constraint.current);
        Ok(())
    }

    /// Replace a view's bounds and move it towards `size`. Once laid out the
    /// length is kept and the other views make up the difference; before that
    /// the length follows the views.
    pub fn set_view_bounds(&mut self, index: usize, minimum: f64, maximum: f64, size: f64) -> Result<Fit, LayoutError> {
        self.set_view_constraint(index, minimum, maximum)?;
        self.abandon_drag();
        if self.laid_out {
            let fit = self.resize_to_fit();
            self.resize_view_to(index, size)?;
            return Ok(fit);
        }
        let slot = &mut self.slots[index];
        slot.constraint.current = slot.constraint.clamp(size);
        self.size = distributor::content_size(&self.slots);
        Ok(Fit::Exact)
    }

    pub fn add_view(
        &mut self,
        view: V,
        constraint: SizeConstraint,
        priority: LayoutPriority,
        index: usize,
        sizing: Sizing,
    ) -> Result<Fit, LayoutError> {
        let len = self.len();
        if index > len {
            return Err(LayoutError::InvalidIndex { index, len });
        }
        if let Sizing::Split(reference) = sizing {
            if reference >= len {
                return Err(LayoutError::InvalidIndex { index: reference, len });
            }
        }
        self.abandon_drag();

        let slot = Slot::new(constraint, priority);
        let fit = if self.laid_out {
            distributor::insert(&mut self.slots, index, slot, sizing, self.size)
        } else {
            // Before the first layout the axis grows by whatever the new view asks for
            let requested = match sizing {
                Sizing::Size(size) => constraint.clamp(size),
                _ => constraint.clamp(constraint.current),
            };
            let total = self.size + requested;
            let fit = distributor::insert(&mut self.slots, index, slot, sizing, total);
            self.size = distributor::content_size(&self.slots);
            fit
        };
        self.views.insert(index, view);
        Ok(fit)
    }

    pub fn remove_view(&mut self, index: usize, sizing: Sizing) -> Result<(V, Fit), LayoutError> {
        let len = self.len();
        if index >= len {
            return Err(LayoutError::InvalidIndex { index, len });
        }
        if let Sizing::Split(target) = sizing {
            if target + 1 >= len {
                return Err(LayoutError::InvalidIndex { index: target, len: len - 1 });
            }
        }
        self.abandon_drag();

        let (_, fit) = distributor::remove(&mut self.slots, index, sizing);
        if !self.laid_out {
            self.size = distributor::content_size(&self.slots);
        }
        let view = self.views.remove(index);
        Ok((view, fit))
    }

    /// Move a view to `to` (an index in the resulting sequence); sizes travel with it
    pub fn move_view(&mut self, from: usize, to: usize) -> Result<(), LayoutError> {
        let len = self.len();
        if from >= len {
            return Err(LayoutError::InvalidIndex { index: from, len });
        }
        if to >= len {
            return Err(LayoutError::InvalidIndex { index: to, len });
        }
        if from == to {
            return Ok(());
        }
        self.abandon_drag();

        let view = self.views.remove(from);
        self.views.insert(to, view);
        let slot = self.slots.remove(from);
        self.slots.insert(to, slot);
        Ok(())
    }

    pub fn set_view_visible(&mut self, index: usize, visible: bool) -> Result<Fit, LayoutError> {
        let len = self.len();
        if index >= len {
            return Err(LayoutError::InvalidIndex { index, len });
        }
        self.abandon_drag();

        if self.laid_out {
            return Ok(distributor::set_visible(&mut self.slots, index, visible, self.size));
        }
        // No fixed length yet, so the total simply follows the visible views
        let slot = &mut self.slots[index];
        if visible {
            slot.show();
        } else {
            slot.hide();
        }
        self.size = distributor::content_size(&self.slots);
        Ok(Fit::Exact)
    }

    /// Fit every view into `size` along the axis
    pub fn layout(&mut self, size: f64, orthogonal_size: f64) -> Fit {
        self.abandon_drag();
        self.size = size.max(0.0);
        self.orthogonal_size = orthogonal_size.max(0.0);
        self.laid_out = true;
        let fit = distributor::layout(&mut self.slots, self.size, self.proportional_layout);
        tracing::debug!(
            "Splitview layout {:?}: size={:.1} views={}",
            self.orientation,
            self.size,
            self.len()
        );
        fit
    }

    /// Re-run the distribution against the current length
    pub fn resize_to_fit(&mut self) -> Fit {
        self.layout(self.size, self.orthogonal_size)
    }

    /// Grow or shrink one view by `delta`; returns the delta applied
    pub fn resize_view(&mut self, index: usize, delta: f64) -> Result<f64, LayoutError> {
        let len = self.len();
        if index >= len {
            return Err(LayoutError::InvalidIndex { index, len });
        }
        Ok(distributor::resize(&mut self.slots, index, delta))
    }

    /// Resize one view towards an absolute size
    pub fn resize_view_to(&mut self, index: usize, size: f64) -> Result<f64, LayoutError> {
        let current = self
            .view_size(index)
            .ok_or(LayoutError::InvalidIndex { index, len: self.len() })?;
        self.resize_view(index, size - current)
    }

    pub fn distribute_view_sizes(&mut self) -> Fit {
        self.abandon_drag();
        distributor::distribute_evenly(&mut self.slots, self.size)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    /// Start dragging the sash after view `sash` from `position`
    pub fn begin_drag(&mut self, sash: usize, position: f64) -> Result<(), LayoutError> {
        let len = self.len();
        if sash >= len {
            return Err(LayoutError::InvalidIndex { index: sash, len });
        }
        self.cancel_drag();
        self.drag = DragState::Dragging {
            sash,
            start: position,
            start_slots: self.slots.clone(),
        };
        Ok(())
    }

    /// Move the active sash to `position`; returns the delta applied from the drag start
    pub fn drag_to(&mut self, position: f64) -> f64 {
        let DragState::Dragging {
            sash,
            start,
            start_slots,
        } = &self.drag
        else {
            return 0.0;
        };
        let (sash, delta) = (*sash, position - *start);
        self.slots.clone_from(start_slots);
        let applied = distributor::resize(&mut self.slots, sash, delta);
        self.frame_dirty = true;
        applied
    }

    /// Called by the host once per animation frame; emits at most one `Frame`
    pub fn flush_frame(&mut self) -> bool {
        if !self.frame_dirty {
            return false;
        }
        self.frame_dirty = false;
        self.on_did_change.fire(SplitviewEvent::Frame);
        true
    }

    /// Commit the drag and notify once
    pub fn end_drag(&mut self) -> bool {
        if !self.is_dragging() {
            return false;
        }
        self.drag = DragState::Idle;
        self.frame_dirty = false;
        self.on_did_change.fire(SplitviewEvent::DragEnd);
        true
    }

    /// Abandon the drag and restore the sizes it started with
    pub fn cancel_drag(&mut self) -> bool {
        match std::mem::replace(&mut self.drag, DragState::Idle) {
            DragState::Dragging { start_slots, .. } => {
                self.slots = start_slots;
                self.frame_dirty = false;
                true
            }
            DragState::Idle => false,
        }
    }

    fn abandon_drag(&mut self) {
        if self.is_dragging() {
            tracing::debug!("Structural change during drag, dropping drag state");
            self.drag = DragState::Idle;
            self.frame_dirty = false;
        }
    }

    /// Swap the view at `index` for `entries`, scaling their sizes to fill the
    /// space it occupied. Returns the replaced view.
    pub(crate) fn replace_view(&mut self, index: usize, entries: Vec<(V, Slot)>) -> Result<V, LayoutError> {
        let len = self.len();
        if index >= len {
            return Err(LayoutError::InvalidIndex { index, len });
        }
        self.abandon_drag();

        let room = self.slots[index].size();
        let content: f64 = entries.iter().map(|(_, slot)| slot.size()).sum();
        let scale = if content > distributor::EPSILON { room / content } else { 0.0 };
        let count = entries.len();

        let mut views = Vec::with_capacity(count);
        let mut slots = Vec::with_capacity(count);
        for (view, mut slot) in entries {
            if slot.is_visible() {
                slot.constraint.current = if scale > 0.0 {
                    slot.constraint.current * scale
                } else {
                    room / count as f64
                };
            }
            views.push(view);
            slots.push(slot);
        }

        self.slots.splice(index..=index, slots);
        let removed = self.views.splice(index..=index, views).next();
        removed.ok_or(LayoutError::InvalidIndex { index, len })
    }

    pub(crate) fn set_orientation(&mut self, orientation: Orientation) {
        self.abandon_drag();
        self.orientation = orientation;
    }

    /// Take every view out, leaving an empty splitview of the same length
    pub fn drain(&mut self) -> Vec<(V, Slot)> {
        self.abandon_drag();
        let slots = std::mem::take(&mut self.slots);
        std::mem::take(&mut self.views).into_iter().zip(slots).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn min50() -> SizeConstraint {
        SizeConstraint::new(50.0, f64::INFINITY, 0.0)
    }

    fn three_panels() -> Splitview<&'static str> {
        let mut sv = Splitview::new(Orientation::Horizontal, true);
        sv.layout(300.0, 100.0);
        for (i, id) in ["a", "b", "c"].into_iter().enumerate() {
            let _ = sv
                .add_view(id, min50(), LayoutPriority::Normal, i, Sizing::Distribute)
                .unwrap();
        }
        sv
    }

    fn approx(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-6, "{actual:?} vs {expected:?}");
        }
    }

    #[test]
    fn distributes_equally_on_add() {
        let sv = three_panels();
        approx(&sv.sizes(), &[100.0, 100.0, 100.0]);
        assert_eq!(sv.views(), &["a", "b", "c"]);
        approx(&sv.offsets(), &[0.0, 100.0, 200.0]);
    }

    #[test]
    fn resize_then_remove_scenario() {
        let mut sv = three_panels();
        assert_eq!(sv.resize_view(0, 30.0).unwrap(), 30.0);
        approx(&sv.sizes(), &[130.0, 70.0, 100.0]);

        let (removed, fit) = sv.remove_view(1, Sizing::Distribute).unwrap();
        assert_eq!(removed, "b");
        assert!(fit.is_exact());
        approx(&sv.sizes(), &[165.0, 135.0]);
    }

    #[test]
    fn views_added_before_layout_scale_proportionally() {
        let mut sv = Splitview::new(Orientation::Vertical, true);
        let _ = sv.add_view(1, SizeConstraint::unbounded(100.0), LayoutPriority::Normal, 0, Sizing::Distribute);
        let _ = sv.add_view(2, SizeConstraint::unbounded(300.0), LayoutPriority::Normal, 1, Sizing::Distribute);
        assert_eq!(sv.size(), 400.0);

        assert!(sv.layout(200.0, 50.0).is_exact());
        approx(&sv.sizes(), &[50.0, 150.0]);
    }

    #[test]
    fn new_bounds_refit_and_keep_the_length() {
        let mut sv = three_panels();
        assert!(sv.set_view_bounds(0, 20.0, 20.0, 20.0).unwrap().is_exact());
        approx(&sv.sizes(), &[20.0, 140.0, 140.0]);

        let _ = sv.set_view_bounds(0, 70.0, f64::INFINITY, 100.0).unwrap();
        approx(&sv.sizes(), &[100.0, 85.0, 115.0]);
        assert_eq!(sv.size(), 300.0);
    }

    #[test]
    fn fixed_sizes_before_layout_are_kept() {
        let mut sv = Splitview::new(Orientation::Horizontal, true);
        let fit = sv
            .add_view(1, SizeConstraint::unbounded(0.0), LayoutPriority::Normal, 0, Sizing::Size(120.0))
            .unwrap();
        assert!(fit.is_exact());
        let _ = sv.add_view(2, min50(), LayoutPriority::Normal, 1, Sizing::Size(80.0));
        approx(&sv.sizes(), &[120.0, 80.0]);
        assert_eq!(sv.size(), 200.0);
    }

    #[test]
    fn move_view_keeps_sizes_and_total() {
        let mut sv = three_panels();
        sv.resize_view(0, 30.0).unwrap();
        sv.move_view(0, 2).unwrap();
        assert_eq!(sv.views(), &["b", "c", "a"]);
        approx(&sv.sizes(), &[70.0, 100.0, 130.0]);
    }

    #[test]
    fn invalid_indices_are_rejected_without_change() {
        let mut sv = three_panels();
        assert!(matches!(
            sv.add_view("d", min50(), LayoutPriority::Normal, 5, Sizing::Distribute),
            Err(LayoutError::InvalidIndex { index: 5, len: 3 })
        ));
        assert!(sv.remove_view(3, Sizing::Distribute).is_err());
        assert!(sv.move_view(0, 3).is_err());
        assert!(sv.resize_view(9, 1.0).is_err());
        assert_eq!(sv.len(), 3);
        approx(&sv.sizes(), &[100.0, 100.0, 100.0]);
    }

    #[test]
    fn layout_is_idempotent() {
        let mut sv = three_panels();
        sv.resize_view(1, 17.0).unwrap();
        let _ = sv.layout(450.0, 80.0);
        let first = sv.sizes();
        let _ = sv.layout(450.0, 80.0);
        approx(&sv.sizes(), &first);
    }

    #[test]
    fn drag_moves_are_relative_to_start() {
        let mut sv = three_panels();
        sv.begin_drag(0, 100.0).unwrap();
        sv.drag_to(120.0);
        sv.drag_to(130.0);
        approx(&sv.sizes(), &[130.0, 70.0, 100.0]);
        assert!(sv.end_drag());
        assert!(!sv.is_dragging());
        approx(&sv.sizes(), &[130.0, 70.0, 100.0]);
    }

    #[test]
    fn cancel_restores_exact_sizes() {
        let mut sv = three_panels();
        sv.resize_view(0, 13.0).unwrap();
        let before = sv.sizes();

        sv.begin_drag(1, 0.0).unwrap();
        sv.drag_to(-40.0);
        assert!(sv.cancel_drag());
        assert_eq!(sv.sizes(), before);
    }

    #[test]
    fn drag_notifies_once_per_frame_and_once_on_end() {
        let mut sv = three_panels();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let _sub = sv.on_did_change().subscribe(move |e| sink.borrow_mut().push(*e));

        sv.begin_drag(0, 0.0).unwrap();
        sv.drag_to(5.0);
        sv.drag_to(10.0);
        sv.drag_to(15.0);
        assert!(sv.flush_frame());
        assert!(!sv.flush_frame());
        sv.drag_to(20.0);
        sv.end_drag();
        assert!(!sv.flush_frame());

        assert_eq!(
            *events.borrow(),
            vec![SplitviewEvent::Frame, SplitviewEvent::DragEnd]
        );
    }

    #[test]
    fn cancelled_drag_sends_nothing() {
        let mut sv = three_panels();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let _sub = sv.on_did_change().subscribe(move |_| *sink.borrow_mut() += 1);

        sv.begin_drag(0, 0.0).unwrap();
        sv.drag_to(25.0);
        sv.cancel_drag();
        assert!(!sv.end_drag());
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn hide_and_show_keep_total() {
        let mut sv = three_panels();
        assert!(sv.set_view_visible(2, false).unwrap().is_exact());
        assert_eq!(sv.is_view_visible(2), Some(false));
        approx(&sv.sizes(), &[150.0, 150.0, 0.0]);
        assert!(sv.set_view_visible(2, true).unwrap().is_exact());
        approx(&sv.sizes(), &[100.0, 100.0, 100.0]);
    }

    #[test]
    fn minimum_and_maximum_sum_visible_bounds() {
        let sv = three_panels();
        assert_eq!(sv.minimum_size(), 150.0);
        assert_eq!(sv.maximum_size(), f64::INFINITY);
    }

    #[test]
    fn from_views_uses_sizes_as_proportions() {
        let entries = vec![
            ("a", Slot::new(SizeConstraint::unbounded(1.0), LayoutPriority::Normal)),
            ("b", Slot::new(SizeConstraint::unbounded(3.0), LayoutPriority::Normal)),
        ];
        let mut sv = Splitview::from_views(Orientation::Horizontal, true, entries);
        assert_eq!(sv.size(), 4.0);
        let _ = sv.layout(400.0, 10.0);
        approx(&sv.sizes(), &[100.0, 300.0]);
    }

    #[test]
    fn replace_view_scales_entries_into_the_gap() {
        let mut sv = three_panels();
        let entries = vec![
            ("x", Slot::new(SizeConstraint::unbounded(10.0), LayoutPriority::Normal)),
            ("y", Slot::new(SizeConstraint::unbounded(30.0), LayoutPriority::Normal)),
        ];
        assert_eq!(sv.replace_view(1, entries).unwrap(), "b");
        assert_eq!(sv.views(), &["a", "x", "y", "c"]);
        approx(&sv.sizes(), &[100.0, 25.0, 75.0, 100.0]);
    }
}
