// ABOUTME: One-dimensional size distribution over an ordered run of panels.
// ABOUTME: Keeps the visible sizes summing to the axis length while honouring bounds.

use crate::constraint::{LayoutPriority, SizeConstraint};
use crate::error::LayoutError;
use crate::sizing::Sizing;

/// Tolerance for treating two sizes as equal
pub const EPSILON: f64 = 1e-6;

/// One entry along an axis: bounds, current size and visibility
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub constraint: SizeConstraint,
    pub priority: LayoutPriority,
    visible: bool,
    cached_size: f64,
}

impl Slot {
    pub fn new(constraint: SizeConstraint, priority: LayoutPriority) -> Self {
        Self {
            constraint,
            priority,
            visible: true,
            cached_size: 0.0,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Size on the axis; hidden slots occupy nothing
    pub fn size(&self) -> f64 {
        if self.visible {
            self.constraint.current
        } else {
            0.0
        }
    }

    /// Size remembered while hidden, restored when shown again
    pub fn cached_size(&self) -> f64 {
        self.cached_size
    }

    /// Take the slot out of the layout, returning the size it released
    pub(crate) fn hide(&mut self) -> f64 {
        if !self.visible {
            return 0.0;
        }
        let freed = self.constraint.current;
        self.cached_size = freed;
        self.constraint.current = 0.0;
        self.visible = false;
        freed
    }

    /// Put the slot back at its cached size, without touching any neighbour
    pub(crate) fn show(&mut self) {
        if self.visible {
            return;
        }
        self.visible = true;
        self.constraint.current = self.constraint.clamp(self.cached_size);
    }

    /// A slot that starts out of the layout, remembering `cached_size`
    pub fn hidden(constraint: SizeConstraint, priority: LayoutPriority, cached_size: f64) -> Self {
        Self {
            constraint: SizeConstraint {
                current: 0.0,
                ..constraint
            },
            priority,
            visible: false,
            cached_size,
        }
    }
}

/// Outcome of a distribution pass
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fit {
    /// Every visible slot is within bounds and the sizes sum to the total
    Exact,
    /// Minimums exceed the total; the last visible slot was squeezed
    Infeasible { shortfall: f64 },
    /// Maximums fall short of the total; the last visible slot absorbed the rest
    Overfilled { surplus: f64 },
}

impl Fit {
    pub fn is_exact(&self) -> bool {
        matches!(self, Fit::Exact)
    }

    /// Overfilling is tolerated; only an unmet minimum is an error
    pub fn check(self) -> Result<(), LayoutError> {
        match self {
            Fit::Infeasible { shortfall } => Err(LayoutError::LayoutInfeasible { shortfall }),
            Fit::Exact | Fit::Overfilled { .. } => Ok(()),
        }
    }

    /// Keep the worse of two outcomes
    pub fn and(self, other: Fit) -> Fit {
        match (self, other) {
            (Fit::Infeasible { .. }, _) => self,
            (_, Fit::Infeasible { .. }) => other,
            (Fit::Overfilled { .. }, _) => self,
            _ => other,
        }
    }
}

pub fn visible_indices(slots: &[Slot]) -> Vec<usize> {
    slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.visible)
        .map(|(i, _)| i)
        .collect()
}

/// Sum of visible sizes
pub fn content_size(slots: &[Slot]) -> f64 {
    slots.iter().map(Slot::size).sum()
}

pub fn minimum_size(slots: &[Slot]) -> f64 {
    slots
        .iter()
        .filter(|slot| slot.visible)
        .map(|slot| slot.constraint.minimum)
        .sum()
}

pub fn maximum_size(slots: &[Slot]) -> f64 {
    slots
        .iter()
        .filter(|slot| slot.visible)
        .map(|slot| slot.constraint.maximum)
        .sum()
}

/// Fit visible slots into `total`.
///
/// Proportional mode keeps each slot's share of the previous content size
/// (equal shares when there is none). Otherwise the size change is handed
/// out by priority: high first, low last, and later slots before earlier ones.
pub fn layout(slots: &mut [Slot], total: f64, proportional: bool) -> Fit {
    let indices = visible_indices(slots);
    if indices.is_empty() {
        return Fit::Exact;
    }

    if proportional {
        let weights = current_weights(slots, &indices);
        return fit_weighted(slots, &indices, &weights, total);
    }

    let mut delta = total - content_size(slots);
    for i in priority_order(slots, &indices) {
        let c = slots[i].constraint;
        let next = c.clamp(c.current + delta);
        delta -= next - c.current;
        slots[i].constraint.current = next;
    }
    if delta.abs() > EPSILON {
        let weights = current_weights(slots, &indices);
        return fit_weighted(slots, &indices, &weights, total);
    }
    push_residue(slots, &indices, total);
    Fit::Exact
}

/// Give every visible slot an equal share of `total`, within bounds
pub fn distribute_evenly(slots: &mut [Slot], total: f64) -> Fit {
    let indices = visible_indices(slots);
    let weights = vec![1.0; indices.len()];
    fit_weighted(slots, &indices, &weights, total)
}

/// Move the sash after `index` by `delta`; returns the delta actually applied.
///
/// When `index` is the last visible slot the sash before it is used instead,
/// so the slot still changes by `delta`. Both sides cascade nearest-first.
pub fn resize(slots: &mut [Slot], index: usize, delta: f64) -> f64 {
    if delta == 0.0 || index >= slots.len() || !slots[index].visible {
        return 0.0;
    }

    let visible = visible_indices(slots);
    let Some(pos) = visible.iter().position(|&i| i == index) else {
        return 0.0;
    };
    let (up, down): (Vec<usize>, Vec<usize>) = if pos + 1 < visible.len() {
        (
            visible[..=pos].iter().rev().copied().collect(),
            visible[pos + 1..].to_vec(),
        )
    } else if pos > 0 {
        (vec![index], visible[..pos].iter().rev().copied().collect())
    } else {
        return 0.0;
    };

    let sum = |set: &[usize], f: &dyn Fn(&SizeConstraint) -> f64| -> f64 {
        set.iter().map(|&i| f(&slots[i].constraint)).sum()
    };
    let min_delta = sum(&up, &|c| c.minimum - c.current).max(sum(&down, &|c| c.current - c.maximum));
    let max_delta = sum(&down, &|c| c.current - c.minimum).min(sum(&up, &|c| c.maximum - c.current));
    if min_delta > max_delta {
        return 0.0;
    }
    let delta = delta.max(min_delta).min(max_delta);

    apply_cascade(slots, &up, delta);
    apply_cascade(slots, &down, -delta);
    delta
}

/// Insert `slot` at `index`, making room according to `sizing`
pub fn insert(slots: &mut Vec<Slot>, index: usize, mut slot: Slot, sizing: Sizing, total: f64) -> Fit {
    let index = index.min(slots.len());
    let visible_before = visible_indices(slots).len();

    match sizing {
        Sizing::Invisible => {
            slot.constraint.current = requested_size(&slot, total, visible_before);
            slot.hide();
            slots.insert(index, slot);
            Fit::Exact
        }
        Sizing::Distribute => {
            slot.visible = true;
            slot.constraint.current = requested_size(&slot, total, visible_before);
            slots.insert(index, slot);
            make_room_proportionally(slots, index, total)
        }
        Sizing::Size(size) => {
            let donors = shift_from(nearest_to_gap(slots, index), index);
            slot.visible = true;
            slot.constraint.current = slot.constraint.clamp(size);
            slots.insert(index, slot);
            take_for(slots, index, &donors, total)
        }
        Sizing::Split(reference) => {
            let reference_size = slots.get(reference).map(Slot::size).unwrap_or(0.0);
            let mut donors = nearest_to_gap(slots, index);
            if reference < slots.len() {
                donors.retain(|&i| i != reference);
                donors.insert(0, reference);
            }
            let donors = shift_from(donors, index);
            slot.visible = true;
            slot.constraint.current = slot.constraint.clamp(reference_size / 2.0);
            slots.insert(index, slot);
            take_for(slots, index, &donors, total)
        }
    }
}

/// Remove the slot at `index` and hand its space to the others.
///
/// `index` must be in range.
pub fn remove(slots: &mut Vec<Slot>, index: usize, sizing: Sizing) -> (Slot, Fit) {
    let removed = slots.remove(index);
    let freed = removed.size();
    if freed <= EPSILON {
        return (removed, Fit::Exact);
    }

    let fit = match sizing {
        Sizing::Split(target) if slots.get(target).is_some_and(|s| s.visible) => {
            let mut order = nearest_to_gap(slots, target);
            order.retain(|&i| i != target);
            order.insert(0, target);
            give(slots, freed, &order)
        }
        Sizing::Size(_) | Sizing::Split(_) => {
            let order = nearest_to_gap(slots, index);
            give(slots, freed, &order)
        }
        Sizing::Distribute | Sizing::Invisible => spread_evenly(slots, freed),
    };
    (removed, fit)
}

/// Hide or show the slot at `index`, keeping the total constant
pub fn set_visible(slots: &mut [Slot], index: usize, visible: bool, total: f64) -> Fit {
    if slots[index].visible == visible {
        return Fit::Exact;
    }

    if !visible {
        let freed = slots[index].hide();
        return spread_evenly(slots, freed);
    }

    let visible_before = visible_indices(slots).len();
    let mut slot = slots[index];
    slot.visible = true;
    slot.constraint.current = slot.cached_size;
    slots[index].constraint.current = requested_size(&slot, total, visible_before);
    slots[index].visible = true;
    make_room_proportionally(slots, index, total)
}

/// Size a new slot asks for: its own clamped size, or an equal share if it has none
fn requested_size(slot: &Slot, total: f64, existing: usize) -> f64 {
    let own = slot.constraint.current;
    if own > EPSILON {
        slot.constraint.clamp(own)
    } else {
        slot.constraint.clamp(total / (existing + 1) as f64)
    }
}

/// Shrink every other visible slot by its share so `index` keeps its size
fn make_room_proportionally(slots: &mut [Slot], index: usize, total: f64) -> Fit {
    let indices = visible_indices(slots);
    let requested = slots[index].constraint.current;
    let others: f64 = indices
        .iter()
        .filter(|&&i| i != index)
        .map(|&i| slots[i].constraint.current)
        .sum();
    let other_count = indices.len().saturating_sub(1);
    let room = (total - requested).max(0.0);

    let weights: Vec<f64> = indices
        .iter()
        .map(|&i| {
            if i == index {
                requested
            } else if others > EPSILON {
                slots[i].constraint.current * room / others
            } else {
                room / other_count as f64
            }
        })
        .collect();
    fit_weighted(slots, &indices, &weights, total)
}

/// Fill slot `receiver` from `donors` in order, then settle whatever is left
fn take_for(slots: &mut [Slot], receiver: usize, donors: &[usize], total: f64) -> Fit {
    let others: f64 = content_size(slots) - slots[receiver].size();
    let free = (total - others).max(0.0);
    let wanted = slots[receiver].constraint.current;
    let mut need = wanted - free;

    for &i in donors {
        if need <= EPSILON {
            break;
        }
        let taken = slots[i].constraint.shrink_room().min(need);
        slots[i].constraint.current -= taken;
        need -= taken;
    }
    if need > EPSILON {
        slots[receiver].constraint.current = (wanted - need).max(0.0);
    }
    settle(slots, total)
}

/// Hand `amount` to slots in `order`, each up to its maximum
fn give(slots: &mut [Slot], amount: f64, order: &[usize]) -> Fit {
    let mut left = amount;
    for &i in order {
        if left <= EPSILON {
            break;
        }
        let given = slots[i].constraint.grow_room().min(left);
        slots[i].constraint.current += given;
        left -= given;
    }
    absorb_leftover(slots, left)
}

/// Spread `amount` evenly over visible slots, refilling from the ones that max out
fn spread_evenly(slots: &mut [Slot], amount: f64) -> Fit {
    let mut left = amount;
    let mut open: Vec<usize> = visible_indices(slots)
        .into_iter()
        .filter(|&i| slots[i].constraint.grow_room() > EPSILON)
        .collect();

    while left > EPSILON && !open.is_empty() {
        let share = left / open.len() as f64;
        let mut still_open = Vec::with_capacity(open.len());
        for i in open {
            let given = slots[i].constraint.grow_room().min(share);
            slots[i].constraint.current += given;
            left -= given;
            if slots[i].constraint.grow_room() > EPSILON {
                still_open.push(i);
            }
        }
        open = still_open;
    }
    absorb_leftover(slots, left)
}

fn absorb_leftover(slots: &mut [Slot], left: f64) -> Fit {
    if left <= EPSILON {
        return Fit::Exact;
    }
    match visible_indices(slots).last() {
        Some(&last) => {
            slots[last].constraint.current += left;
            tracing::warn!("Panel maximums exceeded, last panel absorbed {:.1}", left);
            Fit::Overfilled { surplus: left }
        }
        None => Fit::Exact,
    }
}

/// Re-fit only if sizes drifted from the total or out of bounds
fn settle(slots: &mut [Slot], total: f64) -> Fit {
    let indices = visible_indices(slots);
    if indices.is_empty() {
        return Fit::Exact;
    }
    let drift = (content_size(slots) - total).abs();
    let in_bounds = indices.iter().all(|&i| {
        let c = slots[i].constraint;
        c.current >= c.minimum - EPSILON && c.current <= c.maximum + EPSILON
    });
    if drift <= EPSILON && in_bounds {
        push_residue(slots, &indices, total);
        return Fit::Exact;
    }
    let weights = current_weights(slots, &indices);
    fit_weighted(slots, &indices, &weights, total)
}

fn current_weights(slots: &[Slot], indices: &[usize]) -> Vec<f64> {
    let weights: Vec<f64> = indices.iter().map(|&i| slots[i].constraint.current.max(0.0)).collect();
    if weights.iter().sum::<f64>() > EPSILON {
        weights
    } else {
        vec![1.0; indices.len()]
    }
}

/// Core fixed-point solver.
///
/// Each round scales the unfrozen slots to the remaining space by weight,
/// then freezes the violations whose direction matches the net violation
/// (all of them when it nets to zero). At least one slot freezes per round,
/// so this finishes in at most `indices.len()` rounds.
fn fit_weighted(slots: &mut [Slot], indices: &[usize], weights: &[f64], total: f64) -> Fit {
    let Some(&last) = indices.last() else {
        return Fit::Exact;
    };

    let min_sum: f64 = indices.iter().map(|&i| slots[i].constraint.minimum).sum();
    if min_sum > total + EPSILON {
        for &i in indices {
            slots[i].constraint.current = slots[i].constraint.minimum;
        }
        let others = min_sum - slots[last].constraint.minimum;
        slots[last].constraint.current = (total - others).max(0.0);
        tracing::warn!(
            "Layout infeasible: minimums need {:.1} but only {:.1} available",
            min_sum,
            total
        );
        return Fit::Infeasible {
            shortfall: min_sum - total,
        };
    }

    let max_sum: f64 = indices.iter().map(|&i| slots[i].constraint.maximum).sum();
    if max_sum < total - EPSILON {
        for &i in indices {
            slots[i].constraint.current = slots[i].constraint.maximum;
        }
        let surplus = total - max_sum;
        slots[last].constraint.current += surplus;
        tracing::warn!("Panel maximums exceeded, last panel absorbed {:.1}", surplus);
        return Fit::Overfilled { surplus };
    }

    let n = indices.len();
    let mut sizes = vec![0.0; n];
    let mut frozen = vec![false; n];
    loop {
        let frozen_sum: f64 = (0..n).filter(|&k| frozen[k]).map(|k| sizes[k]).sum();
        let free: Vec<usize> = (0..n).filter(|&k| !frozen[k]).collect();
        if free.is_empty() {
            break;
        }
        let remaining = total - frozen_sum;
        let weight_sum: f64 = free.iter().map(|&k| weights[k].max(0.0)).sum();
        for &k in &free {
            sizes[k] = if weight_sum > EPSILON {
                remaining * weights[k].max(0.0) / weight_sum
            } else {
                remaining / free.len() as f64
            };
        }

        let net: f64 = free
            .iter()
            .map(|&k| slots[indices[k]].constraint.clamp(sizes[k]) - sizes[k])
            .sum();
        let mut froze_any = false;
        for &k in &free {
            let clamped = slots[indices[k]].constraint.clamp(sizes[k]);
            let diff = clamped - sizes[k];
            let freeze = if net > EPSILON {
                diff > EPSILON
            } else if net < -EPSILON {
                diff < -EPSILON
            } else {
                diff.abs() > EPSILON
            };
            if freeze {
                sizes[k] = clamped;
                frozen[k] = true;
                froze_any = true;
            }
        }
        if !froze_any {
            break;
        }
    }

    for (k, &i) in indices.iter().enumerate() {
        slots[i].constraint.current = sizes[k];
    }
    push_residue(slots, indices, total);
    Fit::Exact
}

/// Float residue goes to the last visible slot so the sum is exact
fn push_residue(slots: &mut [Slot], indices: &[usize], total: f64) {
    if let Some(&last) = indices.last() {
        let residue = total - content_size(slots);
        slots[last].constraint.current += residue;
    }
}

fn apply_cascade(slots: &mut [Slot], order: &[usize], delta: f64) {
    let mut left = delta;
    for &i in order {
        let c = slots[i].constraint;
        let next = c.clamp(c.current + left);
        left -= next - c.current;
        slots[i].constraint.current = next;
    }
}

fn priority_order(slots: &[Slot], indices: &[usize]) -> Vec<usize> {
    let reversed = indices.iter().rev().copied();
    let mut order: Vec<usize> = reversed
        .clone()
        .filter(|&i| slots[i].priority == LayoutPriority::High)
        .collect();
    order.extend(reversed.clone().filter(|&i| slots[i].priority == LayoutPriority::Normal));
    order.extend(reversed.filter(|&i| slots[i].priority == LayoutPriority::Low));
    order
}

/// Visible slots ordered by distance from the gap before `gap`; ties go to the later slot
fn nearest_to_gap(slots: &[Slot], gap: usize) -> Vec<usize> {
    let mut order = visible_indices(slots);
    order.sort_by_key(|&i| {
        if i >= gap {
            (i - gap, 0)
        } else {
            (gap - 1 - i, 1)
        }
    });
    order
}

/// Re-index donors after a slot is inserted at `index`
fn shift_from(donors: Vec<usize>, index: usize) -> Vec<usize> {
    donors
        .into_iter()
        .map(|i| if i >= index { i + 1 } else { i })
        .collect()
}
