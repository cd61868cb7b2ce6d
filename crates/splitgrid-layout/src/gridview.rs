// ABOUTME: Two-dimensional layout as a tree of splitviews with alternating orientation.
// ABOUTME: Nodes live in an arena; leaves hold panels and branches hold child node ids.

use std::collections::HashMap;

use splitgrid_core::Orientation;

use crate::constraint::{LayoutPriority, SizeConstraint};
use crate::distributor::{Fit, Slot};
use crate::error::LayoutError;
use crate::panel::{Panel, PanelId};
use crate::sizing::Sizing;
use crate::splitview::Splitview;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug)]
pub enum NodeKind {
    Leaf(Panel),
    Branch(Splitview<NodeId>),
}

#[derive(Debug)]
pub struct Node {
    parent: Option<NodeId>,
    kind: NodeKind,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn as_panel(&self) -> Option<&Panel> {
        match &self.kind {
            NodeKind::Leaf(panel) => Some(panel),
            NodeKind::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&Splitview<NodeId>> {
        match &self.kind {
            NodeKind::Branch(splitview) => Some(splitview),
            NodeKind::Leaf(_) => None,
        }
    }
}

/// Side of a reference panel to place another panel on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Above,
    Below,
}

impl Direction {
    pub fn orientation(self) -> Orientation {
        match self {
            Direction::Left | Direction::Right => Orientation::Horizontal,
            Direction::Above | Direction::Below => Orientation::Vertical,
        }
    }

    fn is_after(self) -> bool {
        matches!(self, Direction::Right | Direction::Below)
    }
}

/// Rectangle in layout units, relative to the grid origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

#[derive(Debug)]
pub struct Gridview {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    root: NodeId,
    leaves: HashMap<PanelId, NodeId>,
    width: f64,
    height: f64,
    proportional_layout: bool,
    laid_out: bool,
    dragging: Option<NodeId>,
}

fn violation(message: impl Into<String>) -> LayoutError {
    LayoutError::StructuralInvariantViolation(message.into())
}

impl Gridview {
    pub fn new(orientation: Orientation, proportional_layout: bool) -> Self {
        let root = Node {
            parent: None,
            kind: NodeKind::Branch(Splitview::new(orientation, proportional_layout)),
        };
        Self {
            nodes: vec![Some(root)],
            free: Vec::new(),
            root: NodeId(0),
            leaves: HashMap::new(),
            width: 0.0,
            height: 0.0,
            proportional_layout,
            laid_out: false,
            dragging: None,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn orientation(&self) -> Orientation {
        self.branch(self.root)
            .map(Splitview::orientation)
            .unwrap_or_default()
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn proportional_layout(&self) -> bool {
        self.proportional_layout
    }

    pub fn is_laid_out(&self) -> bool {
        self.laid_out
    }

    /// Number of panels
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    pub(crate) fn branch(&self, id: NodeId) -> Option<&Splitview<NodeId>> {
        self.node(id).and_then(Node::as_branch)
    }

    fn branch_mut(&mut self, id: NodeId) -> Option<&mut Splitview<NodeId>> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Branch(splitview) => Some(splitview),
            NodeKind::Leaf(_) => None,
        }
    }

    fn is_branch(&self, id: NodeId) -> bool {
        self.branch(id).is_some()
    }

    pub fn contains(&self, id: &PanelId) -> bool {
        self.leaves.contains_key(id)
    }

    pub fn panel(&self, id: &PanelId) -> Option<&Panel> {
        let node = *self.leaves.get(id)?;
        self.node(node)?.as_panel()
    }

    pub fn panel_mut(&mut self, id: &PanelId) -> Option<&mut Panel> {
        let node = *self.leaves.get(id)?;
        match &mut self.node_mut(node)?.kind {
            NodeKind::Leaf(panel) => Some(panel),
            NodeKind::Branch(_) => None,
        }
    }

    /// Panels in depth-first order
    pub fn panels(&self) -> Vec<&Panel> {
        self.leaf_nodes()
            .into_iter()
            .filter_map(|id| self.node(id).and_then(Node::as_panel))
            .collect()
    }

    pub fn panel_ids(&self) -> Vec<PanelId> {
        self.panels().into_iter().map(|p| p.id().clone()).collect()
    }

    fn leaf_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_leaves(self.root, &mut out);
        out
    }

    fn collect_leaves(&self, id: NodeId, out: &mut Vec<NodeId>) {
        match self.node(id).map(Node::kind) {
            Some(NodeKind::Leaf(_)) => out.push(id),
            Some(NodeKind::Branch(splitview)) => {
                for child in splitview.views() {
                    self.collect_leaves(*child, out);
                }
            }
            None => {}
        }
    }

    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                self.nodes[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    fn release(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.get_mut(id.0)?.take();
        if node.is_some() {
            self.free.push(id.0);
        }
        node
    }

    fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(node) = self.node_mut(id) {
            node.parent = parent;
        }
    }

    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    fn index_in_parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent_of(id)?;
        let index = self.branch(parent)?.views().iter().position(|c| *c == id)?;
        Some((parent, index))
    }

    pub fn node_at(&self, path: &[usize]) -> Result<NodeId, LayoutError> {
        let mut current = self.root;
        for &index in path {
            current = self
                .branch(current)
                .and_then(|splitview| splitview.view(index))
                .copied()
                .ok_or_else(|| LayoutError::InvalidPath(path.to_vec()))?;
        }
        Ok(current)
    }

    pub fn path_of(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some((parent, index)) = self.index_in_parent(current) {
            path.push(index);
            current = parent;
        }
        path.reverse();
        path
    }

    pub fn path_of_panel(&self, id: &PanelId) -> Result<Vec<usize>, LayoutError> {
        self.leaves
            .get(id)
            .map(|node| self.path_of(*node))
            .ok_or_else(|| LayoutError::UnknownPanel(id.clone()))
    }

    /// Path at which a panel lands when placed `direction` of `reference`
    pub fn location_of(&self, reference: &PanelId, direction: Direction) -> Result<Vec<usize>, LayoutError> {
        let node = *self
            .leaves
            .get(reference)
            .ok_or_else(|| LayoutError::UnknownPanel(reference.clone()))?;
        let (parent, _) = self
            .index_in_parent(node)
            .ok_or_else(|| violation(format!("panel {} has no parent", reference)))?;
        let parent_orientation = self
            .branch(parent)
            .map(Splitview::orientation)
            .unwrap_or_default();

        let mut path = self.path_of(node);
        let after = usize::from(direction.is_after());
        if direction.orientation() == parent_orientation {
            if let Some(last) = path.last_mut() {
                *last += after;
            }
        } else {
            path.push(after);
        }
        Ok(path)
    }

    /// Bounds of a node along `orientation`, derived from its visible leaves
    fn bounds_along(&self, id: NodeId, orientation: Orientation) -> (f64, f64) {
        match self.node(id).map(Node::kind) {
            Some(NodeKind::Leaf(panel)) => panel.constraints().along(orientation),
            Some(NodeKind::Branch(splitview)) => {
                let bounds: Vec<(f64, f64)> = splitview
                    .views()
                    .iter()
                    .zip(splitview.slots())
                    .filter(|(_, slot)| slot.is_visible())
                    .map(|(child, _)| self.bounds_along(*child, orientation))
                    .collect();
                if bounds.is_empty() {
                    return (0.0, f64::INFINITY);
                }
                if splitview.orientation() == orientation {
                    (
                        bounds.iter().map(|b| b.0).sum(),
                        bounds.iter().map(|b| b.1).sum(),
                    )
                } else {
                    let minimum = bounds.iter().map(|b| b.0).fold(0.0, f64::max);
                    let maximum = bounds.iter().map(|b| b.1).fold(f64::INFINITY, f64::min);
                    (minimum, maximum.max(minimum))
                }
            }
            None => (0.0, f64::INFINITY),
        }
    }

    fn priority_of(&self, id: NodeId) -> LayoutPriority {
        match self.node(id).map(Node::kind) {
            Some(NodeKind::Leaf(panel)) => panel.priority(),
            _ => LayoutPriority::Normal,
        }
    }

    /// Push derived bounds into every branch slot below `branch`
    fn refresh_constraints(&mut self, branch: NodeId) {
        let Some(splitview) = self.branch(branch) else {
            return;
        };
        let orientation = splitview.orientation();
        let children = splitview.views().to_vec();
        let bounds: Vec<(f64, f64)> = children
            .iter()
            .map(|child| self.bounds_along(*child, orientation))
            .collect();
        if let Some(splitview) = self.branch_mut(branch) {
            for (index, (minimum, maximum)) in bounds.into_iter().enumerate() {
                let _ = splitview.set_view_constraint(index, minimum, maximum);
            }
        }
        for child in children {
            if self.is_branch(child) {
                self.refresh_constraints(child);
            }
        }
    }

    pub fn minimum_width(&self) -> f64 {
        self.bounds_along(self.root, Orientation::Horizontal).0
    }

    pub fn minimum_height(&self) -> f64 {
        self.bounds_along(self.root, Orientation::Vertical).0
    }

    pub fn maximum_width(&self) -> f64 {
        self.bounds_along(self.root, Orientation::Horizontal).1
    }

    pub fn maximum_height(&self) -> f64 {
        self.bounds_along(self.root, Orientation::Vertical).1
    }

    /// Lay the whole tree out in `width` x `height`
    pub fn layout(&mut self, width: f64, height: f64) -> Fit {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.laid_out = true;
        self.dragging = None;

        let root = self.root;
        self.refresh_constraints(root);
        let (size, orthogonal) = self.orientation().split(self.width, self.height);
        let fit = match self.branch_mut(root) {
            Some(splitview) => splitview.layout(size, orthogonal),
            None => Fit::Exact,
        };
        let fit = fit.and(self.layout_children(root));
        tracing::debug!(
            "Grid layout {:.1}x{:.1}: {} panels",
            self.width,
            self.height,
            self.len()
        );
        fit
    }

    /// Re-run the layout at the current dimensions once the grid has been laid out
    fn relayout(&mut self) -> Fit {
        if self.laid_out {
            self.layout(self.width, self.height)
        } else {
            let root = self.root;
            self.refresh_constraints(root);
            Fit::Exact
        }
    }

    /// Hand each visible child of `branch` its assigned size, recursing into branches
    fn layout_children(&mut self, branch: NodeId) -> Fit {
        let Some(splitview) = self.branch(branch) else {
            return Fit::Exact;
        };
        let orientation = splitview.orientation();
        let orthogonal = splitview.orthogonal_size();
        let children: Vec<(NodeId, f64)> = splitview
            .views()
            .iter()
            .zip(splitview.slots())
            .filter(|(_, slot)| slot.is_visible())
            .map(|(child, slot)| (*child, slot.size()))
            .collect();

        let mut fit = Fit::Exact;
        for (child, size) in children {
            match self.node_mut(child).map(|node| &mut node.kind) {
                Some(NodeKind::Leaf(panel)) => {
                    let (width, height) = orientation.join(size, orthogonal);
                    panel.layout(width, height);
                }
                Some(NodeKind::Branch(child_view)) => {
                    fit = fit.and(child_view.layout(orthogonal, size));
                    fit = fit.and(self.layout_children(child));
                }
                None => {}
            }
        }
        fit
    }

    /// Insert `panel` at `path`. When the parent path names a leaf, that leaf
    /// is split into a branch of the orthogonal orientation first.
    pub fn add_panel(&mut self, panel: Panel, path: &[usize], sizing: Sizing) -> Result<NodeId, LayoutError> {
        if self.leaves.contains_key(panel.id()) {
            return Err(LayoutError::DuplicatePanelId(panel.id().clone()));
        }
        let Some((&index, parent_path)) = path.split_last() else {
            return Err(LayoutError::InvalidPath(path.to_vec()));
        };
        let target = self.node_at(parent_path)?;

        let branch = if self.is_branch(target) {
            target
        } else {
            if index > 1 {
                return Err(LayoutError::InvalidIndex { index, len: 1 });
            }
            if let Sizing::Split(reference) = sizing {
                if reference > 0 {
                    return Err(LayoutError::InvalidIndex {
                        index: reference,
                        len: 1,
                    });
                }
            }
            self.split_leaf(target)?
        };

        let leaf = self.insert_leaf(branch, index, panel, sizing)?;
        let root = self.root;
        self.collapse(root);
        self.check_invariants();
        let _ = self.relayout();
        Ok(leaf)
    }

    /// Replace `leaf` with a one-child branch of the orthogonal orientation
    fn split_leaf(&mut self, leaf: NodeId) -> Result<NodeId, LayoutError> {
        let (parent, index) = self
            .index_in_parent(leaf)
            .ok_or_else(|| violation("leaf without a parent"))?;
        let parent_view = self
            .branch(parent)
            .ok_or_else(|| violation("parent is not a branch"))?;
        let orientation = parent_view.orientation().orthogonal();
        let length = parent_view.orthogonal_size();
        let visible = parent_view.is_view_visible(index).unwrap_or(true);

        let (minimum, maximum) = self.bounds_along(leaf, orientation);
        let constraint = SizeConstraint::new(minimum, maximum, length);
        let priority = self.priority_of(leaf);
        let slot = if visible {
            Slot::new(constraint, priority)
        } else {
            Slot::hidden(constraint, priority, length)
        };

        let branch = self.alloc(Node {
            parent: Some(parent),
            kind: NodeKind::Branch(Splitview::from_views(
                orientation,
                self.proportional_layout,
                vec![(leaf, slot)],
            )),
        });
        if let Some(view) = self.branch_mut(parent).and_then(|sv| sv.view_mut(index)) {
            *view = branch;
        }
        self.set_parent(leaf, Some(branch));
        self.notify_parent(leaf);
        Ok(branch)
    }

    fn insert_leaf(&mut self, branch: NodeId, index: usize, panel: Panel, sizing: Sizing) -> Result<NodeId, LayoutError> {
        let splitview = self
            .branch(branch)
            .ok_or_else(|| violation("insertion target is not a branch"))?;
        let len = splitview.len();
        if index > len {
            return Err(LayoutError::InvalidIndex { index, len });
        }
        if let Sizing::Split(reference) = sizing {
            if reference >= len {
                return Err(LayoutError::InvalidIndex {
                    index: reference,
                    len,
                });
            }
        }

        let orientation = splitview.orientation();
        let constraint = panel.constraints().size_constraint(orientation, 0.0);
        let priority = panel.priority();
        let panel_id = panel.id().clone();
        let leaf = self.alloc(Node {
            parent: Some(branch),
            kind: NodeKind::Leaf(panel),
        });

        let added = match self.branch_mut(branch) {
            Some(splitview) => splitview.add_view(leaf, constraint, priority, index, sizing),
            None => Err(violation("insertion target vanished")),
        };
        if let Err(err) = added {
            self.release(leaf);
            return Err(err);
        }

        let visible = !matches!(sizing, Sizing::Invisible);
        if let Some(NodeKind::Leaf(panel)) = self.node_mut(leaf).map(|node| &mut node.kind) {
            panel.set_visible(visible);
        }
        self.leaves.insert(panel_id, leaf);
        self.notify_parent(leaf);
        self.sync_visibility(branch);
        Ok(leaf)
    }

    fn notify_parent(&mut self, leaf: NodeId) {
        let parent = self.parent_of(leaf);
        if let Some(NodeKind::Leaf(panel)) = self.node_mut(leaf).map(|node| &mut node.kind) {
            let active = panel.is_active();
            panel.update_parent(parent, active);
        }
    }

    /// Remove the leaf at `path`, collapsing any branch left with one child
    pub fn remove_panel(&mut self, path: &[usize], sizing: Sizing) -> Result<Panel, LayoutError> {
        let node = self.node_at(path)?;
        if self.is_branch(node) {
            return Err(LayoutError::InvalidPath(path.to_vec()));
        }
        self.remove_leaf(node, sizing)
    }

    pub fn remove_panel_by_id(&mut self, id: &PanelId, sizing: Sizing) -> Result<Panel, LayoutError> {
        let node = *self
            .leaves
            .get(id)
            .ok_or_else(|| LayoutError::UnknownPanel(id.clone()))?;
        self.remove_leaf(node, sizing)
    }

    fn remove_leaf(&mut self, leaf: NodeId, sizing: Sizing) -> Result<Panel, LayoutError> {
        let mut panel = self.take_leaf(leaf, sizing)?;
        panel.update_parent(None, false);
        Ok(panel)
    }

    /// Take a leaf out of the tree, leaving the panel's active flag alone
    fn take_leaf(&mut self, leaf: NodeId, sizing: Sizing) -> Result<Panel, LayoutError> {
        let (parent, index) = self
            .index_in_parent(leaf)
            .ok_or_else(|| violation("leaf without a parent"))?;
        self.branch_mut(parent)
            .ok_or_else(|| violation("parent is not a branch"))?
            .remove_view(index, sizing)?;

        let Some(Node {
            kind: NodeKind::Leaf(panel),
            ..
        }) = self.release(leaf)
        else {
            return Err(violation("removed node was not a leaf"));
        };
        self.leaves.remove(panel.id());

        self.sync_visibility(parent);
        self.collapse(parent);
        self.check_invariants();
        let _ = self.relayout();
        Ok(panel)
    }

    /// Restore the structural invariant at `branch` after a child left it
    fn collapse(&mut self, branch: NodeId) {
        let Some(splitview) = self.branch(branch) else {
            return;
        };
        let children = splitview.views().to_vec();

        match (self.parent_of(branch), children.as_slice()) {
            (None, [only]) => {
                if self.is_branch(*only) {
                    self.adopt(*only);
                }
            }
            (Some(parent), []) => {
                if let Some((_, index)) = self.index_in_parent(branch) {
                    if let Some(splitview) = self.branch_mut(parent) {
                        let _ = splitview.remove_view(index, Sizing::Distribute);
                    }
                }
                self.release(branch);
                self.collapse(parent);
            }
            (Some(parent), [only]) => {
                let only = *only;
                let Some((_, index)) = self.index_in_parent(branch) else {
                    return;
                };
                if self.is_branch(only) {
                    let entries = self
                        .branch_mut(only)
                        .map(Splitview::drain)
                        .unwrap_or_default();
                    let grandchildren: Vec<NodeId> = entries.iter().map(|(id, _)| *id).collect();
                    if let Some(splitview) = self.branch_mut(parent) {
                        let _ = splitview.replace_view(index, entries);
                    }
                    self.release(only);
                    self.release(branch);
                    for child in grandchildren {
                        self.set_parent(child, Some(parent));
                        self.notify_parent(child);
                    }
                } else {
                    if let Some(view) = self.branch_mut(parent).and_then(|sv| sv.view_mut(index)) {
                        *view = only;
                    }
                    self.release(branch);
                    self.set_parent(only, Some(parent));
                    self.notify_parent(only);
                }
                tracing::debug!("Collapsed single-child branch into its parent");
            }
            _ => {}
        }
    }

    /// Make the root take over the children of its only child branch
    fn adopt(&mut self, child: NodeId) {
        let Some(Node {
            kind: NodeKind::Branch(splitview),
            ..
        }) = self.release(child)
        else {
            return;
        };
        let orientation = splitview.orientation();
        let grandchildren = splitview.views().to_vec();
        let root = self.root;
        if let Some(node) = self.node_mut(root) {
            node.kind = NodeKind::Branch(splitview);
        }
        for id in grandchildren {
            self.set_parent(id, Some(root));
            self.notify_parent(id);
        }
        tracing::debug!("Root adopted its only branch; grid is now {:?}", orientation);
    }

    /// Hide a branch in its parent when none of its children is visible, and back
    fn sync_visibility(&mut self, branch: NodeId) {
        let mut current = branch;
        while let Some((parent, index)) = self.index_in_parent(current) {
            let any_visible = self
                .branch(current)
                .is_some_and(|sv| sv.slots().iter().any(Slot::is_visible));
            let shown = self
                .branch(parent)
                .and_then(|sv| sv.is_view_visible(index))
                .unwrap_or(false);
            if any_visible == shown {
                break;
            }
            if let Some(splitview) = self.branch_mut(parent) {
                let _ = splitview.set_view_visible(index, any_visible);
            }
            current = parent;
        }
    }

    pub fn is_visible(&self, id: &PanelId) -> Result<bool, LayoutError> {
        self.panel(id)
            .map(Panel::is_visible)
            .ok_or_else(|| LayoutError::UnknownPanel(id.clone()))
    }

    pub fn set_visible(&mut self, id: &PanelId, visible: bool) -> Result<Fit, LayoutError> {
        let leaf = *self
            .leaves
            .get(id)
            .ok_or_else(|| LayoutError::UnknownPanel(id.clone()))?;
        let (parent, index) = self
            .index_in_parent(leaf)
            .ok_or_else(|| violation("leaf without a parent"))?;
        let fit = self
            .branch_mut(parent)
            .ok_or_else(|| violation("parent is not a branch"))?
            .set_view_visible(index, visible)?;
        if let Some(NodeKind::Leaf(panel)) = self.node_mut(leaf).map(|node| &mut node.kind) {
            panel.set_visible(visible);
        }
        self.sync_visibility(parent);
        Ok(fit.and(self.relayout()))
    }

    /// Move a panel next to `reference`. The panel instance, its state, its
    /// subscriptions and its active flag travel with it. Returns `Ok(None)`
    /// when `id` and `reference` are the same panel and nothing moved.
    pub fn move_panel(
        &mut self,
        id: &PanelId,
        reference: &PanelId,
        direction: Direction,
        sizing: Sizing,
    ) -> Result<Option<NodeId>, LayoutError> {
        let target = *self
            .leaves
            .get(reference)
            .ok_or_else(|| LayoutError::UnknownPanel(reference.clone()))?;
        let node = *self
            .leaves
            .get(id)
            .ok_or_else(|| LayoutError::UnknownPanel(id.clone()))?;
        if id == reference {
            return Ok(None);
        }
        let path = self
            .location_without(node, target, direction)
            .ok_or_else(|| violation(format!("panel {} is not reachable from the root", reference)))?;
        self.check_target_without(node, &path, sizing)?;
        let panel = self.take_leaf(node, Sizing::Distribute)?;
        self.add_panel(panel, &path, sizing).map(Some)
    }

    /// Move a panel to `path`, where `path` addresses the tree as it is once
    /// the panel has been taken out. The target is checked first, so a
    /// rejected move leaves the tree untouched.
    pub fn move_panel_to(&mut self, id: &PanelId, path: &[usize], sizing: Sizing) -> Result<NodeId, LayoutError> {
        let node = *self
            .leaves
            .get(id)
            .ok_or_else(|| LayoutError::UnknownPanel(id.clone()))?;
        self.check_target_without(node, path, sizing)?;
        let panel = self.take_leaf(node, Sizing::Distribute)?;
        self.add_panel(panel, path, sizing)
    }

    /// Apply the same checks `add_panel` does, against the tree as it will
    /// look after `leaf` is taken out and its branch collapsed
    fn check_target_without(&self, leaf: NodeId, path: &[usize], sizing: Sizing) -> Result<(), LayoutError> {
        let invalid = || LayoutError::InvalidPath(path.to_vec());
        let (&index, parent_path) = path.split_last().ok_or_else(invalid)?;

        let mut target = self.root_without(leaf);
        for &step in parent_path {
            target = *self.children_without(target, leaf).get(step).ok_or_else(invalid)?;
        }

        let len = if self.is_branch(target) {
            self.children_without(target, leaf).len()
        } else {
            1
        };
        if index > len {
            return Err(LayoutError::InvalidIndex { index, len });
        }
        if let Sizing::Split(reference) = sizing {
            if reference >= len {
                return Err(LayoutError::InvalidIndex {
                    index: reference,
                    len,
                });
            }
        }
        Ok(())
    }

    /// What `location_of(target, direction)` returns once `leaf` is taken out
    fn location_without(&self, leaf: NodeId, target: NodeId, direction: Direction) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let parent = self.find_without(self.root_without(leaf), leaf, target, &mut path)?;
        let orientation = self
            .branch(parent)
            .map(Splitview::orientation)
            .unwrap_or_default();
        let after = usize::from(direction.is_after());
        if direction.orientation() == orientation {
            if let Some(last) = path.last_mut() {
                *last += after;
            }
        } else {
            path.push(after);
        }
        Some(path)
    }

    /// Depth-first search for `target` below `id` without `leaf`; fills
    /// `path` and returns the branch holding `target`
    fn find_without(&self, id: NodeId, leaf: NodeId, target: NodeId, path: &mut Vec<usize>) -> Option<NodeId> {
        for (index, child) in self.children_without(id, leaf).into_iter().enumerate() {
            path.push(index);
            if child == target {
                return Some(id);
            }
            if self.is_branch(child) {
                if let Some(parent) = self.find_without(child, leaf, target, path) {
                    return Some(parent);
                }
            }
            path.pop();
        }
        None
    }

    /// Children the leaf's parent keeps once the leaf is gone
    fn siblings_of(&self, leaf: NodeId) -> Option<(NodeId, Vec<NodeId>)> {
        let (parent, _) = self.index_in_parent(leaf)?;
        let remaining = self
            .branch(parent)?
            .views()
            .iter()
            .copied()
            .filter(|child| *child != leaf)
            .collect();
        Some((parent, remaining))
    }

    /// Root of the tree once `leaf` is removed; a root left with one branch adopts it
    fn root_without(&self, leaf: NodeId) -> NodeId {
        match self.siblings_of(leaf) {
            Some((parent, remaining)) if parent == self.root => match remaining.as_slice() {
                [only] if self.is_branch(*only) => *only,
                _ => self.root,
            },
            _ => self.root,
        }
    }

    /// Children of `id` once `leaf` is removed and its branch collapsed
    fn children_without(&self, id: NodeId, leaf: NodeId) -> Vec<NodeId> {
        let children = self
            .branch(id)
            .map(|splitview| splitview.views().to_vec())
            .unwrap_or_default();
        let Some((parent, remaining)) = self.siblings_of(leaf) else {
            return children;
        };
        if id == parent {
            return remaining;
        }
        let collapses = parent != self.root && remaining.len() == 1;
        if !collapses || self.parent_of(parent) != Some(id) {
            return children;
        }

        let only = remaining[0];
        let mut out = Vec::with_capacity(children.len());
        for child in children {
            if child != parent {
                out.push(child);
            } else if let Some(splitview) = self.branch(only) {
                out.extend(splitview.views().iter().copied());
            } else {
                out.push(only);
            }
        }
        out
    }

    /// Grow or shrink the node at `path` along its parent's axis
    pub fn resize_node(&mut self, path: &[usize], delta: f64) -> Result<f64, LayoutError> {
        let node = self.node_at(path)?;
        let (parent, index) = self
            .index_in_parent(node)
            .ok_or_else(|| LayoutError::InvalidPath(path.to_vec()))?;
        let applied = self
            .branch_mut(parent)
            .ok_or_else(|| violation("parent is not a branch"))?
            .resize_view(index, delta)?;
        let _ = self.layout_children(parent);
        Ok(applied)
    }

    /// Flip every branch, turning rows into columns and back
    pub fn set_orientation(&mut self, orientation: Orientation) {
        if orientation == self.orientation() {
            return;
        }
        for node in self.nodes.iter_mut().flatten() {
            if let NodeKind::Branch(splitview) = &mut node.kind {
                let flipped = splitview.orientation().orthogonal();
                splitview.set_orientation(flipped);
            }
        }
        let _ = self.relayout();
    }

    /// Start dragging sash `sash` of the branch at `branch_path`
    pub fn begin_drag(&mut self, branch_path: &[usize], sash: usize, position: f64) -> Result<(), LayoutError> {
        let branch = self.node_at(branch_path)?;
        if !self.is_branch(branch) {
            return Err(LayoutError::InvalidPath(branch_path.to_vec()));
        }
        self.cancel_drag();
        if let Some(splitview) = self.branch_mut(branch) {
            splitview.begin_drag(sash, position)?;
        }
        self.dragging = Some(branch);
        Ok(())
    }

    pub fn drag_to(&mut self, position: f64) -> f64 {
        let Some(branch) = self.dragging else {
            return 0.0;
        };
        let applied = self
            .branch_mut(branch)
            .map_or(0.0, |splitview| splitview.drag_to(position));
        let _ = self.layout_children(branch);
        applied
    }

    pub fn flush_frame(&mut self) -> bool {
        let Some(branch) = self.dragging else {
            return false;
        };
        self.branch_mut(branch)
            .is_some_and(|splitview| splitview.flush_frame())
    }

    pub fn end_drag(&mut self) -> bool {
        let Some(branch) = self.dragging.take() else {
            return false;
        };
        self.branch_mut(branch)
            .is_some_and(|splitview| splitview.end_drag())
    }

    pub fn cancel_drag(&mut self) -> bool {
        let Some(branch) = self.dragging.take() else {
            return false;
        };
        let cancelled = self
            .branch_mut(branch)
            .is_some_and(|splitview| splitview.cancel_drag());
        let _ = self.layout_children(branch);
        cancelled
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
            .and_then(|branch| self.branch(branch))
            .is_some_and(Splitview::is_dragging)
    }

    /// Rectangles of all visible panels
    pub fn panel_rects(&self) -> HashMap<PanelId, Rect> {
        let mut out = HashMap::new();
        self.collect_rects(self.root, Rect::new(0.0, 0.0, self.width, self.height), &mut out);
        out
    }

    fn collect_rects(&self, id: NodeId, rect: Rect, out: &mut HashMap<PanelId, Rect>) {
        match self.node(id).map(Node::kind) {
            Some(NodeKind::Leaf(panel)) => {
                out.insert(panel.id().clone(), rect);
            }
            Some(NodeKind::Branch(splitview)) => {
                let children = splitview.views().iter().zip(splitview.slots());
                for ((child, slot), offset) in children.zip(splitview.offsets()) {
                    if !slot.is_visible() {
                        continue;
                    }
                    let child_rect = match splitview.orientation() {
                        Orientation::Horizontal => {
                            Rect::new(rect.x + offset, rect.y, slot.size(), rect.height)
                        }
                        Orientation::Vertical => {
                            Rect::new(rect.x, rect.y + offset, rect.width, slot.size())
                        }
                    };
                    self.collect_rects(*child, child_rect, out);
                }
            }
            None => {}
        }
    }

    /// Panel under the point, if any
    pub fn panel_at(&self, x: f64, y: f64) -> Option<PanelId> {
        self.panel_rects()
            .into_iter()
            .find(|(_, rect)| rect.contains(x, y))
            .map(|(id, _)| id)
    }

    /// Take every panel out, leaving an empty root of the same orientation
    pub fn clear(&mut self) -> Vec<Panel> {
        let orientation = self.orientation();
        let order = self.leaf_nodes();
        let mut nodes = std::mem::take(&mut self.nodes);
        let panels = order
            .into_iter()
            .filter_map(|id| match nodes.get_mut(id.0).and_then(Option::take) {
                Some(Node {
                    kind: NodeKind::Leaf(panel),
                    ..
                }) => Some(panel),
                _ => None,
            })
            .collect();

        self.nodes = vec![Some(Node {
            parent: None,
            kind: NodeKind::Branch(Splitview::new(orientation, self.proportional_layout)),
        })];
        self.root = NodeId(0);
        self.free.clear();
        self.leaves.clear();
        self.dragging = None;
        let _ = self.relayout();
        panels
    }

    /// Check the structural invariants of the tree
    pub fn validate(&self) -> Result<(), LayoutError> {
        let root = self
            .node(self.root)
            .ok_or_else(|| violation("missing root"))?;
        if root.parent.is_some() {
            return Err(violation("root has a parent"));
        }
        if root.as_branch().is_none() {
            return Err(violation("root is not a branch"));
        }
        let mut leaves = 0;
        self.validate_branch(self.root, &mut leaves)?;
        if leaves != self.leaves.len() {
            return Err(violation(format!(
                "{} leaves in the tree but {} indexed",
                leaves,
                self.leaves.len()
            )));
        }
        Ok(())
    }

    fn validate_branch(&self, branch: NodeId, leaves: &mut usize) -> Result<(), LayoutError> {
        let splitview = self
            .branch(branch)
            .ok_or_else(|| violation(format!("{:?} is not a branch", branch)))?;
        let is_root = branch == self.root;
        if !is_root && splitview.len() < 2 {
            return Err(violation(format!(
                "branch {:?} has {} children",
                branch,
                splitview.len()
            )));
        }
        if is_root && splitview.len() == 1 && splitview.views().iter().any(|c| self.is_branch(*c)) {
            return Err(violation("root has a single branch child"));
        }

        for child in splitview.views() {
            let node = self
                .node(*child)
                .ok_or_else(|| violation(format!("dangling child {:?}", child)))?;
            if node.parent != Some(branch) {
                return Err(violation(format!("stale parent link on {:?}", child)));
            }
            match &node.kind {
                NodeKind::Leaf(panel) => {
                    if self.leaves.get(panel.id()) != Some(child) {
                        return Err(violation(format!("panel {} is not indexed", panel.id())));
                    }
                    *leaves += 1;
                }
                NodeKind::Branch(child_view) => {
                    if child_view.orientation() != splitview.orientation().orthogonal() {
                        return Err(violation(format!(
                            "branch {:?} does not alternate orientation",
                            child
                        )));
                    }
                    self.validate_branch(*child, leaves)?;
                }
            }
        }
        Ok(())
    }

    /// Repair parent links, collapse degenerate branches and rebuild the panel index
    pub fn normalize(&mut self) {
        let root = self.root;
        self.relink(root, None);

        let mut branches = Vec::new();
        self.collect_branches(root, &mut branches);
        for branch in branches.into_iter().rev() {
            if branch != root && self.node(branch).is_some() {
                self.collapse(branch);
            }
        }
        self.collapse(root);

        self.leaves = self
            .leaf_nodes()
            .into_iter()
            .filter_map(|id| Some((self.node(id)?.as_panel()?.id().clone(), id)))
            .collect();
    }

    fn relink(&mut self, id: NodeId, parent: Option<NodeId>) {
        self.set_parent(id, parent);
        let children = self.branch(id).map(|sv| sv.views().to_vec()).unwrap_or_default();
        for child in children {
            self.relink(child, Some(id));
        }
    }

    fn collect_branches(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if let Some(splitview) = self.branch(id) {
            out.push(id);
            for child in splitview.views() {
                self.collect_branches(*child, out);
            }
        }
    }

    fn check_invariants(&mut self) {
        if let Err(err) = self.validate() {
            if cfg!(debug_assertions) {
                panic!("{}", err);
            }
            tracing::warn!("Repairing layout tree: {}", err);
            self.normalize();
        }
    }

    /// Build a grid from an already validated tree
    pub(crate) fn assemble(
        root_view: Splitview<NodeId>,
        nodes: Vec<Option<Node>>,
        proportional_layout: bool,
    ) -> Self {
        let mut grid = Self {
            nodes,
            free: Vec::new(),
            root: NodeId(0),
            leaves: HashMap::new(),
            width: 0.0,
            height: 0.0,
            proportional_layout,
            laid_out: false,
            dragging: None,
        };
        grid.nodes[0] = Some(Node {
            parent: None,
            kind: NodeKind::Branch(root_view),
        });
        grid.normalize();
        let leaves = grid.leaf_nodes();
        for leaf in leaves {
            grid.notify_parent(leaf);
        }
        grid
    }
}

/// Builder used while restoring a serialized tree off to the side
#[derive(Debug)]
pub(crate) struct NodeArena {
    nodes: Vec<Option<Node>>,
}

impl NodeArena {
    pub(crate) fn new() -> Self {
        // Slot 0 is reserved for the root
        Self { nodes: vec![None] }
    }

    pub(crate) fn leaf(&mut self, panel: Panel) -> NodeId {
        self.push(NodeKind::Leaf(panel))
    }

    pub(crate) fn branch(&mut self, splitview: Splitview<NodeId>) -> NodeId {
        self.push(NodeKind::Branch(splitview))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Some(Node { parent: None, kind }));
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn finish(self, root_view: Splitview<NodeId>, proportional_layout: bool) -> Gridview {
        Gridview::assemble(root_view, self.nodes, proportional_layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{EmptyContent, PanelConstraints, PanelOptions};

    fn panel(id: &str) -> Panel {
        Panel::new(PanelOptions::new(id, "default"), Box::new(EmptyContent))
    }

    fn bounded(id: &str, minimum: f64) -> Panel {
        Panel::new(
            PanelOptions::new(id, "default")
                .with_constraints(PanelConstraints::uniform(minimum, None)),
            Box::new(EmptyContent),
        )
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn assert_rect(actual: Rect, expected: Rect) {
        assert!(
            close(actual.x, expected.x)
                && close(actual.y, expected.y)
                && close(actual.width, expected.width)
                && close(actual.height, expected.height),
            "{actual:?} vs {expected:?}"
        );
    }

    /// Row of a | (b over c)
    fn sample() -> Gridview {
        let mut grid = Gridview::new(Orientation::Horizontal, true);
        grid.layout(400.0, 300.0);
        grid.add_panel(panel("a"), &[0], Sizing::Distribute).unwrap();
        grid.add_panel(panel("b"), &[1], Sizing::Distribute).unwrap();
        grid.add_panel(panel("c"), &[1, 1], Sizing::Distribute).unwrap();
        grid
    }

    #[test]
    fn adding_to_a_leaf_splits_it() {
        let grid = sample();
        assert!(grid.validate().is_ok());
        assert_eq!(grid.panel_ids(), vec![PanelId::from("a"), "b".into(), "c".into()]);
        assert_eq!(grid.path_of_panel(&"c".into()).unwrap(), vec![1, 1]);

        let branch = grid.node_at(&[1]).unwrap();
        assert_eq!(
            grid.branch(branch).map(Splitview::orientation),
            Some(Orientation::Vertical)
        );

        let rects = grid.panel_rects();
        assert_rect(rects[&PanelId::from("a")], Rect::new(0.0, 0.0, 200.0, 300.0));
        assert_rect(rects[&PanelId::from("b")], Rect::new(200.0, 0.0, 200.0, 150.0));
        assert_rect(rects[&PanelId::from("c")], Rect::new(200.0, 150.0, 200.0, 150.0));
    }

    #[test]
    fn panels_receive_their_dimensions() {
        let grid = sample();
        let c = grid.panel(&"c".into()).unwrap();
        assert!(close(c.width(), 200.0));
        assert!(close(c.height(), 150.0));
    }

    #[test]
    fn removing_leaves_a_single_child_collapses_the_branch() {
        let mut grid = sample();
        let removed = grid.remove_panel(&[1, 0], Sizing::Distribute).unwrap();
        assert_eq!(removed.id().as_str(), "b");

        assert!(grid.validate().is_ok());
        assert_eq!(grid.path_of_panel(&"c".into()).unwrap(), vec![1]);
        let rects = grid.panel_rects();
        assert_rect(rects[&PanelId::from("c")], Rect::new(200.0, 0.0, 200.0, 300.0));
    }

    #[test]
    fn nested_branch_splices_into_grandparent() {
        // a | (b over (c | d)); removing b leaves (c | d) directly in the row
        let mut grid = sample();
        grid.add_panel(panel("d"), &[1, 1, 1], Sizing::Distribute).unwrap();
        assert_eq!(grid.path_of_panel(&"d".into()).unwrap(), vec![1, 1, 1]);

        grid.remove_panel_by_id(&"b".into(), Sizing::Distribute).unwrap();
        assert!(grid.validate().is_ok());
        assert_eq!(grid.path_of_panel(&"c".into()).unwrap(), vec![1]);
        assert_eq!(grid.path_of_panel(&"d".into()).unwrap(), vec![2]);

        let rects = grid.panel_rects();
        assert!(close(rects[&PanelId::from("c")].width, 100.0));
        assert!(close(rects[&PanelId::from("d")].width, 100.0));
        assert!(close(rects[&PanelId::from("d")].height, 300.0));
    }

    #[test]
    fn root_adopts_single_branch_child() {
        // a | (b over c); removing a leaves the root with one branch
        let mut grid = sample();
        grid.remove_panel_by_id(&"a".into(), Sizing::Distribute).unwrap();
        assert!(grid.validate().is_ok());
        assert_eq!(grid.orientation(), Orientation::Vertical);
        assert_eq!(grid.path_of_panel(&"b".into()).unwrap(), vec![0]);
        assert_eq!(grid.path_of_panel(&"c".into()).unwrap(), vec![1]);

        let rects = grid.panel_rects();
        assert_rect(rects[&PanelId::from("b")], Rect::new(0.0, 0.0, 400.0, 150.0));
    }

    #[test]
    fn removing_every_panel_leaves_an_empty_root() {
        let mut grid = sample();
        for id in ["a", "b", "c"] {
            grid.remove_panel_by_id(&id.into(), Sizing::Distribute).unwrap();
        }
        assert!(grid.is_empty());
        assert!(grid.validate().is_ok());
        assert!(grid.panel_rects().is_empty());
    }

    #[test]
    fn duplicate_ids_and_bad_paths_are_rejected() {
        let mut grid = sample();
        assert!(matches!(
            grid.add_panel(panel("a"), &[0], Sizing::Distribute),
            Err(LayoutError::DuplicatePanelId(_))
        ));
        assert!(matches!(
            grid.add_panel(panel("z"), &[7, 0], Sizing::Distribute),
            Err(LayoutError::InvalidPath(_))
        ));
        assert!(matches!(
            grid.add_panel(panel("z"), &[0, 2], Sizing::Distribute),
            Err(LayoutError::InvalidIndex { index: 2, len: 1 })
        ));
        assert!(grid.remove_panel(&[1], Sizing::Distribute).is_err());
        assert_eq!(grid.len(), 3);
        assert!(grid.validate().is_ok());
    }

    #[test]
    fn direction_placement() {
        let mut grid = sample();
        assert_eq!(grid.location_of(&"a".into(), Direction::Left).unwrap(), vec![0]);
        assert_eq!(grid.location_of(&"a".into(), Direction::Below).unwrap(), vec![0, 1]);
        assert_eq!(grid.location_of(&"b".into(), Direction::Below).unwrap(), vec![1, 1]);
        assert_eq!(grid.location_of(&"b".into(), Direction::Right).unwrap(), vec![1, 0, 1]);

        let path = grid.location_of(&"a".into(), Direction::Above).unwrap();
        grid.add_panel(panel("top"), &path, Sizing::Distribute).unwrap();
        assert_eq!(grid.path_of_panel(&"top".into()).unwrap(), vec![0, 0]);
        assert_eq!(grid.path_of_panel(&"a".into()).unwrap(), vec![0, 1]);
    }

    #[test]
    fn move_keeps_the_panel_instance() {
        let mut grid = sample();
        grid.panel_mut(&"a".into())
            .unwrap()
            .api_mut()
            .set_state_key("k", serde_json::json!(1));

        grid.move_panel(&"a".into(), &"c".into(), Direction::Right, Sizing::Distribute)
            .unwrap();
        assert!(grid.validate().is_ok());
        assert_eq!(grid.len(), 3);
        let moved = grid.panel(&"a".into()).unwrap();
        assert_eq!(moved.api().state_key("k"), Some(&serde_json::json!(1)));

        let rects = grid.panel_rects();
        let a = rects[&PanelId::from("a")];
        let c = rects[&PanelId::from("c")];
        assert!(close(a.y, c.y));
        assert!(a.x > c.x);
    }

    #[test]
    fn move_by_reference_checks_sizing_first() {
        let mut grid = sample();
        assert!(matches!(
            grid.move_panel(&"a".into(), &"c".into(), Direction::Below, Sizing::Split(5)),
            Err(LayoutError::InvalidIndex { index: 5, len: 2 })
        ));
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.orientation(), Orientation::Horizontal);
        assert_eq!(grid.path_of_panel(&"a".into()).unwrap(), vec![0]);
        assert_eq!(grid.path_of_panel(&"c".into()).unwrap(), vec![1, 1]);

        grid.move_panel(&"a".into(), &"c".into(), Direction::Below, Sizing::Split(1))
            .unwrap();
        assert_eq!(grid.orientation(), Orientation::Vertical);
        assert_eq!(grid.path_of_panel(&"a".into()).unwrap(), vec![2]);
        assert!(grid.validate().is_ok());
    }

    #[test]
    fn move_by_reference_follows_a_collapsed_branch() {
        let mut grid = sample();
        grid.move_panel(&"b".into(), &"c".into(), Direction::Right, Sizing::Distribute)
            .unwrap();
        assert_eq!(grid.path_of_panel(&"a".into()).unwrap(), vec![0]);
        assert_eq!(grid.path_of_panel(&"c".into()).unwrap(), vec![1]);
        assert_eq!(grid.path_of_panel(&"b".into()).unwrap(), vec![2]);
    }

    #[test]
    fn hiding_every_child_hides_the_branch() {
        let mut grid = sample();
        grid.set_visible(&"b".into(), false).unwrap();
        grid.set_visible(&"c".into(), false).unwrap();
        let rects = grid.panel_rects();
        assert_eq!(rects.len(), 1);
        assert_rect(rects[&PanelId::from("a")], Rect::new(0.0, 0.0, 400.0, 300.0));

        grid.set_visible(&"c".into(), true).unwrap();
        let rects = grid.panel_rects();
        assert!(close(rects[&PanelId::from("a")].width, 200.0));
        assert!(close(rects[&PanelId::from("c")].height, 300.0));
        assert!(!grid.is_visible(&"b".into()).unwrap());
    }

    #[test]
    fn branch_bounds_derive_from_children() {
        let mut grid = Gridview::new(Orientation::Horizontal, true);
        grid.layout(400.0, 300.0);
        grid.add_panel(bounded("a", 50.0), &[0], Sizing::Distribute).unwrap();
        grid.add_panel(bounded("b", 60.0), &[1], Sizing::Distribute).unwrap();
        grid.add_panel(bounded("c", 70.0), &[1, 1], Sizing::Distribute).unwrap();

        // across the column the widest minimum wins, along it minimums add up
        assert!(close(grid.minimum_width(), 50.0 + 70.0));
        assert!(close(grid.minimum_height(), 60.0 + 70.0));
    }

    #[test]
    fn drag_on_nested_branch_resizes_children() {
        let mut grid = sample();
        grid.begin_drag(&[1], 0, 150.0).unwrap();
        assert!(grid.is_dragging());
        grid.drag_to(200.0);
        let b = grid.panel(&"b".into()).unwrap();
        assert!(close(b.height(), 200.0));

        assert!(grid.cancel_drag());
        let b = grid.panel(&"b".into()).unwrap();
        assert!(close(b.height(), 150.0));
        assert!(!grid.is_dragging());
    }

    #[test]
    fn flipping_orientation_swaps_axes() {
        let mut grid = sample();
        grid.set_orientation(Orientation::Vertical);
        assert!(grid.validate().is_ok());
        let rects = grid.panel_rects();
        assert_rect(rects[&PanelId::from("a")], Rect::new(0.0, 0.0, 400.0, 150.0));
        assert_rect(rects[&PanelId::from("c")], Rect::new(200.0, 150.0, 200.0, 150.0));
    }

    #[test]
    fn clear_returns_panels_in_order() {
        let mut grid = sample();
        let panels = grid.clear();
        let ids: Vec<&str> = panels.iter().map(|p| p.id().as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(grid.is_empty());
        assert!(grid.validate().is_ok());
    }

    #[test]
    fn panel_at_hit_tests_rects() {
        let grid = sample();
        assert_eq!(grid.panel_at(10.0, 10.0), Some(PanelId::from("a")));
        assert_eq!(grid.panel_at(390.0, 290.0), Some(PanelId::from("c")));
        assert_eq!(grid.panel_at(500.0, 10.0), None);
    }
}
