// ABOUTME: Serialized shapes for grids and splitviews, and restoring live layouts from them.
// ABOUTME: Restores build the whole tree off to the side and only hand it over once valid.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use splitgrid_core::{Orientation, Parameters};

use crate::api::State;
use crate::constraint::{LayoutPriority, SizeConstraint};
use crate::distributor::Slot;
use crate::error::LayoutError;
use crate::gridview::{Gridview, NodeArena, NodeId, NodeKind};
use crate::panel::{ComponentRegistry, Panel, PanelConstraints, PanelId, PanelOptions};
use crate::paneview_component::DEFAULT_HEADER_SIZE;
use crate::splitview::Splitview;

fn default_true() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

fn is_normal(priority: &LayoutPriority) -> bool {
    *priority == LayoutPriority::Normal
}

/// Everything needed to recreate one panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelState {
    pub id: PanelId,
    pub component_name: String,
    #[serde(default, skip_serializing_if = "Parameters::is_empty")]
    pub params: Parameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
    #[serde(default, skip_serializing_if = "PanelConstraints::is_unbounded")]
    pub constraints: PanelConstraints,
    #[serde(default, skip_serializing_if = "is_normal")]
    pub priority: LayoutPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SerializedNode {
    Leaf {
        data: PanelState,
        size: f64,
        #[serde(default = "default_true", skip_serializing_if = "is_true")]
        visible: bool,
    },
    Branch {
        orientation: Orientation,
        size: f64,
        data: Vec<SerializedNode>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedGridview {
    pub root: SerializedNode,
    pub width: f64,
    pub height: f64,
    pub orientation: Orientation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_panel: Option<PanelId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedView {
    pub size: f64,
    pub data: PanelState,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedSplitview {
    pub orientation: Orientation,
    pub size: f64,
    pub views: Vec<SerializedView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_view: Option<PanelId>,
}

fn default_header_size() -> f64 {
    DEFAULT_HEADER_SIZE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedPane {
    pub size: f64,
    pub data: PanelState,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub expanded: bool,
    #[serde(default = "default_header_size")]
    pub header_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expanded_size: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedPaneview {
    pub size: f64,
    pub views: Vec<SerializedPane>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_view: Option<PanelId>,
}

macro_rules! json_conversions {
    ($ty:ty) => {
        impl $ty {
            pub fn to_value(&self) -> Result<Value, LayoutError> {
                Ok(serde_json::to_value(self)?)
            }

            pub fn from_value(value: Value) -> Result<Self, LayoutError> {
                Ok(serde_json::from_value(value)?)
            }

            pub fn to_json_string(&self) -> Result<String, LayoutError> {
                Ok(serde_json::to_string_pretty(self)?)
            }

            pub fn from_json_str(content: &str) -> Result<Self, LayoutError> {
                Ok(serde_json::from_str(content)?)
            }
        }
    };
}

json_conversions!(SerializedGridview);
json_conversions!(SerializedSplitview);
json_conversions!(SerializedPaneview);

pub(crate) fn check_size(size: f64) -> Result<f64, LayoutError> {
    if size.is_finite() && size >= 0.0 {
        Ok(size)
    } else {
        Err(LayoutError::InvalidState(format!("invalid size {}", size)))
    }
}

/// Recreate a panel through the registry, restoring its state and view data
pub(crate) fn restore_panel(data: &PanelState, registry: &ComponentRegistry) -> Result<Panel, LayoutError> {
    let content = registry.create(&data.component_name)?;
    let options = PanelOptions::new(data.id.clone(), data.component_name.clone())
        .with_params(data.params.clone())
        .with_constraints(data.constraints)
        .with_priority(data.priority);
    let mut panel = Panel::new(options, content);
    if let Some(state) = &data.state {
        panel.api_mut().set_state(state.clone());
    }
    if let Some(view) = &data.view {
        panel.restore_view(view);
    }
    Ok(panel)
}

/// Slot for a restored panel along `orientation`
pub(crate) fn restored_slot(panel: &Panel, orientation: Orientation, size: f64, visible: bool) -> Slot {
    let constraint = panel.constraints().size_constraint(orientation, size);
    if visible {
        Slot::new(constraint, panel.priority())
    } else {
        Slot::hidden(constraint, panel.priority(), size)
    }
}

impl Gridview {
    pub fn to_serialized(&self) -> SerializedGridview {
        let root = self.root();
        let size = self.branch(root).map_or(0.0, Splitview::orthogonal_size);
        SerializedGridview {
            root: self.serialize_node(root, size, true),
            width: self.width(),
            height: self.height(),
            orientation: self.orientation(),
            active_panel: None,
        }
    }

    fn serialize_node(&self, id: NodeId, size: f64, visible: bool) -> SerializedNode {
        match self.node(id).map(|node| node.kind()) {
            Some(NodeKind::Leaf(panel)) => SerializedNode::Leaf {
                data: panel.to_json(),
                size,
                visible,
            },
            Some(NodeKind::Branch(splitview)) => SerializedNode::Branch {
                orientation: splitview.orientation(),
                size,
                data: splitview
                    .views()
                    .iter()
                    .zip(splitview.slots())
                    .map(|(child, slot)| {
                        let size = if slot.is_visible() {
                            slot.size()
                        } else {
                            slot.cached_size()
                        };
                        self.serialize_node(*child, size, slot.is_visible())
                    })
                    .collect(),
            },
            None => SerializedNode::Branch {
                orientation: Orientation::default(),
                size,
                data: Vec::new(),
            },
        }
    }

    /// Build a grid from serialized state and lay it out at the stored dimensions.
    ///
    /// Nothing is returned unless the whole tree is valid: orientation must
    /// alternate, ids must be unique and every component must be registered.
    pub fn from_serialized(
        data: &SerializedGridview,
        registry: &ComponentRegistry,
        proportional_layout: bool,
    ) -> Result<Self, LayoutError> {
        let SerializedNode::Branch {
            orientation,
            size,
            data: children,
        } = &data.root
        else {
            return Err(LayoutError::InvalidState("root must be a branch".to_string()));
        };
        if *orientation != data.orientation {
            return Err(LayoutError::InvalidState(format!(
                "root orientation {:?} does not match grid orientation {:?}",
                orientation, data.orientation
            )));
        }
        check_size(*size)?;
        check_size(data.width)?;
        check_size(data.height)?;
        if let [SerializedNode::Branch { .. }] = children.as_slice() {
            return Err(LayoutError::InvalidState(
                "root holds a single branch".to_string(),
            ));
        }

        let mut builder = TreeBuilder {
            arena: NodeArena::new(),
            registry,
            proportional_layout,
            seen: HashSet::new(),
        };
        let entries = children
            .iter()
            .map(|child| builder.build(child, *orientation))
            .collect::<Result<Vec<_>, _>>()?;
        let root_view = Splitview::from_views(*orientation, proportional_layout, entries);
        let mut grid = builder.arena.finish(root_view, proportional_layout);
        grid.validate()?;

        let _ = grid.layout(data.width, data.height);
        tracing::debug!("Restored grid with {} panels", grid.len());
        Ok(grid)
    }
}

struct TreeBuilder<'a> {
    arena: NodeArena,
    registry: &'a ComponentRegistry,
    proportional_layout: bool,
    seen: HashSet<PanelId>,
}

impl TreeBuilder<'_> {
    fn build(&mut self, node: &SerializedNode, parent_orientation: Orientation) -> Result<(NodeId, Slot), LayoutError> {
        match node {
            SerializedNode::Leaf {
                data,
                size,
                visible,
            } => {
                let size = check_size(*size)?;
                if !self.seen.insert(data.id.clone()) {
                    return Err(LayoutError::DuplicatePanelId(data.id.clone()));
                }
                let mut panel = restore_panel(data, self.registry)?;
                panel.set_visible(*visible);
                let slot = restored_slot(&panel, parent_orientation, size, *visible);
                Ok((self.arena.leaf(panel), slot))
            }
            SerializedNode::Branch {
                orientation,
                size,
                data: children,
            } => {
                let size = check_size(*size)?;
                if *orientation != parent_orientation.orthogonal() {
                    return Err(LayoutError::InvalidState(format!(
                        "{:?} branch inside a {:?} branch",
                        orientation, parent_orientation
                    )));
                }
                if children.len() < 2 {
                    return Err(LayoutError::InvalidState(format!(
                        "branch with {} children",
                        children.len()
                    )));
                }
                let entries = children
                    .iter()
                    .map(|child| self.build(child, *orientation))
                    .collect::<Result<Vec<_>, _>>()?;
                let visible = entries.iter().any(|(_, slot)| slot.is_visible());
                let splitview = Splitview::from_views(*orientation, self.proportional_layout, entries);

                let constraint = SizeConstraint::unbounded(size);
                let slot = if visible {
                    Slot::new(constraint, LayoutPriority::Normal)
                } else {
                    Slot::hidden(constraint, LayoutPriority::Normal, size)
                };
                Ok((self.arena.branch(splitview), slot))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{EmptyContent, PanelContent};
    use crate::sizing::Sizing;
    use serde_json::json;

    struct Remembering(Option<Value>);

    impl PanelContent for Remembering {
        fn to_json(&self) -> Option<Value> {
            self.0.clone()
        }
        fn restore(&mut self, view: &Value) {
            self.0 = Some(view.clone());
        }
    }

    fn registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry.register("default", || Box::new(EmptyContent));
        registry.register("remembering", || Box::new(Remembering(None)));
        registry
    }

    fn panel(id: &str) -> Panel {
        Panel::new(PanelOptions::new(id, "default"), Box::new(EmptyContent))
    }

    fn sample() -> Gridview {
        let mut grid = Gridview::new(Orientation::Horizontal, true);
        grid.layout(400.0, 300.0);
        grid.add_panel(panel("a"), &[0], Sizing::Distribute).unwrap();
        grid.add_panel(panel("b"), &[1], Sizing::Distribute).unwrap();
        grid.add_panel(panel("c"), &[1, 1], Sizing::Distribute).unwrap();
        grid
    }

    fn leaf(id: &str, component: &str, size: f64) -> Value {
        json!({"type": "leaf", "data": {"id": id, "componentName": component}, "size": size})
    }

    #[test]
    fn json_shape() {
        let value = sample().to_serialized().to_value().unwrap();
        assert_eq!(value["orientation"], "horizontal");
        assert_eq!(value["width"], 400.0);
        assert_eq!(value["root"]["type"], "branch");
        assert_eq!(value["root"]["size"], 300.0);
        assert_eq!(value["root"]["data"][0]["type"], "leaf");
        assert_eq!(value["root"]["data"][0]["data"]["componentName"], "default");
        assert_eq!(value["root"]["data"][1]["orientation"], "vertical");
        assert!(value["root"]["data"][0].get("visible").is_none());
    }

    #[test]
    fn round_trip_restores_structure_and_geometry() {
        let grid = sample();
        let json = grid.to_serialized().to_json_string().unwrap();

        let restored = Gridview::from_serialized(
            &SerializedGridview::from_json_str(&json).unwrap(),
            &registry(),
            true,
        )
        .unwrap();
        assert!(restored.validate().is_ok());
        assert_eq!(restored.panel_ids(), grid.panel_ids());
        assert_eq!(restored.orientation(), grid.orientation());

        let before = grid.panel_rects();
        for (id, rect) in restored.panel_rects() {
            let expected = before[&id];
            assert!((rect.x - expected.x).abs() < 1e-6);
            assert!((rect.y - expected.y).abs() < 1e-6);
            assert!((rect.width - expected.width).abs() < 1e-6);
            assert!((rect.height - expected.height).abs() < 1e-6);
        }
    }

    #[test]
    fn params_state_and_view_survive() {
        let mut grid = Gridview::new(Orientation::Vertical, true);
        grid.layout(100.0, 100.0);
        let content = Box::new(Remembering(Some(json!({"scroll": 3}))));
        let mut p = Panel::new(
            PanelOptions::new("p", "remembering")
                .with_params(Parameters::new().with("title", "Logs"))
                .with_priority(LayoutPriority::High),
            content,
        );
        p.api_mut().set_state_key("expanded", json!(true));
        grid.add_panel(p, &[0], Sizing::Distribute).unwrap();
        grid.add_panel(panel("q"), &[1], Sizing::Distribute).unwrap();

        let restored = Gridview::from_serialized(&grid.to_serialized(), &registry(), true).unwrap();
        let p = restored.panel(&"p".into()).unwrap();
        assert_eq!(p.params().get("title"), Some(&json!("Logs")));
        assert_eq!(p.api().state_key("expanded"), Some(&json!(true)));
        assert_eq!(p.priority(), LayoutPriority::High);
        assert_eq!(p.content().to_json(), Some(json!({"scroll": 3})));
    }

    #[test]
    fn hidden_panels_keep_their_size() {
        let mut grid = sample();
        grid.set_visible(&"b".into(), false).unwrap();
        let data = grid.to_serialized();
        let value = data.to_value().unwrap();
        assert_eq!(value["root"]["data"][1]["data"][0]["visible"], false);
        assert_eq!(value["root"]["data"][1]["data"][0]["size"], 150.0);

        let mut restored = Gridview::from_serialized(&data, &registry(), true).unwrap();
        assert!(!restored.is_visible(&"b".into()).unwrap());
        restored.set_visible(&"b".into(), true).unwrap();
        let b = restored.panel(&"b".into()).unwrap();
        assert!((b.height() - 150.0).abs() < 1e-6);
    }

    fn grid_json(root: Value) -> SerializedGridview {
        SerializedGridview::from_value(json!({
            "root": root,
            "width": 200.0,
            "height": 100.0,
            "orientation": "horizontal"
        }))
        .unwrap()
    }

    #[test]
    fn unknown_component_is_rejected() {
        let data = grid_json(json!({
            "type": "branch", "orientation": "horizontal", "size": 100.0,
            "data": [leaf("a", "default", 100.0), leaf("b", "nope", 100.0)]
        }));
        assert!(matches!(
            Gridview::from_serialized(&data, &registry(), true),
            Err(LayoutError::UnknownComponent(name)) if name == "nope"
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let data = grid_json(json!({
            "type": "branch", "orientation": "horizontal", "size": 100.0,
            "data": [leaf("a", "default", 100.0), leaf("a", "default", 100.0)]
        }));
        assert!(matches!(
            Gridview::from_serialized(&data, &registry(), true),
            Err(LayoutError::DuplicatePanelId(_))
        ));
    }

    #[test]
    fn orientation_must_alternate() {
        let data = grid_json(json!({
            "type": "branch", "orientation": "horizontal", "size": 100.0,
            "data": [
                leaf("a", "default", 100.0),
                {"type": "branch", "orientation": "horizontal", "size": 100.0,
                 "data": [leaf("b", "default", 50.0), leaf("c", "default", 50.0)]}
            ]
        }));
        assert!(matches!(
            Gridview::from_serialized(&data, &registry(), true),
            Err(LayoutError::InvalidState(_))
        ));
    }

    #[test]
    fn leaf_root_and_bad_sizes_are_rejected() {
        let data = grid_json(leaf("a", "default", 100.0));
        assert!(Gridview::from_serialized(&data, &registry(), true).is_err());

        let data = grid_json(json!({
            "type": "branch", "orientation": "horizontal", "size": 100.0,
            "data": [leaf("a", "default", -5.0)]
        }));
        assert!(matches!(
            Gridview::from_serialized(&data, &registry(), true),
            Err(LayoutError::InvalidState(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(
            SerializedGridview::from_json_str("{\"root\": 1}"),
            Err(LayoutError::Json(_))
        ));
    }
}
