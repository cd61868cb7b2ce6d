// ABOUTME: Property tests for size distribution and grid structure.
// ABOUTME: Random inputs and operation streams must keep totals, bounds and tree shape intact.

use proptest::prelude::*;
use splitgrid_layout::distributor::{self, Slot};
use splitgrid_layout::{
    ComponentRegistry, Direction, EmptyContent, GridviewComponent, LayoutOptions, LayoutPriority,
    PanelContent, PanelId, PanelOptions, Position, SerializedGridview, SizeConstraint, Sizing,
};

const TOLERANCE: f64 = 1e-6;

fn slot_strategy() -> impl Strategy<Value = Slot> {
    (
        0.0..80.0f64,
        prop::option::of(0.0..200.0f64),
        0.0..300.0f64,
        prop_oneof![
            Just(LayoutPriority::Low),
            Just(LayoutPriority::Normal),
            Just(LayoutPriority::High)
        ],
    )
        .prop_map(|(minimum, extra, current, priority)| {
            let maximum = extra.map_or(f64::INFINITY, |extra| minimum + extra);
            Slot::new(SizeConstraint::new(minimum, maximum, current), priority)
        })
}

/// Slots plus a total that their bounds can satisfy
fn feasible_layout() -> impl Strategy<Value = (Vec<Slot>, f64)> {
    prop::collection::vec(slot_strategy(), 1..8).prop_flat_map(|slots| {
        let minimum = distributor::minimum_size(&slots);
        let maximum = distributor::maximum_size(&slots).min(minimum + 2000.0);
        let total = if maximum > minimum {
            (minimum..maximum).boxed()
        } else {
            Just(minimum).boxed()
        };
        (Just(slots), total)
    })
}

fn assert_fits(slots: &[Slot], total: f64) -> Result<(), TestCaseError> {
    let sum = distributor::content_size(slots);
    prop_assert!((sum - total).abs() < TOLERANCE, "sum {} != total {}", sum, total);
    for slot in slots {
        let c = slot.constraint;
        prop_assert!(c.current >= c.minimum - TOLERANCE, "{:?} below minimum", c);
        prop_assert!(c.current <= c.maximum + TOLERANCE, "{:?} above maximum", c);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn layout_fills_the_total_within_bounds(
        (mut slots, total) in feasible_layout(),
        proportional in any::<bool>(),
    ) {
        let fit = distributor::layout(&mut slots, total, proportional);
        prop_assert!(fit.is_exact(), "{:?}", fit);
        assert_fits(&slots, total)?;
    }

    #[test]
    fn layout_is_idempotent(
        (mut slots, total) in feasible_layout(),
        proportional in any::<bool>(),
    ) {
        let _ = distributor::layout(&mut slots, total, proportional);
        let first: Vec<f64> = slots.iter().map(Slot::size).collect();
        let _ = distributor::layout(&mut slots, total, proportional);
        for (a, b) in first.iter().zip(slots.iter().map(Slot::size)) {
            prop_assert!((a - b).abs() < TOLERANCE, "{:?} changed on relayout", first);
        }
    }

    #[test]
    fn resize_keeps_total_and_bounds(
        (mut slots, total) in feasible_layout(),
        index in any::<prop::sample::Index>(),
        delta in -400.0..400.0f64,
    ) {
        let _ = distributor::layout(&mut slots, total, true);
        let index = index.index(slots.len());
        let applied = distributor::resize(&mut slots, index, delta);
        prop_assert!(applied.abs() <= delta.abs() + TOLERANCE);
        assert_fits(&slots, total)?;
    }

    #[test]
    fn remove_keeps_total_when_room_remains(
        (mut slots, total) in feasible_layout(),
        index in any::<prop::sample::Index>(),
    ) {
        prop_assume!(slots.len() > 1);
        let _ = distributor::layout(&mut slots, total, true);
        let index = index.index(slots.len());
        let (_, fit) = distributor::remove(&mut slots, index, Sizing::Distribute);
        if fit.is_exact() {
            assert_fits(&slots, total)?;
        } else {
            let sum = distributor::content_size(&slots);
            prop_assert!((sum - total).abs() < TOLERANCE);
        }
    }
}

#[derive(Debug, Clone)]
enum GridOp {
    Add { reference: usize, direction: Direction },
    Remove { target: usize },
    Move { target: usize, reference: usize, direction: Direction },
}

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Left),
        Just(Direction::Right),
        Just(Direction::Above),
        Just(Direction::Below)
    ]
}

fn op_strategy() -> impl Strategy<Value = GridOp> {
    prop_oneof![
        3 => (any::<usize>(), direction_strategy())
            .prop_map(|(reference, direction)| GridOp::Add { reference, direction }),
        1 => any::<usize>().prop_map(|target| GridOp::Remove { target }),
        1 => (any::<usize>(), any::<usize>(), direction_strategy())
            .prop_map(|(target, reference, direction)| GridOp::Move { target, reference, direction }),
    ]
}

fn registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry.register("empty", || -> Box<dyn PanelContent> { Box::new(EmptyContent) });
    registry
}

fn pick(ids: &[PanelId], choice: usize) -> Option<PanelId> {
    if ids.is_empty() {
        None
    } else {
        Some(ids[choice % ids.len()].clone())
    }
}

fn apply(grid: &mut GridviewComponent, op: &GridOp, next_id: &mut usize) {
    let ids = grid.grid().panel_ids();
    match op {
        GridOp::Add { reference, direction } => {
            let id = format!("p{}", next_id);
            *next_id += 1;
            let position = pick(&ids, *reference).map(|reference| Position::Relative {
                reference,
                direction: *direction,
            });
            let _ = grid.add_panel(PanelOptions::new(id.as_str(), "empty"), position, Sizing::Distribute);
        }
        GridOp::Remove { target } => {
            if let Some(id) = pick(&ids, *target) {
                let _ = grid.remove_panel(&id, Sizing::Distribute);
            }
        }
        GridOp::Move {
            target,
            reference,
            direction,
        } => {
            if let (Some(id), Some(reference)) = (pick(&ids, *target), pick(&ids, *reference)) {
                if id != reference {
                    let _ = grid.move_panel(&id, &reference, *direction, Sizing::Distribute);
                }
            }
        }
    }
}

fn assert_tiled(grid: &GridviewComponent) -> Result<(), TestCaseError> {
    prop_assert!(grid.grid().validate().is_ok(), "{:?}", grid.grid().validate());
    let rects = grid.panel_rects();
    prop_assert_eq!(rects.len(), grid.total_panels());
    if rects.is_empty() {
        return Ok(());
    }
    let area: f64 = rects.values().map(|r| r.width * r.height).sum();
    prop_assert!((area - grid.width() * grid.height()).abs() < 1e-3, "area {}", area);
    for rect in rects.values() {
        prop_assert!(rect.x >= -TOLERANCE && rect.y >= -TOLERANCE);
        prop_assert!(rect.x + rect.width <= grid.width() + 1e-3);
        prop_assert!(rect.y + rect.height <= grid.height() + 1e-3);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn grid_operations_keep_the_tree_valid(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut grid = GridviewComponent::new(LayoutOptions::default(), registry());
        let _ = grid.layout(600.0, 400.0);
        let mut next_id = 0;
        for op in &ops {
            apply(&mut grid, op, &mut next_id);
            assert_tiled(&grid)?;
        }
    }

    #[test]
    fn grid_round_trip_preserves_geometry(ops in prop::collection::vec(op_strategy(), 1..24)) {
        let mut grid = GridviewComponent::new(LayoutOptions::default(), registry());
        let _ = grid.layout(600.0, 400.0);
        let mut next_id = 0;
        for op in &ops {
            apply(&mut grid, op, &mut next_id);
        }
        prop_assume!(grid.total_panels() > 0);

        let json = grid.to_json().to_json_string().unwrap();
        let mut restored = GridviewComponent::new(LayoutOptions::default(), registry());
        restored.from_json(&SerializedGridview::from_json_str(&json).unwrap()).unwrap();

        let before = grid.panel_rects();
        let after = restored.panel_rects();
        prop_assert_eq!(before.len(), after.len());
        for (id, rect) in &before {
            let other = after[id];
            prop_assert!((rect.x - other.x).abs() < 1e-6, "{} moved", id);
            prop_assert!((rect.y - other.y).abs() < 1e-6, "{} moved", id);
            prop_assert!((rect.width - other.width).abs() < 1e-6, "{} resized", id);
            prop_assert!((rect.height - other.height).abs() < 1e-6, "{} resized", id);
        }
    }
}
