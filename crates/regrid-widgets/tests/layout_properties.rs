//! Property checks for a single zone's layout while an item is dragged.

use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;
use regrid_core::geometry::{Bounds, Point};
use regrid_core::gesture::DragSignal;
use regrid_widgets::{DropZoneConfig, GridDropZone, GridProvider, Placeholder, SignalResponse};

fn zone(count: usize, boxes_per_row: usize) -> GridDropZone<usize> {
    let width = 100.0 * boxes_per_row as f64;
    let rows = count.div_ceil(boxes_per_row).max(1);
    let measure = Rc::new(Cell::new(Bounds::new(0.0, 0.0, width, 80.0 * rows as f64)));
    let config = DropZoneConfig::new(boxes_per_row, 80.0);
    let mut zone =
        GridDropZone::new("props", GridProvider::default(), config, measure).expect("valid config");
    zone.mount();
    zone.set_items(0..count);
    zone
}

fn assert_permutation(slots: &mut [usize]) -> Result<(), TestCaseError> {
    slots.sort_unstable();
    for (expected, slot) in slots.iter().enumerate() {
        prop_assert_eq!(*slot, expected);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn dragging_keeps_slots_a_permutation(
        (count, index) in (1usize..20).prop_flat_map(|n| (Just(n), 0..n)),
        boxes_per_row in 1usize..6,
        moves in prop::collection::vec((-700.0f64..700.0, -500.0f64..500.0), 1..8),
    ) {
        let mut zone = zone(count, boxes_per_row);
        prop_assert_eq!(
            zone.handle_signal(index, DragSignal::Claim).expect("known item"),
            SignalResponse::Claimed
        );

        let mut last = Point::ZERO;
        for (dx, dy) in moves {
            last = Point::new(dx, dy);
            zone.handle_signal(index, DragSignal::Move { delta: last }).expect("known item");
            let mut slots: Vec<usize> = zone.layout().iter().map(|frame| frame.slot).collect();
            assert_permutation(&mut slots)?;
            prop_assert_eq!(zone.dragging_index(), Some(index));
            if let Some(placeholder) = zone.placeholder() {
                prop_assert_eq!(placeholder.start_index, index);
                prop_assert!(placeholder.target_index <= count);
                prop_assert_ne!(placeholder.target_index, index);
            }
        }

        let response = zone
            .handle_signal(index, DragSignal::Release { delta: last })
            .expect("known item");
        let SignalResponse::Finished(change) = response else {
            return Err(TestCaseError::fail(format!("drag did not finish: {response:?}")));
        };
        prop_assert_eq!(change.source_index, index);
        prop_assert!(change.target_index < count);
        prop_assert!(!change.is_cross_grid());
        prop_assert_eq!(zone.placeholder(), None);
        prop_assert_eq!(zone.dragging_index(), None);
        prop_assert!(zone.layout().iter().all(|frame| !frame.dragging));
    }
}

#[test]
fn layout_frames_serialize_for_hosts() {
    let mut zone = zone(3, 3);
    zone.handle_signal(0, DragSignal::Claim).expect("known item");
    zone.handle_signal(0, DragSignal::Move { delta: Point::new(200.0, 0.0) })
        .expect("known item");

    let frames = serde_json::to_value(zone.layout()).expect("serialize layout");
    let dragged = &frames[0];
    assert_eq!(dragged["key"], 0);
    assert_eq!(dragged["dragging"], true);
    assert_eq!(dragged["hidden"], false);
    assert_eq!(dragged["position"]["x"], 200.0);

    let placeholder = zone.placeholder().expect("placeholder while over slot 2");
    let json = serde_json::to_string(&placeholder).expect("serialize placeholder");
    let back: Placeholder = serde_json::from_str(&json).expect("deserialize placeholder");
    assert_eq!(back, placeholder);
    assert_eq!(back.target_index, 2);
}
