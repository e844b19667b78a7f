#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use regrid_core::geometry::{Bounds, Point};
use regrid_layout::grid::GridSettings;
use regrid_layout::registry::{DropRegistry, GridId, RegisteredGrid, RegistryConfig};

#[derive(Debug, Arbitrary)]
enum Op {
    Register { grid: u8, left: i16, top: i16, count: u8, drop_enabled: bool },
    Remove { grid: u8 },
    Traverse { source: u8, target: u8, x: i16, y: i16, index: u8 },
    EndTraverse,
    Prepare { source: u8, target: u8 },
    Commit { source: u8, index: u8, target_index: u8 },
    TakeArrival { grid: u8, index: u8 },
}

fn id(n: u8) -> GridId {
    GridId::new(format!("g{}", n % 4))
}

fuzz_target!(|ops: Vec<Op>| {
    let mut registry = DropRegistry::new(RegistryConfig::default());
    for op in ops {
        match op {
            Op::Register { grid, left, top, count, drop_enabled } => {
                let Ok(settings) = GridSettings::from_container_width(200.0, 4, 50.0) else {
                    return;
                };
                let entry = RegisteredGrid::new(
                    Bounds::new(f64::from(left), f64::from(top), 200.0, 150.0),
                    usize::from(count),
                    settings,
                )
                .with_drop_enabled(drop_enabled);
                registry.register(id(grid), entry);
            }
            Op::Remove { grid } => {
                registry.remove(&id(grid));
            }
            Op::Traverse { source, target, x, y, index } => {
                let outcome = registry.begin_or_update_traverse(
                    &id(source),
                    &id(target),
                    Point::new(f64::from(x), f64::from(y)),
                    usize::from(index),
                );
                assert_eq!(outcome.is_ok(), registry.contains(&id(target)));
                if outcome.is_ok() {
                    assert!(registry.traverse().is_some());
                }
            }
            Op::EndTraverse => {
                registry.end_traverse();
            }
            Op::Prepare { source, target } => {
                let _ = registry.prepare_arrival(&id(target), &id(source), Point::ZERO);
            }
            Op::Commit { source, index, target_index } => {
                let change = registry.commit(
                    id(source),
                    usize::from(index),
                    usize::from(target_index),
                    None,
                );
                assert_eq!(change.source_id, id(source));
            }
            Op::TakeArrival { grid, index } => {
                registry.take_arrival(&id(grid), usize::from(index));
            }
        }

        // Only an unexecuted traverse opens a slot.
        if let Some(traverse) = registry.traverse() {
            let opened = registry.traverse_index_for(&traverse.target_id);
            assert_eq!(opened.is_some(), !traverse.execute);
        }
    }
});
