#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use regrid_layout::grid::{
    GridSettings, index_from_coordinates, position_for_index, resolve_slot, target_index,
};

#[derive(Debug, Arbitrary)]
struct Input {
    boxes_per_row: u8,
    row_height: f64,
    container_width: f64,
    count: u16,
    start: u16,
    dx: f64,
    dy: f64,
    insertion: Option<u16>,
}

fuzz_target!(|input: Input| {
    let Ok(grid) = GridSettings::from_container_width(
        input.container_width,
        usize::from(input.boxes_per_row),
        input.row_height,
    ) else {
        return;
    };
    let count = usize::from(input.count);
    let start = usize::from(input.start);

    // Never panics, whatever the offsets.
    let raw = target_index(start, &grid, count, input.dx, input.dy);
    assert!(raw <= count as isize, "raw index {raw} past count {count}");
    if let Some(slot) = resolve_slot(raw, count) {
        assert!(slot <= count);
    }

    let insertion = input.insertion.map(usize::from);
    let _ = position_for_index(start, &grid, insertion);

    // Round trip holds on a measured grid of sane cell sizes.
    let sane = |v: f64| (1e-3..=1e6).contains(&v);
    if sane(grid.column_width()) && sane(grid.row_height()) && start < count {
        let cell = position_for_index(start, &grid, None);
        let half = grid.half_cell();
        let back = index_from_coordinates(cell.x + half.x, cell.y + half.y, &grid, count);
        assert_eq!(back, start as isize, "round trip failed for {start}");
    }
});
