#![forbid(unsafe_code)]

//! Fixed-column grid geometry.
//!
//! Pure functions mapping between a linear item index and the top-left
//! corner of its cell, relative to the grid container's origin. Nothing here
//! holds state; every function is a direct formula over [`GridSettings`].
//!
//! # Invariants
//!
//! 1. `boxes_per_row > 0` and `row_height > 0` for every constructed
//!    [`GridSettings`]; `column_width >= 0` and finite.
//! 2. For `i < count`, `index_from_coordinates(position_for_index(i))`
//!    returns `i` whenever `column_width > 0`.
//! 3. `index_from_coordinates` never returns more than `count`. It does not
//!    clamp below zero; use [`resolve_slot`] to turn a raw value into a slot.

use std::fmt;

use regrid_core::geometry::Point;
use serde::{Deserialize, Serialize};

/// Validation failure for [`GridSettings`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridSettingsError {
    /// `boxes_per_row` was zero.
    ZeroColumns,
    /// `row_height` was zero, negative or not finite.
    InvalidRowHeight { row_height: f64 },
    /// `column_width` was negative or not finite.
    InvalidColumnWidth { column_width: f64 },
}

impl fmt::Display for GridSettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroColumns => write!(f, "grid must have at least one box per row"),
            Self::InvalidRowHeight { row_height } => {
                write!(f, "row height must be positive and finite, got {row_height}")
            }
            Self::InvalidColumnWidth { column_width } => write!(
                f,
                "column width must be non-negative and finite, got {column_width}"
            ),
        }
    }
}

impl std::error::Error for GridSettingsError {}

/// Cell layout of one grid.
///
/// `column_width == 0` is the "not yet measured" state. Geometry stays
/// defined but callers should not display items until a width arrives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGridSettings", into = "RawGridSettings")]
pub struct GridSettings {
    boxes_per_row: usize,
    row_height: f64,
    column_width: f64,
}

#[derive(Serialize, Deserialize)]
struct RawGridSettings {
    boxes_per_row: usize,
    row_height: f64,
    column_width: f64,
}

impl TryFrom<RawGridSettings> for GridSettings {
    type Error = GridSettingsError;

    fn try_from(raw: RawGridSettings) -> Result<Self, Self::Error> {
        Self::new(raw.boxes_per_row, raw.row_height, raw.column_width)
    }
}

impl From<GridSettings> for RawGridSettings {
    fn from(grid: GridSettings) -> Self {
        Self {
            boxes_per_row: grid.boxes_per_row,
            row_height: grid.row_height,
            column_width: grid.column_width,
        }
    }
}

impl GridSettings {
    /// Create validated settings.
    pub fn new(
        boxes_per_row: usize,
        row_height: f64,
        column_width: f64,
    ) -> Result<Self, GridSettingsError> {
        if boxes_per_row == 0 {
            return Err(GridSettingsError::ZeroColumns);
        }
        if !(row_height.is_finite() && row_height > 0.0) {
            return Err(GridSettingsError::InvalidRowHeight { row_height });
        }
        if !(column_width.is_finite() && column_width >= 0.0) {
            return Err(GridSettingsError::InvalidColumnWidth { column_width });
        }
        Ok(Self {
            boxes_per_row,
            row_height,
            column_width,
        })
    }

    /// Settings for a container `width` pixels wide, split evenly into
    /// `boxes_per_row` columns.
    pub fn from_container_width(
        width: f64,
        boxes_per_row: usize,
        row_height: f64,
    ) -> Result<Self, GridSettingsError> {
        if boxes_per_row == 0 {
            return Err(GridSettingsError::ZeroColumns);
        }
        Self::new(boxes_per_row, row_height, width / boxes_per_row as f64)
    }

    /// Same columns and row height, re-derived for a new container width.
    ///
    /// Negative or non-finite widths collapse to the unmeasured state.
    #[must_use]
    pub fn with_container_width(self, width: f64) -> Self {
        let column_width = width / self.boxes_per_row as f64;
        Self {
            column_width: if column_width.is_finite() {
                column_width.max(0.0)
            } else {
                0.0
            },
            ..self
        }
    }

    #[inline]
    #[must_use]
    pub const fn boxes_per_row(&self) -> usize {
        self.boxes_per_row
    }

    #[inline]
    #[must_use]
    pub const fn row_height(&self) -> f64 {
        self.row_height
    }

    #[inline]
    #[must_use]
    pub const fn column_width(&self) -> f64 {
        self.column_width
    }

    /// Whether the container has not been measured yet.
    #[inline]
    #[must_use]
    pub fn is_unmeasured(&self) -> bool {
        self.column_width == 0.0
    }

    /// Offset from a cell's top-left corner to its centre.
    #[inline]
    #[must_use]
    pub fn half_cell(&self) -> Point {
        Point::new(self.column_width / 2.0, self.row_height / 2.0)
    }
}

/// Top-left corner of the cell at `index`.
///
/// With an `insertion_index`, every index at or past it is laid out one slot
/// further along, previewing an insertion without touching any collection.
#[must_use]
pub fn position_for_index(
    index: usize,
    grid: &GridSettings,
    insertion_index: Option<usize>,
) -> Point {
    let effective = if insertion_index.is_some_and(|at| index >= at) {
        index.saturating_add(1)
    } else {
        index
    };
    let column = effective % grid.boxes_per_row;
    let row = effective / grid.boxes_per_row;
    Point::new(
        column as f64 * grid.column_width,
        row as f64 * grid.row_height,
    )
}

/// Raw cell index under `(x, y)`.
///
/// Values at or past `count` clamp to `count` ("append"). Negative results
/// are returned as-is. Degenerate input (an unmeasured grid, infinities)
/// saturates instead of overflowing; NaN maps to `0`.
#[must_use]
pub fn index_from_coordinates(x: f64, y: f64, grid: &GridSettings, count: usize) -> isize {
    let row = (y / grid.row_height).floor();
    let column = (x / grid.column_width).floor();
    let raw = row * grid.boxes_per_row as f64 + column;
    if raw >= count as f64 {
        return isize::try_from(count).unwrap_or(isize::MAX);
    }
    // `as` saturates on overflow and maps NaN to zero.
    raw as isize
}

/// Current position of the item that started at `index`, displaced by
/// `(dx, dy)`. With `center`, the result is the centre of the item.
#[must_use]
pub fn drag_position(index: usize, grid: &GridSettings, dx: f64, dy: f64, center: bool) -> Point {
    let resting = position_for_index(index, grid, None).offset(dx, dy);
    if center {
        resting + grid.half_cell()
    } else {
        resting
    }
}

/// The cell a drag from `start` by `(dx, dy)` currently points at.
#[must_use]
pub fn target_index(start: usize, grid: &GridSettings, count: usize, dx: f64, dy: f64) -> isize {
    let probe = drag_position(start, grid, dx, dy, true);
    index_from_coordinates(probe.x, probe.y, grid, count)
}

/// Map a raw index into a slot in `[0, count]`, or `None` when it lies
/// before the grid.
#[must_use]
pub fn resolve_slot(raw: isize, count: usize) -> Option<usize> {
    usize::try_from(raw).ok().map(|slot| slot.min(count))
}
