#![forbid(unsafe_code)]

//! regrid public facade crate.
//!
//! Re-exports the types most hosts need from the core, layout and widgets
//! crates, plus a unified [`Error`] and a prelude.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use regrid::prelude::*;
//!
//! let provider = GridProvider::default();
//! let measure = Rc::new(Cell::new(Bounds::new(0.0, 0.0, 300.0, 100.0)));
//! let mut zone = GridDropZone::new("tiles", provider, DropZoneConfig::new(3, 100.0), measure)?;
//! zone.mount();
//! zone.set_items(["a", "b", "c"]);
//! assert_eq!(zone.layout()[2].resting, Point::new(200.0, 0.0));
//! # Ok::<(), regrid::Error>(())
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use regrid_core::animation::spring::presets;
pub use regrid_core::animation::{Spring, SpringPoint};
pub use regrid_core::geometry::{Bounds, Point};
pub use regrid_core::gesture::{DragSignal, DragTracker, GestureConfig, PointerEvent};
pub use regrid_core::measure::Measure;

// --- Layout re-exports -----------------------------------------------------

pub use regrid_layout::grid::{GridSettings, GridSettingsError};
pub use regrid_layout::list::{ListMutationError, move_between, swap};
pub use regrid_layout::registry::{
    GridChange, GridId, RegistryConfig, RegistryError, TraverseUpdatePolicy,
};

// --- Widget re-exports -----------------------------------------------------

pub use regrid_widgets::{
    DropZoneConfig, DropZoneError, GridDropZone, GridProvider, ItemLayout, ItemStyle, Placeholder,
    SignalResponse,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for regrid hosts.
#[derive(Debug)]
pub enum Error {
    /// Grid settings were rejected.
    Settings(GridSettingsError),
    /// A list helper was handed an out-of-range index.
    List(ListMutationError),
    /// The coordination registry refused an operation.
    Registry(RegistryError),
    /// A drop zone operation failed.
    DropZone(DropZoneError),
    /// A cross-grid change was applied without the receiving list.
    MissingTarget { target_id: GridId },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Settings(err) => write!(f, "{err}"),
            Self::List(err) => write!(f, "{err}"),
            Self::Registry(err) => write!(f, "{err}"),
            Self::DropZone(err) => write!(f, "{err}"),
            Self::MissingTarget { target_id } => {
                write!(f, "no target list given for change into grid '{target_id}'")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Settings(err) => Some(err),
            Self::List(err) => Some(err),
            Self::Registry(err) => Some(err),
            Self::DropZone(err) => Some(err),
            Self::MissingTarget { .. } => None,
        }
    }
}

impl From<GridSettingsError> for Error {
    fn from(err: GridSettingsError) -> Self {
        Self::Settings(err)
    }
}

impl From<ListMutationError> for Error {
    fn from(err: ListMutationError) -> Self {
        Self::List(err)
    }
}

impl From<RegistryError> for Error {
    fn from(err: RegistryError) -> Self {
        Self::Registry(err)
    }
}

impl From<DropZoneError> for Error {
    fn from(err: DropZoneError) -> Self {
        Self::DropZone(err)
    }
}

/// Standard result type for regrid APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Apply a completed change to the caller-owned lists.
///
/// A same-grid change relocates within `source`; a cross-grid change moves
/// the element into `target`. A cross-grid change without a `target` list
/// fails with [`Error::MissingTarget`] and leaves `source` untouched. A no-op
/// change leaves both lists untouched.
pub fn apply_change<T: Clone>(
    change: &GridChange,
    source: &mut Vec<T>,
    target: Option<&mut Vec<T>>,
) -> Result<()> {
    if change.is_noop() {
        return Ok(());
    }
    match (change.is_cross_grid(), target) {
        (true, Some(target)) => {
            let (new_source, new_target) =
                move_between(source, target, change.source_index, change.target_index)?;
            *source = new_source;
            *target = new_target;
        }
        (true, None) => {
            let target_id = change
                .target_id
                .clone()
                .unwrap_or_else(|| change.source_id.clone());
            return Err(Error::MissingTarget { target_id });
        }
        (false, _) => {
            let reordered = swap(source, change.source_index, change.target_index)?.into_owned();
            *source = reordered;
        }
    }
    Ok(())
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Bounds, DragSignal, DragTracker, DropZoneConfig, Error, GridChange, GridDropZone, GridId,
        GridProvider, ItemLayout, Point, PointerEvent, Result, SignalResponse, apply_change,
        move_between, swap,
    };

    pub use crate::{core, layout, widgets};
}

pub use regrid_core as core;
pub use regrid_layout as layout;
pub use regrid_widgets as widgets;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn errors_convert_and_keep_source() {
        let err: Error = ListMutationError::IndexOutOfRange { index: 3, len: 1 }.into();
        assert_eq!(err.to_string(), "index 3 out of range for list of length 1");
        assert!(err.source().is_some());

        let err: Error = RegistryError::NoActiveTraverse.into();
        assert!(matches!(err, Error::Registry(_)));
    }

    #[test]
    fn settings_errors_surface_through_facade() {
        let err = GridSettings::new(0, 10.0, 10.0).map_err(Error::from);
        assert!(matches!(err, Err(Error::Settings(GridSettingsError::ZeroColumns))));
    }

    #[test]
    fn apply_change_reorders_within_grid() {
        let mut tiles = vec!["a", "b", "c", "d"];
        let change = GridChange {
            source_id: "tiles".into(),
            source_index: 0,
            target_index: 2,
            target_id: None,
        };
        apply_change(&change, &mut tiles, None).unwrap();
        assert_eq!(tiles, vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn apply_change_moves_across_grids() {
        let mut left = vec![1, 2, 3];
        let mut right = vec![9];
        let change = GridChange {
            source_id: "left".into(),
            source_index: 1,
            target_index: 1,
            target_id: Some("right".into()),
        };
        apply_change(&change, &mut left, Some(&mut right)).unwrap();
        assert_eq!(left, vec![1, 3]);
        assert_eq!(right, vec![9, 2]);
    }

    #[test]
    fn cross_grid_change_without_target_list_keeps_source() {
        let mut left = vec!['x', 'y'];
        let change = GridChange {
            source_id: "left".into(),
            source_index: 0,
            target_index: 4,
            target_id: Some("right".into()),
        };
        let err = apply_change(&change, &mut left, None).unwrap_err();
        assert!(matches!(
            &err,
            Error::MissingTarget { target_id } if target_id.as_str() == "right"
        ));
        assert!(err.source().is_none());
        assert!(err.to_string().contains("'right'"));
        assert_eq!(left, vec!['x', 'y']);
    }

    #[test]
    fn apply_change_ignores_noop_and_rejects_bad_index() {
        let mut tiles = vec![1, 2];
        apply_change(&GridChange::unchanged("t".into(), 1), &mut tiles, None).unwrap();
        assert_eq!(tiles, vec![1, 2]);

        let bad = GridChange {
            source_id: "t".into(),
            source_index: 5,
            target_index: 0,
            target_id: None,
        };
        assert!(matches!(
            apply_change(&bad, &mut tiles, None),
            Err(Error::List(ListMutationError::IndexOutOfRange { index: 5, len: 2 }))
        ));
    }
}
