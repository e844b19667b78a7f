#![forbid(unsafe_code)]

//! Grid geometry and cross-grid drop coordination.
//!
//! - [`grid`]: index ↔ cell math for fixed-column grids.
//! - [`list`]: helpers for applying a [`GridChange`] to caller-owned lists.
//! - [`registry`]: the [`DropRegistry`] every grid under one provider shares.

pub mod grid;
pub mod list;
pub mod registry;

pub use grid::{
    GridSettings, GridSettingsError, drag_position, index_from_coordinates, position_for_index,
    resolve_slot, target_index,
};
pub use list::{ListMutationError, move_between, swap};
pub use registry::{
    Arrival, DropRegistry, GridChange, GridId, RegisteredGrid, RegistryConfig, RegistryError,
    Traverse, TraverseOutcome, TraverseUpdatePolicy,
};
pub use regrid_core::geometry::{Bounds, Point};
