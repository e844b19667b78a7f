#![forbid(unsafe_code)]

//! Core primitives for regrid: page-space geometry, the measurement seam,
//! pointer drag tracking, and spring motion.
//!
//! Nothing in this crate knows about grids. The layout crate builds the
//! index math and coordination registry on top of these types, and the
//! widgets crate wires them into drop zones and items.

pub mod animation;
pub mod geometry;
pub mod gesture;
pub mod measure;

pub use geometry::{Bounds, Point};
pub use measure::Measure;
