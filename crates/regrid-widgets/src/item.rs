#![forbid(unsafe_code)]

//! Draggable grid cells and their motion.
//!
//! A [`GridItem`] only exists inside a [`GridDropZone`]; the zone creates it
//! when a key appears and drives it with resting slots and drag deltas.
//!
//! # Invariants
//!
//! 1. While dragging, the item's position is `start_coords + delta`, applied
//!    immediately without spring motion.
//! 2. Resting-slot changes that arrive during a drag are held back and only
//!    take effect when the drag finishes.
//!
//! [`GridDropZone`]: crate::drop_zone::GridDropZone

use std::time::Duration;

use regrid_core::animation::{Spring, SpringPoint};
use regrid_core::geometry::Point;
use serde::{Deserialize, Serialize};

/// Non-positional presentation of an item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemStyle {
    pub scale: f64,
    pub opacity: f64,
    pub z_index: i32,
}

impl ItemStyle {
    pub const RESTING: Self = Self {
        scale: 1.0,
        opacity: 1.0,
        z_index: 0,
    };

    /// Style of an item under the pointer.
    pub const LIFTED: Self = Self {
        scale: 1.1,
        opacity: 0.8,
        z_index: 1,
    };
}

impl Default for ItemStyle {
    fn default() -> Self {
        Self::RESTING
    }
}

/// Spring-driven position plus the current style.
#[derive(Debug, Clone)]
pub struct ItemMotion {
    position: SpringPoint,
    style: ItemStyle,
}

impl ItemMotion {
    #[must_use]
    pub fn new(at: Point, template: &Spring) -> Self {
        Self {
            position: SpringPoint::new(at, template),
            style: ItemStyle::RESTING,
        }
    }

    #[must_use]
    pub fn position(&self) -> Point {
        self.position.position()
    }

    #[must_use]
    pub fn target(&self) -> Point {
        self.position.target()
    }

    #[must_use]
    pub fn style(&self) -> ItemStyle {
        self.style
    }

    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.position.is_at_rest()
    }

    /// Track the pointer exactly, lifted.
    pub fn follow(&mut self, at: Point) {
        self.position.snap_to(at);
        self.style = ItemStyle::LIFTED;
    }

    /// Spring towards `target` with the resting style.
    pub fn settle(&mut self, target: Point) {
        self.position.set_target(target);
        self.style = ItemStyle::RESTING;
    }

    /// Jump to `at` with the resting style.
    pub fn snap_to(&mut self, at: Point) {
        self.position.snap_to(at);
        self.style = ItemStyle::RESTING;
    }

    /// Jump to `origin`, then spring towards `target`.
    pub fn enter_from(&mut self, origin: Point, target: Point) {
        self.position.snap_to(origin);
        self.settle(target);
    }

    pub fn advance(&mut self, dt: Duration) {
        self.position.advance(dt);
    }
}

/// One cell in a drop zone.
#[derive(Debug, Clone)]
pub struct GridItem<K> {
    key: K,
    resting: Point,
    start_coords: Point,
    dragging: bool,
    drag_enabled: bool,
    motion: ItemMotion,
}

impl<K> GridItem<K> {
    pub(crate) fn new(key: K, resting: Point, template: &Spring) -> Self {
        Self {
            key,
            resting,
            start_coords: resting,
            dragging: false,
            drag_enabled: true,
            motion: ItemMotion::new(resting, template),
        }
    }

    /// Create an item that springs in from `origin`.
    pub(crate) fn entering(key: K, origin: Point, resting: Point, template: &Spring) -> Self {
        let mut item = Self::new(key, resting, template);
        item.motion.enter_from(origin, resting);
        item
    }

    #[must_use]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Slot the item belongs in when not dragged.
    #[must_use]
    pub fn resting(&self) -> Point {
        self.resting
    }

    /// Resting slot captured when the current drag began.
    #[must_use]
    pub fn start_coords(&self) -> Point {
        self.start_coords
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    #[must_use]
    pub fn drag_enabled(&self) -> bool {
        self.drag_enabled
    }

    #[must_use]
    pub fn motion(&self) -> &ItemMotion {
        &self.motion
    }

    pub(crate) fn set_drag_enabled(&mut self, enabled: bool) {
        self.drag_enabled = enabled;
    }

    /// Answer a drag offer. Rejected when this item or its grid disables
    /// dragging; a rejected claim changes nothing.
    pub(crate) fn claim(&mut self, grid_drag_enabled: bool) -> bool {
        if !(grid_drag_enabled && self.drag_enabled) {
            return false;
        }
        self.start_coords = self.resting;
        self.dragging = true;
        self.motion.follow(self.start_coords);
        true
    }

    pub(crate) fn drag_by(&mut self, delta: Point) {
        if self.dragging {
            self.motion.follow(self.start_coords + delta);
        }
    }

    /// Current top-left corner while dragging by `delta`.
    pub(crate) fn dragged_position(&self, delta: Point) -> Point {
        self.start_coords + delta
    }

    pub(crate) fn finish(&mut self) {
        self.dragging = false;
        self.motion.settle(self.resting);
    }

    pub(crate) fn set_resting(&mut self, resting: Point) {
        self.resting = resting;
        if !self.dragging {
            self.motion.settle(resting);
        }
    }

    pub(crate) fn snap_to_resting(&mut self) {
        if !self.dragging {
            self.motion.snap_to(self.resting);
        }
    }

    pub(crate) fn advance(&mut self, dt: Duration) {
        self.motion.advance(dt);
    }
}
