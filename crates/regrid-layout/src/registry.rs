#![forbid(unsafe_code)]

//! Drop coordination registry.
//!
//! One [`DropRegistry`] is shared by every grid under a provider. It holds
//! each mounted grid's last reported geometry and the single live
//! [`Traverse`]: the record of a drag that has crossed from one grid into
//! another.
//!
//! # Cross-grid protocol
//!
//! ```text
//! drag enters sibling ──► begin_or_update_traverse   (execute = false)
//! drag returns home   ──► end_traverse
//! release over sibling ─► prepare_arrival             (execute = true, origin set)
//!                     └─► commit                      (GridChange out)
//! destination mounts item ──► take_arrival            (traverse consumed)
//! ```
//!
//! # Invariants
//!
//! 1. At most one traverse is alive.
//! 2. `execute` only goes from `false` to `true`, once per traverse.
//! 3. Registration order is stable: re-registering a grid keeps its place,
//!    so hit-test priority between overlapping grids never changes while
//!    both stay mounted.
//! 4. [`DropRegistry::traverse_index_for`] reports nothing once the traverse
//!    has executed; by then the caller owns the inserted item.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use regrid_core::geometry::{Bounds, Point};
use regrid_core::measure::Measure;
use serde::{Deserialize, Serialize};

use crate::grid::{GridSettings, index_from_coordinates, position_for_index};

/// Caller-assigned grid identifier, unique within one registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridId(String);

impl GridId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GridId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for GridId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for GridId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// What the registry knows about one mounted grid.
#[derive(Clone)]
pub struct RegisteredGrid {
    pub bounds: Bounds,
    pub count: usize,
    pub grid: GridSettings,
    pub drop_enabled: bool,
    measure: Option<Rc<dyn Measure>>,
}

impl fmt::Debug for RegisteredGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredGrid")
            .field("bounds", &self.bounds)
            .field("count", &self.count)
            .field("grid", &self.grid)
            .field("drop_enabled", &self.drop_enabled)
            .field("measure", &self.measure.is_some())
            .finish()
    }
}

impl RegisteredGrid {
    /// A drop-enabled grid with no remeasure source.
    #[must_use]
    pub fn new(bounds: Bounds, count: usize, grid: GridSettings) -> Self {
        Self {
            bounds,
            count,
            grid,
            drop_enabled: true,
            measure: None,
        }
    }

    #[must_use]
    pub fn with_drop_enabled(mut self, enabled: bool) -> Self {
        self.drop_enabled = enabled;
        self
    }

    /// Attach the source [`DropRegistry::remeasure_all`] reads from.
    #[must_use]
    pub fn with_measure(mut self, measure: Rc<dyn Measure>) -> Self {
        self.measure = Some(measure);
        self
    }

    #[must_use]
    pub fn has_measure(&self) -> bool {
        self.measure.is_some()
    }

    /// Whether two registrations differ in anything hit-testing reads.
    #[must_use]
    pub fn same_geometry(&self, other: &Self) -> bool {
        self.bounds == other.bounds
            && self.count == other.count
            && self.grid == other.grid
            && self.drop_enabled == other.drop_enabled
    }
}

/// The live cross-grid drag record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Traverse {
    pub source_id: GridId,
    pub target_id: GridId,
    pub source_index: usize,
    /// Slot in the target grid the item would land in.
    pub target_index: usize,
    /// Landing position of the target slot, in the source grid's frame.
    pub release: Point,
    /// Drag position in the target grid's frame.
    pub target_relative: Point,
    pub execute: bool,
    /// Entry origin recorded by [`DropRegistry::prepare_arrival`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Point>,
}

/// An executed traverse, as seen by its destination grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrival {
    pub target_id: GridId,
    pub source_id: GridId,
    pub target_index: usize,
    /// Where the arriving item starts its entry motion, in the target frame.
    pub origin: Point,
}

impl Traverse {
    fn arrival(&self) -> Arrival {
        Arrival {
            target_id: self.target_id.clone(),
            source_id: self.source_id.clone(),
            target_index: self.target_index,
            origin: self.origin.unwrap_or(self.target_relative),
        }
    }
}

/// One completed drag, reported once per drag.
///
/// `target_id` is present only when the item moved to a different grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridChange {
    pub source_id: GridId,
    pub source_index: usize,
    pub target_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<GridId>,
}

impl GridChange {
    /// A same-grid change that leaves the order untouched.
    #[must_use]
    pub fn unchanged(source_id: GridId, index: usize) -> Self {
        Self {
            source_id,
            source_index: index,
            target_index: index,
            target_id: None,
        }
    }

    #[must_use]
    pub fn is_cross_grid(&self) -> bool {
        self.target_id.is_some()
    }

    /// Whether applying the change would alter any list.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.target_id.is_none() && self.source_index == self.target_index
    }
}

/// When a repeated [`DropRegistry::begin_or_update_traverse`] call replaces
/// the live traverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraverseUpdatePolicy {
    /// Replace unless the live traverse differs from the candidate in both
    /// target grid and target index. Matches the widget's shipped behaviour.
    #[default]
    Observed,
    /// Replace only when the target grid or the target index changed.
    SkipRedundant,
}

impl TraverseUpdatePolicy {
    fn replaces(self, existing: &Traverse, target_id: &GridId, target_index: usize) -> bool {
        let same_target = existing.target_id == *target_id;
        let same_index = existing.target_index == target_index;
        match self {
            Self::Observed => same_target || same_index,
            Self::SkipRedundant => !(same_target && same_index),
        }
    }
}

/// Result of [`DropRegistry::begin_or_update_traverse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraverseOutcome {
    Installed,
    Replaced,
    Suppressed,
}

/// Registry behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub traverse_updates: TraverseUpdatePolicy,
}

impl RegistryConfig {
    #[must_use]
    pub fn with_traverse_updates(mut self, policy: TraverseUpdatePolicy) -> Self {
        self.traverse_updates = policy;
        self
    }
}

/// Registry misuse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    UnknownGrid {
        id: GridId,
    },
    NoActiveTraverse,
    TraverseMismatch {
        expected_source: GridId,
        expected_target: GridId,
        source: GridId,
        target: GridId,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownGrid { id } => write!(f, "grid {id} is not registered"),
            Self::NoActiveTraverse => write!(f, "no traverse is active"),
            Self::TraverseMismatch {
                expected_source,
                expected_target,
                source,
                target,
            } => write!(
                f,
                "traverse runs {expected_source} -> {expected_target}, not {source} -> {target}"
            ),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Shared arbiter for all grids under one provider.
#[derive(Debug, Default)]
pub struct DropRegistry {
    config: RegistryConfig,
    grids: IndexMap<GridId, RegisteredGrid>,
    traverse: Option<Traverse>,
}

impl DropRegistry {
    #[must_use]
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            grids: IndexMap::new(),
            traverse: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> RegistryConfig {
        self.config
    }

    /// Insert or replace a grid. Returns `true` if the id was new.
    pub fn register(&mut self, id: GridId, grid: RegisteredGrid) -> bool {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "registry.register",
            grid = %id,
            count = grid.count,
            left = grid.bounds.left,
            top = grid.bounds.top,
            width = grid.bounds.width,
            drop_enabled = grid.drop_enabled
        );
        self.grids.insert(id, grid).is_none()
    }

    /// Forget a grid. Later registrations keep their relative order.
    pub fn remove(&mut self, id: &GridId) -> Option<RegisteredGrid> {
        let removed = self.grids.shift_remove(id);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "registry.remove",
            grid = %id,
            found = removed.is_some()
        );
        removed
    }

    #[must_use]
    pub fn get(&self, id: &GridId) -> Option<&RegisteredGrid> {
        self.grids.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &GridId) -> bool {
        self.grids.contains_key(id)
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &GridId> {
        self.grids.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.grids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// Convert a point relative to `source_id` into page space. An
    /// unregistered source leaves the point as is.
    #[must_use]
    pub fn page_position(&self, source_id: &GridId, point: Point) -> Point {
        self.grids
            .get(source_id)
            .map_or(point, |source| source.bounds.to_page(point))
    }

    /// The first drop-enabled grid, in registration order, whose bounds
    /// strictly contain `point` (relative to `source_id`).
    ///
    /// The source grid is a candidate like any other.
    #[must_use]
    pub fn active_drop_target(&self, source_id: &GridId, point: Point) -> Option<GridId> {
        let page = self.page_position(source_id, point);
        self.grids
            .iter()
            .find(|(_, grid)| grid.drop_enabled && grid.bounds.contains(page))
            .map(|(id, _)| id.clone())
    }

    /// Track a drag of `source_index` that is over `target_id`.
    ///
    /// `point` is the dragged item's top-left corner relative to the source
    /// grid. The target slot is found from the item's centre in the target
    /// grid's frame; slots before the grid clamp to `0`.
    pub fn begin_or_update_traverse(
        &mut self,
        source_id: &GridId,
        target_id: &GridId,
        point: Point,
        source_index: usize,
    ) -> Result<TraverseOutcome, RegistryError> {
        let Some(target) = self.grids.get(target_id) else {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                message = "registry.traverse",
                action = "skip_unknown_target",
                source = %source_id,
                target = %target_id
            );
            return Err(RegistryError::UnknownGrid {
                id: target_id.clone(),
            });
        };

        let page = self.page_position(source_id, point);
        let target_relative = target.bounds.to_local(page);
        let probe = target_relative + target.grid.half_cell();
        let raw = index_from_coordinates(probe.x, probe.y, &target.grid, target.count);
        let target_index = usize::try_from(raw).unwrap_or(0);

        let source_origin = self
            .grids
            .get(source_id)
            .map_or(Point::ZERO, |source| source.bounds.origin());
        let release = position_for_index(target_index, &target.grid, None)
            + (target.bounds.origin() - source_origin);

        let outcome = match &self.traverse {
            None => TraverseOutcome::Installed,
            Some(existing)
                if self
                    .config
                    .traverse_updates
                    .replaces(existing, target_id, target_index) =>
            {
                TraverseOutcome::Replaced
            }
            Some(_) => TraverseOutcome::Suppressed,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "registry.traverse",
            action = ?outcome,
            source = %source_id,
            target = %target_id,
            source_index,
            target_index
        );

        if outcome != TraverseOutcome::Suppressed {
            self.traverse = Some(Traverse {
                source_id: source_id.clone(),
                target_id: target_id.clone(),
                source_index,
                target_index,
                release,
                target_relative,
                execute: false,
                origin: None,
            });
        }
        Ok(outcome)
    }

    /// Drop the live traverse, if any.
    pub fn end_traverse(&mut self) -> Option<Traverse> {
        let ended = self.traverse.take();
        #[cfg(feature = "tracing")]
        {
            if ended.is_some() {
                tracing::debug!(message = "registry.traverse", action = "end");
            }
        }
        ended
    }

    #[must_use]
    pub fn traverse(&self) -> Option<&Traverse> {
        self.traverse.as_ref()
    }

    /// First commit phase: mark the live traverse as executing and record
    /// where the arriving item enters from.
    pub fn prepare_arrival(
        &mut self,
        target_id: &GridId,
        source_id: &GridId,
        from: Point,
    ) -> Result<Arrival, RegistryError> {
        let traverse = self
            .traverse
            .as_mut()
            .ok_or(RegistryError::NoActiveTraverse)?;
        if traverse.target_id != *target_id || traverse.source_id != *source_id {
            return Err(RegistryError::TraverseMismatch {
                expected_source: traverse.source_id.clone(),
                expected_target: traverse.target_id.clone(),
                source: source_id.clone(),
                target: target_id.clone(),
            });
        }
        traverse.execute = true;
        traverse.origin = Some(from);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "registry.arrival",
            action = "prepare",
            source = %source_id,
            target = %target_id,
            target_index = traverse.target_index
        );
        Ok(traverse.arrival())
    }

    /// Second commit phase: build the change notification.
    ///
    /// A cross-grid commit whose traverse was not prepared marks it executed
    /// here, entering from the traverse's target-relative position.
    pub fn commit(
        &mut self,
        source_id: GridId,
        source_index: usize,
        target_index: usize,
        target_id: Option<GridId>,
    ) -> GridChange {
        if let (Some(target), Some(traverse)) = (&target_id, self.traverse.as_mut())
            && traverse.target_id == *target
            && !traverse.execute
        {
            traverse.execute = true;
            traverse.origin = Some(traverse.target_relative);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "registry.commit",
            source = %source_id,
            source_index,
            target_index,
            target = target_id.as_ref().map_or("", GridId::as_str)
        );
        GridChange {
            source_id,
            source_index,
            target_index,
            target_id,
        }
    }

    /// The executed traverse aimed at `target_id`, if one is waiting.
    #[must_use]
    pub fn arrival(&self, target_id: &GridId) -> Option<Arrival> {
        self.traverse
            .as_ref()
            .filter(|t| t.execute && t.target_id == *target_id)
            .map(Traverse::arrival)
    }

    /// Consume the waiting arrival if it lands at `index` in `target_id`.
    pub fn take_arrival(&mut self, target_id: &GridId, index: usize) -> Option<Arrival> {
        let arrival = self
            .arrival(target_id)
            .filter(|a| a.target_index == index)?;
        self.traverse = None;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "registry.arrival",
            action = "consume",
            target = %target_id,
            target_index = index
        );
        Some(arrival)
    }

    /// Slot a live, not yet executed traverse wants to open in `id`.
    #[must_use]
    pub fn traverse_index_for(&self, id: &GridId) -> Option<usize> {
        self.traverse
            .as_ref()
            .filter(|t| !t.execute && t.target_id == *id)
            .map(|t| t.target_index)
    }

    /// Re-read every grid's measure source, refreshing bounds and column
    /// width. Returns how many grids were remeasured.
    pub fn remeasure_all(&mut self) -> usize {
        let mut remeasured = 0;
        for grid in self.grids.values_mut() {
            let Some(measure) = &grid.measure else {
                continue;
            };
            let bounds = measure.measure();
            grid.grid = grid.grid.with_container_width(bounds.width);
            grid.bounds = bounds;
            remeasured += 1;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "registry.remeasure", remeasured);
        remeasured
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn settings(columns: usize, row_height: f64, width: f64) -> GridSettings {
        GridSettings::from_container_width(width, columns, row_height).expect("valid settings")
    }

    fn entry(left: f64, top: f64, width: f64, height: f64, count: usize) -> RegisteredGrid {
        RegisteredGrid::new(
            Bounds::new(left, top, width, height),
            count,
            settings(4, 50.0, width),
        )
    }

    fn two_grids() -> DropRegistry {
        let mut registry = DropRegistry::default();
        registry.register("left".into(), entry(0.0, 0.0, 400.0, 200.0, 6));
        registry.register("right".into(), entry(500.0, 0.0, 400.0, 200.0, 3));
        registry
    }

    #[test]
    fn register_is_idempotent_and_keeps_position() {
        let mut registry = two_grids();
        assert!(!registry.register("left".into(), entry(0.0, 0.0, 400.0, 200.0, 7)));
        let ids: Vec<_> = registry.ids().map(GridId::as_str).collect();
        assert_eq!(ids, ["left", "right"]);
        assert_eq!(registry.get(&"left".into()).map(|g| g.count), Some(7));
        assert!(registry.remove(&"left".into()).is_some());
        assert!(registry.remove(&"left".into()).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn origin_grid_is_its_own_target() {
        let registry = two_grids();
        assert_eq!(
            registry.active_drop_target(&"left".into(), Point::new(100.0, 100.0)),
            Some("left".into())
        );
        assert_eq!(
            registry.active_drop_target(&"left".into(), Point::new(600.0, 100.0)),
            Some("right".into())
        );
        assert_eq!(
            registry.active_drop_target(&"left".into(), Point::new(450.0, 100.0)),
            None
        );
    }

    #[test]
    fn edges_are_outside() {
        let registry = two_grids();
        assert_eq!(
            registry.active_drop_target(&"left".into(), Point::new(400.0, 100.0)),
            None
        );
        assert_eq!(
            registry.active_drop_target(&"left".into(), Point::new(100.0, 0.0)),
            None
        );
    }

    #[test]
    fn unknown_source_treats_point_as_absolute() {
        let registry = two_grids();
        assert_eq!(
            registry.active_drop_target(&"gone".into(), Point::new(700.0, 10.0)),
            Some("right".into())
        );
    }

    #[test]
    fn drop_disabled_grids_are_skipped() {
        let mut registry = two_grids();
        registry.register(
            "right".into(),
            entry(500.0, 0.0, 400.0, 200.0, 3).with_drop_enabled(false),
        );
        assert_eq!(
            registry.active_drop_target(&"left".into(), Point::new(600.0, 100.0)),
            None
        );
    }

    #[test]
    fn overlapping_grids_prefer_earliest_registration() {
        let mut registry = DropRegistry::default();
        registry.register("a".into(), entry(0.0, 0.0, 300.0, 300.0, 1));
        registry.register("b".into(), entry(100.0, 100.0, 300.0, 300.0, 1));
        let probe = Point::new(150.0, 150.0);
        assert_eq!(
            registry.active_drop_target(&"x".into(), probe),
            Some("a".into())
        );
        // Re-registering "a" keeps its priority.
        registry.register("a".into(), entry(0.0, 0.0, 300.0, 300.0, 2));
        assert_eq!(
            registry.active_drop_target(&"x".into(), probe),
            Some("a".into())
        );
    }

    #[test]
    fn traverse_records_target_slot_and_frames() {
        let mut registry = two_grids();
        // Item dragged so its top-left sits at (610, 60) relative to "left".
        let outcome = registry
            .begin_or_update_traverse(&"left".into(), &"right".into(), Point::new(610.0, 60.0), 2)
            .expect("target registered");
        assert_eq!(outcome, TraverseOutcome::Installed);
        let t = registry.traverse().expect("live traverse").clone();
        assert_eq!(t.target_relative, Point::new(110.0, 60.0));
        // Centre (160, 85) in a 100x50 cell grid: row 1, column 1 -> 5, clamped to count 3.
        assert_eq!(t.target_index, 3);
        // Slot 3 sits at (300, 0) in "right"; "right" is 500 px right of "left".
        assert_eq!(t.release, Point::new(800.0, 0.0));
        assert!(!t.execute);
        assert_eq!(registry.traverse_index_for(&"right".into()), Some(3));
        assert_eq!(registry.traverse_index_for(&"left".into()), None);
    }

    #[test]
    fn traverse_before_target_clamps_to_first_slot() {
        let mut registry = two_grids();
        registry
            .begin_or_update_traverse(&"left".into(), &"right".into(), Point::new(440.0, -40.0), 0)
            .expect("target registered");
        assert_eq!(registry.traverse().map(|t| t.target_index), Some(0));
    }

    #[test]
    fn traverse_to_unknown_target_errors() {
        let mut registry = two_grids();
        assert_eq!(
            registry.begin_or_update_traverse(&"left".into(), &"nope".into(), Point::ZERO, 0),
            Err(RegistryError::UnknownGrid { id: "nope".into() })
        );
        assert!(registry.traverse().is_none());
    }

    #[test]
    fn observed_policy_suppresses_only_when_both_differ() {
        let mut registry = two_grids();
        registry.register("third".into(), entry(0.0, 300.0, 400.0, 200.0, 0));
        let left: GridId = "left".into();
        registry
            .begin_or_update_traverse(&left, &"right".into(), Point::new(510.0, 10.0), 0)
            .expect("registered");
        // Same target, same index: still replaced.
        assert_eq!(
            registry.begin_or_update_traverse(&left, &"right".into(), Point::new(511.0, 10.0), 0),
            Ok(TraverseOutcome::Replaced)
        );
        // Different target, same index: replaced.
        assert_eq!(
            registry.begin_or_update_traverse(&left, &"third".into(), Point::new(-40.0, 300.0), 0),
            Ok(TraverseOutcome::Replaced)
        );
        assert_eq!(registry.traverse().map(|t| t.target_index), Some(0));
        // Different target and different index: suppressed.
        assert_eq!(
            registry.begin_or_update_traverse(&left, &"right".into(), Point::new(810.0, 10.0), 0),
            Ok(TraverseOutcome::Suppressed)
        );
        assert_eq!(
            registry.traverse().map(|t| t.target_id.clone()),
            Some("third".into())
        );
    }

    #[test]
    fn skip_redundant_policy_ignores_repeats() {
        let mut registry = DropRegistry::new(
            RegistryConfig::default().with_traverse_updates(TraverseUpdatePolicy::SkipRedundant),
        );
        registry.register("left".into(), entry(0.0, 0.0, 400.0, 200.0, 6));
        registry.register("right".into(), entry(500.0, 0.0, 400.0, 200.0, 3));
        let left: GridId = "left".into();
        let right: GridId = "right".into();
        registry
            .begin_or_update_traverse(&left, &right, Point::new(510.0, 10.0), 0)
            .expect("registered");
        assert_eq!(
            registry.begin_or_update_traverse(&left, &right, Point::new(512.0, 12.0), 0),
            Ok(TraverseOutcome::Suppressed)
        );
        assert_eq!(
            registry.begin_or_update_traverse(&left, &right, Point::new(610.0, 10.0), 0),
            Ok(TraverseOutcome::Replaced)
        );
    }

    #[test]
    fn two_phase_commit_then_consume() {
        let mut registry = two_grids();
        let (left, right): (GridId, GridId) = ("left".into(), "right".into());
        registry
            .begin_or_update_traverse(&left, &right, Point::new(510.0, 10.0), 4)
            .expect("registered");
        assert_eq!(registry.arrival(&right), None);

        let arrival = registry
            .prepare_arrival(&right, &left, Point::new(10.0, 10.0))
            .expect("live traverse");
        assert_eq!(arrival.origin, Point::new(10.0, 10.0));
        assert_eq!(registry.traverse_index_for(&right), None);

        let change = registry.commit(left.clone(), 4, arrival.target_index, Some(right.clone()));
        assert!(change.is_cross_grid());
        assert_eq!(change.source_index, 4);

        assert_eq!(registry.take_arrival(&right, arrival.target_index + 1), None);
        assert_eq!(registry.take_arrival(&right, arrival.target_index), Some(arrival));
        assert!(registry.traverse().is_none());
    }

    #[test]
    fn prepare_requires_matching_traverse() {
        let mut registry = two_grids();
        let (left, right): (GridId, GridId) = ("left".into(), "right".into());
        assert_eq!(
            registry.prepare_arrival(&right, &left, Point::ZERO),
            Err(RegistryError::NoActiveTraverse)
        );
        registry
            .begin_or_update_traverse(&left, &right, Point::new(510.0, 10.0), 0)
            .expect("registered");
        assert!(matches!(
            registry.prepare_arrival(&left, &right, Point::ZERO),
            Err(RegistryError::TraverseMismatch { .. })
        ));
    }

    #[test]
    fn single_step_commit_marks_execute() {
        let mut registry = two_grids();
        let (left, right): (GridId, GridId) = ("left".into(), "right".into());
        registry
            .begin_or_update_traverse(&left, &right, Point::new(510.0, 10.0), 1)
            .expect("registered");
        registry.commit(left, 1, 0, Some(right.clone()));
        let arrival = registry.arrival(&right).expect("executed");
        assert_eq!(arrival.origin, Point::new(10.0, 10.0));
    }

    #[test]
    fn same_grid_commit_leaves_traverse_alone() {
        let mut registry = two_grids();
        let change = registry.commit("left".into(), 2, 2, None);
        assert!(change.is_noop());
        assert!(registry.traverse().is_none());
    }

    #[test]
    fn remeasure_refreshes_bounds_and_columns() {
        let source = Rc::new(Cell::new(Bounds::new(0.0, 0.0, 400.0, 200.0)));
        let mut registry = DropRegistry::default();
        registry.register(
            "m".into(),
            entry(0.0, 0.0, 400.0, 200.0, 2).with_measure(source.clone()),
        );
        registry.register("fixed".into(), entry(500.0, 0.0, 400.0, 200.0, 2));
        source.set(Bounds::new(20.0, 30.0, 200.0, 200.0));
        assert_eq!(registry.remeasure_all(), 1);
        let grid = registry.get(&"m".into()).expect("registered");
        assert_eq!(grid.bounds.left, 20.0);
        assert_eq!(grid.grid.column_width(), 50.0);
    }

    #[test]
    fn change_serializes_without_absent_target() {
        let change = GridChange::unchanged("a".into(), 3);
        let json = serde_json::to_value(&change).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"source_id": "a", "source_index": 3, "target_index": 3})
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            RegistryError::UnknownGrid { id: "x".into() }.to_string(),
            "grid x is not registered"
        );
        let err = RegistryError::TraverseMismatch {
            expected_source: "a".into(),
            expected_target: "b".into(),
            source: "c".into(),
            target: "d".into(),
        };
        assert_eq!(err.to_string(), "traverse runs a -> b, not c -> d");
    }
}
