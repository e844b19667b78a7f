#![forbid(unsafe_code)]

//! Reorderable grid drop zone.
//!
//! A [`GridDropZone`] owns one ordered set of items laid out in fixed
//! columns. It turns drag progress on its items into placeholder updates,
//! asks the shared registry to track drags that leave for a sibling grid,
//! and reports exactly one [`GridChange`] per completed drag. The zone never
//! reorders anything on its own: the caller applies the change to its lists
//! and hands the new keys back through [`GridDropZone::set_items`].
//!
//! # State Machine
//!
//! ```text
//! Idle ──claim──► Dragging(i) ──move──► Placeholder-active / Traversing
//!   ▲                 │                          │
//!   └──── release / terminate (one GridChange) ◄─┘
//! ```
//!
//! # Invariants
//!
//! 1. Placeholder and dragging index are cleared at the end of every drag,
//!    whatever the outcome.
//! 2. A drag whose centre never leaves this zone never creates a traverse.
//! 3. With a live traverse from this zone, the release commits the
//!    traverse's recorded source and target, not the raw release slot.
//! 4. Items are reported hidden while the zone is unmeasured.

use std::fmt;
use std::hash::Hash;
use std::rc::Rc;
use std::time::Duration;

use ahash::AHashMap;
use regrid_core::animation::Spring;
use regrid_core::geometry::{Bounds, Point};
use regrid_core::gesture::DragSignal;
use regrid_core::measure::Measure;
use regrid_layout::grid::{
    GridSettings, GridSettingsError, position_for_index, resolve_slot, target_index,
};
use regrid_layout::list::swap;
use regrid_layout::registry::{GridChange, GridId, RegisteredGrid, RegistryError};
use serde::{Deserialize, Serialize};

use crate::item::{GridItem, ItemStyle};
use crate::provider::GridProvider;

/// Drop zone misuse.
#[derive(Debug, Clone, PartialEq)]
pub enum DropZoneError {
    InvalidSettings(GridSettingsError),
    /// A gesture named an item index the zone does not have.
    UnknownItem {
        index: usize,
        count: usize,
    },
    Registry(RegistryError),
}

impl fmt::Display for DropZoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSettings(err) => write!(f, "invalid grid settings: {err}"),
            Self::UnknownItem { index, count } => {
                write!(f, "no item at index {index} (grid holds {count})")
            }
            Self::Registry(err) => write!(f, "registry: {err}"),
        }
    }
}

impl std::error::Error for DropZoneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidSettings(err) => Some(err),
            Self::Registry(err) => Some(err),
            Self::UnknownItem { .. } => None,
        }
    }
}

impl From<GridSettingsError> for DropZoneError {
    fn from(err: GridSettingsError) -> Self {
        Self::InvalidSettings(err)
    }
}

impl From<RegistryError> for DropZoneError {
    fn from(err: RegistryError) -> Self {
        Self::Registry(err)
    }
}

/// Per-zone configuration.
#[derive(Debug, Clone)]
pub struct DropZoneConfig {
    pub boxes_per_row: usize,
    pub row_height: f64,
    pub disable_drag: bool,
    pub disable_drop: bool,
    /// Spring parameters for item motion.
    pub motion: Spring,
}

impl DropZoneConfig {
    #[must_use]
    pub fn new(boxes_per_row: usize, row_height: f64) -> Self {
        Self {
            boxes_per_row,
            row_height,
            disable_drag: false,
            disable_drop: false,
            motion: Spring::at(0.0),
        }
    }

    #[must_use]
    pub fn disable_drag(mut self, disable: bool) -> Self {
        self.disable_drag = disable;
        self
    }

    #[must_use]
    pub fn disable_drop(mut self, disable: bool) -> Self {
        self.disable_drop = disable;
        self
    }

    #[must_use]
    pub fn motion(mut self, spring: Spring) -> Self {
        self.motion = spring;
        self
    }
}

/// The slot displaced by the drag in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    pub start_index: usize,
    pub target_index: usize,
}

/// What a zone did with a [`DragSignal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalResponse {
    /// The drag was accepted.
    Claimed,
    /// The drag was declined; the gesture source should stop reporting it.
    Rejected,
    /// Drag progress was applied.
    Tracking,
    /// The drag finished with this change.
    Finished(GridChange),
    /// The item is not being dragged.
    Ignored,
}

/// Render frame for one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemLayout<K> {
    pub key: K,
    /// Index in the caller's list.
    pub index: usize,
    /// Visual slot after placeholder reordering.
    pub slot: usize,
    /// Where the item rests, relative to the zone.
    pub resting: Point,
    /// Where the item is drawn this frame.
    pub position: Point,
    pub style: ItemStyle,
    pub dragging: bool,
    pub hidden: bool,
}

#[cfg(feature = "tracing")]
struct DragTrace {
    span: tracing::Span,
    started: web_time::Instant,
}

/// A grid of draggable items sharing a [`GridProvider`] with its siblings.
pub struct GridDropZone<K> {
    id: GridId,
    provider: GridProvider,
    config: DropZoneConfig,
    measure: Rc<dyn Measure>,
    grid: GridSettings,
    bounds: Bounds,
    items: Vec<GridItem<K>>,
    placeholder: Option<Placeholder>,
    dragging_index: Option<usize>,
    mounted: bool,
    #[cfg(feature = "tracing")]
    drag_trace: Option<DragTrace>,
}

impl<K: fmt::Debug> fmt::Debug for GridDropZone<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridDropZone")
            .field("id", &self.id)
            .field("grid", &self.grid)
            .field("bounds", &self.bounds)
            .field("items", &self.items)
            .field("placeholder", &self.placeholder)
            .field("dragging_index", &self.dragging_index)
            .field("mounted", &self.mounted)
            .finish_non_exhaustive()
    }
}

impl<K> GridDropZone<K> {
    #[must_use]
    pub fn id(&self) -> &GridId {
        &self.id
    }

    #[must_use]
    pub fn provider(&self) -> &GridProvider {
        &self.provider
    }

    #[must_use]
    pub fn config(&self) -> &DropZoneConfig {
        &self.config
    }

    #[must_use]
    pub fn grid(&self) -> GridSettings {
        self.grid
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[must_use]
    pub fn items(&self) -> &[GridItem<K>] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn placeholder(&self) -> Option<Placeholder> {
        self.placeholder
    }

    #[must_use]
    pub fn dragging_index(&self) -> Option<usize> {
        self.dragging_index
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn registration(&self) -> RegisteredGrid {
        RegisteredGrid::new(self.bounds, self.items.len(), self.grid)
            .with_drop_enabled(!self.config.disable_drop)
            .with_measure(Rc::clone(&self.measure))
    }

    /// Returns `true` when the zone just received its first usable width.
    fn remeasure(&mut self) -> bool {
        let was_unmeasured = self.grid.is_unmeasured();
        self.bounds = self.measure.measure();
        self.grid = self.grid.with_container_width(self.bounds.width);
        was_unmeasured && !self.grid.is_unmeasured()
    }

    /// Items laid out before the zone had a width have nowhere sensible to
    /// animate from.
    fn reveal(&mut self) {
        for item in &mut self.items {
            item.snap_to_resting();
        }
    }

    /// Measure and register with the provider.
    pub fn mount(&mut self) {
        let revealed = self.remeasure();
        self.provider.register(self.id.clone(), self.registration());
        self.mounted = true;
        self.relayout();
        if revealed {
            self.reveal();
        }
    }

    /// Re-measure and re-register if anything the registry tracks changed.
    /// Mounts the zone if it is not mounted. Returns whether the
    /// registration was written.
    pub fn sync(&mut self) -> bool {
        if !self.mounted {
            self.mount();
            return true;
        }
        let revealed = self.remeasure();
        let registration = self.registration();
        let stale = self
            .provider
            .registered(&self.id)
            .is_none_or(|current| !current.same_geometry(&registration));
        if stale {
            self.provider.register(self.id.clone(), registration);
        }
        self.relayout();
        if revealed {
            self.reveal();
        }
        stale
    }

    /// Deregister from the provider. Dropping the zone does the same.
    pub fn unmount(&mut self) {
        if self.mounted {
            self.provider.remove(&self.id);
            self.mounted = false;
        }
    }

    fn sync_if_mounted(&mut self) {
        if self.mounted {
            self.sync();
        }
    }

    pub fn set_disable_drag(&mut self, disable: bool) {
        self.config.disable_drag = disable;
    }

    pub fn set_disable_drop(&mut self, disable: bool) {
        self.config.disable_drop = disable;
        self.sync_if_mounted();
    }

    /// Enable or disable dragging for one item.
    pub fn set_item_drag_enabled(
        &mut self,
        index: usize,
        enabled: bool,
    ) -> Result<(), DropZoneError> {
        self.item_mut(index)?.set_drag_enabled(enabled);
        Ok(())
    }

    fn item(&self, index: usize) -> Result<&GridItem<K>, DropZoneError> {
        let count = self.items.len();
        self.items
            .get(index)
            .ok_or(DropZoneError::UnknownItem { index, count })
    }

    fn item_mut(&mut self, index: usize) -> Result<&mut GridItem<K>, DropZoneError> {
        let count = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(DropZoneError::UnknownItem { index, count })
    }

    /// Visual slot of every item, indexed by list position.
    fn slots(&self) -> Vec<usize> {
        let len = self.items.len();
        let Some(placeholder) = self.placeholder.filter(|p| p.start_index < len) else {
            return (0..len).collect();
        };
        let identity: Vec<usize> = (0..len).collect();
        let target = placeholder.target_index.min(len.saturating_sub(1));
        let order = swap(&identity, placeholder.start_index, target)
            .map(|order| order.into_owned())
            .unwrap_or_else(|_| (0..len).collect());
        let mut slots = vec![0; len];
        for (slot, &index) in order.iter().enumerate() {
            slots[index] = slot;
        }
        slots
    }

    fn relayout(&mut self) {
        let slots = self.slots();
        let insertion = self.provider.traverse_index_for(&self.id);
        let grid = self.grid;
        for (item, slot) in self.items.iter_mut().zip(slots) {
            item.set_resting(position_for_index(slot, &grid, insertion));
        }
    }

    /// Accept or reject a drag on `index`.
    ///
    /// Accepting re-measures every grid in the provider, since lifting an
    /// item can change layout around it.
    pub fn on_start(&mut self, index: usize) -> Result<bool, DropZoneError> {
        let drag_enabled = !self.config.disable_drag;
        if !self.item_mut(index)?.claim(drag_enabled) {
            return Ok(false);
        }
        self.provider.remeasure_all();
        if let Some(current) = self.provider.registered(&self.id) {
            self.bounds = current.bounds;
            self.grid = current.grid;
        }
        self.dragging_index = Some(index);

        #[cfg(feature = "tracing")]
        {
            let span = tracing::debug_span!(
                "drop_zone.drag",
                grid = %self.id,
                index,
                target_index = tracing::field::Empty,
                cross_grid = tracing::field::Empty,
                drag_duration_us = tracing::field::Empty
            );
            span.in_scope(|| {
                tracing::debug!(message = "drop_zone.drag_start", grid = %self.id, index);
            });
            self.drag_trace = Some(DragTrace {
                span,
                started: web_time::Instant::now(),
            });
        }

        Ok(true)
    }

    /// Drag progress. `position` is the item's top-left corner relative to
    /// this zone and `delta` its displacement since the drag began.
    pub fn on_move(
        &mut self,
        index: usize,
        position: Point,
        delta: Point,
    ) -> Result<(), DropZoneError> {
        self.item_mut(index)?.drag_by(delta);
        if self.dragging_index != Some(index) {
            self.dragging_index = Some(index);
        }

        let centre = position + self.grid.half_cell();
        let target = self.provider.active_drop_target(&self.id, centre);
        match &target {
            Some(other) if *other != self.id => {
                let begun = self
                    .provider
                    .begin_or_update_traverse(&self.id, other, position, index);
                if let Err(_err) = begun {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        message = "drop_zone.traverse_skipped",
                        grid = %self.id,
                        error = %_err
                    );
                }
            }
            _ => {
                self.provider.end_traverse();
            }
        }

        let count = self.items.len();
        let raw = if target.as_ref() == Some(&self.id) {
            target_index(index, &self.grid, count, delta.x, delta.y)
        } else {
            isize::try_from(count).unwrap_or(isize::MAX)
        };
        self.placeholder = match resolve_slot(raw, count) {
            Some(slot) if slot != index => match self.placeholder {
                Some(current) if current.target_index == slot => Some(current),
                _ => Some(Placeholder {
                    start_index: index,
                    target_index: slot,
                }),
            },
            _ => None,
        };

        self.relayout();
        Ok(())
    }

    /// Finish the drag on `index` and report the resulting change.
    pub fn on_end(
        &mut self,
        index: usize,
        position: Point,
        delta: Point,
    ) -> Result<GridChange, DropZoneError> {
        self.item(index)?;
        let outcome = self.resolve_release(index, position, delta);

        self.placeholder = None;
        self.dragging_index = None;
        if let Some(item) = self.items.get_mut(index) {
            item.finish();
        }
        self.relayout();

        #[cfg(feature = "tracing")]
        {
            if let Some(trace) = self.drag_trace.take() {
                let elapsed_us =
                    u64::try_from(trace.started.elapsed().as_micros()).unwrap_or(u64::MAX);
                trace.span.record("drag_duration_us", elapsed_us);
                if let Ok(change) = &outcome {
                    trace.span.record("target_index", change.target_index);
                    trace.span.record("cross_grid", change.is_cross_grid());
                }
                trace.span.in_scope(|| {
                    tracing::debug!(
                        message = "drop_zone.drag_end",
                        grid = %self.id,
                        index,
                        committed = outcome.is_ok()
                    );
                });
            }
        }

        outcome
    }

    fn resolve_release(
        &mut self,
        index: usize,
        position: Point,
        delta: Point,
    ) -> Result<GridChange, DropZoneError> {
        let traverse = self
            .provider
            .traverse()
            .filter(|t| t.source_id == self.id && !t.execute);
        if let Some(traverse) = traverse {
            self.provider.prepare_arrival(
                &traverse.target_id,
                &traverse.source_id,
                traverse.target_relative,
            )?;
            return Ok(self.provider.commit(
                traverse.source_id,
                traverse.source_index,
                traverse.target_index,
                Some(traverse.target_id),
            ));
        }

        let count = self.items.len();
        let centre = position + self.grid.half_cell();
        let over_self =
            self.provider.active_drop_target(&self.id, centre).as_ref() == Some(&self.id);
        let slot = if over_self {
            resolve_slot(target_index(index, &self.grid, count, delta.x, delta.y), count)
        } else {
            None
        };
        let target = slot.map_or(index, |slot| slot.min(count.saturating_sub(1)));
        Ok(self.provider.commit(self.id.clone(), index, target, None))
    }

    /// Feed one gesture signal for the item at `index`.
    pub fn handle_signal(
        &mut self,
        index: usize,
        signal: DragSignal,
    ) -> Result<SignalResponse, DropZoneError> {
        match signal {
            DragSignal::Claim => Ok(if self.on_start(index)? {
                SignalResponse::Claimed
            } else {
                SignalResponse::Rejected
            }),
            DragSignal::Move { delta } => {
                let item = self.item(index)?;
                if !item.is_dragging() {
                    return Ok(SignalResponse::Ignored);
                }
                let position = item.dragged_position(delta);
                self.on_move(index, position, delta)?;
                Ok(SignalResponse::Tracking)
            }
            DragSignal::Release { delta } | DragSignal::Terminate { delta } => {
                let item = self.item(index)?;
                if !item.is_dragging() {
                    return Ok(SignalResponse::Ignored);
                }
                let position = item.dragged_position(delta);
                self.on_end(index, position, delta).map(SignalResponse::Finished)
            }
        }
    }

    /// Refresh resting slots and advance item motion by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        self.relayout();
        for item in &mut self.items {
            item.advance(dt);
        }
    }

    /// Whether every item has settled.
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.items.iter().all(|item| item.motion().is_at_rest())
    }
}

impl<K: Clone + Eq + Hash> GridDropZone<K> {
    /// Create an unmounted zone.
    pub fn new(
        id: impl Into<GridId>,
        provider: GridProvider,
        config: DropZoneConfig,
        measure: Rc<dyn Measure>,
    ) -> Result<Self, DropZoneError> {
        let grid = GridSettings::new(config.boxes_per_row, config.row_height, 0.0)?;
        Ok(Self {
            id: id.into(),
            provider,
            config,
            measure,
            grid,
            bounds: Bounds::EMPTY,
            items: Vec::new(),
            placeholder: None,
            dragging_index: None,
            mounted: false,
            #[cfg(feature = "tracing")]
            drag_trace: None,
        })
    }

    /// Replace the item keys, keeping the motion of keys that survive.
    ///
    /// A new key at the slot a pending arrival names enters from the
    /// arrival's origin and consumes the arrival.
    pub fn set_items(&mut self, keys: impl IntoIterator<Item = K>) {
        let mut previous: AHashMap<K, GridItem<K>> = self
            .items
            .drain(..)
            .map(|item| (item.key().clone(), item))
            .collect();
        let grid = self.grid;
        let mut next = Vec::with_capacity(previous.len() + 1);
        for (index, key) in keys.into_iter().enumerate() {
            let item = match previous.remove(&key) {
                Some(item) => item,
                None => {
                    let resting = position_for_index(index, &grid, None);
                    match self.provider.take_arrival(&self.id, index) {
                        Some(arrival) => {
                            GridItem::entering(key, arrival.origin, resting, &self.config.motion)
                        }
                        None => GridItem::new(key, resting, &self.config.motion),
                    }
                }
            };
            next.push(item);
        }
        self.items = next;

        if self.dragging_index.is_some_and(|index| index >= self.items.len()) {
            self.dragging_index = None;
            self.placeholder = None;
        }
        if self.mounted {
            self.sync();
        } else {
            self.relayout();
        }
    }

    /// Render frames for every item, in list order.
    #[must_use]
    pub fn layout(&self) -> Vec<ItemLayout<K>> {
        let slots = self.slots();
        let insertion = self.provider.traverse_index_for(&self.id);
        let hidden = self.grid.is_unmeasured();
        self.items
            .iter()
            .zip(slots)
            .enumerate()
            .map(|(index, (item, slot))| ItemLayout {
                key: item.key().clone(),
                index,
                slot,
                resting: position_for_index(slot, &self.grid, insertion),
                position: item.motion().position(),
                style: item.motion().style(),
                dragging: self.dragging_index == Some(index),
                hidden,
            })
            .collect()
    }
}

impl<K> Drop for GridDropZone<K> {
    fn drop(&mut self) {
        self.unmount();
    }
}
