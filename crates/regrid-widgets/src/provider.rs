#![forbid(unsafe_code)]

//! Shared handle to one [`DropRegistry`] plus the caller's change handler.
//!
//! Every drop zone that should be able to exchange items receives a clone
//! of the same [`GridProvider`]. Each method borrows the registry for the
//! duration of one registry call only, so no grid ever observes another
//! grid's half-applied update, and the change handler runs after the borrow
//! is released (it may call back into the provider).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use regrid_core::geometry::Point;
use regrid_layout::registry::{
    Arrival, DropRegistry, GridChange, GridId, RegisteredGrid, RegistryConfig, RegistryError,
    Traverse, TraverseOutcome,
};

/// Callback receiving each completed drag.
pub type ChangeHandler = Rc<dyn Fn(&GridChange)>;

struct Shared {
    registry: RefCell<DropRegistry>,
    on_change: RefCell<Option<ChangeHandler>>,
}

/// Cloneable provider scope. Clones share one registry.
#[derive(Clone)]
pub struct GridProvider {
    shared: Rc<Shared>,
}

impl Default for GridProvider {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl fmt::Debug for GridProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridProvider")
            .field("registry", &self.shared.registry)
            .field("has_on_change", &self.shared.on_change.borrow().is_some())
            .finish()
    }
}

impl GridProvider {
    #[must_use]
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            shared: Rc::new(Shared {
                registry: RefCell::new(DropRegistry::new(config)),
                on_change: RefCell::new(None),
            }),
        }
    }

    /// Set the change handler (builder pattern).
    #[must_use]
    pub fn with_on_change(self, handler: impl Fn(&GridChange) + 'static) -> Self {
        self.set_on_change(handler);
        self
    }

    /// Replace the change handler for every clone of this provider.
    pub fn set_on_change(&self, handler: impl Fn(&GridChange) + 'static) {
        *self.shared.on_change.borrow_mut() = Some(Rc::new(handler));
    }

    /// Whether two handles share a registry.
    #[must_use]
    pub fn same_scope(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    /// Read-only access to the registry.
    pub fn with_registry<R>(&self, f: impl FnOnce(&DropRegistry) -> R) -> R {
        f(&*self.shared.registry.borrow())
    }

    fn write<R>(&self, f: impl FnOnce(&mut DropRegistry) -> R) -> R {
        f(&mut *self.shared.registry.borrow_mut())
    }

    pub fn register(&self, id: GridId, grid: RegisteredGrid) -> bool {
        self.write(|r| r.register(id, grid))
    }

    pub fn remove(&self, id: &GridId) -> Option<RegisteredGrid> {
        self.write(|r| r.remove(id))
    }

    #[must_use]
    pub fn registered(&self, id: &GridId) -> Option<RegisteredGrid> {
        self.with_registry(|r| r.get(id).cloned())
    }

    #[must_use]
    pub fn active_drop_target(&self, source_id: &GridId, point: Point) -> Option<GridId> {
        self.with_registry(|r| r.active_drop_target(source_id, point))
    }

    pub fn begin_or_update_traverse(
        &self,
        source_id: &GridId,
        target_id: &GridId,
        point: Point,
        source_index: usize,
    ) -> Result<TraverseOutcome, RegistryError> {
        self.write(|r| r.begin_or_update_traverse(source_id, target_id, point, source_index))
    }

    pub fn end_traverse(&self) -> Option<Traverse> {
        self.write(DropRegistry::end_traverse)
    }

    /// Snapshot of the live traverse.
    #[must_use]
    pub fn traverse(&self) -> Option<Traverse> {
        self.with_registry(|r| r.traverse().cloned())
    }

    #[must_use]
    pub fn traverse_index_for(&self, id: &GridId) -> Option<usize> {
        self.with_registry(|r| r.traverse_index_for(id))
    }

    pub fn prepare_arrival(
        &self,
        target_id: &GridId,
        source_id: &GridId,
        from: Point,
    ) -> Result<Arrival, RegistryError> {
        self.write(|r| r.prepare_arrival(target_id, source_id, from))
    }

    /// Build the change record, then hand it to the change handler.
    pub fn commit(
        &self,
        source_id: GridId,
        source_index: usize,
        target_index: usize,
        target_id: Option<GridId>,
    ) -> GridChange {
        let change = self.write(|r| r.commit(source_id, source_index, target_index, target_id));
        let handler = self.shared.on_change.borrow().clone();
        if let Some(handler) = handler {
            handler(&change);
        }
        change
    }

    #[must_use]
    pub fn arrival(&self, target_id: &GridId) -> Option<Arrival> {
        self.with_registry(|r| r.arrival(target_id))
    }

    pub fn take_arrival(&self, target_id: &GridId, index: usize) -> Option<Arrival> {
        self.write(|r| r.take_arrival(target_id, index))
    }

    pub fn remeasure_all(&self) -> usize {
        self.write(DropRegistry::remeasure_all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regrid_core::geometry::Bounds;
    use regrid_layout::grid::GridSettings;
    use std::cell::Cell;

    fn entry(left: f64) -> RegisteredGrid {
        RegisteredGrid::new(
            Bounds::new(left, 0.0, 200.0, 100.0),
            2,
            GridSettings::from_container_width(200.0, 2, 50.0).expect("valid settings"),
        )
    }

    #[test]
    fn clones_share_one_registry() {
        let provider = GridProvider::default();
        let other = provider.clone();
        provider.register("a".into(), entry(0.0));
        assert!(other.registered(&"a".into()).is_some());
        assert!(provider.same_scope(&other));
        assert!(!provider.same_scope(&GridProvider::default()));
    }

    #[test]
    fn separate_providers_do_not_interfere() {
        let first = GridProvider::default();
        let second = GridProvider::default();
        first.register("a".into(), entry(0.0));
        assert!(second.registered(&"a".into()).is_none());
        assert_eq!(second.active_drop_target(&"a".into(), Point::new(10.0, 10.0)), None);
    }

    #[test]
    fn commit_notifies_handler_once() {
        let seen = Rc::new(Cell::new(0));
        let counter = Rc::clone(&seen);
        let provider = GridProvider::default().with_on_change(move |change| {
            assert_eq!(change.source_index, 1);
            counter.set(counter.get() + 1);
        });
        provider.commit("a".into(), 1, 0, None);
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn handler_may_reenter_provider() {
        let provider = GridProvider::default();
        provider.register("a".into(), entry(0.0));
        let inner = provider.clone();
        let observed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&observed);
        provider.set_on_change(move |_| {
            inner.register("b".into(), entry(300.0));
            flag.set(inner.registered(&"b".into()).is_some());
        });
        provider.commit("a".into(), 0, 1, None);
        assert!(observed.get());
    }
}
