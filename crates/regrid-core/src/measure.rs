#![forbid(unsafe_code)]

//! Measurement seam.
//!
//! The host owns the render tree and knows where a grid container ended up on
//! the page. It hands that knowledge to regrid through [`Measure`]. A grid
//! asks for fresh bounds when it syncs, and the coordination registry asks
//! every grid's source again when a drag starts (starting a drag can change
//! layout-affecting content such as scrollbars).

use std::cell::Cell;
use std::rc::Rc;

use crate::geometry::Bounds;

/// Source of a container's current page-space bounds.
pub trait Measure {
    /// Measure the container now.
    fn measure(&self) -> Bounds;
}

impl Measure for Cell<Bounds> {
    fn measure(&self) -> Bounds {
        self.get()
    }
}

impl<M: Measure + ?Sized> Measure for Rc<M> {
    fn measure(&self) -> Bounds {
        (**self).measure()
    }
}
