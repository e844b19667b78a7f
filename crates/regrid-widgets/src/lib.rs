#![forbid(unsafe_code)]

//! Headless reorderable grid widgets.
//!
//! A [`GridProvider`] scopes a group of [`GridDropZone`]s that can trade
//! items. Zones compute layout and motion frames; drawing them is up to the
//! host.

pub mod drop_zone;
pub mod item;
pub mod provider;

pub use drop_zone::{
    DropZoneConfig, DropZoneError, GridDropZone, ItemLayout, Placeholder, SignalResponse,
};
pub use item::{GridItem, ItemMotion, ItemStyle};
pub use provider::{ChangeHandler, GridProvider};
