#![forbid(unsafe_code)]

//! Time-driven animation primitives.
//!
//! Nothing here owns a clock; hosts advance springs once per frame with the
//! elapsed time.

pub mod spring;

pub use spring::{Spring, SpringPoint};
