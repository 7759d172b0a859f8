//! Masonry component layer for the waterfall layout engine.
//!
//! This crate wires the host-independent core ([`waterfall_foundation`]) to a
//! concrete UI host through two capability traits:
//!
//! - [`MeasureSurface`] - an invisible surface that mounts renderables and
//!   reports their laid-out heights asynchronously, in mounted order
//! - [`ScrollContainer`] - the element (or window) whose scroll position and
//!   size drive viewport computation
//!
//! [`Masonry`] is the public entry point; [`MeasurePipeline`] drives the
//! measure-then-commit loop underneath it.

mod masonry;
mod pipeline;
mod scroll;
mod surface;

pub use masonry::*;
pub use pipeline::*;
pub use scroll::*;
pub use surface::*;

// Re-export the foundation types that appear in this crate's public API -
// single source of truth.
pub use waterfall_foundation::{
    ColumnCount, ItemKey, MasonryLayoutState, PositionedItem, ViewportState,
};
