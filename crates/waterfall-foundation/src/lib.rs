//! Host-independent core of the waterfall masonry layout engine.
//!
//! A masonry (waterfall) layout packs variable-height items into fixed-width
//! columns, each column growing independently. Item heights are only known
//! after the host has rendered them, so packing is incremental: items are
//! measured off-screen in bounded batches and committed one by one without
//! disturbing already-placed items.
//!
//! # Architecture
//!
//! - [`PendingQueue`] - ordered work buffer that releases gap-free runs
//! - [`MasonryLayoutState`] - the column packer and positioned-item cache
//! - [`ViewportState`] / [`is_visible`] - viewport intersection with overscan
//! - [`ColumnCount`] - fixed or breakpoint-driven column resolution
//! - [`Throttle`] / [`Debounce`] - rate limiting for resize/scroll storms
//!
//! Nothing in this crate knows how rendering or measurement happens; those
//! capabilities live behind traits in the component layer.

mod columns;
mod key;
mod layout;
mod queue;
mod rate_limit;
mod viewport;

pub use columns::*;
pub use key::*;
pub use layout::*;
pub use queue::*;
pub use rate_limit::*;
pub use viewport::*;
