//! Headless hosts and a pump-style harness for exercising waterfall layouts
//! without a UI host.
//!
//! [`HeadlessSurface`] defers height deliveries until [`HeadlessSurface::pump`]
//! is called, reproducing the mount-then-observe timing of a real host.
//! [`ScriptedScrollContainer`] is a scroll container whose geometry tests set
//! directly. [`MasonryTestRule`] wires both to a [`waterfall_ui::Masonry`]
//! and pumps the measurement pipeline to idle.

mod rule;
mod scroll;
mod surface;

pub use rule::*;
pub use scroll::*;
pub use surface::*;
