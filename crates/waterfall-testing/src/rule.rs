//! Pump-style harness wiring a masonry to the headless hosts.

use std::rc::Rc;

use waterfall_foundation::ItemKey;
use waterfall_ui::{Masonry, MasonryArgs};

use crate::scroll::ScriptedScrollContainer;
use crate::surface::{HeadlessSurface, MeasuredBox};

/// A masonry wired to a [`HeadlessSurface`] and a
/// [`ScriptedScrollContainer`], with helpers that drive the measurement
/// pipeline the way a host frame loop would.
pub struct MasonryTestRule<T> {
    pub masonry: Masonry<T, HeadlessSurface>,
    pub surface: HeadlessSurface,
    pub scroll: ScriptedScrollContainer,
}

impl<T: Clone + 'static> MasonryTestRule<T> {
    pub fn new(args: MasonryArgs<T, MeasuredBox>) -> Self {
        let surface = HeadlessSurface::new();
        let scroll = ScriptedScrollContainer::new(1000.0);
        let masonry = Masonry::new(
            args,
            Rc::new(surface.clone()),
            Some(Rc::new(scroll.clone())),
        );
        Self {
            masonry,
            surface,
            scroll,
        }
    }

    /// Resizes the container and settles all resulting measurement work.
    pub fn layout(&self, container_width: f32) {
        self.masonry.handle_resize(container_width, 0.0);
        self.settle();
    }

    /// Pumps pending measurements until the pipeline goes idle (or stalls).
    pub fn settle(&self) {
        self.surface.pump_to_idle();
        // Keep the scriptable content extent in sync with the packed layout,
        // the way a real host grows its scroll range.
        self.scroll
            .set_content_extent(self.masonry.content_height());
    }

    /// Simulates a user scroll followed by the rate limiter's trailing tick.
    pub fn scroll_to(&self, offset: f32) {
        self.scroll.scroll_to(offset);
        self.masonry.handle_scroll();
    }

    /// Keys of the currently visible items, in data order.
    pub fn visible_keys(&self) -> Vec<ItemKey> {
        self.masonry
            .visible_items()
            .into_iter()
            .map(|p| p.key)
            .collect()
    }
}
