//! Scriptable scroll container.

use std::cell::RefCell;
use std::rc::Rc;

use waterfall_ui::ScrollContainer;

#[derive(Default)]
struct ScrollGeometry {
    offset: f32,
    viewport_extent: f32,
    content_extent: f32,
    programmatic_scrolls: Vec<f32>,
}

/// Scroll container whose geometry is set directly by tests.
///
/// Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct ScriptedScrollContainer {
    state: Rc<RefCell<ScrollGeometry>>,
}

impl ScriptedScrollContainer {
    pub fn new(viewport_extent: f32) -> Self {
        let container = Self::default();
        container.state.borrow_mut().viewport_extent = viewport_extent;
        container
    }

    /// Simulates user scrolling to `offset`.
    pub fn scroll_to(&self, offset: f32) {
        self.state.borrow_mut().offset = offset;
    }

    pub fn set_viewport_extent(&self, extent: f32) {
        self.state.borrow_mut().viewport_extent = extent;
    }

    pub fn set_content_extent(&self, extent: f32) {
        self.state.borrow_mut().content_extent = extent;
    }

    /// Offsets the component scrolled to programmatically, oldest first.
    pub fn programmatic_scrolls(&self) -> Vec<f32> {
        self.state.borrow().programmatic_scrolls.clone()
    }
}

impl ScrollContainer for ScriptedScrollContainer {
    fn scroll_offset(&self) -> f32 {
        self.state.borrow().offset
    }

    fn viewport_extent(&self) -> f32 {
        self.state.borrow().viewport_extent
    }

    fn content_extent(&self) -> f32 {
        self.state.borrow().content_extent
    }

    fn set_scroll_offset(&self, offset: f32) {
        let mut state = self.state.borrow_mut();
        state.offset = offset;
        state.programmatic_scrolls.push(offset);
    }
}
