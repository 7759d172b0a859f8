//! Scroll container capability.

/// The scrollable element (or window) a masonry lives in.
///
/// The component only ever samples this on its own event-loop turn; hosts
/// with interior mutability can hand out cheap clones. When no container can
/// be resolved the component runs with scroll tracking disabled rather than
/// erroring.
pub trait ScrollContainer {
    /// Current scroll offset in pixels.
    fn scroll_offset(&self) -> f32;

    /// Extent of the visible viewport along the scroll axis.
    fn viewport_extent(&self) -> f32;

    /// Total scrollable content extent.
    fn content_extent(&self) -> f32;

    /// Programmatically scrolls to `offset`.
    fn set_scroll_offset(&self, offset: f32);
}
