//! Viewport intersection and scroll-edge predicates.

/// Extra distance beyond the viewport within which items are still rendered,
/// to avoid pop-in during fast scrolling.
pub const DEFAULT_OVERSCAN_MARGIN: f32 = 800.0;

/// Pixel distance from the scroll end that counts as "reached the bottom".
pub const DEFAULT_BOTTOM_THRESHOLD: f32 = 100.0;

/// Transient scroll geometry, recomputed on every scroll/resize tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewportState {
    /// Current scroll offset of the container.
    pub scroll_offset: f32,
    /// Visible extent of the container along the scroll axis.
    pub viewport_extent: f32,
}

/// Whether an item spanning `top..bottom` (in content coordinates) should be
/// mounted for the given viewport.
///
/// The window is over-approximated by `margin` on both sides: an item is
/// visible when either edge falls inside the widened window, or when it fully
/// spans it. Pure arithmetic; called once per positioned item per render
/// pass.
pub fn is_visible(top: f32, bottom: f32, viewport: ViewportState, margin: f32) -> bool {
    let rel_top = top - viewport.scroll_offset;
    let rel_bottom = bottom - viewport.scroll_offset;

    let lo = -margin;
    let hi = viewport.viewport_extent + margin;

    (rel_top > lo && rel_top < hi)
        || (rel_bottom > lo && rel_bottom < hi)
        || (rel_top < lo && rel_bottom > hi)
}

/// Whether the viewport is within `threshold` of the end of the content.
///
/// Edge-triggered by the caller: this is evaluated per scroll event, not
/// latched, so pagination side effects must be debounced by the notification
/// receiver if idempotence matters.
pub fn reached_bottom(viewport: ViewportState, content_extent: f32, threshold: f32) -> bool {
    viewport.scroll_offset + viewport.viewport_extent >= content_extent - threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(scroll_offset: f32, viewport_extent: f32) -> ViewportState {
        ViewportState {
            scroll_offset,
            viewport_extent,
        }
    }

    #[test]
    fn test_visibility_boundary_below_viewport() {
        let vp = viewport(0.0, 1000.0);
        // Widened window is (-800, 1800); the top edge must fall strictly
        // inside it.
        assert!(is_visible(1799.0, 1850.0, vp, 800.0));
        assert!(!is_visible(1800.0, 1850.0, vp, 800.0));
    }

    #[test]
    fn test_visibility_boundary_above_viewport() {
        let vp = viewport(2000.0, 1000.0);
        // Window in content coordinates: (1200, 3800).
        assert!(is_visible(100.0, 1201.0, vp, 800.0));
        assert!(!is_visible(100.0, 1200.0, vp, 800.0));
    }

    #[test]
    fn test_item_spanning_whole_window_is_visible() {
        let vp = viewport(5000.0, 1000.0);
        assert!(is_visible(0.0, 20_000.0, vp, 800.0));
    }

    #[test]
    fn test_scrolled_item_tracks_offset() {
        let vp0 = viewport(0.0, 600.0);
        let vp_far = viewport(10_000.0, 600.0);
        assert!(is_visible(200.0, 300.0, vp0, 800.0));
        assert!(!is_visible(200.0, 300.0, vp_far, 800.0));
    }

    #[test]
    fn test_reached_bottom_threshold() {
        let vp = viewport(900.0, 1000.0);
        assert!(reached_bottom(vp, 2000.0, 100.0));
        assert!(!reached_bottom(viewport(899.0, 1000.0), 2000.0, 100.0));
    }
}
