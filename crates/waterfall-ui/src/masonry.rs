//! The masonry component.
//!
//! `Masonry` accepts an ordered, caller-owned data list and keeps an
//! incremental packed layout for it: new items are measured off-screen in
//! bounded batches, committed to columns, and the render pass mounts only
//! the positioned items intersecting the (overscanned) viewport.

use std::cell::RefCell;
use std::hash::Hash;
use std::rc::Rc;
use std::time::Duration;

use waterfall_foundation::{
    column_width, is_visible, item_key_of, reached_bottom, ColumnCount, Debounce, ItemKey,
    MasonryLayoutState, PositionedItem, Throttle, ViewportState, DEFAULT_BOTTOM_THRESHOLD,
    DEFAULT_OVERSCAN_MARGIN,
};

use crate::pipeline::{MeasurePipeline, RenderFn, WorkItem};
use crate::scroll::ScrollContainer;
use crate::surface::MeasureSurface;

/// Default number of items measured concurrently per batch.
pub const DEFAULT_PRE_RENDER_NUMBER: usize = 40;

/// Geometry handed to the caller's render function.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderSlot {
    /// Column width the item must render at.
    pub width: f32,
    pub x: f32,
    pub y: f32,
    /// Index in the full data sequence.
    pub index: usize,
}

/// Configuration for [`Masonry`].
///
/// # Example
///
/// ```rust,ignore
/// let args = MasonryArgs::new(|item: &Feed| item.id, |item, slot| host_card(item, slot))
///     .columns(ColumnCount::responsive(1, [(800.0, 2), (1100.0, 3)]))
///     .gutter(20.0)
///     .on_reach_bottom(|| fetch_next_page());
/// ```
pub struct MasonryArgs<T, R> {
    /// Stable identity accessor; keys must be unique within the data list.
    pub row_key: Rc<dyn Fn(&T) -> ItemKey>,
    /// Render function, shared by measurement and final placement.
    pub render: RenderFn<T, R>,
    pub columns: ColumnCount,
    /// Spacing between columns and between stacked items.
    pub gutter: f32,
    /// Backpressure knob: max items measured concurrently per batch.
    pub pre_render_number: usize,
    /// Pixel distance from the scroll end that triggers `on_reach_bottom`.
    pub bottom_threshold: f32,
    /// Extra distance beyond the viewport within which items stay mounted.
    pub overscan_margin: f32,
    pub resize_delay: Duration,
    pub scroll_delay: Duration,
    /// Edge-triggered per scroll event; receivers debounce their own
    /// pagination.
    pub on_reach_bottom: Option<Rc<dyn Fn()>>,
}

impl<T, R> MasonryArgs<T, R> {
    pub fn new<K, KF, RF>(row_key: KF, render: RF) -> Self
    where
        K: Hash,
        KF: Fn(&T) -> K + 'static,
        RF: Fn(&T, RenderSlot) -> R + 'static,
    {
        Self {
            row_key: Rc::new(move |item| item_key_of(&row_key(item))),
            render: Rc::new(render),
            columns: ColumnCount::default(),
            gutter: 0.0,
            pre_render_number: DEFAULT_PRE_RENDER_NUMBER,
            bottom_threshold: DEFAULT_BOTTOM_THRESHOLD,
            overscan_margin: DEFAULT_OVERSCAN_MARGIN,
            resize_delay: Duration::from_millis(200),
            scroll_delay: Duration::from_millis(10),
            on_reach_bottom: None,
        }
    }

    pub fn columns(mut self, columns: ColumnCount) -> Self {
        self.columns = columns;
        self
    }

    pub fn gutter(mut self, gutter: f32) -> Self {
        self.gutter = gutter;
        self
    }

    pub fn pre_render_number(mut self, count: usize) -> Self {
        self.pre_render_number = count;
        self
    }

    pub fn bottom_threshold(mut self, threshold: f32) -> Self {
        self.bottom_threshold = threshold;
        self
    }

    pub fn overscan_margin(mut self, margin: f32) -> Self {
        self.overscan_margin = margin;
        self
    }

    pub fn resize_delay(mut self, delay: Duration) -> Self {
        self.resize_delay = delay;
        self
    }

    pub fn scroll_delay(mut self, delay: Duration) -> Self {
        self.scroll_delay = delay;
        self
    }

    pub fn on_reach_bottom<F>(mut self, callback: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.on_reach_bottom = Some(Rc::new(callback));
        self
    }
}

/// Incremental masonry layout over a caller-owned item list.
///
/// Cheap to clone; clones share the same layout state, so the same masonry
/// can be driven from several host callbacks.
pub struct Masonry<T, S: MeasureSurface> {
    inner: Rc<RefCell<MasonryInner<T, S>>>,
}

impl<T, S: MeasureSurface> Clone for Masonry<T, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

struct MasonryInner<T, S: MeasureSurface> {
    row_key: Rc<dyn Fn(&T) -> ItemKey>,
    render: RenderFn<T, S::Renderable>,
    columns: ColumnCount,
    gutter: f32,
    bottom_threshold: f32,
    overscan_margin: f32,
    on_reach_bottom: Option<Rc<dyn Fn()>>,

    data: Vec<T>,
    layout: Rc<RefCell<MasonryLayoutState<T>>>,
    pipeline: MeasurePipeline<T, S>,
    scroll_container: Option<Rc<dyn ScrollContainer>>,

    viewport: ViewportState,
    container_width: f32,
    horizontal_padding: f32,
    col_width: f32,
    /// Set when layout was requested before the container was ready;
    /// retried from `tick`.
    layout_pending: bool,
    pending_resize: Option<(f32, f32)>,

    resize_throttle: Throttle,
    resize_debounce: Debounce,
    scroll_throttle: Throttle,
    scroll_debounce: Debounce,
}

impl<T, S> Masonry<T, S>
where
    T: Clone + 'static,
    S: MeasureSurface + 'static,
{
    pub fn new(
        args: MasonryArgs<T, S::Renderable>,
        surface: Rc<S>,
        scroll_container: Option<Rc<dyn ScrollContainer>>,
    ) -> Self {
        if scroll_container.is_none() {
            log::warn!("no scroll container resolved; scroll tracking disabled");
        }

        let layout = Rc::new(RefCell::new(MasonryLayoutState::new()));
        let pipeline = MeasurePipeline::new(
            surface,
            Rc::clone(&layout),
            Rc::clone(&args.render),
            args.pre_render_number,
        );

        Self {
            inner: Rc::new(RefCell::new(MasonryInner {
                row_key: args.row_key,
                render: args.render,
                columns: args.columns,
                gutter: args.gutter,
                bottom_threshold: args.bottom_threshold,
                overscan_margin: args.overscan_margin,
                on_reach_bottom: args.on_reach_bottom,
                data: Vec::new(),
                layout,
                pipeline,
                scroll_container,
                viewport: ViewportState::default(),
                container_width: 0.0,
                horizontal_padding: 0.0,
                col_width: 0.0,
                layout_pending: false,
                pending_resize: None,
                resize_throttle: Throttle::new(args.resize_delay),
                resize_debounce: Debounce::new(args.resize_delay),
                scroll_throttle: Throttle::new(args.scroll_delay),
                scroll_debounce: Debounce::new(args.scroll_delay),
            })),
        }
    }

    /// Replaces the data list. Items already positioned (by key) keep their
    /// positions; only new keys are submitted for measurement. Layout
    /// parameter changes force a full re-layout instead.
    pub fn set_data(&self, data: Vec<T>) {
        self.inner.borrow_mut().data = data;
        self.try_layout();
    }

    /// Changes the column configuration; takes effect as a full re-layout.
    pub fn set_columns(&self, columns: ColumnCount) {
        self.inner.borrow_mut().columns = columns;
        self.try_layout();
    }

    /// Changes the gutter; takes effect as a full re-layout.
    pub fn set_gutter(&self, gutter: f32) {
        self.inner.borrow_mut().gutter = gutter;
        self.try_layout();
    }

    /// Feeds a container resize event. Throttled while events stream in;
    /// a debounced trailing update (via [`tick`]) settles the final width.
    ///
    /// [`tick`]: Masonry::tick
    pub fn handle_resize(&self, container_width: f32, horizontal_padding: f32) {
        let fire = {
            let mut inner = self.inner.borrow_mut();
            inner.pending_resize = Some((container_width, horizontal_padding));
            inner.resize_debounce.arm();
            inner.resize_throttle.ready()
        };
        if fire {
            self.apply_resize();
        }
    }

    /// Feeds a scroll event from the container. Rate-limited like resize.
    pub fn handle_scroll(&self) {
        let fire = {
            let mut inner = self.inner.borrow_mut();
            inner.scroll_debounce.arm();
            inner.scroll_throttle.ready()
        };
        if fire {
            self.apply_scroll();
        }
    }

    /// Frame tick: fires debounced trailing updates and retries layouts that
    /// were deferred while the container was not ready.
    pub fn tick(&self) {
        let resize_due = self.inner.borrow_mut().resize_debounce.fire_ready();
        if resize_due {
            self.apply_resize();
        }

        let scroll_due = self.inner.borrow_mut().scroll_debounce.fire_ready();
        if scroll_due {
            self.apply_scroll();
        }

        let layout_due = {
            let inner = self.inner.borrow();
            inner.layout_pending && !inner.data.is_empty()
        };
        if layout_due {
            self.try_layout();
        }
    }

    /// Positioned items currently intersecting the overscanned viewport, in
    /// data order.
    pub fn visible_items(&self) -> Vec<PositionedItem<T>> {
        let inner = self.inner.borrow();
        let layout = inner.layout.borrow();
        inner
            .data
            .iter()
            .filter_map(|item| {
                let key = (inner.row_key)(item);
                layout
                    .positioned(key)
                    .filter(|p| is_visible(p.y, p.bottom, inner.viewport, inner.overscan_margin))
                    .cloned()
            })
            .collect()
    }

    /// Runs the caller's render function for every visible item at its final
    /// position.
    pub fn render_visible(&self) -> Vec<S::Renderable> {
        let inner = self.inner.borrow();
        let layout = inner.layout.borrow();
        inner
            .data
            .iter()
            .filter_map(|item| {
                let key = (inner.row_key)(item);
                let positioned = layout.positioned(key)?;
                if !is_visible(
                    positioned.y,
                    positioned.bottom,
                    inner.viewport,
                    inner.overscan_margin,
                ) {
                    return None;
                }
                Some((inner.render)(
                    &positioned.item,
                    RenderSlot {
                        width: positioned.width,
                        x: positioned.x,
                        y: positioned.y,
                        index: positioned.index,
                    },
                ))
            })
            .collect()
    }

    /// Rendered height of the content box.
    pub fn content_height(&self) -> f32 {
        self.inner.borrow().layout.borrow().content_height()
    }

    /// Column heights snapshot, including trailing gutters.
    pub fn column_heights(&self) -> Vec<f32> {
        self.inner.borrow().layout.borrow().column_heights().to_vec()
    }

    pub fn col_width(&self) -> f32 {
        self.inner.borrow().col_width
    }

    pub fn viewport(&self) -> ViewportState {
        self.inner.borrow().viewport
    }

    /// True when every submitted item has been measured and committed.
    pub fn is_settled(&self) -> bool {
        let inner = self.inner.borrow();
        !inner.layout_pending && inner.pipeline.is_idle()
    }

    /// True when a measurement run halted on a missing height (an item whose
    /// render produced no measurable box). Recovery requires a re-layout.
    pub fn is_stalled(&self) -> bool {
        self.inner.borrow().pipeline.is_stalled()
    }

    /// Registers a callback invoked after every committed measurement batch.
    pub fn on_layout_changed(&self, callback: Option<Rc<dyn Fn()>>) {
        self.inner.borrow().pipeline.set_on_batch_committed(callback);
    }

    /// Cancels in-flight measurement and drops pending work. Committed
    /// positions stay readable.
    pub fn teardown(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.layout_pending = false;
        inner.resize_debounce.cancel();
        inner.scroll_debounce.cancel();
        inner.pipeline.cancel();
    }

    /// Applies the latest resize, recomputing columns and column width. A
    /// changed geometry resets scroll and triggers a full re-layout through
    /// the parameter check in `try_layout`.
    fn apply_resize(&self) {
        let container = {
            let mut inner = self.inner.borrow_mut();
            let Some((width, padding)) = inner.pending_resize else {
                return;
            };
            if width <= 0.0 {
                log::debug!("ignoring resize to non-positive width {width}");
                return;
            }
            if width == inner.container_width && padding == inner.horizontal_padding {
                return;
            }
            inner.container_width = width;
            inner.horizontal_padding = padding;
            inner.viewport.scroll_offset = 0.0;
            inner.scroll_container.clone()
        };

        if let Some(container) = container {
            container.set_scroll_offset(0.0);
            self.inner.borrow_mut().viewport.viewport_extent = container.viewport_extent();
        }
        self.try_layout();
    }

    /// Samples the scroll container and fires the edge-triggered bottom
    /// notification.
    fn apply_scroll(&self) {
        let (viewport, content_extent, threshold, callback) = {
            let mut inner = self.inner.borrow_mut();
            let Some(container) = inner.scroll_container.clone() else {
                return;
            };
            inner.viewport = ViewportState {
                scroll_offset: container.scroll_offset(),
                viewport_extent: container.viewport_extent(),
            };
            (
                inner.viewport,
                container.content_extent(),
                inner.bottom_threshold,
                inner.on_reach_bottom.clone(),
            )
        };

        if reached_bottom(viewport, content_extent, threshold) {
            if let Some(callback) = callback {
                callback();
            }
        }
    }

    /// Diffs the data list against committed positions and starts a
    /// measurement run for whatever is undetermined. No-op (retried from
    /// `tick`) while the container geometry is unusable.
    fn try_layout(&self) {
        let (pipeline, work, col_width) = {
            let mut inner = self.inner.borrow_mut();

            let columns = inner.columns.resolve(inner.container_width);
            let col_width = column_width(
                inner.container_width,
                columns,
                inner.gutter,
                inner.horizontal_padding,
            );
            inner.col_width = col_width;

            if columns == 0 || col_width <= 0.0 || inner.data.is_empty() {
                inner.layout_pending = true;
                log::debug!("layout deferred: container not ready or no data");
                return;
            }
            inner.layout_pending = false;

            let full = inner
                .layout
                .borrow()
                .needs_reset(columns, col_width, inner.gutter);
            if full {
                inner
                    .layout
                    .borrow_mut()
                    .reset(columns, col_width, inner.gutter);
            }

            let work: Vec<WorkItem<T>> = {
                let layout = inner.layout.borrow();
                inner
                    .data
                    .iter()
                    .enumerate()
                    .filter_map(|(data_index, item)| {
                        let key = (inner.row_key)(item);
                        if !full && layout.is_positioned(key) {
                            return None;
                        }
                        Some(WorkItem {
                            data_index,
                            key,
                            item: item.clone(),
                        })
                    })
                    .collect()
            };

            if !full && work.is_empty() {
                // Nothing new; leave any in-flight run alone.
                return;
            }
            (inner.pipeline.clone(), work, col_width)
        };

        pipeline.begin_run(work, col_width);
    }
}
