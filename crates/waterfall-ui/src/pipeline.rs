//! Measurement pipeline: pending queue -> measurement surface -> packer.
//!
//! The pipeline owns the measure-then-commit loop. Work items released by
//! the queue accumulate in an insertion-ordered registry; at most
//! `pre_render_number` of them are mounted on the surface at a time, and
//! each height delivery commits to the packer in index order before the next
//! batch is mounted. Exactly one batch is ever in flight.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use waterfall_foundation::{ItemKey, MasonryLayoutState, PendingQueue};

use crate::masonry::RenderSlot;
use crate::surface::MeasureSurface;

/// One unit of measurement work.
#[derive(Clone, Debug)]
pub struct WorkItem<T> {
    /// Index in the full data sequence.
    pub data_index: usize,
    pub key: ItemKey,
    pub item: T,
}

/// Caller-supplied render function. Invoked for off-screen measurement at
/// the origin and again for final on-screen placement; it must be pure
/// across both calls.
pub type RenderFn<T, R> = Rc<dyn Fn(&T, RenderSlot) -> R>;

/// Drives measurement runs against a [`MeasureSurface`], committing results
/// into a shared [`MasonryLayoutState`].
///
/// A *run* is one filtered set of not-yet-positioned items. Starting a new
/// run cancels the previous one: the generation counter is bumped so a late
/// height delivery from an already-mounted batch is discarded instead of
/// committing into the new run's state.
pub struct MeasurePipeline<T, S: MeasureSurface> {
    shared: Rc<PipelineShared<T, S>>,
}

impl<T, S: MeasureSurface> Clone for MeasurePipeline<T, S> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

struct PipelineShared<T, S: MeasureSurface> {
    state: RefCell<PipelineState<T>>,
    /// Filled by the queue subscriber; separate cell so dispatch can run
    /// while `state` is borrowed.
    ready: Rc<RefCell<IndexMap<usize, WorkItem<T>>>>,
    surface: Rc<S>,
    layout: Rc<RefCell<MasonryLayoutState<T>>>,
    render: RenderFn<T, S::Renderable>,
    on_batch_committed: RefCell<Option<Rc<dyn Fn()>>>,
}

struct PipelineState<T> {
    queue: PendingQueue<WorkItem<T>>,
    /// Batch currently on the surface, in mounted order.
    mounted: Vec<WorkItem<T>>,
    pre_render_number: usize,
    col_width: f32,
    generation: u64,
    in_flight: bool,
    stalled: bool,
}

impl<T, S> MeasurePipeline<T, S>
where
    T: Clone + 'static,
    S: MeasureSurface + 'static,
{
    pub fn new(
        surface: Rc<S>,
        layout: Rc<RefCell<MasonryLayoutState<T>>>,
        render: RenderFn<T, S::Renderable>,
        pre_render_number: usize,
    ) -> Self {
        let ready: Rc<RefCell<IndexMap<usize, WorkItem<T>>>> =
            Rc::new(RefCell::new(IndexMap::new()));

        let mut queue = PendingQueue::new();
        {
            let ready = Rc::clone(&ready);
            queue.subscribe(Box::new(move |run: &[(usize, WorkItem<T>)]| {
                let mut ready = ready.borrow_mut();
                for (run_index, work) in run {
                    ready.insert(*run_index, work.clone());
                }
            }));
        }

        Self {
            shared: Rc::new(PipelineShared {
                state: RefCell::new(PipelineState {
                    queue,
                    mounted: Vec::new(),
                    pre_render_number,
                    col_width: 0.0,
                    generation: 0,
                    in_flight: false,
                    stalled: false,
                }),
                ready,
                surface,
                layout,
                render,
                on_batch_committed: RefCell::new(None),
            }),
        }
    }

    /// Registers a callback invoked after every committed batch. The render
    /// pass typically refreshes from here.
    pub fn set_on_batch_committed(&self, callback: Option<Rc<dyn Fn()>>) {
        *self.shared.on_batch_committed.borrow_mut() = callback;
    }

    /// Starts a measurement run over `work`, cancelling any run in flight.
    ///
    /// `work` must already be filtered to not-yet-positioned items, in data
    /// order. Run-local indices restart at zero, so the packer fills a fresh
    /// first row.
    pub fn begin_run(&self, work: Vec<WorkItem<T>>, col_width: f32) {
        self.cancel();
        self.shared.state.borrow_mut().col_width = col_width;
        self.shared.layout.borrow_mut().begin_run();
        if work.is_empty() {
            return;
        }
        {
            let mut state = self.shared.state.borrow_mut();
            state.queue.enqueue_batch(work.into_iter().enumerate());
        }
        self.mount_next();
    }

    /// Cancels the current run: clears the queue, the ready registry, and
    /// the surface, and invalidates any pending height delivery.
    pub fn cancel(&self) {
        {
            let mut state = self.shared.state.borrow_mut();
            state.generation += 1;
            state.in_flight = false;
            state.stalled = false;
            state.mounted.clear();
            state.queue.clear();
        }
        self.shared.ready.borrow_mut().clear();
        self.shared.surface.clear();
    }

    /// True when no work is buffered, mounted, or stalled.
    pub fn is_idle(&self) -> bool {
        let state = self.shared.state.borrow();
        !state.in_flight
            && !state.stalled
            && state.queue.is_empty()
            && self.shared.ready.borrow().is_empty()
    }

    /// True when a short height delivery halted the current run.
    pub fn is_stalled(&self) -> bool {
        self.shared.state.borrow().stalled
    }

    fn mount_next(&self) {
        let (batch, col_width, generation) = {
            let mut state = self.shared.state.borrow_mut();
            if state.in_flight || state.stalled {
                return;
            }
            let mut ready = self.shared.ready.borrow_mut();
            if ready.is_empty() {
                return;
            }
            let count = state.pre_render_number.max(1).min(ready.len());
            let batch: Vec<WorkItem<T>> = ready.drain(..count).map(|(_, work)| work).collect();
            state.mounted = batch.clone();
            state.in_flight = true;
            (batch, state.col_width, state.generation)
        };

        let renderables: Vec<S::Renderable> = batch
            .iter()
            .map(|work| {
                (self.shared.render)(
                    &work.item,
                    RenderSlot {
                        width: col_width,
                        x: 0.0,
                        y: 0.0,
                        index: work.data_index,
                    },
                )
            })
            .collect();

        let pipeline = self.clone();
        self.shared.surface.mount_batch(
            renderables,
            Box::new(move |heights| pipeline.on_measured(generation, heights)),
        );
    }

    fn on_measured(&self, generation: u64, heights: Vec<f32>) {
        {
            let mut state = self.shared.state.borrow_mut();
            if state.generation != generation {
                log::debug!("discarding stale measurement delivery (generation {generation})");
                return;
            }
            state.in_flight = false;
            let mounted = std::mem::take(&mut state.mounted);
            if heights.len() < mounted.len() {
                state.stalled = true;
                log::warn!(
                    "measurement delivered {} height(s) for a batch of {}; run stalled",
                    heights.len(),
                    mounted.len()
                );
            }
            let mut layout = self.shared.layout.borrow_mut();
            for (work, height) in mounted.into_iter().zip(heights) {
                layout.commit(work.key, work.data_index, height, work.item);
            }
        }

        self.shared.surface.clear();
        self.mount_next();

        let callback = self.shared.on_batch_committed.borrow().clone();
        if let Some(callback) = callback {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MeasuredCallback;
    use std::cell::Cell;

    /// Resolves measurements synchronously; the renderable is its height.
    #[derive(Default)]
    struct ImmediateSurface {
        mounts: Cell<usize>,
        truncate_deliveries: bool,
    }

    impl MeasureSurface for ImmediateSurface {
        type Renderable = f32;

        fn mount_batch(&self, batch: Vec<f32>, on_measured: MeasuredCallback) {
            self.mounts.set(self.mounts.get() + 1);
            let mut heights = batch;
            if self.truncate_deliveries {
                heights.pop();
            }
            on_measured(heights);
        }

        fn clear(&self) {}
    }

    fn work_items(count: usize) -> Vec<WorkItem<u64>> {
        (0..count)
            .map(|i| WorkItem {
                data_index: i,
                key: ItemKey(i as u64),
                item: i as u64,
            })
            .collect()
    }

    fn configured_layout(columns: usize) -> Rc<RefCell<MasonryLayoutState<u64>>> {
        let layout = Rc::new(RefCell::new(MasonryLayoutState::new()));
        layout.borrow_mut().reset(columns, 100.0, 10.0);
        layout
    }

    #[test]
    fn test_run_commits_everything_in_bounded_batches() {
        let layout = configured_layout(2);
        let surface = Rc::new(ImmediateSurface::default());
        let render: RenderFn<u64, f32> = Rc::new(|_, _| 50.0);
        let pipeline = MeasurePipeline::new(Rc::clone(&surface), Rc::clone(&layout), render, 4);

        pipeline.begin_run(work_items(10), 100.0);

        assert!(pipeline.is_idle());
        assert_eq!(layout.borrow().len(), 10);
        // 10 items at 4 per batch.
        assert_eq!(surface.mounts.get(), 3);
    }

    #[test]
    fn test_commit_order_follows_data_indices() {
        let layout = configured_layout(2);
        let surface = Rc::new(ImmediateSurface::default());
        // Height encodes the data index so placement order is observable.
        let render: RenderFn<u64, f32> = Rc::new(|item, _| 10.0 + *item as f32);
        let pipeline = MeasurePipeline::new(surface, Rc::clone(&layout), render, 3);

        pipeline.begin_run(work_items(4), 100.0);

        let layout = layout.borrow();
        // First row: 0 -> col 0, 1 -> col 1; then 2 -> col 0 (10 < 11),
        // then 3 -> col 1 (21 vs 32).
        assert_eq!(layout.positioned(ItemKey(2)).unwrap().y, 20.0);
        assert_eq!(layout.positioned(ItemKey(3)).unwrap().y, 21.0);
    }

    #[test]
    fn test_short_delivery_stalls_the_run() {
        let layout = configured_layout(2);
        let surface = Rc::new(ImmediateSurface {
            mounts: Cell::new(0),
            truncate_deliveries: true,
        });
        let render: RenderFn<u64, f32> = Rc::new(|_, _| 50.0);
        let pipeline = MeasurePipeline::new(Rc::clone(&surface), Rc::clone(&layout), render, 4);

        pipeline.begin_run(work_items(10), 100.0);

        // The first batch delivered 3 of 4 heights; nothing else mounts.
        assert!(pipeline.is_stalled());
        assert!(!pipeline.is_idle());
        assert_eq!(layout.borrow().len(), 3);
        assert_eq!(surface.mounts.get(), 1);

        // A fresh run recovers.
        pipeline.cancel();
        assert!(!pipeline.is_stalled());
    }

    #[test]
    fn test_empty_run_is_idle_immediately() {
        let layout = configured_layout(2);
        let surface = Rc::new(ImmediateSurface::default());
        let render: RenderFn<u64, f32> = Rc::new(|_, _| 50.0);
        let pipeline = MeasurePipeline::new(surface, layout, render, 4);

        pipeline.begin_run(Vec::new(), 100.0);
        assert!(pipeline.is_idle());
    }

    #[test]
    fn test_batch_committed_callback_fires_per_batch() {
        let layout = configured_layout(2);
        let surface = Rc::new(ImmediateSurface::default());
        let render: RenderFn<u64, f32> = Rc::new(|_, _| 50.0);
        let pipeline = MeasurePipeline::new(surface, layout, render, 5);

        let commits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&commits);
        pipeline.set_on_batch_committed(Some(Rc::new(move || {
            counter.set(counter.get() + 1);
        })));

        pipeline.begin_run(work_items(10), 100.0);
        assert_eq!(commits.get(), 2);
    }
}
