//! Deferred measurement surface.

use std::cell::RefCell;
use std::rc::Rc;

use waterfall_ui::{MeasureSurface, MeasuredCallback};

/// What the headless host "renders": a box whose height is already known to
/// the test's render function.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeasuredBox {
    pub height: f32,
}

impl MeasuredBox {
    pub fn new(height: f32) -> Self {
        Self { height }
    }
}

#[derive(Default)]
struct SurfaceState {
    pending: Option<(Vec<f32>, MeasuredCallback)>,
    /// If set, the next delivery keeps only this many heights.
    truncate_next: Option<usize>,
    mounts: usize,
    clears: usize,
}

/// Measurement surface that holds every mounted batch until [`pump`] releases
/// its heights, mimicking a host that lays out asynchronously.
///
/// Cheap to clone; clones share state.
///
/// [`pump`]: HeadlessSurface::pump
#[derive(Clone, Default)]
pub struct HeadlessSurface {
    state: Rc<RefCell<SurfaceState>>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers the pending batch, if any. Returns whether a delivery fired.
    pub fn pump(&self) -> bool {
        let pending = self.state.borrow_mut().pending.take();
        match pending {
            Some((heights, callback)) => {
                callback(heights);
                true
            }
            None => false,
        }
    }

    /// Pumps until no further deliveries are pending.
    pub fn pump_to_idle(&self) {
        let mut guard = 0;
        while self.pump() {
            guard += 1;
            assert!(guard < 10_000, "measurement pipeline did not settle");
        }
    }

    /// Makes the next delivery short by dropping all but `keep` heights,
    /// simulating an item whose render produced no measurable box.
    pub fn truncate_next_delivery(&self, keep: usize) {
        self.state.borrow_mut().truncate_next = Some(keep);
    }

    /// Number of `mount_batch` calls so far.
    pub fn mounts(&self) -> usize {
        self.state.borrow().mounts
    }

    /// Number of `clear` calls so far.
    pub fn clears(&self) -> usize {
        self.state.borrow().clears
    }

    pub fn has_pending(&self) -> bool {
        self.state.borrow().pending.is_some()
    }
}

impl MeasureSurface for HeadlessSurface {
    type Renderable = MeasuredBox;

    fn mount_batch(&self, batch: Vec<MeasuredBox>, on_measured: MeasuredCallback) {
        let mut state = self.state.borrow_mut();
        state.mounts += 1;
        let mut heights: Vec<f32> = batch.iter().map(|b| b.height).collect();
        if let Some(keep) = state.truncate_next.take() {
            heights.truncate(keep);
        }
        state.pending = Some((heights, on_measured));
    }

    fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.clears += 1;
        state.pending = None;
    }
}
