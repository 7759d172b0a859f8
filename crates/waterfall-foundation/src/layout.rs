//! Column packer and positioned-item cache.
//!
//! The packer is the only writer of layout state. It owns the per-column
//! running heights and the key-indexed map of committed positions; the
//! visibility filter and the render pass read from it on the same event-loop
//! turn.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::key::ItemKey;

/// Committed geometry of a single packed item.
///
/// Created once per key. Only a full re-layout (column count, gutter, or
/// column width change) recomputes it; the whole map is cleared first, so an
/// entry is never silently stale.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionedItem<T> {
    pub key: ItemKey,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Always `y + height`.
    pub bottom: f32,
    /// Position in the current full data sequence, not measurement order.
    pub index: usize,
    pub item: T,
}

/// Incremental masonry packing state.
///
/// Two top-level inputs drive it: [`reset`] (full re-layout) and [`commit`]
/// (incremental placement of one measured item). Between resets, committed
/// positions never move and column heights are monotonically non-decreasing.
///
/// [`reset`]: MasonryLayoutState::reset
/// [`commit`]: MasonryLayoutState::commit
pub struct MasonryLayoutState<T> {
    positioned: FxHashMap<ItemKey, PositionedItem<T>>,
    column_heights: SmallVec<[f32; 8]>,
    col_width: f32,
    gutter: f32,
    /// Run-local index of the next commit; reset by [`begin_run`].
    ///
    /// [`begin_run`]: MasonryLayoutState::begin_run
    run_cursor: usize,
    configured: bool,
}

impl<T> MasonryLayoutState<T> {
    pub fn new() -> Self {
        Self {
            positioned: FxHashMap::default(),
            column_heights: SmallVec::new(),
            col_width: 0.0,
            gutter: 0.0,
            run_cursor: 0,
            configured: false,
        }
    }

    /// True when the given parameters differ from the committed ones, i.e. a
    /// full re-layout is required before further commits.
    pub fn needs_reset(&self, columns: usize, col_width: f32, gutter: f32) -> bool {
        !self.configured
            || self.column_heights.len() != columns
            || self.col_width != col_width
            || self.gutter != gutter
    }

    /// Full re-layout: drops every committed position and zero-fills the
    /// column heights for the new parameters.
    pub fn reset(&mut self, columns: usize, col_width: f32, gutter: f32) {
        self.positioned.clear();
        self.column_heights.clear();
        self.column_heights.resize(columns, 0.0);
        self.col_width = col_width;
        self.gutter = gutter;
        self.run_cursor = 0;
        self.configured = columns > 0;
    }

    /// Starts a new placement run: the next `columns` commits fill one row
    /// left-to-right before the shortest-column rule takes over.
    pub fn begin_run(&mut self) {
        self.run_cursor = 0;
    }

    /// Commits one measured item at the end of the current run.
    ///
    /// Column choice: run-local index `i < columns` goes to column
    /// `i % columns`; afterwards the shortest column wins, ties broken by the
    /// lowest column index. A zero height commits a zero-height slot.
    pub fn commit(&mut self, key: ItemKey, index: usize, height: f32, item: T) {
        let columns = self.column_heights.len();
        debug_assert!(self.configured && columns > 0, "commit before reset");
        if columns == 0 {
            return;
        }

        let col = if self.run_cursor < columns {
            self.run_cursor % columns
        } else {
            self.shortest_column()
        };

        let x = col as f32 * (self.col_width + self.gutter);
        let y = self.column_heights[col];
        self.positioned.insert(
            key,
            PositionedItem {
                key,
                x,
                y,
                width: self.col_width,
                height,
                bottom: y + height,
                index,
                item,
            },
        );
        self.column_heights[col] += height + self.gutter;
        self.run_cursor += 1;
    }

    /// Lowest-indexed column with the minimum height.
    fn shortest_column(&self) -> usize {
        let mut col = 0;
        let mut min = self.column_heights[0];
        for (i, &h) in self.column_heights.iter().enumerate().skip(1) {
            if h < min {
                min = h;
                col = i;
            }
        }
        col
    }

    pub fn positioned(&self, key: ItemKey) -> Option<&PositionedItem<T>> {
        self.positioned.get(&key)
    }

    pub fn is_positioned(&self, key: ItemKey) -> bool {
        self.positioned.contains_key(&key)
    }

    /// Number of committed items.
    pub fn len(&self) -> usize {
        self.positioned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positioned.is_empty()
    }

    pub fn column_heights(&self) -> &[f32] {
        &self.column_heights
    }

    pub fn columns(&self) -> usize {
        self.column_heights.len()
    }

    pub fn col_width(&self) -> f32 {
        self.col_width
    }

    pub fn gutter(&self) -> f32 {
        self.gutter
    }

    /// Content height as reported to the host: the tallest column minus the
    /// one trailing gutter, never negative.
    pub fn content_height(&self) -> f32 {
        let max = self
            .column_heights
            .iter()
            .fold(0.0f32, |acc, &h| acc.max(h));
        (max - self.gutter).max(0.0)
    }
}

impl<T> Default for MasonryLayoutState<T> {
    fn default() -> Self {
        Self::new()
    }
}
