//! Ordered work buffer for pending measurements.
//!
//! Items can be submitted in any order, but subscribers only ever see
//! gap-free runs in ascending index order. This keeps the one-to-one
//! correspondence between the order items are mounted on the measurement
//! surface and their order in the data sequence.

use std::collections::BTreeMap;

/// Delivery target for dispatched runs: slices of `(index, payload)` pairs
/// in ascending, gap-free index order.
pub type Subscriber<V> = Box<dyn Fn(&[(usize, V)])>;

/// Ordered work queue with in-order release.
///
/// `enqueue` buffers an item under its sequence index. After every insert the
/// queue computes the longest contiguous run starting immediately after the
/// low-water mark and, if non-empty, dispatches it to subscribers and
/// advances the mark. A subscriber never receives an index out of order and
/// never receives the same index twice.
///
/// A gap (index 5 buffered while 4 is missing) withholds everything at and
/// after the gap until it is filled. A permanently missing index stalls the
/// queue forever; there is no timeout or retry.
pub struct PendingQueue<V> {
    buffered: BTreeMap<usize, V>,
    last_dispatch_index: i64,
    subscribers: Vec<(u64, Subscriber<V>)>,
    next_subscriber_id: u64,
    gap_warned: bool,
}

impl<V> PendingQueue<V> {
    pub fn new() -> Self {
        Self {
            buffered: BTreeMap::new(),
            last_dispatch_index: -1,
            subscribers: Vec::new(),
            next_subscriber_id: 1,
            gap_warned: false,
        }
    }

    /// Buffers one item and dispatches any newly contiguous run.
    pub fn enqueue(&mut self, index: usize, value: V) {
        self.buffered.insert(index, value);
        self.dispatch();
    }

    /// Buffers a batch of items, then dispatches once.
    pub fn enqueue_batch<I>(&mut self, batch: I)
    where
        I: IntoIterator<Item = (usize, V)>,
    {
        for (index, value) in batch {
            self.buffered.insert(index, value);
        }
        self.dispatch();
    }

    /// Returns a buffered, not-yet-dispatched item.
    pub fn get(&self, index: usize) -> Option<&V> {
        self.buffered.get(&index)
    }

    /// Removes a buffered item without dispatching it.
    pub fn remove(&mut self, index: usize) -> Option<V> {
        self.buffered.remove(&index)
    }

    /// Number of buffered (undispatched) items.
    pub fn len(&self) -> usize {
        self.buffered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffered.is_empty()
    }

    /// Index of the last dispatched item, or -1 if nothing was dispatched.
    pub fn last_dispatch_index(&self) -> i64 {
        self.last_dispatch_index
    }

    /// Drops all buffered items and resets the low-water mark.
    pub fn clear(&mut self) {
        self.buffered.clear();
        self.last_dispatch_index = -1;
        self.gap_warned = false;
    }

    /// Registers a delivery target. Returns an id for [`unsubscribe`].
    ///
    /// [`unsubscribe`]: PendingQueue::unsubscribe
    pub fn subscribe(&mut self, callback: Subscriber<V>) -> u64 {
        let id = self.next_subscriber_id;
        self.next_subscriber_id += 1;
        self.subscribers.push((id, callback));
        id
    }

    pub fn unsubscribe(&mut self, id: u64) {
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
    }

    /// Releases the longest gap-free run after the low-water mark.
    fn dispatch(&mut self) {
        let mut run: Vec<(usize, V)> = Vec::new();
        let mut next = (self.last_dispatch_index + 1) as usize;
        while let Some(value) = self.buffered.remove(&next) {
            run.push((next, value));
            next += 1;
        }

        if run.is_empty() {
            if !self.buffered.is_empty() && !self.gap_warned {
                self.gap_warned = true;
                log::warn!(
                    "pending queue blocked behind missing index {} ({} item(s) buffered)",
                    next,
                    self.buffered.len()
                );
            }
            return;
        }

        self.last_dispatch_index = run[run.len() - 1].0 as i64;
        self.gap_warned = false;
        for (_, subscriber) in &self.subscribers {
            subscriber(&run);
        }
    }
}

impl<V> Default for PendingQueue<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn collecting_queue() -> (PendingQueue<&'static str>, Rc<RefCell<Vec<Vec<usize>>>>) {
        let mut queue = PendingQueue::new();
        let seen: Rc<RefCell<Vec<Vec<usize>>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        queue.subscribe(Box::new(move |run| {
            sink.borrow_mut()
                .push(run.iter().map(|(i, _)| *i).collect());
        }));
        (queue, seen)
    }

    #[test]
    fn test_in_order_release_with_gap() {
        let (mut queue, seen) = collecting_queue();

        queue.enqueue(2, "c");
        queue.enqueue(0, "a");
        queue.enqueue(1, "b");
        queue.enqueue(4, "e");

        // 0 dispatches alone, then 1..=2 once the gap at 1 fills; 4 is held.
        assert_eq!(*seen.borrow(), vec![vec![0], vec![1, 2]]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.last_dispatch_index(), 2);

        queue.enqueue(3, "d");
        assert_eq!(seen.borrow().last().unwrap(), &vec![3, 4]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_batch_dispatches_once() {
        let (mut queue, seen) = collecting_queue();

        queue.enqueue_batch([(0, "a"), (1, "b"), (2, "c")]);
        assert_eq!(*seen.borrow(), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_never_delivers_twice() {
        let (mut queue, seen) = collecting_queue();

        queue.enqueue(0, "a");
        queue.enqueue(0, "a");
        let all: Vec<usize> = seen.borrow().iter().flatten().copied().collect();
        assert_eq!(all, vec![0]);
    }

    #[test]
    fn test_clear_resets_low_water_mark() {
        let (mut queue, seen) = collecting_queue();

        queue.enqueue_batch([(0, "a"), (1, "b")]);
        queue.enqueue(5, "held");
        queue.clear();
        assert_eq!(queue.last_dispatch_index(), -1);
        assert!(queue.is_empty());

        queue.enqueue(0, "again");
        assert_eq!(seen.borrow().last().unwrap(), &vec![0]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut queue = PendingQueue::new();
        let seen: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = queue.subscribe(Box::new(move |run: &[(usize, ())]| {
            sink.borrow_mut().extend(run.iter().map(|(i, _)| *i));
        }));

        queue.enqueue(0, ());
        queue.unsubscribe(id);
        queue.enqueue(1, ());

        assert_eq!(*seen.borrow(), vec![0]);
    }

    #[test]
    fn test_remove_buffered_item() {
        let (mut queue, seen) = collecting_queue();

        queue.enqueue(1, "held");
        assert_eq!(queue.get(1), Some(&"held"));
        assert_eq!(queue.remove(1), Some("held"));
        assert!(queue.is_empty());
        assert!(seen.borrow().is_empty());
    }
}
