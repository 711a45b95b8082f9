//! Max priority queue oracle.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone)]
struct Entry<T> {
    priority: i64,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    // Higher priority first, then earlier insertion
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Binary max-heap keyed by priority, FIFO among equal priorities
#[derive(Debug, Clone)]
pub struct MaxPriorityQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    next_seq: u64,
}

impl<T> Default for MaxPriorityQueue<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }
}

impl<T: Clone> MaxPriorityQueue<T> {
    /// Empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `item`
    pub fn enqueue(&mut self, item: T, priority: i64) {
        self.heap.push(Entry {
            priority,
            seq: self.next_seq,
            item,
        });
        self.next_seq += 1;
    }

    /// Remove the highest-priority item
    pub fn dequeue(&mut self) -> Option<(T, i64)> {
        self.heap.pop().map(|e| (e.item, e.priority))
    }

    /// Highest-priority item
    #[must_use]
    pub fn peek(&self) -> Option<(&T, i64)> {
        self.heap.peek().map(|e| (&e.item, e.priority))
    }

    /// Number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Items in dequeue order, leaving the queue untouched
    #[must_use]
    pub fn ordered(&self) -> Vec<(T, i64)> {
        let mut copy = self.heap.clone();
        std::iter::from_fn(|| copy.pop().map(|e| (e.item, e.priority))).collect()
    }

    /// Priorities in dequeue order
    #[must_use]
    pub fn priorities(&self) -> Vec<i64> {
        self.ordered().into_iter().map(|(_, p)| p).collect()
    }
}
