//! Bounded blocking queues for the worker pool.
//!
//! Two structures back the analyzer's dataflow: [`BoundedQueue`] carries jobs
//! from the pushing thread to the workers, and [`OrderedResultBuffer`]
//! collects worker output and releases it strictly in submission order.
//! Both support abort, which wakes every waiter and refuses further input.

use parking_lot::{Condvar, Mutex};
use std::collections::{BTreeMap, VecDeque};

struct QueueState<T> {
    items: VecDeque<T>,
    aborted: bool,
}

/// A bounded MPMC queue with blocking push and pop.
pub struct BoundedQueue<T> {
    state: Mutex<QueueState<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` items.
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                aborted: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        }
    }

    /// Push an item, blocking while the queue is full. Returns `false` when
    /// the queue has been aborted and the item was not enqueued.
    pub fn wait_and_push(&self, item: T) -> bool {
        let mut state = self.state.lock();
        while state.items.len() >= self.capacity && !state.aborted {
            self.not_full.wait(&mut state);
        }
        if state.aborted {
            return false;
        }
        state.items.push_back(item);
        self.not_empty.notify_one();
        true
    }

    /// Pop an item, blocking while the queue is empty. Returns `None` once
    /// the queue has been aborted; remaining items are discarded.
    pub fn wait_and_pop(&self) -> Option<T> {
        let mut state = self.state.lock();
        while state.items.is_empty() && !state.aborted {
            self.not_empty.wait(&mut state);
        }
        if state.aborted {
            return None;
        }
        let item = state.items.pop_front();
        self.not_full.notify_one();
        item
    }

    /// True when no items are queued.
    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    /// Wake all waiters and refuse further pushes and pops.
    pub fn abort(&self) {
        let mut state = self.state.lock();
        state.aborted = true;
        state.items.clear();
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }
}

struct BufferState<T> {
    slots: BTreeMap<u64, T>,
    next_id: u64,
    aborted: bool,
}

/// Collects results finished in arbitrary order and releases them in strictly
/// increasing id order.
///
/// The buffer is bounded: a producer that finished id `k` blocks until the
/// consumer has advanced past `k - capacity`, so workers far ahead of the
/// puller stall instead of accumulating results. With a capacity of
/// `workers + 1` a completed worker never blocks indefinitely.
pub struct OrderedResultBuffer<T> {
    state: Mutex<BufferState<T>>,
    ready: Condvar,
    space: Condvar,
    capacity: u64,
}

impl<T> OrderedResultBuffer<T> {
    /// Create a buffer admitting ids up to `capacity` ahead of the next pull.
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(BufferState {
                slots: BTreeMap::new(),
                next_id: 0,
                aborted: false,
            }),
            ready: Condvar::new(),
            space: Condvar::new(),
            capacity: capacity.max(1) as u64,
        }
    }

    /// Store the result for `id`, blocking while the consumer lags more than
    /// the buffer capacity behind. Returns `false` when aborted.
    pub fn insert(&self, id: u64, result: T) -> bool {
        let mut state = self.state.lock();
        while id >= state.next_id + self.capacity && !state.aborted {
            self.space.wait(&mut state);
        }
        if state.aborted {
            return false;
        }
        debug_assert!(
            !state.slots.contains_key(&id),
            "duplicate result for id {id}"
        );
        state.slots.insert(id, result);
        self.ready.notify_all();
        true
    }

    /// Remove and return the result with the next sequential id, blocking
    /// until it arrives. Returns `None` when the buffer was aborted and the
    /// next result is not already present.
    pub fn pop_next(&self) -> Option<T> {
        let mut state = self.state.lock();
        loop {
            let next = state.next_id;
            if let Some(result) = state.slots.remove(&next) {
                state.next_id += 1;
                self.space.notify_all();
                return Some(result);
            }
            if state.aborted {
                return None;
            }
            self.ready.wait(&mut state);
        }
    }

    /// True when the result with the next sequential id is present.
    pub fn ready(&self) -> bool {
        let state = self.state.lock();
        state.slots.contains_key(&state.next_id)
    }

    /// Wake all waiters and refuse further inserts. Results already stored
    /// remain available to [`pop_next`](Self::pop_next).
    pub fn abort(&self) {
        let mut state = self.state.lock();
        state.aborted = true;
        self.ready.notify_all();
        self.space.notify_all();
    }
}
