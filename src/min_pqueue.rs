/*
Indexed binary min-heap over distinct keys with extrinsic f64 priorities.

The heap is a dense Vec of (key, priority) entries, paired with a hash table mapping each
key to its current position in that Vec. Every mutation that moves an entry also rewrites
the position of the moved key, so the two structures never disagree.

Supported operations are AddOrUpdate (insert, decrease-key, increase-key) and Remove (pop-min),
both O(log n). Membership is an O(1) table lookup.
*/

use hashbrown::HashMap;
use std::hash::Hash;

use crate::error::EmptyQueue;

#[derive(Debug, Clone, PartialEq)]
struct Entry<K> {
    key: K,
    priority: f64,
}

#[inline]
fn parent(i: usize) -> usize {
    (i - 1) / 2
}

#[derive(Debug, Clone)]
pub struct MinPQueue<K> {
    // heap[parent(i)].priority <= heap[i].priority for all i in 1..heap.len()
    heap: Vec<Entry<K>>,
    // heap[index[k]].key == k for every queued k, and nothing else is mapped
    index: HashMap<K, usize>,
}

impl<K: Eq + Hash + Clone> Default for MinPQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> MinPQueue<K> {
    pub fn new() -> Self {
        Self {
            heap: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Current priority of `key`, or `None` if it is not queued.
    pub fn priority(&self, key: &K) -> Option<f64> {
        self.index.get(key).map(|&i| self.heap[i].priority)
    }

    /// The key that the next `remove` would return.
    pub fn peek(&self) -> Result<&K, EmptyQueue> {
        self.heap.first().map(|e| &e.key).ok_or(EmptyQueue)
    }

    pub fn min_priority(&self) -> Result<f64, EmptyQueue> {
        self.heap.first().map(|e| e.priority).ok_or(EmptyQueue)
    }

    /// Insert `key` with `priority`, or move an already queued `key` to `priority`.
    ///
    /// A lowered priority sifts the entry up, a raised one sifts it down. Either way
    /// the queue never holds two entries for the same key.
    pub fn add_or_update(&mut self, key: K, priority: f64) {
        debug_assert!(!priority.is_nan(), "NaN priority");
        match self.index.get(&key) {
            Some(&i) => self.update(i, priority),
            None => self.add(key, priority),
        }
        debug_assert_eq!(self.index.len(), self.heap.len());
    }

    /// Remove and return a key with the smallest priority. Ties are broken arbitrarily.
    pub fn remove(&mut self) -> Result<K, EmptyQueue> {
        if self.heap.is_empty() {
            return Err(EmptyQueue);
        }
        // swap_remove moves the last entry into the root slot.
        let min = self.heap.swap_remove(0);
        self.index.remove(&min.key);
        if let Some(moved) = self.heap.first() {
            let slot = self.index.get_mut(&moved.key);
            debug_assert!(slot.is_some(), "moved key missing from index");
            if let Some(slot) = slot {
                *slot = 0;
            }
            self.bubble_down(0);
        }
        debug_assert_eq!(self.index.len(), self.heap.len());
        Ok(min.key)
    }

    /// Exhaustively verify the heap order and the index table against each other.
    pub fn check_invariants(&self) -> bool {
        if self.index.len() != self.heap.len() {
            return false;
        }
        let ordered = (1..self.heap.len())
            .all(|i| self.heap[parent(i)].priority <= self.heap[i].priority);
        let indexed = self
            .heap
            .iter()
            .enumerate()
            .all(|(i, e)| self.index.get(&e.key) == Some(&i));
        ordered && indexed
    }

    fn add(&mut self, key: K, priority: f64) {
        let i = self.heap.len();
        self.index.insert(key.clone(), i);
        self.heap.push(Entry { key, priority });
        self.bubble_up(i);
    }

    fn update(&mut self, i: usize, priority: f64) {
        let old = self.heap[i].priority;
        self.heap[i].priority = priority;
        if priority < old {
            self.bubble_up(i);
        } else if priority > old {
            self.bubble_down(i);
        }
    }

    /// Swap two heap slots and record the new positions of both keys.
    fn swap(&mut self, i: usize, j: usize) {
        self.heap.swap(i, j);
        for pos in [i, j] {
            let slot = self.index.get_mut(&self.heap[pos].key);
            debug_assert!(slot.is_some(), "swapped key missing from index");
            if let Some(slot) = slot {
                *slot = pos;
            }
        }
    }

    fn bubble_up(&mut self, mut i: usize) {
        while i > 0 {
            let p = parent(i);
            if self.heap[p].priority <= self.heap[i].priority {
                break;
            }
            self.swap(i, p);
            i = p;
        }
    }

    fn bubble_down(&mut self, mut i: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            let mut smallest = i;
            if left < len && self.heap[left].priority < self.heap[smallest].priority {
                smallest = left;
            }
            if right < len && self.heap[right].priority < self.heap[smallest].priority {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.swap(i, smallest);
            i = smallest;
        }
    }
}
