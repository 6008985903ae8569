use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// A keyed priority queue with lazy eviction: the "bucket" data structure BMSSP threads through
/// its recursion. Holds `(key, value)` pairs; `pull` drains up to `m` entries with the smallest
/// recorded value.
///
/// Implemented as a min-heap of `(value, key)` paired with a `best` map of each key's last
/// recorded value — a popped heap entry is stale (and skipped) if it no longer matches `best`.
pub struct Bucket {
    m: usize,
    heap: BinaryHeap<HeapItem>,
    best: HashMap<usize, f64>,
}

struct HeapItem {
    neg_value: f64,
    key: usize,
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.neg_value
            .partial_cmp(&other.neg_value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.key.cmp(&other.key))
    }
}
impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for HeapItem {}

impl Bucket {
    pub fn new(m: usize) -> Bucket {
        Bucket {
            m: m.max(1),
            heap: BinaryHeap::new(),
            best: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }

    /// Lowers the best recorded value for `key` to `value` if it's an improvement (or new).
    pub fn insert(&mut self, key: usize, value: f64) {
        let improved = match self.best.get(&key) {
            Some(&existing) => value < existing,
            None => true,
        };
        if improved {
            self.best.insert(key, value);
            self.heap.push(HeapItem {
                neg_value: -value,
                key,
            });
        }
    }

    pub fn batch_prepend(&mut self, items: impl IntoIterator<Item = (usize, f64)>) {
        for (key, value) in items {
            self.insert(key, value);
        }
    }

    /// Pops up to `m` current-best keys; returns `(bound, keys)` where `bound` is the minimum
    /// remaining best value after removal, or `upper_bound` if nothing remains.
    pub fn pull(&mut self, upper_bound: f64) -> (f64, Vec<usize>) {
        let mut popped = Vec::new();
        while popped.len() < self.m {
            let item = match self.heap.pop() {
                Some(item) => item,
                None => break,
            };
            let value = -item.neg_value;
            match self.best.get(&item.key) {
                Some(&recorded) if recorded == value => {
                    self.best.remove(&item.key);
                    popped.push(item.key);
                }
                _ => continue, // stale entry
            }
        }
        let bound = self
            .best
            .values()
            .cloned()
            .fold(f64::INFINITY, f64::min);
        let bound = if bound.is_finite() { bound } else { upper_bound };
        (bound, popped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pull_returns_smallest_first() {
        let mut b = Bucket::new(2);
        b.insert(1, 5.0);
        b.insert(2, 1.0);
        b.insert(3, 3.0);
        let (bound, popped) = b.pull(100.0);
        assert_unordered::assert_eq_unordered!(popped, vec![2, 3]);
        assert_eq!(bound, 5.0);
    }

    #[test]
    fn test_insert_only_keeps_best_value() {
        let mut b = Bucket::new(10);
        b.insert(1, 5.0);
        b.insert(1, 2.0);
        b.insert(1, 8.0); // worse than 2.0, ignored
        let (_, popped) = b.pull(100.0);
        assert_eq!(popped, vec![1]);
    }

    #[test]
    fn test_is_empty() {
        let mut b = Bucket::new(4);
        assert!(b.is_empty());
        b.insert(1, 1.0);
        assert!(!b.is_empty());
    }
}
