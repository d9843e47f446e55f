//! Bounded top-K score structure
//!
//! A fixed-capacity binary min-heap keyed on score. Once full, an offer is
//! accepted only when it beats the current minimum, which then gets replaced
//! and sifted down. Rejection is O(1); acceptance is O(log K).

use serde::Serialize;

/// One scored candidate position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreEntry {
    pub score: i32,
    pub position: u32,
}

impl ScoreEntry {
    pub fn new(score: i32, position: u32) -> Self {
        Self { score, position }
    }

    /// Heap order: lower score first; among equal scores the larger position
    /// sits nearer the root so it is evicted first
    #[inline]
    fn heap_lt(&self, other: &Self) -> bool {
        self.score < other.score || (self.score == other.score && self.position > other.position)
    }
}

/// Keeps the K highest-scoring entries offered
#[derive(Debug, Clone)]
pub struct TopK {
    heap: Vec<ScoreEntry>,
    capacity: usize,
}

impl TopK {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "top-K capacity must be positive");
        Self {
            heap: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Offer a candidate; returns whether it was retained
    pub fn offer(&mut self, score: i32, position: u32) -> bool {
        let entry = ScoreEntry::new(score, position);

        if self.heap.len() < self.capacity {
            self.heap.push(entry);
            self.sift_up(self.heap.len() - 1);
            return true;
        }

        if score <= self.heap[0].score {
            return false;
        }

        self.heap[0] = entry;
        self.sift_down(0);
        true
    }

    /// Lowest retained entry
    pub fn min(&self) -> Option<ScoreEntry> {
        self.heap.first().copied()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.heap.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Retained entries in heap order
    pub fn iter(&self) -> impl Iterator<Item = &ScoreEntry> {
        self.heap.iter()
    }

    /// Retained entries, score descending then position ascending
    pub fn ranked(&self) -> Vec<ScoreEntry> {
        let mut entries = self.heap.clone();
        entries.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.position.cmp(&b.position))
        });
        entries
    }

    fn sift_up(&mut self, mut node: usize) {
        while node > 0 {
            let parent = (node - 1) / 2;
            if !self.heap[node].heap_lt(&self.heap[parent]) {
                break;
            }
            self.heap.swap(node, parent);
            node = parent;
        }
    }

    fn sift_down(&mut self, mut node: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * node + 1;
            let right = left + 1;
            let mut min = node;

            if left < len && self.heap[left].heap_lt(&self.heap[min]) {
                min = left;
            }
            if right < len && self.heap[right].heap_lt(&self.heap[min]) {
                min = right;
            }
            if min == node {
                break;
            }

            self.heap.swap(node, min);
            node = min;
        }
    }
}
