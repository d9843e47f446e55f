//! Per-read seed hit history and trigger decisions
//!
//! Each read keeps the genome positions of its last `num_matches` accepted
//! seeds in a ring. A seed is discarded when it falls within `taboo_len` of
//! the previous accepted seed. Scoring is requested once `num_matches` seeds
//! fit inside `window_len` positions and the read has not triggered within the
//! last `window_len` positions.

/// Outcome of feeding one seed hit to a [`HitTracker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Too close to the previous hit; nothing recorded
    Taboo,
    /// Recorded, not enough evidence yet
    Recorded,
    /// Recorded, and the window is dense enough to score
    Trigger,
}

/// Ring of recent hit positions plus trigger bookkeeping
#[derive(Debug, Clone)]
pub struct HitTracker {
    hits: Box<[Option<u32>]>,
    /// Slot of the most recent hit
    prev: usize,
    /// Slot the next hit will overwrite; holds the oldest hit
    next: usize,
    last_trigger: Option<u32>,
    triggers: u32,
}

impl HitTracker {
    pub fn new(num_matches: u32) -> Self {
        assert!(num_matches > 0, "num_matches must be positive");
        Self {
            hits: vec![None; num_matches as usize].into_boxed_slice(),
            prev: 0,
            next: 0,
            last_trigger: None,
            triggers: 0,
        }
    }

    /// Feed a seed hit at genome position `idx`.
    ///
    /// Positions must be fed in non-decreasing order.
    pub fn observe(&mut self, idx: u32, window_len: u32, taboo_len: u32) -> Observation {
        if let Some(prev) = self.hits[self.prev] {
            debug_assert!(idx >= prev);
            if idx - prev <= taboo_len {
                return Observation::Taboo;
            }
        }

        self.hits[self.next] = Some(idx);
        self.prev = self.next;
        self.next = (self.next + 1) % self.hits.len();

        // The slot about to be overwritten is num_matches hits old
        let dense = match self.hits[self.next] {
            Some(oldest) => idx - oldest < window_len,
            None => false,
        };

        // Spacing is measured from the last trigger, not the last hit
        let rested = match self.last_trigger {
            Some(last) => idx - last >= window_len,
            None => true,
        };

        if dense && rested {
            Observation::Trigger
        } else {
            Observation::Recorded
        }
    }

    /// Record that scoring at `idx` was accepted
    pub fn accept(&mut self, idx: u32) {
        self.last_trigger = Some(idx);
        self.triggers += 1;
    }

    pub fn last_trigger(&self) -> Option<u32> {
        self.last_trigger
    }

    /// Number of accepted triggers
    pub fn triggers(&self) -> u32 {
        self.triggers
    }

    /// Recorded hits, oldest first
    pub fn hits(&self) -> Vec<u32> {
        let n = self.hits.len();
        (0..n)
            .filter_map(|i| self.hits[(self.next + i) % n])
            .collect()
    }
}
