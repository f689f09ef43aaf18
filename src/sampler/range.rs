//! Random-permutation sampling over large integer ranges.
//!
//! [`RangeSampler`] yields every integer of a half-open range exactly once,
//! in random order. Each draw is uniform within the fragment it splits, but
//! resolved singletons are emitted ahead of wider fragments, so whole
//! permutations are not equally likely. It never materializes the range: it
//! keeps a queue of the fragments that have not been visited yet, and each
//! draw replaces one fragment with at most two smaller ones. Memory therefore
//! grows with the number of values drawn so far, not with the range width,
//! which makes ranges of 2^64 or 2^127 values practical.

use std::collections::VecDeque;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Errors raised while constructing a [`RangeSampler`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SampleError {
    #[error("no stop point specified")]
    MissingBound,

    #[error("range [{start}, {stop}) contains no values")]
    EmptyRange { start: u128, stop: u128 },
}

/// Half-open block `[lo, hi)` of values not yet emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Interval {
    lo: u128,
    hi: u128,
}

impl Interval {
    fn width(&self) -> u128 {
        self.hi.saturating_sub(self.lo)
    }

    fn is_empty(&self) -> bool {
        self.hi <= self.lo
    }

    /// Width one: the value is known and needs no further draw.
    fn is_resolved(&self) -> bool {
        self.width() == 1
    }

    /// The parts of this fragment below and at or above `point`.
    fn split_at(&self, point: u128) -> (Interval, Interval) {
        let point = point.clamp(self.lo, self.hi.max(self.lo));
        (Interval { lo: self.lo, hi: point }, Interval { lo: point, hi: self.hi })
    }
}

/// Lazy random permutation of `[start, stop)`.
///
/// Pending fragments live in a FIFO queue. Resolved singletons jump the
/// queue so they are emitted without consuming randomness; general
/// fragments wait at the back. Together with the values already emitted,
/// the queued fragments always partition the original range exactly.
#[derive(Debug, Clone)]
pub struct RangeSampler<R = StdRng> {
    pending: VecDeque<Interval>,
    start: u128,
    stop: u128,
    /// No pending value is `>= top`.
    top: u128,
    /// Highest stop the sampler has ever had.
    reached: u128,
    /// Unemitted fragments cut off by a shrink, restored when the stop grows back.
    parked: Vec<Interval>,
    remaining: u128,
    rng: R,
}

impl RangeSampler<StdRng> {
    /// Sampler over `[start, stop)` driven by an entropy-seeded generator.
    pub fn from_entropy(start: u128, stop: u128) -> Result<Self, SampleError> {
        Self::new(start, stop, StdRng::from_entropy())
    }
}

impl<R: Rng> RangeSampler<R> {
    /// Build a sampler from optional bounds.
    ///
    /// A single bound is the stop point and the start defaults to zero.
    /// Fails with [`SampleError::MissingBound`] when neither is given and
    /// with [`SampleError::EmptyRange`] when `stop <= start`.
    pub fn from_bounds(start: Option<u128>, stop: Option<u128>, rng: R) -> Result<Self, SampleError> {
        let (start, stop) = match (start, stop) {
            (Some(start), Some(stop)) => (start, stop),
            (Some(stop), None) | (None, Some(stop)) => (0, stop),
            (None, None) => return Err(SampleError::MissingBound),
        };

        if stop <= start {
            return Err(SampleError::EmptyRange { start, stop });
        }

        debug!("Sampling {} values from [{}, {})", stop - start, start, stop);

        let mut pending = VecDeque::new();
        pending.push_back(Interval { lo: start, hi: stop });

        Ok(RangeSampler {
            pending,
            start,
            stop,
            top: stop,
            reached: stop,
            parked: Vec::new(),
            remaining: stop - start,
            rng,
        })
    }

    /// Sampler over `[start, stop)`.
    pub fn new(start: u128, stop: u128, rng: R) -> Result<Self, SampleError> {
        Self::from_bounds(Some(start), Some(stop), rng)
    }

    /// Sampler over `[0, stop)`.
    pub fn up_to(stop: u128, rng: R) -> Result<Self, SampleError> {
        Self::from_bounds(None, Some(stop), rng)
    }

    /// Lower bound of the sampled range.
    pub fn start(&self) -> u128 {
        self.start
    }

    /// Current exclusive upper bound of the sampled range.
    pub fn stop(&self) -> u128 {
        self.stop
    }

    /// Number of values not yet emitted.
    pub fn remaining(&self) -> u128 {
        self.remaining
    }

    /// Number of queued fragments. Bounded by draws so far plus one.
    pub fn fragments(&self) -> usize {
        self.pending.len()
    }

    /// Move the stop point of a sampler that is already running.
    ///
    /// Growing adds `[stop, new_stop)` to the pending values. Shrinking sets
    /// aside every pending value at or above `new_stop`; a stop at or below
    /// `start` leaves nothing pending. Values set aside come back when the
    /// stop grows past them again. Emitted values are never re-emitted.
    pub fn adjust_bounds(&mut self, new_stop: u128) {
        debug!("Adjusting sampler stop from {} to {}", self.stop, new_stop);

        let new_stop = new_stop.max(self.start);

        if new_stop > self.stop {
            let parked = std::mem::take(&mut self.parked);
            for interval in parked {
                let (below, above) = interval.split_at(new_stop);
                self.requeue(below);
                if !above.is_empty() {
                    self.parked.push(above);
                }
            }

            // Only values past the highest stop so far are new.
            self.requeue(Interval { lo: self.stop.max(self.reached), hi: new_stop });
            self.reached = self.reached.max(new_stop);
            self.top = new_stop;
        } else if new_stop < self.top {
            let mut kept = VecDeque::with_capacity(self.pending.len());
            for interval in std::mem::take(&mut self.pending) {
                let (below, above) = interval.split_at(new_stop);
                if !below.is_empty() {
                    kept.push_back(below);
                }
                if !above.is_empty() {
                    self.parked.push(above);
                }
            }
            self.pending = kept;

            // Clipping can resolve fragments; those move ahead of the general ones.
            self.pending.make_contiguous().sort_by_key(|interval| !interval.is_resolved());
            self.top = new_stop;
        }

        self.remaining = self.pending.iter().map(Interval::width).sum();
        self.stop = new_stop;
    }

    /// Put a non-empty fragment back: singletons first, the rest last.
    fn requeue(&mut self, interval: Interval) {
        if interval.is_empty() {
            return;
        }

        if interval.is_resolved() {
            self.pending.push_front(interval);
        } else {
            self.pending.push_back(interval);
        }
    }

    fn emit(&mut self, value: u128) -> u128 {
        self.remaining -= 1;
        if value + 1 == self.top {
            self.top = value;
        }
        value
    }
}

impl<R: Rng> Iterator for RangeSampler<R> {
    type Item = u128;

    fn next(&mut self) -> Option<u128> {
        let interval = self.pending.pop_front()?;

        if interval.is_resolved() {
            return Some(self.emit(interval.lo));
        }

        let value = self.rng.gen_range(interval.lo..interval.hi);
        self.requeue(Interval { lo: interval.lo, hi: value });
        self.requeue(Interval { lo: value + 1, hi: interval.hi });

        Some(self.emit(value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(remaining) => (remaining, Some(remaining)),
            Err(_) => (usize::MAX, None),
        }
    }
}

/// Random permutation of `[start, stop)` using an entropy-seeded generator.
pub fn range_sampler(start: u128, stop: u128) -> Result<RangeSampler<StdRng>, SampleError> {
    RangeSampler::from_entropy(start, stop)
}
