// ABOUTME: Bounded, chronological history of beam samples for one frame tick.
// ABOUTME: Keeps the last sample before the window as an anchor so strokes stay connected.

use std::collections::VecDeque;

use vcrt_core::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub position: Point,
    pub powered_on: bool,
}

/// Sliding window of the most recent samples, oldest first.
///
/// The window is emptied at the start of every tick. The sample that
/// immediately precedes the window (the last one of the previous tick, or the
/// most recently evicted one) is kept as the anchor and starts the first
/// segment.
#[derive(Debug, Clone)]
pub struct PositionTrace {
    samples: VecDeque<PositionSample>,
    capacity: usize,
    anchor: Option<PositionSample>,
}

impl PositionTrace {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            anchor: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn anchor(&self) -> Option<PositionSample> {
        self.anchor
    }

    /// Reset for a new tick
    pub fn begin_tick(&mut self) {
        if let Some(last) = self.samples.back() {
            self.anchor = Some(*last);
        }
        self.samples.clear();
    }

    /// Append a sample, evicting the oldest one when full
    pub fn push(&mut self, sample: PositionSample) {
        if self.samples.len() == self.capacity {
            self.anchor = self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn samples(&self) -> impl Iterator<Item = &PositionSample> {
        self.samples.iter()
    }

    /// Every consecutive pair, starting from the anchor when there is one
    pub fn segments(&self) -> impl Iterator<Item = (PositionSample, PositionSample)> + '_ {
        let points = || self.anchor.iter().chain(self.samples.iter()).copied();
        points().zip(points().skip(1))
    }
}
