// ABOUTME: Bounded FIFO of decoded instructions shared by the ingest and render threads.
// ABOUTME: The lock is only held for a push or a drain, never while instructions are processed.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use vcrt_core::Instruction;

use crate::error::ChannelError;

/// Queue capacity in frames' worth of instructions
pub const QUEUE_FRAMES: usize = 64;

#[derive(Debug, Clone)]
pub struct InstructionQueue {
    inner: Arc<Mutex<VecDeque<Instruction>>>,
    capacity: usize,
}

impl InstructionQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Capacity for `instructions_per_frame` times `QUEUE_FRAMES`
    pub fn for_frame_budget(instructions_per_frame: usize) -> Self {
        Self::new(instructions_per_frame.saturating_mul(QUEUE_FRAMES))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn free_capacity(&self) -> usize {
        self.capacity - self.lock().len()
    }

    /// Append a batch in order. Fails without queuing anything if it would not fit.
    pub fn push_batch(&self, batch: &[Instruction]) -> Result<(), ChannelError> {
        let mut queue = self.lock();
        if queue.len() + batch.len() > self.capacity {
            return Err(ChannelError::Overflow {
                pending: queue.len(),
                incoming: batch.len(),
                capacity: self.capacity,
            });
        }
        queue.extend(batch.iter().copied());
        Ok(())
    }

    /// Move up to `max` of the oldest instructions into `out`; returns how many moved
    pub fn drain_into(&self, max: usize, out: &mut Vec<Instruction>) -> usize {
        let mut queue = self.lock();
        let count = max.min(queue.len());
        out.extend(queue.drain(..count));
        count
    }

    // A panic while holding the lock cannot leave the deque half-updated
    fn lock(&self) -> MutexGuard<'_, VecDeque<Instruction>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
