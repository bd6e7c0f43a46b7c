use std::collections::VecDeque;
use log::error;

use crate::common::types::{FrameId, ProcessId};
use crate::memory::error::MemoryError;
use crate::memory::frame::FrameTable;

/// First-in-first-out replacement: frames leave in the order they were filled
#[derive(Debug, Clone, Default)]
pub struct FifoReplacer {
    queue: VecDeque<FrameId>,
}

impl FifoReplacer {
    pub fn new(frame_count: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(frame_count),
        }
    }

    /// Record that a frame has just been filled
    pub fn record_arrival(&mut self, frame_id: FrameId) {
        self.queue.push_back(frame_id);
    }

    /// Victim selection: the frame that arrived first
    pub fn victim(&mut self, frames: &FrameTable) -> Option<FrameId> {
        if let Err(e) = self.check(frames) {
            error!("{}", e);
        }
        self.queue.pop_front()
    }

    /// Drop every queued frame currently owned by `pid`, keeping the order of the rest
    pub fn purge(&mut self, frames: &FrameTable, pid: ProcessId) {
        self.queue.retain(|&frame_id| {
            frames.get(frame_id).and_then(|frame| frame.owner) != Some(pid)
        });
    }

    /// The queue must hold exactly one entry per valid frame
    pub fn check(&self, frames: &FrameTable) -> Result<(), MemoryError> {
        let valid = frames.valid_count();
        if self.queue.len() != valid {
            return Err(MemoryError::Inconsistent(format!(
                "FIFO queue holds {} frames but {} frames are valid",
                self.queue.len(),
                valid
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = FrameId> + '_ {
        self.queue.iter().copied()
    }
}
