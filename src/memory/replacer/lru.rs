use crate::common::types::FrameId;
use crate::memory::frame::FrameTable;

/// Approximate LRU driven by the per-frame age counters.
///
/// The scan starts with frame 0 as the candidate and a maximum age of 0, and only
/// moves on a strictly greater age. When every age is 0 the victim is frame 0,
/// whatever the real access order was.
#[derive(Debug, Clone, Copy, Default)]
pub struct LruReplacer;

impl LruReplacer {
    pub fn new() -> Self {
        Self
    }

    /// Record that a frame has been accessed
    pub fn record_access(&self, frames: &mut FrameTable, frame_id: FrameId) {
        frames.touch(frame_id);
    }

    /// Victim selection: the frame with the strictly largest age
    pub fn victim(&self, frames: &FrameTable) -> FrameId {
        let mut victim = 0;
        let mut max_age = 0;
        for (frame_id, frame) in frames.iter() {
            if frame.age > max_age {
                max_age = frame.age;
                victim = frame_id.index();
            }
        }
        FrameId(victim)
    }
}
