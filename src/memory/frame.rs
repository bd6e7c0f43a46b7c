use crate::common::types::{FrameId, ProcessId};

/// Physical frame record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub valid: bool,
    pub owner: Option<ProcessId>,
    /// Page table index of the owner's page held in this frame
    pub page: Option<usize>,
    /// Age counter used by the LRU policy only
    pub age: u64,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_free(&self) -> bool {
        !self.valid
    }

    fn clear(&mut self) {
        self.valid = false;
        self.owner = None;
        self.page = None;
        self.age = 0;
    }
}

/// Fixed-size table of physical frames
#[derive(Debug, Clone)]
pub struct FrameTable {
    frames: Vec<Frame>,
}

impl FrameTable {
    pub fn new(frame_count: usize) -> Self {
        Self {
            frames: vec![Frame::new(); frame_count],
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, frame_id: FrameId) -> Option<&Frame> {
        self.frames.get(frame_id.0)
    }

    /// First free frame, scanning from frame 0
    pub fn first_free(&self) -> Option<FrameId> {
        self.frames
            .iter()
            .position(Frame::is_free)
            .map(FrameId)
    }

    /// Hand a frame to `pid` for its page at `page`
    pub fn assign(&mut self, frame_id: FrameId, pid: ProcessId, page: usize) {
        let frame = &mut self.frames[frame_id.0];
        frame.valid = true;
        frame.owner = Some(pid);
        frame.page = Some(page);
    }

    /// Return a frame to the free state
    pub fn release(&mut self, frame_id: FrameId) {
        self.frames[frame_id.0].clear();
    }

    /// Reset the age of `frame_id` and age every other valid frame by one
    pub fn touch(&mut self, frame_id: FrameId) {
        for (idx, frame) in self.frames.iter_mut().enumerate() {
            if idx == frame_id.0 {
                frame.age = 0;
            } else if frame.valid {
                frame.age += 1;
            }
        }
    }

    pub fn valid_count(&self) -> usize {
        self.frames.iter().filter(|frame| frame.valid).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FrameId, &Frame)> {
        self.frames
            .iter()
            .enumerate()
            .map(|(idx, frame)| (FrameId(idx), frame))
    }
}
