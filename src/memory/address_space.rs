use crate::common::types::FrameId;

/// Per-process page table. Each entry holds the frame backing the page, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSpace {
    page_table: Vec<Option<FrameId>>,
}

impl AddressSpace {
    pub fn new(page_count: usize) -> Self {
        Self {
            page_table: vec![None; page_count],
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_table.len()
    }

    /// Frame backing the page at `index`, `None` if unmapped or out of range
    pub fn frame_of(&self, index: usize) -> Option<FrameId> {
        self.page_table.get(index).copied().flatten()
    }

    pub(crate) fn map(&mut self, index: usize, frame_id: FrameId) {
        self.page_table[index] = Some(frame_id);
    }

    pub(crate) fn unmap(&mut self, index: usize) {
        self.page_table[index] = None;
    }

    /// Mapped pages as `(index, frame)` pairs in page order
    pub fn mapped(&self) -> impl Iterator<Item = (usize, FrameId)> + '_ {
        self.page_table
            .iter()
            .enumerate()
            .filter_map(|(idx, entry)| entry.map(|frame_id| (idx, frame_id)))
    }

    pub fn resident_count(&self) -> usize {
        self.page_table.iter().filter(|entry| entry.is_some()).count()
    }
}
