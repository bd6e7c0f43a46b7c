use std::collections::HashMap;
use log::{debug, warn};
use rand::RngCore;

use crate::common::types::{FrameId, PageNumber, ProcessId};
use crate::memory::address_space::AddressSpace;
use crate::memory::error::MemoryError;
use crate::memory::frame::FrameTable;
use crate::memory::replacer::{ReplacementPolicy, Replacer};

const DEFAULT_FRAME_COUNT: usize = 16;

/// Construction parameters for a `MemoryManager`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryManagerConfig {
    pub frame_count: usize,
    pub policy: ReplacementPolicy,
    /// Seed for the random policy, `None` seeds from OS entropy
    pub seed: Option<u64>,
}

impl Default for MemoryManagerConfig {
    fn default() -> Self {
        Self {
            frame_count: DEFAULT_FRAME_COUNT,
            policy: ReplacementPolicy::Fifo,
            seed: None,
        }
    }
}

/// Result of a single page reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceOutcome {
    Resident,
    FaultNoEviction,
    FaultWithEviction,
    InvalidReference,
}

impl ReferenceOutcome {
    pub fn is_fault(self) -> bool {
        matches!(
            self,
            ReferenceOutcome::FaultNoEviction | ReferenceOutcome::FaultWithEviction
        )
    }
}

/// Cumulative counters, never reset for the lifetime of a manager
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    pub references: u64,
    pub faults: u64,
    pub evictions: u64,
    pub invalid_references: u64,
}

impl MemoryStats {
    pub fn hits(&self) -> u64 {
        self.references - self.faults - self.invalid_references
    }

    /// Faults as a percentage of all references
    pub fn fault_rate(&self) -> f64 {
        if self.references == 0 {
            0.0
        } else {
            (self.faults as f64 / self.references as f64) * 100.0
        }
    }
}

/// Demand-paging engine: frame table, per-process page tables and the active replacement policy
#[derive(Debug)]
pub struct MemoryManager {
    frames: FrameTable,
    address_spaces: HashMap<ProcessId, AddressSpace>,
    replacer: Replacer,
    stats: MemoryStats,
}

impl MemoryManager {
    pub fn new(frame_count: usize, policy: ReplacementPolicy) -> Result<Self, MemoryError> {
        Self::with_config(MemoryManagerConfig {
            frame_count,
            policy,
            seed: None,
        })
    }

    pub fn with_config(config: MemoryManagerConfig) -> Result<Self, MemoryError> {
        let replacer = Replacer::new(config.policy, config.frame_count, config.seed);
        Self::with_replacer(config.frame_count, replacer)
    }

    /// Create a manager whose random policy draws from `rng`
    pub fn with_rng(
        frame_count: usize,
        policy: ReplacementPolicy,
        rng: Box<dyn RngCore>,
    ) -> Result<Self, MemoryError> {
        Self::with_replacer(frame_count, Replacer::with_rng(policy, frame_count, rng))
    }

    fn with_replacer(frame_count: usize, replacer: Replacer) -> Result<Self, MemoryError> {
        if frame_count == 0 {
            return Err(MemoryError::NoFrames);
        }

        debug!("Memory manager: {} frames, {} policy", frame_count, replacer.policy());

        Ok(Self {
            frames: FrameTable::new(frame_count),
            address_spaces: HashMap::new(),
            replacer,
            stats: MemoryStats::default(),
        })
    }

    /// Create an address space of `page_count` unmapped pages for `pid`.
    ///
    /// Starting a pid that is already running first terminates the old address space,
    /// so its frames go back to the free pool.
    pub fn start(&mut self, pid: ProcessId, page_count: usize) -> Result<(), MemoryError> {
        if page_count == 0 {
            return Err(MemoryError::EmptyAddressSpace(pid));
        }

        if self.address_spaces.contains_key(&pid) {
            warn!("Process {} started twice, reclaiming its frames", pid);
            self.terminate(pid);
        }

        self.address_spaces.insert(pid, AddressSpace::new(page_count));
        debug!("Started process {} with {} pages", pid, page_count);
        Ok(())
    }

    /// Reference a page of `pid`, faulting it in if needed
    pub fn reference(&mut self, pid: ProcessId, page: PageNumber) -> ReferenceOutcome {
        // Counted before validation, so rejected references still show up here
        self.stats.references += 1;

        let index = match self.page_index(pid, page) {
            Some(index) => index,
            None => {
                warn!("Invalid page reference: process {} page {}", pid, page);
                self.stats.invalid_references += 1;
                return ReferenceOutcome::InvalidReference;
            }
        };

        let resident = self
            .address_spaces
            .get(&pid)
            .and_then(|space| space.frame_of(index));

        if let Some(frame_id) = resident {
            self.replacer.record_access(&mut self.frames, frame_id);
            return ReferenceOutcome::Resident;
        }

        self.stats.faults += 1;

        if let Some(frame_id) = self.frames.first_free() {
            self.install(pid, index, frame_id);
            return ReferenceOutcome::FaultNoEviction;
        }

        let victim = self.replacer.victim(&self.frames);
        self.evict(victim);
        self.install(pid, index, victim);
        self.stats.evictions += 1;
        ReferenceOutcome::FaultWithEviction
    }

    /// Release every frame held by `pid` and drop its address space
    pub fn terminate(&mut self, pid: ProcessId) {
        let Some(space) = self.address_spaces.remove(&pid) else {
            debug!("Terminate for unknown process {}", pid);
            return;
        };

        // Ownership is still live here, the purge depends on it
        self.replacer.purge(&self.frames, pid);

        for (_, frame_id) in space.mapped() {
            self.frames.release(frame_id);
        }

        debug!(
            "Terminated process {}, released {} frames",
            pid,
            space.resident_count()
        );
    }

    pub fn fault_count(&self) -> u64 {
        self.stats.faults
    }

    pub fn reference_count(&self) -> u64 {
        self.stats.references
    }

    pub fn stats(&self) -> MemoryStats {
        self.stats
    }

    pub fn policy(&self) -> ReplacementPolicy {
        self.replacer.policy()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &FrameTable {
        &self.frames
    }

    pub fn address_space(&self, pid: ProcessId) -> Option<&AddressSpace> {
        self.address_spaces.get(&pid)
    }

    pub fn process_count(&self) -> usize {
        self.address_spaces.len()
    }

    /// FIFO arrival order, empty for other policies
    pub fn fifo_queue(&self) -> Vec<FrameId> {
        self.replacer.queue()
    }

    /// Check the bookkeeping that ties frames, page tables and the policy together
    pub fn verify(&self) -> Result<(), MemoryError> {
        let queued = self.replacer.queue().len();
        if queued > self.frames.len() {
            return Err(MemoryError::Inconsistent(format!(
                "{} queued frames exceed frame count {}",
                queued,
                self.frames.len()
            )));
        }

        for (frame_id, frame) in self.frames.iter() {
            if frame.valid != frame.owner.is_some() {
                return Err(MemoryError::Inconsistent(format!(
                    "frame {} is valid={} with owner {:?}",
                    frame_id, frame.valid, frame.owner
                )));
            }

            if let (Some(owner), Some(page)) = (frame.owner, frame.page) {
                let mapped = self
                    .address_spaces
                    .get(&owner)
                    .and_then(|space| space.frame_of(page));
                if mapped != Some(frame_id) {
                    return Err(MemoryError::Inconsistent(format!(
                        "frame {} claims page {} of process {}, which maps to {:?}",
                        frame_id, page + 1, owner, mapped
                    )));
                }
            } else if frame.valid {
                return Err(MemoryError::Inconsistent(format!(
                    "frame {} is valid without a page",
                    frame_id
                )));
            }
        }

        // Every mapping must be the one its frame points back to
        for (&pid, space) in &self.address_spaces {
            for (index, frame_id) in space.mapped() {
                let frame = self.frames.get(frame_id).ok_or_else(|| {
                    MemoryError::Inconsistent(format!(
                        "process {} page {} maps to missing frame {}",
                        pid, index + 1, frame_id
                    ))
                })?;
                if !frame.valid || frame.owner != Some(pid) || frame.page != Some(index) {
                    return Err(MemoryError::Inconsistent(format!(
                        "process {} page {} maps to frame {} held by {:?}",
                        pid, index + 1, frame_id, frame.owner
                    )));
                }
            }
        }

        self.replacer.check(&self.frames)
    }

    fn page_index(&self, pid: ProcessId, page: PageNumber) -> Option<usize> {
        let space = self.address_spaces.get(&pid)?;
        page.index().filter(|&index| index < space.page_count())
    }

    /// Take `frame_id` away from its current owner
    fn evict(&mut self, frame_id: FrameId) {
        let Some(frame) = self.frames.get(frame_id) else {
            return;
        };
        if let (Some(owner), Some(page)) = (frame.owner, frame.page) {
            if let Some(space) = self.address_spaces.get_mut(&owner) {
                if space.frame_of(page) == Some(frame_id) {
                    space.unmap(page);
                }
            }
            debug!("Evicted page {} of process {} from frame {}", page + 1, owner, frame_id);
        }
    }

    fn install(&mut self, pid: ProcessId, index: usize, frame_id: FrameId) {
        self.frames.assign(frame_id, pid, index);
        if let Some(space) = self.address_spaces.get_mut(&pid) {
            space.map(index, frame_id);
        }
        self.replacer.record_arrival(frame_id);
        self.replacer.record_access(&mut self.frames, frame_id);
    }
}
