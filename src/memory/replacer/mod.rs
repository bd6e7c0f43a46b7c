mod fifo;
mod lru;
mod random;

use std::fmt;
use std::str::FromStr;
use log::error;
use rand::RngCore;

use crate::common::types::{FrameId, ProcessId};
use crate::memory::error::MemoryError;
use crate::memory::frame::FrameTable;

pub use fifo::FifoReplacer;
pub use lru::LruReplacer;
pub use random::RandomReplacer;

/// Which replacement policy a manager runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReplacementPolicy {
    #[default]
    Fifo,
    Lru,
    Random,
}

impl ReplacementPolicy {
    pub const ALL: [ReplacementPolicy; 3] = [
        ReplacementPolicy::Fifo,
        ReplacementPolicy::Lru,
        ReplacementPolicy::Random,
    ];
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReplacementPolicy::Fifo => "FIFO",
            ReplacementPolicy::Lru => "LRU",
            ReplacementPolicy::Random => "RANDOM",
        };
        f.write_str(name)
    }
}

impl FromStr for ReplacementPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fifo" | "queue" => Ok(ReplacementPolicy::Fifo),
            "lru" => Ok(ReplacementPolicy::Lru),
            "random" | "rand" => Ok(ReplacementPolicy::Random),
            other => Err(format!("Unknown replacement policy: {}", other)),
        }
    }
}

/// Runtime state of the active replacement policy
#[derive(Debug)]
pub enum Replacer {
    Fifo(FifoReplacer),
    Lru(LruReplacer),
    Random(RandomReplacer),
}

impl Replacer {
    pub fn new(policy: ReplacementPolicy, frame_count: usize, seed: Option<u64>) -> Self {
        match policy {
            ReplacementPolicy::Fifo => Replacer::Fifo(FifoReplacer::new(frame_count)),
            ReplacementPolicy::Lru => Replacer::Lru(LruReplacer::new()),
            ReplacementPolicy::Random => Replacer::Random(match seed {
                Some(seed) => RandomReplacer::with_seed(seed),
                None => RandomReplacer::new(),
            }),
        }
    }

    /// Like `new`, but a random policy draws from `rng`
    pub fn with_rng(policy: ReplacementPolicy, frame_count: usize, rng: Box<dyn RngCore>) -> Self {
        match policy {
            ReplacementPolicy::Random => Replacer::Random(RandomReplacer::with_rng(rng)),
            other => Replacer::new(other, frame_count, None),
        }
    }

    pub fn policy(&self) -> ReplacementPolicy {
        match self {
            Replacer::Fifo(_) => ReplacementPolicy::Fifo,
            Replacer::Lru(_) => ReplacementPolicy::Lru,
            Replacer::Random(_) => ReplacementPolicy::Random,
        }
    }

    /// A frame has just been filled, either from the free pool or by eviction
    pub fn record_arrival(&mut self, frame_id: FrameId) {
        if let Replacer::Fifo(fifo) = self {
            fifo.record_arrival(frame_id);
        }
    }

    /// A frame has been referenced or (re)assigned
    pub fn record_access(&mut self, frames: &mut FrameTable, frame_id: FrameId) {
        if let Replacer::Lru(lru) = self {
            lru.record_access(frames, frame_id);
        }
    }

    /// Pick the frame to evict. Ownership is left untouched.
    pub fn victim(&mut self, frames: &FrameTable) -> FrameId {
        match self {
            Replacer::Fifo(fifo) => fifo.victim(frames).unwrap_or_else(|| {
                error!("FIFO queue is empty with no free frame, evicting frame 0");
                FrameId(0)
            }),
            Replacer::Lru(lru) => lru.victim(frames),
            Replacer::Random(random) => random.victim(frames),
        }
    }

    /// Forget the frames held by a terminating process
    pub fn purge(&mut self, frames: &FrameTable, pid: ProcessId) {
        if let Replacer::Fifo(fifo) = self {
            fifo.purge(frames, pid);
        }
    }

    pub fn check(&self, frames: &FrameTable) -> Result<(), MemoryError> {
        match self {
            Replacer::Fifo(fifo) => fifo.check(frames),
            _ => Ok(()),
        }
    }

    /// FIFO arrival order, empty for other policies
    pub fn queue(&self) -> Vec<FrameId> {
        match self {
            Replacer::Fifo(fifo) => fifo.iter().collect(),
            _ => Vec::new(),
        }
    }
}
