// Pagesim: demand-paging simulator for comparing frame replacement policies

pub mod common;
pub mod memory;
pub mod trace;

// Re-export key items for convenient access
pub use common::types::{FrameId, PageNumber, ProcessId};
pub use memory::{
    MemoryError, MemoryManager, MemoryManagerConfig, MemoryStats, ReferenceOutcome,
    ReplacementPolicy,
};
pub use trace::{Trace, TraceError, TraceEvent};
