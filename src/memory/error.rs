use thiserror::Error;
use crate::common::types::ProcessId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Frame count must be positive")]
    NoFrames,
    #[error("Process {0} must have at least one page")]
    EmptyAddressSpace(ProcessId),
    #[error("Inconsistent memory state: {0}")]
    Inconsistent(String),
}
