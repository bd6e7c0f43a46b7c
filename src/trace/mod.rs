pub mod error;
pub mod parser;
pub mod workload;

use std::fmt;
use std::fs;
use std::path::Path;
use log::debug;

use crate::common::types::{PageNumber, ProcessId};
use crate::memory::{MemoryError, MemoryManager, MemoryStats, ReferenceOutcome};

pub use error::TraceError;
pub use parser::parse_line;
pub use workload::{generate, WorkloadConfig};

/// One event of a workload trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    Start { pid: ProcessId, pages: usize },
    Reference { pid: ProcessId, page: PageNumber },
    Terminate { pid: ProcessId },
}

impl TraceEvent {
    /// Apply this event to `manager`. Only references produce an outcome.
    pub fn apply(&self, manager: &mut MemoryManager) -> Result<Option<ReferenceOutcome>, MemoryError> {
        match *self {
            TraceEvent::Start { pid, pages } => {
                manager.start(pid, pages)?;
                Ok(None)
            }
            TraceEvent::Reference { pid, page } => Ok(Some(manager.reference(pid, page))),
            TraceEvent::Terminate { pid } => {
                manager.terminate(pid);
                Ok(None)
            }
        }
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::Start { pid, pages } => write!(f, "start {} {}", pid, pages),
            TraceEvent::Reference { pid, page } => write!(f, "ref {} {}", pid, page),
            TraceEvent::Terminate { pid } => write!(f, "terminate {}", pid),
        }
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "{}", event)?;
        }
        Ok(())
    }
}

/// An ordered workload of start/reference/terminate events
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    pub events: Vec<TraceEvent>,
}

impl Trace {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TraceError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, TraceError> {
        let mut events = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if let Some(event) = parse_line(line, idx + 1)? {
                events.push(event);
            }
        }
        Ok(Self { events })
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of reference events in the trace
    pub fn reference_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, TraceEvent::Reference { .. }))
            .count()
    }

    /// Feed every event to `manager` in order and return its counters afterwards
    pub fn replay(&self, manager: &mut MemoryManager) -> Result<MemoryStats, MemoryError> {
        for event in &self.events {
            event.apply(manager)?;
        }

        let stats = manager.stats();
        debug!(
            "Replayed {} events: {} references, {} faults",
            self.events.len(),
            stats.references,
            stats.faults
        );
        Ok(stats)
    }
}
