use rand::seq::index;
use rand::Rng;

use crate::common::types::{PageNumber, ProcessId};
use crate::trace::{Trace, TraceEvent};

/// Shape of a synthetic workload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkloadConfig {
    pub processes: u32,
    pub pages_per_process: usize,
    /// Pages each process references most of the time
    pub working_set_size: usize,
    pub references_per_process: usize,
    /// Probability that a reference lands in the working set
    pub locality: f64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            processes: 4,
            pages_per_process: 64,
            working_set_size: 8,
            references_per_process: 1_000,
            locality: 0.9,
        }
    }
}

/// Build a trace: every process starts, references are interleaved round-robin,
/// then every process terminates.
pub fn generate<R: Rng>(config: &WorkloadConfig, rng: &mut R) -> Trace {
    let pages = config.pages_per_process.max(1);
    let working_set_size = config.working_set_size.clamp(1, pages);
    // NaN survives clamp, treat it as no locality
    let locality = if config.locality.is_nan() {
        0.0
    } else {
        config.locality.clamp(0.0, 1.0)
    };

    let pids: Vec<ProcessId> = (1..=config.processes).map(ProcessId).collect();
    let working_sets: Vec<Vec<usize>> = pids
        .iter()
        .map(|_| {
            index::sample(rng, pages, working_set_size)
                .into_iter()
                .map(|idx| idx + 1)
                .collect()
        })
        .collect();

    let mut events = Vec::with_capacity(
        pids.len() * (config.references_per_process + 2),
    );
    events.extend(pids.iter().map(|&pid| TraceEvent::Start { pid, pages }));

    for _ in 0..config.references_per_process {
        for (pid, working_set) in pids.iter().zip(&working_sets) {
            let page = if rng.gen_bool(locality) {
                working_set[rng.gen_range(0..working_set.len())]
            } else {
                rng.gen_range(1..=pages)
            };
            events.push(TraceEvent::Reference { pid: *pid, page: PageNumber(page) });
        }
    }

    events.extend(pids.iter().map(|&pid| TraceEvent::Terminate { pid }));
    Trace { events }
}
