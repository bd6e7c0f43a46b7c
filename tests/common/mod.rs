#![allow(dead_code)]

use std::io::Write;
use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::NamedTempFile;
use pagesim::{MemoryManager, MemoryManagerConfig, PageNumber, ProcessId, ReplacementPolicy};

// Create a manager with a fixed seed so random runs are repeatable
pub fn create_test_manager(frame_count: usize, policy: ReplacementPolicy) -> Result<MemoryManager> {
    Ok(MemoryManager::with_config(MemoryManagerConfig {
        frame_count,
        policy,
        seed: Some(0xC0FFEE),
    })?)
}

// Write a trace to a temporary file
pub fn create_trace_file(content: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Drive `manager` with a random mix of start/reference/terminate calls,
/// checking every bookkeeping invariant after each one.
pub fn stress(manager: &mut MemoryManager, seed: u64, steps: usize) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut page_counts = vec![0usize; 6];

    for _ in 0..steps {
        let slot = rng.gen_range(0..page_counts.len());
        let pid = ProcessId(slot as u32);
        match rng.gen_range(0..100) {
            0..=4 => {
                let pages = rng.gen_range(1..=8);
                manager.start(pid, pages)?;
                page_counts[slot] = pages;
            }
            5..=7 => {
                manager.terminate(pid);
                page_counts[slot] = 0;
            }
            _ => {
                // occasionally step outside the address space
                let page = rng.gen_range(0..=page_counts[slot] + 1);
                let before = manager.reference_count();
                manager.reference(pid, PageNumber(page));
                assert_eq!(manager.reference_count(), before + 1);
            }
        }
        manager.verify()?;
        assert!(manager.frames().valid_count() <= manager.frame_count());
    }
    Ok(())
}
