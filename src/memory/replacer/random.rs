use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::common::types::FrameId;
use crate::memory::frame::FrameTable;

/// Uniform random replacement over the whole frame table
pub struct RandomReplacer {
    rng: Box<dyn RngCore>,
}

impl RandomReplacer {
    /// Seeded from OS entropy
    pub fn new() -> Self {
        Self::with_rng(Box::new(StdRng::from_entropy()))
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(Box::new(StdRng::seed_from_u64(seed)))
    }

    pub fn with_rng(rng: Box<dyn RngCore>) -> Self {
        Self { rng }
    }

    pub fn victim(&mut self, frames: &FrameTable) -> FrameId {
        FrameId(self.rng.gen_range(0..frames.len()))
    }
}

impl Default for RandomReplacer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RandomReplacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomReplacer").finish_non_exhaustive()
    }
}
