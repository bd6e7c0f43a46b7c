pub mod address_space;
pub mod error;
pub mod frame;
pub mod manager;
pub mod replacer;

pub use address_space::AddressSpace;
pub use error::MemoryError;
pub use frame::{Frame, FrameTable};
pub use manager::{MemoryManager, MemoryManagerConfig, MemoryStats, ReferenceOutcome};
pub use replacer::ReplacementPolicy;
