pub mod types;

pub use types::{FrameId, PageNumber, ProcessId};
