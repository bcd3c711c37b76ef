//! Region layer
//!
//! The named byte region interface and its shared memory, memory-mapped file
//! and in-process implementations.

pub mod in_process;
pub mod mmap;
pub mod region;
pub mod shared_map;

pub use in_process::InProcessBackend;
pub use mmap::MmapBackend;
pub use region::{BackendKind, RegionBackend, RegionError, UnknownBackend};
pub use shared_map::ShmBackend;
