//! Algos Library
//!
//! A namespaced object store over named shared-memory (or memory-mapped file)
//! regions with an explicit handle index, plus the toy text algorithms and the
//! command-line surface that drives them.

pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod storage;
pub mod text;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::core::region::{BackendKind, RegionBackend, RegionError};
pub use crate::core::{InProcessBackend, MmapBackend, ShmBackend};
pub use crate::error::{StoreError, StoreResult};
pub use crate::storage::{object_region_name, SharedStore, StoreState};
pub use crate::text::anagrams;
