use crate::core::region::{BackendKind, UnknownBackend};
use std::path::PathBuf;

pub const BACKEND_ENV: &str = "ALGOS_STORE_BACKEND";
pub const LOG_ENV: &str = "ALGOS_LOG";
pub const DEFAULT_LOG_FILTER: &str = "warn";

pub const DEFAULT_BACKEND: BackendKind = BackendKind::SharedMemory;

// Linux NAME_MAX for shm_open names; macOS is stricter (31) and reports the
// failure through the backend instead.
pub const MAX_NAME_LEN: usize = 255;

// Every region starts with the payload length as a little-endian u64
pub const FRAME_HEADER_LEN: usize = 8;

/// Directory name under the system temp dir used by the CLI's mmap backend
pub const MMAP_DIR_NAME: &str = "algos-regions";

/// Backend selected through `ALGOS_STORE_BACKEND`, falling back to shared memory.
pub fn backend_from_env() -> Result<BackendKind, UnknownBackend> {
    match std::env::var(BACKEND_ENV) {
        Ok(value) if !value.trim().is_empty() => value.parse(),
        _ => Ok(DEFAULT_BACKEND),
    }
}

pub fn default_mmap_dir() -> PathBuf {
    std::env::temp_dir().join(MMAP_DIR_NAME)
}
