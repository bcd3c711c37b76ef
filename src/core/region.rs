//! Named byte regions and the backends that realize them.
//!
//! A region is one named block of shared or mapped memory. Its content is a
//! frame: the payload length as a little-endian `u64` followed by the payload.
//! The header is needed because some platforms round mapping sizes up to a
//! page, so the mapping length alone does not tell where the payload ends.

use crate::config::FRAME_HEADER_LEN;
use crate::core::in_process::InProcessBackend;
use crate::core::mmap::MmapBackend;
use crate::core::shared_map::ShmBackend;
use shared_memory::ShmemError;
use std::fmt;
use std::io;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegionError {
    #[error("region already exists: {0}")]
    AlreadyExists(String),
    #[error("region not found: {0}")]
    NotFound(String),
    #[error("region {name} is truncated: header claims {claimed} bytes, {available} available")]
    Truncated {
        name: String,
        claimed: usize,
        available: usize,
    },
    #[error("shared memory error ({name}): {source}")]
    Shmem {
        name: String,
        #[source]
        source: ShmemError,
    },
    #[error("region io error ({name}): {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

impl RegionError {
    pub(crate) fn io(name: &str, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => RegionError::NotFound(name.to_string()),
            io::ErrorKind::AlreadyExists => RegionError::AlreadyExists(name.to_string()),
            _ => RegionError::Io {
                name: name.to_string(),
                source,
            },
        }
    }
}

/// Capability interface over named byte regions.
///
/// The store is written once against this trait. Implementations only move
/// bytes; they know nothing about namespaces or indexes.
pub trait RegionBackend: fmt::Debug + Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Create a new region sized to fit `payload`.
    ///
    /// Fails with [`RegionError::AlreadyExists`] if `name` is taken.
    fn create(&self, name: &str, payload: &[u8]) -> Result<(), RegionError>;

    /// Attach to an existing region and copy its payload out.
    fn attach(&self, name: &str) -> Result<Vec<u8>, RegionError>;

    /// Replace the content of an existing region, resizing it to fit.
    ///
    /// Shared memory segments cannot grow or shrink in place, so the default
    /// destroys the region and creates a fresh one.
    fn resize(&self, name: &str, payload: &[u8]) -> Result<(), RegionError> {
        self.destroy(name)?;
        self.create(name, payload)
    }

    fn destroy(&self, name: &str) -> Result<(), RegionError>;

    /// Release backend-owned resources. Idempotent.
    fn release(&mut self) -> Result<(), RegionError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    SharedMemory,
    MmapFile,
    InProcess,
}

#[derive(Debug, Error)]
#[error("unrecognized backend {0:?} (expected shm, mmap or memory)")]
pub struct UnknownBackend(pub String);

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::SharedMemory => "shm",
            BackendKind::MmapFile => "mmap",
            BackendKind::InProcess => "memory",
        }
    }

    /// Build a fresh backend of this kind with its default resources.
    pub fn open(self) -> Result<Box<dyn RegionBackend>, RegionError> {
        Ok(match self {
            BackendKind::SharedMemory => Box::new(ShmBackend::new()),
            BackendKind::MmapFile => Box::new(MmapBackend::new()?),
            BackendKind::InProcess => Box::new(InProcessBackend::new()),
        })
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shm" | "shared-memory" | "shared_memory" => Ok(BackendKind::SharedMemory),
            "mmap" | "mmap-file" | "mmap_file" => Ok(BackendKind::MmapFile),
            "memory" | "in-process" | "in_process" => Ok(BackendKind::InProcess),
            _ => Err(UnknownBackend(s.to_string())),
        }
    }
}

pub(crate) fn framed_len(payload: &[u8]) -> usize {
    FRAME_HEADER_LEN + payload.len()
}

/// Write header and payload into `dst`, which must be at least `framed_len` long.
pub(crate) fn write_frame(dst: &mut [u8], payload: &[u8]) {
    let (header, body) = dst.split_at_mut(FRAME_HEADER_LEN);
    header.copy_from_slice(&(payload.len() as u64).to_le_bytes());
    body[..payload.len()].copy_from_slice(payload);
}

pub(crate) fn frame(payload: &[u8]) -> Vec<u8> {
    let mut buf = vec![0u8; framed_len(payload)];
    write_frame(&mut buf, payload);
    buf
}

pub(crate) fn unframe(name: &str, bytes: &[u8]) -> Result<Vec<u8>, RegionError> {
    if bytes.len() < FRAME_HEADER_LEN {
        return Err(RegionError::Truncated {
            name: name.to_string(),
            claimed: FRAME_HEADER_LEN,
            available: bytes.len(),
        });
    }
    let mut header = [0u8; FRAME_HEADER_LEN];
    header.copy_from_slice(&bytes[..FRAME_HEADER_LEN]);
    let claimed = u64::from_le_bytes(header) as usize;
    let body = &bytes[FRAME_HEADER_LEN..];
    if claimed > body.len() {
        return Err(RegionError::Truncated {
            name: name.to_string(),
            claimed,
            available: body.len(),
        });
    }
    Ok(body[..claimed].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!("shm".parse::<BackendKind>().unwrap(), BackendKind::SharedMemory);
        assert_eq!("MMAP".parse::<BackendKind>().unwrap(), BackendKind::MmapFile);
        assert_eq!(" in-process ".parse::<BackendKind>().unwrap(), BackendKind::InProcess);
        assert!("sysv".parse::<BackendKind>().is_err());
        assert!("".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_backend_kind_display_parses_back() {
        for kind in [BackendKind::SharedMemory, BackendKind::MmapFile, BackendKind::InProcess] {
            assert_eq!(kind.to_string().parse::<BackendKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unframe_ignores_trailing_padding() {
        let mut bytes = frame(b"abc");
        // page rounding leaves zeroes after the payload
        bytes.extend_from_slice(&[0u8; 16]);
        assert_eq!(unframe("r", &bytes).unwrap(), b"abc");
    }

    #[test]
    fn test_unframe_rejects_short_regions() {
        assert!(matches!(
            unframe("r", &[1, 2, 3]),
            Err(RegionError::Truncated { available: 3, .. })
        ));

        let mut bytes = frame(b"abcdef");
        bytes.truncate(10);
        assert!(matches!(
            unframe("r", &bytes),
            Err(RegionError::Truncated { claimed: 6, available: 2, .. })
        ));
    }

    #[test]
    fn test_io_error_kinds_map_to_region_errors() {
        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert!(matches!(RegionError::io("r", missing), RegionError::NotFound(name) if name == "r"));

        let taken = io::Error::new(io::ErrorKind::AlreadyExists, "taken");
        assert!(matches!(RegionError::io("r", taken), RegionError::AlreadyExists(_)));

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(RegionError::io("r", denied), RegionError::Io { .. }));
    }
}
