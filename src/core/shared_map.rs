use crate::core::region::{
    framed_len, unframe, write_frame, BackendKind, RegionBackend, RegionError,
};
use shared_memory::{Shmem, ShmemConf, ShmemError};
use tracing::debug;

/// Regions backed by named OS shared memory segments (`shm_open` on unix,
/// named file mappings on Windows).
///
/// Created segments are released from ownership immediately so they outlive
/// the handle that created them; only [`RegionBackend::destroy`] unlinks them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShmBackend;

impl ShmBackend {
    pub fn new() -> Self {
        Self
    }

    fn open_existing(name: &str) -> Result<Shmem, RegionError> {
        ShmemConf::new().os_id(name).open().map_err(|err| to_region(err, name))
    }
}

impl RegionBackend for ShmBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::SharedMemory
    }

    fn create(&self, name: &str, payload: &[u8]) -> Result<(), RegionError> {
        let size = framed_len(payload);
        let mut shm = ShmemConf::new()
            .os_id(name)
            .size(size)
            .create()
            .map_err(|err| to_region(err, name))?;
        // ensure the mapping survives after this handle is dropped
        let _ = shm.set_owner(false);

        if shm.len() < size {
            return Err(RegionError::Truncated {
                name: name.to_string(),
                claimed: size,
                available: shm.len(),
            });
        }

        // SAFETY: the segment was created by this call and is not yet listed in
        // any index, so no other handle writes to it concurrently.
        let dst = unsafe { shm.as_slice_mut() };
        write_frame(dst, payload);

        debug!(region = name, bytes = size, "created shared memory region");
        Ok(())
    }

    fn attach(&self, name: &str) -> Result<Vec<u8>, RegionError> {
        let shm = Self::open_existing(name)?;
        // SAFETY: the bytes are copied out immediately. Concurrent writers are
        // not coordinated; a torn read surfaces as a decode error.
        let bytes = unsafe { shm.as_slice() };
        unframe(name, bytes)
    }

    fn destroy(&self, name: &str) -> Result<(), RegionError> {
        let mut shm = Self::open_existing(name)?;
        // the owner unlinks the segment on drop
        let _ = shm.set_owner(true);
        drop(shm);
        debug!(region = name, "destroyed shared memory region");
        Ok(())
    }
}

fn to_region(err: ShmemError, name: &str) -> RegionError {
    match err {
        ShmemError::MappingIdExists | ShmemError::LinkExists => {
            RegionError::AlreadyExists(name.to_string())
        }
        ShmemError::MapOpenFailed(_)
        | ShmemError::LinkDoesNotExist
        | ShmemError::NoLinkOrOsId => RegionError::NotFound(name.to_string()),
        source => RegionError::Shmem {
            name: name.to_string(),
            source,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_name(tag: &str) -> String {
        format!("algos_shm_{}_{}", tag, std::process::id())
    }

    #[test]
    fn test_create_attach_destroy() {
        let backend = ShmBackend::new();
        let name = unique_name("cycle");

        backend.create(&name, b"payload").unwrap();
        assert_eq!(backend.attach(&name).unwrap(), b"payload");

        assert!(matches!(
            backend.create(&name, b"other"),
            Err(RegionError::AlreadyExists(_))
        ));

        backend.resize(&name, b"a much longer payload than before").unwrap();
        assert_eq!(
            backend.attach(&name).unwrap(),
            b"a much longer payload than before"
        );

        backend.destroy(&name).unwrap();
        assert!(matches!(backend.attach(&name), Err(RegionError::NotFound(_))));
        assert!(matches!(backend.destroy(&name), Err(RegionError::NotFound(_))));
    }

    #[test]
    fn test_empty_payload_keeps_header() {
        let backend = ShmBackend::new();
        let name = unique_name("empty");

        backend.create(&name, &[]).unwrap();
        assert!(backend.attach(&name).unwrap().is_empty());
        backend.destroy(&name).unwrap();
    }
}
