use crate::core::region::{frame, unframe, BackendKind, RegionBackend, RegionError};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe in-process regions.
/// Not shared across processes; clones share one set of regions.
#[derive(Debug, Clone, Default)]
pub struct InProcessBackend {
    regions: Arc<DashMap<String, Vec<u8>>>,
}

impl InProcessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all live regions, sorted.
    pub fn region_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .regions
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Size in bytes of a region including its header.
    pub fn region_len(&self, name: &str) -> Option<usize> {
        self.regions.get(name).map(|bytes| bytes.len())
    }
}

impl RegionBackend for InProcessBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::InProcess
    }

    fn create(&self, name: &str, payload: &[u8]) -> Result<(), RegionError> {
        match self.regions.entry(name.to_string()) {
            Entry::Occupied(_) => Err(RegionError::AlreadyExists(name.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(frame(payload));
                Ok(())
            }
        }
    }

    fn attach(&self, name: &str) -> Result<Vec<u8>, RegionError> {
        let bytes = self
            .regions
            .get(name)
            .ok_or_else(|| RegionError::NotFound(name.to_string()))?;
        unframe(name, bytes.value())
    }

    fn destroy(&self, name: &str) -> Result<(), RegionError> {
        self.regions
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| RegionError::NotFound(name.to_string()))
    }
}
