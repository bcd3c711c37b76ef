//! Shared object store
//!
//! A namespaced key-value store. Each object lives in a region named
//! `<namespace>_<handle>`, and the handle index lives in the region named
//! `<namespace>` so the whole namespace can be erased in one pass.
//!
//! The store takes no locks. Index updates are unsynchronized
//! read-modify-write sequences, so two writers racing on one namespace can drop
//! a handle from the index and orphan its region. Callers that need atomicity
//! must coordinate externally.

use crate::config::MAX_NAME_LEN;
use crate::core::region::{BackendKind, RegionBackend, RegionError};
use crate::error::{StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Live,
    Erased,
}

/// Namespaced object store over a [`RegionBackend`].
#[derive(Debug)]
pub struct SharedStore {
    namespace: String,
    backend: Box<dyn RegionBackend>,
    state: StoreState,
}

impl SharedStore {
    /// Attach to the namespace's index, creating it if absent.
    pub fn open_or_create(namespace: &str, kind: BackendKind) -> StoreResult<Self> {
        validate_name(namespace).map_err(|reason| {
            StoreError::initialization(format!("invalid namespace {namespace:?}: {reason}"))
        })?;
        Self::with_backend(namespace, kind.open()?)
    }

    /// Same as [`SharedStore::open_or_create`] with the backend named by a string
    /// such as `"shm"` or `"mmap"`.
    pub fn open_or_create_named(namespace: &str, backend: &str) -> StoreResult<Self> {
        let kind: BackendKind = backend
            .parse()
            .map_err(|err| StoreError::initialization(format!("{err}")))?;
        Self::open_or_create(namespace, kind)
    }

    pub fn with_backend(namespace: &str, backend: Box<dyn RegionBackend>) -> StoreResult<Self> {
        validate_name(namespace).map_err(|reason| {
            StoreError::initialization(format!("invalid namespace {namespace:?}: {reason}"))
        })?;

        let store = Self {
            namespace: namespace.to_string(),
            backend,
            state: StoreState::Live,
        };

        match store.backend.attach(namespace) {
            Ok(bytes) => {
                decode::<BTreeSet<String>>(namespace, &bytes).map_err(|err| {
                    StoreError::initialization(format!(
                        "existing index for {namespace:?} is unreadable: {err}"
                    ))
                })?;
                debug!(namespace, backend = %store.backend.kind(), "attached to existing index");
            }
            Err(RegionError::NotFound(_)) => {
                let index = BTreeSet::from([namespace.to_string()]);
                let bytes = encode(namespace, &index)?;
                match store.backend.create(namespace, &bytes) {
                    Ok(()) => {
                        debug!(namespace, backend = %store.backend.kind(), "created index");
                    }
                    // another process created it between our attach and create
                    Err(RegionError::AlreadyExists(_)) => {
                        debug!(namespace, "index appeared concurrently, attaching");
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            Err(err) => return Err(err.into()),
        }

        Ok(store)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    pub fn is_live(&self) -> bool {
        self.state == StoreState::Live
    }

    /// The current index, including the namespace sentinel.
    pub fn read_index(&self) -> StoreResult<BTreeSet<String>> {
        self.ensure_live()?;
        let bytes = self.backend.attach(&self.namespace)?;
        decode(&self.namespace, &bytes)
    }

    /// Live handles, without the namespace sentinel.
    pub fn handles(&self) -> StoreResult<Vec<String>> {
        let mut index = self.read_index()?;
        index.remove(&self.namespace);
        Ok(index.into_iter().collect())
    }

    pub fn contains(&self, handle: &str) -> StoreResult<bool> {
        Ok(handle != self.namespace && self.read_index()?.contains(handle))
    }

    /// Replace the index region wholesale with `index`.
    pub(crate) fn write_index(&self, index: &BTreeSet<String>) -> StoreResult<()> {
        self.ensure_live()?;
        let bytes = encode(&self.namespace, index)?;
        self.backend.resize(&self.namespace, &bytes)?;
        Ok(())
    }

    /// Unlocked read-modify-write of the index. Wrap calls to this in an
    /// external lock if concurrent writers must not lose updates.
    pub(crate) fn append_index(&self, handle: &str) -> StoreResult<()> {
        let mut index = self.read_index()?;
        index.insert(handle.to_string());
        self.write_index(&index)
    }

    /// Store `value` under a new handle.
    ///
    /// The value is serialized before any region is touched, so a
    /// serialization failure leaves the store unchanged. Writing to an existing
    /// handle fails with [`StoreError::HandleAlreadyExists`].
    pub fn write<T: Serialize + ?Sized>(&mut self, handle: &str, value: &T) -> StoreResult<()> {
        self.ensure_live()?;
        self.validate_handle(handle)?;
        if handle == self.namespace {
            return Err(StoreError::HandleAlreadyExists(handle.to_string()));
        }

        let bytes = encode(handle, value)?;
        let name = self.object_name(handle);
        match self.backend.create(&name, &bytes) {
            Ok(()) => {}
            Err(RegionError::AlreadyExists(_)) => {
                return Err(StoreError::HandleAlreadyExists(handle.to_string()))
            }
            Err(err) => return Err(err.into()),
        }

        self.append_index(handle)?;
        debug!(namespace = %self.namespace, handle, bytes = bytes.len(), "wrote object");
        Ok(())
    }

    /// Read the value stored under `handle`. Reads are repeatable.
    pub fn read<T: DeserializeOwned>(&self, handle: &str) -> StoreResult<T> {
        self.ensure_live()?;
        self.validate_handle(handle)?;
        if !self.contains(handle)? {
            return Err(StoreError::HandleNotFound(handle.to_string()));
        }

        let bytes = self.backend.attach(&self.object_name(handle))?;
        decode(handle, &bytes)
    }

    /// Destroy the object stored under `handle` and drop it from the index.
    pub fn delete(&mut self, handle: &str) -> StoreResult<()> {
        self.ensure_live()?;
        self.validate_handle(handle)?;
        if handle == self.namespace {
            return Err(StoreError::InvalidHandle {
                handle: handle.to_string(),
                reason: "reserved for the namespace index",
            });
        }

        let mut index = self.read_index()?;
        if !index.contains(handle) {
            return Err(StoreError::HandleNotFound(handle.to_string()));
        }

        match self.backend.destroy(&self.object_name(handle)) {
            Ok(()) => {}
            // the index is stale; dropping the entry restores consistency
            Err(RegionError::NotFound(name)) => {
                warn!(namespace = %self.namespace, region = %name, "indexed region was already gone");
            }
            Err(err) => return Err(err.into()),
        }

        index.remove(handle);
        self.write_index(&index)?;
        debug!(namespace = %self.namespace, handle, "deleted object");
        Ok(())
    }

    /// `delete` followed by `write`.
    ///
    /// Not atomic: if the write fails after the delete succeeded, the handle is
    /// left absent rather than holding either value.
    pub fn update<T: Serialize + ?Sized>(&mut self, handle: &str, value: &T) -> StoreResult<()> {
        self.delete(handle)?;
        self.write(handle, value)
    }

    /// Destroy every object, the index, and backend resources. Best effort:
    /// individual failures are logged and skipped. The store is unusable
    /// afterwards; construct a new one to reuse the namespace.
    pub fn erase(&mut self) -> StoreResult<()> {
        self.ensure_live()?;

        let mut index = match self.read_index() {
            Ok(index) => index,
            Err(err) => {
                warn!(namespace = %self.namespace, error = %err, "index unreadable during erase");
                BTreeSet::new()
            }
        };
        index.remove(&self.namespace);

        for handle in &index {
            if let Err(err) = self.delete(handle) {
                warn!(namespace = %self.namespace, handle = %handle, error = %err, "failed to delete during erase");
            }
        }

        match self.backend.destroy(&self.namespace) {
            Ok(()) | Err(RegionError::NotFound(_)) => {}
            Err(err) => {
                warn!(namespace = %self.namespace, error = %err, "failed to destroy index region");
            }
        }
        if let Err(err) = self.backend.release() {
            warn!(namespace = %self.namespace, error = %err, "failed to release backend resources");
        }

        self.state = StoreState::Erased;
        debug!(namespace = %self.namespace, objects = index.len(), "erased store");
        Ok(())
    }

    fn ensure_live(&self) -> StoreResult<()> {
        match self.state {
            StoreState::Live => Ok(()),
            StoreState::Erased => Err(StoreError::NotInitialized(self.namespace.clone())),
        }
    }

    fn validate_handle(&self, handle: &str) -> StoreResult<()> {
        validate_name(handle).map_err(|reason| StoreError::InvalidHandle {
            handle: handle.to_string(),
            reason,
        })?;
        if self.namespace.len() + 1 + handle.len() > MAX_NAME_LEN {
            return Err(StoreError::InvalidHandle {
                handle: handle.to_string(),
                reason: "region name would exceed the maximum length",
            });
        }
        Ok(())
    }

    fn object_name(&self, handle: &str) -> String {
        object_region_name(&self.namespace, handle)
    }
}

/// Name of the region backing `handle` within `namespace`.
pub fn object_region_name(namespace: &str, handle: &str) -> String {
    format!("{namespace}_{handle}")
}

fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("must not be empty");
    }
    if name.len() > MAX_NAME_LEN {
        return Err("too long for a region name");
    }
    if name
        .chars()
        .any(|c| c == '/' || c == '\\' || c == '\0' || c.is_whitespace())
    {
        return Err("contains a character not allowed in region names");
    }
    Ok(())
}

/// Values are stored as MessagePack maps with named fields, so types that
/// need a self-describing format (`serde_json::Value`, untagged enums,
/// skipped fields) read back intact.
fn encode<T: Serialize + ?Sized>(handle: &str, value: &T) -> StoreResult<Vec<u8>> {
    rmp_serde::to_vec_named(value).map_err(|source| StoreError::Serialization {
        handle: handle.to_string(),
        source,
    })
}

fn decode<T: DeserializeOwned>(handle: &str, bytes: &[u8]) -> StoreResult<T> {
    rmp_serde::from_slice(bytes).map_err(|source| StoreError::Deserialization {
        handle: handle.to_string(),
        source,
    })
}
