use crate::core::region::{
    framed_len, unframe, write_frame, BackendKind, RegionBackend, RegionError,
};
use memmap2::{Mmap, MmapMut};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// Regions backed by memory-mapped files, one file per region.
///
/// [`MmapBackend::new`] owns a private temporary directory that is removed on
/// [`RegionBackend::release`]. [`MmapBackend::in_dir`] uses a caller-chosen
/// directory so several processes can share the same regions; that directory
/// is left in place on release.
#[derive(Debug)]
pub struct MmapBackend {
    root: PathBuf,
    owned: Option<TempDir>,
}

impl MmapBackend {
    pub fn new() -> Result<Self, RegionError> {
        let dir = tempfile::Builder::new()
            .prefix("algos-mmap-")
            .tempdir()
            .map_err(|err| RegionError::io("<tempdir>", err))?;
        Ok(Self {
            root: dir.path().to_path_buf(),
            owned: Some(dir),
        })
    }

    pub fn in_dir(root: impl Into<PathBuf>) -> Result<Self, RegionError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|err| RegionError::io(&root.display().to_string(), err))?;
        Ok(Self { root, owned: None })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn fill(file: &File, name: &str, payload: &[u8]) -> Result<(), RegionError> {
        let size = framed_len(payload);
        file.set_len(size as u64).map_err(|err| RegionError::io(name, err))?;
        // SAFETY: the mapping is dropped before this function returns and the
        // file has just been sized to `size`.
        let mut map =
            unsafe { MmapMut::map_mut(file) }.map_err(|err| RegionError::io(name, err))?;
        write_frame(&mut map[..], payload);
        map.flush().map_err(|err| RegionError::io(name, err))
    }
}

impl RegionBackend for MmapBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::MmapFile
    }

    fn create(&self, name: &str, payload: &[u8]) -> Result<(), RegionError> {
        let path = self.path_for(name);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|err| RegionError::io(name, err))?;
        Self::fill(&file, name, payload)?;
        debug!(region = name, path = %path.display(), "created mmap region");
        Ok(())
    }

    fn attach(&self, name: &str) -> Result<Vec<u8>, RegionError> {
        let file = File::open(self.path_for(name)).map_err(|err| RegionError::io(name, err))?;
        // SAFETY: read-only mapping, copied out before it is dropped
        let map = unsafe { Mmap::map(&file) }.map_err(|err| RegionError::io(name, err))?;
        unframe(name, &map[..])
    }

    /// Files can change size in place, so the region keeps its identity.
    fn resize(&self, name: &str, payload: &[u8]) -> Result<(), RegionError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(self.path_for(name))
            .map_err(|err| RegionError::io(name, err))?;
        Self::fill(&file, name, payload)
    }

    fn destroy(&self, name: &str) -> Result<(), RegionError> {
        fs::remove_file(self.path_for(name)).map_err(|err| RegionError::io(name, err))?;
        debug!(region = name, "destroyed mmap region");
        Ok(())
    }

    fn release(&mut self) -> Result<(), RegionError> {
        if let Some(dir) = self.owned.take() {
            let label = dir.path().display().to_string();
            dir.close().map_err(|err| RegionError::io(&label, err))?;
        }
        Ok(())
    }
}
