//! `store` subcommand: one store operation per invocation.
//!
//! Values cross the command line as JSON text and are stored as parsed
//! `serde_json::Value`s.

use crate::commands::parser::StoreAction;
use crate::config;
use crate::core::region::{BackendKind, RegionBackend};
use crate::core::MmapBackend;
use crate::storage::SharedStore;
use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Resolve the backend: the flag first, then `ALGOS_STORE_BACKEND`, then shm.
///
/// The in-process backend is rejected here: its regions die with the process,
/// so nothing one invocation writes would be visible to the next.
pub fn resolve_backend(flag: Option<&str>) -> Result<BackendKind> {
    let kind = match flag {
        Some(name) => name.parse()?,
        None => config::backend_from_env()?,
    };
    if kind == BackendKind::InProcess {
        bail!("the {kind} backend does not persist across invocations (use shm or mmap)");
    }
    Ok(kind)
}

/// The CLI's mmap regions live in a shared directory so separate invocations
/// see each other's regions.
fn open_backend(kind: BackendKind, dir: Option<PathBuf>) -> Result<Box<dyn RegionBackend>> {
    let backend: Box<dyn RegionBackend> = match kind {
        BackendKind::MmapFile => {
            let dir = dir.unwrap_or_else(config::default_mmap_dir);
            Box::new(MmapBackend::in_dir(dir)?)
        }
        other => other.open()?,
    };
    Ok(backend)
}

pub fn run<W: Write>(
    backend: Option<&str>,
    dir: Option<PathBuf>,
    action: StoreAction,
    out: &mut W,
) -> Result<()> {
    let kind = resolve_backend(backend)?;
    let mut store = SharedStore::with_backend(action.namespace(), open_backend(kind, dir)?)?;

    match action {
        StoreAction::Write {
            handle, value, ..
        } => {
            let value = parse_json(&value)?;
            store.write(&handle, &value)?;
            info!(namespace = store.namespace(), handle = %handle, "stored value");
        }
        StoreAction::Read { handle, .. } => {
            let value: serde_json::Value = store.read(&handle)?;
            writeln!(out, "{}", serde_json::to_string(&value)?)?;
        }
        StoreAction::Delete { handle, .. } => {
            store.delete(&handle)?;
            info!(namespace = store.namespace(), handle = %handle, "deleted value");
        }
        StoreAction::Update {
            handle, value, ..
        } => {
            let value = parse_json(&value)?;
            store.update(&handle, &value)?;
            info!(namespace = store.namespace(), handle = %handle, "updated value");
        }
        StoreAction::Index { .. } => {
            let index: Vec<String> = store.read_index()?.into_iter().collect();
            writeln!(out, "{}", serde_json::to_string(&index)?)?;
        }
        StoreAction::Erase { .. } => {
            store.erase()?;
            info!(namespace = store.namespace(), "erased namespace");
        }
    }
    Ok(())
}

fn parse_json(text: &str) -> Result<serde_json::Value> {
    serde_json::from_str(text).with_context(|| format!("value is not valid JSON: {text}"))
}
