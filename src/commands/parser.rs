//! Command-line argument parsing
//!
//! The clap derive definitions for the `algos` binary.

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "algos",
    version,
    about = "Toy text algorithms and a namespaced shared-memory object store"
)]
pub struct Cli {
    /// Log filter (trace, debug, info, warn, error or a full directive)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Also append log records to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Text related algorithms
    Text {
        #[command(subcommand)]
        action: TextAction,
    },

    /// Shared object store operations
    Store {
        /// Region backend (shm or mmap); defaults to ALGOS_STORE_BACKEND or shm
        #[arg(long)]
        backend: Option<String>,
        /// Directory holding regions for the mmap backend
        #[arg(long)]
        dir: Option<PathBuf>,
        #[command(subcommand)]
        action: StoreAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TextAction {
    /// Print the anagram groups among the words read from stdin
    Anagrams,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum StoreAction {
    /// Store a JSON value under a new handle
    Write {
        namespace: String,
        handle: String,
        /// JSON text
        value: String,
    },
    /// Print the JSON value stored under a handle
    Read { namespace: String, handle: String },
    /// Destroy a handle and its region
    Delete { namespace: String, handle: String },
    /// Replace the value stored under a handle
    Update {
        namespace: String,
        handle: String,
        /// JSON text
        value: String,
    },
    /// Print the namespace index as a JSON array
    Index { namespace: String },
    /// Destroy every region in the namespace
    Erase { namespace: String },
}

impl StoreAction {
    pub fn namespace(&self) -> &str {
        match self {
            StoreAction::Write { namespace, .. }
            | StoreAction::Read { namespace, .. }
            | StoreAction::Delete { namespace, .. }
            | StoreAction::Update { namespace, .. }
            | StoreAction::Index { namespace }
            | StoreAction::Erase { namespace } => namespace,
        }
    }
}

impl Cli {
    pub fn parse_command() -> Self {
        Self::parse()
    }

    pub fn try_parse_command_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args)
    }
}
