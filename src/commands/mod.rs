//! CLI commands
//!
//! Argument parsing and one handler per subcommand.

pub mod parser;
pub mod store;
pub mod text;

// Re-exports (used by main.rs)
pub use parser::*;
