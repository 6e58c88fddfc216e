//! Command-line interface for envforge.
//!
//! Loads the assignment environment configuration, assembles the build
//! pipeline and runs it against the local Docker daemon.

mod commands;

pub use commands::{parse_cli, run_with_cli, Cli};
