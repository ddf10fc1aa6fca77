//! Command line interface
//!
//! Argument parsing for the `crctl` binary and the runner that maps each
//! subcommand onto a registry operation.

pub mod args;
pub mod runner;

pub use args::{Args, Command};
pub use runner::Runner;
