//! Box office command-line tooling.
//!
//! Exposes the CLI definition and command implementations so that they can
//! be tested without spawning the binary.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
