//! Commands generated from Convex functions.
//!
//! - [`flags`]: one flag per schema property, with typed value parsing
//! - [`tree`]: module groups and function commands, plus dispatch

pub mod flags;
pub mod tree;

pub use tree::CommandTree;

use serde_json::Value;
use thiserror::Error;

/// Naming conflicts found while building the command tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("Functions {first} and {second} both map to command '{name}' under '{parent}'")]
    DuplicateCommand {
        parent: String,
        name: String,
        first: String,
        second: String,
    },

    #[error("Arguments '{first}' and '{second}' of {path} both map to flag --{flag}")]
    DuplicateFlag {
        path: String,
        flag: String,
        first: String,
        second: String,
    },

    #[error("Argument '{property}' of {path} cannot be used as a flag name")]
    ReservedFlag { path: String, property: String },
}

/// Result of running the command tree.
#[derive(Debug)]
pub enum Outcome {
    /// The function ran and returned this value.
    Completed(Value),
    /// Help or version output was requested; print it and exit.
    Exit(clap::Error),
}
