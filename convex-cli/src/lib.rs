//! Convex CLI library - generates a command-line interface from backend functions.
//!
//! Exposed as a library so the generated CLI can be embedded and tested with
//! a substitute transport.
//!
//! # Modules
//!
//! - [`config`]: `convex-cli.yaml` loading, environment overrides, URL resolution
//! - [`naming`]: kebab-case command and flag names
//! - [`commands`]: command tree construction and dispatch
//! - [`app`]: the assembled [`ConvexCli`]
//! - [`output`]: printing results and errors

pub mod app;
pub mod commands;
pub mod config;
pub mod errors;
pub mod naming;
pub mod output;

pub use app::{ConvexCli, load_functions};
pub use commands::{BuildError, CommandTree, Outcome};
pub use config::{CliConfig, ConfigError};
pub use errors::CliError;
pub use naming::kebab_case;
