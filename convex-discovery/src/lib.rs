//! Static discovery of Convex backend functions.
//!
//! This crate finds the `query`, `mutation` and `action` functions exported
//! by a Convex backend directory and describes their arguments, without
//! executing any backend code.
//!
//! # Overview
//!
//! - **Module Resolution**: Reading the generated API barrel (`_generated/api.d.ts`) for source modules
//! - **Signature Extraction**: Tree-sitter analysis of each module's exports and argument validators
//! - **Caching**: Persisting results keyed by a checksum of the backend source tree
//!
//! # Architecture
//!
//! Discovery is **fail-soft**: a missing barrel, an unreadable module or a
//! malformed validator reduces what is found but never aborts the pass.
//! Deciding that "nothing found" is fatal is left to the caller.
//!
//! ```no_run
//! use convex_discovery::DiscoveryContext;
//!
//! let ctx = DiscoveryContext::new("./convex")?
//!     .with_cache("node_modules/.cache/convex-cli");
//! for function in ctx.discover() {
//!     println!("{} ({})", function.path, function.function_type);
//! }
//! # Ok::<(), convex_discovery::DiscoveryError>(())
//! ```

pub mod cache;
pub mod engine;
pub mod error;
pub mod parser;

pub use cache::{CacheEntry, DiscoveryCache, source_checksum};
pub use engine::{DiscoveryContext, convert_provided};
pub use error::{CacheError, DiscoveryError};
pub use parser::{ModuleEntry, SignatureExtractor, SourceLanguage};
