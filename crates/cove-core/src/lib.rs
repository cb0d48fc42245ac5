//! # cove-core: Foundational Types for Cove
//!
//! This crate defines the path model shared by every Cove analysis and the
//! walker that enumerates the fields of a JSON data tree. Every other crate
//! in the workspace depends on `cove-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Two path types, never confused.** A [`GenericPath`] elides array
//!    indices and is the unit of field statistics and schema comparison.
//!    A [`ConcretePath`] keeps indices and is only used to point at an
//!    individual occurrence. Aggregation is always keyed by `GenericPath`.
//!
//! 2. **Lazy, single-pass walking.** [`walk()`] returns an iterator driven
//!    by an explicit stack. Deeply nested documents do not grow the call
//!    stack, and re-walking means calling `walk()` again.
//!
//! 3. **No I/O.** Configuration is parsed from strings handed in by the
//!    caller. Loading files is the job of the CLI.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cove-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod error;
pub mod path;
pub mod walk;

// Re-export primary types for ergonomic imports.
pub use config::{render_context, AssumptionEntry, CoveConfig, PackageKind};
pub use error::{ConfigError, PathError};
pub use path::{ConcretePath, GenericPath, PathSegment};
pub use walk::{walk, walk_from, FieldOccurrence, PathWalker};
