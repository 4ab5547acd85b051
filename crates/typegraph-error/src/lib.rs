//! # typegraph-error
//!
//! Unified error handling for typegraph.
//!
//! - **ErrorKind**: what went wrong (e.g. `PatternCompileFailed`, `LoadFailed`)
//! - **Error context**: the pattern, namespace or process arguments involved
//! - **Error source**: the underlying error, without leaking its raw type
//!
//! Every error is fatal for the run. typegraph is a single-shot batch tool,
//! so there is no retry status to track.
//!
//! ## Usage
//!
//! ```rust
//! use typegraph_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::LoadFailed, "no Go files in directory")
//!         .with_operation("go::load")
//!         .with_context("namespace", "example.com/app/empty"))
//! }
//! ```

mod error;
mod kind;

pub use error::Error;
pub use kind::ErrorKind;

/// Result type alias using the typegraph Error
pub type Result<T> = std::result::Result<T, Error>;
