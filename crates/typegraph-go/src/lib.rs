//! Go type introspection for typegraph.
//!
//! Go source trees are read with tree-sitter. A namespace is a Go import path
//! and a type is a top-level `type` declaration whose underlying type is a
//! struct (record) or an interface.
//!
//! ```no_run
//! use typegraph_go::{GoModule, GoProgram};
//!
//! let module = GoModule::discover(".")?;
//! let program = GoProgram::load(&module, &[".".to_string()])?;
//! # Ok::<(), typegraph_core::Error>(())
//! ```
pub mod module;
pub mod parse;
pub mod program;

pub use module::{GoModule, Requirement};
pub use program::{GoPackage, GoProgram};
