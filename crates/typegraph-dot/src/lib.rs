//! Export of a finished [`TypeGraph`](typegraph_core::TypeGraph).
//!
//! # Module Structure
//!
//! - [`dot`]: DOT format utilities and helpers
//! - [`export`]: DOT and JSON descriptions of the exported entities and edges
//! - [`render`]: running Graphviz on a written description

pub mod dot;
mod export;
pub mod render;

pub use dot::DotBuilder;
pub use export::{ExportFormat, ExportOptions, render_dot, render_json};
pub use render::GraphvizRenderer;
