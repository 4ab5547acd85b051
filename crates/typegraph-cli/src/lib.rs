//! typegraph command-line interface.
//!
pub mod output;
pub mod pipeline;

use std::path::PathBuf;

use typegraph_core::{Error, Result, TypeGraph};
use typegraph_dot::ExportFormat;

pub use pipeline::run_main;

/// Options for running typegraph.
#[derive(Debug, Clone)]
pub struct TypegraphOptions {
    /// Root namespaces: Go import paths or directories relative to `dir`.
    pub namespaces: Vec<String>,
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
    pub include_orphans: bool,
    /// Where module discovery starts and relative namespaces are resolved.
    pub dir: PathBuf,
    /// Graph description file.
    pub output: PathBuf,
    pub format: ExportFormat,
    /// Graphviz output format, e.g. `svg` or `png`.
    pub render_format: String,
    /// Run Graphviz on the description (DOT only).
    pub render: bool,
    /// Graphviz layout program, e.g. `dot` or `neato`.
    pub render_program: String,
    /// Link attached to the graph caption.
    pub url: Option<String>,
}

impl Default for TypegraphOptions {
    fn default() -> Self {
        Self {
            namespaces: vec![".".to_string()],
            includes: Vec::new(),
            excludes: Vec::new(),
            include_orphans: false,
            dir: PathBuf::from("."),
            output: PathBuf::from("typegraph.dot"),
            format: ExportFormat::Dot,
            render_format: "svg".to_string(),
            render: true,
            render_program: "dot".to_string(),
            url: None,
        }
    }
}

impl TypegraphOptions {
    /// Reject option values that would only fail late, after loading.
    pub fn validate(&self) -> Result<()> {
        if self.namespaces.iter().any(|ns| ns.trim().is_empty()) {
            return Err(Error::invalid_argument("namespace", "empty namespace")
                .with_operation("options::validate"));
        }

        let format_ok = !self.render_format.is_empty()
            && self
                .render_format
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == ':' || c == '_');
        if !format_ok {
            return Err(Error::invalid_argument(
                "render-format",
                format!("not a Graphviz output format: {:?}", self.render_format),
            )
            .with_operation("options::validate"));
        }

        if self.render_program.trim().is_empty() {
            return Err(Error::invalid_argument("renderer", "empty renderer program")
                .with_operation("options::validate"));
        }
        Ok(())
    }
}

/// What a successful run produced.
#[derive(Debug)]
pub struct RunReport {
    pub graph: TypeGraph,
    /// The description file that was written.
    pub description: PathBuf,
    /// The rendered artifact, when the renderer ran.
    pub artifact: Option<PathBuf>,
}
