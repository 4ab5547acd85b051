//! Output generation (graph description file and rendered artifact).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use typegraph_core::{Error, Result, TypeGraph};
use typegraph_dot::{ExportFormat, ExportOptions, GraphvizRenderer, render_dot, render_json};

use crate::TypegraphOptions;

/// Write the DOT or JSON description of `graph` to `opts.output`.
pub fn write_description(opts: &TypegraphOptions, graph: &TypeGraph) -> Result<PathBuf> {
    let export = ExportOptions {
        include_orphans: opts.include_orphans,
        title: Some(opts.namespaces.join(" ")),
        url: opts.url.clone(),
    };

    let text = match opts.format {
        ExportFormat::Dot => render_dot(graph, &export),
        ExportFormat::Json => render_json(graph, &export)?,
    };

    fs::write(&opts.output, text).map_err(|err| {
        Error::from(err)
            .with_operation("output::write_description")
            .with_context("path", opts.output.display().to_string())
    })?;

    info!(path = %opts.output.display(), "graph description written");
    Ok(opts.output.clone())
}

/// Run Graphviz on a DOT description, unless rendering is off or the
/// description is JSON.
pub fn render_artifact(opts: &TypegraphOptions, description: &Path) -> Result<Option<PathBuf>> {
    if !opts.render || opts.format != ExportFormat::Dot {
        return Ok(None);
    }

    let renderer = GraphvizRenderer::new(opts.render_format.clone())
        .with_program(opts.render_program.clone());
    renderer.render(description).map(Some)
}
