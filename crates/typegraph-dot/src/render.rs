//! Running Graphviz on a written graph description.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use tracing::info;

use typegraph_core::{Error, Result};

/// Invokes `dot -T<format> -O <file>`, which writes `<file>.<format>` next to
/// the description.
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    program: String,
    format: String,
}

impl Default for GraphvizRenderer {
    fn default() -> Self {
        Self::new("svg")
    }
}

impl GraphvizRenderer {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            program: "dot".to_string(),
            format: format.into(),
        }
    }

    /// Use another Graphviz layout program, e.g. `neato`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn args(&self, description: &Path) -> Vec<String> {
        vec![
            format!("-T{}", self.format),
            "-O".to_string(),
            description.display().to_string(),
        ]
    }

    /// The artifact `-O` produces for `description`.
    pub fn output_path(&self, description: &Path) -> PathBuf {
        PathBuf::from(format!("{}.{}", description.display(), self.format))
    }

    fn command_line(&self, description: &Path) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args(description));
        parts.join(" ")
    }

    /// Run the renderer. The description file is left in place whatever the outcome.
    pub fn render(&self, description: &Path) -> Result<PathBuf> {
        let start = Instant::now();
        let status = Command::new(&self.program)
            .args(self.args(description))
            .status()
            .map_err(|err| {
                Error::render_failed(self.command_line(description), err.to_string())
                    .with_operation("render::graphviz")
                    .set_source(err)
            })?;

        if !status.success() {
            return Err(Error::render_failed(
                self.command_line(description),
                format!("renderer exited with {status}"),
            )
            .with_operation("render::graphviz")
            .with_context("status", status.to_string()));
        }

        let output = self.output_path(description);
        info!(
            output = %output.display(),
            "Rendering: {:.2}s",
            start.elapsed().as_secs_f64()
        );
        Ok(output)
    }
}
